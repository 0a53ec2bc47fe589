//! The reduction engine: candidate generation, validation, and the outer
//! fixed-point loop.
//!
//! The loop invariant is that the current best tree reproduces the outcome
//! recorded from the original input. Every candidate is serialized,
//! deduplicated against previously executed queries, and probed; the first
//! accepted candidate becomes the new best tree and enumeration restarts
//! from the root.

pub mod enumerate;

use crate::ast::{self, AstError, Field, NodeClass, Path, TreeNode};
use crate::ast::cursor::field_of;
use crate::oracle::{Oracle, Outcome};
use crate::output::Progress;
use crate::rules::RuleTable;
use self::enumerate::enumerate_paths;
use pg_query::NodeEnum;
use pg_query::protobuf;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReduceError {
    #[error("failed to parse query: {0}")]
    Parse(pg_query::Error),

    #[error("failed to serialize parse tree: {0}")]
    Serialize(pg_query::Error),

    #[error(
        "parser round trip changed the outcome: the input produced `{expected}` \
         but its regenerated form produced `{actual}`"
    )]
    RoundTrip { expected: Outcome, actual: Outcome },

    #[error(transparent)]
    Ast(#[from] AstError),
}

/// Result of a reduction run: the converged query plus counters.
#[derive(Debug, Clone)]
pub struct Report {
    /// The reduced query, serialized.
    pub query: String,
    /// Candidate rewrites considered, including duplicates.
    pub attempts: u64,
    /// Oracle probes actually executed.
    pub probes: u64,
    /// Candidates skipped because their text was already executed.
    pub duplicates: u64,
    /// Accepted reductions.
    pub accepted: u64,
}

/// Run the reducer over a SQL script.
///
/// The first probe of the original input defines the expected outcome;
/// a second probe of the regenerated (parse → serialize) form guards
/// against parser/serializer round-trip defects, which would otherwise
/// let the reducer chase a different bug than the one reported.
pub fn run_reduce(
    query: &str,
    oracle: &mut dyn Oracle,
    rules: &RuleTable,
    progress: &Progress,
) -> Result<Report, ReduceError> {
    let parsetree = pg_query::parse(query).map_err(ReduceError::Parse)?.protobuf;
    let regenerated = pg_query::deparse(&parsetree).map_err(ReduceError::Serialize)?;

    let expected = oracle.probe(query);
    progress.banner(query, &regenerated, &expected);
    progress.dump_tree(&parsetree);

    let actual = oracle.probe(&regenerated);
    if actual != expected {
        return Err(ReduceError::RoundTrip { expected, actual });
    }

    // The regenerated form has been executed; a candidate that serializes
    // back to it must not be probed (or counted as a reduction) again.
    let mut seen = HashSet::new();
    seen.insert(regenerated);

    let mut state = ReduceState {
        parsetree,
        expected,
        seen,
        null_node: ast::null_literal()?,
        attempts: 0,
        probes: 0,
        duplicates: 0,
        accepted: 0,
        oracle,
        rules,
        progress,
    };
    state.reduce_loop()?;

    let reduced = pg_query::deparse(&state.parsetree).map_err(ReduceError::Serialize)?;
    Ok(Report {
        query: reduced,
        attempts: state.attempts,
        probes: state.probes,
        duplicates: state.duplicates,
        accepted: state.accepted,
    })
}

struct ReduceState<'a> {
    parsetree: protobuf::ParseResult,
    expected: Outcome,
    seen: HashSet<String>,
    null_node: protobuf::Node,
    attempts: u64,
    probes: u64,
    duplicates: u64,
    accepted: u64,
    oracle: &'a mut dyn Oracle,
    rules: &'a RuleTable,
    progress: &'a Progress,
}

impl ReduceState<'_> {
    /// Repeat full passes until one finds nothing to reduce. Each accepted
    /// reduction invalidates all outstanding paths, so the pass restarts
    /// from the root.
    fn reduce_loop(&mut self) -> Result<(), ReduceError> {
        let mut found = true;
        while found {
            found = false;
            for path in enumerate_paths(&self.parsetree, self.rules, self.progress) {
                if self.reduce_step(&path)? {
                    found = true;
                    break;
                }
            }
        }
        Ok(())
    }

    /// Try every strategy applicable at `path`, first acceptance wins.
    fn reduce_step(&mut self, path: &Path) -> Result<bool, ReduceError> {
        let node = ast::get(&self.parsetree, path)?;

        if let TreeNode::List(items) = &node {
            return self.tuple_moves(path, items.clone());
        }

        let class = node.node_class();
        // Copy the table reference out so the rule borrow is independent of
        // the &mut self calls below.
        let rules: &RuleTable = self.rules;
        let rule = class.and_then(|class| rules.get(class));

        if let Some(rule) = rule {
            // replace: install a subnode as the new top-level statement.
            for field in &rule.replace {
                let value = field_of(&node, *field)?;
                if value.is_present()
                    && let Some(slot) = path.statement_slot()
                    && self.try_reduce(&slot, value)?
                {
                    return Ok(true);
                }
            }

            if rule.try_null && self.try_reduce(path, TreeNode::Node(self.null_node.clone()))? {
                return Ok(true);
            }

            for field in &rule.remove {
                if field_of(&node, *field)?.is_present()
                    && self.try_reduce(&path.child(*field), TreeNode::Null)?
                {
                    return Ok(true);
                }
            }

            for field in &rule.pullup {
                let value = field_of(&node, *field)?;
                if value.is_present() && self.try_reduce(path, value)? {
                    return Ok(true);
                }
            }

            for field in &rule.pullup_tuple_elements {
                if let TreeNode::List(items) = field_of(&node, *field)? {
                    for item in items {
                        let value = TreeNode::from_node(item);
                        if value.is_present() && self.try_reduce(path, value)? {
                            return Ok(true);
                        }
                    }
                }
            }

            for field in &rule.reduce_nonempty_tuple {
                if let TreeNode::List(items) = field_of(&node, *field)?
                    && items.len() > 1
                {
                    for i in 0..items.len() {
                        let mut rest = items.clone();
                        rest.remove(i);
                        if self.try_reduce(&path.child(*field), TreeNode::List(rest))? {
                            return Ok(true);
                        }
                    }
                }
            }
        } else if class != Some(NodeClass::CaseExpr) {
            self.progress.missing_rule("reduce_step", path, &node);
            return Ok(false);
        }

        if class == Some(NodeClass::CaseExpr) && self.case_expr_moves(path, &node)? {
            return Ok(true);
        }

        // ON CONFLICT DO UPDATE weakens to DO NOTHING. The only strategy
        // that rewrites a scalar field instead of a node.
        if class == Some(NodeClass::OnConflictClause) {
            let update = protobuf::OnConflictAction::OnconflictUpdate as i32;
            let nothing = protobuf::OnConflictAction::OnconflictNothing as i32;
            if field_of(&node, Field::Action)? == TreeNode::Int(update)
                && self.try_reduce(&path.child(Field::Action), TreeNode::Int(nothing))?
            {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Moves for tuple nodes: drop the whole tuple (unless its parent is
    /// itself a tuple, which preserves the inner layer of VALUES lists),
    /// then drop one element at a time while keeping the tuple non-empty.
    fn tuple_moves(
        &mut self,
        path: &Path,
        items: Vec<protobuf::Node>,
    ) -> Result<bool, ReduceError> {
        let parent_is_tuple = match path.parent() {
            // The root statement list counts as its own tuple context.
            None => true,
            Some(parent) => ast::get(&self.parsetree, &parent)?.is_tuple(),
        };
        if !parent_is_tuple && self.try_reduce(path, TreeNode::Null)? {
            return Ok(true);
        }

        if items.len() > 1 {
            for i in 0..items.len() {
                let mut rest = items.clone();
                rest.remove(i);
                if self.try_reduce(path, TreeNode::List(rest))? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Moves for CASE expressions: the whole CASE to NULL, then each arm's
    /// test expression, each arm's result, and the default result.
    fn case_expr_moves(&mut self, path: &Path, node: &TreeNode) -> Result<bool, ReduceError> {
        if self.try_reduce(path, TreeNode::Node(self.null_node.clone()))? {
            return Ok(true);
        }

        let TreeNode::Node(pb_node) = node else {
            return Ok(false);
        };
        let Some(NodeEnum::CaseExpr(case)) = &pb_node.node else {
            return Ok(false);
        };

        for arm in &case.args {
            let Some(NodeEnum::CaseWhen(when)) = &arm.node else {
                continue;
            };
            if let Some(expr) = &when.expr
                && self.try_reduce(path, TreeNode::from_node(protobuf::Node::clone(expr)))?
            {
                return Ok(true);
            }
            if let Some(result) = &when.result
                && self.try_reduce(path, TreeNode::from_node(protobuf::Node::clone(result)))?
            {
                return Ok(true);
            }
        }

        if let Some(defresult) = &case.defresult
            && self.try_reduce(path, TreeNode::from_node(protobuf::Node::clone(defresult)))?
        {
            return Ok(true);
        }

        Ok(false)
    }

    /// Build the candidate with `value` installed at `path`, serialize,
    /// deduplicate, probe, and install on a matching outcome.
    fn try_reduce(&mut self, path: &Path, value: TreeNode) -> Result<bool, ReduceError> {
        self.attempts += 1;
        self.progress.attempt(path, &value);

        let candidate = ast::set(&self.parsetree, path, value)?;
        let query = match pg_query::deparse(&candidate) {
            Ok(query) => query,
            Err(err) => {
                // Some rewrites are not expressible as SQL (e.g. a bare
                // SortBy in expression position). They are rejected like
                // any oracle-refused candidate.
                self.progress.serialize_failed(path, &err);
                return Ok(false);
            }
        };

        if self.seen.contains(&query) {
            self.duplicates += 1;
            self.progress.duplicate(&query);
            return Ok(false);
        }
        self.seen.insert(query.clone());

        self.progress.candidate(&query);
        self.probes += 1;
        let outcome = self.oracle.probe(&query);
        if outcome != self.expected {
            self.progress.rejected(&outcome);
            return Ok(false);
        }

        self.progress.accepted();
        self.accepted += 1;
        self.parsetree = candidate;
        Ok(true)
    }
}
