//! Functional getters and setters over the parse tree.
//!
//! [`get`] walks a path and returns an owned clone of the addressed value;
//! [`set`] returns a new tree with the addressed value replaced, leaving the
//! input untouched. The field registry in this module is the single place
//! that knows which protobuf field a [`Field`] name refers to on each node
//! class; [`fields_of`] exposes the same knowledge to the rule loader so
//! field names can be validated at startup.

use crate::ast::path::{Field, Path, Step};
use crate::ast::{AstError, TreeNode};
use pg_query::NodeEnum;
use pg_query::protobuf;

#[cfg(test)]
mod tests;

/// Resolve a path to the value it addresses.
pub fn get(tree: &protobuf::ParseResult, path: &Path) -> Result<TreeNode, AstError> {
    let mut current = root_view(tree);
    for step in path.steps() {
        current = step_into(current, *step, path)?;
    }
    Ok(current)
}

/// Return a tree identical to `tree` except that the value at `path` is
/// replaced by `value`. Replacing the root (empty path) replaces the whole
/// statement list; setting [`TreeNode::Null`] clears optional fields,
/// empties repeated fields, and resets scalars to their defaults.
pub fn set(
    tree: &protobuf::ParseResult,
    path: &Path,
    value: TreeNode,
) -> Result<protobuf::ParseResult, AstError> {
    let mut out = tree.clone();
    let steps = path.steps();

    if steps.is_empty() {
        let TreeNode::List(items) = value else {
            return Err(AstError::BadValue {
                value: "non-tuple root",
            });
        };
        out.stmts = items
            .into_iter()
            .map(unwrap_raw_stmt)
            .collect::<Result<_, _>>()?;
        return Ok(out);
    }

    // The first step indexes the statement list; the second, when present,
    // must be the `stmt` field of that RawStmt.
    let Step::Index(i) = steps[0] else {
        return Err(bad_step(steps[0], "statement list"));
    };
    let raw = out
        .stmts
        .get_mut(i)
        .ok_or_else(|| bad_step(steps[0], "statement list"))?;

    if steps.len() == 1 {
        if let TreeNode::Node(node) = value {
            *raw = unwrap_raw_stmt(node)?;
            return Ok(out);
        }
        return Err(AstError::BadValue {
            value: "non-statement",
        });
    }

    if steps[1] != Step::Field(Field::Stmt) {
        return Err(bad_step(steps[1], "RawStmt"));
    }

    if steps.len() == 2 {
        match value {
            TreeNode::Node(node) => raw.stmt = Some(Box::new(node)),
            TreeNode::Null => raw.stmt = None,
            _ => {
                return Err(AstError::BadValue {
                    value: "non-node statement",
                });
            }
        }
        return Ok(out);
    }

    let stmt = raw
        .stmt
        .as_mut()
        .ok_or_else(|| bad_step(steps[2], "empty statement slot"))?;
    set_in_node(stmt, &steps[2..], value)?;
    Ok(out)
}

/// Read a named field off a resolved value. Absent optional fields, empty
/// repeated fields, and default scalars all come back as [`TreeNode::Null`].
pub fn field_of(value: &TreeNode, field: Field) -> Result<TreeNode, AstError> {
    match value {
        TreeNode::Node(node) => {
            let inner = node
                .node
                .as_ref()
                .ok_or_else(|| AstError::Malformed("empty Node wrapper".to_string()))?;
            get_field(inner, field)
        }
        TreeNode::WithClause(wc) => match field {
            Field::Ctes => Ok(node_list(&wc.ctes)),
            _ => Err(no_field("WithClause", field)),
        },
        TreeNode::WindowDef(wd) => match field {
            Field::PartitionClause => Ok(node_list(&wd.partition_clause)),
            Field::OrderClause => Ok(node_list(&wd.order_clause)),
            _ => Err(no_field("WindowDef", field)),
        },
        TreeNode::OnConflict(occ) => match field {
            Field::WhereClause => Ok(opt_node(&occ.where_clause)),
            Field::TargetList => Ok(node_list(&occ.target_list)),
            Field::Action => Ok(TreeNode::Int(occ.action)),
            _ => Err(no_field("OnConflictClause", field)),
        },
        _ => Err(AstError::BadStep {
            step: field.to_string(),
            at: "non-node value".to_string(),
        }),
    }
}

/// The fields addressable on each node class. The rule loader checks every
/// field name in the YAML against this; keep it in sync with the accessor
/// matches below.
pub fn fields_of(class: crate::ast::NodeClass) -> &'static [Field] {
    use crate::ast::NodeClass;
    match class {
        NodeClass::AExpr => &[Field::Lexpr, Field::Rexpr],
        NodeClass::BoolExpr => &[Field::Args],
        NodeClass::BooleanTest => &[Field::Arg],
        NodeClass::CaseExpr => &[Field::Args, Field::DefResult],
        NodeClass::CoalesceExpr => &[Field::Args],
        NodeClass::CommonTableExpr => &[Field::CteQuery],
        NodeClass::CreateTableAsStmt => &[Field::Query],
        NodeClass::DeleteStmt => &[Field::WhereClause, Field::UsingClause, Field::ReturningList],
        NodeClass::FuncCall => &[Field::Args, Field::AggOrder, Field::Over],
        NodeClass::InsertStmt => &[Field::SelectStmt, Field::OnConflictClause],
        NodeClass::JoinExpr => &[Field::Larg, Field::Rarg, Field::Quals],
        NodeClass::NullTest => &[Field::Arg],
        NodeClass::OnConflictClause => &[Field::WhereClause, Field::TargetList, Field::Action],
        NodeClass::RangeFunction => &[Field::Lateral],
        NodeClass::RangeSubselect => &[Field::Subquery],
        NodeClass::RangeTableSample => &[Field::Relation],
        NodeClass::RawStmt => &[Field::Stmt],
        NodeClass::ResTarget => &[Field::Val],
        NodeClass::SelectStmt => &[
            Field::DistinctClause,
            Field::FromClause,
            Field::GroupClause,
            Field::Larg,
            Field::LimitCount,
            Field::LimitOffset,
            Field::Rarg,
            Field::SortClause,
            Field::TargetList,
            Field::ValuesLists,
            Field::WhereClause,
            Field::WithClause,
        ],
        NodeClass::SortBy => &[Field::SortbyDir],
        NodeClass::SubLink => &[Field::Subselect],
        NodeClass::TypeCast => &[Field::Arg],
        NodeClass::UpdateStmt => &[Field::TargetList, Field::WhereClause],
        NodeClass::WindowDef => &[Field::PartitionClause, Field::OrderClause],
        NodeClass::WithClause => &[Field::Ctes],
        _ => &[],
    }
}

// ---------------------------------------------------------------------------
// Walking
// ---------------------------------------------------------------------------

/// The root statement list, viewed as a tuple of `RawStmt` nodes.
fn root_view(tree: &protobuf::ParseResult) -> TreeNode {
    TreeNode::List(
        tree.stmts
            .iter()
            .map(|raw| protobuf::Node {
                node: Some(NodeEnum::RawStmt(Box::new(raw.clone()))),
            })
            .collect(),
    )
}

fn step_into(current: TreeNode, step: Step, path: &Path) -> Result<TreeNode, AstError> {
    match (current, step) {
        (TreeNode::List(items), Step::Index(i)) => items
            .into_iter()
            .nth(i)
            .map(TreeNode::from_node)
            .ok_or_else(|| bad_step(step, &path.to_string())),
        (value, Step::Field(field)) => field_of(&value, field),
        (_, Step::Index(_)) => Err(bad_step(step, &path.to_string())),
    }
}

fn bad_step(step: Step, at: impl ToString) -> AstError {
    AstError::BadStep {
        step: step.to_string(),
        at: at.to_string(),
    }
}

fn no_field(class: impl ToString, field: Field) -> AstError {
    AstError::NoSuchField {
        class: class.to_string(),
        field,
    }
}

fn unwrap_raw_stmt(node: protobuf::Node) -> Result<protobuf::RawStmt, AstError> {
    match node.node {
        Some(NodeEnum::RawStmt(raw)) => Ok(*raw),
        _ => Err(AstError::Malformed(
            "statement list element is not a RawStmt".to_string(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Read accessors
// ---------------------------------------------------------------------------

fn opt_node(slot: &Option<Box<protobuf::Node>>) -> TreeNode {
    match slot {
        Some(node) => TreeNode::from_node(protobuf::Node::clone(node)),
        None => TreeNode::Null,
    }
}

fn node_list(items: &[protobuf::Node]) -> TreeNode {
    if items.is_empty() {
        TreeNode::Null
    } else {
        TreeNode::List(items.to_vec())
    }
}

fn opt_select(slot: &Option<Box<protobuf::SelectStmt>>) -> TreeNode {
    match slot {
        Some(select) => TreeNode::Node(protobuf::Node {
            node: Some(NodeEnum::SelectStmt(Box::new(protobuf::SelectStmt::clone(
                select,
            )))),
        }),
        None => TreeNode::Null,
    }
}

/// Field lookup on an AST node. One arm per (class, field) pair the rule
/// table can name.
fn get_field(inner: &NodeEnum, field: Field) -> Result<TreeNode, AstError> {
    match inner {
        NodeEnum::RawStmt(raw) => match field {
            Field::Stmt => Ok(opt_node(&raw.stmt)),
            _ => Err(no_field("RawStmt", field)),
        },
        NodeEnum::AExpr(x) => match field {
            Field::Lexpr => Ok(opt_node(&x.lexpr)),
            Field::Rexpr => Ok(opt_node(&x.rexpr)),
            _ => Err(no_field("AExpr", field)),
        },
        NodeEnum::BoolExpr(x) => match field {
            Field::Args => Ok(node_list(&x.args)),
            _ => Err(no_field("BoolExpr", field)),
        },
        NodeEnum::BooleanTest(x) => match field {
            Field::Arg => Ok(opt_node(&x.arg)),
            _ => Err(no_field("BooleanTest", field)),
        },
        NodeEnum::CaseExpr(x) => match field {
            Field::Args => Ok(node_list(&x.args)),
            Field::DefResult => Ok(opt_node(&x.defresult)),
            _ => Err(no_field("CaseExpr", field)),
        },
        NodeEnum::CoalesceExpr(x) => match field {
            Field::Args => Ok(node_list(&x.args)),
            _ => Err(no_field("CoalesceExpr", field)),
        },
        NodeEnum::CommonTableExpr(x) => match field {
            Field::CteQuery => Ok(opt_node(&x.ctequery)),
            _ => Err(no_field("CommonTableExpr", field)),
        },
        NodeEnum::CreateTableAsStmt(x) => match field {
            Field::Query => Ok(opt_node(&x.query)),
            _ => Err(no_field("CreateTableAsStmt", field)),
        },
        NodeEnum::DeleteStmt(x) => match field {
            Field::WhereClause => Ok(opt_node(&x.where_clause)),
            Field::UsingClause => Ok(node_list(&x.using_clause)),
            Field::ReturningList => Ok(node_list(&x.returning_list)),
            _ => Err(no_field("DeleteStmt", field)),
        },
        NodeEnum::FuncCall(x) => match field {
            Field::Args => Ok(node_list(&x.args)),
            Field::AggOrder => Ok(node_list(&x.agg_order)),
            Field::Over => Ok(match &x.over {
                Some(wd) => TreeNode::WindowDef(protobuf::WindowDef::clone(wd)),
                None => TreeNode::Null,
            }),
            _ => Err(no_field("FuncCall", field)),
        },
        NodeEnum::InsertStmt(x) => match field {
            Field::SelectStmt => Ok(opt_node(&x.select_stmt)),
            Field::OnConflictClause => Ok(match &x.on_conflict_clause {
                Some(occ) => TreeNode::OnConflict(protobuf::OnConflictClause::clone(occ)),
                None => TreeNode::Null,
            }),
            _ => Err(no_field("InsertStmt", field)),
        },
        NodeEnum::JoinExpr(x) => match field {
            Field::Larg => Ok(opt_node(&x.larg)),
            Field::Rarg => Ok(opt_node(&x.rarg)),
            Field::Quals => Ok(opt_node(&x.quals)),
            _ => Err(no_field("JoinExpr", field)),
        },
        NodeEnum::NullTest(x) => match field {
            Field::Arg => Ok(opt_node(&x.arg)),
            _ => Err(no_field("NullTest", field)),
        },
        NodeEnum::RangeFunction(x) => match field {
            // The flag counts as absent when false so `remove` skips it.
            Field::Lateral => Ok(if x.lateral {
                TreeNode::Bool(true)
            } else {
                TreeNode::Null
            }),
            _ => Err(no_field("RangeFunction", field)),
        },
        NodeEnum::RangeSubselect(x) => match field {
            Field::Subquery => Ok(opt_node(&x.subquery)),
            _ => Err(no_field("RangeSubselect", field)),
        },
        NodeEnum::RangeTableSample(x) => match field {
            Field::Relation => Ok(opt_node(&x.relation)),
            _ => Err(no_field("RangeTableSample", field)),
        },
        NodeEnum::ResTarget(x) => match field {
            Field::Val => Ok(opt_node(&x.val)),
            _ => Err(no_field("ResTarget", field)),
        },
        NodeEnum::SelectStmt(x) => match field {
            Field::DistinctClause => Ok(node_list(&x.distinct_clause)),
            Field::FromClause => Ok(node_list(&x.from_clause)),
            Field::GroupClause => Ok(node_list(&x.group_clause)),
            Field::Larg => Ok(opt_select(&x.larg)),
            Field::LimitCount => Ok(opt_node(&x.limit_count)),
            Field::LimitOffset => Ok(opt_node(&x.limit_offset)),
            Field::Rarg => Ok(opt_select(&x.rarg)),
            Field::SortClause => Ok(node_list(&x.sort_clause)),
            Field::TargetList => Ok(node_list(&x.target_list)),
            Field::ValuesLists => Ok(node_list(&x.values_lists)),
            Field::WhereClause => Ok(opt_node(&x.where_clause)),
            Field::WithClause => Ok(match &x.with_clause {
                Some(wc) => TreeNode::WithClause(protobuf::WithClause::clone(wc)),
                None => TreeNode::Null,
            }),
            _ => Err(no_field("SelectStmt", field)),
        },
        NodeEnum::SortBy(x) => match field {
            // SORTBY_DEFAULT (and the zero value) count as absent so
            // `remove` only fires on an explicit ASC/DESC.
            Field::SortbyDir => {
                if x.sortby_dir <= protobuf::SortByDir::SortbyDefault as i32 {
                    Ok(TreeNode::Null)
                } else {
                    Ok(TreeNode::Int(x.sortby_dir))
                }
            }
            _ => Err(no_field("SortBy", field)),
        },
        NodeEnum::SubLink(x) => match field {
            Field::Subselect => Ok(opt_node(&x.subselect)),
            _ => Err(no_field("SubLink", field)),
        },
        NodeEnum::TypeCast(x) => match field {
            Field::Arg => Ok(opt_node(&x.arg)),
            _ => Err(no_field("TypeCast", field)),
        },
        NodeEnum::UpdateStmt(x) => match field {
            Field::TargetList => Ok(node_list(&x.target_list)),
            Field::WhereClause => Ok(opt_node(&x.where_clause)),
            _ => Err(no_field("UpdateStmt", field)),
        },
        other => Err(no_field(format!("{other:?}"), field)),
    }
}

// ---------------------------------------------------------------------------
// Write accessors
// ---------------------------------------------------------------------------

fn set_in_node(
    node: &mut protobuf::Node,
    rest: &[Step],
    value: TreeNode,
) -> Result<(), AstError> {
    let Some(first) = rest.first() else {
        // Replace this node wholesale.
        return match value {
            TreeNode::Node(new) => {
                *node = new;
                Ok(())
            }
            TreeNode::List(items) => match &mut node.node {
                // A tuple replacing a List node mutates its items in place.
                Some(NodeEnum::List(list)) => {
                    list.items = items;
                    Ok(())
                }
                _ => Err(AstError::BadValue {
                    value: "tuple at non-tuple node",
                }),
            },
            _ => Err(AstError::BadValue { value: "non-node" }),
        };
    };

    match (first, &mut node.node) {
        (Step::Index(i), Some(NodeEnum::List(list))) => {
            let len = list.items.len();
            let item = list
                .items
                .get_mut(*i)
                .ok_or_else(|| bad_step(*first, format!("tuple of length {len}")))?;
            set_in_node(item, &rest[1..], value)
        }
        (Step::Field(field), Some(inner)) => set_field(inner, *field, &rest[1..], value),
        _ => Err(bad_step(*first, "node")),
    }
}

fn set_opt_node(
    slot: &mut Option<Box<protobuf::Node>>,
    rest: &[Step],
    value: TreeNode,
) -> Result<(), AstError> {
    if rest.is_empty() {
        match value {
            TreeNode::Null => *slot = None,
            TreeNode::Node(node) => *slot = Some(Box::new(node)),
            _ => {
                return Err(AstError::BadValue {
                    value: "non-node field",
                });
            }
        }
        return Ok(());
    }
    match slot {
        Some(node) => set_in_node(node, rest, value),
        None => Err(bad_step(rest[0], "absent field")),
    }
}

fn set_node_list(
    slot: &mut Vec<protobuf::Node>,
    rest: &[Step],
    value: TreeNode,
) -> Result<(), AstError> {
    let Some(first) = rest.first() else {
        match value {
            TreeNode::Null => slot.clear(),
            TreeNode::List(items) => *slot = items,
            _ => {
                return Err(AstError::BadValue {
                    value: "non-tuple field",
                });
            }
        }
        return Ok(());
    };
    match first {
        Step::Index(i) => {
            let len = slot.len();
            let item = slot
                .get_mut(*i)
                .ok_or_else(|| bad_step(*first, format!("tuple of length {len}")))?;
            set_in_node(item, &rest[1..], value)
        }
        Step::Field(_) => Err(bad_step(*first, "tuple")),
    }
}

fn set_in_with_clause(
    wc: &mut protobuf::WithClause,
    rest: &[Step],
    value: TreeNode,
) -> Result<(), AstError> {
    match rest.first() {
        Some(Step::Field(Field::Ctes)) => set_node_list(&mut wc.ctes, &rest[1..], value),
        Some(step) => Err(bad_step(*step, "WithClause")),
        None => Err(AstError::BadValue {
            value: "WithClause",
        }),
    }
}

fn set_in_window_def(
    wd: &mut protobuf::WindowDef,
    rest: &[Step],
    value: TreeNode,
) -> Result<(), AstError> {
    match rest.first() {
        Some(Step::Field(Field::PartitionClause)) => {
            set_node_list(&mut wd.partition_clause, &rest[1..], value)
        }
        Some(Step::Field(Field::OrderClause)) => {
            set_node_list(&mut wd.order_clause, &rest[1..], value)
        }
        Some(step) => Err(bad_step(*step, "WindowDef")),
        None => Err(AstError::BadValue { value: "WindowDef" }),
    }
}

fn set_in_on_conflict(
    occ: &mut protobuf::OnConflictClause,
    rest: &[Step],
    value: TreeNode,
) -> Result<(), AstError> {
    match rest.first() {
        Some(Step::Field(Field::WhereClause)) => {
            set_opt_node(&mut occ.where_clause, &rest[1..], value)
        }
        Some(Step::Field(Field::TargetList)) => {
            set_node_list(&mut occ.target_list, &rest[1..], value)
        }
        Some(Step::Field(Field::Action)) if rest.len() == 1 => match value {
            TreeNode::Int(code) => {
                occ.action = code;
                Ok(())
            }
            _ => Err(AstError::BadValue { value: "non-int" }),
        },
        Some(step) => Err(bad_step(*step, "OnConflictClause")),
        None => Err(AstError::BadValue {
            value: "OnConflictClause",
        }),
    }
}

/// Field update on an AST node; the write-side mirror of [`get_field`].
fn set_field(
    inner: &mut NodeEnum,
    field: Field,
    rest: &[Step],
    value: TreeNode,
) -> Result<(), AstError> {
    match inner {
        NodeEnum::RawStmt(x) => match field {
            Field::Stmt => set_opt_node(&mut x.stmt, rest, value),
            _ => Err(no_field("RawStmt", field)),
        },
        NodeEnum::AExpr(x) => match field {
            Field::Lexpr => set_opt_node(&mut x.lexpr, rest, value),
            Field::Rexpr => set_opt_node(&mut x.rexpr, rest, value),
            _ => Err(no_field("AExpr", field)),
        },
        NodeEnum::BoolExpr(x) => match field {
            Field::Args => set_node_list(&mut x.args, rest, value),
            _ => Err(no_field("BoolExpr", field)),
        },
        NodeEnum::BooleanTest(x) => match field {
            Field::Arg => set_opt_node(&mut x.arg, rest, value),
            _ => Err(no_field("BooleanTest", field)),
        },
        NodeEnum::CaseExpr(x) => match field {
            Field::Args => set_node_list(&mut x.args, rest, value),
            Field::DefResult => set_opt_node(&mut x.defresult, rest, value),
            _ => Err(no_field("CaseExpr", field)),
        },
        NodeEnum::CoalesceExpr(x) => match field {
            Field::Args => set_node_list(&mut x.args, rest, value),
            _ => Err(no_field("CoalesceExpr", field)),
        },
        NodeEnum::CommonTableExpr(x) => match field {
            Field::CteQuery => set_opt_node(&mut x.ctequery, rest, value),
            _ => Err(no_field("CommonTableExpr", field)),
        },
        NodeEnum::CreateTableAsStmt(x) => match field {
            Field::Query => set_opt_node(&mut x.query, rest, value),
            _ => Err(no_field("CreateTableAsStmt", field)),
        },
        NodeEnum::DeleteStmt(x) => match field {
            Field::WhereClause => set_opt_node(&mut x.where_clause, rest, value),
            Field::UsingClause => set_node_list(&mut x.using_clause, rest, value),
            Field::ReturningList => set_node_list(&mut x.returning_list, rest, value),
            _ => Err(no_field("DeleteStmt", field)),
        },
        NodeEnum::FuncCall(x) => match field {
            Field::Args => set_node_list(&mut x.args, rest, value),
            Field::AggOrder => set_node_list(&mut x.agg_order, rest, value),
            Field::Over => {
                if rest.is_empty() {
                    return match value {
                        TreeNode::Null => {
                            x.over = None;
                            Ok(())
                        }
                        TreeNode::WindowDef(wd) => {
                            x.over = Some(wd.into());
                            Ok(())
                        }
                        _ => Err(AstError::BadValue {
                            value: "non-window",
                        }),
                    };
                }
                match &mut x.over {
                    Some(wd) => set_in_window_def(wd, rest, value),
                    None => Err(bad_step(rest[0], "absent window")),
                }
            }
            _ => Err(no_field("FuncCall", field)),
        },
        NodeEnum::InsertStmt(x) => match field {
            Field::SelectStmt => set_opt_node(&mut x.select_stmt, rest, value),
            Field::OnConflictClause => {
                if rest.is_empty() {
                    return match value {
                        TreeNode::Null => {
                            x.on_conflict_clause = None;
                            Ok(())
                        }
                        TreeNode::OnConflict(occ) => {
                            x.on_conflict_clause = Some(occ.into());
                            Ok(())
                        }
                        _ => Err(AstError::BadValue {
                            value: "non-conflict-clause",
                        }),
                    };
                }
                match &mut x.on_conflict_clause {
                    Some(occ) => set_in_on_conflict(occ, rest, value),
                    None => Err(bad_step(rest[0], "absent conflict clause")),
                }
            }
            _ => Err(no_field("InsertStmt", field)),
        },
        NodeEnum::JoinExpr(x) => match field {
            Field::Larg => set_opt_node(&mut x.larg, rest, value),
            Field::Rarg => set_opt_node(&mut x.rarg, rest, value),
            Field::Quals => set_opt_node(&mut x.quals, rest, value),
            _ => Err(no_field("JoinExpr", field)),
        },
        NodeEnum::NullTest(x) => match field {
            Field::Arg => set_opt_node(&mut x.arg, rest, value),
            _ => Err(no_field("NullTest", field)),
        },
        NodeEnum::RangeFunction(x) => match field {
            Field::Lateral if rest.is_empty() => {
                x.lateral = matches!(value, TreeNode::Bool(true));
                Ok(())
            }
            _ => Err(no_field("RangeFunction", field)),
        },
        NodeEnum::RangeSubselect(x) => match field {
            Field::Subquery => set_opt_node(&mut x.subquery, rest, value),
            _ => Err(no_field("RangeSubselect", field)),
        },
        NodeEnum::RangeTableSample(x) => match field {
            Field::Relation => set_opt_node(&mut x.relation, rest, value),
            _ => Err(no_field("RangeTableSample", field)),
        },
        NodeEnum::ResTarget(x) => match field {
            Field::Val => set_opt_node(&mut x.val, rest, value),
            _ => Err(no_field("ResTarget", field)),
        },
        NodeEnum::SelectStmt(x) => match field {
            Field::DistinctClause => set_node_list(&mut x.distinct_clause, rest, value),
            Field::FromClause => set_node_list(&mut x.from_clause, rest, value),
            Field::GroupClause => set_node_list(&mut x.group_clause, rest, value),
            Field::LimitCount => set_opt_node(&mut x.limit_count, rest, value),
            Field::LimitOffset => set_opt_node(&mut x.limit_offset, rest, value),
            Field::SortClause => set_node_list(&mut x.sort_clause, rest, value),
            Field::TargetList => set_node_list(&mut x.target_list, rest, value),
            Field::ValuesLists => set_node_list(&mut x.values_lists, rest, value),
            Field::WhereClause => set_opt_node(&mut x.where_clause, rest, value),
            Field::WithClause => {
                if rest.is_empty() {
                    return match value {
                        TreeNode::Null => {
                            x.with_clause = None;
                            Ok(())
                        }
                        TreeNode::WithClause(wc) => {
                            x.with_clause = Some(wc.into());
                            Ok(())
                        }
                        _ => Err(AstError::BadValue {
                            value: "non-with-clause",
                        }),
                    };
                }
                match &mut x.with_clause {
                    Some(wc) => set_in_with_clause(wc, rest, value),
                    None => Err(bad_step(rest[0], "absent with clause")),
                }
            }
            _ => Err(no_field("SelectStmt", field)),
        },
        NodeEnum::SortBy(x) => match field {
            Field::SortbyDir if rest.is_empty() => {
                x.sortby_dir = match value {
                    TreeNode::Null => protobuf::SortByDir::SortbyDefault as i32,
                    TreeNode::Int(code) => code,
                    _ => {
                        return Err(AstError::BadValue { value: "non-int" });
                    }
                };
                Ok(())
            }
            _ => Err(no_field("SortBy", field)),
        },
        NodeEnum::SubLink(x) => match field {
            Field::Subselect => set_opt_node(&mut x.subselect, rest, value),
            _ => Err(no_field("SubLink", field)),
        },
        NodeEnum::TypeCast(x) => match field {
            Field::Arg => set_opt_node(&mut x.arg, rest, value),
            _ => Err(no_field("TypeCast", field)),
        },
        NodeEnum::UpdateStmt(x) => match field {
            Field::TargetList => set_node_list(&mut x.target_list, rest, value),
            Field::WhereClause => set_opt_node(&mut x.where_clause, rest, value),
            _ => Err(no_field("UpdateStmt", field)),
        },
        other => Err(no_field(format!("{other:?}"), field)),
    }
}
