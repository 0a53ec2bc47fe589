//! Pre-order enumeration of reduction candidate paths.

use crate::ast::cursor::field_of;
use crate::ast::{self, Field, NodeClass, Path, TreeNode};
use crate::output::Progress;
use crate::rules::RuleTable;
use pg_query::protobuf;

/// Enumerate every path at which a reduction might be attempted, root
/// first. The list is materialized per pass: paths never survive an
/// accepted reduction, so the caller re-enumerates from the root after
/// every change.
pub fn enumerate_paths(
    tree: &protobuf::ParseResult,
    rules: &RuleTable,
    progress: &Progress,
) -> Vec<Path> {
    let mut paths = Vec::new();
    let Ok(root) = ast::get(tree, &Path::root()) else {
        return paths;
    };
    walk(&root, Path::root(), rules, progress, &mut paths);
    paths
}

fn walk(
    node: &TreeNode,
    path: Path,
    rules: &RuleTable,
    progress: &Progress,
    out: &mut Vec<Path>,
) {
    out.push(path.clone());

    if let TreeNode::List(items) = node {
        for (i, item) in items.iter().enumerate() {
            let child = TreeNode::from_node(item.clone());
            // NIL list entries (e.g. plain DISTINCT) have nothing to reduce.
            if child.is_present() {
                walk(&child, path.child(i), rules, progress, out);
            }
        }
        return;
    }

    let Some(class) = node.node_class() else {
        progress.missing_rule("enumerate_paths", &path, node);
        return;
    };

    // CASE is not table-driven; the reducer has dedicated moves for it.
    // Enumeration still covers the arms and the default result.
    if class == NodeClass::CaseExpr {
        for field in [Field::Args, Field::DefResult] {
            if let Ok(child) = field_of(node, field)
                && child.is_present()
            {
                walk(&child, path.child(field), rules, progress, out);
            }
        }
        return;
    }

    let Some(rule) = rules.get(class) else {
        progress.missing_rule("enumerate_paths", &path, node);
        return;
    };

    for field in rule.descend_fields() {
        if let Ok(child) = field_of(node, field)
            && child.is_present()
        {
            walk(&child, path.child(field), rules, progress, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths_for(sql: &str) -> Vec<String> {
        let tree = pg_query::parse(sql).expect("parse").protobuf;
        let rules = RuleTable::builtin().unwrap();
        enumerate_paths(&tree, &rules, &Progress::quiet())
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    #[test]
    fn test_preorder_for_simple_expression() {
        assert_eq!(
            paths_for("select 1 + moo"),
            vec![
                "<root>",
                "0",
                "0.stmt",
                "0.stmt.targetList",
                "0.stmt.targetList.0",
                "0.stmt.targetList.0.val",
                "0.stmt.targetList.0.val.lexpr",
                "0.stmt.targetList.0.val.rexpr",
            ],
        );
    }

    #[test]
    fn test_fields_in_rule_order() {
        // DeleteStmt descends whereClause, usingClause, returningList in
        // the order the rule lists them.
        assert_eq!(
            paths_for("delete from t using u where x returning y"),
            vec![
                "<root>",
                "0",
                "0.stmt",
                "0.stmt.whereClause",
                "0.stmt.usingClause",
                "0.stmt.usingClause.0",
                "0.stmt.returningList",
                "0.stmt.returningList.0",
                "0.stmt.returningList.0.val",
            ],
        );
    }

    #[test]
    fn test_multiple_statements_in_index_order() {
        let paths = paths_for("select 1; select 2");
        assert_eq!(paths[0], "<root>");
        assert_eq!(paths[1], "0");
        assert!(paths.contains(&"1.stmt".to_string()));
        let first = paths.iter().position(|p| p == "0.stmt").unwrap();
        let second = paths.iter().position(|p| p == "1.stmt").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_case_expr_special_case() {
        let paths = paths_for("select case when moo then 1 else bar end");
        let base = "0.stmt.targetList.0.val";
        assert!(paths.contains(&base.to_string()));
        assert!(paths.contains(&format!("{base}.args")));
        // The CaseWhen arm is yielded even though no rule covers it.
        assert!(paths.contains(&format!("{base}.args.0")));
        assert!(paths.contains(&format!("{base}.defresult")));
        // Nothing below the arm is enumerated.
        assert!(!paths.iter().any(|p| p.starts_with(&format!("{base}.args.0."))));
    }

    #[test]
    fn test_values_lists_nested_tuples() {
        let paths = paths_for("values (1), (moo)");
        assert!(paths.contains(&"0.stmt.valuesLists".to_string()));
        assert!(paths.contains(&"0.stmt.valuesLists.0".to_string()));
        assert!(paths.contains(&"0.stmt.valuesLists.0.0".to_string()));
        assert!(paths.contains(&"0.stmt.valuesLists.1.0".to_string()));
    }

    #[test]
    fn test_no_descent_below_unlisted_classes() {
        // RangeVar has an empty rule: the table name is never descended into.
        let paths = paths_for("select from moo");
        assert!(paths.contains(&"0.stmt.fromClause.0".to_string()));
        assert!(!paths.iter().any(|p| p.starts_with("0.stmt.fromClause.0.")));
    }

    #[test]
    fn test_plain_distinct_nil_entry_is_skipped() {
        // Plain DISTINCT is a distinctClause holding one NIL entry; the
        // entry itself yields no path.
        let paths = paths_for("select distinct foo");
        assert!(paths.contains(&"0.stmt.distinctClause".to_string()));
        assert!(!paths.contains(&"0.stmt.distinctClause.0".to_string()));
    }
}
