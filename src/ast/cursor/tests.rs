use super::*;
use crate::ast::{NodeClass, null_literal};

fn parse(sql: &str) -> protobuf::ParseResult {
    pg_query::parse(sql).expect("parse").protobuf
}

/// Normalize SQL through a parse/deparse round trip, so expectations do not
/// depend on the deparser's whitespace and casing choices.
fn regen(sql: &str) -> String {
    pg_query::deparse(&parse(sql)).expect("deparse")
}

fn deparse(tree: &protobuf::ParseResult) -> String {
    pg_query::deparse(tree).expect("deparse")
}

// -----------------------------------------------------------------------
// get
// -----------------------------------------------------------------------

#[test]
fn test_get_root_is_statement_tuple() {
    let tree = parse("select 1; select 2");
    let root = get(&tree, &Path::root()).unwrap();
    match root {
        TreeNode::List(items) => assert_eq!(items.len(), 2),
        other => panic!("expected tuple at root, got {other:?}"),
    }
}

#[test]
fn test_get_walks_fields_and_indexes() {
    let tree = parse("select 1 + moo");
    let path = Path::root()
        .child(0)
        .child(Field::Stmt)
        .child(Field::TargetList)
        .child(0)
        .child(Field::Val);
    let expr = get(&tree, &path).unwrap();
    assert_eq!(expr.node_class(), Some(NodeClass::AExpr));

    let lexpr = field_of(&expr, Field::Lexpr).unwrap();
    assert_eq!(lexpr.node_class(), Some(NodeClass::AConst));
    let rexpr = field_of(&expr, Field::Rexpr).unwrap();
    assert_eq!(rexpr.node_class(), Some(NodeClass::ColumnRef));
}

#[test]
fn test_get_absent_field_is_null() {
    let tree = parse("select 1");
    let stmt = get(&tree, &Path::root().child(0).child(Field::Stmt)).unwrap();
    assert!(!field_of(&stmt, Field::WhereClause).unwrap().is_present());
    assert!(!field_of(&stmt, Field::LimitCount).unwrap().is_present());
    // Empty repeated fields are absent too.
    assert!(!field_of(&stmt, Field::FromClause).unwrap().is_present());
}

#[test]
fn test_get_unknown_field_errors() {
    let tree = parse("select 1");
    let stmt = get(&tree, &Path::root().child(0).child(Field::Stmt)).unwrap();
    assert!(matches!(
        field_of(&stmt, Field::CteQuery),
        Err(AstError::NoSuchField { .. })
    ));
}

#[test]
fn test_get_out_of_range_index_errors() {
    let tree = parse("select 1");
    assert!(get(&tree, &Path::root().child(5)).is_err());
}

#[test]
fn test_get_typed_clause_fields() {
    let tree = parse("with a as (select 1) select from a");
    let stmt = get(&tree, &Path::root().child(0).child(Field::Stmt)).unwrap();
    let with = field_of(&stmt, Field::WithClause).unwrap();
    assert_eq!(with.node_class(), Some(NodeClass::WithClause));
    let ctes = field_of(&with, Field::Ctes).unwrap();
    assert!(ctes.is_tuple());

    let tree = parse("select count(*) over (partition by a)");
    let func = get(
        &tree,
        &Path::root()
            .child(0)
            .child(Field::Stmt)
            .child(Field::TargetList)
            .child(0)
            .child(Field::Val),
    )
    .unwrap();
    let over = field_of(&func, Field::Over).unwrap();
    assert_eq!(over.node_class(), Some(NodeClass::WindowDef));
    assert!(
        field_of(&over, Field::PartitionClause)
            .unwrap()
            .is_tuple()
    );
}

#[test]
fn test_get_on_conflict_action() {
    let tree = parse("insert into t values (1) on conflict (id) do update set id = 2");
    let stmt = get(&tree, &Path::root().child(0).child(Field::Stmt)).unwrap();
    let occ = field_of(&stmt, Field::OnConflictClause).unwrap();
    assert_eq!(occ.node_class(), Some(NodeClass::OnConflictClause));
    assert_eq!(
        field_of(&occ, Field::Action).unwrap(),
        TreeNode::Int(protobuf::OnConflictAction::OnconflictUpdate as i32)
    );
}

#[test]
fn test_sortby_dir_default_counts_as_absent() {
    let tree = parse("select from t order by a desc, b");
    let base = Path::root()
        .child(0)
        .child(Field::Stmt)
        .child(Field::SortClause);
    let desc = get(&tree, &base.child(0)).unwrap();
    assert!(field_of(&desc, Field::SortbyDir).unwrap().is_present());
    let plain = get(&tree, &base.child(1)).unwrap();
    assert!(!field_of(&plain, Field::SortbyDir).unwrap().is_present());
}

// -----------------------------------------------------------------------
// set
// -----------------------------------------------------------------------

#[test]
fn test_set_does_not_mutate_input() {
    let tree = parse("select 1, moo");
    let before = deparse(&tree);
    let path = Path::root()
        .child(0)
        .child(Field::Stmt)
        .child(Field::TargetList);
    let reduced = set(&tree, &path, TreeNode::Null).unwrap();
    assert_eq!(deparse(&tree), before);
    assert_eq!(deparse(&reduced), regen("select"));
}

#[test]
fn test_set_round_trips_at_enumerable_paths() {
    let queries = [
        "select 1 + moo",
        "select coalesce(1, bar)",
        "with a as (select moo) select from a",
        "insert into bar select from bar",
        "select from (select bar) sub",
        "values (1), (moo), (foo)",
        "select count(*) over (partition by bar, foo)",
        "delete from foo where bar returning moo",
    ];
    for sql in queries {
        let tree = parse(sql);
        let paths = [
            Path::root(),
            Path::root().child(0),
            Path::root().child(0).child(Field::Stmt),
        ];
        for path in paths {
            let value = get(&tree, &path).unwrap();
            let rebuilt = set(&tree, &path, value).unwrap();
            assert_eq!(rebuilt, tree, "round trip at {path} for {sql:?}");
        }
    }
}

#[test]
fn test_set_removes_optional_clause() {
    let tree = parse("delete from foo where bar");
    let path = Path::root()
        .child(0)
        .child(Field::Stmt)
        .child(Field::WhereClause);
    let reduced = set(&tree, &path, TreeNode::Null).unwrap();
    assert_eq!(deparse(&reduced), regen("delete from foo"));
}

#[test]
fn test_set_replaces_tuple_with_element_dropped() {
    let tree = parse("select foo, bar");
    let path = Path::root()
        .child(0)
        .child(Field::Stmt)
        .child(Field::TargetList);
    let TreeNode::List(items) = get(&tree, &path).unwrap() else {
        panic!("expected tuple");
    };
    let dropped: Vec<_> = items[1..].to_vec();
    let reduced = set(&tree, &path, TreeNode::List(dropped)).unwrap();
    assert_eq!(deparse(&reduced), regen("select bar"));
}

#[test]
fn test_set_inner_values_list_in_place() {
    let tree = parse("values (1, moo)");
    let inner = Path::root()
        .child(0)
        .child(Field::Stmt)
        .child(Field::ValuesLists)
        .child(0);
    let TreeNode::List(items) = get(&tree, &inner).unwrap() else {
        panic!("expected tuple");
    };
    let reduced = set(&tree, &inner, TreeNode::List(items[1..].to_vec())).unwrap();
    assert_eq!(deparse(&reduced), regen("values (moo)"));
}

#[test]
fn test_set_root_drops_statement() {
    let tree = parse("create table bar(id int); insert into bar values (foo)");
    let TreeNode::List(stmts) = get(&tree, &Path::root()).unwrap() else {
        panic!("expected tuple at root");
    };
    let reduced = set(&tree, &Path::root(), TreeNode::List(stmts[1..].to_vec())).unwrap();
    assert_eq!(deparse(&reduced), regen("insert into bar values (foo)"));
}

#[test]
fn test_set_statement_slot_installs_subquery() {
    let tree = parse("insert into bar select from bar");
    let stmt_path = Path::root().child(0).child(Field::Stmt);
    let stmt = get(&tree, &stmt_path).unwrap();
    let select = field_of(&stmt, Field::SelectStmt).unwrap();
    let reduced = set(&tree, &stmt_path, select).unwrap();
    assert_eq!(deparse(&reduced), regen("select from bar"));
}

#[test]
fn test_set_null_literal_in_expression() {
    let tree = parse("select 1 + moo");
    let path = Path::root()
        .child(0)
        .child(Field::Stmt)
        .child(Field::TargetList)
        .child(0)
        .child(Field::Val);
    let reduced = set(&tree, &path, TreeNode::Node(null_literal().unwrap())).unwrap();
    assert_eq!(deparse(&reduced), regen("select null"));
}

#[test]
fn test_set_sortby_dir_to_default() {
    let tree = parse("select from t order by a desc");
    let path = Path::root()
        .child(0)
        .child(Field::Stmt)
        .child(Field::SortClause)
        .child(0)
        .child(Field::SortbyDir);
    let reduced = set(&tree, &path, TreeNode::Null).unwrap();
    assert_eq!(deparse(&reduced), regen("select from t order by a"));
}

#[test]
fn test_set_on_conflict_action_to_nothing() {
    let tree = parse("insert into t values (1) on conflict (id) do update set id = 2");
    let path = Path::root()
        .child(0)
        .child(Field::Stmt)
        .child(Field::OnConflictClause)
        .child(Field::Action);
    let reduced = set(
        &tree,
        &path,
        TreeNode::Int(protobuf::OnConflictAction::OnconflictNothing as i32),
    )
    .unwrap();
    assert_eq!(
        deparse(&reduced),
        regen("insert into t values (1) on conflict (id) do nothing")
    );
}

#[test]
fn test_set_rejects_bad_targets() {
    let tree = parse("select 1");
    // Root can only be replaced by a tuple of statements.
    assert!(set(&tree, &Path::root(), TreeNode::Null).is_err());
    // A field step on the statement list is malformed.
    let path = Path::root().child(Field::Stmt);
    assert!(set(&tree, &path, TreeNode::Null).is_err());
}

// -----------------------------------------------------------------------
// fields_of
// -----------------------------------------------------------------------

#[test]
fn test_fields_of_matches_registry() {
    assert!(fields_of(NodeClass::SelectStmt).contains(&Field::TargetList));
    assert!(fields_of(NodeClass::AExpr).contains(&Field::Lexpr));
    assert!(fields_of(NodeClass::AConst).is_empty());
    assert!(fields_of(NodeClass::DropStmt).is_empty());
}
