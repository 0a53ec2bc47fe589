//! AST value model and path-addressed access.
//!
//! The parse tree is `pg_query::protobuf::ParseResult`, addressed by
//! [`Path`]s. [`TreeNode`] is the value universe a path can resolve to:
//! ordinary nodes, tuples of nodes, a few typed protobuf messages that are
//! not `Node`-wrapped in their parents, scalars, and absence.

pub mod cursor;
pub mod path;

pub use self::cursor::{field_of, fields_of, get, set};
pub use self::path::{Field, Path, Step};

use pg_query::NodeEnum;
use pg_query::protobuf;
use strum_macros::{Display, EnumString};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AstError {
    #[error("node class {class} has no field `{field}`")]
    NoSuchField { class: String, field: Field },

    #[error("step `{step}` does not resolve at `{at}`")]
    BadStep { step: String, at: String },

    #[error("cannot install a {value} value at this position")]
    BadValue { value: &'static str },

    #[error("malformed parse tree: {0}")]
    Malformed(String),
}

/// Node classes the reduction engine knows about, named after the
/// `pg_query` AST variants. The rule table is keyed by these; a parse-tree
/// node whose variant has no class here is reported as a missing-rule
/// diagnostic and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum NodeClass {
    AConst,
    AExpr,
    AlterDatabaseSetStmt,
    AlterRoleSetStmt,
    BoolExpr,
    BooleanTest,
    CaseExpr,
    CoalesceExpr,
    ColumnRef,
    CommonTableExpr,
    CreateStmt,
    CreateTableAsStmt,
    DeleteStmt,
    DropStmt,
    FuncCall,
    InsertStmt,
    JoinExpr,
    NullTest,
    OnConflictClause,
    RangeFunction,
    RangeSubselect,
    RangeTableSample,
    RangeVar,
    RawStmt,
    ResTarget,
    SelectStmt,
    SortBy,
    SubLink,
    TypeCast,
    UpdateStmt,
    VariableSetStmt,
    WindowDef,
    WithClause,
}

/// A value addressed by a path.
///
/// Values are owned clones; the tree itself is never borrowed into, so a
/// rejected reduction cannot leave dangling state behind.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    /// Any AST node. Nodes wrapping `NodeEnum::List` are normalized to
    /// [`TreeNode::List`] instead.
    Node(protobuf::Node),
    /// An ordered tuple of nodes: a repeated field, a `List` node, or the
    /// root statement list.
    List(Vec<protobuf::Node>),
    /// `SelectStmt.withClause`.
    WithClause(protobuf::WithClause),
    /// `FuncCall.over`.
    WindowDef(protobuf::WindowDef),
    /// `InsertStmt.onConflictClause`.
    OnConflict(protobuf::OnConflictClause),
    /// Scalar enum codes (`OnConflictClause.action`, `SortBy.sortby_dir`).
    Int(i32),
    /// Scalar flags (`RangeFunction.lateral`).
    Bool(bool),
    /// Absence: a null field, an empty repeated field, a default scalar.
    Null,
}

impl TreeNode {
    /// Wrap a protobuf node, normalizing `List` wrappers to tuples.
    pub fn from_node(node: protobuf::Node) -> TreeNode {
        match node.node {
            Some(NodeEnum::List(list)) => TreeNode::List(list.items),
            Some(_) => TreeNode::Node(node),
            None => TreeNode::Null,
        }
    }

    /// Whether this value counts as present for `remove` checks and for
    /// enumeration. Empty tuples and default scalars are absent.
    pub fn is_present(&self) -> bool {
        !matches!(self, TreeNode::Null)
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, TreeNode::List(_))
    }

    /// The node class, when this value is a node of a known class.
    pub fn node_class(&self) -> Option<NodeClass> {
        match self {
            TreeNode::Node(node) => node.node.as_ref().and_then(node_class),
            TreeNode::WithClause(_) => Some(NodeClass::WithClause),
            TreeNode::WindowDef(_) => Some(NodeClass::WindowDef),
            TreeNode::OnConflict(_) => Some(NodeClass::OnConflictClause),
            TreeNode::List(_) | TreeNode::Int(_) | TreeNode::Bool(_) | TreeNode::Null => None,
        }
    }
}

/// Map an AST variant to its node class.
fn node_class(node: &NodeEnum) -> Option<NodeClass> {
    Some(match node {
        NodeEnum::AConst(_) => NodeClass::AConst,
        NodeEnum::AExpr(_) => NodeClass::AExpr,
        NodeEnum::AlterDatabaseSetStmt(_) => NodeClass::AlterDatabaseSetStmt,
        NodeEnum::AlterRoleSetStmt(_) => NodeClass::AlterRoleSetStmt,
        NodeEnum::BoolExpr(_) => NodeClass::BoolExpr,
        NodeEnum::BooleanTest(_) => NodeClass::BooleanTest,
        NodeEnum::CaseExpr(_) => NodeClass::CaseExpr,
        NodeEnum::CoalesceExpr(_) => NodeClass::CoalesceExpr,
        NodeEnum::ColumnRef(_) => NodeClass::ColumnRef,
        NodeEnum::CommonTableExpr(_) => NodeClass::CommonTableExpr,
        NodeEnum::CreateStmt(_) => NodeClass::CreateStmt,
        NodeEnum::CreateTableAsStmt(_) => NodeClass::CreateTableAsStmt,
        NodeEnum::DeleteStmt(_) => NodeClass::DeleteStmt,
        NodeEnum::DropStmt(_) => NodeClass::DropStmt,
        NodeEnum::FuncCall(_) => NodeClass::FuncCall,
        NodeEnum::InsertStmt(_) => NodeClass::InsertStmt,
        NodeEnum::JoinExpr(_) => NodeClass::JoinExpr,
        NodeEnum::NullTest(_) => NodeClass::NullTest,
        NodeEnum::OnConflictClause(_) => NodeClass::OnConflictClause,
        NodeEnum::RangeFunction(_) => NodeClass::RangeFunction,
        NodeEnum::RangeSubselect(_) => NodeClass::RangeSubselect,
        NodeEnum::RangeTableSample(_) => NodeClass::RangeTableSample,
        NodeEnum::RangeVar(_) => NodeClass::RangeVar,
        NodeEnum::RawStmt(_) => NodeClass::RawStmt,
        NodeEnum::ResTarget(_) => NodeClass::ResTarget,
        NodeEnum::SelectStmt(_) => NodeClass::SelectStmt,
        NodeEnum::SortBy(_) => NodeClass::SortBy,
        NodeEnum::SubLink(_) => NodeClass::SubLink,
        NodeEnum::TypeCast(_) => NodeClass::TypeCast,
        NodeEnum::UpdateStmt(_) => NodeClass::UpdateStmt,
        NodeEnum::VariableSetStmt(_) => NodeClass::VariableSetStmt,
        NodeEnum::WindowDef(_) => NodeClass::WindowDef,
        NodeEnum::WithClause(_) => NodeClass::WithClause,
        _ => return None,
    })
}

/// Build the SQL `NULL` literal node.
///
/// Obtained by parsing `SELECT NULL` and extracting the constant, so the
/// node shape always matches the linked libpg_query instead of a
/// hand-rolled protobuf value.
pub fn null_literal() -> Result<protobuf::Node, AstError> {
    let parsed = pg_query::parse("SELECT NULL")
        .map_err(|e| AstError::Malformed(format!("parsing NULL template: {e}")))?;

    parsed
        .protobuf
        .stmts
        .into_iter()
        .next()
        .and_then(|raw| raw.stmt)
        .and_then(|stmt| match stmt.node {
            Some(NodeEnum::SelectStmt(select)) => select.target_list.into_iter().next(),
            _ => None,
        })
        .and_then(|target| match target.node {
            Some(NodeEnum::ResTarget(res)) => res.val.map(|val| *val),
            _ => None,
        })
        .ok_or_else(|| AstError::Malformed("NULL template had an unexpected shape".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> protobuf::ParseResult {
        pg_query::parse(sql).expect("parse").protobuf
    }

    #[test]
    fn test_null_literal_deparses_as_null() {
        let tree = parse("SELECT 1");
        // Swap the constant for the NULL literal and deparse.
        let tree2 = set(
            &tree,
            &Path::root()
                .child(0)
                .child(Field::Stmt)
                .child(Field::TargetList)
                .child(0)
                .child(Field::Val),
            TreeNode::Node(null_literal().unwrap()),
        )
        .unwrap();
        assert_eq!(pg_query::deparse(&tree2).unwrap(), "SELECT NULL");
        // The original tree is untouched.
        assert_eq!(pg_query::deparse(&tree).unwrap(), "SELECT 1");
    }

    #[test]
    fn test_node_class_of_select() {
        let tree = parse("SELECT 1");
        let stmt = get(&tree, &Path::root().child(0).child(Field::Stmt)).unwrap();
        assert_eq!(stmt.node_class(), Some(NodeClass::SelectStmt));
    }

    #[test]
    fn test_list_nodes_normalize_to_tuples() {
        let tree = parse("VALUES (1), (2)");
        let lists = get(
            &tree,
            &Path::root()
                .child(0)
                .child(Field::Stmt)
                .child(Field::ValuesLists),
        )
        .unwrap();
        assert!(lists.is_tuple());
        // Each element is itself a List node, normalized to a tuple view.
        let inner = get(
            &tree,
            &Path::root()
                .child(0)
                .child(Field::Stmt)
                .child(Field::ValuesLists)
                .child(0),
        )
        .unwrap();
        assert!(inner.is_tuple());
    }
}
