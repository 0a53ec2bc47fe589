//! Paths: addressable locations in a parse tree.
//!
//! A path is a sequence of steps from the root of the statement list down to
//! a node, where each step is either a named field of a node or an index
//! into a tuple of nodes. The empty path denotes the root.

use std::fmt;
use strum_macros::{Display, EnumString};

/// A named field that can appear as a path step.
///
/// The string forms are PostgreSQL's own field names, exactly as they appear
/// in the rule table YAML (`lexpr`, `targetList`, `sortby_dir`, ...). The
/// enum is closed: a field name in the YAML that does not parse into a
/// variant is a startup error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Field {
    #[strum(serialize = "action")]
    Action,
    #[strum(serialize = "agg_order")]
    AggOrder,
    #[strum(serialize = "arg")]
    Arg,
    #[strum(serialize = "args")]
    Args,
    #[strum(serialize = "ctequery")]
    CteQuery,
    #[strum(serialize = "ctes")]
    Ctes,
    #[strum(serialize = "defresult")]
    DefResult,
    #[strum(serialize = "distinctClause")]
    DistinctClause,
    #[strum(serialize = "fromClause")]
    FromClause,
    #[strum(serialize = "groupClause")]
    GroupClause,
    #[strum(serialize = "larg")]
    Larg,
    #[strum(serialize = "lateral")]
    Lateral,
    #[strum(serialize = "lexpr")]
    Lexpr,
    #[strum(serialize = "limitCount")]
    LimitCount,
    #[strum(serialize = "limitOffset")]
    LimitOffset,
    #[strum(serialize = "onConflictClause")]
    OnConflictClause,
    #[strum(serialize = "orderClause")]
    OrderClause,
    #[strum(serialize = "over")]
    Over,
    #[strum(serialize = "partitionClause")]
    PartitionClause,
    #[strum(serialize = "quals")]
    Quals,
    #[strum(serialize = "query")]
    Query,
    #[strum(serialize = "rarg")]
    Rarg,
    #[strum(serialize = "relation")]
    Relation,
    #[strum(serialize = "returningList")]
    ReturningList,
    #[strum(serialize = "rexpr")]
    Rexpr,
    #[strum(serialize = "selectStmt")]
    SelectStmt,
    #[strum(serialize = "sortClause")]
    SortClause,
    #[strum(serialize = "sortby_dir")]
    SortbyDir,
    #[strum(serialize = "stmt")]
    Stmt,
    #[strum(serialize = "subquery")]
    Subquery,
    #[strum(serialize = "subselect")]
    Subselect,
    #[strum(serialize = "targetList")]
    TargetList,
    #[strum(serialize = "usingClause")]
    UsingClause,
    #[strum(serialize = "val")]
    Val,
    #[strum(serialize = "valuesLists")]
    ValuesLists,
    #[strum(serialize = "whereClause")]
    WhereClause,
    #[strum(serialize = "withClause")]
    WithClause,
}

/// One step of a path: a named field or a tuple index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Field(Field),
    Index(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Field(field) => write!(f, "{field}"),
            Step::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<Field> for Step {
    fn from(field: Field) -> Self {
        Step::Field(field)
    }
}

impl From<usize> for Step {
    fn from(i: usize) -> Self {
        Step::Index(i)
    }
}

/// A location in the parse tree, as a sequence of steps from the root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path(Vec<Step>);

impl Path {
    /// The empty path, denoting the root statement list.
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path extended by one step.
    pub fn child(&self, step: impl Into<Step>) -> Self {
        let mut steps = self.0.clone();
        steps.push(step.into());
        Path(steps)
    }

    /// The path one step up, or `None` at the root.
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// The prefix of this path up to and including the `stmt` step, i.e. the
    /// statement slot of the enclosing `RawStmt`. This is where `replace`
    /// strategies install their subnode.
    pub fn statement_slot(&self) -> Option<Path> {
        self.0
            .iter()
            .position(|s| *s == Step::Field(Field::Stmt))
            .map(|pos| Path(self.0[..=pos].to_vec()))
    }
}

impl From<Vec<Step>> for Path {
    fn from(steps: Vec<Step>) -> Self {
        Path(steps)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
