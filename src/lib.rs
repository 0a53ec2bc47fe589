//! pg-query-reduce: a SQL test-case minimizer for PostgreSQL
//!
//! Given a SQL script that produces a specific result against a database
//! (typically an error), this library searches for a smaller script that
//! produces the same result. The search is directed by the parse tree:
//! a rule table assigns reduction strategies to AST node classes, candidate
//! rewrites are validated by executing them against the database, and the
//! loop converges on a fixed point.

pub mod ast;
pub mod config;
pub mod oracle;
pub mod output;
pub mod reduce;
pub mod rules;

// Re-export commonly used types
pub use ast::{Field, NodeClass, Path, Step, TreeNode};
pub use config::Config;
pub use oracle::{Oracle, Outcome, PgOracle, check_connection};
pub use output::Progress;
pub use reduce::{ReduceError, Report, run_reduce};
pub use rules::{Rule, RuleTable, Strategy};
