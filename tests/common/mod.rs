//! Shared helpers for the integration tests: a deterministic fake server
//! and SQL normalization.

use pg_query_reduce::{Oracle, Outcome};

/// How the fake server reports failures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TagMode {
    /// One shared SQLSTATE for every unresolved identifier, the model
    /// behind the rule-table test pairs (`use_sqlstate` behavior).
    SqlState,
    /// A per-identifier message naming the first unresolved identifier
    /// (first-error-line behavior).
    Message,
}

/// A fake server on which a fixed set of identifiers does not resolve;
/// every other query succeeds. Identifiers are matched as whole words,
/// case-insensitively, with single-quoted literals ignored.
pub struct FakeServer {
    unknown: Vec<String>,
    mode: TagMode,
    pub probes: Vec<String>,
}

impl FakeServer {
    pub fn new(unknown: &[&str], mode: TagMode) -> FakeServer {
        FakeServer {
            unknown: unknown.iter().map(|s| s.to_string()).collect(),
            mode,
            probes: Vec::new(),
        }
    }

    /// The default server: moo, foo and bar do not exist, one shared
    /// SQLSTATE.
    pub fn default_unknowns() -> FakeServer {
        FakeServer::new(&["moo", "foo", "bar"], TagMode::SqlState)
    }
}

impl Oracle for FakeServer {
    fn probe(&mut self, query: &str) -> Outcome {
        self.probes.push(query.to_string());

        // A real server rejects ungrammatical text before resolving any
        // identifier. Some candidates deparse to such text (e.g. UPDATE
        // with its SET list dropped), and they must not count as
        // reproducing an undefined-identifier failure.
        if pg_query::parse(query).is_err() {
            return Outcome::Error("42601".to_string());
        }

        let first_unknown = tokens(&strip_string_literals(query))
            .into_iter()
            .find(|token| self.unknown.contains(token));

        match (first_unknown, self.mode) {
            (None, _) => Outcome::NoError,
            (Some(_), TagMode::SqlState) => Outcome::Error("42703".to_string()),
            (Some(name), TagMode::Message) => {
                Outcome::Error(format!("column \"{name}\" does not exist"))
            }
        }
    }
}

fn tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            current.push(c.to_ascii_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn strip_string_literals(query: &str) -> String {
    let mut out = String::new();
    let mut in_string = false;
    for c in query.chars() {
        if c == '\'' {
            in_string = !in_string;
        } else if !in_string {
            out.push(c);
        }
    }
    out
}

/// Normalize SQL through a parse/deparse round trip, so expectations do
/// not depend on the deparser's whitespace and casing choices.
pub fn regen(sql: &str) -> String {
    pg_query::deparse(&pg_query::parse(sql).expect("parse").protobuf).expect("deparse")
}
