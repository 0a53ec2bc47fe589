//! Terminal progress reporting.
//!
//! Verbose mode prints each candidate query followed by a ✔/✘ verdict,
//! colored when stdout is a terminal. Debug mode additionally dumps paths,
//! replacement values, and the parse tree. Missing-rule diagnostics are
//! always printed: they indicate a node class the rule table should learn
//! about.

use crate::ast::{Path, TreeNode};
use crate::oracle::Outcome;
use pg_query::protobuf;
use std::io::{self, IsTerminal, Write};

pub struct Progress {
    pub verbose: bool,
    pub debug: bool,
    colored: bool,
}

impl Progress {
    pub fn new(verbose: bool, debug: bool) -> Progress {
        let colored = io::stdout().is_terminal()
            && std::env::var("TERM").map(|term| term != "dumb").unwrap_or(true);
        Progress {
            verbose,
            debug,
            colored,
        }
    }

    /// No output at all; used by tests and library callers.
    pub fn quiet() -> Progress {
        Progress {
            verbose: false,
            debug: false,
            colored: false,
        }
    }

    /// Startup banner: the input, its regenerated form, and the recorded
    /// outcome every accepted reduction must preserve.
    pub fn banner(&self, input: &str, regenerated: &str, outcome: &Outcome) {
        if !self.verbose {
            return;
        }
        println!("Input query: {}", input.trim_end());
        println!("Regenerated: {regenerated}");
        if self.colored {
            println!("Query returns: \x1b[32m\u{2714}\x1b[0m \x1b[1m{outcome}\x1b[0m");
        } else {
            println!("Query returns: \u{2714} {outcome}");
        }
        println!();
    }

    pub fn dump_tree(&self, tree: &protobuf::ParseResult) {
        if self.debug {
            println!("Parse tree: {tree:#?}");
        }
    }

    pub fn attempt(&self, path: &Path, value: &TreeNode) {
        if self.debug {
            println!("setting {path} to {value:?}");
        }
    }

    /// The candidate query, printed without a newline so the verdict can
    /// follow on the same line.
    pub fn candidate(&self, query: &str) {
        if self.verbose {
            print!("{query}");
            let _ = io::stdout().flush();
        }
    }

    pub fn accepted(&self) {
        if !self.verbose {
            return;
        }
        if self.colored {
            println!(" \x1b[32m\u{2714}\x1b[0m");
        } else {
            println!(" \u{2714}");
        }
    }

    pub fn rejected(&self, outcome: &Outcome) {
        if !self.verbose {
            return;
        }
        if self.colored {
            println!(" \x1b[31m\u{2718}\x1b[0m {outcome}");
        } else {
            println!(" \u{2718} {outcome}");
        }
    }

    pub fn duplicate(&self, query: &str) {
        if self.debug {
            println!("query {query:?} was seen before, skipping");
        }
    }

    pub fn serialize_failed(&self, path: &Path, err: &pg_query::Error) {
        if self.debug {
            println!("candidate at {path} does not deparse, skipping: {err}");
        }
    }

    /// A node class the rule table does not know. The subtree is skipped,
    /// not fatal.
    pub fn missing_rule(&self, context: &str, path: &Path, node: &TreeNode) {
        eprintln!("{context}: no rule for the node at {path}: {node:?}");
        eprintln!("please file a bug report for this node class");
    }
}
