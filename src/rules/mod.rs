//! The reduction rule table.
//!
//! A static dictionary from node class to the reduction strategies that may
//! be attempted at nodes of that class, loaded from the embedded YAML in
//! `reduction_rules.yaml`. The YAML also carries per-class test pairs that
//! the integration harness replays against a fake oracle.
//!
//! Strategies form a closed set; every field name in the YAML is checked
//! against the cursor's field registry at load time, so a typo is a startup
//! error rather than a silent no-op during a run.

use crate::ast::cursor::fields_of;
use crate::ast::{Field, NodeClass};
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use strum_macros::Display;
use thiserror::Error;

const RULES_YAML: &str = include_str!("reduction_rules.yaml");

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("YAML parse error in rule table: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown node class `{0}` in rule table")]
    UnknownClass(String),

    #[error("unknown field `{field}` under {class}.{strategy}")]
    UnknownField {
        class: NodeClass,
        strategy: Strategy,
        field: String,
    },

    #[error("field `{field}` does not exist on node class {class}")]
    MissingField { class: NodeClass, field: Field },
}

/// The closed set of reduction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    TryNull,
    Remove,
    Descend,
    Pullup,
    PullupTupleElements,
    ReduceNonemptyTuple,
    Replace,
}

/// One `(input, expected)` pair from the rule table, replayed by the test
/// harness. `expected` is SQL text; comparisons normalize both sides
/// through a parse/deparse round trip.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected: String,
}

/// Raw YAML shape of one rule, before field validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSpec {
    #[serde(default)]
    try_null: bool,
    #[serde(default)]
    remove: Vec<String>,
    #[serde(default)]
    descend: Vec<String>,
    #[serde(default)]
    pullup: Vec<String>,
    #[serde(default)]
    pullup_tuple_elements: Vec<String>,
    #[serde(default)]
    reduce_nonempty_tuple: Vec<String>,
    #[serde(default)]
    replace: Vec<String>,
    #[serde(default)]
    tests: Vec<TestCase>,
}

/// The validated reduction rule for one node class.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub try_null: bool,
    pub remove: Vec<Field>,
    pub descend: Vec<Field>,
    pub pullup: Vec<Field>,
    pub pullup_tuple_elements: Vec<Field>,
    pub reduce_nonempty_tuple: Vec<Field>,
    pub replace: Vec<Field>,
    pub tests: Vec<TestCase>,
}

impl Rule {
    fn build(class: NodeClass, spec: RuleSpec) -> Result<Rule, RuleError> {
        Ok(Rule {
            try_null: spec.try_null,
            remove: parse_fields(class, Strategy::Remove, spec.remove)?,
            descend: parse_fields(class, Strategy::Descend, spec.descend)?,
            pullup: parse_fields(class, Strategy::Pullup, spec.pullup)?,
            pullup_tuple_elements: parse_fields(
                class,
                Strategy::PullupTupleElements,
                spec.pullup_tuple_elements,
            )?,
            reduce_nonempty_tuple: parse_fields(
                class,
                Strategy::ReduceNonemptyTuple,
                spec.reduce_nonempty_tuple,
            )?,
            replace: parse_fields(class, Strategy::Replace, spec.replace)?,
            tests: spec.tests,
        })
    }

    /// Fields the enumerator recurses into, in rule order: `pullup`,
    /// `descend`, `pullup_tuple_elements`, `reduce_nonempty_tuple`. A field
    /// listed under several strategies is visited once.
    pub fn descend_fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        for field in self
            .pullup
            .iter()
            .chain(&self.descend)
            .chain(&self.pullup_tuple_elements)
            .chain(&self.reduce_nonempty_tuple)
        {
            if !fields.contains(field) {
                fields.push(*field);
            }
        }
        fields
    }
}

fn parse_fields(
    class: NodeClass,
    strategy: Strategy,
    names: Vec<String>,
) -> Result<Vec<Field>, RuleError> {
    names
        .into_iter()
        .map(|name| {
            let field = Field::from_str(&name).map_err(|_| RuleError::UnknownField {
                class,
                strategy,
                field: name.clone(),
            })?;
            if !fields_of(class).contains(&field) {
                return Err(RuleError::MissingField { class, field });
            }
            Ok(field)
        })
        .collect()
}

/// The full rule table.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: HashMap<NodeClass, Rule>,
}

impl RuleTable {
    /// Load and validate the embedded rule table.
    pub fn builtin() -> Result<RuleTable, RuleError> {
        RuleTable::from_yaml(RULES_YAML)
    }

    /// Load a rule table from YAML text.
    pub fn from_yaml(source: &str) -> Result<RuleTable, RuleError> {
        let specs: HashMap<String, RuleSpec> = serde_yaml::from_str(source)?;
        let mut rules = HashMap::new();
        for (class_name, spec) in specs {
            let class = NodeClass::from_str(&class_name)
                .map_err(|_| RuleError::UnknownClass(class_name.clone()))?;
            rules.insert(class, Rule::build(class, spec)?);
        }
        Ok(RuleTable { rules })
    }

    /// The rule for a node class, if the class is listed. An absent class
    /// means no reduction and no descent below such nodes.
    pub fn get(&self, class: NodeClass) -> Option<&Rule> {
        self.rules.get(&class)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeClass, &Rule)> {
        self.rules.iter().map(|(class, rule)| (*class, rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
