//! Query importer
//!
//! Best-effort recovery of a condition list from raw JQL text. The input is
//! split on top-level looking ` AND ` tokens and each clause is matched
//! against `<field> <operator> <value>`. Anything that does not fit becomes a
//! `custom` condition carrying the clause verbatim, so the caller always gets
//! something editable.
//!
//! The split is purely lexical: a quoted `"a AND b"` literal or a
//! parenthesized OR-group is cut in two, and OR joins are never recovered.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

use crate::conditions::{Condition, ConditionValue};
use crate::fields::{Field, ValueShape};
use crate::operators::Operator;

static AND_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+AND\s+").expect("valid AND delimiter pattern"));

static CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-zA-Z]+)\s*(=|!=|>=|<=|>|<|~|!~|in|not\s+in)\s*(.+)$")
        .expect("valid clause pattern")
});

const QUOTES: &[char] = &['\'', '"'];

/// Import failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("no conditions could be recovered from the query")]
    NoConditions,
}

/// Recovers conditions from query text
///
/// `LexicalImporter` is the regex heuristic; a grammar-based parser can
/// implement the same trait.
pub trait QueryImporter: Send + Sync {
    fn import(&self, text: &str) -> Result<Vec<Condition>, ImportError>;

    /// Import, or fall back to one full-text condition over the raw input
    fn import_or_fallback(&self, text: &str) -> Vec<Condition> {
        match self.import(text) {
            Ok(conditions) => conditions,
            Err(err) => {
                debug!(error = %err, "import failed, using full-text fallback");
                vec![Condition::full_text(text)]
            }
        }
    }
}

/// Regex-driven clause recovery
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalImporter;

impl QueryImporter for LexicalImporter {
    fn import(&self, text: &str) -> Result<Vec<Condition>, ImportError> {
        let conditions: Vec<Condition> = AND_DELIMITER
            .split(text)
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .map(import_clause)
            .collect();

        if conditions.is_empty() {
            return Err(ImportError::NoConditions);
        }
        Ok(conditions)
    }
}

/// Import with the default lexical importer
pub fn import_query(text: &str) -> Result<Vec<Condition>, ImportError> {
    LexicalImporter.import(text)
}

/// Import with the default lexical importer, falling back to full text
pub fn import_or_fallback(text: &str) -> Vec<Condition> {
    LexicalImporter.import_or_fallback(text)
}

fn import_clause(clause: &str) -> Condition {
    let Some(captures) = CLAUSE.captures(clause) else {
        debug!(clause, "clause did not match, keeping it as custom");
        return Condition::custom(clause);
    };

    let name = &captures[1];
    let field = match Field::from_str(name) {
        Some(field) if field != Field::Custom => field,
        _ => {
            debug!(clause, field = name, "unsupported field, keeping clause as custom");
            return Condition::custom(clause);
        }
    };
    let Some(operator) = Operator::from_str(&captures[2]) else {
        return Condition::custom(clause);
    };

    let value = fit_shape(field, parse_value(captures[3].trim()));
    Condition::unchecked(field, operator, value)
}

fn parse_value(raw: &str) -> ConditionValue {
    match raw.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => ConditionValue::List(
            inner
                .split(',')
                .map(|item| strip_quotes(item.trim()).to_string())
                .collect(),
        ),
        None => ConditionValue::Scalar(strip_quotes(raw).to_string()),
    }
}

/// Drop one leading and one trailing quote, independently
fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix(QUOTES).unwrap_or(value);
    value.strip_suffix(QUOTES).unwrap_or(value)
}

/// Coerce a recovered value into the shape the field accepts
fn fit_shape(field: Field, value: ConditionValue) -> ConditionValue {
    match (field.value_shape(), value) {
        (ValueShape::List, ConditionValue::Scalar(s)) if s.trim().is_empty() => {
            ConditionValue::List(vec![])
        }
        (ValueShape::List, ConditionValue::Scalar(s)) => ConditionValue::List(vec![s]),
        (ValueShape::Scalar, ConditionValue::List(items)) => ConditionValue::Scalar(items.join(", ")),
        (_, value) => value,
    }
}
