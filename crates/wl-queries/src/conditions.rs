//! Filter conditions
//!
//! A condition is one clause of a filter: a field, an operator, a value, and
//! the connective joining it to the next condition. The serialized form is
//! the `config_json` format stored with every saved filter.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::fields::{Field, ValueShape};
use crate::operators::Operator;

/// Condition value: one string or an ordered list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Scalar(String),
    List(Vec<String>),
}

impl ConditionValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// The value a freshly selected field starts with
    pub fn empty_for(field: Field) -> Self {
        match field.value_shape() {
            ValueShape::List => Self::List(vec![]),
            ValueShape::Scalar | ValueShape::Any => Self::Scalar(String::new()),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            Self::Scalar(_) => None,
        }
    }

    /// Blank scalar or empty list
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Scalar(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    fn fits(&self, shape: ValueShape) -> bool {
        match self {
            Self::Scalar(_) => shape.accepts_scalar(),
            Self::List(_) => shape.accepts_list(),
        }
    }
}

impl Default for ConditionValue {
    fn default() -> Self {
        Self::List(vec![])
    }
}

/// Connective joining a condition to the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when a condition would break the field metadata rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("operator {operator} is not allowed for field {field}")]
    OperatorNotAllowed { field: Field, operator: Operator },

    #[error("field {field} expects a {expected} value")]
    ValueShape { field: Field, expected: &'static str },
}

/// A single clause of a filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Opaque identifier, unique per condition
    pub id: String,
    pub field: Field,
    pub operator: Operator,
    #[serde(default)]
    pub value: ConditionValue,
    /// Connective to the next condition; unused on the last one
    #[serde(default)]
    pub logic: Logic,
}

impl Condition {
    /// Create a validated condition with a fresh id
    pub fn try_new(
        field: Field,
        operator: Operator,
        value: ConditionValue,
    ) -> Result<Self, ConditionError> {
        validate_operator(field, operator)?;
        validate_value(field, &value)?;
        Ok(Self::unchecked(field, operator, value))
    }

    /// The condition a new builder row starts with
    pub fn empty() -> Self {
        Self::for_field(Field::WorklogAuthor)
    }

    /// Empty condition for a field, with the field's default operator
    pub fn for_field(field: Field) -> Self {
        Self::unchecked(field, field.default_operator(), ConditionValue::empty_for(field))
    }

    /// Hand-written clause passed through verbatim
    pub fn custom(clause: impl Into<String>) -> Self {
        Self::unchecked(Field::Custom, Operator::None, ConditionValue::Scalar(clause.into()))
    }

    /// Full-text search over the raw input
    pub fn full_text(text: impl Into<String>) -> Self {
        Self::unchecked(Field::Text, Operator::Contains, ConditionValue::Scalar(text.into()))
    }

    /// Build without checking the metadata table
    ///
    /// Used by the importer, which keeps whatever operator it recovered.
    pub(crate) fn unchecked(field: Field, operator: Operator, value: ConditionValue) -> Self {
        Self {
            id: new_condition_id(),
            field,
            operator,
            value,
            logic: Logic::And,
        }
    }

    pub fn with_logic(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self
    }

    /// Check operator and value shape against the field metadata
    pub fn validate(&self) -> Result<(), ConditionError> {
        validate_operator(self.field, self.operator)?;
        validate_value(self.field, &self.value)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

pub(crate) fn validate_operator(field: Field, operator: Operator) -> Result<(), ConditionError> {
    if field.allows(operator) {
        Ok(())
    } else {
        Err(ConditionError::OperatorNotAllowed { field, operator })
    }
}

pub(crate) fn validate_value(field: Field, value: &ConditionValue) -> Result<(), ConditionError> {
    let shape = field.value_shape();
    if value.fits(shape) {
        return Ok(());
    }
    let expected = match shape {
        ValueShape::List => "list",
        ValueShape::Scalar => "single",
        ValueShape::Any => "single or list",
    };
    Err(ConditionError::ValueShape { field, expected })
}

/// Fresh, never reused condition id
pub fn new_condition_id() -> String {
    Uuid::new_v4().to_string()
}
