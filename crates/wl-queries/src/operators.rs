//! Condition operators
//!
//! The literal JQL comparison tokens a condition can use, plus the `none`
//! sentinel carried by hand-written (`custom`) clauses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operators that can be applied to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Equals (=)
    #[serde(rename = "=")]
    Equals,
    /// Not equals (!=)
    #[serde(rename = "!=")]
    NotEquals,
    /// Greater than or equal (>=)
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    /// Less than or equal (<=)
    #[serde(rename = "<=")]
    LessThanOrEqual,
    /// Greater than (>)
    #[serde(rename = ">")]
    GreaterThan,
    /// Less than (<)
    #[serde(rename = "<")]
    LessThan,
    /// Contains (~)
    #[serde(rename = "~")]
    Contains,
    /// Does not contain (!~)
    #[serde(rename = "!~")]
    NotContains,
    /// Member of a list (in)
    #[serde(rename = "in", alias = "IN")]
    In,
    /// Not a member of a list (not in)
    #[serde(rename = "not in", alias = "NOT IN")]
    NotIn,
    /// Sentinel for raw clauses
    #[serde(rename = "none")]
    None,
}

impl Operator {
    /// Every operator, in the order used by the metadata table
    pub const ALL: [Operator; 11] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::GreaterThanOrEqual,
        Operator::LessThanOrEqual,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::Contains,
        Operator::NotContains,
        Operator::In,
        Operator::NotIn,
        Operator::None,
    ];

    /// Parse an operator token
    ///
    /// Case-insensitive; runs of whitespace inside `not in` are collapsed.
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        match normalized.as_str() {
            "=" => Some(Self::Equals),
            "!=" => Some(Self::NotEquals),
            ">=" => Some(Self::GreaterThanOrEqual),
            "<=" => Some(Self::LessThanOrEqual),
            ">" => Some(Self::GreaterThan),
            "<" => Some(Self::LessThan),
            "~" => Some(Self::Contains),
            "!~" => Some(Self::NotContains),
            "in" => Some(Self::In),
            "not in" => Some(Self::NotIn),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// The literal token written into a query
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::Contains => "~",
            Self::NotContains => "!~",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::None => "none",
        }
    }

    /// True when the token carries the `!` negation marker
    pub fn is_negated(&self) -> bool {
        self.as_str().contains('!')
    }

    /// `in` / `not in`
    pub fn is_membership(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
