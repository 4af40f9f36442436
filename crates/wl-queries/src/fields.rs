//! Field metadata
//!
//! The fixed set of fields the builder knows about, the operators each one
//! accepts, and the value shape each one expects. The compiler, the importer,
//! and the condition document all consult this table.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::operators::Operator;

/// Fields a condition can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    WorklogAuthor,
    WorklogDate,
    Project,
    Issuetype,
    Parent,
    UpdatedDate,
    CreatedDate,
    Resolution,
    Text,
    IssueFunction,
    Key,
    Summary,
    Comment,
    /// Hand-written clause, passed through verbatim
    Custom,
}

/// Which `ConditionValue` variants a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Single string only
    Scalar,
    /// List of strings only
    List,
    /// Either; several values turn a scalar into a list
    Any,
}

impl ValueShape {
    pub fn accepts_scalar(&self) -> bool {
        matches!(self, Self::Scalar | Self::Any)
    }

    pub fn accepts_list(&self) -> bool {
        matches!(self, Self::List | Self::Any)
    }
}

const AUTHOR_OPERATORS: &[Operator] = &[Operator::In, Operator::NotIn];
const DATE_OPERATORS: &[Operator] = &[
    Operator::GreaterThanOrEqual,
    Operator::LessThanOrEqual,
    Operator::GreaterThan,
    Operator::LessThan,
    Operator::Equals,
];
const PROJECT_OPERATORS: &[Operator] = &[Operator::Equals, Operator::NotEquals, Operator::In];
const EQUALS_OR_IN: &[Operator] = &[Operator::Equals, Operator::In];
const EQUALS_OR_NOT: &[Operator] = &[Operator::Equals, Operator::NotEquals];
const TEXT_OPERATORS: &[Operator] = &[Operator::Contains, Operator::NotContains];
const IN_ONLY: &[Operator] = &[Operator::In];
const CONTAINS_ONLY: &[Operator] = &[Operator::Contains];
const CUSTOM_OPERATORS: &[Operator] = &[Operator::None];

impl Field {
    /// Every field, in display order
    pub const ALL: [Field; 14] = [
        Field::WorklogAuthor,
        Field::WorklogDate,
        Field::Project,
        Field::Issuetype,
        Field::Parent,
        Field::UpdatedDate,
        Field::CreatedDate,
        Field::Resolution,
        Field::Text,
        Field::IssueFunction,
        Field::Key,
        Field::Summary,
        Field::Comment,
        Field::Custom,
    ];

    /// Parse a field name (exact case, as written in JQL)
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorklogAuthor => "worklogAuthor",
            Self::WorklogDate => "worklogDate",
            Self::Project => "project",
            Self::Issuetype => "issuetype",
            Self::Parent => "parent",
            Self::UpdatedDate => "updatedDate",
            Self::CreatedDate => "createdDate",
            Self::Resolution => "resolution",
            Self::Text => "text",
            Self::IssueFunction => "issueFunction",
            Self::Key => "key",
            Self::Summary => "summary",
            Self::Comment => "comment",
            Self::Custom => "custom",
        }
    }

    /// Operators accepted by this field; the first one is the default
    pub fn allowed_operators(&self) -> &'static [Operator] {
        match self {
            Self::WorklogAuthor => AUTHOR_OPERATORS,
            Self::WorklogDate | Self::UpdatedDate | Self::CreatedDate => DATE_OPERATORS,
            Self::Project => PROJECT_OPERATORS,
            Self::Issuetype | Self::Key => EQUALS_OR_IN,
            Self::Parent | Self::Resolution => EQUALS_OR_NOT,
            Self::Text | Self::Summary => TEXT_OPERATORS,
            Self::IssueFunction => IN_ONLY,
            Self::Comment => CONTAINS_ONLY,
            Self::Custom => CUSTOM_OPERATORS,
        }
    }

    pub fn default_operator(&self) -> Operator {
        self.allowed_operators()[0]
    }

    pub fn allows(&self, operator: Operator) -> bool {
        self.allowed_operators().contains(&operator)
    }

    pub fn value_shape(&self) -> ValueShape {
        match self {
            Self::WorklogAuthor => ValueShape::List,
            Self::WorklogDate | Self::UpdatedDate | Self::CreatedDate | Self::Custom => {
                ValueShape::Scalar
            }
            _ => ValueShape::Any,
        }
    }

    /// Fields whose values are calendar dates (or relative date expressions)
    pub fn is_date(&self) -> bool {
        matches!(self, Self::WorklogDate | Self::UpdatedDate | Self::CreatedDate)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
