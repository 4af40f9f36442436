//! Condition Builder
//!
//! Provides a fluent API for assembling condition lists in code.

use crate::compiler::compile;
use crate::conditions::{Condition, ConditionValue, Logic};
use crate::fields::Field;
use crate::operators::Operator;

/// Builder for constructing condition lists fluently
#[derive(Debug, Default)]
pub struct ConditionBuilder {
    conditions: Vec<Condition>,
}

impl ConditionBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prepared condition
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    fn push(self, field: Field, operator: Operator, value: ConditionValue) -> Self {
        self.condition(Condition::unchecked(field, operator, value))
    }

    // Worklog filters

    /// Worklogs written by any of these authors
    pub fn authors<I, S>(self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Field::WorklogAuthor, Operator::In, ConditionValue::list(authors))
    }

    /// Worklogs written by none of these authors
    pub fn not_authors<I, S>(self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Field::WorklogAuthor, Operator::NotIn, ConditionValue::list(authors))
    }

    /// Worklogs on or after a date
    pub fn worklog_since(self, date: impl Into<String>) -> Self {
        self.push(
            Field::WorklogDate,
            Operator::GreaterThanOrEqual,
            ConditionValue::scalar(date),
        )
    }

    /// Worklogs on or before a date
    pub fn worklog_until(self, date: impl Into<String>) -> Self {
        self.push(
            Field::WorklogDate,
            Operator::LessThanOrEqual,
            ConditionValue::scalar(date),
        )
    }

    // Issue filters

    pub fn project(self, key: impl Into<String>) -> Self {
        self.push(Field::Project, Operator::Equals, ConditionValue::scalar(key))
    }

    pub fn projects<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Field::Project, Operator::In, ConditionValue::list(keys))
    }

    pub fn issue_type(self, name: impl Into<String>) -> Self {
        self.push(Field::Issuetype, Operator::Equals, ConditionValue::scalar(name))
    }

    /// Full-text search
    pub fn text_contains(self, text: impl Into<String>) -> Self {
        self.condition(Condition::full_text(text))
    }

    /// Raw JQL clause
    pub fn custom(self, clause: impl Into<String>) -> Self {
        self.condition(Condition::custom(clause))
    }

    /// Join the last condition to the next one with OR
    pub fn or(mut self) -> Self {
        if let Some(last) = self.conditions.last_mut() {
            last.logic = Logic::Or;
        }
        self
    }

    /// Build the condition list
    pub fn build(self) -> Vec<Condition> {
        self.conditions
    }

    /// Build and compile straight to JQL
    pub fn compile(self) -> String {
        compile(&self.conditions)
    }
}

/// Helper functions for common condition lists
pub mod presets {
    use super::*;

    /// Worklogs by a team since a date
    pub fn team_worklogs_since<I, S>(authors: I, date: impl Into<String>) -> Vec<Condition>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConditionBuilder::new()
            .authors(authors)
            .worklog_since(date)
            .build()
    }

    /// Worklogs by a team within a date range
    pub fn team_worklogs_between<I, S>(
        authors: I,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Vec<Condition>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConditionBuilder::new()
            .authors(authors)
            .worklog_since(from)
            .worklog_until(to)
            .build()
    }

    /// Worklogs booked on one project since a date
    pub fn project_worklogs_since(
        project: impl Into<String>,
        date: impl Into<String>,
    ) -> Vec<Condition> {
        ConditionBuilder::new()
            .project(project)
            .worklog_since(date)
            .build()
    }
}
