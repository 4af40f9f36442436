//! Saved filters
//!
//! A filter stores its compiled query next to the serialized condition list.
//! The query is kept for display and for the collector; the condition list
//! is what the builder re-opens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use wl_core::traits::{Id, Identifiable, Timestamped};

use crate::compiler::compile;
use crate::conditions::Condition;

/// The `config_json` payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub conditions: Vec<Condition>,
}

impl FilterConfig {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    pub fn to_json(&self) -> String {
        // Conditions only hold strings and unit enums
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"conditions":[]}"#.to_string())
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// A named, persisted query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Assigned by the persistence service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub title: String,
    pub jql_query: String,
    pub config_json: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Filter {
    /// Build an unsaved filter from a condition list
    pub fn from_conditions(title: impl Into<String>, conditions: &[Condition]) -> Self {
        Self {
            id: None,
            title: title.into(),
            jql_query: compile(conditions),
            config_json: FilterConfig::new(conditions.to_vec()).to_json(),
            created_at: None,
        }
    }

    /// Same filter, keeping the id of an existing record
    pub fn with_id(mut self, id: Option<Id>) -> Self {
        self.id = id;
        self
    }

    /// Conditions to re-open in the builder
    ///
    /// Rows written before the condition format existed yield an empty list.
    pub fn conditions(&self) -> Vec<Condition> {
        match FilterConfig::from_json(&self.config_json) {
            Ok(config) => config.conditions,
            Err(err) => {
                warn!(filter = %self.title, error = %err, "unreadable filter config, starting empty");
                Vec::new()
            }
        }
    }

    /// Case-insensitive match on title or query text
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term) || self.jql_query.to_lowercase().contains(&term)
    }
}

impl Identifiable for Filter {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Filter {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::ConditionValue;
    use crate::fields::Field;
    use crate::operators::Operator;

    fn sample_conditions() -> Vec<Condition> {
        vec![
            Condition::try_new(Field::WorklogAuthor, Operator::In, ConditionValue::list(["alice"]))
                .unwrap(),
            Condition::try_new(Field::Project, Operator::Equals, ConditionValue::scalar("ABC"))
                .unwrap(),
        ]
    }

    #[test]
    fn test_from_conditions() {
        let conditions = sample_conditions();
        let filter = Filter::from_conditions("Team A", &conditions);

        assert_eq!(filter.title, "Team A");
        assert_eq!(filter.jql_query, r#"worklogAuthor in ("alice") AND project = "ABC""#);
        assert!(filter.is_new_record());
        assert!(Timestamped::created_at(&filter).is_none());
        assert_eq!(filter.conditions(), conditions);
    }

    #[test]
    fn test_legacy_config_yields_no_conditions() {
        let filter = Filter {
            id: Some(7),
            title: "Old".to_string(),
            jql_query: "project = ABC".to_string(),
            config_json: "not json".to_string(),
            created_at: None,
        };
        assert!(filter.conditions().is_empty());
        assert!(filter.is_persisted());
    }

    #[test]
    fn test_matches_search() {
        let filter = Filter::from_conditions("Team A", &sample_conditions());
        assert!(filter.matches_search("team"));
        assert!(filter.matches_search("PROJECT"));
        assert!(filter.matches_search(""));
        assert!(!filter.matches_search("bravo"));
    }

    #[test]
    fn test_config_json_from_dashboard() {
        let raw = r#"{"conditions":[{"id":"0.5","field":"worklogDate","operator":">=","value":"2024-01-01","logic":"AND"}]}"#;
        let config = FilterConfig::from_json(raw).unwrap();
        assert_eq!(config.conditions.len(), 1);
        assert_eq!(config.conditions[0].field, Field::WorklogDate);
        assert_eq!(compile(&config.conditions), r#"worklogDate >= "2024-01-01""#);
    }
}
