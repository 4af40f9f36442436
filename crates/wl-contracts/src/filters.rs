//! Filter contracts
//!
//! Title rules shared by every contract, the query check for create and
//! update, and the writable attribute guards for saved filters.

use wl_core::error::ValidationErrors;
use wl_core::traits::Id;
use wl_queries::filter::Filter;

use crate::base::{ChangeTracker, Contract, ValidationResult};

/// Maximum title length, in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Attributes that differ between the stored filter and its replacement
pub fn filter_changes(before: &Filter, after: &Filter) -> ChangeTracker {
    let mut changes = ChangeTracker::new();
    if before.title != after.title {
        changes.mark_changed("title");
    }
    if before.jql_query != after.jql_query {
        changes.mark_changed("jql_query");
    }
    if before.config_json != after.config_json {
        changes.mark_changed("config_json");
    }
    changes
}

/// Title validations against the currently saved filters
pub struct FilterBaseContract<'a> {
    existing: &'a [Filter],
}

impl<'a> FilterBaseContract<'a> {
    pub fn new(existing: &'a [Filter]) -> Self {
        Self { existing }
    }

    /// Validate title is present and within length
    pub fn validate_title(&self, title: &str, errors: &mut ValidationErrors) {
        let title = title.trim();
        if title.is_empty() {
            errors.add("title", "can't be blank");
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            errors.add("title", "is too long (maximum is 255 characters)");
        }
    }

    /// Validate no other filter already uses the title
    pub fn validate_title_unique(
        &self,
        title: &str,
        own_id: Option<Id>,
        errors: &mut ValidationErrors,
    ) {
        let title = title.trim();
        let taken = self
            .existing
            .iter()
            .any(|f| f.title == title && (own_id.is_none() || f.id != own_id));
        if taken {
            errors.add("title", "has already been taken");
        }
    }

    /// Validate the compiled query is not empty
    pub fn validate_query(&self, jql: &str, errors: &mut ValidationErrors) {
        if jql.trim().is_empty() {
            errors.add("jql_query", "can't be blank");
        }
    }
}

impl Contract<Filter> for FilterBaseContract<'_> {
    fn validate(&self, entity: &Filter) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        self.validate_title(&entity.title, &mut errors);
        errors.into_result()
    }
}

/// Contract for saving a new filter
pub struct CreateFilterContract<'a> {
    base: FilterBaseContract<'a>,
}

impl<'a> CreateFilterContract<'a> {
    pub fn new(existing: &'a [Filter]) -> Self {
        Self {
            base: FilterBaseContract::new(existing),
        }
    }
}

impl Contract<Filter> for CreateFilterContract<'_> {
    fn validate(&self, entity: &Filter) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        self.base.validate_title(&entity.title, &mut errors);
        self.base.validate_title_unique(&entity.title, None, &mut errors);
        self.base.validate_query(&entity.jql_query, &mut errors);

        errors.into_result()
    }
}

/// Contract for overwriting a saved filter with new conditions
pub struct UpdateFilterContract<'a> {
    base: FilterBaseContract<'a>,
    changes: ChangeTracker,
}

impl<'a> UpdateFilterContract<'a> {
    pub fn new(existing: &'a [Filter], changes: ChangeTracker) -> Self {
        Self {
            base: FilterBaseContract::new(existing),
            changes,
        }
    }
}

impl Contract<Filter> for UpdateFilterContract<'_> {
    fn validate(&self, entity: &Filter) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if entity.id.is_none() {
            errors.add_base("Only saved filters can be updated");
        }
        self.base.validate_title(&entity.title, &mut errors);
        self.base
            .validate_title_unique(&entity.title, entity.id, &mut errors);
        self.base.validate_query(&entity.jql_query, &mut errors);
        self.validate_writable(&self.changes, &mut errors);

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        matches!(attribute, "jql_query" | "config_json")
    }
}

/// Contract for renaming a saved filter
pub struct RenameFilterContract<'a> {
    base: FilterBaseContract<'a>,
    changes: ChangeTracker,
}

impl<'a> RenameFilterContract<'a> {
    pub fn new(existing: &'a [Filter], changes: ChangeTracker) -> Self {
        Self {
            base: FilterBaseContract::new(existing),
            changes,
        }
    }
}

impl Contract<Filter> for RenameFilterContract<'_> {
    fn validate(&self, entity: &Filter) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if entity.id.is_none() {
            errors.add_base("Only saved filters can be renamed");
        }
        self.base.validate_title(&entity.title, &mut errors);
        self.base
            .validate_title_unique(&entity.title, entity.id, &mut errors);
        self.validate_writable(&self.changes, &mut errors);

        errors.into_result()
    }

    fn is_writable(&self, attribute: &str) -> bool {
        attribute == "title"
    }
}
