//! Base contract system

use std::collections::BTreeSet;

use wl_core::error::ValidationErrors;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;

    /// Check if an attribute is writable
    fn is_writable(&self, _attribute: &str) -> bool {
        true
    }

    /// Add an error for every changed attribute the contract does not allow
    fn validate_writable(&self, changes: &ChangeTracker, errors: &mut ValidationErrors) {
        for attribute in changes.changed_attributes() {
            if !self.is_writable(attribute) {
                errors.add(attribute.as_str(), "is not writable");
            }
        }
    }
}

/// Change tracking for update contracts
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeTracker {
    changed_attributes: BTreeSet<String>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_changed(&mut self, attribute: impl Into<String>) {
        self.changed_attributes.insert(attribute.into());
    }

    pub fn is_changed(&self, attribute: &str) -> bool {
        self.changed_attributes.contains(attribute)
    }

    pub fn changed_attributes(&self) -> &BTreeSet<String> {
        &self.changed_attributes
    }
}
