//! Core traits shared by persisted records

use chrono::{DateTime, Utc};

/// Primary key type assigned by the persistence service
pub type Id = i64;

/// Trait for records that have a primary key
pub trait Identifiable {
    fn id(&self) -> Option<Id>;
    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
    fn is_new_record(&self) -> bool {
        !self.is_persisted()
    }
}

/// Trait for records stamped by the persistence service
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
}
