//! # wl-queries
//!
//! Query layer for the worklog dashboard.
//!
//! This crate turns the structured filter conditions edited in the dashboard
//! into JQL text, and recovers editable conditions from hand-written JQL.
//!
//! ## Structure
//!
//! - `fields` - Field metadata: allowed operators and value shapes
//! - `operators` - Comparison operators
//! - `conditions` - The condition model stored in `config_json`
//! - `compiler` - Conditions to JQL
//! - `importer` - Best-effort JQL to conditions
//! - `document` - The editable condition list behind the builder
//! - `filter` - Saved filters
//! - `builder` - Fluent API for constructing condition lists
//!
//! ## Example
//!
//! ```
//! use wl_queries::builder::{ConditionBuilder, presets};
//! use wl_queries::importer::import_or_fallback;
//!
//! let jql = ConditionBuilder::new()
//!     .authors(["alice", "bob"])
//!     .worklog_since("2024-01-01")
//!     .compile();
//!
//! assert_eq!(
//!     jql,
//!     r#"worklogAuthor in ("alice", "bob") AND worklogDate >= "2024-01-01""#
//! );
//!
//! let conditions = import_or_fallback(&jql);
//! assert_eq!(conditions.len(), 2);
//!
//! let team = presets::team_worklogs_since(["carol"], "2024-02-01");
//! assert_eq!(team.len(), 2);
//! ```

pub mod fields;
pub mod operators;
pub mod conditions;
pub mod compiler;
pub mod importer;
pub mod document;
pub mod filter;
pub mod builder;

// Re-exports for convenience
pub use fields::{Field, ValueShape};
pub use operators::Operator;
pub use conditions::{Condition, ConditionError, ConditionValue, Logic};
pub use compiler::{compile, compile_condition};
pub use importer::{import_or_fallback, import_query, ImportError, LexicalImporter, QueryImporter};
pub use document::{ConditionList, DocumentError, DocumentResult};
pub use filter::{Filter, FilterConfig};
pub use builder::{presets, ConditionBuilder};
