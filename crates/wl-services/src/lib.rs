//! # wl-services
//!
//! Filter persistence and collector services for the worklog dashboard.
//!
//! The dashboard never writes its databases directly: saves, deletes, and
//! collection runs are sent to the remote collector as command envelopes.
//! `FilterService` validates through the filter contracts, relays the
//! command, then updates the local `FilterStore` view.

pub mod collector;
pub mod filters;
pub mod store;

pub use collector::{
    commands, CollectionRequest, CollectorError, CollectorResult, CommandEnvelope,
    CommandExecutor, HttpExecutor, RecordingExecutor,
};
pub use filters::FilterService;
pub use store::{FilterStore, MemoryFilterStore, StoreError, StoreResult};
