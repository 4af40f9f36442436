//! # wl-contracts
//!
//! Contract validation for saved filters.
//!
//! Contracts validate a filter before it is created, updated or renamed. Errors
//! accumulate in a `ValidationErrors` so every problem is reported at once.

pub mod base;
pub mod filters;

pub use base::*;
pub use filters::{
    filter_changes, CreateFilterContract, FilterBaseContract, RenameFilterContract,
    UpdateFilterContract,
};
