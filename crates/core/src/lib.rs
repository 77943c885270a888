//! Domain logic shared by the database and API layers.
//!
//! This crate has no database or web dependencies. It holds the status
//! vocabularies, state-transition rules, and derived-value computations
//! (risk scores, progress roll-ups) that the rest of the workspace builds on.

pub mod approval;
pub mod dependency;
pub mod error;
pub mod issue;
pub mod pagination;
pub mod plan;
pub mod risk;
pub mod roles;
pub mod task;
pub mod types;
