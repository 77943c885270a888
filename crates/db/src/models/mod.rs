//! Entity models and DTOs, one module per aggregate.

pub mod approval;
pub mod issue;
pub mod label;
pub mod member;
pub mod milestone;
pub mod plan;
pub mod project;
pub mod risk;
pub mod task;
pub mod token;
pub mod user;
