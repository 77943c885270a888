//! HTTP handlers, one module per resource.

pub mod approval;
pub mod auth;
pub mod health;
pub mod issue;
pub mod label;
pub mod plan;
pub mod project;
pub mod resource;
pub mod risk;
pub mod task;
