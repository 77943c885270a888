//! Request middleware: authentication extraction and project access checks.

pub mod auth;
pub mod rbac;
