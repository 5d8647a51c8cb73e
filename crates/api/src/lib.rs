//! HTTP surface: edge filter, guarded handlers and the admin RBAC views.

pub mod app;
pub mod config;
pub mod context;
pub mod guards;
pub mod middleware;
