//! Command surface: configuration, HTTP routing and request/response mapping
//! in front of the entitlement engine.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
