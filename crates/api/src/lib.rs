//! HTTP API: server wiring, session cookies, and marketplace handlers.

pub mod app;
pub mod config;
pub mod context;
pub mod cookies;
pub mod middleware;
