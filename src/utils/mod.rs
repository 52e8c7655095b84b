// Utility functions module
pub mod auth;
pub mod config;
pub mod paths;
pub mod rate_limiter;
pub mod store;
