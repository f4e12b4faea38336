pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod session;
pub mod ui;

// Re-export the error type so callers can match on `taskdeck::ApiError`
// without spelling out the module path.
pub use error::ApiError;
