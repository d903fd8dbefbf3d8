pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod openapi;
pub mod repo;
pub mod routes;
pub mod security;
pub mod thread_detail; // joined rows -> nested thread document
pub mod usecase;

// Re-export commonly used items for tests / external users
pub use routes::{config, AppState};
pub use security::SecurityHeaders;
pub use thread_detail::{format_thread_detail, ThreadDetail};
