//! Infrastructure layer - external I/O adapters
//!
//! This module contains all code that interacts with external systems:
//! - SQLite registry database
//! - GitHub REST API
//! - Argon2 secret hashing

pub mod database;
pub mod github;
pub mod registry_store;
pub mod secret;
pub mod upstream;
pub mod user_store;

// Re-export commonly used types
pub use database::Database;
pub use github::GitHubProvider;
pub use registry_store::RegistryStore;
pub use upstream::ReleaseProvider;
pub use user_store::UserStore;
