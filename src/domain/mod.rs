//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod release;
pub mod repository;
pub mod request;
pub mod user;

// Re-export commonly used types
pub use release::{Reconciliation, Release};
pub use repository::TrackedRepository;
pub use request::{RefreshRequest, RegisterRequest, RepoName, UpstreamToken, UserCredentials};
pub use user::TrackedUser;
