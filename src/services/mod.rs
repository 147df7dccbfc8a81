//! Services layer - orchestration logic
//!
//! This module coordinates between domain logic and infrastructure.
//! Services use infrastructure adapters to perform I/O operations.

pub mod registry;
pub mod tracking_service;

// Re-export commonly used types
pub use registry::{RefreshReport, ReleaseRegistry};
pub use tracking_service::TrackingService;
