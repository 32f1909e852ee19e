//! Shared plumbing for the village complaint services.
//!
//! - Configuration loading
//! - Tracing setup
//! - Pagination
//! - Injectable clocks and complaint code generation

pub mod codes;
pub mod config;
pub mod datetime;
pub mod pagination;
pub mod telemetry;

// Re-export commonly used types
pub use codes::{CodeGenerator, TimestampCodeGenerator};
pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, ServerConfig, TelemetryConfig, WorkflowConfig,
};
pub use datetime::{format_datetime, now_utc, Clock, FixedClock, SystemClock};
pub use pagination::{PaginatedResult, PaginationParams};
pub use telemetry::init_tracing;

/// Common error type used throughout the crate
pub type Result<T> = std::result::Result<T, anyhow::Error>;
