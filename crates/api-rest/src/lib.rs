//! Village complaint service REST API
//!
//! Axum HTTP surface over the complaint workflow: public submission and
//! status lookup, citizen self-service, and the office-scoped admin routes.
//!
//! ## Architecture
//!
//! - **app**: Router assembly and middleware stack
//! - **state**: Service wiring shared by every handler
//! - **routes**: Handlers grouped by audience
//! - **middleware**: Request ids and request logging
//! - **extractors**: Bearer identities, validated JSON, pagination
//! - **responses**: The `{ success, data, message }` envelope
//! - **error**: Mapping failures onto HTTP responses
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vcm_api_rest::{create_app, AppState};
//! use vcm_common::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let state = AppState::in_memory(AppConfig::development());
//!     let app = create_app(state);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod app;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod responses;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use app::create_app;
pub use error::{ApiError, ApiResult};
pub use extractors::auth::Claims;
pub use state::AppState;
