//! HTTP middleware components.
//!
//! Request ids and request logging. Tracing, CORS, timeouts and compression
//! come from `tower-http` in `app`.

pub mod logging;
pub mod request_id;

pub use logging::logging_middleware;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
