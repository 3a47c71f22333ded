//! HTTP front end for the opening trainer
//!
//! - `api` - Router, shared state and JSON handlers
//! - `error` - `ApiError` and its mapping to HTTP status codes

pub mod api;
pub mod error;

pub use api::{router, AppState};
pub use error::{ApiError, ApiResult};
