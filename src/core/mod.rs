//! Core infrastructure shared by every trainer module
//!
//! - `error` - Error type and result alias
//! - `config` - Runtime configuration with serde defaults
//! - `logging` - `tracing` subscriber installation

pub mod config;
pub mod error;
pub mod logging;

pub use config::TrainerConfig;
pub use error::{TrainerError, TrainerResult};
pub use logging::init_tracing;
