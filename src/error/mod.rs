//! Error handling
//!
//! Defines the storage error type and its classification.

pub mod handlers;
pub mod types;

pub use handlers::{ErrorCategory, error_category, handle_error};
pub use types::*;
