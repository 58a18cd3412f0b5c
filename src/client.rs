//! Client implementation for the WRM simulation API
//!
//! This module contains all client-side functionality: the blocking API
//! wrapper, CLI command handlers, input packaging, the wait loop, and the
//! local input-file lint.

pub mod api;
pub mod commands;
pub mod error_codes;
pub mod payload;
pub mod poll;
pub mod utils;
pub mod validate;

// Re-exports for convenience
pub use api::{ApiError, Configuration};
pub use payload::{InputSource, UploadPayload};
pub use poll::{WaitOptions, WaitOutcome, wait_for_completion};
pub use utils::send_with_retries;
