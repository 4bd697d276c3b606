//! Centralized error handling for the EPG generator
//!
//! Errors are split by the stage that raises them so that the CLI can report
//! a precise reason when a run aborts.
//!
//! # Error Categories
//!
//! - **Source Errors**: upstream fetch failures (transport, status, JSON shape)
//! - **Configuration Errors**: invalid timezones, offsets or URLs
//! - **Output Errors**: XML rendering and file publishing failures
//!
//! # Usage
//!
//! ```rust
//! use gotv_epg::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("provider timezone is empty"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
