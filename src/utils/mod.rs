//! Utility modules for the EPG generator
//!
//! Small, dependency-light helpers shared by the fetch, transform and
//! output stages.

pub mod human_format;
pub mod time;
pub mod url;

pub use human_format::{compression_ratio, format_duration, format_memory};
pub use time::ZoneSpec;
