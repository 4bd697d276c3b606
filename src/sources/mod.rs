//! Upstream guide sources
//!
//! The [`GuideSource`] trait is the fetch stage of the pipeline. The only
//! production implementation talks to the provider's JSON API over HTTP;
//! tests substitute in-memory sources.

pub mod http_guide;
pub mod traits;
pub mod window;

pub use http_guide::HttpGuideSource;
pub use traits::{FetchedGuide, GuideSource};
pub use window::{TimeWindow, WindowPayload};
