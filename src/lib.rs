pub mod config;
pub mod errors;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod transform;
pub mod utils;
