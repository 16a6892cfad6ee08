//! Twitter domain - models and pure logic over fetched tweets

pub mod filters;
pub mod handle;
pub mod links;
pub mod models;

// Re-export models for convenience
pub use models::*;
