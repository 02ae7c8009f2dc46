//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod forecast;
pub mod series;

// Re-export all handlers for use in router
pub use forecast::*;
pub use series::*;
