//! Application configuration module
//!
//! Environment-driven settings plus the constants they fall back to.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
