//! Application configuration module
//!
//! Environment-driven settings plus the fixed token, cookie and validation constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
