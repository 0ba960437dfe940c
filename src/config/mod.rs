//! Configuration module for Commentary-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A config file is optional: `Config::default()` describes the Matthew Henry
//! concise commentary site and the `output/` layout the batch passes expect.
//!
//! # Example
//!
//! ```no_run
//! use commentary_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Settle delay: {}ms", config.navigator.settle_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, IdentityConfig, LoggingConfig, MismatchPolicy, NavigatorConfig, OutputConfig,
    SiteConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub(crate) use validation::parse_selector;
