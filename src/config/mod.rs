//! Configuration module for Comic-Sync
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A configuration file is optional: every key has a default.
//!
//! # Example
//!
//! ```no_run
//! use comic_sync::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("comic-sync.toml")).unwrap();
//! println!("Series workers: {}", config.concurrency.series_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CatalogConfig, ConcurrencyConfig, Config, FetchConfig, ImageConfig, LibraryConfig,
};

// Re-export parser functions
pub use parser::{load_config, load_or_default, parse_config};
pub use validation::validate;
