//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML
//! configuration files.
//!
//! # Example
//!
//! ```no_run
//! use linkmap::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Job will crawl to depth {}", config.job.max_depth);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, FetchConfig, FilterEntry, JobConfig, OutputConfig};
