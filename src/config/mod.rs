//! Configuration module for SiteLens
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional, so an empty file (or no file) yields a working setup.
//!
//! # Example
//!
//! ```no_run
//! use sitelens::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitelens.toml")).unwrap();
//! println!("Crawls stop after {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CacheConfig, Config, CrawlerConfig, PerformanceConfig, SearchConsoleConfig, ServerConfig,
    StorageConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, default_config, load_config, load_config_with_hash,
    CACHE_DURATION_VAR, PAGESPEED_API_KEY_VAR,
};
