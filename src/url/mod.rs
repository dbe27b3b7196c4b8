//! URL handling module for SiteLens
//!
//! This module provides link resolution, internal/external classification,
//! URL normalization for visited-set keys, and domain extraction.

mod domain;
mod normalize;
mod resolve;

// Re-export main functions
pub use domain::{extract_domain, host_with_port};
pub use normalize::normalize_url;
pub use resolve::{resolve_link, LinkResolver, ResolveMode};
