//! URL handling module for Catalog Harvester
//!
//! This module provides link resolution against the site root, same-site
//! checks, and pagination URL construction.

mod domain;
mod resolve;

// Re-export main functions
pub use domain::{extract_domain, is_same_site};
pub use resolve::{page_url, resolve_link, PAGE_PARAM};
