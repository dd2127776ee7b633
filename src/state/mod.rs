//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: phases of one category's pagination loop
//! - `StopReason`: why that loop ended
//! - `RunStatus`: overall outcome of a run (complete or partial)

mod crawl_phase;
mod run_status;

// Re-export main types
pub use crawl_phase::{CrawlPhase, StopReason};
pub use run_status::RunStatus;
