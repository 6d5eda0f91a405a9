// src/models/mod.rs

//! Domain models for the follower network crawler.

mod config;
mod report;
mod stats;

// Re-export all public types
pub use config::{Config, LoggingConfig, NetworkConfig, PipelineConfig};
pub use report::{Following, FollowingsReport, QueueItem};
pub use stats::RunSummary;
