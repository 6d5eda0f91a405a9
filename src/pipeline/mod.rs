//! Pipeline entry points for follower network crawling.
//!
//! - `WorkQueue`: joinable follower-id queue shared by the worker pool
//! - `FollowNetPipeline`: producer/worker orchestration, drain and flush

pub mod crawl;
pub mod queue;

pub use crawl::{CrawlOutcome, FollowNetPipeline};
pub use queue::WorkQueue;
