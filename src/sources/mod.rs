//! Collaborators that feed the crawl pipeline.
//!
//! The pipeline only depends on these two traits: one enumerates the
//! subject's followers, the other looks up what a single follower follows.
//! Pagination, retries and rate limiting live behind them.

pub mod snapshot;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FollowingsReport, QueueItem};
use crate::pipeline::WorkQueue;

pub use snapshot::GraphSnapshot;

/// Supplies the follower sample for a subject.
#[async_trait]
pub trait FollowerSource: Send + Sync {
    /// Resolved id of the subject whose followers are enumerated.
    fn subject_id(&self) -> &str;

    /// Push follower ids into `queue`, then [`QueueItem::Done`] once exhausted.
    async fn produce_follower_ids(&self, queue: &WorkQueue<QueueItem>) -> Result<()>;
}

/// Looks up the followings of a single follower.
#[async_trait]
pub trait FollowingsFetcher: Send + Sync {
    /// `Ok(None)` means the follower has no usable data.
    async fn fetch_followings(&self, follower_id: &str) -> Result<Option<FollowingsReport>>;
}
