// src/sources/snapshot.rs

//! File-backed follower graph.
//!
//! A snapshot is a JSON document captured from the remote API:
//!
//! ```text
//! {
//!   "subject_id": "123",
//!   "followers": ["9", "10", ...],
//!   "followings": {
//!     "9": { "total": 2, "data": [{ "to_id": "200" }, { "to_id": "300" }] },
//!     ...
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{FollowingsReport, QueueItem};
use crate::pipeline::WorkQueue;

use super::{FollowerSource, FollowingsFetcher};

/// In-memory follower graph serving both collaborator roles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub subject_id: String,
    #[serde(default)]
    pub followers: Vec<String>,
    #[serde(default)]
    pub followings: HashMap<String, FollowingsReport>,
    /// Maximum followers enumerated; `None` means all of them.
    #[serde(skip)]
    pub sample_size: Option<usize>,
}

impl GraphSnapshot {
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            ..Self::default()
        }
    }

    /// Load a snapshot from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let snapshot: Self = serde_json::from_str(&content)?;
        if snapshot.subject_id.trim().is_empty() {
            return Err(AppError::source(
                path.display().to_string(),
                "snapshot has no subject_id",
            ));
        }
        log::debug!(
            "Loaded snapshot for {} ({} followers, {} followings reports)",
            snapshot.subject_id,
            snapshot.followers.len(),
            snapshot.followings.len()
        );
        Ok(snapshot)
    }

    /// Limit how many followers are enumerated.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    /// Add a follower along with the channels it follows.
    pub fn with_follower(mut self, follower_id: impl Into<String>, report: FollowingsReport) -> Self {
        let follower_id = follower_id.into();
        self.followers.push(follower_id.clone());
        self.followings.insert(follower_id, report);
        self
    }

    /// Add a follower with no recorded followings.
    pub fn with_silent_follower(mut self, follower_id: impl Into<String>) -> Self {
        self.followers.push(follower_id.into());
        self
    }
}

#[async_trait]
impl FollowerSource for GraphSnapshot {
    fn subject_id(&self) -> &str {
        &self.subject_id
    }

    async fn produce_follower_ids(&self, queue: &WorkQueue<QueueItem>) -> Result<()> {
        let limit = self.sample_size.unwrap_or(self.followers.len());
        for follower_id in self.followers.iter().take(limit) {
            queue.put(QueueItem::Follower(follower_id.clone()));
        }
        queue.put(QueueItem::Done);
        Ok(())
    }
}

#[async_trait]
impl FollowingsFetcher for GraphSnapshot {
    async fn fetch_followings(&self, follower_id: &str) -> Result<Option<FollowingsReport>> {
        Ok(self.followings.get(follower_id).cloned())
    }
}
