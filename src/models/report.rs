// src/models/report.rs

use serde::{Deserialize, Serialize};

/// One followed channel in a follower's followings listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Following {
    /// Id of the followed channel
    pub to_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_login: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followed_at: Option<String>,
}

impl Following {
    pub fn new(to_id: impl Into<String>) -> Self {
        Self {
            to_id: to_id.into(),
            to_login: None,
            to_name: None,
            followed_at: None,
        }
    }
}

/// Everything a single follower follows, as reported by the remote API.
///
/// `total` is the follower's full followings count, which may exceed
/// `data.len()` when the fetcher stopped paginating early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowingsReport {
    pub total: u64,
    #[serde(default)]
    pub data: Vec<Following>,
}

impl FollowingsReport {
    /// Build a report whose total equals the number of listed ids.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let data: Vec<Following> = ids.into_iter().map(Following::new).collect();
        Self {
            total: data.len() as u64,
            data,
        }
    }

    /// Override the reported total.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = total;
        self
    }

    /// Iterate the followed channel ids.
    pub fn followed_ids(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|f| f.to_id.as_str())
    }
}

/// An entry on the follower-id input queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    /// A follower whose followings should be fetched
    Follower(String),
    /// End-of-sample marker pushed once by the follower source
    Done,
}
