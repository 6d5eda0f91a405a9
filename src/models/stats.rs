// src/models/stats.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Summary of one follower network run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub subject_id: String,
    pub n_consumers: usize,
    /// Followers whose followings were recorded
    pub accepted: usize,
    /// Followers skipped for following too many channels
    pub rejected: usize,
    /// Distinct channels counted so far
    pub counted_candidates: usize,
    pub mutual_followings: usize,
    pub released: usize,
    pub streamed_chunks: usize,
    pub flushed_chunks: usize,
    pub producer_failed: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub elapsed_ms: i64,
}

impl RunSummary {
    /// Key/value pairs for log output.
    pub fn items(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Subject", self.subject_id.clone()),
            ("Consumers", self.n_consumers.to_string()),
            ("Total kept", self.accepted.to_string()),
            ("Total skipped", self.rejected.to_string()),
            ("Followings counted", self.counted_candidates.to_string()),
            ("Mutual followings", self.mutual_followings.to_string()),
            ("Released", self.released.to_string()),
            (
                "Chunks",
                format!("{} streamed, {} flushed", self.streamed_chunks, self.flushed_chunks),
            ),
            ("Elapsed", format!("{} ms", self.elapsed_ms)),
        ]
    }
}
