// src/network/batcher.rs

//! Chunked release of newly qualified mutual followings.
//!
//! Two release policies share one result shape, an ordered list of chunks:
//!
//! - **Streaming** runs after every ingested follower. It releases a single
//!   chunk of exactly `chunk_size` ids, and only once the unreleased backlog
//!   is strictly larger than `chunk_size`. Otherwise it releases nothing.
//! - **Flush** runs once at shutdown and releases the whole backlog, split
//!   into `chunk_size` chunks with a possibly shorter last chunk.

use std::collections::HashSet;

use crate::models::FollowingsReport;

use super::FollowerNetwork;

/// Ordered group of candidate ids released together.
pub type Chunk = Vec<String>;

/// Feeds follower reports into a [`FollowerNetwork`] and decides which
/// mutual followings to hand downstream.
#[derive(Debug)]
pub struct CandidateBatcher {
    network: FollowerNetwork,
    max_followings: u64,
    chunk_size: usize,
    released: HashSet<String>,
    accepted: usize,
    rejected: usize,
}

impl CandidateBatcher {
    /// A `chunk_size` of zero is treated as one.
    pub fn new(network: FollowerNetwork, max_followings: u64, chunk_size: usize) -> Self {
        Self {
            network,
            max_followings,
            chunk_size: chunk_size.max(1),
            released: HashSet::new(),
            accepted: 0,
            rejected: 0,
        }
    }

    /// Ingest one follower's report and apply the streaming release policy.
    ///
    /// `None` means the fetch produced no data; no counter changes, but the
    /// streaming policy still runs.
    pub fn ingest(&mut self, report: Option<&FollowingsReport>) -> Vec<Chunk> {
        if let Some(report) = report {
            if report.total <= self.max_followings {
                self.network.record(report);
                self.accepted += 1;
            } else {
                self.rejected += 1;
            }
        }
        self.release_streaming()
    }

    /// Release one full chunk if the backlog exceeds `chunk_size`.
    pub fn release_streaming(&mut self) -> Vec<Chunk> {
        let mut unreleased = self.unreleased();
        if unreleased.len() <= self.chunk_size {
            return Vec::new();
        }
        unreleased.truncate(self.chunk_size);
        self.mark_released(&unreleased);
        vec![unreleased]
    }

    /// Release every remaining mutual following.
    pub fn flush(&mut self) -> Vec<Chunk> {
        let unreleased = self.unreleased();
        self.mark_released(&unreleased);
        unreleased
            .chunks(self.chunk_size)
            .map(<[String]>::to_vec)
            .collect()
    }

    /// Mutual followings not yet released, in id order.
    fn unreleased(&self) -> Vec<String> {
        self.network
            .mutual_followings()
            .into_keys()
            .filter(|id| !self.released.contains(*id))
            .map(str::to_string)
            .collect()
    }

    fn mark_released(&mut self, ids: &[String]) {
        self.released.extend(ids.iter().cloned());
    }

    pub fn network(&self) -> &FollowerNetwork {
        &self.network
    }

    pub fn released(&self) -> &HashSet<String> {
        &self.released
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn max_followings(&self) -> u64 {
        self.max_followings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batcher(min_mutual: u32, chunk_size: usize) -> CandidateBatcher {
        CandidateBatcher::new(FollowerNetwork::new("S", min_mutual), 150, chunk_size)
    }

    fn ids(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("c{i:04}")).collect()
    }

    #[test]
    fn test_streaming_holds_backlog_of_chunk_size() {
        let mut b = CandidateBatcher::new(FollowerNetwork::new("S", 1), 1000, 100);
        let chunks = b.ingest(Some(&FollowingsReport::from_ids(ids(0..100))));

        assert!(chunks.is_empty());
        assert!(b.released().is_empty());
    }

    #[test]
    fn test_streaming_releases_exactly_chunk_size() {
        let mut b = CandidateBatcher::new(FollowerNetwork::new("S", 1), 1000, 100);
        let chunks = b.ingest(Some(&FollowingsReport::from_ids(ids(0..101))));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 100);
        assert_eq!(b.released().len(), 100);

        // The single leftover stays held back.
        assert!(b.release_streaming().is_empty());
    }

    #[test]
    fn test_flush_releases_everything_in_chunks() {
        let mut b = batcher(1, 2);
        // Streaming takes one chunk, leaving three behind.
        let streamed = b.ingest(Some(&FollowingsReport::from_ids(["a", "b", "c", "d", "e"])));
        assert_eq!(streamed.len(), 1);

        let chunks = b.flush();
        assert_eq!(
            chunks,
            vec![
                vec!["c".to_string(), "d".to_string()],
                vec!["e".to_string()]
            ]
        );

        let flushed: HashSet<_> = streamed.into_iter().chain(chunks).flatten().collect();
        let mutual: HashSet<_> = b
            .network()
            .mutual_followings()
            .into_keys()
            .map(str::to_string)
            .collect();
        assert_eq!(&flushed, b.released());
        assert_eq!(flushed, mutual);
    }

    #[test]
    fn test_flush_is_idempotent() {
        let mut b = batcher(1, 100);
        b.ingest(Some(&FollowingsReport::from_ids(["X", "Y"])));

        assert_eq!(b.flush().len(), 1);
        assert!(b.flush().is_empty());
    }

    #[test]
    fn test_flush_skips_already_streamed() {
        let mut b = batcher(1, 2);
        let streamed = b.ingest(Some(&FollowingsReport::from_ids(["a", "b", "c"])));
        assert_eq!(streamed, vec![vec!["a".to_string(), "b".to_string()]]);

        assert_eq!(b.flush(), vec![vec!["c".to_string()]]);
    }

    #[test]
    fn test_over_threshold_follower_rejected() {
        let mut b = batcher(1, 100);
        let report = FollowingsReport::from_ids(["X"]).with_total(151);
        b.ingest(Some(&report));

        assert_eq!(b.rejected_count(), 1);
        assert_eq!(b.accepted_count(), 0);
        assert!(b.network().counts().is_empty());
    }

    #[test]
    fn test_at_threshold_follower_accepted() {
        let mut b = batcher(1, 100);
        let report = FollowingsReport::from_ids(["X", "Y"]).with_total(150);
        b.ingest(Some(&report));

        assert_eq!(b.accepted_count(), 1);
        assert_eq!(b.rejected_count(), 0);
        assert_eq!(b.network().counts().get("X"), Some(&1));
        assert_eq!(b.network().counts().get("Y"), Some(&1));
    }

    #[test]
    fn test_missing_report_changes_nothing() {
        let mut b = batcher(1, 100);
        assert!(b.ingest(None).is_empty());
        assert_eq!(b.accepted_count() + b.rejected_count(), 0);
    }

    #[test]
    fn test_instances_do_not_share_history() {
        let mut first = batcher(1, 100);
        first.ingest(Some(&FollowingsReport::from_ids(["X"])));
        first.flush();

        let mut second = batcher(1, 100);
        second.ingest(Some(&FollowingsReport::from_ids(["X"])));
        assert_eq!(second.flush(), vec![vec!["X".to_string()]]);
    }

    #[test]
    fn test_subject_never_released() {
        let mut b = batcher(1, 100);
        b.ingest(Some(&FollowingsReport::from_ids(["S", "X"])));
        let released: Vec<_> = b.flush().into_iter().flatten().collect();
        assert_eq!(released, vec!["X".to_string()]);
    }
}
