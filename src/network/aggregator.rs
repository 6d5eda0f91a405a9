// src/network/aggregator.rs

//! Per-channel follow counts across a streamer's followers.

use std::collections::{BTreeMap, HashMap};

use crate::models::FollowingsReport;

/// Counts how many sampled followers follow each channel.
///
/// The subject itself is never counted, so it can never show up as one of
/// its own mutual followings.
#[derive(Debug, Clone)]
pub struct FollowerNetwork {
    subject_id: String,
    min_mutual: u32,
    counts: HashMap<String, u32>,
}

impl FollowerNetwork {
    pub fn new(subject_id: impl Into<String>, min_mutual: u32) -> Self {
        Self {
            subject_id: subject_id.into(),
            min_mutual,
            counts: HashMap::new(),
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn min_mutual(&self) -> u32 {
        self.min_mutual
    }

    /// Add one follower's followings to the counts.
    ///
    /// Not idempotent: recording the same report twice counts it twice.
    pub fn record(&mut self, report: &FollowingsReport) {
        for id in report.followed_ids() {
            if id == self.subject_id {
                continue;
            }
            *self.counts.entry(id.to_string()).or_insert(0) += 1;
        }
    }

    /// Raw counts for every channel seen so far.
    pub fn counts(&self) -> &HashMap<String, u32> {
        &self.counts
    }

    /// Channels followed by at least `min_mutual` followers, ordered by id.
    pub fn mutual_followings(&self) -> BTreeMap<&str, u32> {
        self.counts
            .iter()
            .filter(|(id, count)| **count >= self.min_mutual && id.as_str() != self.subject_id)
            .map(|(id, count)| (id.as_str(), *count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_each_followed_id() {
        let mut net = FollowerNetwork::new("S", 2);
        net.record(&FollowingsReport::from_ids(["X", "Y"]));
        net.record(&FollowingsReport::from_ids(["X"]));

        assert_eq!(net.counts().get("X"), Some(&2));
        assert_eq!(net.counts().get("Y"), Some(&1));
    }

    #[test]
    fn test_subject_never_counted() {
        let mut net = FollowerNetwork::new("S", 1);
        for _ in 0..5 {
            net.record(&FollowingsReport::from_ids(["S", "X"]));
        }

        assert!(!net.counts().contains_key("S"));
        assert!(!net.mutual_followings().contains_key("S"));
        assert_eq!(net.mutual_followings().get("X"), Some(&5));
    }

    #[test]
    fn test_mutual_followings_threshold() {
        let mut net = FollowerNetwork::new("S", 3);
        for ids in [vec!["A", "B"], vec!["A", "B"], vec!["A"]] {
            net.record(&FollowingsReport::from_ids(ids));
        }

        let mutual = net.mutual_followings();
        assert_eq!(mutual.len(), 1);
        assert_eq!(mutual.get("A"), Some(&3));
    }

    #[test]
    fn test_mutual_followings_is_pure() {
        let mut net = FollowerNetwork::new("S", 1);
        net.record(&FollowingsReport::from_ids(["B", "A", "C"]));

        let first: Vec<_> = net.mutual_followings().into_iter().collect();
        let second: Vec<_> = net.mutual_followings().into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![("A", 1), ("B", 1), ("C", 1)]);
    }

    #[test]
    fn test_double_record_double_counts() {
        let mut net = FollowerNetwork::new("S", 1);
        let report = FollowingsReport::from_ids(["X"]);
        net.record(&report);
        net.record(&report);
        assert_eq!(net.counts().get("X"), Some(&2));
    }
}
