//! Follower network aggregation and candidate batching.
//!
//! - `FollowerNetwork`: per-channel follow counts and the mutual followings view
//! - `CandidateBatcher`: followings-count filter plus chunked release

mod aggregator;
mod batcher;

pub use aggregator::FollowerNetwork;
pub use batcher::{CandidateBatcher, Chunk};

/// Default number of candidates per released chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 100;
