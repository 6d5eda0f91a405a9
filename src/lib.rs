// src/lib.rs

//! Follower network crawler library.
//!
//! Finds the channels that a sample of a streamer's followers mutually follow.

pub mod error;
pub mod models;
pub mod network;
pub mod pipeline;
pub mod sources;
