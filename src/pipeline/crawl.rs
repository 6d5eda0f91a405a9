// src/pipeline/crawl.rs

//! Follower network crawling pipeline.
//!
//! One producer task enumerates the follower sample into a [`WorkQueue`];
//! `n_consumers` worker tasks fetch each follower's followings and feed them
//! to the shared [`CandidateBatcher`]. Completion is detected by joining the
//! queue, after which the idle workers are cancelled and the remaining
//! candidates are flushed.

use std::collections::{BTreeMap, BTreeSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use futures::FutureExt;
use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::models::{Config, FollowingsReport, NetworkConfig, QueueItem, RunSummary};
use crate::network::{CandidateBatcher, Chunk, FollowerNetwork};
use crate::sources::{FollowerSource, FollowingsFetcher};

use super::WorkQueue;

/// Final state of a crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub summary: RunSummary,
    pub mutual_followings: BTreeMap<String, u32>,
    pub released: BTreeSet<String>,
}

/// Crawl pipeline settings. The subject comes from the follower source at
/// run time, so the network is always keyed on the id the source resolved.
pub struct FollowNetPipeline {
    network: NetworkConfig,
    n_consumers: usize,
}

/// State shared by every worker task.
struct WorkerContext {
    queue: Arc<WorkQueue<QueueItem>>,
    fetcher: Arc<dyn FollowingsFetcher>,
    batcher: Arc<Mutex<CandidateBatcher>>,
    output: Option<UnboundedSender<Chunk>>,
    streamed_chunks: Arc<AtomicUsize>,
}

/// Acknowledges a dequeued item when dropped, whatever happened to it.
struct TaskDone<'a>(&'a WorkQueue<QueueItem>);

impl Drop for TaskDone<'_> {
    fn drop(&mut self) {
        self.0.task_done();
    }
}

impl FollowNetPipeline {
    pub fn new(network: NetworkConfig, n_consumers: usize) -> Self {
        Self {
            network,
            n_consumers: n_consumers.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.network.clone(), config.pipeline.n_consumers)
    }

    /// Run the crawl to completion.
    ///
    /// Released chunks are sent to `output` as they become available: single
    /// streaming chunks while the crawl runs, then the flushed remainder in
    /// order. Per-follower failures never abort the run.
    pub async fn run(
        self,
        source: Arc<dyn FollowerSource>,
        fetcher: Arc<dyn FollowingsFetcher>,
        output: Option<UnboundedSender<Chunk>>,
    ) -> CrawlOutcome {
        let start_time = Utc::now();
        let network = FollowerNetwork::new(source.subject_id(), self.network.min_mutual);
        let batcher = CandidateBatcher::new(
            network,
            self.network.max_followings,
            self.network.chunk_size,
        );
        log::info!(
            "Crawling follower network of {} with {} consumers (min_mutual={}, max_followings={}, chunk_size={})",
            batcher.network().subject_id(),
            self.n_consumers,
            batcher.network().min_mutual(),
            batcher.max_followings(),
            batcher.chunk_size()
        );
        let subject_id = batcher.network().subject_id().to_string();
        let batcher = Arc::new(Mutex::new(batcher));

        let queue = Arc::new(WorkQueue::new());
        let streamed_chunks = Arc::new(AtomicUsize::new(0));

        let producer = {
            let source = Arc::clone(&source);
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { source.produce_follower_ids(&queue).await })
        };

        let workers: Vec<JoinHandle<()>> = (0..self.n_consumers)
            .map(|worker| {
                let ctx = WorkerContext {
                    queue: Arc::clone(&queue),
                    fetcher: Arc::clone(&fetcher),
                    batcher: Arc::clone(&batcher),
                    output: output.clone(),
                    streamed_chunks: Arc::clone(&streamed_chunks),
                };
                tokio::spawn(consume_followed_ids(worker, ctx))
            })
            .collect();

        let producer_failed = match producer.await {
            Ok(Ok(())) => false,
            Ok(Err(e)) => {
                log::warn!("Follower source for {} failed: {}", subject_id, e);
                true
            }
            Err(e) => {
                log::error!("Follower source task for {} aborted: {}", subject_id, e);
                true
            }
        };

        // The end marker only reaches one worker; the join is what tells us
        // every follower has been handled.
        queue.join().await;
        log::debug!("Follower queue drained");

        for worker in &workers {
            worker.abort();
        }
        let mut cancelled = 0;
        for result in join_all(workers).await {
            match result {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => cancelled += 1,
                Err(e) => log::error!("Followings worker failed: {}", e),
            }
        }
        log::debug!("Cancelled {} idle workers", cancelled);

        let mut batcher = batcher.lock().await;
        let flushed = batcher.flush();
        let flushed_chunks = flushed.len();
        for chunk in flushed {
            forward(output.as_ref(), chunk);
        }
        log::debug!("Flushed {} remaining chunks", flushed_chunks);

        let mutual_followings: BTreeMap<String, u32> = batcher
            .network()
            .mutual_followings()
            .into_iter()
            .map(|(id, count)| (id.to_string(), count))
            .collect();
        let released: BTreeSet<String> = batcher.released().iter().cloned().collect();

        let end_time = Utc::now();
        let summary = RunSummary {
            subject_id,
            n_consumers: self.n_consumers,
            accepted: batcher.accepted_count(),
            rejected: batcher.rejected_count(),
            counted_candidates: batcher.network().counts().len(),
            mutual_followings: mutual_followings.len(),
            released: released.len(),
            streamed_chunks: streamed_chunks.load(Ordering::Relaxed),
            flushed_chunks,
            producer_failed,
            start_time,
            end_time,
            elapsed_ms: (end_time - start_time).num_milliseconds(),
        };
        log::info!(
            "Follower network of {} complete: {} mutual followings from {} kept followers ({} skipped)",
            summary.subject_id,
            summary.mutual_followings,
            summary.accepted,
            summary.rejected
        );

        CrawlOutcome {
            summary,
            mutual_followings,
            released,
        }
    }
}

/// Worker loop: runs until cancelled.
async fn consume_followed_ids(worker: usize, ctx: WorkerContext) {
    loop {
        let item = ctx.queue.get().await;
        let _done = TaskDone(&ctx.queue);

        let follower_id = match item {
            QueueItem::Follower(id) => id,
            QueueItem::Done => {
                log::debug!("Worker {} saw end of follower sample", worker);
                continue;
            }
        };

        let report = fetch_report(ctx.fetcher.as_ref(), &follower_id).await;
        let chunks = ctx.batcher.lock().await.ingest(report.as_ref());

        for chunk in chunks {
            ctx.streamed_chunks.fetch_add(1, Ordering::Relaxed);
            log::debug!(
                "Worker {} released {} candidates after follower {}",
                worker,
                chunk.len(),
                follower_id
            );
            forward(ctx.output.as_ref(), chunk);
        }
    }
}

/// Fetch one follower's followings, turning any failure into "no data".
async fn fetch_report(fetcher: &dyn FollowingsFetcher, follower_id: &str) -> Option<FollowingsReport> {
    match AssertUnwindSafe(fetcher.fetch_followings(follower_id))
        .catch_unwind()
        .await
    {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            log::debug!("No followings for {}: {}", follower_id, e);
            None
        }
        Err(_) => {
            log::warn!("Followings fetch for {} panicked", follower_id);
            None
        }
    }
}

fn forward(output: Option<&UnboundedSender<Chunk>>, chunk: Chunk) {
    if let Some(tx) = output {
        if tx.send(chunk).is_err() {
            log::debug!("Candidate consumer dropped; discarding chunk");
        }
    }
}
