// src/pipeline/queue.rs

//! Multi-consumer FIFO queue with completion tracking.
//!
//! Every `put` raises the unfinished count and every `task_done` lowers it;
//! `join` resolves once the count is back at zero. This is how the crawl
//! pipeline knows the worker pool has drained, since a single end marker
//! cannot stop many workers.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    unfinished: usize,
}

/// Unbounded work queue shared by one producer and many consumers.
#[derive(Debug)]
pub struct WorkQueue<T> {
    state: Mutex<QueueState<T>>,
    item_ready: Notify,
    drained: Notify,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                unfinished: 0,
            }),
            item_ready: Notify::new(),
            drained: Notify::new(),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut QueueState<T>) -> R) -> R {
        // State stays consistent even if a holder panicked: every critical
        // section is a single push/pop/counter update.
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }

    /// Enqueue an item without waiting.
    pub fn put(&self, item: T) {
        self.with_state(|s| {
            s.items.push_back(item);
            s.unfinished += 1;
        });
        self.item_ready.notify_one();
    }

    /// Dequeue an item, waiting until one is available.
    pub async fn get(&self) -> T {
        loop {
            if let Some(item) = self.try_get() {
                return item;
            }
            // `notify_one` leaves a permit when nobody is waiting, so a put
            // racing with the check above still wakes us. A stale permit only
            // costs one extra loop.
            self.item_ready.notified().await;
        }
    }

    /// Dequeue an item if one is immediately available.
    pub fn try_get(&self) -> Option<T> {
        self.with_state(|s| s.items.pop_front())
    }

    /// Acknowledge that a dequeued item has been fully processed.
    pub fn task_done(&self) {
        let drained = self.with_state(|s| {
            s.unfinished = s.unfinished.saturating_sub(1);
            s.unfinished == 0
        });
        if drained {
            self.drained.notify_waiters();
        }
    }

    /// Wait until every enqueued item has been acknowledged.
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent `task_done` is not missed.
            notified.as_mut().enable();
            if self.unfinished() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Items put but not yet acknowledged.
    pub fn unfinished(&self) -> usize {
        self.with_state(|s| s.unfinished)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = WorkQueue::new();
        queue.put(1);
        queue.put(2);
        queue.put(3);

        assert_eq!(queue.get().await, 1);
        assert_eq!(queue.get().await, 2);
        assert_eq!(queue.try_get(), Some(3));
        assert_eq!(queue.try_get(), None);
    }

    #[tokio::test]
    async fn test_join_returns_immediately_when_empty() {
        let queue: WorkQueue<u8> = WorkQueue::new();
        tokio::time::timeout(Duration::from_secs(1), queue.join())
            .await
            .expect("join should not block on an empty queue");
    }

    #[tokio::test]
    async fn test_join_waits_for_task_done() {
        let queue = Arc::new(WorkQueue::new());
        queue.put("a");
        queue.put("b");

        let q = Arc::clone(&queue);
        let worker = tokio::spawn(async move {
            for _ in 0..2 {
                let _ = q.get().await;
                tokio::time::sleep(Duration::from_millis(5)).await;
                q.task_done();
            }
        });

        tokio::time::timeout(Duration::from_secs(5), queue.join())
            .await
            .expect("join should resolve after both items are acknowledged");
        assert_eq!(queue.unfinished(), 0);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_get_wakes_on_put() {
        let queue = Arc::new(WorkQueue::new());
        let q = Arc::clone(&queue);
        let waiter = tokio::spawn(async move { q.get().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.put(42);

        let value = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiting consumer should be woken")
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_consumers_drain_interleaved_puts() {
        let queue = Arc::new(WorkQueue::new());
        let taken = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let consumers: Vec<_> = (0..9)
            .map(|_| {
                let q = Arc::clone(&queue);
                let taken = Arc::clone(&taken);
                tokio::spawn(async move {
                    loop {
                        let _ = q.get().await;
                        taken.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                        q.task_done();
                    }
                })
            })
            .collect();

        for round in 0..200 {
            queue.put(round);
            if round % 17 == 0 {
                tokio::task::yield_now().await;
            }
        }

        tokio::time::timeout(Duration::from_secs(5), queue.join())
            .await
            .expect("every put should reach a consumer");
        assert_eq!(taken.load(std::sync::atomic::Ordering::SeqCst), 200);

        for consumer in consumers {
            consumer.abort();
        }
    }

    #[test]
    fn test_task_done_never_underflows() {
        let queue: WorkQueue<u8> = WorkQueue::new();
        queue.task_done();
        assert_eq!(queue.unfinished(), 0);
    }
}
