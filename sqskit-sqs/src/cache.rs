//! URL-keyed queue cache

use dashmap::DashMap;
use tracing::debug;

use crate::error::SqsError;
use crate::model::Queue;

/// Store of known queues, keyed strictly by URL
///
/// Passing a queue without a URL is a usage error and fails with
/// [`SqsError::UnboundQueue`].
pub trait QueueCache: Send + Sync {
    fn exists(&self, queue: &Queue) -> Result<bool, SqsError>;

    fn get(&self, queue: &Queue) -> Result<Option<Queue>, SqsError>;

    /// Insert or overwrite the entry for the queue's URL
    fn add(&self, queue: &Queue) -> Result<(), SqsError>;

    fn remove(&self, queue: &Queue) -> Result<(), SqsError>;
}

/// In-memory queue cache
#[derive(Debug, Default)]
pub struct QueueStorage {
    queues: DashMap<String, Queue>,
}

impl QueueStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    pub fn urls(&self) -> Vec<String> {
        self.queues.iter().map(|q| q.key().clone()).collect()
    }

    pub fn clear(&self) {
        self.queues.clear();
    }
}

impl QueueCache for QueueStorage {
    fn exists(&self, queue: &Queue) -> Result<bool, SqsError> {
        Ok(self.queues.contains_key(queue.bound_url()?))
    }

    fn get(&self, queue: &Queue) -> Result<Option<Queue>, SqsError> {
        Ok(self
            .queues
            .get(queue.bound_url()?)
            .map(|q| q.value().clone()))
    }

    fn add(&self, queue: &Queue) -> Result<(), SqsError> {
        let url = queue.bound_url()?;
        debug!(url = %url, "Caching queue");
        self.queues.insert(url.to_string(), queue.clone());
        Ok(())
    }

    fn remove(&self, queue: &Queue) -> Result<(), SqsError> {
        let url = queue.bound_url()?;
        debug!(url = %url, "Evicting queue");
        self.queues.remove(url);
        Ok(())
    }
}
