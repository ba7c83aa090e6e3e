//! Round-robin multi-key FIFO
//!
//! Items are grouped by their owner key. Within a key they leave in arrival
//! order; across keys the queue rotates so that every key with queued work
//! is served once before any key is served again.

use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound::{Excluded, Unbounded};

/// Items stored in a [`FairQueue`] expose the key they are grouped by
pub trait Owned {
    type Key: Ord + Clone + Send;

    fn owner_key(&self) -> &Self::Key;
}

struct QueueState<K, T> {
    /// Only keys with at least one queued item are present
    queues: BTreeMap<K, VecDeque<T>>,
    /// The key served by the most recent dequeue
    last_served: Option<K>,
    len: usize,
}

impl<K: Ord + Clone, T> QueueState<K, T> {
    fn next_key(&self) -> Option<K> {
        let after_last = match &self.last_served {
            Some(last) => self
                .queues
                .range((Excluded(last), Unbounded))
                .next()
                .map(|(key, _)| key),
            None => None,
        };

        after_last
            .or_else(|| self.queues.keys().next())
            .cloned()
    }
}

/// Thread-safe fair queue keyed by owner
pub struct FairQueue<T: Owned> {
    state: Mutex<QueueState<T::Key, T>>,
}

impl<T: Owned> FairQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                queues: BTreeMap::new(),
                last_served: None,
                len: 0,
            }),
        }
    }

    /// Append an item to the tail of its owner's sub-queue
    pub fn enqueue(&self, item: T) {
        let mut state = self.state.lock();
        let key = item.owner_key().clone();
        state.queues.entry(key).or_default().push_back(item);
        state.len += 1;
    }

    /// Remove the head item of the next key in rotation, if any key has work
    pub fn try_dequeue(&self) -> Option<T> {
        let mut state = self.state.lock();
        let key = state.next_key()?;

        let (item, drained) = {
            let queue = state.queues.get_mut(&key)?;
            let item = queue.pop_front();
            (item, queue.is_empty())
        };
        if drained {
            state.queues.remove(&key);
        }

        // The cursor moves past the served key even if it just drained
        state.last_served = Some(key);
        if item.is_some() {
            state.len -= 1;
        }
        item
    }

    /// Evict a key, returning everything that was still queued for it in
    /// FIFO order
    pub fn remove_key(&self, key: &T::Key) -> Vec<T> {
        let mut state = self.state.lock();
        match state.queues.remove(key) {
            Some(queue) => {
                state.len -= queue.len();
                queue.into_iter().collect()
            }
            None => Vec::new(),
        }
    }

    /// Total queued items across all keys
    pub fn len(&self) -> usize {
        self.state.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of keys that currently have queued work
    pub fn key_count(&self) -> usize {
        self.state.lock().queues.len()
    }

    /// Queued items for one key
    pub fn len_for(&self, key: &T::Key) -> usize {
        self.state
            .lock()
            .queues
            .get(key)
            .map(VecDeque::len)
            .unwrap_or(0)
    }

    /// Remove every queued item across all keys
    pub fn drain(&self) -> Vec<T> {
        let mut state = self.state.lock();
        state.len = 0;
        state.last_served = None;
        std::mem::take(&mut state.queues)
            .into_values()
            .flatten()
            .collect()
    }
}

impl<T: Owned> Default for FairQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
