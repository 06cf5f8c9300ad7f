// Path and File Name : /home/decepticloud/core/trainer/src/replay.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Experience replay - immutable transitions in a bounded FIFO ring, uniform sampling without replacement, lock-guarded shared variant

use std::collections::VecDeque;
use std::sync::Arc;
use parking_lot::Mutex;
use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

use decepticloud_deception::{Action, State};

/// One `(s, a, r, s', terminal)` experience. Never mutated after insertion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: State,
    pub action: Action,
    pub reward: f64,
    pub next_state: State,
    pub terminal: bool,
}

impl Transition {
    pub fn new(state: State, action: Action, reward: f64, next_state: State, terminal: bool) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            terminal,
        }
    }
}

/// Bounded FIFO; the oldest transition is evicted once capacity is reached.
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// `batch_size` distinct entries chosen uniformly, or `None` if the buffer is smaller.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, batch_size: usize) -> Option<Vec<Transition>> {
        if batch_size == 0 || self.buffer.len() < batch_size {
            return None;
        }
        Some(
            sample(rng, self.buffer.len(), batch_size)
                .into_iter()
                .map(|i| self.buffer[i])
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }
}

/// Replay buffer shared between concurrently stepped environments.
#[derive(Debug, Clone)]
pub struct SharedReplayBuffer {
    inner: Arc<Mutex<ReplayBuffer>>,
}

impl SharedReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ReplayBuffer::new(capacity))),
        }
    }

    pub fn push(&self, transition: Transition) {
        self.inner.lock().push(transition);
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, batch_size: usize) -> Option<Vec<Transition>> {
        self.inner.lock().sample(rng, batch_size)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
