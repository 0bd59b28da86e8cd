//! Ring buffer with uniform sampling.
use super::ReplayBufferConfig;
use crate::{error::VrlError, Configurable};
use anyhow::Result;
use rand::{rngs::SmallRng, seq::index::sample, SeedableRng};

/// A bounded FIFO store of items with uniform sampling without replacement.
///
/// When full, pushing overwrites the oldest item. Typically `T` is
/// [`Transition`](crate::Transition).
pub struct ReplayBuffer<T> {
    capacity: usize,

    /// Position of the next write.
    i: usize,

    size: usize,

    data: Vec<T>,

    rng: SmallRng,
}

impl<T: Clone> ReplayBuffer<T> {
    /// Appends an item, evicting the oldest one when the buffer is full.
    pub fn push(&mut self, item: T) {
        if self.data.len() < self.capacity {
            self.data.push(item);
        } else {
            self.data[self.i] = item;
        }
        self.i = (self.i + 1) % self.capacity;
        self.size = (self.size + 1).min(self.capacity);
    }

    /// Samples `size` distinct stored items uniformly at random.
    ///
    /// Fails with [`VrlError::InsufficientData`] if fewer than `size` items are stored.
    pub fn batch(&mut self, size: usize) -> Result<Vec<T>> {
        if size > self.size {
            return Err(VrlError::InsufficientData {
                requested: size,
                available: self.size,
            }
            .into());
        }
        let ixs = sample(&mut self.rng, self.size, size);
        Ok(ixs.iter().map(|ix| self.data[ix].clone()).collect())
    }

    /// Iterates over the stored items from the oldest to the newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let start = if self.size < self.capacity { 0 } else { self.i };
        (0..self.size).map(move |k| &self.data[(start + k) % self.capacity])
    }

    /// Removes all items.
    pub fn clear(&mut self) {
        self.data.clear();
        self.i = 0;
        self.size = 0;
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if no item is stored.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Maximum number of stored items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Clone> Configurable for ReplayBuffer<T> {
    type Config = ReplayBufferConfig;

    fn build(config: Self::Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            capacity: config.capacity,
            i: 0,
            size: 0,
            data: Vec::with_capacity(config.capacity.min(1 << 16)),
            rng: SmallRng::seed_from_u64(config.seed),
        })
    }
}
