/// Fixed-capacity trailing window over the most recent track points.
/// Oldest points are evicted first once the capacity is reached.
use std::collections::VecDeque;

use crate::errors::AnalysisError;

#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> SlidingWindow<T> {
    pub fn new(capacity: usize) -> Result<Self, AnalysisError> {
        if capacity == 0 {
            return Err(AnalysisError::InvalidInput(
                "window capacity must be at least 1".into(),
            ));
        }

        Ok(SlidingWindow {
            buffer: VecDeque::with_capacity(capacity + 1),
            capacity,
        })
    }

    pub fn push(&mut self, item: T) {
        self.buffer.push_back(item);
        if self.buffer.len() > self.capacity {
            self.buffer.pop_front();
        }
    }

    pub fn oldest(&self) -> Result<&T, AnalysisError> {
        self.buffer.front().ok_or(AnalysisError::EmptyWindow)
    }

    pub fn newest(&self) -> Result<&T, AnalysisError> {
        self.buffer.back().ok_or(AnalysisError::EmptyWindow)
    }

    /// Window contents ordered oldest to newest
    pub fn snapshot(&self) -> Vec<T> {
        self.buffer.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.capacity
    }
}
