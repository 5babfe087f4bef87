//! Bounded fan-out of the final output stream to visualisers
//!
//! A consumer asks for a fixed number of interleaved `x, y` values. The
//! render thread appends to every registered consumer and wakes a reader
//! once its buffer is full. A reader can always be released early with
//! [`BufferConsumer::force_notify`].

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

struct ConsumerState {
    buffer: Vec<f32>,
    capacity: usize,
    stopped: bool,
}

pub struct BufferConsumer {
    state: Mutex<ConsumerState>,
    ready: Condvar,
}

/// Shared handle returned by registration
pub type ConsumerHandle = Arc<BufferConsumer>;

impl BufferConsumer {
    /// `capacity` is the number of values (not pairs) per read
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(ConsumerState {
                buffer: Vec::with_capacity(capacity),
                capacity,
                stopped: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Append one output pair. Called from the render thread, so it never
    /// waits on the lock: if a reader holds it, the pair is dropped.
    pub fn write_pair(&self, x: f32, y: f32) {
        let Ok(mut state) = self.state.try_lock() else {
            return;
        };
        if state.buffer.len() + 2 > state.capacity {
            return;
        }
        state.buffer.push(x);
        state.buffer.push(y);
        if state.buffer.len() + 2 > state.capacity {
            self.ready.notify_all();
        }
    }

    fn is_full(state: &ConsumerState) -> bool {
        state.buffer.len() + 2 > state.capacity
    }

    /// Block until the buffer is full or the consumer is stopped, then take
    /// whatever was collected
    pub fn wait_until_full(&self) -> Vec<f32> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = self
            .ready
            .wait_while(state, |s| !s.stopped && !Self::is_full(s))
            .unwrap_or_else(PoisonError::into_inner);
        let capacity = state.capacity;
        std::mem::replace(&mut state.buffer, Vec::with_capacity(capacity))
    }

    /// As [`wait_until_full`](Self::wait_until_full) but gives up after
    /// `timeout`, returning `None` if the buffer did not fill in time
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Vec<f32>> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut state, result) = self
            .ready
            .wait_timeout_while(state, timeout, |s| !s.stopped && !Self::is_full(s))
            .unwrap_or_else(PoisonError::into_inner);
        if result.timed_out() {
            return None;
        }
        let capacity = state.capacity;
        Some(std::mem::replace(&mut state.buffer, Vec::with_capacity(capacity)))
    }

    /// Wake any waiting reader and make future waits return immediately
    pub fn force_notify(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.stopped = true;
        self.ready.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_fills_and_resets() {
        let consumer = BufferConsumer::new(4);
        consumer.write_pair(0.1, 0.2);
        consumer.write_pair(0.3, 0.4);
        consumer.write_pair(0.5, 0.6); // dropped, buffer full
        assert_eq!(consumer.wait_until_full(), vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(consumer.wait_timeout(Duration::from_millis(10)), None);
    }

    #[test]
    fn test_force_notify_releases_reader() {
        let consumer = Arc::new(BufferConsumer::new(1024));
        let reader = {
            let consumer = consumer.clone();
            thread::spawn(move || consumer.wait_until_full())
        };
        consumer.write_pair(1.0, -1.0);
        thread::sleep(Duration::from_millis(20));
        consumer.force_notify();
        let partial = reader.join().unwrap();
        assert!(partial.len() <= 2);
        assert!(consumer.is_stopped());
    }
}
