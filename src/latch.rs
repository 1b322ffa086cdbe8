//! A one-shot synchronization primitive: `wait()` blocks until a single
//! `count_down()` has been observed.
//!
//! A mutex-guarded flag plus a condition variable, rather than anything
//! more exotic. This is the only thing in the engine that blocks.

use std::sync::{Condvar, Mutex};

/// Lives on the waiting thread's stack for the duration of
/// [`wait_and_get`](crate::node::Combinator::wait_and_get).
pub struct Latch {
    done: Mutex<bool>,
    cv: Condvar,
}

impl Latch {
    pub fn new() -> Self {
        Latch {
            done: Mutex::new(false),
            cv: Condvar::new(),
        }
    }

    /// Signals the latch. Exactly one `count_down` is expected per graph
    /// execution; calling it more than once is harmless (later calls are
    /// no-ops) but indicates the last-finisher invariant was violated
    /// upstream.
    pub fn count_down(&self) {
        let mut done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        *done = true;
        self.cv.notify_all();
    }

    /// Blocks the calling thread until `count_down` has been called.
    pub fn wait(&self) {
        let mut done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        while !*done {
            done = self.cv.wait(done).unwrap_or_else(|e| e.into_inner());
        }
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn wait_returns_immediately_after_count_down() {
        let latch = Latch::new();
        latch.count_down();
        latch.wait();
    }

    #[test]
    fn wait_blocks_until_another_thread_counts_down() {
        let latch = Arc::new(Latch::new());
        let latch2 = Arc::clone(&latch);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            latch2.count_down();
        });

        latch.wait();
        handle.join().unwrap();
    }
}
