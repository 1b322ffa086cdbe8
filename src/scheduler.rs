//! The scheduler contract and a handful of reference implementations.
//!
//! The engine only consumes an abstract *submit(work)* interface — this
//! module is that interface plus the small set of schedulers a demo or
//! test suite actually needs: thread pools, inline execution, and a test
//! double. They are kept intentionally simple; they are collaborators, not
//! part of the engine itself.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Accepts nullary work items and promises to eventually run each exactly
/// once. No error channel, no return value.
///
/// Implementations are expected to be cheap to clone (a handle to shared
/// queue/pool state), since every [`Schedule`](crate::schedule::Schedule)
/// and [`join`](crate::join) node clones its scheduler to move an owned
/// handle into the continuation closures it submits.
pub trait Scheduler: Clone + Send + 'static {
    fn submit<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static;
}

/// Runs submitted work immediately, on the calling thread.
///
/// Useful for deterministic tests that want to pin down ordering, and as
/// the trivial scheduler that guarantees progress even when nothing is
/// willing to submit work anywhere else.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineScheduler;

impl Scheduler for InlineScheduler {
    fn submit<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        work();
    }
}

/// Spawns a detached OS thread per submission.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpawnScheduler;

impl Scheduler for SpawnScheduler {
    fn submit<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        log::trace!("SpawnScheduler: spawning a thread for a submitted job");
        thread::spawn(work);
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

struct ThreadPoolInner {
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

/// A fixed-size pool of worker threads pulling jobs off a shared channel.
///
/// A standard worker-pool-over-a-channel, as implemented throughout the
/// Rust ecosystem (e.g. the `threadpool` crate, or the
/// `macrokid_core::common::threads::ThreadPool` pattern this crate's pack
/// also contains). Cloning a `ThreadPool` clones a cheap handle to the same
/// pool; the pool shuts down and joins its workers when the last handle is
/// dropped.
#[derive(Clone)]
pub struct ThreadPool {
    inner: Arc<ThreadPoolInner>,
}

impl ThreadPool {
    /// Spawns `workers` worker threads. Panics if `workers == 0`.
    pub fn new(workers: usize) -> Self {
        assert!(workers > 0, "a thread pool needs at least one worker");

        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..workers)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                thread::Builder::new()
                    .name(format!("graphflow-worker-{id}"))
                    .spawn(move || worker_loop(&receiver))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        ThreadPool {
            inner: Arc::new(ThreadPoolInner {
                sender: Mutex::new(Some(sender)),
                workers: Mutex::new(handles),
            }),
        }
    }
}

fn worker_loop(receiver: &Mutex<mpsc::Receiver<Job>>) {
    loop {
        let job = {
            let receiver = receiver.lock().unwrap_or_else(|e| e.into_inner());
            receiver.recv()
        };
        match job {
            Ok(job) => job(),
            Err(_) => {
                log::trace!("graphflow worker thread shutting down: channel closed");
                break;
            }
        }
    }
}

impl Scheduler for ThreadPool {
    fn submit<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let job: Job = Box::new(work);
        let sender = self.inner.sender.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = sender.as_ref() {
            // A send error means every worker has already exited, which can
            // only happen after the pool itself started shutting down; the
            // scheduler contract has no error channel, so this is dropped.
            let _ = sender.send(job);
        }
    }
}

impl Drop for ThreadPoolInner {
    fn drop(&mut self) {
        // Drop the sender first so `recv()` in each worker unblocks with an
        // error, then join every worker before the pool itself goes away.
        self.sender.lock().unwrap_or_else(|e| e.into_inner()).take();

        let handles = std::mem::take(&mut *self.workers.lock().unwrap_or_else(|e| e.into_inner()));
        for handle in handles {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::sync_channel;

    #[test]
    fn inline_scheduler_runs_synchronously() {
        let mut ran = false;
        InlineScheduler.submit(|| ran = true);
        assert!(ran);
    }

    #[test]
    fn thread_pool_runs_every_submitted_job() {
        let pool = ThreadPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = sync_channel::<()>(32);

        for _ in 0..32 {
            let counter = Arc::clone(&counter);
            let tx = tx.clone();
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                tx.send(()).unwrap();
            });
        }
        drop(tx);

        for _ in 0..32 {
            rx.recv().unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 32);
    }

    #[test]
    fn thread_pool_clone_shares_the_same_workers() {
        let pool = ThreadPool::new(2);
        let pool2 = pool.clone();
        let (tx, rx) = sync_channel::<()>(1);

        pool2.submit(move || {
            tx.send(()).unwrap();
        });

        rx.recv().unwrap();
    }
}
