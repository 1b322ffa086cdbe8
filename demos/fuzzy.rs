//! Stress-test scenario ported from `fuzzy()` in the original engine's
//! test driver: a few thousand small graphs, each jittered with random
//! nanosecond sleeps between stages, driven back-to-back across a real
//! thread pool to shake out ordering and lifetime bugs that a single
//! deterministic run would never hit.
//!
//! Run with `cargo run --example fuzzy`.

use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use graphflow::{initiate, then, Combinator, ThreadPool};

type SharedRng = Arc<Mutex<StdRng>>;

fn rndsleep(rng: &SharedRng) {
    let nanos = rng.lock().unwrap_or_else(|e| e.into_inner()).gen_range(0..100);
    std::thread::sleep(Duration::from_nanos(nanos));
}

/// Chains a 3-way join into a 2-way join into a final 2-way join, matching
/// `fuzzy()`'s `initiate(...).then(...).then(...).then(...)` shape.
fn run_chained_join_scenario(pool: ThreadPool, rng: SharedRng) {
    let (r1, r2, r3) = (Arc::clone(&rng), Arc::clone(&rng), Arc::clone(&rng));
    let graph = initiate!(
        move || {
            rndsleep(&r1);
            1
        },
        move || {
            rndsleep(&r2);
            2
        },
        move || {
            rndsleep(&r3);
            3
        },
    );

    let (r4, r5) = (Arc::clone(&rng), Arc::clone(&rng));
    let graph = then!(
        graph,
        move |t: &(i32, i32, i32)| {
            rndsleep(&r4);
            let (a, b, c) = *t;
            assert_eq!(a + b + c, 1 + 2 + 3);
            0
        },
        move |t: &(i32, i32, i32)| {
            rndsleep(&r5);
            let (a, b, c) = *t;
            assert_eq!(a + b + c, 1 + 2 + 3);
            1
        },
    );

    let graph = then!(
        graph,
        |t: &(i32, i32)| {
            let (a, b) = *t;
            assert_eq!(a + b, 1);
            "hello".to_string()
        },
        |t: &(i32, i32)| {
            let (a, b) = *t;
            assert_eq!(a + b, 1);
            "world".to_string()
        },
    );

    let graph = graph.then(|t: (String, String)| {
        let (s0, s1) = t;
        assert_eq!(format!("{s0}{s1}"), "helloworld");
    });

    graph.wait_and_get(pool);
}

static LIVE: AtomicIsize = AtomicIsize::new(0);

struct Probe;

impl Probe {
    fn new() -> Self {
        LIVE.fetch_add(1, Ordering::SeqCst);
        Probe
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        LIVE.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Matches `fuzzy()`'s `sctr`-based scenario: the shared value produced by
/// the first stage must be alive for every fan-out sub-stage and gone by
/// the time the final stage runs.
fn run_lifetime_scenario(pool: ThreadPool) {
    assert_eq!(LIVE.load(Ordering::SeqCst), 0);

    let graph = initiate!(|| Probe::new());
    let graph = then!(
        graph,
        |_: &Probe| {
            assert_eq!(LIVE.load(Ordering::SeqCst), 1);
        },
        |_: &Probe| {
            assert_eq!(LIVE.load(Ordering::SeqCst), 1);
        },
    );
    let graph = graph.then(|_: ((), ())| {
        assert_eq!(LIVE.load(Ordering::SeqCst), 0);
    });

    graph.wait_and_get(pool);
    assert_eq!(LIVE.load(Ordering::SeqCst), 0);
}

fn main() {
    simple_logger::SimpleLogger::new()
        .init()
        .expect("only one logger is ever installed per process");

    let pool = ThreadPool::new(8);
    let rng: SharedRng = Arc::new(Mutex::new(StdRng::from_entropy()));

    for i in 0..1000 {
        run_chained_join_scenario(pool.clone(), Arc::clone(&rng));
        if i % 100 == 0 {
            log::info!("fuzzy: {i}/1000 chained-join iterations done");
        }
    }

    for i in 0..1000 {
        run_lifetime_scenario(pool.clone());
        if i % 100 == 0 {
            log::info!("fuzzy: {i}/1000 lifetime iterations done");
        }
    }

    let graph = initiate!(|| 1);
    assert_eq!(graph.wait_and_get(pool), 1);

    log::info!("fuzzy: all iterations passed");
}
