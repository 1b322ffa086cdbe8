//! # Statically-composed asynchronous task graphs
//!
//! A task graph is built up, combinator by combinator, entirely at compile
//! time: each call to [`Combinator::then`] or one of the `join2`..`join8`
//! methods wraps the graph built so far in a new node whose type encodes
//! exactly what it does. There is no dynamic graph structure to walk,
//! allocate, or mutate after construction — running the graph is just
//! calling [`Combinator::wait_and_get`] (or driving it with your own
//! continuation via [`GraphNode::execute`]), and every intermediate stage's
//! ownership is handled by the compiler the same way it would be for any
//! other value passed down a chain of closures.
//!
//! ```
//! use graphflow::{initiate, then, Combinator, InlineScheduler};
//!
//! let graph = initiate!(|| 1);
//! let graph = then!(graph, |x: i32| x + 1);
//! assert_eq!(graph.wait_and_get(InlineScheduler), 2);
//! ```
//!
//! Fan-out stages read a shared, read-only copy of their parent's output
//! and run concurrently; the join only completes once every sub-stage has:
//!
//! ```
//! use graphflow::{initiate, then, Combinator, InlineScheduler};
//!
//! let graph = initiate!(|| 10);
//! let graph = then!(graph, |x: &i32| x + 1, |x: &i32| x * 2);
//! assert_eq!(graph.wait_and_get(InlineScheduler), (11, 20));
//! ```
//!
//! ## Data model
//!
//! Every node implements [`GraphNode`], which exposes a single method,
//! `execute`, taking a [`Scheduler`] handle and a continuation to hand the
//! node's output to. [`Combinator`] is a blanket trait over every
//! `GraphNode` providing the methods you actually call to build a graph:
//!
//!   - [`Combinator::then`] appends a single-input/single-output stage,
//!     run synchronously inside the parent's continuation ([`Transform`]).
//!   - [`Combinator::join2`] through [`Combinator::join8`] append a
//!     fan-out/fan-in stage: 2 to 8 sub-stages read the same parent output
//!     by shared reference and run concurrently, and the combined result is
//!     a flat tuple of their outputs ([`join`]'s `Join2`..`Join8`).
//!   - [`schedule`] introduces an explicit scheduling boundary: it discards
//!     its input, re-emits [`Unit`], and submits the rest of the graph to
//!     the scheduler rather than continuing inline.
//!   - [`Combinator::wait_and_get`] drives the whole graph to completion on
//!     a chosen [`Scheduler`] and blocks the calling thread for the result.
//!
//! Every graph starts from [`Root`], whose output is `Unit`; the
//! [`initiate!`] macro builds `schedule(Root)` and appends your first
//! stage(s) in one call, so the very first user stage always runs as
//! scheduled work instead of inline on the thread that built the graph.
//!
//! ## Scheduling
//!
//! The engine never spawns a thread or touches a queue on its own — every
//! node that needs concurrency asks the [`Scheduler`] handle it was given
//! to run some work, and has no opinion on how. [`InlineScheduler`] runs
//! work synchronously (useful for deterministic tests), [`SpawnScheduler`]
//! spawns a detached OS thread per submission, and [`ThreadPool`] is a
//! fixed-size worker pool over a channel for real workloads.
//!
//! ## Macro usage
//!
//! [`initiate!`] and [`then!`] exist because Rust has no variadic generics:
//! `Combinator` itself spells out `then`/`join2`/../`join8` as distinctly
//! named methods, and these two macros pick the right one based on how
//! many stage functions you pass.

#[macro_use]
mod macros;

mod call;
mod join;
mod latch;
mod node;
mod schedule;
mod scheduler;
mod transform;
mod unit;

pub use call::{AdaptCall, AdaptCallRef};
pub use join::{Join2, Join3, Join4, Join5, Join6, Join7, Join8};
pub use node::{Combinator, Continuation, GraphNode, Root};
pub use schedule::{schedule, Schedule};
pub use scheduler::{InlineScheduler, Scheduler, SpawnScheduler, ThreadPool};
pub use transform::Transform;
pub use unit::Unit;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn chain_composition_runs_stages_in_order() {
        let graph = initiate!(|| 2).then(|x: i32| x * 3).then(|x: i32| x + 1);
        assert_eq!(graph.wait_and_get(InlineScheduler), 7);
    }

    #[test]
    fn two_way_join_combines_independent_results() {
        let graph = initiate!(|| 5);
        let graph = then!(graph, |x: &i32| x + 1, |x: &i32| x * 10);
        assert_eq!(graph.wait_and_get(InlineScheduler), (6, 50));
    }

    #[test]
    fn three_way_join_combines_independent_results() {
        let graph = initiate!(|| 1, || 2, || 3);
        let (a, b, c) = graph.wait_and_get(ThreadPool::new(3));
        assert_eq!(a + b + c, 6);
    }

    #[test]
    fn identity_stage_passes_its_input_through_unchanged() {
        let graph = initiate!(|| 99).then(|x: i32| x);
        assert_eq!(graph.wait_and_get(InlineScheduler), 99);
    }

    #[test]
    fn void_stage_produces_unit_and_still_runs() {
        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = Arc::clone(&ran);
        let graph = initiate!(move || {
            ran2.fetch_add(1, Ordering::SeqCst);
        });
        let out: Unit = graph.wait_and_get(InlineScheduler);
        assert_eq!(out, ());
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn deep_chain_of_ten_stages_accumulates_correctly() {
        let mut graph = initiate!(|| 0u32);
        for _ in 0..10 {
            graph = graph.then(|x: u32| x + 1);
        }
        assert_eq!(graph.wait_and_get(InlineScheduler), 10);
    }

    #[test]
    fn wide_fan_out_of_eight_sub_stages_all_run() {
        let graph = initiate!(|| 0i32);
        let graph = then!(
            graph,
            |x: &i32| x + 1,
            |x: &i32| x + 2,
            |x: &i32| x + 3,
            |x: &i32| x + 4,
            |x: &i32| x + 5,
            |x: &i32| x + 6,
            |x: &i32| x + 7,
            |x: &i32| x + 8
        );
        let out = graph.wait_and_get(ThreadPool::new(8));
        assert_eq!(out, (1, 2, 3, 4, 5, 6, 7, 8));
    }

    #[test]
    fn repeated_construction_and_execution_is_deterministic() {
        for _ in 0..50 {
            let graph = initiate!(|| 3).then(|x: i32| x * 7);
            assert_eq!(graph.wait_and_get(InlineScheduler), 21);
        }
    }

    /// A stage's captured state is dropped exactly once, whether the graph
    /// ran inline or on a real pool.
    #[test]
    fn captured_state_is_dropped_exactly_once() {
        struct DropCounter(Arc<AtomicUsize>);
        impl Drop for DropCounter {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));
        let counter = DropCounter(Arc::clone(&drops));

        let graph = initiate!(move || {
            let _held = &counter;
            7
        });
        assert_eq!(graph.wait_and_get(InlineScheduler), 7);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn schedule_boundary_composes_with_then_and_join() {
        let graph = initiate!(|| 1)
            .then(|x: i32| x + 1)
            .then(|x: i32| x * 10);
        let graph = crate::schedule(graph).then(|_: Unit| 42);
        assert_eq!(graph.wait_and_get(SpawnScheduler), 42);
    }
}
