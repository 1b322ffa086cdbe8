//! Fan-out/fan-in ("when_all") nodes: 2 through 8 sub-stages run
//! concurrently against a shared, read-only copy of the parent's output,
//! and the combinator's own continuation only fires once every sub-stage
//! has reported in.
//!
//! The shared mechanism every arity follows:
//!
//! - the parent's output is shared via an `Arc<In>` held behind a
//!   `Mutex<Option<Arc<In>>>` slot in the join's state. Each sub-stage
//!   clones the `Arc` out for the duration of its own read and drops its
//!   clone immediately after; only the thread that observes the completion
//!   counter hit zero calls `.take()` on the slot, dropping the last
//!   reference (and so running `In`'s destructor) strictly before it calls
//!   the downstream continuation;
//! - the completion counter is an `AtomicUsize` counting *down* from N,
//!   checked with `Ordering::AcqRel` so the thread observing zero is
//!   guaranteed to see every other thread's write to its output slot;
//! - the output slots are a single `Mutex`-guarded tuple rather than N
//!   independently-atomic slots, since a mutex is the idiomatic way to
//!   guard a handful of writes that don't need to be lock-free.
//!
//! All N sub-stages are submitted to the scheduler symmetrically rather
//! than running the last one inline on the calling thread — every
//! sub-stage is identical code, which is simpler to get right than
//! special-casing the last one, and the last-finisher discipline (exactly
//! one thread observes the counter transition and runs the continuation)
//! holds regardless of which sub-stage that turns out to be.
//!
//! The struct and `GraphNode` impl for each arity (2 through 8) are
//! generated by a single local macro so the concurrency-sensitive part is
//! written, and gets reviewed, exactly once.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::call::AdaptCallRef;
use crate::node::{Continuation, GraphNode};
use crate::scheduler::Scheduler;

macro_rules! define_join {
    (
        $name:ident,
        $state:ident,
        $finish:ident,
        $count:expr,
        [ $( ($field:ident, $F:ident, $M:ident, $O:ident, $idx:tt) ),+ $(,)? ]
    ) => {
        /// A fan-out/join node; see the [module docs](self) for the shared
        /// mechanism every arity follows.
        pub struct $name<Parent, $($F, $M),+> {
            parent: Parent,
            $($field: $F,)+
            _marker: PhantomData<($($M,)+)>,
        }

        impl<Parent, $($F, $M),+> $name<Parent, $($F, $M),+> {
            #[allow(clippy::too_many_arguments)]
            pub(crate) fn new(parent: Parent, $($field: $F,)+) -> Self {
                $name {
                    parent,
                    $($field,)+
                    _marker: PhantomData,
                }
            }
        }

        struct $state<In, $($O),+> {
            remaining: AtomicUsize,
            input: Mutex<Option<Arc<In>>>,
            slots: Mutex<( $(Option<$O>,)+ )>,
        }

        fn $finish<In, $($O: Send + 'static,)+ K>(state: &$state<In, $($O),+>, k: &Mutex<Option<K>>)
        where
            K: FnOnce(($($O,)+)),
        {
            if state.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                log::debug!("join: last finisher observed, firing the downstream continuation");

                // Last finisher: drop the shared input before continuing.
                state.input.lock().unwrap_or_else(|e| e.into_inner()).take();

                let continuation = k.lock().unwrap_or_else(|e| e.into_inner()).take();
                if let Some(continuation) = continuation {
                    let mut slots = state.slots.lock().unwrap_or_else(|e| e.into_inner());
                    let results = ( $( slots.$idx.take().expect("join slot missing at completion"), )+ );
                    drop(slots);
                    continuation(results);
                }
            }
        }

        impl<Parent, $($F, $M, $O),+> GraphNode for $name<Parent, $($F, $M),+>
        where
            Parent: GraphNode,
            Parent::Output: Send + Sync + 'static,
            $( $F: AdaptCallRef<Parent::Output, $M, Output = $O> + Send + 'static, )+
            $( $M: 'static, )+
            $( $O: Send + 'static, )+
        {
            type Output = ( $($O,)+ );

            fn execute<S, K>(self, scheduler: &S, k: K)
            where
                S: Scheduler,
                K: Continuation<Self::Output>,
            {
                let $name { parent, $($field,)+ .. } = self;
                let scheduler_for_substages = scheduler.clone();

                parent.execute(scheduler, move |input| {
                    let state = Arc::new($state {
                        remaining: AtomicUsize::new($count),
                        input: Mutex::new(Some(Arc::new(input))),
                        slots: Mutex::new(Default::default()),
                    });
                    let k = Arc::new(Mutex::new(Some(k)));

                    $(
                        {
                            let state = Arc::clone(&state);
                            let k = Arc::clone(&k);
                            let mut stage_fn = $field;
                            scheduler_for_substages.submit(move || {
                                let input = state
                                    .input
                                    .lock()
                                    .unwrap_or_else(|e| e.into_inner())
                                    .clone()
                                    .expect("join input read after it was already taken");
                                let out = stage_fn.adapt_call_ref(&input);
                                drop(input);
                                state.slots.lock().unwrap_or_else(|e| e.into_inner()).$idx = Some(out);
                                $finish(&state, &k);
                            });
                        }
                    )+
                });
            }
        }
    };
}

define_join!(Join2, JoinState2, finish_join2, 2, [
    (f1, F1, M1, O1, 0),
    (f2, F2, M2, O2, 1),
]);

define_join!(Join3, JoinState3, finish_join3, 3, [
    (f1, F1, M1, O1, 0),
    (f2, F2, M2, O2, 1),
    (f3, F3, M3, O3, 2),
]);

define_join!(Join4, JoinState4, finish_join4, 4, [
    (f1, F1, M1, O1, 0),
    (f2, F2, M2, O2, 1),
    (f3, F3, M3, O3, 2),
    (f4, F4, M4, O4, 3),
]);

define_join!(Join5, JoinState5, finish_join5, 5, [
    (f1, F1, M1, O1, 0),
    (f2, F2, M2, O2, 1),
    (f3, F3, M3, O3, 2),
    (f4, F4, M4, O4, 3),
    (f5, F5, M5, O5, 4),
]);

define_join!(Join6, JoinState6, finish_join6, 6, [
    (f1, F1, M1, O1, 0),
    (f2, F2, M2, O2, 1),
    (f3, F3, M3, O3, 2),
    (f4, F4, M4, O4, 3),
    (f5, F5, M5, O5, 4),
    (f6, F6, M6, O6, 5),
]);

define_join!(Join7, JoinState7, finish_join7, 7, [
    (f1, F1, M1, O1, 0),
    (f2, F2, M2, O2, 1),
    (f3, F3, M3, O3, 2),
    (f4, F4, M4, O4, 3),
    (f5, F5, M5, O5, 4),
    (f6, F6, M6, O6, 5),
    (f7, F7, M7, O7, 6),
]);

define_join!(Join8, JoinState8, finish_join8, 8, [
    (f1, F1, M1, O1, 0),
    (f2, F2, M2, O2, 1),
    (f3, F3, M3, O3, 2),
    (f4, F4, M4, O4, 3),
    (f5, F5, M5, O5, 4),
    (f6, F6, M6, O6, 5),
    (f7, F7, M7, O7, 6),
    (f8, F8, M8, O8, 7),
]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Combinator, Root};
    use crate::scheduler::{InlineScheduler, ThreadPool};
    use std::sync::atomic::AtomicIsize;

    #[test]
    fn join2_combines_two_independent_reads_of_the_same_input() {
        let graph = Root.then(|| 10).join2(|x: &i32| x + 1, |x: &i32| x * 2);
        let (a, b) = graph.wait_and_get(InlineScheduler);
        assert_eq!((a, b), (11, 20));
    }

    #[test]
    fn join3_sums_to_the_expected_total() {
        let graph = Root
            .then(|| 1)
            .join3(|x: &i32| *x, |x: &i32| x + 1, |x: &i32| x + 2);
        let t = graph.wait_and_get(InlineScheduler);
        assert_eq!(t.0 + t.1 + t.2, 1 + 2 + 3);
    }

    #[test]
    fn join8_runs_every_sub_stage_concurrently_on_a_real_pool() {
        let pool = ThreadPool::new(8);
        let graph = Root.then(|| 1).join8(
            |x: &i32| x + 1,
            |x: &i32| x + 2,
            |x: &i32| x + 3,
            |x: &i32| x + 4,
            |x: &i32| x + 5,
            |x: &i32| x + 6,
            |x: &i32| x + 7,
            |x: &i32| x + 8,
        );
        let out = graph.wait_and_get(pool);
        assert_eq!(out, (2, 3, 4, 5, 6, 7, 8, 9));
    }

    #[test]
    fn join_result_can_feed_a_further_stage() {
        let graph = Root
            .then(|| 4)
            .join2(|x: &i32| *x, |x: &i32| x * x)
            .then(|(a, b): (i32, i32)| a + b);
        assert_eq!(graph.wait_and_get(InlineScheduler), 4 + 16);
    }

    /// The shared input must still be alive while any sub-stage runs, and
    /// must be gone by the time the join's continuation observes
    /// completion.
    #[test]
    fn shared_input_outlives_every_substage_but_not_the_continuation() {
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

        assert_eq!(LIVE.load(Ordering::SeqCst), 0);

        let pool = ThreadPool::new(4);
        let graph = Root
            .then(|| Probe::new())
            .join2(
                |_: &Probe| {
                    assert_eq!(LIVE.load(Ordering::SeqCst), 1);
                },
                |_: &Probe| {
                    assert_eq!(LIVE.load(Ordering::SeqCst), 1);
                },
            )
            .then(|_: ((), ())| {
                assert_eq!(LIVE.load(Ordering::SeqCst), 0);
            });

        graph.wait_and_get(pool);
        assert_eq!(LIVE.load(Ordering::SeqCst), 0);
    }
}
