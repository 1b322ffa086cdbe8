//! The combinator surface shared by every node in the graph, and the `Root`
//! sentinel every graph starts from.
//!
//! [`Combinator`] is the shared trait every node gets for free: it is
//! blanket-implemented once for every [`GraphNode`], so `then`, `join2`
//! through `join8`, and `wait_and_get` only need to be written a single
//! time and apply identically to every concrete node type.
//!
//! There is no separate upward traversal phase to reach the root before
//! execution starts. Each node already owns its parent by value, so
//! `GraphNode::execute` recurses directly into `self.parent.execute(..)`
//! with a continuation closure that applies this node's own stage function
//! once the parent's result arrives. The root is simply the base case of
//! that recursion (see [`Root`] below): execution proceeds forward,
//! one-shot, with no mutation of the graph's shape after construction.

use std::sync::{Arc, Mutex};

use crate::call::{AdaptCall, AdaptCallRef};
use crate::join::{Join2, Join3, Join4, Join5, Join6, Join7, Join8};
use crate::latch::Latch;
use crate::scheduler::Scheduler;
use crate::transform::Transform;
use crate::unit::Unit;

/// A continuation awaiting a node's output. Blanket-implemented for any
/// `FnOnce(T) + Send + 'static` closure — nodes never need to name this
/// type directly, it just makes the bound on `GraphNode::execute` readable.
pub trait Continuation<T>: FnOnce(T) + Send + 'static {}

impl<T, F> Continuation<T> for F where F: FnOnce(T) + Send + 'static {}

/// One vertex of the task graph. Every node knows its statically-typed
/// output and how to produce it from its parent's output, given a
/// scheduler handle and a continuation to hand the result to.
///
/// `execute` consumes `self`: a graph may be driven at most once.
pub trait GraphNode: Sized {
    type Output;

    fn execute<S, K>(self, scheduler: &S, k: K)
    where
        S: Scheduler,
        K: Continuation<Self::Output>;
}

/// The sentinel node every graph starts from. Its output is `Unit`: there
/// is nothing upstream of it to have produced a real value.
///
/// `Root::execute` is the base case of the recursive dispatch described
/// above — it has no parent to recurse into, so it simply hands `Unit` to
/// its continuation and returns.
#[derive(Debug, Default, Clone, Copy)]
pub struct Root;

impl GraphNode for Root {
    type Output = Unit;

    fn execute<S, K>(self, _scheduler: &S, k: K)
    where
        S: Scheduler,
        K: Continuation<Unit>,
    {
        k(());
    }
}

/// The shared `then`/`wait_and_get` surface, blanket-implemented for every
/// [`GraphNode`] — the Rust realization of the source's CRTP combinator
/// base.
pub trait Combinator: GraphNode {
    /// Appends a single-input/single-output stage. Consumes `self`.
    fn then<F, M>(self, f: F) -> Transform<Self, F, M>
    where
        F: AdaptCall<Self::Output, M>,
    {
        Transform::new(self, f)
    }

    /// Appends a 2-way fan-out/join stage. Consumes `self`.
    fn join2<F1, M1, F2, M2>(self, f1: F1, f2: F2) -> Join2<Self, F1, M1, F2, M2>
    where
        F1: AdaptCallRef<Self::Output, M1>,
        F2: AdaptCallRef<Self::Output, M2>,
    {
        Join2::new(self, f1, f2)
    }

    /// Appends a 3-way fan-out/join stage. Consumes `self`.
    fn join3<F1, M1, F2, M2, F3, M3>(
        self,
        f1: F1,
        f2: F2,
        f3: F3,
    ) -> Join3<Self, F1, M1, F2, M2, F3, M3>
    where
        F1: AdaptCallRef<Self::Output, M1>,
        F2: AdaptCallRef<Self::Output, M2>,
        F3: AdaptCallRef<Self::Output, M3>,
    {
        Join3::new(self, f1, f2, f3)
    }

    /// Appends a 4-way fan-out/join stage. Consumes `self`.
    #[allow(clippy::too_many_arguments)]
    fn join4<F1, M1, F2, M2, F3, M3, F4, M4>(
        self,
        f1: F1,
        f2: F2,
        f3: F3,
        f4: F4,
    ) -> Join4<Self, F1, M1, F2, M2, F3, M3, F4, M4>
    where
        F1: AdaptCallRef<Self::Output, M1>,
        F2: AdaptCallRef<Self::Output, M2>,
        F3: AdaptCallRef<Self::Output, M3>,
        F4: AdaptCallRef<Self::Output, M4>,
    {
        Join4::new(self, f1, f2, f3, f4)
    }

    /// Appends a 5-way fan-out/join stage. Consumes `self`.
    #[allow(clippy::too_many_arguments)]
    fn join5<F1, M1, F2, M2, F3, M3, F4, M4, F5, M5>(
        self,
        f1: F1,
        f2: F2,
        f3: F3,
        f4: F4,
        f5: F5,
    ) -> Join5<Self, F1, M1, F2, M2, F3, M3, F4, M4, F5, M5>
    where
        F1: AdaptCallRef<Self::Output, M1>,
        F2: AdaptCallRef<Self::Output, M2>,
        F3: AdaptCallRef<Self::Output, M3>,
        F4: AdaptCallRef<Self::Output, M4>,
        F5: AdaptCallRef<Self::Output, M5>,
    {
        Join5::new(self, f1, f2, f3, f4, f5)
    }

    /// Appends a 6-way fan-out/join stage. Consumes `self`.
    #[allow(clippy::too_many_arguments)]
    fn join6<F1, M1, F2, M2, F3, M3, F4, M4, F5, M5, F6, M6>(
        self,
        f1: F1,
        f2: F2,
        f3: F3,
        f4: F4,
        f5: F5,
        f6: F6,
    ) -> Join6<Self, F1, M1, F2, M2, F3, M3, F4, M4, F5, M5, F6, M6>
    where
        F1: AdaptCallRef<Self::Output, M1>,
        F2: AdaptCallRef<Self::Output, M2>,
        F3: AdaptCallRef<Self::Output, M3>,
        F4: AdaptCallRef<Self::Output, M4>,
        F5: AdaptCallRef<Self::Output, M5>,
        F6: AdaptCallRef<Self::Output, M6>,
    {
        Join6::new(self, f1, f2, f3, f4, f5, f6)
    }

    /// Appends a 7-way fan-out/join stage. Consumes `self`.
    #[allow(clippy::too_many_arguments)]
    fn join7<F1, M1, F2, M2, F3, M3, F4, M4, F5, M5, F6, M6, F7, M7>(
        self,
        f1: F1,
        f2: F2,
        f3: F3,
        f4: F4,
        f5: F5,
        f6: F6,
        f7: F7,
    ) -> Join7<Self, F1, M1, F2, M2, F3, M3, F4, M4, F5, M5, F6, M6, F7, M7>
    where
        F1: AdaptCallRef<Self::Output, M1>,
        F2: AdaptCallRef<Self::Output, M2>,
        F3: AdaptCallRef<Self::Output, M3>,
        F4: AdaptCallRef<Self::Output, M4>,
        F5: AdaptCallRef<Self::Output, M5>,
        F6: AdaptCallRef<Self::Output, M6>,
        F7: AdaptCallRef<Self::Output, M7>,
    {
        Join7::new(self, f1, f2, f3, f4, f5, f6, f7)
    }

    /// Appends an 8-way fan-out/join stage. Consumes `self`.
    #[allow(clippy::too_many_arguments)]
    fn join8<F1, M1, F2, M2, F3, M3, F4, M4, F5, M5, F6, M6, F7, M7, F8, M8>(
        self,
        f1: F1,
        f2: F2,
        f3: F3,
        f4: F4,
        f5: F5,
        f6: F6,
        f7: F7,
        f8: F8,
    ) -> Join8<Self, F1, M1, F2, M2, F3, M3, F4, M4, F5, M5, F6, M6, F7, M7, F8, M8>
    where
        F1: AdaptCallRef<Self::Output, M1>,
        F2: AdaptCallRef<Self::Output, M2>,
        F3: AdaptCallRef<Self::Output, M3>,
        F4: AdaptCallRef<Self::Output, M4>,
        F5: AdaptCallRef<Self::Output, M5>,
        F6: AdaptCallRef<Self::Output, M6>,
        F7: AdaptCallRef<Self::Output, M7>,
        F8: AdaptCallRef<Self::Output, M8>,
    {
        Join8::new(self, f1, f2, f3, f4, f5, f6, f7, f8)
    }

    /// Consumes the graph, drives it to completion on `scheduler`, and
    /// blocks the calling thread until the final value is ready.
    ///
    /// The "sink stage" that stores the incoming value and counts down a
    /// latch is just the terminal continuation passed to `execute` — no
    /// extra node needs to be constructed for it.
    fn wait_and_get<S>(self, scheduler: S) -> Self::Output
    where
        S: Scheduler,
        Self::Output: Send + 'static,
    {
        let latch = Arc::new(Latch::new());
        let slot: Arc<Mutex<Option<Self::Output>>> = Arc::new(Mutex::new(None));

        let latch_for_sink = Arc::clone(&latch);
        let slot_for_sink = Arc::clone(&slot);

        self.execute(&scheduler, move |output: Self::Output| {
            *slot_for_sink.lock().unwrap_or_else(|e| e.into_inner()) = Some(output);
            log::debug!("terminal waiter: last stage finished, opening the latch");
            latch_for_sink.count_down();
        });

        latch.wait();

        slot.lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .expect("terminal continuation must have run before the latch opens")
    }
}

impl<T: GraphNode> Combinator for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::InlineScheduler;

    #[test]
    fn root_produces_unit() {
        let out: Unit = Root.wait_and_get(InlineScheduler);
        assert_eq!(out, ());
    }
}
