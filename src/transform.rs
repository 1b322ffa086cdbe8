//! A single-input/single-output stage applied synchronously inside its
//! parent's continuation.
//!
//! This node never submits work to the scheduler itself — it runs
//! wherever the parent's continuation happens to run, whether that is a
//! worker thread (because the parent was a
//! [`Schedule`](crate::schedule::Schedule) or [`join`](crate::join) node) or
//! the original calling thread (because the parent was `Root` or another
//! `Transform`). `Transform::execute` calls `self.parent.execute` and does
//! the adapted call from directly inside the continuation it hands it.

use std::marker::PhantomData;

use crate::call::AdaptCall;
use crate::node::{Continuation, GraphNode};
use crate::scheduler::Scheduler;

/// Applies `f` to `parent`'s output. `M` pins down which [`AdaptCall`] impl
/// applies (whether `f` takes its input by value or elides a `Unit` input);
/// callers never name it, it is inferred from `f`'s arity at the
/// [`then`](crate::node::Combinator::then) call site.
pub struct Transform<Parent, F, M> {
    parent: Parent,
    f: F,
    _marker: PhantomData<M>,
}

impl<Parent, F, M> Transform<Parent, F, M> {
    pub(crate) fn new(parent: Parent, f: F) -> Self {
        Transform {
            parent,
            f,
            _marker: PhantomData,
        }
    }
}

impl<Parent, F, M> GraphNode for Transform<Parent, F, M>
where
    Parent: GraphNode,
    F: AdaptCall<Parent::Output, M> + Send + 'static,
    M: 'static,
{
    type Output = F::Output;

    fn execute<S, K>(self, scheduler: &S, k: K)
    where
        S: Scheduler,
        K: Continuation<Self::Output>,
    {
        let Transform { parent, mut f, .. } = self;
        parent.execute(scheduler, move |input| {
            let output = f.adapt_call(input);
            k(output);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Combinator, Root};
    use crate::scheduler::InlineScheduler;

    #[test]
    fn applies_a_unary_stage_to_the_root() {
        let graph = Root.then(|| 7).then(|x: i32| x * 6);
        assert_eq!(graph.wait_and_get(InlineScheduler), 42);
    }

    #[test]
    fn chains_many_stages_in_order() {
        let mut graph = Root.then(|| 0);
        for _ in 0..16 {
            graph = graph.then(|x: i32| x).then(|x: i32| x + 1);
        }
        assert_eq!(graph.wait_and_get(InlineScheduler), 32);
    }

    #[test]
    fn void_stage_passes_unit_through() {
        let ran = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let ran2 = std::sync::Arc::clone(&ran);
        let graph = Root.then(move || {
            ran2.store(true, std::sync::atomic::Ordering::SeqCst);
        });
        graph.wait_and_get(InlineScheduler);
        assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
    }
}
