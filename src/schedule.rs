//! Hands the parent's output off to the scheduler, dropping it in favor of
//! a fresh `Unit`.
//!
//! This is the node whose entire purpose is to introduce a scheduling
//! boundary between two otherwise-synchronous parts of a graph: it
//! discards whatever value flows into it and re-emits `Unit`, submitting
//! the re-emission itself as a unit of scheduled work.

use crate::node::{Continuation, GraphNode};
use crate::scheduler::Scheduler;
use crate::unit::Unit;

/// Wraps `parent` so that, once it completes, the remainder of the graph
/// resumes on a scheduler-submitted job rather than on whatever thread
/// `parent` happened to finish on.
pub struct Schedule<Parent> {
    parent: Parent,
}

impl<Parent> GraphNode for Schedule<Parent>
where
    Parent: GraphNode,
{
    type Output = Unit;

    fn execute<S, K>(self, scheduler: &S, k: K)
    where
        S: Scheduler,
        K: Continuation<Unit>,
    {
        let Schedule { parent } = self;
        let scheduler_for_parent = scheduler.clone();
        parent.execute(scheduler, move |_discarded| {
            log::trace!("schedule: submitting the downstream continuation to the scheduler");
            scheduler_for_parent.submit(move || k(()));
        });
    }
}

/// Starts a new graph rooted at a scheduling boundary: the base case used
/// by the [`initiate!`](crate::initiate) macro.
///
/// `schedule(Root)` is how every graph begins: the first user-supplied
/// stage function always runs as scheduled work rather than inline on the
/// thread that built the graph.
pub fn schedule<Parent>(parent: Parent) -> Schedule<Parent>
where
    Parent: GraphNode,
{
    Schedule { parent }
}
