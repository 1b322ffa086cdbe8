//! Variadic-looking call syntax for starting and extending a graph.
//!
//! Rust has no true variadic generics, so `Combinator` names its fan-out
//! methods `join2`..`join8` rather than a single overloaded `join`. These
//! two macros are the user-facing veneer over that: `then!` picks the
//! right `Combinator` method from however many stage functions are passed,
//! and `initiate!` does the same starting from a fresh graph.

/// Starts a new graph: `initiate!(f)` for a single first stage, or
/// `initiate!(f1, f2, ..)` (up to 8 functions) to begin with a fan-out.
///
/// Expands to [`schedule`](crate::schedule)`(`[`Root`](crate::Root)`)`
/// followed by the matching [`Combinator`](crate::Combinator) method, so
/// the first user stage always runs as scheduled work rather than inline
/// on the thread that built the graph.
#[macro_export]
macro_rules! initiate {
    ($f:expr $(,)?) => {
        $crate::Combinator::then($crate::schedule($crate::Root), $f)
    };
    ($f1:expr, $f2:expr $(,)?) => {
        $crate::Combinator::join2($crate::schedule($crate::Root), $f1, $f2)
    };
    ($f1:expr, $f2:expr, $f3:expr $(,)?) => {
        $crate::Combinator::join3($crate::schedule($crate::Root), $f1, $f2, $f3)
    };
    ($f1:expr, $f2:expr, $f3:expr, $f4:expr $(,)?) => {
        $crate::Combinator::join4($crate::schedule($crate::Root), $f1, $f2, $f3, $f4)
    };
    ($f1:expr, $f2:expr, $f3:expr, $f4:expr, $f5:expr $(,)?) => {
        $crate::Combinator::join5($crate::schedule($crate::Root), $f1, $f2, $f3, $f4, $f5)
    };
    ($f1:expr, $f2:expr, $f3:expr, $f4:expr, $f5:expr, $f6:expr $(,)?) => {
        $crate::Combinator::join6($crate::schedule($crate::Root), $f1, $f2, $f3, $f4, $f5, $f6)
    };
    ($f1:expr, $f2:expr, $f3:expr, $f4:expr, $f5:expr, $f6:expr, $f7:expr $(,)?) => {
        $crate::Combinator::join7(
            $crate::schedule($crate::Root),
            $f1, $f2, $f3, $f4, $f5, $f6, $f7,
        )
    };
    ($f1:expr, $f2:expr, $f3:expr, $f4:expr, $f5:expr, $f6:expr, $f7:expr, $f8:expr $(,)?) => {
        $crate::Combinator::join8(
            $crate::schedule($crate::Root),
            $f1, $f2, $f3, $f4, $f5, $f6, $f7, $f8,
        )
    };
}

/// Extends an existing graph: `then!(graph, f)` for a single next stage,
/// or `then!(graph, f1, f2, ..)` (up to 8 functions) for a fan-out/join.
///
/// `graph` is consumed, matching [`GraphNode::execute`](crate::GraphNode)'s
/// by-value `self`.
#[macro_export]
macro_rules! then {
    ($graph:expr, $f:expr $(,)?) => {
        $crate::Combinator::then($graph, $f)
    };
    ($graph:expr, $f1:expr, $f2:expr $(,)?) => {
        $crate::Combinator::join2($graph, $f1, $f2)
    };
    ($graph:expr, $f1:expr, $f2:expr, $f3:expr $(,)?) => {
        $crate::Combinator::join3($graph, $f1, $f2, $f3)
    };
    ($graph:expr, $f1:expr, $f2:expr, $f3:expr, $f4:expr $(,)?) => {
        $crate::Combinator::join4($graph, $f1, $f2, $f3, $f4)
    };
    ($graph:expr, $f1:expr, $f2:expr, $f3:expr, $f4:expr, $f5:expr $(,)?) => {
        $crate::Combinator::join5($graph, $f1, $f2, $f3, $f4, $f5)
    };
    ($graph:expr, $f1:expr, $f2:expr, $f3:expr, $f4:expr, $f5:expr, $f6:expr $(,)?) => {
        $crate::Combinator::join6($graph, $f1, $f2, $f3, $f4, $f5, $f6)
    };
    ($graph:expr, $f1:expr, $f2:expr, $f3:expr, $f4:expr, $f5:expr, $f6:expr, $f7:expr $(,)?) => {
        $crate::Combinator::join7($graph, $f1, $f2, $f3, $f4, $f5, $f6, $f7)
    };
    (
        $graph:expr, $f1:expr, $f2:expr, $f3:expr, $f4:expr, $f5:expr, $f6:expr, $f7:expr,
        $f8:expr $(,)?
    ) => {
        $crate::Combinator::join8($graph, $f1, $f2, $f3, $f4, $f5, $f6, $f7, $f8)
    };
}

#[cfg(test)]
mod tests {
    use crate::scheduler::InlineScheduler;
    use crate::Combinator;

    #[test]
    fn initiate_with_one_function_starts_a_single_stage_graph() {
        let graph = initiate!(|| 5);
        assert_eq!(graph.wait_and_get(InlineScheduler), 5);
    }

    #[test]
    fn initiate_with_three_functions_starts_a_fan_out() {
        let graph = initiate!(|| 1, || 2, || 3);
        assert_eq!(graph.wait_and_get(InlineScheduler), (1, 2, 3));
    }

    #[test]
    fn then_extends_a_graph_with_a_single_stage() {
        let graph = initiate!(|| 1);
        let graph = then!(graph, |x: i32| x + 41);
        assert_eq!(graph.wait_and_get(InlineScheduler), 42);
    }

    #[test]
    fn then_extends_a_graph_with_a_fan_out() {
        let graph = initiate!(|| 10);
        let graph = then!(graph, |x: &i32| x + 1, |x: &i32| x + 2);
        assert_eq!(graph.wait_and_get(InlineScheduler), (11, 12));
    }
}
