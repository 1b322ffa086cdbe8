//! The call adapter: invokes a user-supplied stage function, eliding a
//! `Unit` argument when the function takes none.
//!
//! Output injection (a void-returning closure behaving as if it returned
//! `Unit`) is free in Rust — a closure with no explicit return already
//! evaluates to `()`, which is [`Unit`](crate::unit::Unit). Input elision
//! (calling `f()` instead of `f(())`) is the only part that needs engine
//! support, since a single generic `In` can't be pattern-matched against
//! `Unit` at the type level without either specialization (unstable) or the
//! marker-dispatch trick used below, which is the same trick crates like
//! `axum` use to give one trait method many non-overlapping arities.

use crate::unit::Unit;

/// Disambiguates which [`AdaptCall`]/[`AdaptCallRef`] impl applies to a
/// given stage function. Callers never name these types; they are inferred
/// at the `then`/`join*` call site from the stage function's own arity.
#[doc(hidden)]
pub mod marker {
    use std::marker::PhantomData;

    /// The stage function takes no arguments.
    pub struct NoArgs;

    /// The stage function takes its input by value.
    pub struct ByValue<In>(PhantomData<In>);

    /// The stage function takes its input by shared reference.
    pub struct ByRef<In>(PhantomData<In>);
}

/// Adapts a stage function that consumes its input by value, as used by
/// [`Transform`](crate::transform::Transform) and
/// [`Schedule`](crate::schedule::Schedule) stages.
pub trait AdaptCall<In, M> {
    type Output;

    fn adapt_call(&mut self, input: In) -> Self::Output;
}

impl<F, O> AdaptCall<Unit, marker::NoArgs> for F
where
    F: FnMut() -> O,
{
    type Output = O;

    fn adapt_call(&mut self, _input: Unit) -> O {
        self()
    }
}

impl<F, In, O> AdaptCall<In, marker::ByValue<In>> for F
where
    F: FnMut(In) -> O,
{
    type Output = O;

    fn adapt_call(&mut self, input: In) -> O {
        self(input)
    }
}

/// Adapts a stage function that reads its input by shared reference, as
/// used by the sub-stages of a [`join`](crate::join) node — every sub-stage
/// reads the same shared input, so none of them can consume it by value.
pub trait AdaptCallRef<In, M> {
    type Output;

    fn adapt_call_ref(&mut self, input: &In) -> Self::Output;
}

impl<F, O> AdaptCallRef<Unit, marker::NoArgs> for F
where
    F: FnMut() -> O,
{
    type Output = O;

    fn adapt_call_ref(&mut self, _input: &Unit) -> O {
        self()
    }
}

impl<F, In, O> AdaptCallRef<In, marker::ByRef<In>> for F
where
    F: FnMut(&In) -> O,
{
    type Output = O;

    fn adapt_call_ref(&mut self, input: &In) -> O {
        self(input)
    }
}
