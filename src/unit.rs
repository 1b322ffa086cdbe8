//! The "no data" type threaded through stages that take no input or produce
//! no output.
//!
//! Rust's `()` already has every property the engine needs here: exactly one
//! value, zero runtime size, `Copy`, trivially constructible. There is no
//! need for a bespoke type the way a template-based implementation would
//! need one, so `Unit` is simply an alias.

/// Denotes the absence of a value while preserving the invariant that every
/// stage has a well-defined input and output.
pub type Unit = ();
