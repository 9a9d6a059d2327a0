//! Error taxonomy for the metrical parsing core.
//!
//! Two of the three variants are programmer errors (bad meter
//! configuration, or a constraint returning the wrong arity) that should
//! abort the whole parse run. `UnparseableLine` is a normal, expected
//! outcome — a line may simply not scan under the configured meter — and
//! callers must not treat it as a failure that aborts subsequent lines.

use thiserror::Error;

/// Errors produced by the metrical parsing core.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// No complete parse exists for this line under the configured meter.
    /// Data-dependent, not a programmer error: report it and move on.
    #[error("no complete parse exists for this line under the configured meter")]
    UnparseableLine,

    /// The `MeterConfig` is invalid: an empty shape set, a shape using
    /// characters outside `{w, s}`, a weight naming an unregistered
    /// constraint, a categorical constraint absent from the constraint
    /// list, or a non-finite weight.
    #[error("meter misconfigured: {0}")]
    MeterMisconfigured(String),

    /// A constraint returned a violation vector whose length did not
    /// match the scored position's slot count.
    #[error("constraint '{constraint}' returned {got} violations for a position of {expected} slots")]
    ConstraintArityMismatch {
        constraint: String,
        expected: usize,
        got: usize,
    },
}
