//! Scheduler error taxonomy.
//!
//! Three failure classes cross the crate boundary:
//!
//! - [`ScheduleError::Validation`]: the request is structurally broken
//!   (duplicate IDs, unknown references, cyclic prerequisites, numeric
//!   bounds). Rejected before any scheduling work starts.
//! - [`ScheduleError::Infeasible`]: the request is well-formed but no
//!   machine can ever run some required mold.
//! - [`ScheduleError::Internal`]: a decoder invariant was violated at
//!   emit time (overlapping intervals, negative hours). Fatal.
//!
//! Exceeding the optional wall-clock budget is *not* an error: the driver
//! returns the best-so-far schedule with the `partial` flag set.

use thiserror::Error;

/// Categories of request validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An entity has an empty ID string.
    EmptyId,
    /// Two entities of the same kind share an ID.
    DuplicateId,
    /// A component references a mold that doesn't exist.
    UnknownMold,
    /// A component's prerequisite references an unknown component.
    UnknownPrerequisite,
    /// A component lists itself as a prerequisite.
    SelfPrerequisite,
    /// The prerequisite graph contains a cycle.
    CyclicPrerequisites,
    /// A numeric field is outside its documented range.
    OutOfRange,
}

/// A request validation failure.
///
/// Carries the first offending item; validation stops at the first error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description naming the offending item.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Top-level error type for a scheduling request.
#[derive(Debug, Clone, Error)]
pub enum ScheduleError {
    /// Bad input structure; surfaced before any scheduling occurs.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Well-formed input that cannot be scheduled at all.
    #[error("infeasible input: {0}")]
    Infeasible(String),
    /// A decoder invariant was violated at emit time.
    #[error("internal scheduler error: {0}")]
    Internal(String),
}
