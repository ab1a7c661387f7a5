//! Circular dependency detection infrastructure.
//!
//! Producers are zero-argument closures with no way to return a resolution
//! error, so a detected cycle unwinds out of the producer stack as a panic
//! carrying a typed payload. The execute entry point converts the payload
//! back into a [`DiError::CircularDependency`](crate::DiError); every other
//! panic a producer raises is resumed unchanged.

use std::panic::{self, AssertUnwindSafe};

use crate::error::{DiError, DiResult};

/// Panic payload raised when factory resolution detects a cycle.
///
/// Carries the minimal cycle in detection order, e.g. a resolution of `E`
/// that loops back through `F` and `G` reports `["E", "F", "G"]`.
#[derive(Debug)]
pub struct CircularPanic {
    /// The minimal dependency cycle, as key labels.
    pub cycle: Box<[String]>,
}

impl CircularPanic {
    pub(crate) fn new(cycle: Vec<String>) -> Self {
        CircularPanic { cycle: cycle.into_boxed_slice() }
    }
}

/// Runs a resolution pass, converting an escaping [`CircularPanic`] into an
/// error and letting all other panics continue unwinding.
pub(crate) fn with_circular_catch<R>(f: impl FnOnce() -> R) -> DiResult<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => {
            if let Some(circular) = payload.downcast_ref::<CircularPanic>() {
                Err(DiError::CircularDependency(circular.cycle.to_vec()))
            } else {
                panic::resume_unwind(payload)
            }
        }
    }
}
