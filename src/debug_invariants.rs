//! Structural invariant checks for the compartment containers.
//!
//! Parsing validates its input unconditionally. Values produced in other ways,
//! such as the subsets returned by
//! [`CompartmentSet::filter`](crate::compartment_set::CompartmentSet::filter),
//! are re-checked through this trait when invariant checking is enabled.

use crate::compartment_error::CompartmentError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Panic on a violated invariant when checking is enabled; no-op otherwise.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first violation as a `Format` error.
    fn validate_invariants(&self) -> Result<(), CompartmentError>;
}

/// Run a fallible invariant check and panic with context on error.
///
/// Compiled in for debug builds and for the `check-invariants` and
/// `strict-invariants` features; expands to nothing otherwise.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
