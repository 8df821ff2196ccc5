//! # compartment-sets
//!
//! Named collections of **compartment locations** for simulated neural
//! circuits. A compartment location pins a point to one cell (`node_id`), one
//! section of that cell (`section_id`) and a fractional `offset` along the
//! section.
//!
//! ## Features
//! - [`CompartmentSet`]: validated, strictly increasing storage of locations for
//!   one population, with selection-based counting, filtering and lazy
//!   filtered iteration
//! - [`CompartmentSets`]: a name → set collection loaded all-or-nothing from a
//!   JSON document or file
//! - Lossless JSON round-trips with canonical key and location order, through
//!   `serde_json::Value` or `serde`
//!
//! ## Document format
//!
//! ```json
//! {
//!   "cs0": { "population": "pop0", "compartment_set": [[1, 10, 0.5], [2, 20, 0.25]] },
//!   "cs1": { "population": "pop1", "compartment_set": [] }
//! }
//! ```
//!
//! Locations must be strictly increasing by `(node_id, section_id, offset)`;
//! unsorted or duplicated input is rejected at load time.
//!
//! ## Invariant checking
//! Parsing always validates. Derived sets (see [`CompartmentSet::filter`]) are
//! re-checked through [`DebugInvariants`] in debug builds and when the
//! `check-invariants` or `strict-invariants` feature is enabled.

pub mod compartment_error;
pub mod compartment_set;
pub mod compartment_sets;
pub mod debug_invariants;
pub mod filtered_iter;
pub mod json;
pub mod location;
pub mod selection;

pub use compartment_error::{CompartmentError, CompartmentResult, ErrorKind};
pub use compartment_set::CompartmentSet;
pub use compartment_sets::CompartmentSets;
pub use debug_invariants::DebugInvariants;
pub use filtered_iter::FilteredIter;
pub use location::CompartmentLocation;
pub use selection::Selection;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::compartment_error::{CompartmentError, ErrorKind};
    pub use crate::compartment_set::CompartmentSet;
    pub use crate::compartment_sets::CompartmentSets;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::filtered_iter::FilteredIter;
    pub use crate::location::CompartmentLocation;
    pub use crate::selection::Selection;
}
