//! `CompartmentLocation`: one point on a simulated cell's morphology.
//!
//! A location is pinned by three values:
//! - `node_id`: global id of the cell the compartment belongs to,
//! - `section_id`: absolute section index within that cell,
//! - `offset`: fractional position along the section, in `[0, 1]`.
//!
//! Locations order lexicographically on `(node_id, section_id, offset)`. This
//! order is what [`CompartmentSet`](crate::compartment_set::CompartmentSet)
//! validates its storage against.

use std::cmp::Ordering;
use std::fmt;

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};

/// A `(node_id, section_id, offset)` triple.
///
/// Values are normally produced by the compartment set parser, which enforces
/// `0.0 <= offset <= 1.0`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(C)]
pub struct CompartmentLocation {
    /// Global id of the cell.
    pub node_id: u64,
    /// Absolute section index.
    pub section_id: u64,
    /// Offset along the section.
    pub offset: f64,
}

impl CompartmentLocation {
    /// Creates a location from its three components.
    #[inline]
    pub const fn new(node_id: u64, section_id: u64, offset: f64) -> Self {
        Self {
            node_id,
            section_id,
            offset,
        }
    }

    /// Components as a tuple, in comparison order.
    #[inline]
    pub const fn as_tuple(&self) -> (u64, u64, f64) {
        (self.node_id, self.section_id, self.offset)
    }
}

impl PartialOrd for CompartmentLocation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.node_id.cmp(&other.node_id) {
            Ordering::Equal => {}
            ord => return Some(ord),
        }
        match self.section_id.cmp(&other.section_id) {
            Ordering::Equal => {}
            ord => return Some(ord),
        }
        self.offset.partial_cmp(&other.offset)
    }
}

impl From<(u64, u64, f64)> for CompartmentLocation {
    fn from((node_id, section_id, offset): (u64, u64, f64)) -> Self {
        Self::new(node_id, section_id, offset)
    }
}

/// Prints as `CompartmentLocation(node_id, section_id, offset)`.
impl fmt::Display for CompartmentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompartmentLocation({}, {}, {})",
            self.node_id, self.section_id, self.offset
        )
    }
}

/// Serialized as the 3-element array used in compartment set documents.
impl Serialize for CompartmentLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(&self.node_id)?;
        tup.serialize_element(&self.section_id)?;
        tup.serialize_element(&self.offset)?;
        tup.end()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality() {
        let a = CompartmentLocation::new(1, 10, 0.5);
        let b = CompartmentLocation::new(1, 10, 0.5);
        let c = CompartmentLocation::new(1, 10, 0.6);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn lexicographic_order() {
        let a = CompartmentLocation::new(0, 5, 0.9);
        let b = CompartmentLocation::new(1, 0, 0.0);
        let c = CompartmentLocation::new(1, 1, 0.0);
        let d = CompartmentLocation::new(1, 1, 0.5);
        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
        assert!(d > a);
        assert!(c <= c);
        assert!(c >= c);
        assert!(!(c < c));
    }

    #[test]
    fn display() {
        let loc = CompartmentLocation::new(4, 40, 0.9);
        assert_eq!(loc.to_string(), "CompartmentLocation(4, 40, 0.9)");
    }

    #[test]
    fn serializes_as_array() {
        let loc = CompartmentLocation::new(3, 30, 0.75);
        assert_eq!(serde_json::to_string(&loc).unwrap(), "[3,30,0.75]");
    }

    #[test]
    fn from_tuple() {
        let loc: CompartmentLocation = (2, 20, 0.25).into();
        assert_eq!(loc.as_tuple(), (2, 20, 0.25));
    }
}
