//! CompartmentSet: a validated, strictly-ordered run of compartment locations
//! belonging to one population.
//!
//! A set is built once from a document fragment of the form
//!
//! ```json
//! { "population": "pop0", "compartment_set": [[1, 10, 0.5], [2, 20, 0.25]] }
//! ```
//!
//! and is immutable afterwards. Construction validates every location and the
//! strict `(node_id, section_id, offset)` ordering in a single left-to-right
//! pass; unsorted or duplicated input is rejected, never reordered.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::compartment_error::CompartmentError;
use crate::debug_invariants::DebugInvariants;
use crate::filtered_iter::FilteredIter;
use crate::json::parse_location;
use crate::location::CompartmentLocation;
use crate::selection::Selection;

const POPULATION_KEY: &str = "population";
const LOCATIONS_KEY: &str = "compartment_set";

/// Locations of one population, strictly increasing.
///
/// # Invariants
///
/// - `locations[i] < locations[i + 1]` for every adjacent pair.
/// - Every offset lies in `[0, 1]`.
///
/// Both are established by [`from_json_value`](Self::from_json_value) and
/// preserved by [`filter`](Self::filter). They can be re-checked with
/// [`validate_invariants`](DebugInvariants::validate_invariants).
#[derive(Clone, Debug, PartialEq)]
pub struct CompartmentSet {
    population: String,
    locations: Vec<CompartmentLocation>,
}

impl CompartmentSet {
    /// Builds a set from a parsed document fragment.
    ///
    /// # Errors
    /// `Format` when the fragment is not an object, `population` is missing or
    /// not a string, `compartment_set` is missing or not an array, any
    /// location is malformed, or the locations are not strictly increasing.
    ///
    /// # Example
    /// ```rust
    /// # fn try_main() -> Result<(), compartment_sets::compartment_error::CompartmentError> {
    /// use compartment_sets::compartment_set::CompartmentSet;
    /// let doc = serde_json::json!({
    ///     "population": "pop0",
    ///     "compartment_set": [[1, 10, 0.5], [2, 20, 0.25]]
    /// });
    /// let cs = CompartmentSet::from_json_value(&doc)?;
    /// assert_eq!(cs.len(), 2);
    /// assert_eq!(cs.population(), "pop0");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_json_value(value: &Value) -> Result<Self, CompartmentError> {
        let obj = value
            .as_object()
            .ok_or_else(|| CompartmentError::format("CompartmentSet must be an object"))?;

        let population = obj
            .get(POPULATION_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CompartmentError::format(
                    "CompartmentSet must contain 'population' key of string type",
                )
            })?
            .to_owned();

        let raw = obj
            .get(LOCATIONS_KEY)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                CompartmentError::format(
                    "CompartmentSet must contain 'compartment_set' key of array type",
                )
            })?;

        let mut locations: Vec<CompartmentLocation> = Vec::with_capacity(raw.len());
        for el in raw {
            let curr = parse_location(el)?;
            if let Some(prev) = locations.last() {
                if !(prev < &curr) {
                    return Err(ordering_error(prev, &curr));
                }
            }
            locations.push(curr);
        }

        log::trace!(
            "validated compartment set: population={population} size={}",
            locations.len()
        );
        Ok(Self {
            population,
            locations,
        })
    }

    /// Parses JSON text and builds a set from it.
    pub fn from_json_str(content: &str) -> Result<Self, CompartmentError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_json_value(&value)
    }

    /// Population label.
    #[inline]
    pub fn population(&self) -> &str {
        &self.population
    }

    /// Number of stored locations.
    #[inline]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// `true` when the set holds no locations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Number of locations whose `node_id` is in `selection`.
    ///
    /// An empty selection counts everything. Otherwise this is a full scan.
    pub fn size(&self, selection: &Selection) -> usize {
        if selection.is_empty() {
            return self.locations.len();
        }
        self.locations
            .iter()
            .filter(|loc| selection.contains(loc.node_id))
            .count()
    }

    /// Copy of the location at `index`.
    ///
    /// # Errors
    /// `OutOfRange` if `index >= self.len()`.
    pub fn get(&self, index: usize) -> Result<CompartmentLocation, CompartmentError> {
        self.locations
            .get(index)
            .copied()
            .ok_or(CompartmentError::OutOfRange {
                index,
                len: self.locations.len(),
            })
    }

    /// Stored locations, ascending.
    #[inline]
    pub fn as_slice(&self) -> &[CompartmentLocation] {
        &self.locations
    }

    /// Iterator over all locations, ascending.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, CompartmentLocation> {
        self.locations.iter()
    }

    /// Distinct node ids present in the set, as a selection.
    pub fn node_ids(&self) -> Selection {
        // storage is sorted by node id first, so duplicates are adjacent
        let mut ids: Vec<u64> = self.locations.iter().map(|loc| loc.node_id).collect();
        ids.dedup();
        Selection::from_values(ids)
    }

    /// `(begin, end)` cursor pair over the locations accepted by `selection`.
    ///
    /// An empty selection accepts everything.
    pub fn filtered_range(&self, selection: Selection) -> (FilteredIter<'_>, FilteredIter<'_>) {
        (
            FilteredIter::new(&self.locations, selection),
            FilteredIter::end(&self.locations),
        )
    }

    /// Begin cursor of [`filtered_range`](Self::filtered_range), usable as an iterator.
    pub fn filtered_iter(&self, selection: Selection) -> FilteredIter<'_> {
        FilteredIter::new(&self.locations, selection)
    }

    /// New set with only the locations accepted by `selection`, same population.
    ///
    /// An empty selection returns a copy of the whole set.
    pub fn filter(&self, selection: &Selection) -> CompartmentSet {
        if selection.is_empty() {
            return self.clone();
        }
        let filtered = CompartmentSet {
            population: self.population.clone(),
            locations: self
                .locations
                .iter()
                .filter(|loc| selection.contains(loc.node_id))
                .copied()
                .collect(),
        };
        crate::debug_invariants!(filtered.validate_invariants(), "CompartmentSet::filter");
        filtered
    }

    /// Document fragment with `population` and `compartment_set` keys.
    pub fn to_json_value(&self) -> Value {
        // inserted in sorted key order so the output is identical with or
        // without serde_json's `preserve_order`
        let mut obj = Map::new();
        let locations = self
            .locations
            .iter()
            .map(|loc| serde_json::json!([loc.node_id, loc.section_id, loc.offset]))
            .collect();
        obj.insert(LOCATIONS_KEY.to_owned(), Value::Array(locations));
        obj.insert(
            POPULATION_KEY.to_owned(),
            Value::String(self.population.clone()),
        );
        Value::Object(obj)
    }

    /// Compact JSON text of [`to_json_value`](Self::to_json_value).
    pub fn to_json_string(&self) -> String {
        self.to_json_value().to_string()
    }
}

fn ordering_error(prev: &CompartmentLocation, curr: &CompartmentLocation) -> CompartmentError {
    CompartmentError::format(format!(
        "CompartmentSet 'compartment_set' must be strictly sorted (no duplicates). \
         Found {prev} before {curr}"
    ))
}

impl DebugInvariants for CompartmentSet {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "CompartmentSet");
    }

    fn validate_invariants(&self) -> Result<(), CompartmentError> {
        for loc in &self.locations {
            if !(0.0..=1.0).contains(&loc.offset) {
                return Err(CompartmentError::format(format!(
                    "{loc} has an offset outside [0, 1]"
                )));
            }
        }
        for pair in self.locations.windows(2) {
            if !(pair[0] < pair[1]) {
                return Err(ordering_error(&pair[0], &pair[1]));
            }
        }
        Ok(())
    }
}

impl FromStr for CompartmentSet {
    type Err = CompartmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_str(s)
    }
}

impl<'a> IntoIterator for &'a CompartmentSet {
    type Item = &'a CompartmentLocation;
    type IntoIter = std::slice::Iter<'a, CompartmentLocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.locations.iter()
    }
}

impl fmt::Display for CompartmentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompartmentSet(population={:?}, size={})",
            self.population,
            self.locations.len()
        )
    }
}

impl Serialize for CompartmentSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // same fixed key order as `to_json_value`
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(LOCATIONS_KEY, &self.locations)?;
        map.serialize_entry(POPULATION_KEY, &self.population)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for CompartmentSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        CompartmentSet::from_json_value(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compartment_error::ErrorKind;

    const DOC: &str = r#"
        {
            "population": "test_population",
            "compartment_set": [
                [1, 10, 0.5],
                [2, 20, 0.25],
                [2, 20, 0.250001],
                [3, 30, 0.75]
            ]
        }
    "#;

    fn sample() -> CompartmentSet {
        DOC.parse().unwrap()
    }

    fn parse_err(s: &str) -> CompartmentError {
        CompartmentSet::from_json_str(s).unwrap_err()
    }

    #[test]
    fn indexed_access() {
        let cs = sample();
        assert_eq!(cs.population(), "test_population");
        assert_eq!(cs.len(), 4);
        assert_eq!(cs.get(0).unwrap(), CompartmentLocation::new(1, 10, 0.5));
        assert_eq!(cs.get(2).unwrap(), CompartmentLocation::new(2, 20, 0.250001));
        assert_eq!(cs.get(3).unwrap(), CompartmentLocation::new(3, 30, 0.75));
        let err = cs.get(4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(err, CompartmentError::OutOfRange { index: 4, len: 4 });
    }

    #[test]
    fn size_with_selection() {
        let cs = sample();
        assert_eq!(cs.size(&Selection::new()), 4);
        assert_eq!(cs.size(&Selection::from_values([1, 2])), 3);
        assert_eq!(cs.size(&Selection::from_values([3, 8, 9, 10, 13])), 1);
        assert_eq!(cs.size(&Selection::from_values([999])), 0);
    }

    #[test]
    fn range_selection_excludes_its_end() {
        let cs = sample();
        let sel = Selection::from_ranges([(2, 3)]);
        assert_eq!(cs.size(&sel), 2);
        let ids: Vec<u64> = cs.filter(&sel).iter().map(|l| l.node_id).collect();
        assert_eq!(ids, vec![2, 2]);
        assert_eq!(cs.filtered_iter(sel).count(), 2);
    }

    #[test]
    fn filter_keeps_population_and_order() {
        let cs = sample();
        let filtered = cs.filter(&Selection::from_values([2, 3]));
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered.population(), "test_population");
        assert_eq!(filtered.node_ids().flatten(), vec![2, 3]);
        assert_eq!(filtered.get(0).unwrap(), cs.get(1).unwrap());

        let all = cs.filter(&Selection::new());
        assert_eq!(all, cs);
        assert_eq!(all.node_ids().flatten(), vec![1, 2, 3]);
    }

    #[test]
    fn filter_with_no_match_is_empty() {
        let filtered = sample().filter(&Selection::from_values([42]));
        assert!(filtered.is_empty());
        assert_eq!(filtered.population(), "test_population");
    }

    #[test]
    fn filtered_range_pair() {
        let cs = sample();
        let (mut it, end) = cs.filtered_range(Selection::new());
        let mut ids = Vec::new();
        while it != end {
            ids.push(it.get().unwrap().node_id);
            it.advance();
        }
        assert_eq!(ids, vec![1, 2, 2, 3]);

        let ids: Vec<u64> = cs
            .filtered_iter(Selection::from_values([2, 3]))
            .map(|loc| loc.node_id)
            .collect();
        assert_eq!(ids, vec![2, 2, 3]);
    }

    #[test]
    fn node_ids_of_empty_set() {
        let cs = CompartmentSet::from_json_str(r#"{"population": "p", "compartment_set": []}"#)
            .unwrap();
        assert!(cs.is_empty());
        assert!(cs.node_ids().is_empty());
    }

    #[test]
    fn serialization_is_sorted_and_compact() {
        let cs = sample();
        assert_eq!(
            cs.to_json_string(),
            r#"{"compartment_set":[[1,10,0.5],[2,20,0.25],[2,20,0.250001],[3,30,0.75]],"population":"test_population"}"#
        );
        assert_eq!(serde_json::to_string(&cs).unwrap(), cs.to_json_string());
        let value = cs.to_json_value();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec![LOCATIONS_KEY, POPULATION_KEY]);
        let back: CompartmentSet = cs.to_json_string().parse().unwrap();
        assert_eq!(back, cs);
    }

    #[test]
    fn serde_deserialize_validates() {
        let cs: CompartmentSet = serde_json::from_str(DOC).unwrap();
        assert_eq!(cs, sample());
        let bad = r#"{"population": "p", "compartment_set": [[1, 0, 0.5], [0, 0, 0.5]]}"#;
        assert!(serde_json::from_str::<CompartmentSet>(bad).is_err());
    }

    #[test]
    fn rejects_wrong_shape() {
        for doc in [
            "[1, 2, 3]",
            r#"{"compartment_set": []}"#,
            r#"{"population": 123, "compartment_set": []}"#,
            r#"{"population": null, "compartment_set": []}"#,
            r#"{"population": "p"}"#,
            r#"{"population": "p", "compartment_set": "not an array"}"#,
            r#"{"population": "p", "compartment_set": 123}"#,
            r#"{"population": "p", "compartment_set": [1]}"#,
        ] {
            assert_eq!(parse_err(doc).kind(), ErrorKind::Format, "{doc}");
        }
    }

    #[test]
    fn rejects_bad_locations() {
        for loc in [
            r#"["bla", 2, 0.1]"#,
            "[1, 2]",
            "[1, 2, 0.1, 1]",
            r#"[1, "a", 0.5]"#,
            r#"[1, 2, "a"]"#,
            "[1, 2, 2.0]",
            "[1, 2, -0.1]",
            "[-1, 2, 0.1]",
            "[1, -2, 0.1]",
            "[1.5, 2, 0.1]",
            "[1, 2.5, 0.1]",
        ] {
            let doc = format!(r#"{{"population": "pop0", "compartment_set": [{loc}]}}"#);
            assert_eq!(parse_err(&doc).kind(), ErrorKind::Format, "{loc}");
        }
    }

    #[test]
    fn rejects_unsorted_or_duplicate() {
        for pair in [
            "[1, 0, 0.5], [0, 0, 0.5]",
            "[0, 1, 0.5], [0, 0, 0.5]",
            "[0, 0, 0.6], [0, 0, 0.5]",
            "[0, 0, 0.5], [0, 0, 0.5]",
        ] {
            let doc = format!(r#"{{"population": "pop0", "compartment_set": [{pair}]}}"#);
            assert_eq!(parse_err(&doc).kind(), ErrorKind::Format, "{pair}");
        }
    }

    #[test]
    fn ordering_error_names_both_locations() {
        let err = parse_err(
            r#"{"population": "p", "compartment_set": [[0, 0, 0.6], [0, 0, 0.5]]}"#,
        );
        let msg = err.to_string();
        assert!(msg.contains("CompartmentLocation(0, 0, 0.6)"), "{msg}");
        assert!(msg.contains("CompartmentLocation(0, 0, 0.5)"), "{msg}");
    }

    #[test]
    fn invalid_json_text() {
        assert_eq!(parse_err("{not json").kind(), ErrorKind::Format);
    }

    #[test]
    fn equality() {
        let a: CompartmentSet =
            r#"{"population": "pop1", "compartment_set": [[1, 10, 0.5], [2, 20, 0.25]]}"#
                .parse()
                .unwrap();
        let b: CompartmentSet =
            r#"{"compartment_set": [[1, 10, 0.5], [2, 20, 0.25]], "population": "pop1"}"#
                .parse()
                .unwrap();
        let c: CompartmentSet =
            r#"{"population": "pop1", "compartment_set": [[1, 10, 0.5], [2, 20, 0.3]]}"#
                .parse()
                .unwrap();
        let d: CompartmentSet =
            r#"{"population": "pop2", "compartment_set": [[1, 10, 0.5], [2, 20, 0.25]]}"#
                .parse()
                .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn invariants_hold_after_parse() {
        assert!(sample().validate_invariants().is_ok());
        sample().debug_assert_invariants();
    }

    #[test]
    fn display() {
        assert_eq!(
            sample().to_string(),
            r#"CompartmentSet(population="test_population", size=4)"#
        );
    }

    #[test]
    fn borrowing_iteration() {
        let cs = sample();
        let offsets: Vec<f64> = (&cs).into_iter().map(|l| l.offset).collect();
        assert_eq!(offsets, vec![0.5, 0.25, 0.250001, 0.75]);
        assert_eq!(cs.iter().count(), cs.len());
    }
}
