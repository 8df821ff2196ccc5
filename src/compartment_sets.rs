//! CompartmentSets: a named collection of [`CompartmentSet`]s loaded as a
//! whole from one document.
//!
//! The document is an object mapping arbitrary names to compartment set
//! fragments. Loading is all-or-nothing: the first invalid fragment aborts the
//! whole construction. Names enumerate in ascending order, which is also the
//! order used for serialization.
//!
//! The collection is deliberately not `Clone`; pass it by value or by
//! reference. Individual sets handed out by
//! [`compartment_set`](CompartmentSets::compartment_set) are owned copies.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::compartment_error::CompartmentError;
use crate::compartment_set::CompartmentSet;
use crate::debug_invariants::DebugInvariants;

/// Name → [`CompartmentSet`] mapping, ordered by name.
#[derive(Debug, Default, PartialEq)]
pub struct CompartmentSets {
    data: BTreeMap<String, CompartmentSet>,
}

impl CompartmentSets {
    /// Builds the collection from a parsed document.
    ///
    /// # Errors
    /// `Format` if `value` is not an object, or the first error raised by any
    /// entry's [`CompartmentSet::from_json_value`].
    pub fn from_json_value(value: &Value) -> Result<Self, CompartmentError> {
        let obj = value.as_object().ok_or_else(|| {
            CompartmentError::format("Top level compartment_set must be an object")
        })?;

        let data = obj
            .iter()
            .map(|(name, fragment)| {
                CompartmentSet::from_json_value(fragment).map(|cs| (name.clone(), cs))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self { data })
    }

    /// Parses JSON text and builds the collection from it.
    pub fn from_json_str(content: &str) -> Result<Self, CompartmentError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_json_value(&value)
    }

    /// Loads the collection from a JSON file.
    ///
    /// # Errors
    /// `NotFound` if `path` does not exist, `Io` if it cannot be read, and any
    /// error of [`from_json_str`](Self::from_json_str).
    ///
    /// # Example
    /// ```rust,no_run
    /// # fn try_main() -> Result<(), compartment_sets::compartment_error::CompartmentError> {
    /// use compartment_sets::compartment_sets::CompartmentSets;
    /// let sets = CompartmentSets::from_file("compartment_sets.json")?;
    /// for name in sets.names() {
    ///     println!("{name}: {}", sets.compartment_set(&name)?.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CompartmentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => {
                CompartmentError::NotFound(format!("Path does not exist: {}", path.display()))
            }
            _ => CompartmentError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        })?;
        let sets = Self::from_json_str(&content)?;
        log::debug!(
            "loaded {} compartment set(s) from {}",
            sets.len(),
            path.display()
        );
        Ok(sets)
    }

    /// Owned copy of the set called `name`.
    ///
    /// # Errors
    /// `NotFound` if no set has that name.
    pub fn compartment_set(&self, name: &str) -> Result<CompartmentSet, CompartmentError> {
        self.data.get(name).cloned().ok_or_else(|| {
            CompartmentError::NotFound(format!("No compartment set named '{name}'"))
        })
    }

    /// Borrowed set called `name`, if present.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&CompartmentSet> {
        self.data.get(name)
    }

    /// Number of sets.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` when the collection holds no sets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `true` if a set called `name` exists.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Names, ascending.
    pub fn names(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    /// Copies of every set, ordered by name.
    pub fn all_compartment_sets(&self) -> Vec<CompartmentSet> {
        self.data.values().cloned().collect()
    }

    /// Alias for [`all_compartment_sets`](Self::all_compartment_sets).
    pub fn values(&self) -> Vec<CompartmentSet> {
        self.all_compartment_sets()
    }

    /// `(name, set)` copies, ordered by name.
    pub fn items(&self) -> Vec<(String, CompartmentSet)> {
        self.data
            .iter()
            .map(|(name, cs)| (name.clone(), cs.clone()))
            .collect()
    }

    /// Borrowing iterator over `(name, set)`, ordered by name.
    pub fn iter(&self) -> btree_map::Iter<'_, String, CompartmentSet> {
        self.data.iter()
    }

    /// Object mapping each name to its set's fragment.
    pub fn to_json_value(&self) -> Value {
        let obj: Map<String, Value> = self
            .data
            .iter()
            .map(|(name, cs)| (name.clone(), cs.to_json_value()))
            .collect();
        Value::Object(obj)
    }

    /// Compact JSON text of [`to_json_value`](Self::to_json_value).
    pub fn to_json_string(&self) -> String {
        self.to_json_value().to_string()
    }
}

impl DebugInvariants for CompartmentSets {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "CompartmentSets");
    }

    fn validate_invariants(&self) -> Result<(), CompartmentError> {
        self.data.values().try_for_each(|cs| cs.validate_invariants())
    }
}

impl FromStr for CompartmentSets {
    type Err = CompartmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_str(s)
    }
}

impl<'a> IntoIterator for &'a CompartmentSets {
    type Item = (&'a String, &'a CompartmentSet);
    type IntoIter = btree_map::Iter<'a, String, CompartmentSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// Prints as `CompartmentSets({"cs0": CompartmentSet(...), ...})`.
impl fmt::Display for CompartmentSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompartmentSets({{{}}})",
            self.data
                .iter()
                .format_with(", ", |(name, cs), g| g(&format_args!("{name:?}: {cs}")))
        )
    }
}

impl Serialize for CompartmentSets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CompartmentSets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        CompartmentSets::from_json_value(&value).map_err(serde::de::Error::custom)
    }
}
