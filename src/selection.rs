//! `Selection`: an immutable set of node ids stored as sorted id ranges.
//!
//! A selection is the filter handed to [`CompartmentSet`](crate::compartment_set::CompartmentSet)
//! queries. The public range type is half-open, `[start, end)`, so
//! `(2, 3)` covers id 2 only. Ranges are sorted and merged on construction,
//! so membership is a binary search and [`flatten`](Selection::flatten)
//! always yields ascending, unique ids.
//!
//! Storage keeps the last id of each run rather than its end, which leaves
//! `u64::MAX` representable as a member.
//!
//! An *empty* selection carries a special meaning throughout this crate: it is
//! the "no filter" sentinel and accepts every node id.

use std::fmt;

/// Half-open id range `(start, end)`.
pub type Range = (u64, u64);

/// Immutable, normalized set of node ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    /// Inclusive `(first, last)` runs, ascending and non-adjacent.
    runs: Vec<(u64, u64)>,
}

impl Selection {
    /// Creates an empty selection (the "accept all" filter).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selection from explicit ids. Order and duplicates are irrelevant.
    ///
    /// # Example
    /// ```rust
    /// use compartment_sets::selection::Selection;
    /// let sel = Selection::from_values([5, 1, 2, 2, 3]);
    /// assert_eq!(sel.ranges(), vec![(1, 4), (5, 6)]);
    /// assert_eq!(sel.flatten(), vec![1, 2, 3, 5]);
    /// ```
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let mut ids: Vec<u64> = values.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let mut runs: Vec<(u64, u64)> = Vec::new();
        for id in ids {
            // ids are unique and ascending, so `last < id` here
            match runs.last_mut() {
                Some((_, last)) if *last + 1 == id => *last = id,
                _ => runs.push((id, id)),
            }
        }
        Self { runs }
    }

    /// Builds a selection from half-open `[start, end)` ranges. Empty ranges
    /// (`start >= end`) are dropped, overlapping or touching ranges are merged.
    ///
    /// # Example
    /// ```rust
    /// use compartment_sets::selection::Selection;
    /// let sel = Selection::from_ranges([(2, 3), (5, 8), (7, 9)]);
    /// assert_eq!(sel.flatten(), vec![2, 5, 6, 7, 8]);
    /// ```
    pub fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = Range>,
    {
        let mut input: Vec<(u64, u64)> = ranges
            .into_iter()
            .filter(|(start, end)| start < end)
            .map(|(start, end)| (start, end - 1))
            .collect();
        input.sort_unstable();

        let mut runs: Vec<(u64, u64)> = Vec::with_capacity(input.len());
        for (first, last) in input {
            match runs.last_mut() {
                // overlapping or adjacent runs
                Some((_, prev_last)) if first <= prev_last.saturating_add(1) => {
                    *prev_last = (*prev_last).max(last)
                }
                _ => runs.push((first, last)),
            }
        }
        Self { runs }
    }

    /// Returns `true` if `id` is a member.
    ///
    /// Note that an empty selection contains nothing; callers that treat the
    /// empty selection as "accept all" must check [`is_empty`](Self::is_empty).
    #[inline]
    pub fn contains(&self, id: u64) -> bool {
        let idx = self.runs.partition_point(|&(first, _)| first <= id);
        idx > 0 && id <= self.runs[idx - 1].1
    }

    /// `true` when the selection has no ids.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of ids covered (saturates at `u64::MAX`).
    pub fn len(&self) -> u64 {
        self.runs
            .iter()
            .fold(0u64, |acc, (f, l)| acc.saturating_add((l - f).saturating_add(1)))
    }

    /// The normalized half-open ranges, ascending and non-overlapping.
    ///
    /// A run ending at `u64::MAX` reports `end == u64::MAX`, since the true
    /// end does not fit in a `u64`; use [`contains`](Self::contains) for
    /// exact membership of that id.
    pub fn ranges(&self) -> Vec<Range> {
        self.runs
            .iter()
            .map(|&(first, last)| (first, last.saturating_add(1)))
            .collect()
    }

    /// All ids, ascending.
    pub fn flatten(&self) -> Vec<u64> {
        self.runs.iter().flat_map(|&(f, l)| f..=l).collect()
    }

    /// Filter predicate with the "empty accepts all" convention applied.
    #[inline]
    pub(crate) fn accepts(&self, id: u64) -> bool {
        self.is_empty() || self.contains(id)
    }
}

impl FromIterator<u64> for Selection {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Selection::from_values(iter)
    }
}

impl From<Vec<u64>> for Selection {
    fn from(values: Vec<u64>) -> Self {
        Selection::from_values(values)
    }
}

impl From<&[u64]> for Selection {
    fn from(values: &[u64]) -> Self {
        Selection::from_values(values.iter().copied())
    }
}

/// Prints the half-open ranges, e.g. `Selection([[1, 3], [7, 8]])`.
impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selection([")?;
        for (i, (start, end)) in self.ranges().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[{start}, {end}]")?;
        }
        write!(f, "])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values_merges_runs() {
        let sel = Selection::from_values([3, 1, 2, 10, 11, 2]);
        assert_eq!(sel.ranges(), vec![(1, 4), (10, 12)]);
        assert_eq!(sel.len(), 5);
        assert_eq!(sel.flatten(), vec![1, 2, 3, 10, 11]);
    }

    #[test]
    fn contains_excludes_range_end() {
        let sel = Selection::from_ranges([(5, 7), (0, 1)]);
        assert!(sel.contains(0));
        assert!(!sel.contains(1));
        assert!(sel.contains(5));
        assert!(sel.contains(6));
        assert!(!sel.contains(7));
        assert!(!sel.contains(u64::MAX));
    }

    #[test]
    fn single_width_range_covers_one_id() {
        let sel = Selection::from_ranges([(2, 3)]);
        assert_eq!(sel.flatten(), vec![2]);
        assert_eq!(sel.len(), 1);
        assert_eq!(sel.ranges(), vec![(2, 3)]);
    }

    #[test]
    fn max_id_is_representable() {
        let sel = Selection::from_values([u64::MAX, u64::MAX - 1, 0]);
        assert_eq!(sel.ranges(), vec![(0, 1), (u64::MAX - 1, u64::MAX)]);
        assert!(sel.contains(u64::MAX));
        assert!(sel.contains(u64::MAX - 1));
        assert_eq!(sel.len(), 3);
    }

    #[test]
    fn from_ranges_drops_empty_and_merges_overlaps() {
        let sel = Selection::from_ranges([(9, 4), (1, 3), (2, 5), (5, 7), (20, 20), (30, 31)]);
        assert_eq!(sel.ranges(), vec![(1, 7), (30, 31)]);
        assert_eq!(sel.flatten(), vec![1, 2, 3, 4, 5, 6, 30]);
    }

    #[test]
    fn from_ranges_and_from_values_agree() {
        assert_eq!(
            Selection::from_ranges([(3, 6), (10, 11)]),
            Selection::from_values([3, 4, 5, 10])
        );
    }

    #[test]
    fn empty_selection_accepts_everything() {
        let sel = Selection::new();
        assert!(sel.is_empty());
        assert!(!sel.contains(0));
        assert!(sel.accepts(0));
        assert!(sel.accepts(42));
        assert!(sel.flatten().is_empty());
    }

    #[test]
    fn non_empty_selection_only_accepts_members() {
        let sel: Selection = vec![2, 3].into();
        assert!(sel.accepts(2));
        assert!(!sel.accepts(1));
    }

    #[test]
    fn display() {
        let sel = Selection::from_values([1, 2, 7]);
        assert_eq!(sel.to_string(), "Selection([[1, 3], [7, 8]])");
    }
}
