//! Lazy, selection-filtered cursor over a compartment set's storage.
//!
//! [`FilteredIter`] is a forward cursor bound to one [`Selection`]. On
//! construction and after every advance it skips positions whose `node_id`
//! the selection rejects, so it always rests either on an accepted location
//! or on the end position. It is a plain Rust [`Iterator`] as well, and the
//! `(begin, end)` pair returned by
//! [`CompartmentSet::filtered_range`](crate::compartment_set::CompartmentSet::filtered_range)
//! supports the explicit "advance until equal to end" style.
//!
//! Cursors compare by position only; the bound selection is not part of
//! equality.

use std::iter::FusedIterator;

use crate::location::CompartmentLocation;
use crate::selection::Selection;

/// Forward cursor yielding the locations accepted by a [`Selection`].
#[derive(Clone, Debug)]
pub struct FilteredIter<'a> {
    locations: &'a [CompartmentLocation],
    current: usize,
    /// Owned copy; an empty selection accepts every location.
    selection: Selection,
}

impl<'a> FilteredIter<'a> {
    /// Cursor at the first accepted location (or at the end).
    pub(crate) fn new(locations: &'a [CompartmentLocation], selection: Selection) -> Self {
        let mut it = Self {
            locations,
            current: 0,
            selection,
        };
        it.skip_to_valid();
        it
    }

    /// End sentinel for `locations`.
    pub(crate) fn end(locations: &'a [CompartmentLocation]) -> Self {
        Self {
            locations,
            current: locations.len(),
            selection: Selection::new(),
        }
    }

    fn skip_to_valid(&mut self) {
        while let Some(loc) = self.locations.get(self.current) {
            if self.selection.accepts(loc.node_id) {
                break;
            }
            self.current += 1;
        }
    }

    /// Location under the cursor, `None` at the end position.
    #[inline]
    pub fn get(&self) -> Option<&'a CompartmentLocation> {
        self.locations.get(self.current)
    }

    /// Moves to the next accepted location. No-op at the end position.
    pub fn advance(&mut self) {
        if self.current < self.locations.len() {
            self.current += 1;
            self.skip_to_valid();
        }
    }

    /// `true` at the end position.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.current >= self.locations.len()
    }

    /// Index of the cursor in the underlying storage.
    #[inline]
    pub fn position(&self) -> usize {
        self.current
    }

    /// The selection this cursor filters by.
    #[inline]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }
}

impl PartialEq for FilteredIter<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.locations.as_ptr(), other.locations.as_ptr())
            && self.current == other.current
    }
}

impl Eq for FilteredIter<'_> {}

impl<'a> Iterator for FilteredIter<'a> {
    type Item = &'a CompartmentLocation;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.get()?;
        self.advance();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.locations.len().saturating_sub(self.current);
        if self.selection.is_empty() {
            (remaining, Some(remaining))
        } else {
            // the cursor rests on an accepted location unless at the end
            ((remaining > 0) as usize, Some(remaining))
        }
    }
}

impl FusedIterator for FilteredIter<'_> {}
