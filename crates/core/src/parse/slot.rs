//! A single syllable-to-position-slot assignment.

use std::collections::BTreeMap;

/// One syllable's assignment within a [`super::Position`].
///
/// The syllable itself is not stored here — `syllable_index` is the
/// slot's offset into the owning parse's `WordFormMatrix`. Syllables
/// are referenced, never owned or duplicated, by any part of a parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub syllable_index: usize,
}

impl Slot {
    pub fn new(syllable_index: usize) -> Self {
        Slot { syllable_index }
    }

    /// This slot's 0/1 violation for each constraint, derived from the
    /// owning position's per-constraint vectors at this slot's offset
    /// within the position.
    pub fn violations_at<'a>(
        violations: &'a BTreeMap<String, Vec<u8>>,
        offset: usize,
    ) -> BTreeMap<&'a str, u8> {
        violations
            .iter()
            .map(|(name, vals)| (name.as_str(), vals[offset]))
            .collect()
    }
}
