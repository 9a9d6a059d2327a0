//! A meter position inside a parse: one alphabet symbol (`w`/`s`)
//! together with the slots realizing it and the constraint violations
//! scored against it at append time.

use std::collections::{BTreeMap, BTreeSet};

use super::slot::Slot;

/// One position of a [`super::Parse`].
///
/// `violations` is the single source of truth for this position's
/// constraint scores; `violation_set` and per-slot views are both
/// derived from it rather than tracked independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub meter_val: char,
    pub start_index: usize,
    pub slots: Vec<Slot>,
    /// constraint name -> one 0/1 per slot, length == `slots.len()`.
    pub violations: BTreeMap<String, Vec<u8>>,
    /// constraint names with at least one 1 among this position's slots.
    pub violation_set: BTreeSet<String>,
}

impl Position {
    pub fn new(meter_val: char, start_index: usize, slot_count: usize, violations: BTreeMap<String, Vec<u8>>) -> Self {
        let violation_set = violations
            .iter()
            .filter(|(_, v)| v.iter().any(|&b| b == 1))
            .map(|(name, _)| name.clone())
            .collect();
        let slots = (0..slot_count)
            .map(|i| Slot::new(start_index + i))
            .collect();
        Position {
            meter_val,
            start_index,
            slots,
            violations,
            violation_set,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_prom(&self) -> bool {
        self.meter_val == 's'
    }

    /// The shape string this position realizes, e.g. `"ww"`.
    pub fn shape(&self) -> String {
        std::iter::repeat(self.meter_val).take(self.slot_count()).collect()
    }
}
