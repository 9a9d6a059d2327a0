//! The result surface handed back to callers: a ranked, fully
//! denormalized, JSON-serializable view built from the internal
//! [`Parse`](crate::parse::Parse) representation once a line's search
//! has finished. Callers never see a `Parse` directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::parse::{Parse, Slot};

/// One slot's reported assignment: the syllable it covers, the meter
/// value of the position it falls in, and its own violation bit per
/// constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotReport {
    pub syllable_text: String,
    pub wordtoken_id: u32,
    pub meter_val: char,
    pub violations: BTreeMap<String, u8>,
}

/// One position's reported shape and per-slot violation vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionViolationReport {
    pub meter_val: char,
    pub slot_count: usize,
    pub violations: BTreeMap<String, Vec<u8>>,
}

/// One ranked parse, fully denormalized for external consumption: no
/// field requires the caller to hold on to the `WordFormMatrix` or
/// `MeterConfig` that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseReport {
    /// 1-based position in the line's ranked output; `1` is best.
    pub rank: usize,
    pub prominence_str: String,
    pub stress_str: String,
    pub score: f64,
    pub is_bounded: bool,
    pub bounded_by: Vec<String>,
    pub aggregate_violations: BTreeMap<String, u32>,
    pub positions: Vec<PositionViolationReport>,
    pub slots: Vec<SlotReport>,
}

impl ParseReport {
    fn from_parse(rank: usize, parse: &Parse) -> Self {
        let matrix = parse.matrix();

        let positions = parse
            .positions()
            .iter()
            .map(|p| PositionViolationReport {
                meter_val: p.meter_val,
                slot_count: p.slot_count(),
                violations: p.violations.clone(),
            })
            .collect();

        let slots = parse
            .positions()
            .iter()
            .flat_map(|p| {
                p.slots.iter().enumerate().map(move |(offset, slot)| {
                    let syll = &matrix.slots()[slot.syllable_index];
                    let violations = Slot::violations_at(&p.violations, offset)
                        .into_iter()
                        .map(|(name, bit)| (name.to_string(), bit))
                        .collect();
                    SlotReport {
                        syllable_text: syll.text.clone(),
                        wordtoken_id: syll.wordtoken_id,
                        meter_val: p.meter_val,
                        violations,
                    }
                })
            })
            .collect();

        ParseReport {
            rank,
            prominence_str: parse.prominence_str(),
            stress_str: parse.stress_str(),
            score: parse.score(),
            is_bounded: parse.is_bounded(),
            bounded_by: parse.bounded_by().to_vec(),
            aggregate_violations: parse.aggregate_violations().clone(),
            positions,
            slots,
        }
    }
}

/// The full report for one line: every surviving parse (bounded
/// included), ranked, plus the line's ambiguity count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineReport {
    /// Ranked parses, best first. Bounded parses remain in this list —
    /// they're excluded from `ambig`, not from reporting.
    pub parses: Vec<ParseReport>,
    /// Count of unbounded complete parses. `0` or `1` means the line
    /// scans unambiguously (or not at all, if `parses` is also empty);
    /// `2` or more means genuine structural ambiguity survived pruning.
    pub ambig: usize,
}

impl LineReport {
    /// The report for a line with no candidate word-form readings at
    /// all: no parses, not an error.
    pub fn empty() -> Self {
        LineReport { parses: Vec::new(), ambig: 0 }
    }

    /// Build a report from parses already sorted best-first, assigning
    /// 1-based ranks in that order.
    pub fn from_ranked_parses(parses: Vec<Parse>, ambig: usize) -> Self {
        let parses = parses
            .iter()
            .enumerate()
            .map(|(i, p)| ParseReport::from_parse(i + 1, p))
            .collect();
        LineReport { parses, ambig }
    }
}
