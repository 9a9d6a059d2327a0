//! The parse entity itself: construction, extension, branching,
//! scoring, and the harmonic-bounding / total-ordering relations that
//! drive the search engine in [`crate::search`].

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constraints::PositionContext;
use crate::error::ParseError;
use crate::meter::MeterConfig;
use crate::syllable::WordFormMatrix;

use super::position::Position;

/// Per-line monotonic id generator, used only to break ties between
/// parses whose ordering keys are otherwise equal. Not `Sync` on
/// purpose: a line's search is sequential; parallelism is across lines,
/// each with its own sequence.
#[derive(Debug, Default)]
pub struct IdSequence(Cell<u64>);

impl IdSequence {
    pub fn new() -> Self {
        IdSequence(Cell::new(0))
    }

    pub fn next(&self) -> u64 {
        let v = self.0.get();
        self.0.set(v + 1);
        v
    }
}

/// The result of comparing two parses' violation multisets.
/// `Bounds`/`Bounded` are strict-subset relations; ties survive as
/// `Equal`; anything else is `Incomparable` and neither parse dominates
/// the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundingRelation {
    /// `self`'s violations are a strict subset of `other`'s: `self`
    /// harmonically bounds `other`.
    Bounds,
    /// The reverse: `other` bounds `self`.
    Bounded,
    Equal,
    Incomparable,
}

fn multiset_le(a: &BTreeMap<String, u32>, b: &BTreeMap<String, u32>) -> bool {
    a.iter().all(|(k, v)| b.get(k).copied().unwrap_or(0) >= *v)
}

/// A possibly-partial ordered sequence of [`Position`]s over a
/// [`WordFormMatrix`].
///
/// Extension never mutates an existing parse; `extend` always returns a
/// new `Parse` whose position prefix is shared with its parent via
/// `Arc` rather than deep-copied. `is_bounded`/`bounded_by`
/// are the one exception: harmonic bounding is a relation between
/// sibling parses discovered *after* construction by the search engine,
/// so those two fields are ordinary mutable fields, set in place by
/// [`Parse::mark_bounded`] rather than by producing a new `Parse`.
#[derive(Clone)]
pub struct Parse {
    id: u64,
    matrix: Arc<WordFormMatrix>,
    meter: Arc<MeterConfig>,
    positions: Vec<Arc<Position>>,
    positioned_count: usize,
    is_bounded: bool,
    bounded_by: Vec<String>,
    violation_counts: BTreeMap<String, u32>,
}

impl std::fmt::Debug for Parse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parse")
            .field("id", &self.id)
            .field("positioned_count", &self.positioned_count)
            .field("is_bounded", &self.is_bounded)
            .field("score", &self.score())
            .finish()
    }
}

impl Parse {
    /// An empty parse over `matrix`, ready for its first `extend`.
    pub fn new(matrix: Arc<WordFormMatrix>, meter: Arc<MeterConfig>, seq: &IdSequence) -> Self {
        Parse {
            id: seq.next(),
            matrix,
            meter,
            positions: Vec::new(),
            positioned_count: 0,
            is_bounded: false,
            bounded_by: Vec::new(),
            violation_counts: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn positions(&self) -> &[Arc<Position>] {
        &self.positions
    }

    pub fn matrix(&self) -> &WordFormMatrix {
        &self.matrix
    }

    pub fn positioned_count(&self) -> usize {
        self.positioned_count
    }

    pub fn is_complete(&self) -> bool {
        self.positioned_count == self.matrix.len()
    }

    pub fn is_bounded(&self) -> bool {
        self.is_bounded
    }

    pub fn bounded_by(&self) -> &[String] {
        &self.bounded_by
    }

    /// Mark this parse as harmonically bounded by another parse,
    /// recording `reason` (a dominating parse's id, rendered as a
    /// string) in `bounded_by`. Used only by [`crate::search`]; a
    /// categorical bound is instead recorded during `extend` itself.
    pub(crate) fn mark_bounded(&mut self, reason: String) {
        self.is_bounded = true;
        self.bounded_by.push(reason);
    }

    /// The allowed next shapes given this parse's current tail, in the
    /// meter's declared order, for deterministic child enumeration.
    ///
    /// With no tail yet, the line is anchored to a fixed rising/falling
    /// template rather than left free to open on either prominence:
    /// `branch`/`extend` still rebracket freely from here on (choosing
    /// `w` vs `ww`, say), but the opening symbol itself is fixed by
    /// `prefer_rising`, mirroring the original parser's fixed iambic (or
    /// trochaic) seed template.
    pub fn candidate_shapes(&self) -> Vec<&str> {
        match self.positions.last() {
            Some(p) => self.meter.shapes_starting_differently_than(p.meter_val),
            None => {
                let opposite = if self.meter.prefer_rising() { 's' } else { 'w' };
                self.meter.shapes_starting_differently_than(opposite)
            }
        }
    }

    /// Extend this parse with one more position of shape `shape`.
    ///
    /// Returns `Ok(None)` for the three ordinary refusal cases (same
    /// `meter_val` as the tail, too few syllables remaining, already
    /// bounded); returns `Err` only for the fatal
    /// [`ParseError::ConstraintArityMismatch`] configuration error.
    pub fn extend(&self, shape: &str, seq: &IdSequence) -> Result<Option<Parse>, ParseError> {
        if self.is_bounded {
            return Ok(None);
        }
        self.extend_past_bound(shape, seq)
    }

    /// Extend this parse with one more position, without refusing an
    /// already-bounded parse.
    ///
    /// `extend` stops at the first bound, matching the pure per-parse
    /// contract; but the search engine still needs to walk an
    /// already-bounded branch out to a complete, reportable parse along
    /// one canonical continuation once it stops trying alternatives
    /// from it (a categorically-bounded line must still produce a
    /// rankable result instead of reporting unparseable). This is that
    /// escape hatch, visible only to [`crate::search`].
    pub(crate) fn extend_past_bound(&self, shape: &str, seq: &IdSequence) -> Result<Option<Parse>, ParseError> {
        let mval = match shape.chars().next() {
            Some(c) => c,
            None => return Ok(None),
        };
        if let Some(prev) = self.positions.last() {
            if prev.meter_val == mval {
                return Ok(None);
            }
        }
        let slot_count = shape.len();
        if self.positioned_count + slot_count > self.matrix.len() {
            return Ok(None);
        }

        let start_index = self.positioned_count;
        let prev_meter_val = self.positions.last().map(|p| p.meter_val);
        let ctx = PositionContext {
            meter_val: mval,
            start_index,
            matrix: self.matrix.slots(),
            prev_meter_val,
            meter: &self.meter,
            slot_count,
        };

        let mut violations: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        for constraint in self.meter.constraints() {
            let out = constraint.evaluate(&ctx);
            if out.len() != slot_count {
                return Err(ParseError::ConstraintArityMismatch {
                    constraint: constraint.name().to_string(),
                    expected: slot_count,
                    got: out.len(),
                });
            }
            violations.insert(constraint.name().to_string(), out);
        }

        let position = Position::new(mval, start_index, slot_count, violations);

        let mut violation_counts = self.violation_counts.clone();
        for (name, vals) in &position.violations {
            let n: u32 = vals.iter().map(|&b| b as u32).sum();
            if n > 0 {
                *violation_counts.entry(name.clone()).or_insert(0) += n;
            }
        }

        let mut is_bounded = self.is_bounded;
        let mut bounded_by = self.bounded_by.clone();
        for name in &position.violation_set {
            if self.meter.is_categorical(name) {
                is_bounded = true;
                bounded_by.push(name.clone());
                log::debug!(
                    "bounding parse under construction because it violates categorical constraint '{name}'"
                );
            }
        }

        let mut positions = self.positions.clone();
        positions.push(Arc::new(position));

        Ok(Some(Parse {
            id: seq.next(),
            matrix: Arc::clone(&self.matrix),
            meter: Arc::clone(&self.meter),
            positions,
            positioned_count: start_index + slot_count,
            is_bounded,
            bounded_by,
            violation_counts,
        }))
    }

    /// The full set of next-extension children: every allowed shape
    /// whose first character differs from the current tail, with
    /// bounded children dropped. Used by property tests and callers
    /// that want the pure per-parse operation; the search engine itself
    /// uses `candidate_shapes`/`extend` directly so it can retain
    /// bounded children for diagnostics.
    pub fn branch(&self, seq: &IdSequence) -> Result<Vec<Parse>, ParseError> {
        if self.is_bounded {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for shape in self.candidate_shapes() {
            if let Some(child) = self.extend(shape, seq)? {
                if !child.is_bounded {
                    out.push(child);
                }
            }
        }
        Ok(out)
    }

    /// Sum, across all positions, of each constraint's violation count
    /// (same backing data as [`Parse::violation_multiset`]).
    pub fn aggregate_violations(&self) -> &BTreeMap<String, u32> {
        &self.violation_counts
    }

    /// The violation multiset used for harmonic-bounding comparisons:
    /// one count per constraint name, summed over every violating slot
    /// in the parse.
    pub fn violation_multiset(&self) -> &BTreeMap<String, u32> {
        &self.violation_counts
    }

    /// Weighted sum of aggregate violations. Finite by construction:
    /// `MeterConfig` rejects non-finite weights at build time.
    pub fn score(&self) -> f64 {
        self.violation_counts
            .iter()
            .map(|(name, count)| self.meter.weight_of(name) * f64::from(*count))
            .sum()
    }

    /// Compare `self` and `other`'s violation multisets as multisets.
    pub fn bounding_relation(&self, other: &Parse) -> BoundingRelation {
        let a = &self.violation_counts;
        let b = &other.violation_counts;
        if a == b {
            return BoundingRelation::Equal;
        }
        match (multiset_le(a, b), multiset_le(b, a)) {
            (true, false) => BoundingRelation::Bounds,
            (false, true) => BoundingRelation::Bounded,
            _ => BoundingRelation::Incomparable,
        }
    }

    fn syllable_is_stressed(&self, global_index: usize) -> bool {
        self.matrix.slots()[global_index].is_stressed
    }

    /// `+`/`-` per slot, `+` for a slot in a strong (`s`) position.
    pub fn prominence_str(&self) -> String {
        self.positions
            .iter()
            .flat_map(|p| std::iter::repeat(if p.is_prom() { '+' } else { '-' }).take(p.slot_count()))
            .collect()
    }

    /// `+`/`-` per slot, `+` for a stressed syllable.
    pub fn stress_str(&self) -> String {
        self.positions
            .iter()
            .flat_map(|p| p.slots.iter())
            .map(|slot| if self.syllable_is_stressed(slot.syllable_index) { '+' } else { '-' })
            .collect()
    }

    fn prominence_bits(&self) -> Vec<u8> {
        self.positions
            .iter()
            .flat_map(|p| std::iter::repeat(u8::from(p.is_prom())).take(p.slot_count()))
            .collect()
    }

    fn stress_bits(&self) -> Vec<u8> {
        self.positions
            .iter()
            .flat_map(|p| p.slots.iter())
            .map(|slot| u8::from(self.syllable_is_stressed(slot.syllable_index)))
            .collect()
    }

    fn average_position_size(&self) -> f64 {
        if self.positions.is_empty() {
            return 0.0;
        }
        let total: usize = self.positions.iter().map(|p| p.slot_count()).sum();
        total as f64 / self.positions.len() as f64
    }

    fn num_stressed_syllables(&self) -> usize {
        self.positions
            .iter()
            .flat_map(|p| p.slots.iter())
            .filter(|slot| self.syllable_is_stressed(slot.syllable_index))
            .count()
    }

    /// Whether this parse's first position sorts as "later" under the
    /// meter's configured rising preference. `2` is a sentinel for a
    /// parse with no positions yet (never reached when ranking complete
    /// parses).
    fn first_position_key(&self) -> u8 {
        match self.positions.first() {
            None => 2,
            Some(p) => {
                let is_prom = p.is_prom();
                let flips = !self.meter.prefer_rising();
                u8::from(is_prom != flips)
            }
        }
    }

    /// The total ordering key, ascending = "better". Equality is
    /// identity, so the final tie-break is each parse's unique
    /// construction-order id.
    pub fn cmp_rank(&self, other: &Parse) -> Ordering {
        u8::from(self.is_bounded)
            .cmp(&u8::from(other.is_bounded))
            .then_with(|| self.score().total_cmp(&other.score()))
            .then_with(|| self.first_position_key().cmp(&other.first_position_key()))
            .then_with(|| self.average_position_size().total_cmp(&other.average_position_size()))
            .then_with(|| self.num_stressed_syllables().cmp(&other.num_stressed_syllables()))
            .then_with(|| self.prominence_bits().cmp(&other.prominence_bits()))
            .then_with(|| self.stress_bits().cmp(&other.stress_bits()))
            .then_with(|| self.id.cmp(&other.id))
    }

    /// The syllable indices this parse has positioned, in reading
    /// order — used by coverage tests to confirm a complete parse's
    /// slots equal the matrix slot-for-slot.
    pub fn covered_syllable_indices(&self) -> Vec<usize> {
        self.positions
            .iter()
            .flat_map(|p| p.slots.iter().map(|s| s.syllable_index))
            .collect()
    }
}

/// One position's snapshot for [`ParseSnapshot`]: its meter value and
/// the syllable indices it covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub meter_val: char,
    pub syllable_indices: Vec<usize>,
}

/// A JSON-roundtrippable snapshot of a [`Parse`], for external
/// persistence and replay. Does not carry the matrix or meter
/// themselves (those are the caller's) — only an opaque `matrix_handle`
/// the caller assigns and re-resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseSnapshot {
    pub positions: Vec<PositionSnapshot>,
    pub is_bounded: bool,
    pub bounded_by: Vec<String>,
    pub rank: Option<usize>,
    pub aggregate_violations: BTreeMap<String, u32>,
    pub matrix_handle: u64,
}

impl Parse {
    pub fn to_snapshot(&self, rank: Option<usize>, matrix_handle: u64) -> ParseSnapshot {
        let positions = self
            .positions
            .iter()
            .map(|p| PositionSnapshot {
                meter_val: p.meter_val,
                syllable_indices: p.slots.iter().map(|s| s.syllable_index).collect(),
            })
            .collect();
        ParseSnapshot {
            positions,
            is_bounded: self.is_bounded,
            bounded_by: self.bounded_by.clone(),
            rank,
            aggregate_violations: self.violation_counts.clone(),
            matrix_handle,
        }
    }

    /// Reconstruct a `Parse` from a snapshot by replaying its shapes
    /// through `extend` against `matrix`/`meter`. Every derived
    /// ordering key (score, violation multiset, prominence/stress
    /// strings) is recomputed identically because the constraints are
    /// pure functions of `matrix`/`meter`; `is_bounded`/`bounded_by` are
    /// restored verbatim afterward because harmonic bounding is a
    /// relation between sibling parses the replay cannot rediscover on
    /// its own.
    pub fn from_snapshot(
        snapshot: &ParseSnapshot,
        matrix: Arc<WordFormMatrix>,
        meter: Arc<MeterConfig>,
        seq: &IdSequence,
    ) -> Result<Parse, ParseError> {
        let mut parse = Parse::new(matrix, meter, seq);
        for pos in &snapshot.positions {
            let shape: String = std::iter::repeat(pos.meter_val)
                .take(pos.syllable_indices.len())
                .collect();
            parse = match parse.extend_past_bound(&shape, seq)? {
                Some(next) => next,
                None => {
                    return Err(ParseError::MeterMisconfigured(format!(
                        "snapshot replay could not extend with shape '{shape}'"
                    )))
                }
            };
        }
        parse.is_bounded = snapshot.is_bounded;
        parse.bounded_by = snapshot.bounded_by.clone();
        Ok(parse)
    }
}
