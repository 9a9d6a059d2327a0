//! Pure constraint functions mapping a meter position to a per-slot 0/1
//! violation vector.
//!
//! Each constraint is a pure function of an explicit [`PositionContext`]
//! rather than something that reaches back into the parent parse to
//! introspect it, which keeps a constraint's evaluation independent of
//! how the caller happens to be walking the search.

use crate::meter::MeterConfig;
use crate::syllable::{effective_stress, Syllable};

/// Everything a constraint needs to score one position, passed in
/// explicitly at the moment the position is appended to a parse.
pub struct PositionContext<'a> {
    /// `'w'` or `'s'`.
    pub meter_val: char,
    /// Index of this position's first slot within the full matrix.
    pub start_index: usize,
    /// The full line's syllables (not just this position's slots) — a
    /// constraint may need to look at syllables outside the position,
    /// e.g. to find the flanking syllables of a local stress peak.
    pub matrix: &'a [Syllable],
    /// The meter value of the immediately preceding position, if any.
    pub prev_meter_val: Option<char>,
    pub meter: &'a MeterConfig,
    /// Number of slots in this position.
    pub slot_count: usize,
}

impl<'a> PositionContext<'a> {
    /// This position's own slots.
    pub fn slots(&self) -> &'a [Syllable] {
        &self.matrix[self.start_index..self.start_index + self.len()]
    }

    pub fn len(&self) -> usize {
        self.slot_count
    }

    fn syllable_before(&self, idx: usize) -> Option<&'a Syllable> {
        idx.checked_sub(1).map(|i| &self.matrix[i])
    }

    fn syllable_after(&self, idx: usize) -> Option<&'a Syllable> {
        self.matrix.get(idx + 1)
    }

    /// The syllable immediately before `idx` within the matrix, only if
    /// it belongs to the same word.
    fn same_word_neighbor_before(&self, idx: usize) -> Option<&'a Syllable> {
        let cur = &self.matrix[idx];
        self.syllable_before(idx)
            .filter(|s| s.wordtoken_id == cur.wordtoken_id)
    }

    fn same_word_neighbor_after(&self, idx: usize) -> Option<&'a Syllable> {
        let cur = &self.matrix[idx];
        self.syllable_after(idx)
            .filter(|s| s.wordtoken_id == cur.wordtoken_id)
    }
}

/// A named, pure constraint. Implementations must return a vector whose
/// length equals `ctx.len()`; anything else is a fatal
/// `ParseError::ConstraintArityMismatch`, caught where constraints are
/// evaluated in [`crate::parse::Parse::extend`].
pub trait Constraint: Send + Sync {
    fn name(&self) -> &str;
    fn evaluate(&self, ctx: &PositionContext) -> Vec<u8>;
}

/// 1 at each `w` slot whose syllable `is_stressed` (the plain peak
/// constraint, no flanking check).
pub struct WStress;
impl Constraint for WStress {
    fn name(&self) -> &str {
        "w_stress"
    }
    fn evaluate(&self, ctx: &PositionContext) -> Vec<u8> {
        if ctx.meter_val != 'w' {
            return vec![0; ctx.len()];
        }
        ctx.slots()
            .iter()
            .map(|s| stressed_bit(s, ctx.meter))
            .collect()
    }
}

/// 1 at each slot in a `w` position whose syllable is stressed *and* is
/// flanked, within the same word, by unstressed syllables (a local
/// stress peak landing on a weak metrical slot).
pub struct WPeak;
impl Constraint for WPeak {
    fn name(&self) -> &str {
        "w_peak"
    }
    fn evaluate(&self, ctx: &PositionContext) -> Vec<u8> {
        if ctx.meter_val != 'w' {
            return vec![0; ctx.len()];
        }
        (0..ctx.len())
            .map(|offset| {
                let idx = ctx.start_index + offset;
                let syll = &ctx.matrix[idx];
                let Some(stressed) = effective_stress(syll, ctx.meter.secondary_stress_mode())
                else {
                    return 0;
                };
                if !stressed {
                    return 0;
                }
                // No same-word flank at all (a word boundary, not a calm
                // neighbor) means this syllable is not flanked by
                // unstressed syllables within its own word, so it is not
                // a local peak.
                let left_ok = ctx
                    .same_word_neighbor_before(idx)
                    .map(|n| neighbor_is_unstressed(n, ctx.meter))
                    .unwrap_or(false);
                let right_ok = ctx
                    .same_word_neighbor_after(idx)
                    .map(|n| neighbor_is_unstressed(n, ctx.meter))
                    .unwrap_or(false);
                u8::from(left_ok && right_ok)
            })
            .collect()
    }
}

/// True only if `n` is *definitely* unstressed under `mode` (a
/// stress-exempt secondary syllable does not count as a calming flank).
fn neighbor_is_unstressed(n: &Syllable, meter: &MeterConfig) -> bool {
    effective_stress(n, meter.secondary_stress_mode()) == Some(false)
}

fn stressed_bit(s: &Syllable, meter: &MeterConfig) -> u8 {
    match effective_stress(s, meter.secondary_stress_mode()) {
        Some(true) => 1,
        Some(false) | None => 0,
    }
}

/// 1 at each `s` slot whose syllable is unstressed, unless the syllable
/// is monosyllabic function-word material (`is_weak`).
pub struct SUnstress;
impl Constraint for SUnstress {
    fn name(&self) -> &str {
        "s_unstress"
    }
    fn evaluate(&self, ctx: &PositionContext) -> Vec<u8> {
        if ctx.meter_val != 's' {
            return vec![0; ctx.len()];
        }
        ctx.slots()
            .iter()
            .map(|s| {
                if s.is_weak {
                    return 0;
                }
                match effective_stress(s, ctx.meter.secondary_stress_mode()) {
                    Some(false) => 1,
                    Some(true) | None => 0,
                }
            })
            .collect()
    }
}

/// 1 at every slot of a position whose size exceeds the meter's
/// configured footprint for its `meter_val` (`max_w`/`max_s`).
pub struct FootSize;
impl Constraint for FootSize {
    fn name(&self) -> &str {
        "foot_size"
    }
    fn evaluate(&self, ctx: &PositionContext) -> Vec<u8> {
        let max = ctx.meter.max_for(ctx.meter_val);
        let violates = u8::from(ctx.len() > max);
        vec![violates; ctx.len()]
    }
}

/// 1 at a `s` position's first slot when the immediately preceding
/// position is `w`, its last syllable belongs to the same word as this
/// `s` position's first syllable, and that syllable is not word-initial
/// — a strong beat continuing a word already begun on the previous weak
/// beat, an awkward place for a foot boundary to fall.
pub struct StrongEdge;
impl Constraint for StrongEdge {
    fn name(&self) -> &str {
        "word_bridge"
    }
    fn evaluate(&self, ctx: &PositionContext) -> Vec<u8> {
        let mut out = vec![0u8; ctx.len()];
        if ctx.meter_val != 's' || ctx.prev_meter_val != Some('w') || ctx.start_index == 0 {
            return out;
        }
        let first = &ctx.matrix[ctx.start_index];
        let prev = &ctx.matrix[ctx.start_index - 1];
        if prev.wordtoken_id == first.wordtoken_id && !first.is_word_initial() {
            out[0] = 1;
        }
        out
    }
}
