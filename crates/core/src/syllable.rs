//! The immutable per-syllable features the parser reads, and the
//! ordered sequence of syllables ("word form matrix") that is one
//! concrete pronunciation of a line.

use serde::{Deserialize, Serialize};

/// How strongly a syllable is stressed, as handed down by the (external,
/// out-of-scope) syllabifier/stress-assignment layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressLevel {
    Unstressed,
    Secondary,
    Primary,
}

impl StressLevel {
    /// Flatten to the two-symbol alphabet `is_stressed` uses by default
    /// (`Secondary` counts as stressed). Callers that care about the
    /// distinction configure `secondary_stress_mode` on `MeterConfig`
    /// instead of relying on this flattening.
    fn flattened_is_stressed(self) -> bool {
        !matches!(self, StressLevel::Unstressed)
    }
}

/// A single syllable: immutable once constructed, shared by reference
/// across every parse built over the matrix that contains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Syllable {
    /// Display form.
    pub text: String,
    /// Flattened two-way stress bit (see `StressLevel::flattened_is_stressed`).
    pub is_stressed: bool,
    /// Raw stress level, for constraints that honor `secondary_stress_mode`.
    pub stress_level: StressLevel,
    /// Weight/heaviness (closed syllable, long vowel, etc).
    pub is_heavy: bool,
    /// Strong-designation: a syllable whose stress is lexically fixed.
    pub is_strong: bool,
    /// Weak-designation: monosyllabic function-word material. At most
    /// one of `is_strong`/`is_weak` is true.
    pub is_weak: bool,
    /// Identifier of the containing word token, for word-boundary
    /// constraints.
    pub wordtoken_id: u32,
    /// Zero-based index of this syllable within its word, for
    /// first/last-syllable constraints.
    pub position_in_word: usize,
}

impl Syllable {
    /// Construct a syllable with `stress_level` and `is_stressed` kept in
    /// sync with the default (stressed/unstressed) flattening.
    pub fn new(
        text: impl Into<String>,
        stress_level: StressLevel,
        is_heavy: bool,
        is_strong: bool,
        is_weak: bool,
        wordtoken_id: u32,
        position_in_word: usize,
    ) -> Self {
        assert!(
            !(is_strong && is_weak),
            "a syllable cannot be both strong and weak"
        );
        Syllable {
            text: text.into(),
            is_stressed: stress_level.flattened_is_stressed(),
            stress_level,
            is_heavy,
            is_strong,
            is_weak,
            wordtoken_id,
            position_in_word,
        }
    }

    /// True if this syllable is the first syllable of its word.
    pub fn is_word_initial(&self) -> bool {
        self.position_in_word == 0
    }
}

/// The mode for folding `StressLevel::Secondary` into constraint
/// evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecondaryStressMode {
    /// Secondary stress behaves like primary stress.
    Stressed,
    /// Secondary stress behaves like no stress at all.
    Unstressed,
    /// Secondary stress is exempt from binary stress constraints.
    Distinct,
}

impl Default for SecondaryStressMode {
    fn default() -> Self {
        SecondaryStressMode::Stressed
    }
}

/// Resolves a syllable's stress to one of three states under a given
/// `SecondaryStressMode`. `None` means "exempt" (the `Distinct` case).
pub fn effective_stress(syll: &Syllable, mode: SecondaryStressMode) -> Option<bool> {
    match syll.stress_level {
        StressLevel::Primary => Some(true),
        StressLevel::Unstressed => Some(false),
        StressLevel::Secondary => match mode {
            SecondaryStressMode::Stressed => Some(true),
            SecondaryStressMode::Unstressed => Some(false),
            SecondaryStressMode::Distinct => None,
        },
    }
}

/// An ordered sequence of syllables forming one concrete pronunciation of
/// a line. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordFormMatrix {
    slots: Vec<Syllable>,
}

impl WordFormMatrix {
    /// Build a matrix from at least one syllable.
    ///
    /// Panics if `slots` is empty — an empty matrix is handled one level
    /// up, as "empty matrix -> empty output", not as a matrix value at
    /// all.
    pub fn new(slots: Vec<Syllable>) -> Self {
        assert!(!slots.is_empty(), "a word form matrix needs at least one syllable");
        WordFormMatrix { slots }
    }

    pub fn slots(&self) -> &[Syllable] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        false // invariant: never empty once constructed
    }
}
