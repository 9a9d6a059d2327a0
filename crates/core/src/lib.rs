//! Metrical parsing core: enumerates scansions of a syllable sequence
//! under a configurable meter, scores each against its constraints, and
//! returns the non-harmonically-bounded parses ranked by goodness.
//!
//! The crate is deliberately narrow: it owns the search/scoring/ranking
//! algorithm and nothing else. Syllabification, stress assignment, and
//! word-form-matrix construction from raw text are the caller's
//! responsibility; this crate starts from an already-built
//! [`syllable::WordFormMatrix`].

pub mod constraints;
pub mod error;
pub mod meter;
pub mod parse;
pub mod result;
pub mod search;
pub mod syllable;

pub use constraints::{Constraint, FootSize, PositionContext, SUnstress, StrongEdge, WPeak, WStress};
pub use error::ParseError;
pub use meter::{MeterConfig, MeterConfigBuilder};
pub use parse::{BoundingRelation, Parse, ParseSnapshot, PositionSnapshot};
pub use result::{LineReport, ParseReport, PositionViolationReport, SlotReport};
pub use search::parse_line;
pub use syllable::{effective_stress, SecondaryStressMode, StressLevel, Syllable, WordFormMatrix};
