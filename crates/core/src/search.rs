//! The parse search / bounding engine: breadth-first extension of
//! partial parses, intra-step and final harmonic bounding, and ranking
//! of the surviving complete parses.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ParseError;
use crate::meter::MeterConfig;
use crate::parse::{BoundingRelation, IdSequence, Parse};
use crate::result::LineReport;
use crate::syllable::WordFormMatrix;

/// Group `parses` by `positioned_count` and apply harmonic bounding
/// pairwise within each group: bounding only ever compares parses that
/// have positioned the same number of syllables, since only those
/// share a well-defined "remaining work" to compare fairly against.
///
/// Decisions are computed from each parse's state at the start of the
/// pass, then applied in a second pass, so the result does not depend
/// on iteration order.
fn apply_harmonic_bounding(parses: &mut [Parse]) {
    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, p) in parses.iter().enumerate() {
        groups.entry(p.positioned_count()).or_default().push(i);
    }

    let mut to_bound: Vec<(usize, u64)> = Vec::new();
    for idxs in groups.values() {
        for &i in idxs {
            if parses[i].is_bounded() {
                continue;
            }
            for &j in idxs {
                if i == j || parses[j].is_bounded() {
                    continue;
                }
                if parses[i].bounding_relation(&parses[j]) == BoundingRelation::Bounds {
                    to_bound.push((j, parses[i].id()));
                }
            }
        }
    }

    for (j, dominator_id) in to_bound {
        if !parses[j].is_bounded() {
            log::debug!(
                "bounding parse {} (harmonically dominated by parse {})",
                parses[j].id(),
                dominator_id
            );
            parses[j].mark_bounded(format!("bounded-by-parse-{dominator_id}"));
        }
    }
}

/// Complete and bounded-but-retired parses discovered while searching
/// one [`WordFormMatrix`] (one concrete pronunciation of the line).
struct MatrixOutcome {
    complete: Vec<Parse>,
    #[allow(dead_code)] // diagnostic only: dead ends the search abandoned before reaching full
    // length; not yet surfaced through the public result type, which
    // reports complete parses only.
    retired: Vec<Parse>,
}

/// Walk a parse that just became bounded out to full length along a
/// single canonical continuation (the first candidate shape at each
/// remaining step), without branching into further alternatives.
///
/// A parse that becomes bounded mid-search is excluded from further
/// branching — exploring multiple alternatives from a doomed branch
/// wastes work the ranking will discard anyway — but it still needs to
/// reach a complete, rankable shape so a line whose every reading is
/// bounded still produces a comparable top-of-list result instead of
/// reporting unparseable. Returns whatever parse it last reached, which
/// the caller checks with `is_complete` (a dead end it can't extend out
/// of stays incomplete and is dropped as retired).
fn drive_to_completion(mut parse: Parse, seq: &IdSequence) -> Result<Parse, ParseError> {
    while !parse.is_complete() {
        let Some(&shape) = parse.candidate_shapes().first() else {
            break;
        };
        match parse.extend_past_bound(shape, seq)? {
            Some(next) => parse = next,
            None => break,
        }
    }
    Ok(parse)
}

/// Drive a parse that just became bounded — whether by a categorical
/// violation on the position just appended, or by harmonic domination
/// discovered against its same-depth siblings — out to full length, and
/// file it under `complete` or `retired` accordingly. Shared by both
/// bounding paths in `search_matrix` so neither treats "bounded" as a
/// dead end the other doesn't.
fn drive_and_collect(
    parse: Parse,
    seq: &IdSequence,
    complete: &mut Vec<Parse>,
    retired: &mut Vec<Parse>,
) -> Result<(), ParseError> {
    let id = parse.id();
    let reasons = parse.bounded_by().to_vec();
    let finished = drive_to_completion(parse, seq)?;
    if finished.is_complete() {
        log::debug!(
            "parse {} driven to completion along a single path after bounding ({:?})",
            id, reasons
        );
        complete.push(finished);
    } else {
        retired.push(finished);
    }
    Ok(())
}

/// Run the breadth-first extension loop over one word-form reading of
/// the line.
fn search_matrix(
    matrix: &Arc<WordFormMatrix>,
    meter: &Arc<MeterConfig>,
    seq: &IdSequence,
    should_cancel: Option<&dyn Fn() -> bool>,
) -> Result<MatrixOutcome, ParseError> {
    let seed = Parse::new(Arc::clone(matrix), Arc::clone(meter), seq);
    let mut frontier = vec![seed];
    let mut complete = Vec::new();
    let mut retired = Vec::new();

    while !frontier.is_empty() {
        if let Some(cancel) = should_cancel {
            if cancel() {
                log::warn!(
                    "parse search cancelled with {} live partial parses outstanding",
                    frontier.len()
                );
                retired.extend(frontier);
                frontier = Vec::new();
                break;
            }
        }

        let mut next_frontier = Vec::new();
        for parse in frontier {
            for shape in parse.candidate_shapes() {
                let Some(child) = parse.extend(shape, seq)? else {
                    continue;
                };
                if child.is_complete() {
                    if child.is_bounded() {
                        log::debug!(
                            "parse {} completed but bounded ({:?})",
                            child.id(),
                            child.bounded_by()
                        );
                    }
                    complete.push(child);
                } else if child.is_bounded() {
                    drive_and_collect(child, seq, &mut complete, &mut retired)?;
                } else {
                    next_frontier.push(child);
                }
            }
        }

        apply_harmonic_bounding(&mut next_frontier);
        let (still_live, newly_bounded): (Vec<_>, Vec<_>) =
            next_frontier.into_iter().partition(|p| !p.is_bounded());
        for bounded in newly_bounded {
            drive_and_collect(bounded, seq, &mut complete, &mut retired)?;
        }
        frontier = still_live;
    }

    apply_harmonic_bounding(&mut complete);

    if complete.is_empty() {
        log::warn!("word-form reading yielded no complete parse under the configured meter");
    }

    Ok(MatrixOutcome { complete, retired })
}

/// Parse one line, given every candidate word-form reading (`matrices`;
/// plural because ambiguous pronunciations spawn more than one
/// `WordFormMatrix`). Complete parses from every reading are pooled,
/// bounded against each other, and ranked together — the line, not the
/// individual reading, is the unit of ambiguity reporting.
///
/// `should_cancel`, if given, is polled once per extension round; on a
/// `true` return the engine stops extending and ranks whatever complete
/// parses it already has.
///
/// Returns `Err(ParseError::UnparseableLine)` only when not a single
/// complete parse exists across every reading — a line with only
/// bounded complete parses is not unparseable.
pub fn parse_line(
    matrices: &[Arc<WordFormMatrix>],
    meter: &Arc<MeterConfig>,
    should_cancel: Option<&dyn Fn() -> bool>,
) -> Result<LineReport, ParseError> {
    if matrices.is_empty() {
        return Ok(LineReport::empty());
    }

    let seq = IdSequence::new();
    let mut all_complete = Vec::new();

    for matrix in matrices {
        if let Some(cancel) = should_cancel {
            if cancel() {
                break;
            }
        }
        let outcome = search_matrix(matrix, meter, &seq, should_cancel)?;
        all_complete.extend(outcome.complete);
    }

    apply_harmonic_bounding(&mut all_complete);

    if all_complete.is_empty() {
        return Err(ParseError::UnparseableLine);
    }

    all_complete.sort_by(|a, b| a.cmp_rank(b));
    let ambig = all_complete.iter().filter(|p| !p.is_bounded()).count();

    Ok(LineReport::from_ranked_parses(all_complete, ambig))
}
