//! Property-based coverage of the universal invariants from the design
//! (monotone violations, coverage, adjacency, bounding symmetry, ordering
//! totality, idempotence, categorical semantics), run against randomly
//! generated stress patterns rather than the hand-picked scenarios in
//! `scenarios.rs`.

use std::sync::Arc;

use proptest::collection::vec as pvec;
use proptest::prelude::*;

use scansion_core::parse::IdSequence;
use scansion_core::{
    parse_line, BoundingRelation, MeterConfig, Parse, SUnstress, StressLevel, StrongEdge, Syllable,
    WPeak, WStress, WordFormMatrix,
};

fn syll_seq(stresses: &[bool]) -> Vec<Syllable> {
    stresses
        .iter()
        .enumerate()
        .map(|(i, &stressed)| {
            let level = if stressed { StressLevel::Primary } else { StressLevel::Unstressed };
            Syllable::new(format!("s{i}"), level, false, false, false, 0, i)
        })
        .collect()
}

fn binary_meter() -> Arc<MeterConfig> {
    Arc::new(
        MeterConfig::builder()
            .position_shapes(["w", "s"])
            .max_w(1)
            .max_s(1)
            .constraint(Arc::new(WStress))
            .constraint(Arc::new(SUnstress))
            .constraint(Arc::new(WPeak))
            .constraint(Arc::new(StrongEdge))
            .build()
            .unwrap(),
    )
}

fn ternary_meter() -> Arc<MeterConfig> {
    Arc::new(
        MeterConfig::builder()
            .position_shapes(["w", "ww", "s"])
            .max_w(2)
            .max_s(1)
            .constraint(Arc::new(WStress))
            .constraint(Arc::new(SUnstress))
            .build()
            .unwrap(),
    )
}

fn stress_pattern() -> impl Strategy<Value = Vec<bool>> {
    pvec(any::<bool>(), 1..9)
}

proptest! {
    /// Extending a parse can only ever grow its violation multiset:
    /// every count in the parent is `<=` the corresponding count in the
    /// child, for every constraint name appearing in either.
    #[test]
    fn extension_is_monotone_in_violations(stresses in stress_pattern()) {
        let meter = binary_meter();
        let seq = IdSequence::new();
        let matrix = Arc::new(WordFormMatrix::new(syll_seq(&stresses)));
        let mut parse = Parse::new(matrix, meter, &seq);

        while !parse.is_complete() {
            let Some(&shape) = parse.candidate_shapes().first() else { break };
            let Some(child) = parse.extend(shape, &seq).unwrap() else { break };
            let before = parse.violation_multiset().clone();
            let after = child.violation_multiset().clone();
            for (name, count) in &before {
                prop_assert!(after.get(name).copied().unwrap_or(0) >= *count);
            }
            parse = child;
        }
    }

    /// Every complete parse's positions cover every syllable index of
    /// the matrix exactly once, in order.
    #[test]
    fn complete_parses_cover_every_syllable_in_order(stresses in stress_pattern()) {
        let meter = binary_meter();
        let matrix = Arc::new(WordFormMatrix::new(syll_seq(&stresses)));
        if let Ok(report) = parse_line(&[matrix], &meter, None) {
            for p in &report.parses {
                let total_slots: usize = p.positions.iter().map(|pos| pos.slot_count).sum();
                prop_assert_eq!(total_slots, stresses.len());
            }
        }
    }

    /// No two adjacent positions in any reported parse share a meter
    /// value.
    #[test]
    fn adjacent_positions_never_share_meter_val(stresses in stress_pattern()) {
        let meter = ternary_meter();
        let matrix = Arc::new(WordFormMatrix::new(syll_seq(&stresses)));
        if let Ok(report) = parse_line(&[matrix], &meter, None) {
            for p in &report.parses {
                for pair in p.positions.windows(2) {
                    prop_assert_ne!(pair[0].meter_val, pair[1].meter_val);
                }
            }
        }
    }

    /// `bounding_relation` is antisymmetric: `a` bounds `b` iff `b` is
    /// bounded by `a`, and equal multisets always compare `Equal`.
    #[test]
    fn bounding_relation_is_symmetric(a_stresses in stress_pattern(), b_stresses in stress_pattern()) {
        let meter = binary_meter();
        let seq = IdSequence::new();

        let drive = |stresses: &[bool]| -> Parse {
            let matrix = Arc::new(WordFormMatrix::new(syll_seq(stresses)));
            let mut parse = Parse::new(matrix, meter.clone(), &seq);
            loop {
                let Some(&shape) = parse.candidate_shapes().first() else { break };
                match parse.extend(shape, &seq).unwrap() {
                    Some(next) => parse = next,
                    None => break,
                }
            }
            parse
        };

        let a = drive(&a_stresses);
        let b = drive(&b_stresses);

        match a.bounding_relation(&b) {
            BoundingRelation::Bounds => prop_assert_eq!(b.bounding_relation(&a), BoundingRelation::Bounded),
            BoundingRelation::Bounded => prop_assert_eq!(b.bounding_relation(&a), BoundingRelation::Bounds),
            BoundingRelation::Equal => prop_assert_eq!(b.bounding_relation(&a), BoundingRelation::Equal),
            BoundingRelation::Incomparable => prop_assert_eq!(b.bounding_relation(&a), BoundingRelation::Incomparable),
        }
    }

    /// Re-running the engine on the same matrix and meter produces
    /// identical ranked output.
    #[test]
    fn search_is_idempotent(stresses in stress_pattern()) {
        let meter = ternary_meter();
        let matrix = Arc::new(WordFormMatrix::new(syll_seq(&stresses)));
        let first = parse_line(&[matrix.clone()], &meter, None);
        let second = parse_line(&[matrix], &meter, None);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "search was not idempotent across identical runs"),
        }
    }

    /// Any categorical-constraint violation anywhere in a parse implies
    /// the whole parse is marked bounded.
    #[test]
    fn categorical_violation_implies_bounded(stresses in stress_pattern()) {
        let meter = Arc::new(
            MeterConfig::builder()
                .position_shapes(["w", "s"])
                .max_w(1)
                .max_s(1)
                .constraint(Arc::new(WStress))
                .constraint(Arc::new(SUnstress))
                .categorical("w_stress")
                .build()
                .unwrap(),
        );
        let matrix = Arc::new(WordFormMatrix::new(syll_seq(&stresses)));
        if let Ok(report) = parse_line(&[matrix], &meter, None) {
            for p in &report.parses {
                let has_w_stress_violation = p.aggregate_violations.get("w_stress").copied().unwrap_or(0) > 0;
                if has_w_stress_violation {
                    prop_assert!(p.is_bounded);
                }
            }
        }
    }

    /// The ordering key is a strict total order: sorting twice is stable
    /// and every distinct pair compares consistently (no `a < b` and
    /// `b < a` simultaneously, i.e. `cmp_rank` is antisymmetric).
    #[test]
    fn ordering_is_a_strict_total_order(stresses in stress_pattern()) {
        let meter = ternary_meter();
        let matrix = Arc::new(WordFormMatrix::new(syll_seq(&stresses)));
        let seq = IdSequence::new();

        // Collect every complete parse reachable from the seed so we
        // have more than one candidate to compare, even for short lines.
        let mut frontier = vec![Parse::new(matrix, meter.clone(), &seq)];
        let mut complete = Vec::new();
        while let Some(parse) = frontier.pop() {
            if parse.is_complete() {
                complete.push(parse);
                continue;
            }
            for shape in parse.candidate_shapes() {
                if let Some(child) = parse.extend(shape, &seq).unwrap() {
                    frontier.push(child);
                }
            }
        }

        for a in &complete {
            for b in &complete {
                let ab = a.cmp_rank(b);
                let ba = b.cmp_rank(a);
                prop_assert_eq!(ab.reverse(), ba);
                if a.id() == b.id() {
                    prop_assert_eq!(ab, std::cmp::Ordering::Equal);
                }
            }
        }
    }
}
