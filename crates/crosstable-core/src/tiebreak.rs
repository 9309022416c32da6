//! Tie-break classifier for the legacy format, where trailing numeric
//! columns carry no trustworthy header names.
//!
//! Each value is classified independently, but against the context of the
//! whole row's values: the highest rating-range value in a row is taken as
//! the performance rating and the second-highest as the average rating of
//! opponents. The rules run in a fixed priority order; this is a heuristic
//! with an explicit ambiguity fallback, not a guarantee.

use tracing::trace;

use crate::enums::TieBreakKind;

const RATING_RANGE_MIN: f64 = 100.0;
const RATING_RANGE_MAX: f64 = 3500.0;
const MAX_PLAUSIBLE_WINS: f64 = 15.0;

/// Classifies one tie-break value against the full row of values.
///
/// `row` holds every tie-break value of the same player, in any order; the
/// classification of a given value is invariant under permutation of `row`.
///
/// Decision order:
/// 1. value in {0, 0.5, 1} — direct encounter;
/// 2. integer ≤ 15 — number of wins;
/// 3. integer in [100, 3500] — rating-like: row maximum is the performance
///    rating, second-highest is the average rating of opponents, anything
///    else stays an ambiguous candidate;
/// 4. fractional — Buchholz/Sonneborn-Berger when a sibling is also
///    fractional, else Buchholz gamepoints;
/// 5. everything else (including NaN) — unclassified.
pub fn classify(value: Option<f64>, row: &[Option<f64>]) -> TieBreakKind {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return TieBreakKind::Unclassified;
    };

    let kind = classify_finite(v, row);
    trace!(value = v, kind = ?kind, "tie-break value classified");
    kind
}

fn classify_finite(v: f64, row: &[Option<f64>]) -> TieBreakKind {
    if v == 0.0 || v == 0.5 || v == 1.0 {
        return TieBreakKind::DirectEncounter;
    }

    let is_integer = v.fract() == 0.0;

    if is_integer && v >= 0.0 && v <= MAX_PLAUSIBLE_WINS {
        return TieBreakKind::NumberOfWins;
    }

    if is_integer && (RATING_RANGE_MIN..=RATING_RANGE_MAX).contains(&v) {
        let (max, second) = rating_range_extremes(row);
        if Some(v) == max {
            return TieBreakKind::PerformanceRating;
        }
        if Some(v) == second {
            return TieBreakKind::AverageRatingOfOpponents;
        }
        return TieBreakKind::PerformanceAroCandidate;
    }

    if !is_integer {
        // `row` includes this value itself; discount one occurrence so a
        // duplicated fractional value still counts its twin as a sibling.
        let fractional = row
            .iter()
            .flatten()
            .filter(|&&x| x.is_finite() && x.fract() != 0.0)
            .count();
        let has_self = row.iter().flatten().any(|&x| x == v);
        return if fractional > usize::from(has_self) {
            TieBreakKind::BuchholzSonneborn
        } else {
            TieBreakKind::BuchholzGamepoints
        };
    }

    TieBreakKind::Unclassified
}

/// Highest and second-highest (strictly lower) rating-range integer values
/// in the row.
fn rating_range_extremes(row: &[Option<f64>]) -> (Option<f64>, Option<f64>) {
    let mut max: Option<f64> = None;
    let mut second: Option<f64> = None;
    for &v in row.iter().flatten() {
        if !(v.is_finite()
            && v.fract() == 0.0
            && (RATING_RANGE_MIN..=RATING_RANGE_MAX).contains(&v))
        {
            continue;
        }
        match max {
            None => max = Some(v),
            Some(m) if v > m => {
                second = Some(m);
                max = Some(v);
            }
            Some(m) if v < m => match second {
                None => second = Some(v),
                Some(s) if v > s => second = Some(v),
                Some(_) => {}
            },
            Some(_) => {}
        }
    }
    (max, second)
}
