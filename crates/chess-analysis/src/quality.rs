//! Mistake records, phase buckets and the accuracy score.

use std::cmp::Ordering;

use chess_core::Side;
use serde::{Deserialize, Serialize};

use crate::evaluation::EvaluationSample;
use crate::phase::GamePhase;

/// Each bucket keeps at most this many records.
pub const BUCKET_CAPACITY: usize = 3;

/// A single move that lost evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistakeRecord {
    /// Full-move number of the move.
    pub move_number: u32,
    /// The side that played it.
    pub side: Side,
    /// The move as written in the game.
    pub san: String,
    /// Evaluation after the move, from the mover's point of view.
    pub evaluation: EvaluationSample,
    /// Evaluation change relative to the previous sample. Always negative.
    pub delta: f64,
    pub phase: GamePhase,
}

/// The worst mistakes of a game, overall and per phase.
///
/// Every bucket is sorted worst first and holds at most
/// [`BUCKET_CAPACITY`] records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MistakeBuckets {
    pub all: Vec<MistakeRecord>,
    pub opening: Vec<MistakeRecord>,
    pub middlegame: Vec<MistakeRecord>,
    pub endgame: Vec<MistakeRecord>,
}

impl MistakeBuckets {
    /// Sorts and caps the collected records.
    pub fn from_records(records: Vec<MistakeRecord>) -> Self {
        let mut buckets = MistakeBuckets::default();
        for record in records {
            match record.phase {
                GamePhase::Opening => buckets.opening.push(record.clone()),
                GamePhase::Middlegame => buckets.middlegame.push(record.clone()),
                GamePhase::Endgame => buckets.endgame.push(record.clone()),
            }
            buckets.all.push(record);
        }

        for bucket in [
            &mut buckets.all,
            &mut buckets.opening,
            &mut buckets.middlegame,
            &mut buckets.endgame,
        ] {
            // Stable, so equal deltas keep game order.
            bucket.sort_by(|a, b| a.delta.partial_cmp(&b.delta).unwrap_or(Ordering::Equal));
            bucket.truncate(BUCKET_CAPACITY);
        }
        buckets
    }

    /// The bucket for one phase.
    pub fn phase(&self, phase: GamePhase) -> &[MistakeRecord] {
        match phase {
            GamePhase::Opening => &self.opening,
            GamePhase::Middlegame => &self.middlegame,
            GamePhase::Endgame => &self.endgame,
        }
    }

    /// The four buckets with their names, `all` first.
    pub fn named(&self) -> [(&'static str, &[MistakeRecord]); 4] {
        [
            ("all", self.all.as_slice()),
            ("opening", self.opening.as_slice()),
            ("middlegame", self.middlegame.as_slice()),
            ("endgame", self.endgame.as_slice()),
        ]
    }

    /// The bucket called `name`, as listed by [`MistakeBuckets::named`].
    pub fn by_name(&self, name: &str) -> Option<&[MistakeRecord]> {
        self.named()
            .into_iter()
            .find(|(bucket, _)| bucket.eq_ignore_ascii_case(name.trim()))
            .map(|(_, records)| records)
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// A score in `[0.0, 1.0]`: one minus the average capped loss per move.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccuracyScore(f64);

impl AccuracyScore {
    pub const PERFECT: Self = AccuracyScore(1.0);

    /// `max(0, 1 - total_penalty / move_count)`, or perfect for an empty game.
    pub fn from_penalty(total_penalty: f64, move_count: u32) -> Self {
        if move_count == 0 {
            return Self::PERFECT;
        }
        let value = 1.0 - total_penalty / f64::from(move_count);
        AccuracyScore(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn percent(&self) -> f64 {
        self.0 * 100.0
    }
}

impl Default for AccuracyScore {
    fn default() -> Self {
        Self::PERFECT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(move_number: u32, delta: f64, phase: GamePhase) -> MistakeRecord {
        MistakeRecord {
            move_number,
            side: Side::White,
            san: format!("m{}", move_number),
            evaluation: EvaluationSample::Pawns(delta),
            delta,
            phase,
        }
    }

    #[test]
    fn test_buckets_sorted_and_capped() {
        let buckets = MistakeBuckets::from_records(vec![
            record(3, -0.3, GamePhase::Opening),
            record(12, -2.5, GamePhase::Middlegame),
            record(15, -0.9, GamePhase::Middlegame),
            record(30, -0.25, GamePhase::Endgame),
            record(33, -1.1, GamePhase::Endgame),
        ]);

        let all: Vec<u32> = buckets.all.iter().map(|r| r.move_number).collect();
        assert_eq!(all, vec![12, 33, 15]);
        assert_eq!(buckets.opening.len(), 1);
        assert_eq!(buckets.middlegame[0].move_number, 12);
        assert_eq!(buckets.phase(GamePhase::Endgame)[0].move_number, 33);
    }

    #[test]
    fn test_record_lands_in_exactly_one_phase() {
        let buckets = MistakeBuckets::from_records(vec![record(20, -0.5, GamePhase::Endgame)]);
        assert_eq!(buckets.all.len(), 1);
        assert_eq!(buckets.endgame.len(), 1);
        assert!(buckets.opening.is_empty());
        assert!(buckets.middlegame.is_empty());
    }

    #[test]
    fn test_bucket_by_name() {
        let buckets = MistakeBuckets::from_records(vec![
            record(4, -0.4, GamePhase::Opening),
            record(25, -1.5, GamePhase::Middlegame),
        ]);
        assert_eq!(buckets.by_name("all").unwrap().len(), 2);
        assert_eq!(buckets.by_name(" Middlegame ").unwrap()[0].move_number, 25);
        assert!(buckets.by_name("endgame").unwrap().is_empty());
        assert!(buckets.by_name("blunders").is_none());
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(AccuracyScore::from_penalty(0.0, 0).value(), 1.0);
        assert_eq!(AccuracyScore::from_penalty(0.0, 40).value(), 1.0);
        assert!((AccuracyScore::from_penalty(4.0, 40).value() - 0.9).abs() < 1e-9);
        assert_eq!(AccuracyScore::from_penalty(12.0, 5).value(), 0.0);
    }

    #[test]
    fn test_accuracy_percent() {
        assert!((AccuracyScore::from_penalty(1.0, 4).percent() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(record(4, -0.5, GamePhase::Opening)).unwrap();
        assert_eq!(json["side"], "white");
        assert_eq!(json["phase"], "opening");
        assert_eq!(json["evaluation"]["pawns"], -0.5);
    }

    fn phase_strategy() -> impl Strategy<Value = GamePhase> {
        prop_oneof![
            Just(GamePhase::Opening),
            Just(GamePhase::Middlegame),
            Just(GamePhase::Endgame),
        ]
    }

    proptest! {
        #[test]
        fn buckets_are_short_and_worst_first(
            entries in proptest::collection::vec((1u32..80, -5.0f64..-0.2, phase_strategy()), 0..25)
        ) {
            let records = entries
                .into_iter()
                .map(|(n, delta, phase)| record(n, delta, phase))
                .collect();
            let buckets = MistakeBuckets::from_records(records);
            for (_, bucket) in buckets.named() {
                prop_assert!(bucket.len() <= BUCKET_CAPACITY);
                prop_assert!(bucket.windows(2).all(|w| w[0].delta <= w[1].delta));
            }
        }

        #[test]
        fn accuracy_is_bounded(penalty in 0.0f64..500.0, moves in 0u32..300) {
            let value = AccuracyScore::from_penalty(penalty, moves).value();
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }
}
