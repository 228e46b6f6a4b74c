// ═══════════════════════════════════════════════════════════════════════
// Tie pattern tracking — exploits repeated human behavior during
// prolonged tie-break duels.
//
// Two tiers:
//   Tier 1 (cross-duel): the opponent's opening choice in each distinct
//   duel across the session, predicted by frequency once two or more
//   duels have occurred.
//   Tier 2 (intra-duel): every choice within the current duel, checked
//   for streaks, rotations, then plain frequency.
// ═══════════════════════════════════════════════════════════════════════

use ambush_engine::combat::beats;
use ambush_engine::types::{CombatSet, PieceKind};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cross-duel history is bounded; ancient duels stop being evidence.
const MAX_CROSS_HISTORY: usize = 24;

const STREAK_2_CONFIDENCE: f64 = 0.6;
const STREAK_3_CONFIDENCE: f64 = 0.8;
const STREAK_4_CONFIDENCE: f64 = 0.95;
const ROTATION_CONFIDENCE: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub choice: PieceKind,
    pub confidence: f64,
}

/// Per-session record of an opponent's tie-break choices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TiePatternState {
    cross_first_choices: Vec<PieceKind>,
    current_duel: Vec<PieceKind>,
}

impl TiePatternState {
    pub fn new() -> TiePatternState {
        TiePatternState::default()
    }

    /// A fresh duel begins: intra-duel history resets, cross-duel
    /// history survives the whole session.
    pub fn start_duel(&mut self) {
        self.current_duel.clear();
    }

    /// The opponent committed a choice in the current duel.
    pub fn record_choice(&mut self, choice: PieceKind) {
        if !choice.is_combat_type() {
            return;
        }
        if self.current_duel.is_empty() {
            self.cross_first_choices.push(choice);
            if self.cross_first_choices.len() > MAX_CROSS_HISTORY {
                self.cross_first_choices.remove(0);
            }
        }
        self.current_duel.push(choice);
    }

    /// The duel resolved; intra-duel history is spent.
    pub fn duel_ended(&mut self) {
        self.current_duel.clear();
    }

    pub fn choices_this_duel(&self) -> &[PieceKind] {
        &self.current_duel
    }

    pub fn duels_seen(&self) -> usize {
        self.cross_first_choices.len()
    }

    /// Predict the opponent's next choice, with a confidence score.
    /// Checks in order: streak repetition, rotation, intra-duel
    /// frequency; falls back to cross-duel first-choice frequency when
    /// the current duel has no usable history yet.
    pub fn predict(&self, set: CombatSet) -> Option<Prediction> {
        if self.current_duel.len() >= 2 {
            if let Some(p) = self.predict_streak() {
                return Some(p);
            }
            if let Some(p) = self.predict_rotation(set) {
                return Some(p);
            }
            return frequency_prediction(&self.current_duel);
        }
        if self.cross_first_choices.len() >= 2 && self.current_duel.is_empty() {
            return frequency_prediction(&self.cross_first_choices);
        }
        None
    }

    /// Same choice repeated: people on tilt keep mashing one button.
    fn predict_streak(&self) -> Option<Prediction> {
        let last = *self.current_duel.last()?;
        let streak = self
            .current_duel
            .iter()
            .rev()
            .take_while(|&&c| c == last)
            .count();
        let confidence = match streak {
            0 | 1 => return None,
            2 => STREAK_2_CONFIDENCE,
            3 => STREAK_3_CONFIDENCE,
            _ => STREAK_4_CONFIDENCE,
        };
        Some(Prediction { choice: last, confidence })
    }

    /// Last three choices walking the set's cycle in either direction.
    fn predict_rotation(&self, set: CombatSet) -> Option<Prediction> {
        if self.current_duel.len() < 3 {
            return None;
        }
        let tail = &self.current_duel[self.current_duel.len() - 3..];
        for forward in [true, false] {
            if rotation_step(set, tail[0], forward) == Some(tail[1])
                && rotation_step(set, tail[1], forward) == Some(tail[2])
            {
                if let Some(next) = rotation_step(set, tail[2], forward) {
                    return Some(Prediction {
                        choice: next,
                        confidence: ROTATION_CONFIDENCE,
                    });
                }
            }
        }
        None
    }
}

/// Next element of the set's rotation cycle, forwards or backwards.
fn rotation_step(set: CombatSet, from: PieceKind, forward: bool) -> Option<PieceKind> {
    let order = set.rotation_order();
    let idx = order.iter().position(|&k| k == from)?;
    let n = order.len();
    let next = if forward { (idx + 1) % n } else { (idx + n - 1) % n };
    Some(order[next])
}

/// Most frequent choice; confidence is its share of the history.
fn frequency_prediction(history: &[PieceKind]) -> Option<Prediction> {
    if history.is_empty() {
        return None;
    }
    let mut best: Option<(PieceKind, usize)> = None;
    for &choice in history {
        let count = history.iter().filter(|&&c| c == choice).count();
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((choice, count));
        }
    }
    best.map(|(choice, count)| Prediction {
        choice,
        confidence: count as f64 / history.len() as f64,
    })
}

/// A response guaranteed to beat the predicted choice, picked uniformly
/// when the set offers more than one.
pub fn counter_for(prediction: PieceKind, set: CombatSet, rng: &mut impl Rng) -> Option<PieceKind> {
    let beaters: Vec<PieceKind> = set
        .kinds()
        .iter()
        .copied()
        .filter(|&k| beats(k, prediction))
        .collect();
    beaters.choose(rng).copied()
}
