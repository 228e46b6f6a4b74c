// ═══════════════════════════════════════════════════════════════════════
// Game phase classification — pure function of attrition, knowledge,
// and whether the enemy king has been located. Each phase maps to a
// fixed evaluation weight profile.
// ═══════════════════════════════════════════════════════════════════════

use crate::belief::SessionBeliefState;
use ambush_engine::board::GameState;
use ambush_engine::types::Side;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    Opening,
    Midgame,
    Endgame,
}

/// Named scalar weights consumed by the board evaluator. Immutable
/// configuration values; one profile per phase, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationWeights {
    pub forward_progress: f64,
    pub center_control: f64,
    pub king_proximity: f64,
    pub king_protection: f64,
    pub material: f64,
    pub infiltration: f64,
    pub information_gain: f64,
    pub threat_penalty: f64,
    pub king_exposure: f64,
    pub king_hunt_penalty: f64,
    pub composition: f64,
    pub king_danger_mult: f64,
}

// Opening pushes pieces out and buys information; endgame hoards
// material and walls off the king.
const OPENING: EvaluationWeights = EvaluationWeights {
    forward_progress: 2.0,
    center_control: 1.5,
    king_proximity: 1.0,
    king_protection: 2.0,
    material: 22.0,
    infiltration: 3.0,
    information_gain: 8.0,
    threat_penalty: 10.0,
    king_exposure: 6.0,
    king_hunt_penalty: 3.0,
    composition: 3.0,
    king_danger_mult: 1.0,
};

const MIDGAME: EvaluationWeights = EvaluationWeights {
    forward_progress: 1.5,
    center_control: 1.0,
    king_proximity: 2.5,
    king_protection: 3.0,
    material: 28.0,
    infiltration: 2.0,
    information_gain: 5.0,
    threat_penalty: 12.0,
    king_exposure: 8.0,
    king_hunt_penalty: 5.0,
    composition: 5.0,
    king_danger_mult: 1.5,
};

const ENDGAME: EvaluationWeights = EvaluationWeights {
    forward_progress: 1.0,
    center_control: 0.5,
    king_proximity: 4.0,
    king_protection: 5.0,
    material: 35.0,
    infiltration: 1.0,
    information_gain: 2.0,
    threat_penalty: 15.0,
    king_exposure: 10.0,
    king_hunt_penalty: 6.0,
    composition: 8.0,
    king_danger_mult: 2.5,
};

impl GamePhase {
    pub fn weights(self) -> &'static EvaluationWeights {
        match self {
            GamePhase::Opening => &OPENING,
            GamePhase::Midgame => &MIDGAME,
            GamePhase::Endgame => &ENDGAME,
        }
    }

    /// Scale factor for the information-gain bonus: probing is most
    /// valuable early and nearly worthless late.
    pub fn information_scale(self) -> f64 {
        match self {
            GamePhase::Opening => 1.0,
            GamePhase::Midgame => 0.6,
            GamePhase::Endgame => 0.25,
        }
    }
}

const OPENING_MAX_ATTRITION: f64 = 0.25;
const OPENING_MAX_KNOWLEDGE: f64 = 0.3;
const ENDGAME_MIN_ATTRITION: f64 = 0.6;
const ENDGAME_MAX_PIECES: usize = 6;

/// Classify the game. Recomputed on every search call, never persisted.
pub fn detect_phase(state: &GameState, beliefs: &SessionBeliefState, side: Side) -> GamePhase {
    let starting_total = state.config().pieces_per_side() as f64 * 2.0;
    let alive = state.total_alive();
    let attrition = 1.0 - alive as f64 / starting_total;

    let opp_alive = state.alive_pieces(side.opponent()).count();
    let opp_known = state
        .alive_pieces(side.opponent())
        .filter(|p| {
            beliefs
                .get(p.id)
                .map_or(p.revealed, |t| t.known_kind().is_some())
        })
        .count();
    let knowledge = if opp_alive == 0 {
        1.0
    } else {
        opp_known as f64 / opp_alive as f64
    };

    if attrition >= ENDGAME_MIN_ATTRITION
        || alive <= ENDGAME_MAX_PIECES
        || beliefs.known_king_pos.is_some()
    {
        GamePhase::Endgame
    } else if attrition < OPENING_MAX_ATTRITION && knowledge < OPENING_MAX_KNOWLEDGE {
        GamePhase::Opening
    } else {
        GamePhase::Midgame
    }
}
