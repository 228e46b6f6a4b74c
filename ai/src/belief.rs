// ═══════════════════════════════════════════════════════════════════════
// Belief tracking — probability distributions over unseen enemy pieces
//
// One SessionBeliefState exists per game session. It is created when
// play begins (after setup) and maintains, for every opposing piece, a
// distribution over the kinds it could still be. Constraint propagation
// keeps the joint belief consistent with the fixed army composition:
// a kind with no unaccounted instances left carries no probability mass,
// and when the count of unaccounted instances of a kind equals the
// number of candidates still admitting it, all of them must be it.
//
// Every operation here degrades to a no-op on unknown piece ids. The
// tracker must never block play, even on malformed input.
// ═══════════════════════════════════════════════════════════════════════

use ambush_engine::board::GameState;
use ambush_engine::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Probability per kind, indexed by `PieceKind::index()`.
pub type BeliefVec = [f64; PieceKind::COUNT];

const MAX_PROPAGATION_ROUNDS: usize = 20;
const PROB_EPSILON: f64 = 1e-9;

/// Belief record for one opposing piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedPiece {
    pub id: PieceId,
    pub belief: BeliefVec,
    /// Set once the kind is certain (combat reveal or deduction).
    /// Permanent after that.
    pub revealed: Option<PieceKind>,
    pub dead: bool,
    pub has_moved: bool,
    pub last_pos: Option<Position>,
    /// Whether this piece has been subtracted from the remaining
    /// type counts. Prevents double accounting when a revealed piece
    /// later dies.
    accounted: bool,
}

impl TrackedPiece {
    pub fn probability(&self, kind: PieceKind) -> f64 {
        self.belief[kind.index()]
    }

    /// Kind is certain: revealed, or the distribution collapsed.
    pub fn known_kind(&self) -> Option<PieceKind> {
        if let Some(kind) = self.revealed {
            return Some(kind);
        }
        PieceKind::ALL
            .into_iter()
            .find(|k| self.belief[k.index()] > 1.0 - PROB_EPSILON)
    }

    /// Shannon entropy of the distribution, in bits.
    pub fn entropy(&self) -> f64 {
        self.belief
            .iter()
            .filter(|&&p| p > PROB_EPSILON)
            .map(|&p| -p * p.log2())
            .sum()
    }
}

/// Per-session belief aggregate over all opposing pieces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBeliefState {
    /// The AI's own side; tracked pieces belong to the opponent.
    pub side: Side,
    pub mode: GameMode,
    pub tracked: HashMap<PieceId, TrackedPiece>,
    /// Unaccounted instances per kind (not yet revealed or dead).
    pub remaining: [u8; PieceKind::COUNT],
    /// Original composition per kind.
    pub total: [u8; PieceKind::COUNT],
    pub known_king_pos: Option<Position>,
    pub known_pit_pos: Option<Position>,
}

impl SessionBeliefState {
    /// Build a uniform prior proportional to the army composition for
    /// every opposing piece, then run constraint propagation once.
    /// Pieces already revealed in the snapshot (none in a normal game
    /// start) are collapsed immediately.
    pub fn initialize(side: Side, state: &GameState) -> SessionBeliefState {
        let cfg = state.config();
        let mut total = [0u8; PieceKind::COUNT];
        for kind in PieceKind::ALL {
            total[kind.index()] = cfg.count_of(kind);
        }
        let composition_size: f64 = total.iter().map(|&c| c as f64).sum();

        let mut prior = [0.0; PieceKind::COUNT];
        if composition_size > 0.0 {
            for kind in PieceKind::ALL {
                prior[kind.index()] = total[kind.index()] as f64 / composition_size;
            }
        }

        let mut beliefs = SessionBeliefState {
            side,
            mode: state.mode,
            tracked: HashMap::new(),
            remaining: total,
            total,
            known_king_pos: None,
            known_pit_pos: None,
        };

        for piece in state.alive_pieces(side.opponent()) {
            beliefs.tracked.insert(
                piece.id,
                TrackedPiece {
                    id: piece.id,
                    belief: prior,
                    revealed: None,
                    dead: false,
                    has_moved: false,
                    last_pos: Some(piece.pos),
                    accounted: false,
                },
            );
        }
        for piece in state.alive_pieces(side.opponent()) {
            if piece.revealed {
                beliefs.record_reveal(piece.id, piece.kind, Some(piece.pos));
            }
        }
        beliefs.propagate_constraints();
        beliefs
    }

    pub fn get(&self, id: PieceId) -> Option<&TrackedPiece> {
        self.tracked.get(&id)
    }

    /// Iterate the pieces whose kind is still uncertain (and alive).
    pub fn unknown_pieces(&self) -> impl Iterator<Item = &TrackedPiece> {
        self.tracked
            .values()
            .filter(|t| !t.dead && t.revealed.is_none())
    }

    // ── Update operations ──────────────────────────────────────────────

    /// A voluntary move is a hard exclusion: kings and pits never move,
    /// so the mover cannot be either. Certain, not probabilistic.
    pub fn record_movement(&mut self, id: PieceId, new_pos: Position) {
        let remaining = self.remaining;
        let Some(tracked) = self.tracked.get_mut(&id) else {
            return;
        };
        if tracked.dead {
            return;
        }
        tracked.has_moved = true;
        tracked.last_pos = Some(new_pos);
        if tracked.revealed.is_none() {
            tracked.belief[PieceKind::King.index()] = 0.0;
            tracked.belief[PieceKind::Pit.index()] = 0.0;
            renormalize(tracked, &remaining);
        }
        self.propagate_constraints();
    }

    /// Collapse a piece's distribution to certainty. Royal and trap
    /// positions persist once learned, since neither piece can move.
    pub fn record_reveal(&mut self, id: PieceId, kind: PieceKind, pos: Option<Position>) {
        let Some(tracked) = self.tracked.get_mut(&id) else {
            return;
        };
        if tracked.revealed.is_some() {
            return;
        }
        tracked.revealed = Some(kind);
        tracked.belief = one_hot(kind);
        if let Some(p) = pos {
            tracked.last_pos = Some(p);
        }
        let at = tracked.last_pos;
        if !tracked.accounted {
            tracked.accounted = true;
            let slot = &mut self.remaining[kind.index()];
            *slot = slot.saturating_sub(1);
        }
        match kind {
            PieceKind::King => self.known_king_pos = at,
            PieceKind::Pit => self.known_pit_pos = at,
            _ => {}
        }
        self.propagate_constraints();
    }

    /// A death is terminal. The position becomes irrelevant and the
    /// kind (if only just discovered) still feeds composition counts.
    pub fn record_death(&mut self, id: PieceId, kind: PieceKind) {
        let Some(tracked) = self.tracked.get_mut(&id) else {
            return;
        };
        if tracked.dead {
            return;
        }
        tracked.dead = true;
        tracked.last_pos = None;
        if tracked.revealed.is_none() {
            tracked.revealed = Some(kind);
            tracked.belief = one_hot(kind);
        }
        if !tracked.accounted {
            tracked.accounted = true;
            let slot = &mut self.remaining[kind.index()];
            *slot = slot.saturating_sub(1);
        }
        if self.known_king_pos.is_some() && kind == PieceKind::King {
            self.known_king_pos = None;
        }
        self.propagate_constraints();
    }

    /// The rules engine learned the enemy king's position out of band.
    pub fn set_known_king_position(&mut self, pos: Position) {
        self.known_king_pos = Some(pos);
    }

    // ── Constraint propagation ─────────────────────────────────────────

    /// Fixed-point iteration, bounded for safety:
    ///   1. a kind with zero unaccounted instances loses all mass on
    ///      every still-unknown piece;
    ///   2. pigeonhole — when exactly K unknown candidates admit a kind
    ///      with exactly K instances remaining, all K collapse to it.
    pub fn propagate_constraints(&mut self) {
        for _ in 0..MAX_PROPAGATION_ROUNDS {
            let mut changed = false;

            // Exhausted kinds carry no mass.
            let remaining = self.remaining;
            for tracked in self
                .tracked
                .values_mut()
                .filter(|t| !t.dead && t.revealed.is_none())
            {
                let mut touched = false;
                for kind in PieceKind::ALL {
                    if remaining[kind.index()] == 0 && tracked.belief[kind.index()] > 0.0 {
                        tracked.belief[kind.index()] = 0.0;
                        touched = true;
                    }
                }
                if touched {
                    renormalize(tracked, &remaining);
                    changed = true;
                }
            }

            // Pigeonhole collapse.
            for kind in PieceKind::ALL {
                let count = self.remaining[kind.index()];
                if count == 0 {
                    continue;
                }
                let candidates: Vec<PieceId> = self
                    .unknown_pieces()
                    .filter(|t| t.probability(kind) > PROB_EPSILON)
                    .map(|t| t.id)
                    .collect();
                if candidates.len() == count as usize {
                    for id in candidates {
                        // Deduction is as permanent as a combat reveal.
                        let tracked = self.tracked.get_mut(&id).unwrap();
                        tracked.revealed = Some(kind);
                        tracked.belief = one_hot(kind);
                        if !tracked.accounted {
                            tracked.accounted = true;
                            let slot = &mut self.remaining[kind.index()];
                            *slot = slot.saturating_sub(1);
                        }
                        let at = tracked.last_pos;
                        match kind {
                            PieceKind::King => self.known_king_pos = at,
                            PieceKind::Pit => self.known_pit_pos = at,
                            _ => {}
                        }
                        changed = true;
                    }
                }
            }

            if !changed {
                break;
            }
        }
    }
}

fn one_hot(kind: PieceKind) -> BeliefVec {
    let mut v = [0.0; PieceKind::COUNT];
    v[kind.index()] = 1.0;
    v
}

/// Rescale a distribution to sum to 1. Contradictory evidence can zero
/// everything out; the guard falls back to a uniform distribution over
/// the kinds this piece could still plausibly be rather than emit NaN.
fn renormalize(tracked: &mut TrackedPiece, remaining: &[u8; PieceKind::COUNT]) {
    let sum: f64 = tracked.belief.iter().sum();
    if sum > PROB_EPSILON {
        for p in tracked.belief.iter_mut() {
            *p /= sum;
        }
        return;
    }
    let candidates: Vec<PieceKind> = PieceKind::ALL
        .into_iter()
        .filter(|k| remaining[k.index()] > 0)
        .filter(|k| !(tracked.has_moved && matches!(k, PieceKind::King | PieceKind::Pit)))
        .collect();
    tracked.belief = [0.0; PieceKind::COUNT];
    if candidates.is_empty() {
        return;
    }
    let p = 1.0 / candidates.len() as f64;
    for kind in candidates {
        tracked.belief[kind.index()] = p;
    }
}
