// ═══════════════════════════════════════════════════════════════════════
// Expectimax search — the root decision component.
//
// MAX nodes enumerate the engine's moves. Quiet moves are simulated in
// place (through the scoped guards, so the snapshot is always restored)
// and recursed; combat moves become probability-weighted sums over the
// defender's belief distribution. CHANCE nodes model the opponent with
// a heuristic likelihood over its replies, pruned to the most likely
// few, and return the weighted average.
//
// Search never mutates beliefs, and never leaves a mark on the
// snapshot it was handed.
// ═══════════════════════════════════════════════════════════════════════

use crate::belief::SessionBeliefState;
use crate::cache::{position_key, PositionCache};
use crate::evaluate::{self, TERMINAL_WIN};
use crate::phase::{detect_phase, EvaluationWeights, GamePhase};
use ambush_engine::board::{GameState, SimMove, SimRemove};
use ambush_engine::combat::{self, CombatOutcome, PAYOFF_TIE};
use ambush_engine::types::*;
use rand::seq::SliceRandom;
use rand::Rng;

/// Any candidate scoring below this is considered a blunder and culled
/// before selection (a safety net behind the explicit known-loser rule).
const CATASTROPHIC: f64 = -150.0;

/// Sentinel for attacks on a confirmed dominating defender. Far below
/// anything the evaluator can produce.
const FORBIDDEN: f64 = -1.0e9;

/// Opponent reply likelihood weights for chance nodes.
const REPLY_QUIET: f64 = 1.0;
const REPLY_CAPTURE: f64 = 3.0;
const REPLY_KING_ATTACK: f64 = 8.0;
const REPLY_FORWARD_MULT: f64 = 1.5;
const REPLY_RETREAT_MULT: f64 = 0.6;

#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Chance of skipping search entirely for a uniformly random move.
    pub suboptimal_prob: f64,
    /// Near-optimal tie-break band: relative fraction of the best score.
    pub near_optimal_rel: f64,
    /// ...and its absolute floor.
    pub near_optimal_abs: f64,
    /// Replies kept per chance node.
    pub chance_top_n: usize,
}

impl Default for SearchConfig {
    fn default() -> SearchConfig {
        SearchConfig {
            suboptimal_prob: 0.08,
            near_optimal_rel: 0.10,
            near_optimal_abs: 2.0,
            chance_top_n: 5,
        }
    }
}

/// Ephemeral candidate, never persisted beyond one decision.
#[derive(Debug, Clone, Copy)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: f64,
}

/// Search depth from remaining material: deeper only where branching
/// is cheap.
pub fn depth_for(total_pieces: usize) -> u32 {
    match total_pieces {
        0..=6 => 4,
        7..=10 => 3,
        _ => 2,
    }
}

struct SearchCtx<'a> {
    beliefs: &'a SessionBeliefState,
    weights: &'a EvaluationWeights,
    phase: GamePhase,
    side: Side,
    top_n: usize,
    cache: &'a mut PositionCache,
}

/// Choose a move for the belief state's side. None only when the side
/// has no legal move at all.
pub fn select_move(
    state: &mut GameState,
    beliefs: &SessionBeliefState,
    config: &SearchConfig,
    cache: &mut PositionCache,
    rng: &mut impl Rng,
) -> Option<Move> {
    let side = beliefs.side;
    let moves = state.legal_moves(side);
    if moves.is_empty() {
        return None;
    }

    // Controlled imperfection: occasionally just play something.
    if config.suboptimal_prob > 0.0 && rng.gen_bool(config.suboptimal_prob) {
        return random_move(state, side, rng);
    }

    // Royal safety outranks exploratory depth.
    if let Some(mv) = emergency_capture(state, beliefs, side) {
        return Some(mv);
    }

    // Cached evaluations are only valid while beliefs are frozen, i.e.
    // within this one decision.
    cache.clear();
    let phase = detect_phase(state, beliefs, side);
    let mut ctx = SearchCtx {
        beliefs,
        weights: phase.weights(),
        phase,
        side,
        top_n: config.chance_top_n,
        cache,
    };
    let depth = depth_for(state.total_alive());

    let mut scored = Vec::with_capacity(moves.len());
    for mv in moves {
        let score = ctx.score_move(state, mv, depth - 1);
        scored.push(ScoredMove { mv, score });
    }
    pick_near_optimal(scored, config, rng)
}

/// Uniform random fallback: random movable piece, then a random one of
/// its destinations.
pub fn random_move(state: &GameState, side: Side, rng: &mut impl Rng) -> Option<Move> {
    let movable: Vec<PieceId> = state
        .alive_pieces(side)
        .filter(|p| !state.moves_for(p.id).is_empty())
        .map(|p| p.id)
        .collect();
    let &piece = movable.choose(rng)?;
    let from = state.piece(piece).pos;
    let to = *state.moves_for(piece).choose(rng)?;
    Some(Move { from, to })
}

// ── Emergency check ────────────────────────────────────────────────────

/// If something unidentified stands next to our king, try to kill it
/// right now: any capture of the threat with positive expected value
/// (and not confirmed fatal) short-circuits the full search.
fn emergency_capture(
    state: &GameState,
    beliefs: &SessionBeliefState,
    side: Side,
) -> Option<Move> {
    if state.config().goal != GoalKind::CaptureKing {
        return None;
    }
    let king = state.king_of(side).filter(|k| k.alive)?;

    let threats: Vec<&Piece> = state
        .alive_pieces(side.opponent())
        .filter(|p| p.pos.distance(king.pos) == 1)
        .filter(|p| evaluate::known_kind(beliefs, p).map_or(true, |k| k.is_mobile()))
        .collect();
    if threats.is_empty() {
        return None;
    }

    let mut best: Option<(Move, f64)> = None;
    for threat in threats {
        for piece in state.alive_pieces(side).filter(|p| p.kind.is_mobile()) {
            if !state.moves_for(piece.id).contains(&threat.pos) {
                continue;
            }
            // A capture confirmed fatal to us is no rescue.
            if let Some(kind) = evaluate::known_kind(beliefs, threat) {
                if combat::resolve(piece.kind, kind) == CombatOutcome::DefenderWins {
                    continue;
                }
            }
            let ev = evaluate::combat_expectation(beliefs, piece.kind, threat);
            if ev > 0.0 && best.map_or(true, |(_, b)| ev > b) {
                best = Some((Move { from: piece.pos, to: threat.pos }, ev));
            }
        }
    }
    best.map(|(mv, _)| mv)
}

// ── Node evaluation ────────────────────────────────────────────────────

impl SearchCtx<'_> {
    fn leaf(&mut self, state: &GameState) -> f64 {
        let key = position_key(state, self.side);
        if let Some(value) = self.cache.get(key) {
            return value;
        }
        let value = evaluate::evaluate(state, self.beliefs, self.weights, self.side);
        self.cache.put(key, value);
        value
    }

    /// Value of one engine move, searched to `depth` further plies.
    fn score_move(&mut self, state: &mut GameState, mv: Move, depth: u32) -> f64 {
        let (attacker_id, attacker_kind) = {
            let p = state.piece_at(mv.from).expect("move origin must be occupied");
            (p.id, p.kind)
        };

        let Some(defender) = state.piece_at(mv.to) else {
            // Quiet move: apply, descend, restore.
            let mut sim = SimMove::apply(state, attacker_id, mv.to);
            return self.descend(sim.state_mut(), depth);
        };
        let defender_id = defender.id;

        // Hard rule, enforced here and again at selection time: a
        // confirmed dominating defender is never worth attacking.
        if let Some(kind) = evaluate::known_kind(self.beliefs, defender) {
            if combat::resolve(attacker_kind, kind) == CombatOutcome::DefenderWins {
                return FORBIDDEN;
            }
        }

        let info = evaluate::information_gain(self.beliefs, defender, self.weights, self.phase);
        let distribution = match self.beliefs.get(defender_id) {
            Some(t) => t.belief,
            None => {
                // Untracked defender: fall back on the immediate
                // expectation, no branch recursion.
                return evaluate::combat_expectation(self.beliefs, attacker_kind, defender) + info;
            }
        };

        // Belief-weighted branches over what the defender might be.
        let mut value = info;
        for kind in PieceKind::ALL {
            let p = distribution[kind.index()];
            if p <= 0.0 {
                continue;
            }
            let branch = match combat::resolve(attacker_kind, kind) {
                CombatOutcome::AttackerWins if kind == PieceKind::King => TERMINAL_WIN,
                CombatOutcome::AttackerWins => {
                    let mut sim = SimMove::apply(state, attacker_id, mv.to);
                    self.descend(sim.state_mut(), depth)
                }
                CombatOutcome::DefenderWins => {
                    let mut sim = SimRemove::apply(state, attacker_id);
                    self.descend(sim.state_mut(), depth)
                }
                // A tie freezes the board and opens a duel; treat it as
                // the standing position plus the duel's small upside.
                CombatOutcome::Tie => self.leaf(state) + PAYOFF_TIE,
            };
            value += p * branch;
        }
        value
    }

    fn descend(&mut self, state: &mut GameState, depth: u32) -> f64 {
        if depth == 0 {
            self.leaf(state)
        } else {
            self.chance_node(state, depth)
        }
    }

    /// Opponent's hypothetical turn: weighted average over its most
    /// likely replies.
    fn chance_node(&mut self, state: &mut GameState, depth: u32) -> f64 {
        let opp = self.side.opponent();
        let moves = state.legal_moves(opp);
        if moves.is_empty() {
            return self.leaf(state);
        }

        let king_pos = state.king_of(self.side).filter(|k| k.alive).map(|k| k.pos);
        let mut weighted: Vec<(Move, f64)> = moves
            .into_iter()
            .map(|mv| (mv, reply_weight(state, mv, opp, king_pos)))
            .collect();
        weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
        weighted.truncate(self.top_n);

        let total: f64 = weighted.iter().map(|(_, w)| w).sum();
        let mut value = 0.0;
        for (mv, w) in weighted {
            let mover = state.piece_at(mv.from).map(|p| p.id).expect("reply origin occupied");
            let mut sim = SimMove::apply(state, mover, mv.to);
            let v = if depth <= 1 {
                self.leaf(sim.state())
            } else {
                self.max_node(sim.state_mut(), depth - 1)
            };
            value += v * w / total;
        }
        value
    }

    /// Engine to move again, deeper in the tree.
    fn max_node(&mut self, state: &mut GameState, depth: u32) -> f64 {
        let moves = state.legal_moves(self.side);
        if moves.is_empty() {
            return self.leaf(state);
        }
        let mut best = f64::NEG_INFINITY;
        for mv in moves {
            let v = self.score_move(state, mv, depth - 1);
            if v > best {
                best = v;
            }
        }
        best
    }
}

/// Heuristic likelihood that the opponent actually plays this reply.
fn reply_weight(state: &GameState, mv: Move, opp: Side, our_king: Option<Position>) -> f64 {
    let mut weight = match state.piece_at(mv.to) {
        Some(target) if Some(target.pos) == our_king => REPLY_KING_ATTACK,
        Some(_) => REPLY_CAPTURE,
        None => REPLY_QUIET,
    };
    // Opponents push forward far more often than they retreat.
    let dr = mv.to.row as i16 - mv.from.row as i16;
    let advance = dr as i8 * opp.forward();
    if advance > 0 {
        weight *= REPLY_FORWARD_MULT;
    } else if advance < 0 {
        weight *= REPLY_RETREAT_MULT;
    }
    weight
}

// ── Selection ──────────────────────────────────────────────────────────

/// Drop forbidden and catastrophic candidates, then pick uniformly
/// among everything within a small band of the best score. Bounded
/// unpredictability beats a single deterministic line.
fn pick_near_optimal(
    scored: Vec<ScoredMove>,
    config: &SearchConfig,
    rng: &mut impl Rng,
) -> Option<Move> {
    if scored.is_empty() {
        return None;
    }
    let allowed: Vec<ScoredMove> = scored
        .iter()
        .copied()
        .filter(|s| s.score > FORBIDDEN / 2.0)
        .collect();
    let mut pool: Vec<ScoredMove> = allowed
        .iter()
        .copied()
        .filter(|s| s.score > CATASTROPHIC)
        .collect();
    if pool.is_empty() {
        // A side with legal moves still owes the engine one, even when
        // every option is an attack on a confirmed winner: feeding a
        // piece keeps the game alive, returning None forfeits it. Pick
        // the least bad.
        pool = if allowed.is_empty() { scored } else { allowed };
        return pool
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|s| s.mv);
    }

    let best = pool
        .iter()
        .map(|s| s.score)
        .fold(f64::NEG_INFINITY, f64::max);
    let margin = (best.abs() * config.near_optimal_rel).max(config.near_optimal_abs);
    let near: Vec<ScoredMove> = pool
        .into_iter()
        .filter(|s| s.score >= best - margin)
        .collect();
    near.choose(rng).map(|s| s.mv)
}
