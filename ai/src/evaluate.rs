// ═══════════════════════════════════════════════════════════════════════
// Board evaluator — scalar desirability of a (possibly hypothetical)
// position from the engine's perspective, plus the belief-weighted
// expected value of a specific attack.
//
// The evaluator never inspects a hidden enemy piece's true kind
// directly; everything it knows about unseen pieces flows through the
// session belief state.
// ═══════════════════════════════════════════════════════════════════════

use crate::belief::SessionBeliefState;
use crate::phase::{EvaluationWeights, GamePhase};
use ambush_engine::board::GameState;
use ambush_engine::combat::{self, payoff};
use ambush_engine::types::*;

/// Returned on decided positions; every heuristic term stays well
/// inside this magnitude.
pub const TERMINAL_WIN: f64 = 10_000.0;

/// Near-certain 1v1 showdowns in the elimination variant.
const SHOWDOWN_WIN: f64 = 5_000.0;

const KING_DANGER_ADJACENT: f64 = 20.0;
const KING_DANGER_NEAR: f64 = 8.0;
const INTERPOSE_RELIEF: f64 = 0.5;

// ── Position evaluation ────────────────────────────────────────────────

/// Score a position for `side`. Higher is better for `side`.
pub fn evaluate(
    state: &GameState,
    beliefs: &SessionBeliefState,
    weights: &EvaluationWeights,
    side: Side,
) -> f64 {
    let cfg = state.config();
    let opp = side.opponent();

    if cfg.goal == GoalKind::CaptureKing {
        match state.king_of(side) {
            Some(king) if !king.alive => return -TERMINAL_WIN,
            _ => {}
        }
        match state.king_of(opp) {
            Some(king) if !king.alive => return TERMINAL_WIN,
            _ => {}
        }
    }
    let my_alive = state.alive_pieces(side).count();
    let opp_alive = state.alive_pieces(opp).count();
    if my_alive == 0 {
        return -TERMINAL_WIN;
    }
    if opp_alive == 0 {
        return TERMINAL_WIN;
    }

    if cfg.goal == GoalKind::LastStanding {
        return evaluate_skirmish(state, beliefs, weights, side);
    }

    let mut score = (my_alive as f64 - opp_alive as f64) * weights.material;
    score += weights.composition * composition_advantage(state, beliefs, side);

    let height = state.height();
    let center = (state.width() - 1) as f64 / 2.0;

    for piece in state.alive_pieces(side).filter(|p| p.kind.is_mobile()) {
        score += weights.forward_progress * rows_advanced(piece, height);
        score += weights.infiltration * infiltration_depth(piece, height);
        score += weights.center_control * (1.0 - (piece.pos.col as f64 - center).abs() / center);

        if let Some(king_pos) = beliefs.known_king_pos {
            let d = piece.pos.distance(king_pos) as f64;
            score += weights.king_proximity * (6.0 - d).max(0.0);
        }

        // Adjacent enemies, weighted by the chance they win the fight.
        for enemy in adjacent_enemies(state, piece) {
            score -= weights.threat_penalty * prob_piece_beats(beliefs, enemy, piece.kind);
        }
    }

    if let Some(king) = state.king_of(side).filter(|k| k.alive) {
        score += king_safety(state, beliefs, weights, side, king);
    }

    score
}

/// Elimination-goal board shape: no king or pit terms, heavy material
/// and aggression, with shortcuts for decided 1v1 showdowns.
fn evaluate_skirmish(
    state: &GameState,
    beliefs: &SessionBeliefState,
    weights: &EvaluationWeights,
    side: Side,
) -> f64 {
    let opp = side.opponent();
    let mine: Vec<&Piece> = state.alive_pieces(side).collect();
    let theirs: Vec<&Piece> = state.alive_pieces(opp).collect();

    if mine.len() == 1 && theirs.len() == 1 {
        let p_win = prob_kind_beats(beliefs, mine[0].kind, theirs[0]);
        let p_loss = prob_piece_beats(beliefs, theirs[0], mine[0].kind);
        if p_win >= 0.9 {
            return SHOWDOWN_WIN;
        }
        if p_loss >= 0.9 {
            return -SHOWDOWN_WIN;
        }
    }

    let mut score = (mine.len() as f64 - theirs.len() as f64) * weights.material * 2.0;
    score += weights.composition * composition_advantage(state, beliefs, side);

    let height = state.height();
    for piece in &mine {
        score += weights.forward_progress * 1.5 * rows_advanced(piece, height);
        // Close the distance: standing off never wins an elimination game.
        if let Some(nearest) = theirs.iter().map(|e| piece.pos.distance(e.pos)).min() {
            score -= 0.5 * nearest as f64;
        }
        for enemy in adjacent_enemies(state, piece) {
            score -= weights.threat_penalty * prob_piece_beats(beliefs, enemy, piece.kind);
        }
    }
    score
}

// ── Per-term helpers ───────────────────────────────────────────────────

fn rows_advanced(piece: &Piece, height: u8) -> f64 {
    match piece.owner {
        Side::Red => piece.pos.row.saturating_sub(1) as f64,
        Side::Blue => (height - 2).saturating_sub(piece.pos.row) as f64,
    }
}

fn infiltration_depth(piece: &Piece, height: u8) -> f64 {
    let mid = height as f64 / 2.0;
    let depth = match piece.owner {
        Side::Red => piece.pos.row as f64 + 1.0 - mid,
        Side::Blue => mid - piece.pos.row as f64,
    };
    depth.max(0.0)
}

fn adjacent_enemies<'a>(state: &'a GameState, piece: &Piece) -> impl Iterator<Item = &'a Piece> {
    let owner = piece.owner;
    let pos = piece.pos;
    let (w, h) = (state.width(), state.height());
    ORTHOGONAL_OFFSETS
        .into_iter()
        .filter_map(move |d| pos.offset(d, w, h))
        .filter_map(|p| state.piece_at(p))
        .filter(move |p| p.owner != owner)
}

/// Estimated counter-matchup exposure both ways: mean over all mobile
/// piece pairs of P(we win the matchup) − P(they do). In [-1, 1].
fn composition_advantage(state: &GameState, beliefs: &SessionBeliefState, side: Side) -> f64 {
    let mut sum = 0.0;
    let mut pairs = 0u32;
    for mine in state.alive_pieces(side).filter(|p| p.kind.is_mobile()) {
        for theirs in state.alive_pieces(side.opponent()) {
            if known_kind(beliefs, theirs).map_or(false, |k| !k.is_mobile()) {
                continue;
            }
            sum += prob_kind_beats(beliefs, mine.kind, theirs)
                - prob_piece_beats(beliefs, theirs, mine.kind);
            pairs += 1;
        }
    }
    if pairs == 0 {
        0.0
    } else {
        sum / pairs as f64
    }
}

/// All king-centric terms: protection ring, open lane, probing enemies,
/// and the expanded-radius danger zone with interpose relief.
fn king_safety(
    state: &GameState,
    beliefs: &SessionBeliefState,
    weights: &EvaluationWeights,
    side: Side,
    king: &Piece,
) -> f64 {
    let mut score = 0.0;
    let mult = weights.king_danger_mult;
    let height = state.height();
    let mid = height / 2;

    let defenders = state
        .alive_pieces(side)
        .filter(|p| p.id != king.id && p.pos.distance(king.pos) <= 2)
        .count();
    score += weights.king_protection * defenders as f64;

    // Open lane: nothing friendly blocking the king's column on the
    // enemy side of it.
    let lane_blocked = state.alive_pieces(side).any(|p| {
        p.id != king.id
            && p.pos.col == king.pos.col
            && match side {
                Side::Red => p.pos.row > king.pos.row,
                Side::Blue => p.pos.row < king.pos.row,
            }
    });
    if !lane_blocked {
        score -= weights.king_exposure * mult;
    }

    for enemy in state.alive_pieces(side.opponent()) {
        // Confirmed immobile pieces cannot come for the king.
        if known_kind(beliefs, enemy).map_or(false, |k| !k.is_mobile()) {
            continue;
        }

        // An enemy past the midline closing in on the king's column has
        // probably found something.
        let past_midline = match side {
            Side::Red => enemy.pos.row < mid,
            Side::Blue => enemy.pos.row >= height - mid,
        };
        if past_midline && enemy.pos.col.abs_diff(king.pos.col) <= 1 {
            score -= weights.king_hunt_penalty;
        }

        match enemy.pos.distance(king.pos) {
            1 => score -= KING_DANGER_ADJACENT * mult,
            2 => {
                let mut danger = KING_DANGER_NEAR * mult;
                if let Some(between) = cell_between(enemy.pos, king.pos) {
                    let interposed = state
                        .piece_at(between)
                        .map_or(false, |p| p.owner == side && p.id != king.id);
                    if interposed {
                        danger *= INTERPOSE_RELIEF;
                    }
                }
                score -= danger;
            }
            _ => {}
        }
    }
    score
}

/// Midpoint of a straight two-cell path, if the two cells lie on one.
fn cell_between(a: Position, b: Position) -> Option<Position> {
    if a.col == b.col && a.row.abs_diff(b.row) == 2 {
        Some(Position::new(a.col, a.row.min(b.row) + 1))
    } else if a.row == b.row && a.col.abs_diff(b.col) == 2 {
        Some(Position::new(a.col.min(b.col) + 1, a.row))
    } else {
        None
    }
}

// ── Probabilistic matchups ─────────────────────────────────────────────

/// What the evaluating side knows a piece to be, if anything: the
/// engine-visible reveal flag, or a collapsed belief.
pub fn known_kind(beliefs: &SessionBeliefState, piece: &Piece) -> Option<PieceKind> {
    if piece.revealed {
        return Some(piece.kind);
    }
    beliefs.get(piece.id).and_then(|t| t.known_kind())
}

/// P(an enemy piece, attacking, defeats a defender of `target` kind).
/// Kings and pits never attack, so their mass contributes nothing.
pub fn prob_piece_beats(beliefs: &SessionBeliefState, enemy: &Piece, target: PieceKind) -> f64 {
    if let Some(kind) = known_kind(beliefs, enemy) {
        return if kind.is_mobile() && combat::beats(kind, target) {
            1.0
        } else {
            0.0
        };
    }
    match beliefs.get(enemy.id) {
        Some(t) => PieceKind::ALL
            .into_iter()
            .filter(|k| k.is_mobile() && combat::beats(*k, target))
            .map(|k| t.probability(k))
            .sum(),
        None => fallback_distribution(beliefs)
            .into_iter()
            .zip(PieceKind::ALL)
            .filter(|(_, k)| k.is_mobile() && combat::beats(*k, target))
            .map(|(p, _)| p)
            .sum(),
    }
}

/// P(our piece of `attacker` kind wins an attack on `defender`),
/// counting a king capture as a win and everything else per the table.
pub fn prob_kind_beats(beliefs: &SessionBeliefState, attacker: PieceKind, defender: &Piece) -> f64 {
    let win = |k: PieceKind| k == PieceKind::King || combat::beats(attacker, k);
    if let Some(kind) = known_kind(beliefs, defender) {
        return if win(kind) { 1.0 } else { 0.0 };
    }
    match beliefs.get(defender.id) {
        Some(t) => PieceKind::ALL
            .into_iter()
            .filter(|k| win(*k))
            .map(|k| t.probability(k))
            .sum(),
        None => fallback_distribution(beliefs)
            .into_iter()
            .zip(PieceKind::ALL)
            .filter(|(_, k)| win(*k))
            .map(|(p, _)| p)
            .sum(),
    }
}

/// Distribution from remaining composition counts, used for pieces the
/// tracker has never heard of. "No information" rather than a crash.
fn fallback_distribution(beliefs: &SessionBeliefState) -> [f64; PieceKind::COUNT] {
    let total: f64 = beliefs.remaining.iter().map(|&c| c as f64).sum();
    let mut dist = [0.0; PieceKind::COUNT];
    if total > 0.0 {
        for kind in PieceKind::ALL {
            dist[kind.index()] = beliefs.remaining[kind.index()] as f64 / total;
        }
    }
    dist
}

// ── Combat expected value ──────────────────────────────────────────────

/// Expected value of `attacker` stepping onto `defender`, per the fixed
/// payoff table: certain when the defender's kind is known, otherwise
/// weighted over its belief distribution.
pub fn combat_expectation(
    beliefs: &SessionBeliefState,
    attacker: PieceKind,
    defender: &Piece,
) -> f64 {
    if let Some(kind) = known_kind(beliefs, defender) {
        return payoff(attacker, kind);
    }
    let dist = match beliefs.get(defender.id) {
        Some(t) => t.belief,
        None => fallback_distribution(beliefs),
    };
    PieceKind::ALL
        .into_iter()
        .map(|k| dist[k.index()] * payoff(attacker, k))
        .sum()
}

// ── Information gain ───────────────────────────────────────────────────

/// Small capped bonus for fights that teach us something: proportional
/// to the defender's belief entropy, boosted when the defender might be
/// the king, discounted when it might be the pit, and worth less as the
/// game ages.
pub fn information_gain(
    beliefs: &SessionBeliefState,
    defender: &Piece,
    weights: &EvaluationWeights,
    phase: GamePhase,
) -> f64 {
    if known_kind(beliefs, defender).is_some() {
        return 0.0;
    }
    let Some(tracked) = beliefs.get(defender.id) else {
        return 0.0;
    };
    let max_entropy = (PieceKind::COUNT as f64).log2();
    let mut gain = weights.information_gain * (tracked.entropy() / max_entropy);
    gain = gain.min(weights.information_gain);

    let p_king = tracked.probability(PieceKind::King);
    let p_pit = tracked.probability(PieceKind::Pit);
    if p_king > 0.05 {
        gain *= 1.5;
    }
    gain -= weights.information_gain * 1.5 * p_pit;

    gain * phase.information_scale()
}
