// ═══════════════════════════════════════════════════════════════════════
// Combat resolution tables
//
// The "beats" relation is closed over PieceKind so that adding or
// removing a combat type is a compile-time-checked change everywhere.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::PieceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    AttackerWins,
    DefenderWins,
    Tie,
}

/// Does combat type `a` strictly defeat combat type `b`?
///
/// Classic set: the familiar three-way cycle. Extended set: each of the
/// five types defeats exactly two others and loses to exactly two.
/// King and Pit are not combat types and never "beat" anything here;
/// their resolution is unconditional and handled in `resolve`.
pub fn beats(a: PieceKind, b: PieceKind) -> bool {
    use PieceKind::*;
    matches!(
        (a, b),
        (Rock, Scissors)
            | (Rock, Lizard)
            | (Paper, Rock)
            | (Paper, Spock)
            | (Scissors, Paper)
            | (Scissors, Lizard)
            | (Lizard, Paper)
            | (Lizard, Spock)
            | (Spock, Rock)
            | (Spock, Scissors)
    )
}

/// Resolve an attack by a mobile piece onto a defender of known kind.
pub fn resolve(attacker: PieceKind, defender: PieceKind) -> CombatOutcome {
    match defender {
        // Capturing the king always succeeds.
        PieceKind::King => CombatOutcome::AttackerWins,
        // The pit destroys any attacker unconditionally.
        PieceKind::Pit => CombatOutcome::DefenderWins,
        _ if attacker == defender => CombatOutcome::Tie,
        _ if beats(attacker, defender) => CombatOutcome::AttackerWins,
        _ => CombatOutcome::DefenderWins,
    }
}

// ── Payoff table ───────────────────────────────────────────────────────
// Fixed values used by the evaluator's combat expectation. Ties land a
// small positive value because the attacker keeps initiative in the duel.

pub const PAYOFF_KING: f64 = 200.0;
pub const PAYOFF_PIT: f64 = -200.0;
pub const PAYOFF_WIN: f64 = 40.0;
pub const PAYOFF_TIE: f64 = 5.0;
pub const PAYOFF_LOSS: f64 = -30.0;

/// Value of attacking a defender of known kind, from the attacker's side.
pub fn payoff(attacker: PieceKind, defender: PieceKind) -> f64 {
    match defender {
        PieceKind::King => PAYOFF_KING,
        PieceKind::Pit => PAYOFF_PIT,
        _ => match resolve(attacker, defender) {
            CombatOutcome::AttackerWins => PAYOFF_WIN,
            CombatOutcome::Tie => PAYOFF_TIE,
            CombatOutcome::DefenderWins => PAYOFF_LOSS,
        },
    }
}
