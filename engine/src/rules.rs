// ═══════════════════════════════════════════════════════════════════════
// Rules layer — authoritative setup and move application.
//
// Architecture:
//   The rules layer is a pure state machine over GameState. It never does
//   I/O and never calls agents. Tie duels are the one decision it cannot
//   resolve alone: `apply_move` returns `TiePending` and the harness
//   collects both sides' secret choices and feeds them to `resolve_tie`,
//   repeating until the duel breaks.
// ═══════════════════════════════════════════════════════════════════════

use crate::board::GameState;
use crate::combat::{self, CombatOutcome};
use crate::types::*;
use rand::seq::SliceRandom;
use rand::Rng;

/// King and pit placement for one side, chosen before play begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupPlacement {
    pub king: Position,
    pub pit: Position,
}

/// Result of applying one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Quiet move onto an empty cell.
    Moved,
    /// Combat won: defender removed, attacker occupies its cell.
    AttackerWins { defender: PieceId },
    /// Combat lost (losing matchup, or the defender was a pit).
    AttackerDies { defender: PieceId },
    /// Equal combat types collided: a tie duel must be resolved by the
    /// harness before play continues.
    TiePending { defender: PieceId },
}

#[derive(Debug, Clone, Copy)]
pub struct Applied {
    pub attacker: PieceId,
    pub outcome: MoveOutcome,
    pub winner: Option<Side>,
}

/// One round of a tie duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieRound {
    /// Choices matched again — duel repeats.
    Replay,
    AttackerWon,
    DefenderWon,
}

// ── Setup ──────────────────────────────────────────────────────────────

/// Build the initial board. Sides without an explicit placement get a
/// random back-row king with an adjacent pit. Mover pieces always fill
/// random home-zone cells. Seeded RNG keeps setups reproducible.
pub fn setup_board(
    mode: GameMode,
    session: SessionId,
    red: Option<SetupPlacement>,
    blue: Option<SetupPlacement>,
    rng: &mut impl Rng,
) -> Result<GameState, String> {
    let mut state = GameState::new_empty(mode, session);
    place_side(&mut state, Side::Red, red, rng)?;
    place_side(&mut state, Side::Blue, blue, rng)?;
    Ok(state)
}

fn place_side(
    state: &mut GameState,
    side: Side,
    placement: Option<SetupPlacement>,
    rng: &mut impl Rng,
) -> Result<(), String> {
    let cfg = *state.config();
    let home = cfg.home_rows(side);

    if cfg.goal == GoalKind::CaptureKing {
        let placement = match placement {
            Some(p) => {
                validate_placement(&cfg, side, &p)?;
                p
            }
            None => random_placement(&cfg, side, rng),
        };
        state.place_piece(side, PieceKind::King, placement.king);
        state.place_piece(side, PieceKind::Pit, placement.pit);
    } else if placement.is_some() {
        return Err(format!("{} placement given for a mode without king/pit", side));
    }

    // Movers fill random free home-zone cells.
    let mut kinds: Vec<PieceKind> = Vec::new();
    for kind in cfg.kinds_in_play() {
        if kind.is_mobile() {
            for _ in 0..cfg.count_of(kind) {
                kinds.push(kind);
            }
        }
    }
    kinds.shuffle(rng);

    let mut free: Vec<Position> = Vec::new();
    for &row in &home {
        for col in 0..cfg.width {
            let pos = Position::new(col, row);
            if state.piece_at(pos).is_none() {
                free.push(pos);
            }
        }
    }
    if free.len() < kinds.len() {
        return Err(format!(
            "Home zone too small for {}: {} cells, {} movers",
            side,
            free.len(),
            kinds.len()
        ));
    }
    free.shuffle(rng);

    for (kind, pos) in kinds.into_iter().zip(free) {
        state.place_piece(side, kind, pos);
    }
    Ok(())
}

fn validate_placement(
    cfg: &crate::config::ModeConfig,
    side: Side,
    p: &SetupPlacement,
) -> Result<(), String> {
    let home = cfg.home_rows(side);
    if p.king.row != home[0] {
        return Err(format!("{} king must start on the back row", side));
    }
    if p.king.distance(p.pit) != 1 || !home.contains(&p.pit.row) {
        return Err(format!("{} pit must sit adjacent to the king, in the home zone", side));
    }
    Ok(())
}

fn random_placement(
    cfg: &crate::config::ModeConfig,
    side: Side,
    rng: &mut impl Rng,
) -> SetupPlacement {
    let home = cfg.home_rows(side);
    let king = Position::new(rng.gen_range(0..cfg.width), home[0]);
    let mut options: Vec<Position> = ORTHOGONAL_OFFSETS
        .iter()
        .filter_map(|&d| king.offset(d, cfg.width, cfg.height))
        .filter(|p| home.contains(&p.row))
        .collect();
    options.shuffle(rng);
    SetupPlacement { king, pit: options[0] }
}

// ── Move application ───────────────────────────────────────────────────

/// Apply one move for the side to play. Turn passes to the opponent
/// except when a tie duel is pending (the duel belongs to this turn).
pub fn apply_move(state: &mut GameState, mv: Move) -> Result<Applied, String> {
    let attacker_id = match state.piece_at(mv.from) {
        Some(p) if p.owner == state.to_move => p.id,
        Some(_) => return Err(format!("Piece at {:?} does not belong to {}", mv.from, state.to_move)),
        None => return Err(format!("No piece at {:?}", mv.from)),
    };
    if !state.moves_for(attacker_id).contains(&mv.to) {
        return Err(format!("Illegal move {:?} -> {:?}", mv.from, mv.to));
    }

    let defender_id = state.piece_at(mv.to).map(|p| p.id);
    let outcome = match defender_id {
        None => {
            move_piece(state, attacker_id, mv.to);
            MoveOutcome::Moved
        }
        Some(def_id) => {
            // Any combat reveals both identities.
            state.piece_mut(attacker_id).revealed = true;
            state.piece_mut(def_id).revealed = true;
            let att_kind = state.piece(attacker_id).kind;
            let def_kind = state.piece(def_id).kind;
            match combat::resolve(att_kind, def_kind) {
                CombatOutcome::AttackerWins => {
                    kill(state, def_id);
                    move_piece(state, attacker_id, mv.to);
                    MoveOutcome::AttackerWins { defender: def_id }
                }
                CombatOutcome::DefenderWins => {
                    kill(state, attacker_id);
                    MoveOutcome::AttackerDies { defender: def_id }
                }
                CombatOutcome::Tie => MoveOutcome::TiePending { defender: def_id },
            }
        }
    };

    if !matches!(outcome, MoveOutcome::TiePending { .. }) {
        state.to_move = state.to_move.opponent();
    }

    Ok(Applied {
        attacker: attacker_id,
        outcome,
        winner: winner_of(state),
    })
}

/// Resolve one round of a pending tie duel with both sides' secret
/// choices. On a decisive round the loser dies, the attacker advances if
/// it won, and the turn passes.
pub fn resolve_tie(
    state: &mut GameState,
    attacker: PieceId,
    defender: PieceId,
    attacker_choice: PieceKind,
    defender_choice: PieceKind,
) -> Result<TieRound, String> {
    if !attacker_choice.is_combat_type() || !defender_choice.is_combat_type() {
        return Err("Tie duel choices must be combat types".to_string());
    }
    let round = if attacker_choice == defender_choice {
        TieRound::Replay
    } else if combat::beats(attacker_choice, defender_choice) {
        let to = state.piece(defender).pos;
        kill(state, defender);
        move_piece(state, attacker, to);
        TieRound::AttackerWon
    } else {
        kill(state, attacker);
        TieRound::DefenderWon
    };
    if round != TieRound::Replay {
        state.to_move = state.to_move.opponent();
    }
    Ok(round)
}

fn move_piece(state: &mut GameState, id: PieceId, to: Position) {
    let from = state.piece(id).pos;
    let from_idx = state.cell_index(from);
    let to_idx = state.cell_index(to);
    state.cells[from_idx] = None;
    state.cells[to_idx] = Some(id);
    state.piece_mut(id).pos = to;
}

fn kill(state: &mut GameState, id: PieceId) {
    let pos = state.piece(id).pos;
    let idx = state.cell_index(pos);
    if state.cells[idx] == Some(id) {
        state.cells[idx] = None;
    }
    state.piece_mut(id).alive = false;
}

// ── Game over ──────────────────────────────────────────────────────────

/// Who has won, if anyone. A dead king loses the game in CaptureKing
/// modes; a side with no living pieces or no legal move loses everywhere.
pub fn winner_of(state: &GameState) -> Option<Side> {
    let cfg = state.config();
    for side in Side::ALL {
        if cfg.goal == GoalKind::CaptureKing {
            if let Some(king) = state.king_of(side) {
                if !king.alive {
                    return Some(side.opponent());
                }
            }
        }
        if state.alive_pieces(side).count() == 0 {
            return Some(side.opponent());
        }
    }
    // Stalemate by immobility: the side to play loses.
    if state.legal_moves(state.to_move).is_empty() {
        return Some(state.to_move.opponent());
    }
    None
}
