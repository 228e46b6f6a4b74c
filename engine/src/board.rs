// ═══════════════════════════════════════════════════════════════════════
// Board state — grid of cells, piece table, movement generation, and the
// scoped simulation guard the AI search uses for hypothetical moves.
// ═══════════════════════════════════════════════════════════════════════

use crate::config::ModeConfig;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a game in progress. The rules layer owns the authoritative
/// copy; the AI receives it by reference and only mutates it through
/// [`SimMove`], which restores the snapshot on drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub mode: GameMode,
    pub session: SessionId,
    pub to_move: Side,
    /// One entry per cell, row-major: `row * width + col`.
    pub cells: Vec<Option<PieceId>>,
    /// All pieces ever placed, dead or alive, indexed by PieceId.
    pub pieces: Vec<Piece>,
}

impl GameState {
    pub fn new_empty(mode: GameMode, session: SessionId) -> GameState {
        let cfg = mode.config();
        GameState {
            mode,
            session,
            to_move: Side::Red,
            cells: vec![None; cfg.width as usize * cfg.height as usize],
            pieces: Vec::new(),
        }
    }

    pub fn config(&self) -> &'static ModeConfig {
        self.mode.config()
    }

    pub fn width(&self) -> u8 {
        self.config().width
    }

    pub fn height(&self) -> u8 {
        self.config().height
    }

    pub fn cell_index(&self, pos: Position) -> usize {
        pos.row as usize * self.width() as usize + pos.col as usize
    }

    /// Place a new piece on an empty cell, assigning its id.
    /// Used only during setup.
    pub fn place_piece(&mut self, owner: Side, kind: PieceKind, pos: Position) -> PieceId {
        let id = PieceId(self.pieces.len() as u8);
        debug_assert!(self.cells[self.cell_index(pos)].is_none());
        self.pieces.push(Piece {
            id,
            owner,
            kind,
            pos,
            revealed: false,
            alive: true,
        });
        let idx = self.cell_index(pos);
        self.cells[idx] = Some(id);
        id
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.0 as usize]
    }

    pub fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.pieces[id.0 as usize]
    }

    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        self.cells[self.cell_index(pos)].map(|id| self.piece(id))
    }

    pub fn alive_pieces(&self, side: Side) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(move |p| p.alive && p.owner == side)
    }

    pub fn total_alive(&self) -> usize {
        self.pieces.iter().filter(|p| p.alive).count()
    }

    pub fn king_of(&self, side: Side) -> Option<&Piece> {
        self.pieces
            .iter()
            .find(|p| p.owner == side && p.kind == PieceKind::King)
    }

    // ── Movement generation ────────────────────────────────────────────
    // Both the rules layer and the AI search enumerate moves through
    // these, off the shared ORTHOGONAL_OFFSETS table.

    /// Legal destinations for one piece: one orthogonal step onto an
    /// empty cell or an enemy-occupied cell. King and Pit never move.
    pub fn moves_for(&self, id: PieceId) -> Vec<Position> {
        let piece = self.piece(id);
        if !piece.alive || !piece.kind.is_mobile() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(4);
        for d in ORTHOGONAL_OFFSETS {
            if let Some(to) = piece.pos.offset(d, self.width(), self.height()) {
                match self.piece_at(to) {
                    Some(other) if other.owner == piece.owner => {}
                    _ => out.push(to),
                }
            }
        }
        out
    }

    /// All legal moves for a side.
    pub fn legal_moves(&self, side: Side) -> Vec<Move> {
        let mut out = Vec::new();
        for piece in self.alive_pieces(side) {
            for to in self.moves_for(piece.id) {
                out.push(Move { from: piece.pos, to });
            }
        }
        out
    }
}

// ── Simulation guard ───────────────────────────────────────────────────

/// Scoped hypothetical move. Applies the move (removing a captured enemy
/// piece if the destination is occupied) on construction and restores the
/// exact prior state when dropped, on every exit path. Guards nest: each
/// deeper search ply opens its own guard on `state_mut()`.
pub struct SimMove<'a> {
    state: &'a mut GameState,
    mover: PieceId,
    from: Position,
    to: Position,
    captured: Option<PieceId>,
}

impl<'a> SimMove<'a> {
    pub fn apply(state: &'a mut GameState, mover: PieceId, to: Position) -> SimMove<'a> {
        let from = state.piece(mover).pos;
        let to_idx = state.cell_index(to);
        let from_idx = state.cell_index(from);

        let captured = state.cells[to_idx];
        if let Some(victim) = captured {
            state.piece_mut(victim).alive = false;
        }
        state.cells[from_idx] = None;
        state.cells[to_idx] = Some(mover);
        state.piece_mut(mover).pos = to;

        SimMove {
            state,
            mover,
            from,
            to,
            captured,
        }
    }

    pub fn state(&self) -> &GameState {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        self.state
    }
}

impl Drop for SimMove<'_> {
    fn drop(&mut self) {
        let from_idx = self.state.cell_index(self.from);
        let to_idx = self.state.cell_index(self.to);
        self.state.piece_mut(self.mover).pos = self.from;
        self.state.cells[from_idx] = Some(self.mover);
        self.state.cells[to_idx] = self.captured;
        if let Some(victim) = self.captured {
            self.state.piece_mut(victim).alive = true;
        }
    }
}

/// Scoped hypothetical removal of a single piece (a lost fight, seen
/// from the attacker's side). Restores the piece when dropped.
pub struct SimRemove<'a> {
    state: &'a mut GameState,
    piece: PieceId,
    pos: Position,
}

impl<'a> SimRemove<'a> {
    pub fn apply(state: &'a mut GameState, piece: PieceId) -> SimRemove<'a> {
        let pos = state.piece(piece).pos;
        let idx = state.cell_index(pos);
        state.cells[idx] = None;
        state.piece_mut(piece).alive = false;
        SimRemove { state, piece, pos }
    }

    pub fn state(&self) -> &GameState {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        self.state
    }
}

impl Drop for SimRemove<'_> {
    fn drop(&mut self) {
        let idx = self.state.cell_index(self.pos);
        self.state.cells[idx] = Some(self.piece);
        self.state.piece_mut(self.piece).alive = true;
    }
}
