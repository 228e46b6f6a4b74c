// ═══════════════════════════════════════════════════════════════════════
// Agent Trait — interface the self-play harness drives.
//
// Decision methods return the agent's choices; observation hooks are
// the harness telling the agent what it is legally allowed to see about
// the opponent. Defaults are no-ops so simple agents only implement the
// decisions they care about.
// ═══════════════════════════════════════════════════════════════════════

use crate::player::{AiConfig, AiPlayer};
use ambush_engine::board::GameState;
use ambush_engine::rules::SetupPlacement;
use ambush_engine::types::*;

pub trait Agent: Send {
    /// Human-readable name (e.g. "Expectimax", "Random").
    fn name(&self) -> &str;

    fn side(&self) -> Side;

    // ── Decisions ──────────────────────────────────────────────────────

    /// Propose king/pit placement. None asks the engine to place them.
    fn choose_setup(&mut self, mode: GameMode) -> Option<SetupPlacement>;

    /// Pick a move, or None to concede the turn (no legal move).
    fn choose_move(&mut self, state: &mut GameState) -> Option<Move>;

    /// Pick a tie-break type. `known_opponent_kind` is set when the
    /// duel already revealed what the opponent's piece is.
    fn choose_tie(&mut self, set: CombatSet, known_opponent_kind: Option<PieceKind>) -> PieceKind;

    // ── Observation hooks (default no-op) ──────────────────────────────

    /// Both setups are placed; the game is about to start.
    fn begin_play(&mut self, _state: &GameState) {}

    /// An opposing piece moved without fighting.
    fn observe_opponent_move(&mut self, _piece: PieceId, _to: Position) {}

    /// Combat revealed an opposing piece's kind.
    fn observe_reveal(&mut self, _piece: PieceId, _kind: PieceKind, _pos: Position, _survived: bool) {}

    fn observe_tie_duel_start(&mut self) {}

    fn observe_opponent_tie_choice(&mut self, _choice: PieceKind) {}

    fn observe_tie_duel_end(&mut self) {}
}

// ── Expectimax agent ───────────────────────────────────────────────────

/// The full decision subsystem behind the Agent interface: one internal
/// `AiPlayer` with a single session, observation hooks forwarded into
/// its belief feed.
pub struct ExpectimaxAgent {
    side: Side,
    session: SessionId,
    player: AiPlayer,
}

impl ExpectimaxAgent {
    pub fn new(side: Side, mode: GameMode, seed: u64) -> ExpectimaxAgent {
        ExpectimaxAgent::with_config(side, mode, seed, AiConfig::default())
    }

    pub fn with_config(side: Side, mode: GameMode, seed: u64, config: AiConfig) -> ExpectimaxAgent {
        let session = SessionId(0);
        let mut player = AiPlayer::with_seed(config, seed);
        player.init_session(session, mode, side);
        ExpectimaxAgent {
            side,
            session,
            player,
        }
    }
}

impl Agent for ExpectimaxAgent {
    fn name(&self) -> &str {
        "Expectimax"
    }

    fn side(&self) -> Side {
        self.side
    }

    fn choose_setup(&mut self, _mode: GameMode) -> Option<SetupPlacement> {
        self.player.generate_setup(self.session)
    }

    fn choose_move(&mut self, state: &mut GameState) -> Option<Move> {
        // If the harness skipped begin_play the player falls back to
        // random legal moves on its own.
        self.player.select_move(self.session, state)
    }

    fn choose_tie(&mut self, set: CombatSet, known_opponent_kind: Option<PieceKind>) -> PieceKind {
        self.player
            .select_tie_choice(self.session, set, known_opponent_kind)
            .unwrap_or(set.kinds()[0])
    }

    fn begin_play(&mut self, state: &GameState) {
        self.player.initialize_tracking(self.session, state);
    }

    fn observe_opponent_move(&mut self, piece: PieceId, to: Position) {
        self.player.record_opponent_movement(self.session, piece, to);
    }

    fn observe_reveal(&mut self, piece: PieceId, kind: PieceKind, pos: Position, survived: bool) {
        self.player
            .record_combat_outcome(self.session, piece, kind, pos, survived);
        if kind == PieceKind::King && survived {
            self.player.update_known_king_position(self.session, pos);
        }
    }

    fn observe_tie_duel_start(&mut self) {
        self.player.start_tie_duel(self.session);
    }

    fn observe_opponent_tie_choice(&mut self, choice: PieceKind) {
        self.player.record_opponent_tie_choice(self.session, choice);
    }

    fn observe_tie_duel_end(&mut self) {
        self.player.end_tie_duel(self.session);
    }
}
