// ═══════════════════════════════════════════════════════════════════════
// Session store and public decision surface.
//
// One `AiPlayer` serves any number of concurrent game sessions; each
// session carries its own belief state, tie pattern record, position
// cache, and RNG stream, so sessions never interfere. Callers serialize
// calls per session; across sessions no coordination is needed.
// ═══════════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::belief::SessionBeliefState;
use crate::cache::PositionCache;
use crate::patterns::{self, TiePatternState};
use crate::search::{self, SearchConfig};
use crate::setup;
use ambush_engine::board::GameState;
use ambush_engine::rules::SetupPlacement;
use ambush_engine::types::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// How often a duel response leans on countering the colliding kind
/// when no stronger pattern signal exists.
const KNOWN_KIND_LEAN: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Simulated think-time range in milliseconds, min..=max.
    pub think_time_ms: (u64, u64),
    /// Chance per decision of playing a random legal move instead.
    pub suboptimal_prob: f64,
    /// Chance of ignoring a tie prediction and picking at random.
    pub tie_jitter: f64,
    /// Minimum prediction confidence worth acting on.
    pub prediction_threshold: f64,
}

impl Default for AiConfig {
    fn default() -> AiConfig {
        AiConfig {
            think_time_ms: (400, 1600),
            suboptimal_prob: 0.08,
            tie_jitter: 0.10,
            prediction_threshold: 0.55,
        }
    }
}

struct Session {
    side: Side,
    mode: GameMode,
    beliefs: Option<SessionBeliefState>,
    patterns: TiePatternState,
    cache: PositionCache,
    rng: ChaCha8Rng,
}

/// The AI's whole public surface: session lifecycle, the observation
/// feed, and the three decision entry points (setup, move, tie choice).
pub struct AiPlayer {
    config: AiConfig,
    sessions: HashMap<SessionId, Session>,
    seed_rng: ChaCha8Rng,
}

impl AiPlayer {
    pub fn new(config: AiConfig) -> AiPlayer {
        AiPlayer::with_seed(config, rand::thread_rng().gen())
    }

    /// Deterministic variant for harness play and tests: every session
    /// RNG is derived from this one seed.
    pub fn with_seed(config: AiConfig, seed: u64) -> AiPlayer {
        AiPlayer {
            config,
            sessions: HashMap::new(),
            seed_rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    /// Register a session before the board exists. Replaces any prior
    /// session under the same id.
    pub fn init_session(&mut self, session: SessionId, mode: GameMode, side: Side) {
        let rng = ChaCha8Rng::seed_from_u64(self.seed_rng.gen());
        self.sessions.insert(
            session,
            Session {
                side,
                mode,
                beliefs: None,
                patterns: TiePatternState::new(),
                cache: PositionCache::new(),
                rng,
            },
        );
    }

    /// Snapshot the opening position into a fresh belief state. Called
    /// once both sides are placed.
    pub fn initialize_tracking(&mut self, session: SessionId, state: &GameState) {
        if let Some(s) = self.sessions.get_mut(&session) {
            s.beliefs = Some(SessionBeliefState::initialize(s.side, state));
        }
    }

    pub fn clear_session(&mut self, session: SessionId) {
        self.sessions.remove(&session);
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn beliefs(&self, session: SessionId) -> Option<&SessionBeliefState> {
        self.sessions.get(&session).and_then(|s| s.beliefs.as_ref())
    }

    // ── Observation feed ───────────────────────────────────────────────

    pub fn record_opponent_movement(&mut self, session: SessionId, piece: PieceId, to: Position) {
        if let Some(b) = self.beliefs_mut(session) {
            b.record_movement(piece, to);
        }
    }

    pub fn record_opponent_death(&mut self, session: SessionId, piece: PieceId, kind: PieceKind) {
        if let Some(b) = self.beliefs_mut(session) {
            b.record_death(piece, kind);
        }
    }

    /// Combat revealed an opposing piece's kind, whether or not the
    /// piece survived the exchange.
    pub fn record_combat_outcome(
        &mut self,
        session: SessionId,
        piece: PieceId,
        kind: PieceKind,
        pos: Position,
        survived: bool,
    ) {
        if let Some(b) = self.beliefs_mut(session) {
            if survived {
                b.record_reveal(piece, kind, Some(pos));
            } else {
                b.record_death(piece, kind);
            }
        }
    }

    /// Out-of-band king intelligence (e.g. the engine announced it).
    pub fn update_known_king_position(&mut self, session: SessionId, pos: Position) {
        if let Some(b) = self.beliefs_mut(session) {
            b.set_known_king_position(pos);
        }
    }

    // ── Decisions ──────────────────────────────────────────────────────

    /// Propose king and pit placement for the session's side. None when
    /// the mode has no royal pieces.
    pub fn generate_setup(&mut self, session: SessionId) -> Option<SetupPlacement> {
        let s = self.sessions.get_mut(&session)?;
        setup::generate_setup(s.mode, s.side, &mut s.rng)
    }

    /// Full decision pipeline. Falls back to a plain random legal move
    /// when tracking was never initialized for the session.
    pub fn select_move(&mut self, session: SessionId, state: &mut GameState) -> Option<Move> {
        let s = self.sessions.get_mut(&session)?;
        let side = s.side;
        match s.beliefs.as_ref() {
            Some(beliefs) => {
                let config = SearchConfig {
                    suboptimal_prob: self.config.suboptimal_prob,
                    ..SearchConfig::default()
                };
                search::select_move(state, beliefs, &config, &mut s.cache, &mut s.rng)
            }
            None => search::random_move(state, side, &mut s.rng),
        }
    }

    pub fn start_tie_duel(&mut self, session: SessionId) {
        if let Some(s) = self.sessions.get_mut(&session) {
            s.patterns.start_duel();
        }
    }

    pub fn record_opponent_tie_choice(&mut self, session: SessionId, choice: PieceKind) {
        if let Some(s) = self.sessions.get_mut(&session) {
            s.patterns.record_choice(choice);
        }
    }

    pub fn end_tie_duel(&mut self, session: SessionId) {
        if let Some(s) = self.sessions.get_mut(&session) {
            s.patterns.duel_ended();
        }
    }

    /// Pick a tie-break type. Jitter first (a fixed duel response is
    /// exploitable), then act on a pattern prediction when it clears
    /// the confidence threshold. The colliding piece's own kind is a
    /// weak hint at habit at most, never a deterministic counter: both
    /// duelists throw fresh each round, so knowing what collided says
    /// little about what comes next.
    pub fn select_tie_choice(
        &mut self,
        session: SessionId,
        set: CombatSet,
        known_opponent_kind: Option<PieceKind>,
    ) -> Option<PieceKind> {
        let s = self.sessions.get_mut(&session)?;

        let jitter = self.config.tie_jitter > 0.0 && s.rng.gen_bool(self.config.tie_jitter);
        if !jitter {
            if let Some(p) = s.patterns.predict(set) {
                if p.confidence >= self.config.prediction_threshold {
                    if let Some(counter) = patterns::counter_for(p.choice, set, &mut s.rng) {
                        return Some(counter);
                    }
                }
            }
            if let Some(kind) = known_opponent_kind.filter(|k| k.is_combat_type()) {
                if s.rng.gen_bool(KNOWN_KIND_LEAN) {
                    if let Some(counter) = patterns::counter_for(kind, set, &mut s.rng) {
                        return Some(counter);
                    }
                }
            }
        }
        set.kinds().choose(&mut s.rng).copied()
    }

    // ── Scheduling ─────────────────────────────────────────────────────

    /// Run an action after a randomized human-ish delay on its own
    /// thread. The caller decides whether to join or detach.
    pub fn schedule_action<F>(&mut self, f: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let (lo, hi) = self.config.think_time_ms;
        let delay = if hi > lo {
            self.seed_rng.gen_range(lo..=hi)
        } else {
            lo
        };
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(delay));
            f();
        })
    }

    fn beliefs_mut(&mut self, session: SessionId) -> Option<&mut SessionBeliefState> {
        self.sessions.get_mut(&session).and_then(|s| s.beliefs.as_mut())
    }
}
