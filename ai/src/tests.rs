// ═══════════════════════════════════════════════════════════════════════
// AI crate tests — belief tracking, phase detection, evaluation, tie
// pattern prediction, search behavior, and full harness self-play.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::{Agent, ExpectimaxAgent};
use crate::belief::SessionBeliefState;
use crate::cache::{position_key, PositionCache};
use crate::evaluate;
use crate::harness::{self, GameResult};
use crate::patterns::{self, TiePatternState};
use crate::phase::{detect_phase, GamePhase};
use crate::player::{AiConfig, AiPlayer};
use crate::random::RandomAgent;
use crate::search::{self, depth_for, SearchConfig};
use crate::setup::generate_setup;
use ambush_engine::board::GameState;
use ambush_engine::combat::{PAYOFF_KING, PAYOFF_PIT, PAYOFF_WIN};
use ambush_engine::rules;
use ambush_engine::types::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn classic_game(seed: u64) -> GameState {
    let mut r = rng(seed);
    rules::setup_board(GameMode::Classic, SessionId(1), None, None, &mut r).unwrap()
}

const EPS: f64 = 1e-9;

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
}

// ── Belief tracking ────────────────────────────────────────────────────

#[test]
fn prior_is_proportional_to_composition() {
    let state = classic_game(7);
    let beliefs = SessionBeliefState::initialize(Side::Red, &state);

    // Classic army: 1 king, 1 pit, 2 each of rock/paper/scissors.
    let any_blue = state.alive_pieces(Side::Blue).next().unwrap();
    let t = beliefs.get(any_blue.id).unwrap();
    assert_close(t.probability(PieceKind::Rock), 2.0 / 8.0);
    assert_close(t.probability(PieceKind::King), 1.0 / 8.0);
    assert_close(t.belief.iter().sum::<f64>(), 1.0);
}

#[test]
fn movement_excludes_king_and_pit() {
    let state = classic_game(11);
    let mut beliefs = SessionBeliefState::initialize(Side::Red, &state);
    let mover = state.alive_pieces(Side::Blue).next().unwrap();

    beliefs.record_movement(mover.id, Position::new(3, 3));

    let t = beliefs.get(mover.id).unwrap();
    assert!(t.probability(PieceKind::King) < EPS);
    assert!(t.probability(PieceKind::Pit) < EPS);
    assert_close(t.belief.iter().sum::<f64>(), 1.0);
    assert!(t.has_moved);
    assert_eq!(t.last_pos, Some(Position::new(3, 3)));
}

#[test]
fn reveal_collapses_and_decrements_remaining() {
    let state = classic_game(13);
    let mut beliefs = SessionBeliefState::initialize(Side::Red, &state);
    let piece = state.alive_pieces(Side::Blue).next().unwrap();

    beliefs.record_reveal(piece.id, PieceKind::Rock, Some(piece.pos));

    let t = beliefs.get(piece.id).unwrap();
    assert_eq!(t.known_kind(), Some(PieceKind::Rock));
    assert_close(t.probability(PieceKind::Rock), 1.0);
    assert_eq!(beliefs.remaining[PieceKind::Rock.index()], 1);
}

#[test]
fn death_after_reveal_is_not_double_counted() {
    let state = classic_game(17);
    let mut beliefs = SessionBeliefState::initialize(Side::Red, &state);
    let piece = state.alive_pieces(Side::Blue).next().unwrap();

    beliefs.record_reveal(piece.id, PieceKind::Paper, Some(piece.pos));
    beliefs.record_death(piece.id, PieceKind::Paper);

    assert_eq!(beliefs.remaining[PieceKind::Paper.index()], 1);
    assert!(beliefs.get(piece.id).unwrap().dead);
}

#[test]
fn exhausted_kind_loses_mass_everywhere() {
    let state = classic_game(19);
    let mut beliefs = SessionBeliefState::initialize(Side::Red, &state);
    let ids: Vec<PieceId> = state.alive_pieces(Side::Blue).map(|p| p.id).collect();

    // Both rocks accounted for: nobody else can be a rock.
    beliefs.record_death(ids[0], PieceKind::Rock);
    beliefs.record_death(ids[1], PieceKind::Rock);

    assert_eq!(beliefs.remaining[PieceKind::Rock.index()], 0);
    for &id in &ids[2..] {
        let t = beliefs.get(id).unwrap();
        assert!(t.probability(PieceKind::Rock) < EPS, "piece {:?} still admits Rock", id);
        assert_close(t.belief.iter().sum::<f64>(), 1.0);
    }
}

#[test]
fn pigeonhole_identifies_the_last_unknowns() {
    let state = classic_game(23);
    let mut beliefs = SessionBeliefState::initialize(Side::Red, &state);
    let ids: Vec<PieceId> = state.alive_pieces(Side::Blue).map(|p| p.id).collect();
    assert_eq!(ids.len(), 8);

    // Reveal everything except one piece and the king: rock/rock,
    // paper/paper, scissors/scissors, pit.
    let kinds = [
        PieceKind::Rock,
        PieceKind::Rock,
        PieceKind::Paper,
        PieceKind::Paper,
        PieceKind::Scissors,
        PieceKind::Scissors,
        PieceKind::Pit,
    ];
    for (&id, &kind) in ids.iter().zip(kinds.iter()) {
        beliefs.record_reveal(id, kind, None);
    }

    // One unknown left, one king unaccounted: deduction.
    let last = *ids.last().unwrap();
    let t = beliefs.get(last).unwrap();
    assert_eq!(t.known_kind(), Some(PieceKind::King));
    assert!(beliefs.known_king_pos.is_some());
}

// ── Evaluation ─────────────────────────────────────────────────────────

#[test]
fn combat_expectation_uses_the_payoff_table_when_known() {
    let mut state = classic_game(29);
    let defender_id = state.alive_pieces(Side::Blue).next().unwrap().id;
    let mut beliefs = SessionBeliefState::initialize(Side::Red, &state);

    beliefs.record_reveal(defender_id, PieceKind::Scissors, None);
    let defender = state.piece(defender_id);
    assert_close(
        evaluate::combat_expectation(&beliefs, PieceKind::Rock, defender),
        PAYOFF_WIN,
    );

    // The engine-visible reveal flag is honored even without tracking.
    state.piece_mut(defender_id).revealed = true;
    let fresh = SessionBeliefState::initialize(Side::Red, &state);
    let defender = state.piece(defender_id);
    let kind = defender.kind;
    let expected = ambush_engine::combat::payoff(PieceKind::Rock, kind);
    assert_close(
        evaluate::combat_expectation(&fresh, PieceKind::Rock, defender),
        expected,
    );
}

#[test]
fn combat_expectation_extremes_for_royals() {
    let state = classic_game(31);
    let ids: Vec<PieceId> = state.alive_pieces(Side::Blue).map(|p| p.id).collect();
    let mut beliefs = SessionBeliefState::initialize(Side::Red, &state);
    beliefs.record_reveal(ids[0], PieceKind::King, None);
    beliefs.record_reveal(ids[1], PieceKind::Pit, None);

    assert_close(
        evaluate::combat_expectation(&beliefs, PieceKind::Rock, state.piece(ids[0])),
        PAYOFF_KING,
    );
    assert_close(
        evaluate::combat_expectation(&beliefs, PieceKind::Rock, state.piece(ids[1])),
        PAYOFF_PIT,
    );
}

#[test]
fn information_gain_is_zero_once_identified() {
    let state = classic_game(37);
    let id = state.alive_pieces(Side::Blue).next().unwrap().id;
    let mut beliefs = SessionBeliefState::initialize(Side::Red, &state);

    let phase = GamePhase::Opening;
    let before = evaluate::information_gain(&beliefs, state.piece(id), phase.weights(), phase);
    assert!(before > 0.0);

    beliefs.record_reveal(id, PieceKind::Rock, None);
    let after = evaluate::information_gain(&beliefs, state.piece(id), phase.weights(), phase);
    assert_close(after, 0.0);
}

#[test]
fn evaluation_is_terminal_for_a_dead_king() {
    let mut state = classic_game(41);
    let beliefs = SessionBeliefState::initialize(Side::Red, &state);
    let blue_king = state.king_of(Side::Blue).unwrap().id;
    state.piece_mut(blue_king).alive = false;

    let phase = GamePhase::Endgame;
    let score = evaluate::evaluate(&state, &beliefs, phase.weights(), Side::Red);
    assert_close(score, evaluate::TERMINAL_WIN);
    let score = evaluate::evaluate(&state, &beliefs, phase.weights(), Side::Blue);
    assert_close(score, -evaluate::TERMINAL_WIN);
}

// ── Phase detection ────────────────────────────────────────────────────

#[test]
fn fresh_game_is_opening() {
    let state = classic_game(43);
    let beliefs = SessionBeliefState::initialize(Side::Red, &state);
    assert_eq!(detect_phase(&state, &beliefs, Side::Red), GamePhase::Opening);
}

#[test]
fn located_king_forces_endgame() {
    let state = classic_game(47);
    let mut beliefs = SessionBeliefState::initialize(Side::Red, &state);
    beliefs.set_known_king_position(Position::new(3, 5));
    assert_eq!(detect_phase(&state, &beliefs, Side::Red), GamePhase::Endgame);
}

#[test]
fn heavy_attrition_forces_endgame() {
    let mut state = classic_game(53);
    let beliefs = SessionBeliefState::initialize(Side::Red, &state);
    // Kill until six pieces remain.
    let ids: Vec<PieceId> = state.pieces.iter().map(|p| p.id).collect();
    for &id in ids.iter().take(ids.len() - 6) {
        let pos = state.piece(id).pos;
        let idx = state.cell_index(pos);
        state.cells[idx] = None;
        state.piece_mut(id).alive = false;
    }
    assert_eq!(detect_phase(&state, &beliefs, Side::Red), GamePhase::Endgame);
}

// ── Tie patterns ───────────────────────────────────────────────────────

#[test]
fn streak_prediction_and_counter() {
    let mut patterns = TiePatternState::new();
    patterns.start_duel();
    for _ in 0..3 {
        patterns.record_choice(PieceKind::Rock);
    }
    let p = patterns.predict(CombatSet::Classic).unwrap();
    assert_eq!(p.choice, PieceKind::Rock);
    assert!(p.confidence >= 0.8);

    let counter = patterns::counter_for(p.choice, CombatSet::Classic, &mut rng(1)).unwrap();
    assert_eq!(counter, PieceKind::Paper);
}

#[test]
fn long_streak_reaches_top_confidence() {
    let mut patterns = TiePatternState::new();
    patterns.start_duel();
    for _ in 0..4 {
        patterns.record_choice(PieceKind::Scissors);
    }
    let p = patterns.predict(CombatSet::Classic).unwrap();
    assert_close(p.confidence, 0.95);
}

#[test]
fn rotation_prediction_wraps_the_cycle() {
    let mut patterns = TiePatternState::new();
    patterns.start_duel();
    patterns.record_choice(PieceKind::Rock);
    patterns.record_choice(PieceKind::Paper);
    patterns.record_choice(PieceKind::Scissors);

    let p = patterns.predict(CombatSet::Classic).unwrap();
    assert_eq!(p.choice, PieceKind::Rock);
    assert_close(p.confidence, 0.75);
}

#[test]
fn reverse_rotation_is_detected_too() {
    let mut patterns = TiePatternState::new();
    patterns.start_duel();
    patterns.record_choice(PieceKind::Scissors);
    patterns.record_choice(PieceKind::Paper);
    patterns.record_choice(PieceKind::Rock);

    let p = patterns.predict(CombatSet::Classic).unwrap();
    assert_eq!(p.choice, PieceKind::Scissors);
    assert_close(p.confidence, 0.75);
}

#[test]
fn cross_duel_first_choice_frequency() {
    let mut patterns = TiePatternState::new();
    for _ in 0..3 {
        patterns.start_duel();
        patterns.record_choice(PieceKind::Paper);
        patterns.record_choice(PieceKind::Rock);
        patterns.duel_ended();
    }

    // New duel, nothing played yet: lean on opening habits.
    patterns.start_duel();
    let p = patterns.predict(CombatSet::Classic).unwrap();
    assert_eq!(p.choice, PieceKind::Paper);
    assert_close(p.confidence, 1.0);
}

#[test]
fn no_prediction_without_history() {
    let patterns = TiePatternState::new();
    assert!(patterns.predict(CombatSet::Classic).is_none());
    assert!(patterns.predict(CombatSet::Extended).is_none());
}

// ── Position cache ─────────────────────────────────────────────────────

#[test]
fn position_key_is_stable_and_perspective_sensitive() {
    let state = classic_game(59);
    let a = position_key(&state, Side::Red);
    let b = position_key(&state, Side::Red);
    assert_eq!(a, b);
    assert_ne!(a, position_key(&state, Side::Blue));

    let other = classic_game(61);
    assert_ne!(a, position_key(&other, Side::Red));
}

#[test]
fn hidden_piece_identity_distinguishes_transposed_positions() {
    // Two hidden enemy pieces swap cells: the cells look the same from
    // outside, but the beliefs behind the pieces differ, so the keys
    // must differ too.
    let build = |first: Position, second: Position| {
        let mut state = GameState::new_empty(GameMode::Classic, SessionId(9));
        state.place_piece(Side::Red, PieceKind::King, Position::new(0, 0));
        state.place_piece(Side::Blue, PieceKind::Rock, first);
        state.place_piece(Side::Blue, PieceKind::Scissors, second);
        state
    };
    let a = build(Position::new(3, 3), Position::new(4, 4));
    let b = build(Position::new(4, 4), Position::new(3, 3));
    assert_ne!(position_key(&a, Side::Red), position_key(&b, Side::Red));
}

#[test]
fn equal_visible_kinds_transpose_to_the_same_key() {
    let build = |first: Position, second: Position| {
        let mut state = GameState::new_empty(GameMode::Classic, SessionId(9));
        state.place_piece(Side::Red, PieceKind::Rock, first);
        state.place_piece(Side::Red, PieceKind::Rock, second);
        state.place_piece(Side::Blue, PieceKind::King, Position::new(6, 5));
        state
    };
    let a = build(Position::new(2, 2), Position::new(3, 3));
    let b = build(Position::new(3, 3), Position::new(2, 2));
    assert_eq!(position_key(&a, Side::Red), position_key(&b, Side::Red));
}

#[test]
fn cache_round_trip_and_clear() {
    let state = classic_game(67);
    let mut cache = PositionCache::new();
    let key = position_key(&state, Side::Red);

    assert_eq!(cache.get(key), None);
    cache.put(key, 12.5);
    assert_eq!(cache.get(key), Some(12.5));
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.get(key), None);
    assert!(cache.stats().gets >= 3);
}

// ── Setup generation ───────────────────────────────────────────────────

#[test]
fn generated_setup_is_legal_for_both_sides() {
    for seed in 0..20 {
        let mut r = rng(seed);
        for side in Side::ALL {
            let placement = generate_setup(GameMode::Classic, side, &mut r).unwrap();
            let cfg = GameMode::Classic.config();
            let home = cfg.home_rows(side);
            assert_eq!(placement.king.row, home[0]);
            assert_eq!(placement.king.distance(placement.pit), 1);
            assert!(home.contains(&placement.pit.row));
        }
    }
}

#[test]
fn skirmish_has_no_setup() {
    assert!(generate_setup(GameMode::Skirmish, Side::Red, &mut rng(3)).is_none());
}

// ── Search ─────────────────────────────────────────────────────────────

#[test]
fn depth_scales_with_material() {
    assert_eq!(depth_for(16), 2);
    assert_eq!(depth_for(11), 2);
    assert_eq!(depth_for(10), 3);
    assert_eq!(depth_for(7), 3);
    assert_eq!(depth_for(6), 4);
    assert_eq!(depth_for(2), 4);
}

#[test]
fn no_legal_moves_yields_none() {
    let mut state = GameState::new_empty(GameMode::Classic, SessionId(2));
    state.place_piece(Side::Red, PieceKind::King, Position::new(0, 0));
    state.place_piece(Side::Red, PieceKind::Pit, Position::new(1, 0));
    state.place_piece(Side::Blue, PieceKind::King, Position::new(6, 5));

    let beliefs = SessionBeliefState::initialize(Side::Red, &state);
    let mut cache = PositionCache::new();
    let config = SearchConfig { suboptimal_prob: 0.0, ..SearchConfig::default() };
    let mv = search::select_move(&mut state, &beliefs, &config, &mut cache, &mut rng(5));
    assert_eq!(mv, None);
}

#[test]
fn never_attacks_a_confirmed_dominator() {
    let mut state = GameState::new_empty(GameMode::Classic, SessionId(3));
    state.place_piece(Side::Red, PieceKind::King, Position::new(0, 0));
    let rock = state.place_piece(Side::Red, PieceKind::Rock, Position::new(3, 2));
    let paper = state.place_piece(Side::Blue, PieceKind::Paper, Position::new(3, 3));
    state.place_piece(Side::Blue, PieceKind::King, Position::new(6, 5));
    state.piece_mut(paper).revealed = true;

    let beliefs = SessionBeliefState::initialize(Side::Red, &state);
    assert_eq!(
        beliefs.get(paper).unwrap().known_kind(),
        Some(PieceKind::Paper)
    );

    let mut cache = PositionCache::new();
    let config = SearchConfig { suboptimal_prob: 0.0, ..SearchConfig::default() };
    for seed in 0..30 {
        let mv = search::select_move(&mut state, &beliefs, &config, &mut cache, &mut rng(seed))
            .unwrap();
        assert!(
            !(mv.from == state.piece(rock).pos && mv.to == state.piece(paper).pos),
            "attacked a known paper with a rock"
        );
    }
}

#[test]
fn emergency_capture_defends_the_king() {
    let mut state = GameState::new_empty(GameMode::Classic, SessionId(4));
    state.place_piece(Side::Red, PieceKind::King, Position::new(0, 0));
    state.place_piece(Side::Red, PieceKind::Rock, Position::new(1, 1));
    // Unidentified enemy right next to the king.
    state.place_piece(Side::Blue, PieceKind::Scissors, Position::new(0, 1));
    state.place_piece(Side::Blue, PieceKind::King, Position::new(6, 5));

    let beliefs = SessionBeliefState::initialize(Side::Red, &state);
    let mut cache = PositionCache::new();
    let config = SearchConfig { suboptimal_prob: 0.0, ..SearchConfig::default() };
    let mv = search::select_move(&mut state, &beliefs, &config, &mut cache, &mut rng(9)).unwrap();
    assert_eq!(mv.from, Position::new(1, 1));
    assert_eq!(mv.to, Position::new(0, 1));
}

#[test]
fn cornered_piece_still_moves_when_every_attack_is_losing() {
    // The only legal moves attack confirmed papers with a rock. A side
    // with legal moves must still produce one: least-bad beats None.
    let mut state = GameState::new_empty(GameMode::Classic, SessionId(5));
    state.place_piece(Side::Red, PieceKind::King, Position::new(6, 0));
    state.place_piece(Side::Red, PieceKind::Pit, Position::new(5, 0));
    state.place_piece(Side::Red, PieceKind::Rock, Position::new(0, 0));
    let p1 = state.place_piece(Side::Blue, PieceKind::Paper, Position::new(1, 0));
    let p2 = state.place_piece(Side::Blue, PieceKind::Paper, Position::new(0, 1));
    state.place_piece(Side::Blue, PieceKind::King, Position::new(6, 5));
    state.piece_mut(p1).revealed = true;
    state.piece_mut(p2).revealed = true;

    let beliefs = SessionBeliefState::initialize(Side::Red, &state);
    let mut cache = PositionCache::new();
    let config = SearchConfig { suboptimal_prob: 0.0, ..SearchConfig::default() };
    let mv = search::select_move(&mut state, &beliefs, &config, &mut cache, &mut rng(31))
        .expect("a side with legal moves must move");
    assert_eq!(mv.from, Position::new(0, 0));
    assert!(mv.to == Position::new(1, 0) || mv.to == Position::new(0, 1));
}

// ── Session store ──────────────────────────────────────────────────────

#[test]
fn untracked_session_falls_back_to_random_legal_moves() {
    let mut state = classic_game(71);
    let mut player = AiPlayer::with_seed(AiConfig::default(), 99);
    player.init_session(SessionId(1), GameMode::Classic, Side::Red);

    // No initialize_tracking call: still must produce legal moves.
    let mv = player.select_move(SessionId(1), &mut state).unwrap();
    assert!(state.legal_moves(Side::Red).contains(&mv));
}

#[test]
fn sessions_are_independent() {
    let state_a = classic_game(73);
    let state_b = classic_game(79);
    let mut player = AiPlayer::with_seed(AiConfig::default(), 5);
    player.init_session(SessionId(1), GameMode::Classic, Side::Red);
    player.init_session(SessionId(2), GameMode::Classic, Side::Blue);
    player.initialize_tracking(SessionId(1), &state_a);
    player.initialize_tracking(SessionId(2), &state_b);

    let id = state_a.alive_pieces(Side::Blue).next().unwrap().id;
    player.record_combat_outcome(SessionId(1), id, PieceKind::Rock, Position::new(0, 0), true);

    assert_eq!(
        player.beliefs(SessionId(1)).unwrap().remaining[PieceKind::Rock.index()],
        1
    );
    assert_eq!(
        player.beliefs(SessionId(2)).unwrap().remaining[PieceKind::Rock.index()],
        2
    );

    player.clear_session(SessionId(1));
    assert_eq!(player.session_count(), 1);
    assert!(player.beliefs(SessionId(1)).is_none());
}

#[test]
fn tie_choice_acts_on_the_pattern_over_the_colliding_kind() {
    // With jitter off, a 0.95-confidence Scissors streak must drive the
    // response to Rock every time, even though Rock is what collided.
    let config = AiConfig { tie_jitter: 0.0, ..AiConfig::default() };
    let mut player = AiPlayer::with_seed(config, 8);
    player.init_session(SessionId(1), GameMode::Classic, Side::Red);
    player.start_tie_duel(SessionId(1));
    for _ in 0..4 {
        player.record_opponent_tie_choice(SessionId(1), PieceKind::Scissors);
    }
    for _ in 0..20 {
        let choice = player
            .select_tie_choice(SessionId(1), CombatSet::Classic, Some(PieceKind::Rock))
            .unwrap();
        assert_eq!(choice, PieceKind::Rock);
    }
}

#[test]
fn tie_choice_is_not_a_fixed_function_of_the_colliding_kind() {
    // No pattern history: knowing what collided must not pin the
    // response to one type, or the duel becomes trivially exploitable.
    let mut player = AiPlayer::with_seed(AiConfig::default(), 8);
    player.init_session(SessionId(1), GameMode::Classic, Side::Red);
    player.start_tie_duel(SessionId(1));
    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        let choice = player
            .select_tie_choice(SessionId(1), CombatSet::Classic, Some(PieceKind::Rock))
            .unwrap();
        seen.insert(choice);
    }
    assert!(seen.len() >= 2, "duel responses collapsed to {:?}", seen);
}

#[test]
fn scheduled_action_runs() {
    let mut player = AiPlayer::with_seed(
        AiConfig { think_time_ms: (1, 2), ..AiConfig::default() },
        13,
    );
    let (tx, rx) = std::sync::mpsc::channel();
    let handle = player.schedule_action(move || {
        tx.send(42).unwrap();
    });
    handle.join().unwrap();
    assert_eq!(rx.recv().unwrap(), 42);
}

// ── Self-play ──────────────────────────────────────────────────────────

#[test]
fn seeded_self_play_is_deterministic() {
    let run = |seed: u64| -> GameResult {
        let mut red = ExpectimaxAgent::new(Side::Red, GameMode::Classic, seed);
        let mut blue = RandomAgent::new(Side::Blue, seed + 1);
        harness::play_game(GameMode::Classic, seed, &mut red, &mut blue, 300).unwrap()
    };
    let a = run(0xA11CE);
    let b = run(0xA11CE);
    assert_eq!(a, b);
}

#[test]
fn random_self_play_completes_in_every_mode() {
    for mode in GameMode::ALL {
        for seed in 0..3 {
            let mut red = RandomAgent::new(Side::Red, seed);
            let mut blue = RandomAgent::new(Side::Blue, seed + 100);
            let result = harness::play_game(mode, seed, &mut red, &mut blue, 500).unwrap();
            assert!(result.turns <= 500);
        }
    }
}

/// Wraps a random agent and counts what the harness shows it during
/// tie duels.
struct RecordingAgent {
    inner: RandomAgent,
    in_duel: bool,
    duels: usize,
    duel_survivor_reveals: usize,
    duel_death_reveals: usize,
}

impl RecordingAgent {
    fn new(side: Side, seed: u64) -> RecordingAgent {
        RecordingAgent {
            inner: RandomAgent::new(side, seed),
            in_duel: false,
            duels: 0,
            duel_survivor_reveals: 0,
            duel_death_reveals: 0,
        }
    }
}

impl Agent for RecordingAgent {
    fn name(&self) -> &str {
        "Recording"
    }

    fn side(&self) -> Side {
        self.inner.side()
    }

    fn choose_setup(&mut self, mode: GameMode) -> Option<rules::SetupPlacement> {
        self.inner.choose_setup(mode)
    }

    fn choose_move(&mut self, state: &mut GameState) -> Option<Move> {
        self.inner.choose_move(state)
    }

    fn choose_tie(&mut self, set: CombatSet, known: Option<PieceKind>) -> PieceKind {
        self.inner.choose_tie(set, known)
    }

    fn observe_reveal(&mut self, _piece: PieceId, _kind: PieceKind, _pos: Position, survived: bool) {
        if self.in_duel {
            if survived {
                self.duel_survivor_reveals += 1;
            } else {
                self.duel_death_reveals += 1;
            }
        }
    }

    fn observe_tie_duel_start(&mut self) {
        self.in_duel = true;
        self.duels += 1;
    }

    fn observe_tie_duel_end(&mut self) {
        self.in_duel = false;
    }
}

#[test]
fn decisive_tie_duels_reveal_the_survivor_to_the_loser() {
    // Each decisive duel kills one duelist and reveals one survivor:
    // the winning side must learn of the death, the losing side of the
    // survivor. Counted across both seats the two tallies each match
    // the duel count exactly.
    let mut duels = 0;
    let mut survivor_reveals = 0;
    let mut death_reveals = 0;
    for seed in 0..40 {
        let mut red = RecordingAgent::new(Side::Red, seed);
        let mut blue = RecordingAgent::new(Side::Blue, seed + 1000);
        harness::play_game(GameMode::Skirmish, seed, &mut red, &mut blue, 400).unwrap();
        duels += red.duels;
        survivor_reveals += red.duel_survivor_reveals + blue.duel_survivor_reveals;
        death_reveals += red.duel_death_reveals + blue.duel_death_reveals;
    }
    assert!(duels > 0, "no duel ever happened across the series");
    assert_eq!(survivor_reveals, duels);
    assert_eq!(death_reveals, duels);
}

#[test]
fn expectimax_beats_random_over_a_seeded_series() {
    let games = 9;
    let mut ai_wins = 0;
    for g in 0..games {
        let seed = 1000 + g * 77;
        let config = AiConfig { suboptimal_prob: 0.0, ..AiConfig::default() };
        let mut red = ExpectimaxAgent::with_config(Side::Red, GameMode::Classic, seed, config);
        let mut blue = RandomAgent::new(Side::Blue, seed + 1);
        let result = harness::play_game(GameMode::Classic, seed, &mut red, &mut blue, 600).unwrap();
        if result.winner == Some(Side::Red) {
            ai_wins += 1;
        }
    }
    assert!(
        ai_wins * 2 > games,
        "search won only {ai_wins} of {games} against the random baseline"
    );
}

#[test]
fn expectimax_agents_finish_against_each_other() {
    let mut red = ExpectimaxAgent::new(Side::Red, GameMode::Classic, 21);
    let mut blue = ExpectimaxAgent::new(Side::Blue, GameMode::Classic, 22);
    let result = harness::play_game(GameMode::Classic, 23, &mut red, &mut blue, 300).unwrap();
    assert!(result.turns > 0);
    assert_eq!(red.name(), "Expectimax");
}

#[test]
fn mismatched_seats_are_rejected() {
    let mut red = RandomAgent::new(Side::Blue, 1);
    let mut blue = RandomAgent::new(Side::Blue, 2);
    assert!(harness::play_game(GameMode::Classic, 3, &mut red, &mut blue, 10).is_err());
}
