// ═══════════════════════════════════════════════════════════════════════
// Self-play harness — drives two agents through a full game.
//
// The harness owns the authoritative GameState and is the only code
// that sees both sides' hidden pieces. Agents receive exactly the
// observations the rules let them have: quiet enemy moves as piece +
// destination, combat as reveals, tie duels as choice exchanges.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::Agent;
use ambush_engine::board::GameState;
use ambush_engine::rules::{self, MoveOutcome, TieRound};
use ambush_engine::types::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Tie duels that replay this many times are broken by coin flip to
/// keep degenerate mirror-strategies from hanging a game.
const MAX_TIE_REPLAYS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    /// None means the turn cap was reached: a draw.
    pub winner: Option<Side>,
    pub turns: usize,
}

/// Play a full game between two agents. `seed` drives setup shuffling
/// and the duel-loop tiebreaker, so identical inputs replay identically.
pub fn play_game(
    mode: GameMode,
    seed: u64,
    red: &mut dyn Agent,
    blue: &mut dyn Agent,
    max_turns: usize,
) -> Result<GameResult, String> {
    if red.side() != Side::Red || blue.side() != Side::Blue {
        return Err("Agents must be constructed for their seats".to_string());
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let red_setup = red.choose_setup(mode);
    let blue_setup = blue.choose_setup(mode);
    let mut state = rules::setup_board(mode, SessionId(seed as u32), red_setup, blue_setup, &mut rng)?;

    red.begin_play(&state);
    blue.begin_play(&state);

    let mut turns = 0;
    loop {
        if let Some(winner) = rules::winner_of(&state) {
            return Ok(GameResult { winner: Some(winner), turns });
        }
        if turns >= max_turns {
            return Ok(GameResult { winner: None, turns });
        }
        turns += 1;

        let side = state.to_move;
        let mv = {
            let mover = agent_for(side, red, blue);
            match mover.choose_move(&mut state) {
                Some(mv) => mv,
                // winner_of treats an immobile side as lost, so a None
                // here means the agent gave up a playable position.
                None => return Ok(GameResult { winner: Some(side.opponent()), turns }),
            }
        };

        let applied = rules::apply_move(&mut state, mv)?;
        dispatch_outcome(&mut state, side, &applied, mv, red, blue, &mut rng)?;
    }
}

fn agent_for<'a>(side: Side, red: &'a mut dyn Agent, blue: &'a mut dyn Agent) -> &'a mut dyn Agent {
    match side {
        Side::Red => red,
        Side::Blue => blue,
    }
}

fn dispatch_outcome(
    state: &mut GameState,
    mover_side: Side,
    applied: &rules::Applied,
    mv: Move,
    red: &mut dyn Agent,
    blue: &mut dyn Agent,
    rng: &mut ChaCha8Rng,
) -> Result<(), String> {
    let attacker = applied.attacker;
    match applied.outcome {
        MoveOutcome::Moved => {
            agent_for(mover_side.opponent(), red, blue).observe_opponent_move(attacker, mv.to);
        }
        MoveOutcome::AttackerWins { defender } => {
            let att_kind = state.piece(attacker).kind;
            let def_kind = state.piece(defender).kind;
            agent_for(mover_side, red, blue).observe_reveal(defender, def_kind, mv.to, false);
            agent_for(mover_side.opponent(), red, blue).observe_reveal(attacker, att_kind, mv.to, true);
        }
        MoveOutcome::AttackerDies { defender } => {
            let att_kind = state.piece(attacker).kind;
            let def_kind = state.piece(defender).kind;
            agent_for(mover_side, red, blue).observe_reveal(defender, def_kind, mv.to, true);
            agent_for(mover_side.opponent(), red, blue).observe_reveal(attacker, att_kind, mv.from, false);
        }
        MoveOutcome::TiePending { defender } => {
            run_tie_duel(state, mover_side, attacker, defender, mv, red, blue, rng)?;
        }
    }
    Ok(())
}

/// Collect both sides' secret choices until the duel breaks. Combat
/// already revealed both pieces, so each agent knows exactly what it is
/// facing when choosing.
#[allow(clippy::too_many_arguments)]
fn run_tie_duel(
    state: &mut GameState,
    mover_side: Side,
    attacker: PieceId,
    defender: PieceId,
    mv: Move,
    red: &mut dyn Agent,
    blue: &mut dyn Agent,
    rng: &mut ChaCha8Rng,
) -> Result<(), String> {
    let set = state.config().combat_set;
    let att_kind = state.piece(attacker).kind;
    let def_kind = state.piece(defender).kind;

    red.observe_tie_duel_start();
    blue.observe_tie_duel_start();

    for round in 0usize.. {
        let att_choice = agent_for(mover_side, red, blue).choose_tie(set, Some(def_kind));
        let def_choice = agent_for(mover_side.opponent(), red, blue).choose_tie(set, Some(att_kind));

        agent_for(mover_side, red, blue).observe_opponent_tie_choice(def_choice);
        agent_for(mover_side.opponent(), red, blue).observe_opponent_tie_choice(att_choice);

        let result = if att_choice != def_choice || round < MAX_TIE_REPLAYS {
            rules::resolve_tie(state, attacker, defender, att_choice, def_choice)?
        } else if rng.gen_bool(0.5) {
            // Forced break: flip for a winner.
            rules::resolve_tie(state, attacker, defender, att_choice, forced_loser(set, att_choice))?
        } else {
            rules::resolve_tie(state, attacker, defender, forced_loser(set, def_choice), def_choice)?
        };
        // A decisive round reveals both duelists: the loser's death to
        // the winning side, the survivor to the losing side. Without
        // the second the loser's tracker keeps counting the survivor's
        // kind as undiscovered.
        match result {
            TieRound::Replay => continue,
            TieRound::AttackerWon => {
                agent_for(mover_side, red, blue).observe_reveal(defender, def_kind, mv.to, false);
                agent_for(mover_side.opponent(), red, blue).observe_reveal(attacker, att_kind, mv.to, true);
                break;
            }
            TieRound::DefenderWon => {
                agent_for(mover_side.opponent(), red, blue).observe_reveal(attacker, att_kind, mv.from, false);
                agent_for(mover_side, red, blue).observe_reveal(defender, def_kind, mv.to, true);
                break;
            }
        }
    }

    red.observe_tie_duel_end();
    blue.observe_tie_duel_end();
    Ok(())
}

/// A choice the given one strictly beats, used only to force a duel to
/// end after too many replays.
fn forced_loser(set: CombatSet, winner_choice: PieceKind) -> PieceKind {
    *set.kinds()
        .iter()
        .find(|&&k| ambush_engine::combat::beats(winner_choice, k))
        .expect("every combat type beats at least one other")
}
