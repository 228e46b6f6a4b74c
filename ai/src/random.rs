// ═══════════════════════════════════════════════════════════════════════
// Random Agent — makes all decisions randomly.
// Serves as baseline and for testing harness stability.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::Agent;
use crate::search;
use ambush_engine::board::GameState;
use ambush_engine::rules::SetupPlacement;
use ambush_engine::types::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct RandomAgent {
    side: Side,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(side: Side, seed: u64) -> RandomAgent {
        RandomAgent {
            side,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "Random"
    }

    fn side(&self) -> Side {
        self.side
    }

    fn choose_setup(&mut self, _mode: GameMode) -> Option<SetupPlacement> {
        // Let the engine place king and pit.
        None
    }

    fn choose_move(&mut self, state: &mut GameState) -> Option<Move> {
        search::random_move(state, self.side, &mut self.rng)
    }

    fn choose_tie(&mut self, set: CombatSet, _known: Option<PieceKind>) -> PieceKind {
        *set.kinds()
            .choose(&mut self.rng)
            .expect("combat set is never empty")
    }
}
