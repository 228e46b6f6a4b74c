// ═══════════════════════════════════════════════════════════════════════
// Static per-mode configuration — board size and army composition.
// All properties here never change during a game.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::{CombatSet, GameMode, GoalKind, PieceKind};

/// Static description of a game mode.
#[derive(Debug, Clone, Copy)]
pub struct ModeConfig {
    pub width: u8,
    pub height: u8,
    pub combat_set: CombatSet,
    pub goal: GoalKind,
    /// Pieces per side, indexed by `PieceKind::index()`.
    composition: [u8; PieceKind::COUNT],
}

impl ModeConfig {
    /// How many pieces of a kind each side starts with.
    pub fn count_of(&self, kind: PieceKind) -> u8 {
        self.composition[kind.index()]
    }

    /// Total pieces per side.
    pub fn pieces_per_side(&self) -> u8 {
        self.composition.iter().sum()
    }

    /// Kinds present in this mode with a non-zero count.
    pub fn kinds_in_play(&self) -> impl Iterator<Item = PieceKind> + '_ {
        PieceKind::ALL
            .into_iter()
            .filter(move |k| self.count_of(*k) > 0)
    }

    /// The two home rows where a side's pieces start. Red owns the low
    /// rows, Blue the high rows; the back row is index 0 of the pair.
    pub fn home_rows(&self, side: crate::types::Side) -> [u8; 2] {
        match side {
            crate::types::Side::Red => [0, 1],
            crate::types::Side::Blue => [self.height - 1, self.height - 2],
        }
    }
}

// Composition layout: [King, Pit, Rock, Paper, Scissors, Lizard, Spock]

const CLASSIC: ModeConfig = ModeConfig {
    width: 7,
    height: 6,
    combat_set: CombatSet::Classic,
    goal: GoalKind::CaptureKing,
    composition: [1, 1, 2, 2, 2, 0, 0],
};

const EXTENDED: ModeConfig = ModeConfig {
    width: 9,
    height: 8,
    combat_set: CombatSet::Extended,
    goal: GoalKind::CaptureKing,
    composition: [1, 1, 2, 2, 2, 2, 2],
};

const SKIRMISH: ModeConfig = ModeConfig {
    width: 7,
    height: 6,
    combat_set: CombatSet::Classic,
    goal: GoalKind::LastStanding,
    composition: [0, 0, 2, 2, 2, 0, 0],
};

impl GameMode {
    pub fn config(self) -> &'static ModeConfig {
        match self {
            GameMode::Classic => &CLASSIC,
            GameMode::Extended => &EXTENDED,
            GameMode::Skirmish => &SKIRMISH,
        }
    }
}
