// ═══════════════════════════════════════════════════════════════════════
// Core types — sides, piece kinds, positions, moves
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

// ── Enums ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Red,
    Blue,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Red, Side::Blue];

    pub fn opponent(self) -> Side {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }

    /// Direction of "forward" for this side (+1 row for Red, -1 for Blue).
    pub fn forward(self) -> i8 {
        match self {
            Side::Red => 1,
            Side::Blue => -1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Red => write!(f, "Red"),
            Side::Blue => write!(f, "Blue"),
        }
    }
}

/// Every identity a piece can hold. King and Pit never move; the rest are
/// the combat types (Lizard/Spock only exist in the extended set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    King,
    Pit,
    Rock,
    Paper,
    Scissors,
    Lizard,
    Spock,
}

impl PieceKind {
    pub const COUNT: usize = 7;

    pub const ALL: [PieceKind; PieceKind::COUNT] = [
        PieceKind::King,
        PieceKind::Pit,
        PieceKind::Rock,
        PieceKind::Paper,
        PieceKind::Scissors,
        PieceKind::Lizard,
        PieceKind::Spock,
    ];

    /// Stable index into per-kind arrays (belief vectors, counts).
    pub fn index(self) -> usize {
        match self {
            PieceKind::King => 0,
            PieceKind::Pit => 1,
            PieceKind::Rock => 2,
            PieceKind::Paper => 3,
            PieceKind::Scissors => 4,
            PieceKind::Lizard => 5,
            PieceKind::Spock => 6,
        }
    }

    /// Only combat-typed pieces may move. King and Pit are stationary.
    pub fn is_mobile(self) -> bool {
        !matches!(self, PieceKind::King | PieceKind::Pit)
    }

    pub fn is_combat_type(self) -> bool {
        self.is_mobile()
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PieceKind::King => "King",
            PieceKind::Pit => "Pit",
            PieceKind::Rock => "Rock",
            PieceKind::Paper => "Paper",
            PieceKind::Scissors => "Scissors",
            PieceKind::Lizard => "Lizard",
            PieceKind::Spock => "Spock",
        };
        write!(f, "{}", s)
    }
}

/// Which combat-type table a game uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatSet {
    Classic,
    Extended,
}

impl CombatSet {
    /// The combat types in this set, in rotation order. A "forward
    /// rotation" (as detected by the tie pattern tracker) steps through
    /// this cycle.
    pub fn rotation_order(self) -> &'static [PieceKind] {
        match self {
            CombatSet::Classic => &[PieceKind::Rock, PieceKind::Paper, PieceKind::Scissors],
            CombatSet::Extended => &[
                PieceKind::Rock,
                PieceKind::Paper,
                PieceKind::Scissors,
                PieceKind::Lizard,
                PieceKind::Spock,
            ],
        }
    }

    pub fn kinds(self) -> &'static [PieceKind] {
        self.rotation_order()
    }

    pub fn contains(self, kind: PieceKind) -> bool {
        self.kinds().contains(&kind)
    }
}

/// What ends the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalKind {
    /// Capture the opposing king.
    CaptureKing,
    /// Last piece standing — no kings or pits on the board.
    LastStanding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    Classic,
    Extended,
    Skirmish,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Classic, GameMode::Extended, GameMode::Skirmish];
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameMode::Classic => write!(f, "Classic"),
            GameMode::Extended => write!(f, "Extended"),
            GameMode::Skirmish => write!(f, "Skirmish"),
        }
    }
}

// ── Identifiers ────────────────────────────────────────────────────────

/// Compact piece identifier, index into the game state's piece table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct PieceId(pub u8);

/// Identifier of an active game session. The AI keys all per-session
/// state (beliefs, tie patterns) by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u32);

// ── Position / movement ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub col: u8,
    pub row: u8,
}

impl Position {
    pub fn new(col: u8, row: u8) -> Position {
        Position { col, row }
    }

    /// Apply an offset, returning None if it would leave an
    /// unsigned-coordinate board of the given size.
    pub fn offset(self, d: (i8, i8), width: u8, height: u8) -> Option<Position> {
        let col = self.col as i16 + d.0 as i16;
        let row = self.row as i16 + d.1 as i16;
        if col < 0 || row < 0 || col >= width as i16 || row >= height as i16 {
            None
        } else {
            Some(Position::new(col as u8, row as u8))
        }
    }

    /// Manhattan distance.
    pub fn distance(self, other: Position) -> u8 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }
}

/// The only legal movement steps. Shared by the rules layer and the AI
/// search so that the two can never disagree about reachability.
pub const ORTHOGONAL_OFFSETS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

// ── Piece ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub owner: Side,
    pub kind: PieceKind,
    pub pos: Position,
    /// Whether the opponent has learned this piece's kind.
    pub revealed: bool,
    pub alive: bool,
}

// ── Move ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}
