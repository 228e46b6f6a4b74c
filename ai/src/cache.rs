// ═══════════════════════════════════════════════════════════════════════
// Position cache — memoizes leaf evaluations within one decision.
//
// Keys are SplitMix64-mixed tokens over every occupied cell (position,
// owner, revealed kind or hidden) plus the side being evaluated for.
// Beliefs are not part of the key, so entries are only valid while the
// belief state is frozen: the search clears the cache once per
// top-level decision.
// ═══════════════════════════════════════════════════════════════════════

use ambush_engine::board::GameState;
use ambush_engine::types::Side;
use std::collections::HashMap;

/// SplitMix64 step for stable, fast token generation.
#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// Domain tags (arbitrary but fixed)
const DOM_CELL: u64 = 0xA4B0_57E1_0000_0001;
const DOM_SIDE: u64 = 0xA4B0_57E1_0000_00C0;
const HIDDEN_KIND: u64 = 0xFF;

/// Hash a board position from one side's point of view. A hidden piece
/// hashes by its identity, never its true kind: the evaluating side
/// cannot see the kind, but the belief distribution behind each hidden
/// piece is its own, so two different hidden pieces on the same cell
/// must not share a key. Visible pieces of equal kind still transpose
/// onto the same key.
pub fn position_key(state: &GameState, perspective: Side) -> u64 {
    let mut key = splitmix64(DOM_SIDE ^ matches!(perspective, Side::Blue) as u64);
    for piece in state.pieces.iter().filter(|p| p.alive) {
        let visible = piece.owner == perspective || piece.revealed;
        let kind_bits = if visible {
            piece.kind.index() as u64
        } else {
            HIDDEN_KIND | ((piece.id.0 as u64) << 8)
        };
        let seed = DOM_CELL
            ^ state.cell_index(piece.pos) as u64
            ^ ((matches!(piece.owner, Side::Blue) as u64) << 8)
            ^ (kind_bits << 16);
        key ^= splitmix64(seed);
    }
    key
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub gets: u64,
    pub hits: u64,
    pub puts: u64,
}

/// In-memory evaluation store. Small enough per decision that no
/// replacement policy is needed.
#[derive(Debug, Default)]
pub struct PositionCache {
    map: HashMap<u64, f64>,
    stats: CacheStats,
}

impl PositionCache {
    pub fn new() -> PositionCache {
        PositionCache::default()
    }

    pub fn get(&mut self, key: u64) -> Option<f64> {
        self.stats.gets += 1;
        let hit = self.map.get(&key).copied();
        if hit.is_some() {
            self.stats.hits += 1;
        }
        hit
    }

    pub fn put(&mut self, key: u64, value: f64) {
        self.stats.puts += 1;
        self.map.insert(key, value);
    }

    /// Invalidate everything. Called at the start of each decision,
    /// since piece identities and beliefs shift between turns.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
