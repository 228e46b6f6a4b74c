// ═══════════════════════════════════════════════════════════════════════
// Setup generation — king and pit placement before play begins.
// Deterministic-ish: inner columns are favored but jittered, so the
// same AI does not telegraph its king square across rematches.
// ═══════════════════════════════════════════════════════════════════════

use ambush_engine::rules::SetupPlacement;
use ambush_engine::types::*;
use rand::Rng;

/// Pick a defensible back-row king and an adjacent pit. Returns None
/// for modes without royal pieces.
pub fn generate_setup(mode: GameMode, side: Side, rng: &mut impl Rng) -> Option<SetupPlacement> {
    let cfg = mode.config();
    if cfg.goal != GoalKind::CaptureKing {
        return None;
    }
    let home = cfg.home_rows(side);
    let back_row = home[0];
    let center = (cfg.width - 1) as f64 / 2.0;

    // Weighted column draw: centered columns carry more weight, plus a
    // jitter term so the choice is not a fixed function of the seed's
    // first draw alone.
    let mut best_col = 0u8;
    let mut best_weight = f64::NEG_INFINITY;
    for col in 0..cfg.width {
        let centrality = center - (col as f64 - center).abs();
        let weight = centrality + rng.gen_range(0.0..1.5);
        if weight > best_weight {
            best_weight = weight;
            best_col = col;
        }
    }
    let king = Position::new(best_col, back_row);

    // Pit shields the king: prefer the square directly in front,
    // occasionally a flanking square instead.
    let front = (0i8, side.forward());
    let mut options: Vec<(Position, f64)> = Vec::new();
    for d in ORTHOGONAL_OFFSETS {
        if let Some(pos) = king.offset(d, cfg.width, cfg.height) {
            if home.contains(&pos.row) {
                let w = if d == front { 3.0 } else { 1.0 };
                options.push((pos, w));
            }
        }
    }
    let total: f64 = options.iter().map(|(_, w)| w).sum();
    let mut draw = rng.gen_range(0.0..total);
    let mut pit = options[0].0;
    for (pos, w) in options {
        if draw < w {
            pit = pos;
            break;
        }
        draw -= w;
    }

    Some(SetupPlacement { king, pit })
}
