pub mod types;
pub mod combat;
pub mod config;
pub mod board;
pub mod rules;


pub use types::*;
pub use combat::{beats, payoff, CombatOutcome};
pub use config::ModeConfig;
