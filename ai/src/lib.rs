pub mod belief;
pub mod phase;
pub mod evaluate;
pub mod search;
pub mod patterns;
pub mod cache;
pub mod setup;
pub mod player;
pub mod agent;
pub mod random;
pub mod harness;

#[cfg(test)]
mod tests;

pub use agent::{Agent, ExpectimaxAgent};
pub use belief::SessionBeliefState;
pub use patterns::TiePatternState;
pub use phase::{GamePhase, EvaluationWeights};
pub use player::{AiConfig, AiPlayer};
pub use random::RandomAgent;
