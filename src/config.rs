//! Agent configuration.

use std::time::Duration;

use thiserror::Error;

use crate::constants::{
    DEFAULT_BOARD_SIZE, DEFAULT_EXPLORATION, DEFAULT_ROLLOUT_LIMIT, DEFAULT_SIMULATIONS,
};
use crate::types::Color;

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("board size must be positive")]
    ZeroBoardSize,
    #[error("rollout limit must be positive")]
    ZeroRolloutLimit,
    #[error("exploration constant must be finite and non-negative (got {0})")]
    InvalidExploration(f64),
}

/// Settings shared by every agent.
///
/// A `simulation_budget` of zero is accepted: the search then has no tree to
/// consult and falls back to a random legal move.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Color the agent plays
    pub color: Color,
    /// Expected board side length
    pub board_size: usize,
    /// Search iterations per move
    pub simulation_budget: usize,
    /// UCT exploration weight
    pub exploration_constant: f64,
    /// Maximum moves per rollout
    pub rollout_limit: usize,
    /// Seed for the agent's generator; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Optional wall-clock cap, checked between search iterations
    pub time_limit: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(Color::Black, DEFAULT_BOARD_SIZE)
    }
}

impl AgentConfig {
    pub fn new(color: Color, board_size: usize) -> Self {
        Self {
            color,
            board_size,
            simulation_budget: DEFAULT_SIMULATIONS,
            exploration_constant: DEFAULT_EXPLORATION,
            rollout_limit: DEFAULT_ROLLOUT_LIMIT,
            seed: None,
            time_limit: None,
        }
    }

    pub fn with_simulations(mut self, simulation_budget: usize) -> Self {
        self.simulation_budget = simulation_budget;
        self
    }

    pub fn with_exploration(mut self, exploration_constant: f64) -> Self {
        self.exploration_constant = exploration_constant;
        self
    }

    pub fn with_rollout_limit(mut self, rollout_limit: usize) -> Self {
        self.rollout_limit = rollout_limit;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size == 0 {
            return Err(ConfigError::ZeroBoardSize);
        }
        if self.rollout_limit == 0 {
            return Err(ConfigError::ZeroRolloutLimit);
        }
        let c = self.exploration_constant;
        if !c.is_finite() || c < 0.0 {
            return Err(ConfigError::InvalidExploration(c));
        }
        Ok(())
    }

    /// A fresh generator, reproducible when a seed is set.
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}
