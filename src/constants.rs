//! Default engine parameters.
//!
//! These are the values an [`AgentConfig`](crate::config::AgentConfig) starts
//! from. Everything here can be overridden at runtime.

// =============================================================================
// Board
// =============================================================================

/// Default board size (NxN).
pub const DEFAULT_BOARD_SIZE: usize = 9;

/// Default komi added to White's area score.
pub const DEFAULT_KOMI: f64 = 0.0;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default number of simulations per move.
pub const DEFAULT_SIMULATIONS: usize = 200;

/// UCT exploration constant (roughly sqrt(2)).
pub const DEFAULT_EXPLORATION: f64 = 1.4;

/// Maximum number of moves in a single rollout before it is scored as-is.
pub const DEFAULT_ROLLOUT_LIMIT: usize = 200;

/// Consecutive passes that end a game.
pub const PASSES_TO_END: u8 = 2;

// =============================================================================
// Heuristic Agent Weights
// =============================================================================

/// Bonus per opponent stone adjacent to the candidate point.
pub const HEURISTIC_ADJACENT_OPPONENT: f64 = 2.0;

/// Bonus per liberty of the group formed by the candidate stone.
pub const HEURISTIC_LIBERTY: f64 = 0.5;

/// Penalty when the candidate stone's group would have no liberties.
pub const HEURISTIC_NO_LIBERTIES: f64 = 5.0;
