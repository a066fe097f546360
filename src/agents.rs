//! Move-choosing agents of increasing strength.
//!
//! Every agent answers the same question: given a board and the legal moves
//! for its color, which move (or pass) should be played?

use std::fmt;
use std::str::FromStr;

use fastrand::Rng;
use thiserror::Error;

use crate::board::{Board, Goban};
use crate::config::{AgentConfig, ConfigError};
use crate::constants::{HEURISTIC_ADJACENT_OPPONENT, HEURISTIC_LIBERTY, HEURISTIC_NO_LIBERTIES};
use crate::mcts::MctsAgent;
use crate::types::{Color, Move, Point};

/// A player that picks moves for one color.
pub trait Agent<B: Board> {
    fn color(&self) -> Color;

    /// Choose a move from `legal_moves`, or pass. `board` is not modified.
    fn select_move(&mut self, board: &B, legal_moves: &[Point]) -> Move;
}

/// Plays a uniformly random legal move.
pub struct RandomAgent {
    color: Color,
    rng: Rng,
}

impl RandomAgent {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            color: config.color,
            rng: config.rng(),
        }
    }
}

impl<B: Board> Agent<B> for RandomAgent {
    fn color(&self) -> Color {
        self.color
    }

    fn select_move(&mut self, _board: &B, legal_moves: &[Point]) -> Move {
        if legal_moves.is_empty() {
            return Move::Pass;
        }
        Move::Place(legal_moves[self.rng.usize(..legal_moves.len())])
    }
}

/// Greedy one-ply agent scoring each move with local shape heuristics.
pub struct HeuristicAgent {
    color: Color,
}

impl HeuristicAgent {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    /// Score of playing at `p`: adjacent opponent stones are worth attacking,
    /// liberties make the new group safer, and a group without liberties is
    /// heavily penalized.
    pub fn evaluate(&self, board: &Goban, p: Point) -> f64 {
        let opp = self.color.opponent();
        let adjacent = board.neighbors(p).filter(|&n| board.get(n) == Some(opp)).count();
        let liberties = board.liberties_after(self.color, p).unwrap_or(0);

        let mut score = adjacent as f64 * HEURISTIC_ADJACENT_OPPONENT;
        score += liberties as f64 * HEURISTIC_LIBERTY;
        if liberties == 0 {
            score -= HEURISTIC_NO_LIBERTIES;
        }
        score
    }
}

impl Agent<Goban> for HeuristicAgent {
    fn color(&self) -> Color {
        self.color
    }

    /// Highest-scoring move; the first one listed wins ties.
    fn select_move(&mut self, board: &Goban, legal_moves: &[Point]) -> Move {
        let mut best: Option<(Point, f64)> = None;
        for &p in legal_moves {
            let score = self.evaluate(board, p);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((p, score));
            }
        }
        best.map_or(Move::Pass, |(p, _)| Move::Place(p))
    }
}

/// Difficulty levels offered to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentLevel {
    /// Random legal moves
    Beginner,
    /// Greedy heuristic
    Intermediate,
    /// Tree search
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown AI level: {0} (expected beginner, intermediate or hard)")]
pub struct ParseLevelError(pub String);

impl FromStr for AgentLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "random" => Ok(AgentLevel::Beginner),
            "intermediate" | "heuristic" => Ok(AgentLevel::Intermediate),
            "hard" | "mcts" => Ok(AgentLevel::Hard),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl fmt::Display for AgentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentLevel::Beginner => "beginner",
            AgentLevel::Intermediate => "intermediate",
            AgentLevel::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// Build the agent for `level`, validating `config` first.
pub fn build_agent(
    level: AgentLevel,
    config: AgentConfig,
) -> Result<Box<dyn Agent<Goban>>, ConfigError> {
    config.validate()?;
    Ok(match level {
        AgentLevel::Beginner => Box::new(RandomAgent::new(&config)),
        AgentLevel::Intermediate => Box::new(HeuristicAgent::new(config.color)),
        AgentLevel::Hard => Box::new(MctsAgent::new(config)?),
    })
}
