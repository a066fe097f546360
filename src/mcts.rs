//! Monte Carlo Tree Search move selection.
//!
//! Each iteration runs the four classic phases on a [`Tree`]:
//! - selection: descend fully expanded nodes by UCT
//! - expansion: add one child for an untried move
//! - simulation: play the new position out with a [`RolloutPolicy`]
//! - backpropagation: credit the result up to the root
//!
//! After the budget is spent, the most visited root child is played.

use std::time::Instant;

use fastrand::Rng;
use log::{debug, warn};

use crate::agents::Agent;
use crate::board::Board;
use crate::config::{AgentConfig, ConfigError};
use crate::playout::{RandomRollout, RolloutPolicy};
use crate::tree::Tree;
use crate::types::{Color, Move, Point};

/// An agent that picks moves by UCT tree search.
///
/// The agent owns its generator, so a seeded configuration makes every
/// decision reproducible.
pub struct MctsAgent<P: RolloutPolicy = RandomRollout> {
    config: AgentConfig,
    rng: Rng,
    policy: P,
}

impl MctsAgent {
    /// Search agent with uniformly random rollouts.
    pub fn new(config: AgentConfig) -> Result<Self, ConfigError> {
        let policy = RandomRollout::new(config.rollout_limit);
        Self::with_policy(config, policy)
    }
}

impl<P: RolloutPolicy> MctsAgent<P> {
    pub fn with_policy(config: AgentConfig, policy: P) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = config.rng();
        Ok(Self {
            config,
            rng,
            policy,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Build and grow a search tree for `board`, which is left unmodified.
    ///
    /// Runs `simulation_budget` iterations, stopping early only when the
    /// configured time limit has passed. The deadline is checked between
    /// iterations so node statistics are always consistent.
    pub fn search<B: Board>(&mut self, board: &B, legal_moves: &[Point]) -> Tree<B> {
        if board.size() != self.config.board_size {
            warn!(
                "searching a {}x{} board with an agent configured for {}x{}",
                board.size(),
                board.size(),
                self.config.board_size,
                self.config.board_size
            );
        }

        let mut tree = Tree::new(board.clone(), self.config.color, legal_moves, &mut self.rng);
        let start = Instant::now();
        let deadline = self.config.time_limit.map(|limit| start + limit);

        let mut sims = 0;
        while sims < self.config.simulation_budget {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                debug!("time limit reached after {sims} simulations");
                break;
            }
            self.run_iteration(&mut tree);
            sims += 1;
        }

        let root = tree.root();
        debug!(
            "{} simulations in {:.1?}: {} nodes, {} root children",
            sims,
            start.elapsed(),
            tree.len(),
            root.children.len()
        );
        tree.log_children(Tree::<B>::ROOT);
        tree
    }

    /// One selection, expansion, simulation and backpropagation pass.
    fn run_iteration<B: Board>(&mut self, tree: &mut Tree<B>) {
        let leaf = tree.select(self.config.exploration_constant);
        let node_id = tree.expand(leaf, &mut self.rng).unwrap_or(leaf);
        let node = tree.get(node_id);
        let outcome = self
            .policy
            .rollout(&node.board, node.to_play, node.passes, &mut self.rng);
        tree.backpropagate(node_id, outcome);
    }
}

impl<B: Board, P: RolloutPolicy> Agent<B> for MctsAgent<P> {
    fn color(&self) -> Color {
        self.config.color
    }

    /// Pass immediately when there is no legal move; otherwise search and
    /// play the most visited root child.
    fn select_move(&mut self, board: &B, legal_moves: &[Point]) -> Move {
        if legal_moves.is_empty() {
            debug!("no legal moves for {}, passing", self.config.color);
            return Move::Pass;
        }

        let tree = self.search(board, legal_moves);
        match tree.best_move() {
            Some(mv) => mv,
            None => {
                warn!("search produced no root children, picking a random legal move");
                Move::Place(legal_moves[self.rng.usize(..legal_moves.len())])
            }
        }
    }
}
