//! Gosifu: a Monte Carlo Tree Search move picker for Go.
//!
//! Given a board and the legal moves for one color, the engine runs repeated
//! random playouts through a UCT search tree and plays the move whose
//! continuations won most often.
//!
//! ## Modules
//!
//! - [`types`] - Colors, moves and game outcomes
//! - [`board`] - The board contract the search relies on, plus a Go board
//! - [`tree`] - Arena-backed search tree with UCT selection
//! - [`playout`] - Random game simulation for position evaluation
//! - [`mcts`] - The search controller
//! - [`agents`] - Random, heuristic and search agents
//! - [`config`] - Agent configuration
//! - [`constants`] - Default parameters
//!
//! ## Example
//!
//! ```
//! use gosifu::agents::Agent;
//! use gosifu::board::{Board, Goban};
//! use gosifu::config::AgentConfig;
//! use gosifu::mcts::MctsAgent;
//! use gosifu::types::{Color, Move};
//!
//! let mut board = Goban::new(5);
//! board.apply_move(Color::Black, Move::Place((2, 2))).unwrap();
//!
//! let config = AgentConfig::new(Color::White, 5)
//!     .with_simulations(100)
//!     .with_seed(7);
//! let mut agent = MctsAgent::new(config).unwrap();
//!
//! let legal = board.legal_moves(Color::White);
//! let mv = agent.select_move(&board, &legal);
//! println!("White plays {mv}");
//! ```

pub mod agents;
pub mod board;
pub mod config;
pub mod constants;
pub mod mcts;
pub mod playout;
pub mod tree;
pub mod types;
