//! Monte Carlo playouts (random game simulation).
//!
//! A playout continues the game from a position with random moves until both
//! players pass in a row or a move cap is hit, then asks the board for the
//! final score.

use fastrand::Rng;
use log::trace;

use crate::board::Board;
use crate::constants::PASSES_TO_END;
use crate::types::{Color, Move, Outcome};

/// Estimates the result of a position by playing it out.
pub trait RolloutPolicy {
    /// Play out a copy of `board` with `to_play` to move, `passes`
    /// consecutive passes having already happened. `board` is not modified.
    fn rollout<B: Board>(
        &mut self,
        board: &B,
        to_play: Color,
        passes: u8,
        rng: &mut Rng,
    ) -> Outcome;
}

/// Uniformly random play over the legal moves plus pass.
///
/// Pass stays selectable on every turn, not only when nothing else is legal.
#[derive(Debug, Clone)]
pub struct RandomRollout {
    limit: usize,
}

impl RandomRollout {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Maximum number of moves (passes included) in one playout.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl RolloutPolicy for RandomRollout {
    fn rollout<B: Board>(
        &mut self,
        board: &B,
        to_play: Color,
        passes: u8,
        rng: &mut Rng,
    ) -> Outcome {
        let mut board = board.clone();
        let mut color = to_play;
        let mut passes = passes;
        let mut moves = 0;

        while passes < PASSES_TO_END && moves < self.limit {
            let legal = board.legal_moves(color);
            // Index legal.len() stands for pass
            let mv = legal
                .get(rng.usize(..=legal.len()))
                .map_or(Move::Pass, |&p| Move::from(p));

            match board.apply_move(color, mv) {
                Ok(()) if mv.is_pass() => passes += 1,
                Ok(()) => passes = 0,
                Err(e) => {
                    trace!("rollout move {mv} for {color} refused ({e}), passing instead");
                    board.apply_move(color, Move::Pass).ok();
                    passes += 1;
                }
            }

            moves += 1;
            color = color.opponent();
        }

        let (black, white) = board.score();
        Outcome::from_scores(black, white)
    }
}
