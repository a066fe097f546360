//! Colors, moves and game outcomes shared by every module.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One of the two players. Black moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// A board intersection as zero-based `(row, col)`.
pub type Point = (usize, usize);

/// A move: a stone placement or a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Place(Point),
    Pass,
}

impl Move {
    #[inline]
    pub fn is_pass(self) -> bool {
        self == Move::Pass
    }
}

impl From<Point> for Move {
    fn from(p: Point) -> Self {
        Move::Place(p)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Place((row, col)) => write!(f, "{row},{col}"),
            Move::Pass => write!(f, "pass"),
        }
    }
}

/// Error returned when a move string is neither `pass` nor `row,col`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid move '{0}': expected 'row,col' or 'pass'")]
pub struct ParseMoveError(pub String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pass") {
            return Ok(Move::Pass);
        }

        let err = || ParseMoveError(s.to_string());
        let (row, col) = s.split_once(',').ok_or_else(err)?;
        let row = row.trim().parse::<usize>().map_err(|_| err())?;
        let col = col.trim().parse::<usize>().map_err(|_| err())?;
        Ok(Move::Place((row, col)))
    }
}

/// Result of a finished (or cut-off) game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Winner(Color),
    Draw,
}

impl Outcome {
    /// Decide the outcome from final `(black, white)` scores.
    pub fn from_scores(black: f64, white: f64) -> Outcome {
        if black > white {
            Outcome::Winner(Color::Black)
        } else if white > black {
            Outcome::Winner(Color::White)
        } else {
            Outcome::Draw
        }
    }

    /// Credit earned by `color`: 1.0 for a win, 0.5 for a draw, 0.0 for a loss.
    #[inline]
    pub fn credit_for(self, color: Color) -> f64 {
        match self {
            Outcome::Winner(c) if c == color => 1.0,
            Outcome::Winner(_) => 0.0,
            Outcome::Draw => 0.5,
        }
    }
}
