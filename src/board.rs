//! The board collaborator used by the search engine.
//!
//! The engine only talks to a board through the [`Board`] trait: legal-move
//! enumeration, move application, deep copy (`Clone`) and final scoring.
//! [`Goban`] is a straightforward implementation of Go rules (captures,
//! suicide, simple ko, area scoring) used by the binary and the tests.

use std::fmt;

use thiserror::Error;

use crate::constants::DEFAULT_KOMI;
use crate::types::{Color, Move, Point};

/// Why a board refused a move. The board is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("illegal move: point is off the board")]
    OutOfBounds,
    #[error("illegal move: point not empty")]
    Occupied,
    #[error("illegal move: retakes ko")]
    Ko,
    #[error("illegal move: suicide")]
    Suicide,
}

/// Game-rules engine consumed by the search.
///
/// `Clone` must produce a fully independent copy, including any state needed
/// for ko detection. Search nodes and rollouts mutate their own copies only.
pub trait Board: Clone {
    /// Side length of the board.
    fn size(&self) -> usize;

    /// Legal stone placements for `color`, without pass and without duplicates.
    fn legal_moves(&self, color: Color) -> Vec<Point>;

    /// Play `mv` for `color` in place. A pass always succeeds.
    fn apply_move(&mut self, color: Color, mv: Move) -> Result<(), MoveError>;

    /// Final `(black, white)` score under the board's rule set.
    fn score(&self) -> (f64, f64);
}

/// A square Go board with area scoring.
#[derive(Clone, Debug, PartialEq)]
pub struct Goban {
    size: usize,
    cells: Vec<Option<Color>>,
    /// Point where an immediate recapture is forbidden, and the color it is
    /// forbidden to
    ko: Option<(Point, Color)>,
    komi: f64,
}

impl Goban {
    pub fn new(size: usize) -> Self {
        Self::with_komi(size, DEFAULT_KOMI)
    }

    pub fn with_komi(size: usize, komi: f64) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
            ko: None,
            komi,
        }
    }

    pub fn komi(&self) -> f64 {
        self.komi
    }

    /// Point the side to recapture may not play right now.
    pub fn ko(&self) -> Option<Point> {
        self.ko.map(|(p, _)| p)
    }

    #[inline]
    fn is_ko(&self, color: Color, p: Point) -> bool {
        self.ko == Some((p, color))
    }

    #[inline]
    fn idx(&self, (row, col): Point) -> usize {
        row * self.size + col
    }

    #[inline]
    fn on_board(&self, (row, col): Point) -> bool {
        row < self.size && col < self.size
    }

    /// Stone at `p`, or `None` if empty or off the board.
    pub fn get(&self, p: Point) -> Option<Color> {
        if !self.on_board(p) {
            return None;
        }
        self.cells[self.idx(p)]
    }

    /// Orthogonal neighbors of `p` that lie on the board.
    pub fn neighbors(&self, (row, col): Point) -> impl Iterator<Item = Point> + '_ {
        let s = self.size;
        let mut v = Vec::with_capacity(4);
        if row > 0 {
            v.push((row - 1, col));
        }
        if row + 1 < s {
            v.push((row + 1, col));
        }
        if col > 0 {
            v.push((row, col - 1));
        }
        if col + 1 < s {
            v.push((row, col + 1));
        }
        v.into_iter()
    }

    /// Place a stone of `color` at `p`, resolving captures and ko.
    ///
    /// Returns the number of captured opponent stones.
    pub fn play(&mut self, color: Color, p: Point) -> Result<usize, MoveError> {
        if !self.on_board(p) {
            return Err(MoveError::OutOfBounds);
        }
        if self.get(p).is_some() {
            return Err(MoveError::Occupied);
        }
        if self.is_ko(color, p) {
            return Err(MoveError::Ko);
        }

        let idx = self.idx(p);
        self.cells[idx] = Some(color);

        let opp = color.opponent();
        let mut to_remove: Vec<Point> = Vec::new();
        for n in self.neighbors(p) {
            if self.get(n) == Some(opp) && !to_remove.contains(&n) && self.group_liberties(n) == 0
            {
                self.collect_group(n, &mut to_remove);
            }
        }

        if to_remove.is_empty() && self.group_liberties(p) == 0 {
            self.cells[idx] = None; // undo suicidal move
            return Err(MoveError::Suicide);
        }

        for &r in &to_remove {
            let i = self.idx(r);
            self.cells[i] = None;
        }

        // A lone stone that captured a lone stone and sits in atari is a ko
        let mut own = Vec::new();
        self.collect_group(p, &mut own);
        self.ko = if to_remove.len() == 1 && own.len() == 1 && self.group_liberties(p) == 1 {
            Some((to_remove[0], opp))
        } else {
            None
        };

        Ok(to_remove.len())
    }

    /// Whether `color` may play at `p`, decided without mutating the board.
    pub fn is_legal(&self, color: Color, p: Point) -> bool {
        if !self.on_board(p) || self.get(p).is_some() || self.is_ko(color, p) {
            return false;
        }
        for n in self.neighbors(p) {
            match self.get(n) {
                None => return true,
                // Our group keeps a liberty besides p
                Some(c) if c == color && self.group_liberties(n) > 1 => return true,
                // Their group's last liberty is p: capture
                Some(c) if c != color && self.group_liberties(n) == 1 => return true,
                _ => {}
            }
        }
        false
    }

    /// Liberties of the group containing the stone `color` would place at `p`,
    /// after captures are resolved. `None` if the move is illegal.
    pub fn liberties_after(&self, color: Color, p: Point) -> Option<usize> {
        let mut board = self.clone();
        board.play(color, p).ok()?;
        Some(board.group_liberties(p))
    }

    fn collect_group(&self, start: Point, out: &mut Vec<Point>) -> usize {
        let Some(color) = self.get(start) else {
            return 0;
        };
        let mut stack = vec![start];
        let mut visited = vec![false; self.size * self.size];
        let mut count = 0;
        while let Some(pt) = stack.pop() {
            let i = self.idx(pt);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            if self.get(pt) == Some(color) {
                out.push(pt);
                count += 1;
                for n in self.neighbors(pt) {
                    if !visited[self.idx(n)] && self.get(n) == Some(color) {
                        stack.push(n);
                    }
                }
            }
        }
        count
    }

    /// Number of distinct empty points adjacent to the group at `start`.
    pub fn group_liberties(&self, start: Point) -> usize {
        let Some(color) = self.get(start) else {
            return 0;
        };
        let mut stack = vec![start];
        let mut visited = vec![false; self.size * self.size];
        let mut liberty_seen = vec![false; self.size * self.size];
        let mut liberties = 0;
        while let Some(pt) = stack.pop() {
            let i = self.idx(pt);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            for n in self.neighbors(pt) {
                let ni = self.idx(n);
                match self.get(n) {
                    None if !liberty_seen[ni] => {
                        liberty_seen[ni] = true;
                        liberties += 1;
                    }
                    Some(c) if c == color && !visited[ni] => stack.push(n),
                    _ => {}
                }
            }
        }
        liberties
    }

    /// Flood an empty region from `start`, marking `visited`.
    /// Returns the region size and its owner if only one color borders it.
    fn explore_territory(&self, start: Point, visited: &mut [bool]) -> (usize, Option<Color>) {
        let mut stack = vec![start];
        let mut size = 0;
        let mut borders_black = false;
        let mut borders_white = false;
        while let Some(pt) = stack.pop() {
            let i = self.idx(pt);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            size += 1;
            for n in self.neighbors(pt) {
                match self.get(n) {
                    None if !visited[self.idx(n)] => stack.push(n),
                    None => {}
                    Some(Color::Black) => borders_black = true,
                    Some(Color::White) => borders_white = true,
                }
            }
        }
        let owner = match (borders_black, borders_white) {
            (true, false) => Some(Color::Black),
            (false, true) => Some(Color::White),
            _ => None,
        };
        (size, owner)
    }
}

impl Board for Goban {
    fn size(&self) -> usize {
        self.size
    }

    fn legal_moves(&self, color: Color) -> Vec<Point> {
        let mut moves = Vec::new();
        for row in 0..self.size {
            for col in 0..self.size {
                if self.is_legal(color, (row, col)) {
                    moves.push((row, col));
                }
            }
        }
        moves
    }

    fn apply_move(&mut self, color: Color, mv: Move) -> Result<(), MoveError> {
        match mv {
            Move::Pass => {
                self.ko = None;
                Ok(())
            }
            Move::Place(p) => self.play(color, p).map(|_| ()),
        }
    }

    /// Area scoring: stones on the board plus empty regions bordered by a
    /// single color. Komi goes to White.
    fn score(&self) -> (f64, f64) {
        let mut visited = vec![false; self.size * self.size];
        let mut black = 0usize;
        let mut white = 0usize;

        for row in 0..self.size {
            for col in 0..self.size {
                let p = (row, col);
                match self.get(p) {
                    Some(Color::Black) => black += 1,
                    Some(Color::White) => white += 1,
                    None if !visited[self.idx(p)] => {
                        match self.explore_territory(p, &mut visited) {
                            (n, Some(Color::Black)) => black += n,
                            (n, Some(Color::White)) => white += n,
                            (_, None) => {}
                        }
                    }
                    None => {}
                }
            }
        }

        (black as f64, white as f64 + self.komi)
    }
}

impl fmt::Display for Goban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                let ch = match self.get((row, col)) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::Color::{Black, White};

    fn setup(size: usize, stones: &[(Color, Point)]) -> Goban {
        let mut board = Goban::new(size);
        for &(c, p) in stones {
            board.play(c, p).unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board() {
        let board = Goban::new(9);
        assert_eq!(board.legal_moves(Black).len(), 81);
        assert_eq!(board.score(), (0.0, 0.0));
        assert_eq!(board.ko(), None);
    }

    #[test]
    fn test_legal_moves_row_major() {
        let board = Goban::new(2);
        assert_eq!(board.legal_moves(White), vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_occupied_and_out_of_bounds() {
        let mut board = setup(5, &[(Black, (2, 2))]);
        assert_eq!(board.play(White, (2, 2)), Err(MoveError::Occupied));
        assert_eq!(board.play(White, (5, 0)), Err(MoveError::OutOfBounds));
        assert!(!board.legal_moves(White).contains(&(2, 2)));
    }

    #[test]
    fn test_single_stone_liberties() {
        let board = setup(9, &[(Black, (4, 4))]);
        assert_eq!(board.group_liberties((4, 4)), 4);
        let corner = setup(9, &[(Black, (0, 0))]);
        assert_eq!(corner.group_liberties((0, 0)), 2);
    }

    #[test]
    fn test_capture() {
        let mut board = setup(
            5,
            &[(White, (1, 1)), (Black, (0, 1)), (Black, (1, 0)), (Black, (2, 1))],
        );
        assert_eq!(board.play(Black, (1, 2)), Ok(1));
        assert_eq!(board.get((1, 1)), None);
    }

    #[test]
    fn test_suicide_rejected() {
        let mut board = setup(5, &[(Black, (0, 1)), (Black, (1, 0))]);
        let before = board.clone();
        assert_eq!(board.play(White, (0, 0)), Err(MoveError::Suicide));
        assert_eq!(board, before);
        assert!(!board.is_legal(White, (0, 0)));
        assert!(board.is_legal(Black, (0, 0)));
    }

    #[test]
    fn test_capture_is_not_suicide() {
        // White at (0,0) in atari; Black fills its last liberty from a point
        // that has no liberties of its own.
        let board = setup(
            5,
            &[(White, (0, 0)), (Black, (1, 0)), (White, (0, 2)), (White, (1, 1))],
        );
        assert!(board.is_legal(Black, (0, 1)));
        let mut b = board.clone();
        assert_eq!(b.play(Black, (0, 1)), Ok(1));
    }

    #[test]
    fn test_ko() {
        // Classic ko shape around (1,1)/(1,2)
        let mut board = setup(
            5,
            &[
                (Black, (0, 1)),
                (Black, (1, 0)),
                (Black, (2, 1)),
                (White, (0, 2)),
                (White, (2, 2)),
                (White, (1, 3)),
                (White, (1, 1)),
            ],
        );
        assert_eq!(board.play(Black, (1, 2)), Ok(1));
        assert_eq!(board.ko(), Some((1, 1)));
        assert!(!board.is_legal(White, (1, 1)));
        assert_eq!(board.play(White, (1, 1)), Err(MoveError::Ko));

        // Only the captured side is held back
        assert!(board.is_legal(Black, (1, 1)));
        assert!(board.legal_moves(Black).contains(&(1, 1)));
        let mut filled = board.clone();
        assert_eq!(filled.play(Black, (1, 1)), Ok(0));

        // A pass lifts the ko
        board.apply_move(White, Move::Pass).unwrap();
        assert_eq!(board.ko(), None);
        assert!(board.is_legal(White, (1, 1)));
    }

    #[test]
    fn test_legal_moves_match_play() {
        let board = setup(
            5,
            &[(Black, (0, 1)), (Black, (1, 0)), (White, (2, 2)), (White, (3, 3))],
        );
        for color in [Black, White] {
            for row in 0..5 {
                for col in 0..5 {
                    let mut b = board.clone();
                    let played = b.play(color, (row, col)).is_ok();
                    let legal = board.is_legal(color, (row, col));
                    assert_eq!(legal, played, "{color} at {row},{col}");
                }
            }
        }
    }

    #[test]
    fn test_area_score() {
        // Black wall on column 1 of a 3x3 board owns column 0
        let board = setup(3, &[(Black, (0, 1)), (Black, (1, 1)), (Black, (2, 1))]);
        assert_eq!(board.score(), (9.0, 0.0));

        let mixed = setup(3, &[(Black, (0, 0)), (White, (2, 2))]);
        assert_eq!(mixed.score(), (1.0, 1.0));
    }

    #[test]
    fn test_komi() {
        let board = Goban::with_komi(5, 6.5);
        assert_eq!(board.komi(), 6.5);
        assert_eq!(board.score(), (0.0, 6.5));
        assert_eq!(Goban::new(5).komi(), DEFAULT_KOMI);
    }

    #[test]
    fn test_clone_is_independent() {
        let board = setup(5, &[(Black, (2, 2))]);
        let mut copy = board.clone();
        copy.play(White, (0, 0)).unwrap();
        assert_eq!(board.get((0, 0)), None);
        assert_eq!(copy.get((0, 0)), Some(White));
    }

    #[test]
    fn test_liberties_after() {
        let board = setup(5, &[(White, (0, 1))]);
        assert_eq!(board.liberties_after(Black, (2, 2)), Some(4));
        assert_eq!(board.liberties_after(Black, (0, 0)), Some(1));
        assert_eq!(board.liberties_after(Black, (0, 1)), None);
    }

    #[test]
    fn test_display() {
        let board = setup(2, &[(Black, (0, 0)), (White, (1, 1))]);
        assert_eq!(board.to_string(), "X . \n. O \n");
    }
}
