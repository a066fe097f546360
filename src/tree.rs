//! Arena-backed search tree.
//!
//! Nodes live in a single `Vec` and refer to each other by index: a node owns
//! nothing but its board snapshot, and `parent` is only a way back up for
//! backpropagation. The whole tree is dropped once a move has been chosen.
//!
//! Win statistics are kept from the point of view of the player who moved
//! *into* a node (the opponent of the node's `to_play`), so a parent can rank
//! its children directly by how good they are for itself.

use fastrand::Rng;
use log::{Level, log_enabled, trace};

use crate::board::Board;
use crate::constants::PASSES_TO_END;
use crate::types::{Color, Move, Outcome, Point};

/// Index of a node in its [`Tree`].
pub type NodeId = usize;

/// One explored position.
pub struct Node<B> {
    /// Independently owned board at this position
    pub board: B,
    /// Node this one was expanded from (`None` for the root)
    pub parent: Option<NodeId>,
    /// Move that produced this node (`None` for the root)
    pub mv: Option<Move>,
    /// Player whose turn it is here
    pub to_play: Color,
    /// Consecutive passes that led here
    pub passes: u8,
    /// Expanded children, in expansion order
    pub children: Vec<NodeId>,
    /// Moves not yet expanded; the next one is at the end
    untried: Vec<Move>,
    /// Number of simulations through this node
    pub visits: usize,
    /// Credit for the player who moved into this node
    pub wins: f64,
}

impl<B> Node<B> {
    fn new(
        board: B,
        parent: Option<NodeId>,
        mv: Option<Move>,
        to_play: Color,
        passes: u8,
        untried: Vec<Move>,
    ) -> Self {
        Self {
            board,
            parent,
            mv,
            to_play,
            passes,
            children: Vec::new(),
            untried,
            visits: 0,
            wins: 0.0,
        }
    }

    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// Two consecutive passes ended the game at this node.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.passes >= PASSES_TO_END
    }

    /// Moves still waiting to be expanded, last one first.
    pub fn untried_moves(&self) -> &[Move] {
        &self.untried
    }

    /// Player credited by this node's statistics.
    #[inline]
    pub fn mover(&self) -> Color {
        self.to_play.opponent()
    }

    /// Average credit per visit, or 0 when unvisited.
    pub fn winrate(&self) -> f64 {
        if self.visits > 0 {
            self.wins / self.visits as f64
        } else {
            0.0
        }
    }
}

/// Order in which a node will expand its moves.
///
/// Board moves come out in a random (seeded) order and pass always last, so
/// every real move gets a chance before the search considers passing.
fn expansion_order(moves: &[Point], rng: &mut Rng) -> Vec<Move> {
    let mut points = moves.to_vec();
    rng.shuffle(&mut points);
    let mut untried = Vec::with_capacity(points.len() + 1);
    untried.push(Move::Pass);
    untried.extend(points.into_iter().map(Move::from));
    untried
}

/// The search tree for a single move decision.
pub struct Tree<B> {
    nodes: Vec<Node<B>>,
}

impl<B: Board> Tree<B> {
    pub const ROOT: NodeId = 0;

    /// Build a tree whose root is `board` with `to_play` to move and
    /// `legal_moves` (plus pass) as its candidate moves.
    pub fn new(board: B, to_play: Color, legal_moves: &[Point], rng: &mut Rng) -> Self {
        let untried = expansion_order(legal_moves, rng);
        let root = Node::new(board, None, None, to_play, 0, untried);
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> &Node<B> {
        &self.nodes[Self::ROOT]
    }

    pub fn get(&self, id: NodeId) -> &Node<B> {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// UCT score of node `id` as seen from its parent.
    ///
    /// Unvisited nodes score +infinity so every child is tried once before
    /// the statistics are trusted.
    pub fn uct(&self, id: NodeId, exploration: f64) -> f64 {
        let node = &self.nodes[id];
        if node.visits == 0 {
            return f64::INFINITY;
        }
        let parent_visits = node.parent.map_or(0, |p| self.nodes[p].visits).max(1);
        let n = node.visits as f64;
        node.wins / n + exploration * ((parent_visits as f64).ln() / n).sqrt()
    }

    /// Child of `id` with the highest UCT score. Ties go to the child that
    /// was expanded first.
    pub fn best_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &self.nodes[id].children {
            let score = self.uct(child, exploration);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((child, score));
            }
        }
        best.map(|(child, _)| child)
    }

    /// Child of `id` with the most visits. Ties go to the child that was
    /// expanded first.
    pub fn most_visited_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for &child in &self.nodes[id].children {
            if best.is_none_or(|b| self.nodes[child].visits > self.nodes[b].visits) {
                best = Some(child);
            }
        }
        best
    }

    /// Move of the root's most visited child.
    pub fn best_move(&self) -> Option<Move> {
        self.most_visited_child(Self::ROOT)
            .and_then(|id| self.nodes[id].mv)
    }

    /// Walk down from the root while the current node is fully expanded and
    /// has children, following [`best_child`](Self::best_child).
    pub fn select(&self, exploration: f64) -> NodeId {
        let mut id = Self::ROOT;
        loop {
            let node = &self.nodes[id];
            if !node.is_fully_expanded() || node.children.is_empty() {
                return id;
            }
            match self.best_child(id, exploration) {
                Some(child) => id = child,
                None => return id,
            }
        }
    }

    /// Expand the next untried move of `id` into a new child.
    ///
    /// Returns `None` if `id` has nothing left to expand. A move the board
    /// refuses is dropped and the next one is tried.
    pub fn expand(&mut self, id: NodeId, rng: &mut Rng) -> Option<NodeId> {
        while let Some(mv) = self.nodes[id].untried.pop() {
            let parent = &self.nodes[id];
            let mover = parent.to_play;
            let mut board = parent.board.clone();
            if let Err(e) = board.apply_move(mover, mv) {
                log::warn!("dropping untried move {mv} for {mover}: {e}");
                continue;
            }
            debug_assert!(
                parent.children.iter().all(|&c| self.nodes[c].mv != Some(mv)),
                "duplicate child for move {mv}"
            );

            let passes = if mv.is_pass() { parent.passes + 1 } else { 0 };
            let to_play = mover.opponent();
            let untried = if passes >= PASSES_TO_END {
                Vec::new()
            } else {
                expansion_order(&board.legal_moves(to_play), rng)
            };

            let child_id = self.nodes.len();
            self.nodes
                .push(Node::new(board, Some(id), Some(mv), to_play, passes, untried));
            self.nodes[id].children.push(child_id);
            return Some(child_id);
        }
        None
    }

    /// Record `outcome` on `id` and every ancestor up to the root.
    ///
    /// Each node gets one visit; every node except the root is credited for
    /// the player who moved into it.
    pub fn backpropagate(&mut self, id: NodeId, outcome: Outcome) {
        let mut current = Some(id);
        while let Some(i) = current {
            let node = &mut self.nodes[i];
            node.visits += 1;
            if node.parent.is_some() {
                node.wins += outcome.credit_for(node.mover());
            }
            current = node.parent;
        }
    }

    /// Trace the statistics of `id`'s children.
    pub fn log_children(&self, id: NodeId) {
        if !log_enabled!(Level::Trace) {
            return;
        }
        for &child in &self.nodes[id].children {
            let node = &self.nodes[child];
            if let Some(mv) = node.mv {
                trace!(
                    "move {} v={} w={:.1} wr={:.3}",
                    mv,
                    node.visits,
                    node.wins,
                    node.winrate()
                );
            }
        }
    }
}
