//! Arena-based search tree.
//!
//! Uses a flat `Vec<SearchNode>` with index-based references. The arena
//! owns every node and is dropped as a unit when the search ends; parent
//! back-references are plain indices, so no reference counting or cycle
//! handling is involved.

use crate::battle::{Action, BattleState};

use super::node::{NodeId, SearchNode};

/// Arena-based search tree rooted at one battle state.
#[derive(Clone, Debug)]
pub struct SearchTree {
    /// All nodes in the tree.
    nodes: Vec<SearchNode>,

    /// The root node ID (always 0 after initialization).
    root: NodeId,
}

impl SearchTree {
    /// Create a new tree rooted at the given state.
    #[must_use]
    pub fn new(root_state: BattleState) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(1024),
            root: NodeId::new(0),
        };
        tree.nodes.push(SearchNode::root(root_state));
        tree
    }

    /// Get the root node ID.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.raw() as usize]
    }

    /// Get a mutable node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.raw() as usize]
    }

    /// Allocate a child of `parent` for the state reached via `action`,
    /// wiring both directions of the link.
    pub fn add_child(&mut self, parent: NodeId, action: Action, state: BattleState) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(SearchNode::new(parent, Some(action), state));
        self.get_mut(parent).children.push(id);
        id
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the root node.
    #[must_use]
    pub fn root_node(&self) -> &SearchNode {
        self.get(self.root)
    }

    /// Number of terminal nodes, for diagnostics.
    #[must_use]
    pub fn terminal_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_terminal).count()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::battle::{Health, Occupant, Piece};
    use crate::board::BoardGeometry;
    use crate::core::{CellIdx, GameRng, Side};

    fn tiny_state() -> BattleState {
        let mut board = vec![Occupant::Empty; 4];
        board[0] = Occupant::Piece(Piece::new(Side::Player, "Knight", "", 1, Health::new(1)));
        board[3] = Occupant::Piece(Piece::new(Side::Enemy, "Ghoul", "", 1, Health::new(1)));
        BattleState::new(Arc::new(BoardGeometry::new(4)), board, Side::Player)
    }

    #[test]
    fn test_tree_new() {
        let tree = SearchTree::new(tiny_state());
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root(), NodeId::new(0));
        assert!(tree.root_node().parent.is_none());
    }

    #[test]
    fn test_add_child_links_both_ways() {
        let mut tree = SearchTree::new(tiny_state());
        let root = tree.root();

        let action = Action::Move {
            from: CellIdx::new(0),
            to: CellIdx::new(1),
        };
        let mut child_state = tree.root_node().state.clone_state();
        child_state.apply(&action, &mut GameRng::new(1));

        let child = tree.add_child(root, action, child_state);

        assert_eq!(child, NodeId::new(1));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(child).parent, root);
        assert_eq!(tree.get(child).action, Some(action));
        assert_eq!(tree.root_node().children.as_slice(), &[child]);
    }

    #[test]
    fn test_get_mut() {
        let mut tree = SearchTree::new(tiny_state());
        let root = tree.root();
        tree.get_mut(root).visits = 100;
        assert_eq!(tree.root_node().visits, 100);
    }

    #[test]
    fn test_terminal_count() {
        let mut board = vec![Occupant::Empty; 4];
        board[0] = Occupant::Piece(Piece::new(Side::Player, "Knight", "", 1, Health::new(1)));
        let terminal_state =
            BattleState::new(Arc::new(BoardGeometry::new(4)), board, Side::Player);

        let tree = SearchTree::new(terminal_state);
        assert_eq!(tree.terminal_count(), 1);
    }
}
