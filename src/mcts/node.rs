//! Search tree nodes.
//!
//! Nodes live in an arena and reference each other by index: the parent
//! link is a plain `NodeId`, never an owning reference, so the
//! parent/child/back-reference shape needs no reference counting. Each
//! node owns its battle state snapshot; the persistent cell array makes
//! those snapshots cheap.

use smallvec::SmallVec;

use crate::battle::{Action, BattleState};

/// Index into the search tree's node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value representing no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Create a new node ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Check if this is the NONE sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Get the raw index value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NodeId(NONE)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

/// A node in the search tree.
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// Parent node (NONE for root).
    pub parent: NodeId,

    /// The action that produced this node's state (None for root).
    pub action: Option<Action>,

    /// The battle state this node represents.
    pub state: BattleState,

    /// Expanded children.
    pub children: SmallVec<[NodeId; 8]>,

    /// Legal actions not yet expanded into children; consumed one at a
    /// time, in uniformly random order.
    pub untried: Vec<Action>,

    /// Total visits to this node.
    pub visits: u32,

    /// Sum of rollout outcomes observed through this node.
    pub wins: f64,

    /// Sum of turns elapsed at each observed rollout's end.
    pub turn_sum: u64,

    /// Whether this node's state is already decided.
    pub is_terminal: bool,
}

impl SearchNode {
    /// Create a node for a state reached via `action` from `parent`.
    #[must_use]
    pub fn new(parent: NodeId, action: Option<Action>, state: BattleState) -> Self {
        let is_terminal = state.is_terminal();
        let untried = if is_terminal {
            Vec::new()
        } else {
            state.legal_actions()
        };

        Self {
            parent,
            action,
            state,
            children: SmallVec::new(),
            untried,
            visits: 0,
            wins: 0.0,
            turn_sum: 0,
            is_terminal,
        }
    }

    /// Create a root node.
    #[must_use]
    pub fn root(state: BattleState) -> Self {
        Self::new(NodeId::NONE, None, state)
    }

    /// Whether every legal action has been expanded into a child.
    #[must_use]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// UCT value seen from the parent.
    ///
    /// Callers must not evaluate an unvisited child: the selection rule
    /// prefers those outright, so the exploitation term is never computed
    /// at zero visits.
    #[must_use]
    pub fn uct_value(&self, parent_visits: u32, exploration: f64) -> f64 {
        debug_assert!(self.visits > 0, "UCT evaluated on an unvisited node");
        let visits = f64::from(self.visits);
        let exploit = self.wins / visits;
        let explore = exploration * (f64::from(parent_visits.max(1)).ln() / visits).sqrt();
        exploit + explore
    }
}
