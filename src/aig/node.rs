use super::AigEdge;

/// A node id.
///
/// Ids are indices into the arena of the owning [`Aig`]: they are stable for the
/// whole life of the graph, even for nodes that were freed.
/// The constant node [`NodeKind::False`] has id 0 by convention.
///
/// [`Aig`]: super::Aig
pub type NodeId = usize;

/// What a node computes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The constant low/false signal.
    False,
    /// A primary input, `index` is its position among the inputs.
    Input { index: usize },
    /// The output of a latch (for sequential circuits), `index` is its position among the latches.
    /// Its next-state function is attached later, once the logic driving it has been built.
    Latch {
        index: usize,
        next: Option<AigEdge>,
        init: Option<bool>,
    },
    /// An AND gate with two fanins, ordered so that `fanin0 < fanin1`.
    And { fanin0: AigEdge, fanin1: AigEdge },
}

/// An AIG node.
///
/// Besides its [`NodeKind`], a node carries the bookkeeping of functional reduction:
/// - its level (longest path from the leaves),
/// - its simulation words (random words, then counterexample feedback words),
/// - an optional representative, set once the node is proved equivalent to an earlier node,
/// - an optional link to the next member of the choice class it heads or belongs to,
/// - a reference count (fanouts, outputs and latch inputs pointing at it).
#[derive(Debug, Clone)]
pub struct AigNode {
    pub(super) id: NodeId,
    pub(super) kind: NodeKind,
    pub(super) level: u32,
    pub(super) repr: Option<AigEdge>,
    pub(super) next_equiv: Option<NodeId>,
    pub(super) refs: u32,
    pub(super) dead: bool,
    /// Set while the node sits in one of the functional tables.
    pub(super) classified: bool,
    pub(super) sim: Vec<u64>,
    pub(super) fsim: Vec<u64>,
}

impl AigNode {
    pub(super) fn new(id: NodeId, kind: NodeKind, level: u32, sim: Vec<u64>, fsim: Vec<u64>) -> Self {
        AigNode {
            id,
            kind,
            level,
            repr: None,
            next_equiv: None,
            refs: 0,
            dead: false,
            classified: false,
            sim,
            fsim,
        }
    }

    pub fn get_id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_false(&self) -> bool {
        matches!(self.kind, NodeKind::False)
    }

    pub fn is_input(&self) -> bool {
        matches!(self.kind, NodeKind::Input { .. })
    }

    pub fn is_latch(&self) -> bool {
        matches!(self.kind, NodeKind::Latch { .. })
    }

    pub fn is_and(&self) -> bool {
        matches!(self.kind, NodeKind::And { .. })
    }

    /// Constant, inputs and latch outputs.
    pub fn is_leaf(&self) -> bool {
        !self.is_and()
    }

    /// Returns the two fanins of an AND gate, [`None`] for leaves.
    ///
    /// The next-state edge of a latch is not a fanin: latches break the combinational logic.
    pub fn get_fanins(&self) -> Option<[AigEdge; 2]> {
        match self.kind {
            NodeKind::And { fanin0, fanin1 } => Some([fanin0, fanin1]),
            _ => None,
        }
    }

    /// Returns the next-state edge of a latch, if it has been set.
    pub fn get_latch_next(&self) -> Option<AigEdge> {
        match self.kind {
            NodeKind::Latch { next, .. } => next,
            _ => None,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// The representative this node was merged into, with the relative phase.
    pub fn repr(&self) -> Option<AigEdge> {
        self.repr
    }

    pub fn next_equiv(&self) -> Option<NodeId> {
        self.next_equiv
    }

    pub fn refs(&self) -> u32 {
        self.refs
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Value of the node under the very first simulation pattern.
    ///
    /// Signatures are normalized with respect to this phase, so that a node
    /// and its complement land in the same functional bucket.
    pub fn phase(&self) -> bool {
        self.sim.first().is_some_and(|w| w & 1 == 1)
    }

    /// Random simulation words (one bit per pattern).
    pub fn sim_words(&self) -> &[u64] {
        &self.sim
    }

    /// Simulation words produced by counterexample feedback.
    pub fn feedback_words(&self) -> &[u64] {
        &self.fsim
    }
}
