//! An [`AigEdge`] points at an [`AigNode`] and can be complemented (indicates the presence of a NOT gate).
//!
//! [`AigNode`]: crate::AigNode

use std::{fmt::Display, ops::Not};

use crate::NodeId;

/// A directed edge representing a fanin for AIG nodes.
///
/// The edge can carry an inverter according to the value of `complement`.
/// Edges are plain handles into the [`Aig`] arena, so they are `Copy` and can be
/// stored anywhere without keeping the graph borrowed.
///
/// Ordering is by node id first, then by complement. This is the order used to
/// canonicalize the two fanins of an AND gate.
///
/// ```rust
/// use fraigs::Aig;
/// let aig = Aig::new();
/// let zero = aig.constant(false);
/// let one = aig.constant(true);
/// assert_eq!(zero, !one);
/// assert!(one.is_cst_true());
/// ```
///
/// [`Aig`]: crate::Aig
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AigEdge {
    /// The node the edge is refering to.
    pub(crate) node: NodeId,
    /// Set to true if signal should be inverted.
    pub(crate) complement: bool,
}

impl Not for AigEdge {
    type Output = Self;

    fn not(mut self) -> Self::Output {
        self.complement = !self.complement;
        self
    }
}

impl Display for AigEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}n{}", if self.complement { "!" } else { "" }, self.node)
    }
}

impl AigEdge {
    pub fn new(node: NodeId, complement: bool) -> Self {
        AigEdge { node, complement }
    }

    pub fn get_node_id(&self) -> NodeId {
        self.node
    }

    pub fn get_complement(&self) -> bool {
        self.complement
    }

    /// Returns the same edge, complemented iff `phase` is set.
    pub fn with_phase(self, phase: bool) -> Self {
        AigEdge::new(self.node, self.complement ^ phase)
    }

    pub fn is_const(&self) -> bool {
        self.node == 0
    }

    pub fn is_cst_false(&self) -> bool {
        self.node == 0 && !self.complement
    }

    pub fn is_cst_true(&self) -> bool {
        self.node == 0 && self.complement
    }

    pub fn is_complement_of(&self, other: &AigEdge) -> bool {
        self.node == other.node && self.complement ^ other.complement
    }
}
