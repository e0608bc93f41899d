//! Module defining the [`Aig`] struct, as well as [`AigNode`], [`AigEdge`] and some others relevant structs.
//!
//! An [`Aig`] is kept functionally reduced while it is being built: every call to [`Aig::and`]
//! goes through trivial rewrites, a one-hop containment check, structural hashing and, unless
//! disabled in [`FraigParams`], functional hashing backed by SAT proofs (see [`crate::miter`]).
//!
//! To look for a minimum clock period after the graph is built, check [`crate::retime`].

mod choice;
mod clone;
pub mod dfs;
pub mod edge;
pub mod error;
mod fhash;
mod integrity;
pub mod node;
pub mod params;
mod sim;
pub mod stats;
mod strash;

use std::collections::HashMap;

use log::{debug, info};

use crate::miter::Counterexample;

pub use choice::ChoiceIter;
pub use edge::AigEdge;
pub use error::{AigError, Result};
pub use node::{AigNode, NodeId, NodeKind};
pub use params::FraigParams;
pub use stats::FraigStats;

use fhash::FuncTable;
use sim::SimState;

/// A whole AIG, kept in canonical and (optionally) functionally reduced form.
///
/// Nodes live in an arena and are addressed by their [`NodeId`]. They are never
/// moved nor removed: a node merged away while reference counting is enabled is only
/// flagged as dead, so that its id stays valid for the choice classes that may mention it.
///
/// Node 0 is the constant false node. Inputs and latch outputs are leaves. Every other node is
/// an AND gate with two (possibly complemented) fanins, created through [`Aig::and`].
///
/// ```rust
/// use fraigs::Aig;
/// let mut aig = Aig::new();
/// let a = aig.add_input("a").unwrap();
/// let b = aig.add_input("b").unwrap();
/// let ab = aig.and(a, b).unwrap();
/// let ba = aig.and(b, a).unwrap();
/// assert_eq!(ab, ba);
/// assert_eq!(aig.and(a, !a).unwrap(), aig.constant(false));
/// aig.add_output("z", ab).unwrap();
/// assert_eq!(aig.evaluate(&[true, true], &[]).unwrap(), vec![true]);
/// ```
#[derive(Debug, Clone)]
pub struct Aig {
    nodes: Vec<AigNode>,
    inputs: Vec<NodeId>,
    latches: Vec<NodeId>,
    outputs: Vec<AigEdge>,
    output_names: Vec<String>,
    /// Names of inputs and latches.
    names: HashMap<NodeId, String>,
    /// Structural table: ordered fanins to AND gate.
    strash: HashMap<(AigEdge, AigEdge), NodeId>,
    /// Functional table for nodes with a live simulation signature.
    dense: FuncTable,
    /// Functional table for near-constant nodes.
    sparse: FuncTable,
    sim: SimState,
    params: FraigParams,
    stats: FraigStats,
}

impl Default for Aig {
    fn default() -> Self {
        Aig::new()
    }
}

impl Aig {
    /// Create a brand new AIG (constant node [`NodeKind::False`] included) with default parameters.
    pub fn new() -> Self {
        Aig::with_params(FraigParams::default())
    }

    /// Create a brand new AIG with the given parameters.
    pub fn with_params(params: FraigParams) -> Self {
        let sim = SimState::new(params.seed, params.sim_words);
        let words = sim.words();
        let mut aig = Aig {
            nodes: vec![AigNode::new(0, NodeKind::False, 0, vec![0; words], Vec::new())],
            inputs: Vec::new(),
            latches: Vec::new(),
            outputs: Vec::new(),
            output_names: Vec::new(),
            names: HashMap::new(),
            strash: HashMap::new(),
            dense: FuncTable::default(),
            sparse: FuncTable::default(),
            sim,
            params,
            stats: FraigStats::default(),
        };
        if aig.params.functional_reduction {
            // Any node simulating to a constant will be checked against it.
            aig.ftable_insert(0);
        }
        aig
    }

    pub fn params(&self) -> &FraigParams {
        &self.params
    }

    pub fn stats(&self) -> &FraigStats {
        &self.stats
    }

    /// Returns the edge to the constant node carrying `value`.
    pub fn constant(&self, value: bool) -> AigEdge {
        AigEdge::new(0, value)
    }

    /// Retrieves a node from its id.
    pub fn get_node(&self, id: NodeId) -> Option<&AigNode> {
        self.nodes.get(id)
    }

    /// All nodes ever created, in creation order (dead ones included).
    pub fn nodes(&self) -> impl Iterator<Item = &AigNode> {
        self.nodes.iter()
    }

    /// Number of nodes ever created, dead ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Only the constant node exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Retrieves inputs id, in declaration order.
    pub fn get_inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Retrieves latches id, in declaration order.
    pub fn get_latches(&self) -> &[NodeId] {
        &self.latches
    }

    /// Retrieves outputs, redirected through representatives.
    pub fn get_outputs(&self) -> Vec<AigEdge> {
        self.outputs.iter().map(|&e| self.canonical(e)).collect()
    }

    pub fn output_name(&self, index: usize) -> Option<&str> {
        self.output_names.get(index).map(String::as_str)
    }

    /// Name of an input or a latch.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Finds an input or a latch by name.
    pub fn find_leaf(&self, name: &str) -> Option<AigEdge> {
        self.inputs
            .iter()
            .chain(&self.latches)
            .find(|&&id| self.name(id) == Some(name))
            .map(|&id| AigEdge::new(id, false))
    }

    /// Redirects an edge through the representative of its node, if any.
    ///
    /// Representatives never have a representative themselves, so one hop is enough.
    pub fn canonical(&self, edge: AigEdge) -> AigEdge {
        match self.nodes.get(edge.node).and_then(|n| n.repr) {
            Some(repr) => repr.with_phase(edge.complement),
            None => edge,
        }
    }

    /// Checks that an edge refers to an existing node which was not freed.
    pub(crate) fn check_edge(&self, edge: AigEdge) -> Result<()> {
        match self.nodes.get(edge.node) {
            None => Err(AigError::NodeDoesNotExist(edge.node)),
            Some(node) if node.dead => Err(AigError::NodeIsDead(edge.node)),
            Some(_) => Ok(()),
        }
    }

    fn alloc_node(&mut self, kind: NodeKind, level: u32, sim: Vec<u64>, fsim: Vec<u64>) -> Result<NodeId> {
        self.nodes
            .try_reserve(1)
            .map_err(|_| AigError::OutOfMemory)?;
        let id = self.nodes.len();
        self.nodes.push(AigNode::new(id, kind, level, sim, fsim));
        Ok(id)
    }

    fn add_leaf(&mut self, kind: NodeKind, name: &str) -> Result<AigEdge> {
        let (sim, fsim) = self.leaf_sim()?;
        let id = self.alloc_node(kind, 0, sim, fsim)?;
        if !name.is_empty() {
            self.names.insert(id, name.to_string());
        }
        if self.params.functional_reduction {
            self.ftable_insert(id);
        }
        Ok(AigEdge::new(id, false))
    }

    /// Declares a new primary input. An empty name leaves the input anonymous.
    pub fn add_input(&mut self, name: &str) -> Result<AigEdge> {
        let index = self.inputs.len();
        let edge = self.add_leaf(NodeKind::Input { index }, name)?;
        self.inputs.push(edge.node);
        Ok(edge)
    }

    /// Declares a new latch and returns its output.
    /// Its next-state function is attached with [`Aig::set_latch_next`].
    pub fn add_latch(&mut self, name: &str, init: Option<bool>) -> Result<AigEdge> {
        let index = self.latches.len();
        let edge = self.add_leaf(
            NodeKind::Latch {
                index,
                next: None,
                init,
            },
            name,
        )?;
        self.latches.push(edge.node);
        Ok(edge)
    }

    /// Attaches (or replaces) the next-state function of a latch.
    pub fn set_latch_next(&mut self, latch: NodeId, next: AigEdge) -> Result<()> {
        self.check_edge(AigEdge::new(latch, false))?;
        self.check_edge(next)?;
        let next = self.canonical(next);
        let old = match &mut self.nodes[latch].kind {
            NodeKind::Latch { next: slot, .. } => slot.replace(next),
            _ => return Err(AigError::NotALatch(latch)),
        };
        self.nodes[next.node].refs += 1;
        if let Some(old) = old {
            self.deref_node(old.node);
        }
        Ok(())
    }

    /// Marks an edge as a primary output and returns the index of the output.
    pub fn add_output(&mut self, name: &str, edge: AigEdge) -> Result<usize> {
        self.check_edge(edge)?;
        let edge = self.canonical(edge);
        self.nodes[edge.node].refs += 1;
        self.outputs.push(edge);
        self.output_names.push(name.to_string());
        Ok(self.outputs.len() - 1)
    }

    fn deref_node(&mut self, id: NodeId) {
        let node = &mut self.nodes[id];
        node.refs = node.refs.saturating_sub(1);
    }

    /// Frees an AND gate nobody points at anymore.
    ///
    /// The node keeps its id and loses its simulation words. A merged node keeps its
    /// structural entry, so that rebuilding the same gate forwards to its representative.
    fn free_node(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        if node.dead || node.refs > 0 {
            return;
        }
        let Some([fanin0, fanin1]) = node.get_fanins() else {
            return;
        };
        if node.repr.is_none() && self.strash.get(&(fanin0, fanin1)) == Some(&id) {
            self.strash.remove(&(fanin0, fanin1));
        }
        self.ftable_remove(id);
        let node = &mut self.nodes[id];
        node.dead = true;
        node.sim = Vec::new();
        node.fsim = Vec::new();
        self.deref_node(fanin0.node);
        self.deref_node(fanin1.node);
        self.stats.freed += 1;
    }

    fn node_values(&self, leaf_value: impl Fn(&AigNode) -> bool) -> Vec<bool> {
        let mut values = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let value = match node.kind {
                NodeKind::False => false,
                NodeKind::And { fanin0, fanin1 } => {
                    (values[fanin0.node] ^ fanin0.complement) && (values[fanin1.node] ^ fanin1.complement)
                }
                _ => leaf_value(node),
            };
            values.push(value);
        }
        values
    }

    /// Evaluates the outputs for one assignment of the inputs and latch outputs.
    pub fn evaluate(&self, inputs: &[bool], latches: &[bool]) -> Result<Vec<bool>> {
        if inputs.len() != self.inputs.len() {
            return Err(AigError::PatternLength {
                expected: self.inputs.len(),
                got: inputs.len(),
            });
        }
        if latches.len() != self.latches.len() {
            return Err(AigError::PatternLength {
                expected: self.latches.len(),
                got: latches.len(),
            });
        }
        let values = self.node_values(|node| match node.kind {
            NodeKind::Input { index } => inputs[index],
            NodeKind::Latch { index, .. } => latches[index],
            _ => false,
        });
        Ok(self
            .outputs
            .iter()
            .map(|out| values[out.node] ^ out.complement)
            .collect())
    }

    /// Evaluates arbitrary edges under a counterexample.
    /// Leaves the counterexample does not assign are taken as false.
    pub fn evaluate_edges(&self, edges: &[AigEdge], cex: &Counterexample) -> Result<Vec<bool>> {
        for &edge in edges {
            self.check_edge(edge)?;
        }
        let values = self.node_values(|node| cex.value(node.id).unwrap_or(false));
        Ok(edges
            .iter()
            .map(|e| values[e.node] ^ e.complement)
            .collect())
    }

    /// Groups the outputs driven by the same node (up to phase).
    ///
    /// Each group lists `(output index, phase)` where the phase is relative to the first output
    /// of the group. Outputs without any twin are omitted.
    pub fn equivalent_outputs(&self) -> Vec<Vec<(usize, bool)>> {
        let mut groups: Vec<Vec<(usize, bool)>> = Vec::new();
        let mut group_of: HashMap<NodeId, (usize, bool)> = HashMap::new();
        for (index, out) in self.get_outputs().into_iter().enumerate() {
            match group_of.get(&out.node) {
                Some(&(g, first_phase)) => groups[g].push((index, out.complement ^ first_phase)),
                None => {
                    group_of.insert(out.node, (groups.len(), out.complement));
                    groups.push(vec![(index, false)]);
                }
            }
        }
        groups.retain(|g| g.len() > 1);
        groups
    }

    /// Returns `Some(phase)` if output `j` is output `i` complemented iff `phase`,
    /// [`None`] if they are driven by different nodes.
    pub fn outputs_equivalent(&self, i: usize, j: usize) -> Result<Option<bool>> {
        let len = self.outputs.len();
        let (a, b) = match (self.outputs.get(i), self.outputs.get(j)) {
            (Some(&a), Some(&b)) => (self.canonical(a), self.canonical(b)),
            _ => return Err(AigError::NoSuchOutput(if i < len { j } else { i })),
        };
        Ok((a.node == b.node).then_some(a.complement ^ b.complement))
    }

    /// Nodes of the reduced graph: not freed and not merged into a representative.
    pub fn live_node_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| !n.dead && n.repr.is_none())
            .count()
    }

    /// AND gates of the reduced graph.
    pub fn and_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.is_and() && !n.dead && n.repr.is_none())
            .count()
    }

    /// Longest path from a leaf to an output or to a latch input.
    pub fn depth(&self) -> u32 {
        self.get_outputs()
            .into_iter()
            .chain(self.latch_inputs())
            .map(|e| self.nodes[e.node].level)
            .max()
            .unwrap_or(0)
    }

    /// Next-state edges of the latches which have one, redirected through representatives.
    pub fn latch_inputs(&self) -> Vec<AigEdge> {
        self.latches
            .iter()
            .filter_map(|&l| self.nodes[l].get_latch_next())
            .map(|e| self.canonical(e))
            .collect()
    }

    /// Logs the statistics, at `info` level if [`FraigParams::verbose`] is set.
    pub fn report_stats(&self) {
        let (sparse, dense) = self.classified_count();
        let summary = format!(
            "{} live nodes ({} ands, {} choice classes, {} sparse/{} dense classified, \
            {} sim words, {} feedback patterns) - {}",
            self.live_node_count(),
            self.and_count(),
            self.choice_class_count(),
            sparse,
            dense,
            self.sim.words(),
            self.sim.feedback_bits(),
            self.stats
        );
        if self.params.verbose {
            info!("{summary}");
        } else {
            debug!("{summary}");
        }
    }
}
