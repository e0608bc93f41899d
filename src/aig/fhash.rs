//! Functional hashing: nodes bucketed by their simulation signature.
//!
//! Two tables are kept. Sparse nodes (whose random patterns are all equal, so that they look
//! constant) live apart from the dense ones, and the constant node sits among them.

use std::collections::HashMap;

use log::debug;

use crate::miter::{Miter, Verdict};

use super::{Aig, AigEdge, NodeId, Result};

/// Signature buckets. A bucket may hold nodes that collide without being equivalent.
#[derive(Debug, Clone, Default)]
pub(super) struct FuncTable {
    buckets: HashMap<u64, Vec<NodeId>>,
    len: usize,
}

impl FuncTable {
    fn insert(&mut self, signature: u64, id: NodeId) {
        self.buckets.entry(signature).or_default().push(id);
        self.len += 1;
    }

    fn bucket(&self, signature: u64) -> &[NodeId] {
        self.buckets.get(&signature).map_or(&[], Vec::as_slice)
    }

    fn remove(&mut self, signature: u64, id: NodeId) {
        if let Some(bucket) = self.buckets.get_mut(&signature) {
            if let Some(pos) = bucket.iter().position(|&n| n == id) {
                bucket.remove(pos);
                self.len -= 1;
            }
            if bucket.is_empty() {
                self.buckets.remove(&signature);
            }
        }
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }

    pub(super) fn len(&self) -> usize {
        self.len
    }
}

impl Aig {
    fn table_of(&mut self, id: NodeId) -> &mut FuncTable {
        if self.is_sparse(id) {
            &mut self.sparse
        } else {
            &mut self.dense
        }
    }

    pub(super) fn ftable_insert(&mut self, id: NodeId) {
        let signature = self.signature(id);
        self.table_of(id).insert(signature, id);
        self.nodes[id].classified = true;
    }

    pub(super) fn ftable_remove(&mut self, id: NodeId) {
        if !self.nodes[id].classified {
            return;
        }
        let signature = self.signature(id);
        self.table_of(id).remove(signature, id);
        self.nodes[id].classified = false;
    }

    /// Rebuilds both tables from scratch, after the simulation words changed.
    pub(super) fn rehash_functional(&mut self) {
        self.dense.clear();
        self.sparse.clear();
        for id in 0..self.nodes.len() {
            if self.nodes[id].classified && !self.nodes[id].dead {
                let signature = self.signature(id);
                self.table_of(id).insert(signature, id);
            }
        }
    }

    /// Classified nodes simulating exactly like `id` (up to phase), in creation order.
    /// Each one comes with the phase relating it to `id`.
    fn functional_candidates(&self, id: NodeId) -> Vec<(NodeId, bool)> {
        let signature = self.signature(id);
        let table = if self.is_sparse(id) {
            &self.sparse
        } else {
            &self.dense
        };
        let mut candidates: Vec<(NodeId, bool)> = table
            .bucket(signature)
            .iter()
            .filter(|&&cand| cand != id)
            .filter_map(|&cand| self.sim_equal(cand, id).map(|phase| (cand, phase)))
            .collect();
        candidates.sort_unstable();
        candidates
    }

    /// Looks for an earlier node computing the same function as the freshly created AND `id`.
    ///
    /// Returns the edge the caller should use: the earlier node (phase adjusted) if a proof
    /// succeeded, `id` itself otherwise, in which case `id` joins the functional tables.
    pub(super) fn classify(&mut self, id: NodeId) -> Result<AigEdge> {
        if !self.params.do_sparse && self.is_sparse(id) {
            self.ftable_insert(id);
            return Ok(AigEdge::new(id, false));
        }

        'lookup: loop {
            for (cand, phase) in self.functional_candidates(id) {
                let repr = AigEdge::new(cand, phase);
                match self.prove(repr, id)? {
                    Verdict::Equivalent => {
                        self.merge(id, repr)?;
                        return Ok(repr);
                    }
                    Verdict::Inequivalent(cex) => {
                        if self.params.feedback {
                            // The new pattern separates the pair, start over with refined buckets.
                            self.add_pattern(&cex)?;
                            continue 'lookup;
                        }
                    }
                    Verdict::Unknown => (),
                }
            }
            break;
        }

        self.ftable_insert(id);
        Ok(AigEdge::new(id, false))
    }

    /// Asks the SAT resolver whether `n{id} == repr`.
    fn prove(&mut self, repr: AigEdge, id: NodeId) -> Result<Verdict> {
        self.stats.sat_calls += 1;
        let verdict =
            Miter::new(self, repr, AigEdge::new(id, false))?.solve(self.params.backtrack_limit);
        match &verdict {
            Verdict::Equivalent => self.stats.sat_equivalent += 1,
            Verdict::Inequivalent(_) => {
                self.stats.sat_inequivalent += 1;
                debug!("n{id} differs from {repr} despite colliding signatures");
            }
            Verdict::Unknown => {
                self.stats.sat_unknown += 1;
                debug!("n{id} vs {repr}: backtrack limit reached, kept apart");
            }
        }
        Ok(verdict)
    }

    /// Number of nodes currently bucketed, sparse and dense.
    pub(super) fn classified_count(&self) -> (usize, usize) {
        (self.sparse.len(), self.dense.len())
    }
}
