//! Bit-parallel random simulation.
//!
//! Every node owns two buffers of 64-bit words, one bit per pattern:
//! - the random words, drawn for each leaf from a seeded generator,
//! - the feedback words, filled one bit at a time with counterexamples returned by the SAT resolver.
//!
//! AND gates compute both buffers from their fanins at creation time. Buffers only grow.

use std::hash::{DefaultHasher, Hash, Hasher};

use rand::{RngCore, SeedableRng, rngs::StdRng};

use crate::miter::Counterexample;

use super::{Aig, AigEdge, AigError, NodeId, NodeKind, Result};

/// Simulation bookkeeping shared by all the nodes of one graph.
#[derive(Debug, Clone)]
pub(super) struct SimState {
    rng: StdRng,
    /// Random words per node.
    words: usize,
    /// Feedback patterns stored so far.
    feedback_bits: usize,
}

impl SimState {
    pub(super) fn new(seed: u64, words: usize) -> Self {
        SimState {
            rng: StdRng::seed_from_u64(seed),
            words: words.max(1),
            feedback_bits: 0,
        }
    }

    pub(super) fn words(&self) -> usize {
        self.words
    }

    pub(super) fn feedback_bits(&self) -> usize {
        self.feedback_bits
    }

    pub(super) fn feedback_words(&self) -> usize {
        self.feedback_bits.div_ceil(64)
    }

    fn random_words(&mut self, n: usize) -> Result<Vec<u64>> {
        let mut words = alloc_words(n)?;
        words.extend((0..n).map(|_| self.rng.next_u64()));
        Ok(words)
    }
}

fn alloc_words(n: usize) -> Result<Vec<u64>> {
    let mut words = Vec::new();
    words
        .try_reserve_exact(n)
        .map_err(|_| AigError::OutOfMemory)?;
    Ok(words)
}

fn and_word(a: u64, b: u64, f0: AigEdge, f1: AigEdge) -> u64 {
    let a = if f0.complement { !a } else { a };
    let b = if f1.complement { !b } else { b };
    a & b
}

impl Aig {
    /// Fresh random buffers for a new leaf.
    pub(super) fn leaf_sim(&mut self) -> Result<(Vec<u64>, Vec<u64>)> {
        let sim = self.sim.random_words(self.sim.words)?;
        let fsim = self.sim.random_words(self.sim.feedback_words())?;
        Ok((sim, fsim))
    }

    /// Buffers of the AND of two existing edges.
    pub(super) fn and_sim(&self, f0: AigEdge, f1: AigEdge) -> Result<(Vec<u64>, Vec<u64>)> {
        let (n0, n1) = (&self.nodes[f0.node], &self.nodes[f1.node]);
        let mut sim = alloc_words(n0.sim.len())?;
        sim.extend(
            n0.sim
                .iter()
                .zip(&n1.sim)
                .map(|(&a, &b)| and_word(a, b, f0, f1)),
        );
        let mut fsim = alloc_words(n0.fsim.len())?;
        fsim.extend(
            n0.fsim
                .iter()
                .zip(&n1.fsim)
                .map(|(&a, &b)| and_word(a, b, f0, f1)),
        );
        Ok((sim, fsim))
    }

    /// Number of random words per node.
    pub fn sim_words(&self) -> usize {
        self.sim.words
    }

    /// Number of counterexamples folded into the simulation so far.
    pub fn feedback_patterns(&self) -> usize {
        self.sim.feedback_bits
    }

    /// Appends `words` random words to every leaf and recomputes every AND gate once,
    /// in creation order. The functional tables are rehashed afterwards.
    ///
    /// Extending never changes the phase of a node, which only depends on the first pattern.
    pub fn extend_simulation(&mut self, words: usize) -> Result<()> {
        if words == 0 {
            return Ok(());
        }
        let start = self.sim.words;
        for id in 0..self.nodes.len() {
            if self.nodes[id].dead {
                continue;
            }
            let kind = self.nodes[id].kind.clone();
            let extra = match kind {
                NodeKind::False => vec![0; words],
                NodeKind::Input { .. } | NodeKind::Latch { .. } => self.sim.random_words(words)?,
                NodeKind::And { fanin0, fanin1 } => {
                    let (a, b) = (&self.nodes[fanin0.node].sim, &self.nodes[fanin1.node].sim);
                    (start..start + words)
                        .map(|k| and_word(a[k], b[k], fanin0, fanin1))
                        .collect()
                }
            };
            let sim = &mut self.nodes[id].sim;
            sim.try_reserve_exact(words)
                .map_err(|_| AigError::OutOfMemory)?;
            sim.extend(extra);
        }
        self.sim.words += words;
        self.rehash_functional();
        Ok(())
    }

    /// Folds a counterexample into the feedback words of every node.
    ///
    /// Leaves assigned by the counterexample get the new bit from it, the other leaves keep
    /// a random bit. AND gates are recomputed for the word holding the new bit.
    pub(super) fn add_pattern(&mut self, cex: &Counterexample) -> Result<()> {
        let word = self.sim.feedback_bits / 64;
        let mask = 1u64 << (self.sim.feedback_bits % 64);
        if mask == 1 {
            for id in 0..self.nodes.len() {
                if self.nodes[id].dead {
                    continue;
                }
                let w = if self.nodes[id].is_false() || self.nodes[id].is_and() {
                    0
                } else {
                    self.sim.rng.next_u64()
                };
                let fsim = &mut self.nodes[id].fsim;
                fsim.try_reserve(1).map_err(|_| AigError::OutOfMemory)?;
                fsim.push(w);
            }
        }
        for (id, value) in cex.iter() {
            let node = &mut self.nodes[id];
            if node.dead || node.is_and() || node.is_false() {
                continue;
            }
            if value {
                node.fsim[word] |= mask;
            } else {
                node.fsim[word] &= !mask;
            }
        }
        for id in 0..self.nodes.len() {
            if self.nodes[id].dead {
                continue;
            }
            let Some([fanin0, fanin1]) = self.nodes[id].get_fanins() else {
                continue;
            };
            let w = and_word(
                self.nodes[fanin0.node].fsim[word],
                self.nodes[fanin1.node].fsim[word],
                fanin0,
                fanin1,
            );
            self.nodes[id].fsim[word] = w;
        }
        self.sim.feedback_bits += 1;
        self.stats.feedback_patterns += 1;
        self.rehash_functional();
        Ok(())
    }

    /// Simulation words of a node, complemented if its phase is set.
    fn normalized_words(&self, id: NodeId) -> impl Iterator<Item = u64> + '_ {
        let node = &self.nodes[id];
        let mask = if node.phase() { !0 } else { 0 };
        node.sim
            .iter()
            .chain(&node.fsim)
            .map(move |&w| w ^ mask)
    }

    /// A node is sparse when all its random patterns agree: it looks constant.
    pub(super) fn is_sparse(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        let mask = if node.phase() { !0 } else { 0 };
        node.sim.iter().all(|&w| w ^ mask == 0)
    }

    /// Hash of the phase-normalized simulation words.
    pub(super) fn signature(&self, id: NodeId) -> u64 {
        let mut hasher = DefaultHasher::new();
        for w in self.normalized_words(id) {
            w.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// If both nodes simulate identically up to phase, returns the relative phase:
    /// `b == a ^ phase` on every pattern.
    pub(super) fn sim_equal(&self, a: NodeId, b: NodeId) -> Option<bool> {
        self.normalized_words(a)
            .eq(self.normalized_words(b))
            .then(|| self.nodes[a].phase() ^ self.nodes[b].phase())
    }
}
