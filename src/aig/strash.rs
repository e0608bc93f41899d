//! Structural hashing and the gate builders.
//!
//! For background, check
//! FRAIGs: A Unifying Representation for Logic Synthesis and Verification
//! by Alan Mishchenko, Satrajit Chatterjee, Roland Jiang, Robert Brayton.

use super::{Aig, AigEdge, AigError, NodeKind, Result};

/// Rewrites that need no lookup at all.
fn trivial_and(a: AigEdge, b: AigEdge) -> Option<AigEdge> {
    if a == b {
        Some(a)
    } else if a.is_complement_of(&b) || a.is_cst_false() || b.is_cst_false() {
        Some(AigEdge::new(0, false))
    } else if a.is_cst_true() {
        Some(b)
    } else if b.is_cst_true() {
        Some(a)
    } else {
        None
    }
}

impl Aig {
    /// Returns the canonical AND of two edges, creating a gate only if no existing node
    /// (structurally or, when enabled, functionally) computes it already.
    ///
    /// The returned edge may point at an earlier node, possibly complemented.
    pub fn and(&mut self, a: AigEdge, b: AigEdge) -> Result<AigEdge> {
        self.check_edge(a)?;
        self.check_edge(b)?;
        let (a, b) = (self.canonical(a), self.canonical(b));

        if let Some(edge) = trivial_and(a, b) {
            self.stats.trivial += 1;
            return Ok(edge);
        }

        let (a, b) = if a <= b { (a, b) } else { (b, a) };

        if let Some(edge) = self.one_hop(a, b).or_else(|| self.one_hop(b, a)) {
            self.stats.one_hop += 1;
            return Ok(edge);
        }

        if let Some(&id) = self.strash.get(&(a, b)) {
            self.stats.strash_hits += 1;
            return Ok(self.canonical(AigEdge::new(id, false)));
        }

        self.create_and(a, b)
    }

    /// Containment through one existing gate: `x` is looked into, `y` is the other operand.
    fn one_hop(&self, x: AigEdge, y: AigEdge) -> Option<AigEdge> {
        let [p, q] = self.nodes[x.node].get_fanins()?;
        if x.complement {
            // !(p & q) & !p = !p
            return (y == !p || y == !q).then_some(y);
        }
        // (p & q) & p = p & q
        if y == p || y == q {
            return Some(x);
        }
        // (p & q) & !p = 0
        if y == !p || y == !q {
            return Some(AigEdge::new(0, false));
        }
        // (p & q) & (!p & r) = 0
        if !y.complement {
            let [r, s] = self.nodes[y.node].get_fanins()?;
            if [r, s].iter().any(|e| e.is_complement_of(&p) || e.is_complement_of(&q)) {
                return Some(AigEdge::new(0, false));
            }
        }
        None
    }

    /// Allocates a new AND gate over canonical, ordered fanins.
    fn create_and(&mut self, fanin0: AigEdge, fanin1: AigEdge) -> Result<AigEdge> {
        self.strash
            .try_reserve(1)
            .map_err(|_| AigError::OutOfMemory)?;
        let level = 1 + self.nodes[fanin0.node]
            .level
            .max(self.nodes[fanin1.node].level);
        let (sim, fsim) = self.and_sim(fanin0, fanin1)?;
        let id = self.alloc_node(NodeKind::And { fanin0, fanin1 }, level, sim, fsim)?;

        self.nodes[fanin0.node].refs += 1;
        self.nodes[fanin1.node].refs += 1;
        self.strash.insert((fanin0, fanin1), id);
        self.stats.created += 1;

        if self.params.functional_reduction {
            self.classify(id)
        } else {
            Ok(AigEdge::new(id, false))
        }
    }

    /// `a | b`
    pub fn or(&mut self, a: AigEdge, b: AigEdge) -> Result<AigEdge> {
        Ok(!self.and(!a, !b)?)
    }

    /// `a ^ b`, as `(a & !b) | (!a & b)`.
    pub fn xor(&mut self, a: AigEdge, b: AigEdge) -> Result<AigEdge> {
        let x = self.and(a, !b)?;
        let y = self.and(!a, b)?;
        self.or(x, y)
    }

    /// `if sel { then } else { other }`
    pub fn mux(&mut self, sel: AigEdge, then: AigEdge, other: AigEdge) -> Result<AigEdge> {
        let x = self.and(sel, then)?;
        let y = self.and(!sel, other)?;
        self.or(x, y)
    }
}

#[cfg(test)]
mod test {
    use crate::{Aig, AigError, FraigParams};

    fn strash_aig() -> Aig {
        Aig::with_params(FraigParams::strash_only())
    }

    #[test]
    fn trivial_test() {
        let mut aig = strash_aig();
        let a = aig.add_input("a").unwrap();
        let one = aig.constant(true);
        let zero = aig.constant(false);
        assert_eq!(aig.and(a, a).unwrap(), a);
        assert_eq!(aig.and(a, !a).unwrap(), zero);
        assert_eq!(aig.and(a, one).unwrap(), a);
        assert_eq!(aig.and(zero, a).unwrap(), zero);
        assert_eq!(aig.or(a, one).unwrap(), one);
        assert_eq!(aig.stats().trivial, 5);
        assert_eq!(aig.len(), 2);
    }

    #[test]
    fn commutativity_test() {
        let mut aig = strash_aig();
        let a = aig.add_input("a").unwrap();
        let b = aig.add_input("b").unwrap();
        let x = aig.and(!a, b).unwrap();
        let y = aig.and(b, !a).unwrap();
        assert_eq!(x, y);
        assert_eq!(aig.stats().strash_hits, 1);
        assert_eq!(aig.and_count(), 1);
        let n = aig.get_node(x.node).unwrap();
        assert_eq!(n.get_fanins(), Some([!a, b]));
        assert_eq!(n.level(), 1);
    }

    #[test]
    fn one_hop_test() {
        let mut aig = strash_aig();
        let a = aig.add_input("a").unwrap();
        let b = aig.add_input("b").unwrap();
        let c = aig.add_input("c").unwrap();
        let ab = aig.and(a, b).unwrap();
        assert_eq!(aig.and(ab, a).unwrap(), ab);
        assert_eq!(aig.and(b, ab).unwrap(), ab);
        assert!(aig.and(ab, !b).unwrap().is_cst_false());
        assert_eq!(aig.and(!ab, !a).unwrap(), !a);
        let nac = aig.and(!a, c).unwrap();
        assert!(aig.and(nac, ab).unwrap().is_cst_false());
        assert_eq!(aig.stats().one_hop, 5);
        // only ab and nac were built
        assert_eq!(aig.and_count(), 2);
    }

    #[test]
    fn xor_mux_test() {
        let mut aig = strash_aig();
        let s = aig.add_input("s").unwrap();
        let t = aig.add_input("t").unwrap();
        let e = aig.add_input("e").unwrap();
        let x = aig.xor(s, t).unwrap();
        let m = aig.mux(s, t, e).unwrap();
        aig.add_output("x", x).unwrap();
        aig.add_output("m", m).unwrap();
        for k in 0..8u32 {
            let bits: Vec<bool> = (0..3).map(|i| k >> i & 1 == 1).collect();
            let outs = aig.evaluate(&bits, &[]).unwrap();
            assert_eq!(outs[0], bits[0] ^ bits[1]);
            assert_eq!(outs[1], if bits[0] { bits[1] } else { bits[2] });
        }
    }

    #[test]
    fn invalid_edge_test() {
        let mut aig = strash_aig();
        let a = aig.add_input("a").unwrap();
        assert!(matches!(
            aig.and(a, crate::AigEdge::new(9, false)),
            Err(AigError::NodeDoesNotExist(9))
        ));
        // nothing was created
        assert_eq!(aig.len(), 2);
    }
}
