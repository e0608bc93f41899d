use std::collections::HashSet;

use crate::{Aig, AigEdge, AigError, AigNode, NodeKind, Result};

impl Aig {
    /// Checking if the AIG structure is correct.
    /// This function was written for debug purposes, as the library is supposed to maintain
    /// integrity of the AIG at any moment.
    ///
    /// It checks that:
    /// - node ids match their position, node 0 being the only constant,
    /// - fanins point to earlier nodes, and live gates do not point to freed ones,
    /// - the structural table is coherent with the gates,
    /// - representatives are earlier nodes without representative themselves,
    /// - choice classes are well linked and acyclic,
    /// - outputs and latch inputs do not point to freed nodes,
    /// - reference counts match the actual fanouts.
    pub fn check_integrity(&self) -> Result<()> {
        match self.nodes.first() {
            Some(n) if n.is_false() => (),
            _ => {
                return Err(AigError::InvalidState(
                    "node 0 must be the constant node".to_string(),
                ));
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if node.get_id() != index {
                return Err(AigError::InvalidState(format!(
                    "node at position {} has id {}",
                    index,
                    node.get_id()
                )));
            }
            self.check_node_integrity(node)?;
        }

        for (k, &id) in self.inputs.iter().enumerate() {
            if self.nodes[id].kind != (NodeKind::Input { index: k }) {
                return Err(AigError::InvalidState(format!(
                    "input #{k} refers to node {id} which is not that input"
                )));
            }
        }
        for (k, &id) in self.latches.iter().enumerate() {
            if !matches!(self.nodes[id].kind, NodeKind::Latch { index, .. } if index == k) {
                return Err(AigError::InvalidState(format!(
                    "latch #{k} refers to node {id} which is not that latch"
                )));
            }
        }

        self.check_strash_integrity()?;
        self.check_choice_integrity()?;

        for output in &self.outputs {
            self.check_edge_integrity(output)?;
        }

        self.check_refs_integrity()
    }

    /// Check the integrity for an individual node, that is:
    /// - only the node with id 0 is constant
    /// - fanins of and gates and the next state of latches refer to known nodes
    /// - its representative, if any, is an earlier node which has no representative.
    fn check_node_integrity(&self, node: &AigNode) -> Result<()> {
        let id = node.get_id();
        match &node.kind {
            NodeKind::False => {
                if id != 0 {
                    return Err(AigError::InvalidState(format!(
                        "node {id} is constant but only node 0 may be"
                    )));
                }
            }
            NodeKind::Input { .. } => (),
            NodeKind::Latch { next, .. } => {
                if let Some(next) = next {
                    self.check_edge_integrity(next)?;
                }
            }
            NodeKind::And { fanin0, fanin1 } => {
                if fanin0 >= fanin1 {
                    return Err(AigError::InvalidState(format!(
                        "fanins of {id} are not ordered: {fanin0} >= {fanin1}"
                    )));
                }
                for fanin in [fanin0, fanin1] {
                    if fanin.node >= id {
                        return Err(AigError::InvalidState(format!(
                            "fanin {fanin} of {id} is not an earlier node"
                        )));
                    }
                    if !node.dead {
                        self.check_edge_integrity(fanin)?;
                    }
                }
            }
        }

        if let Some(repr) = node.repr {
            if repr.node >= id {
                return Err(AigError::InvalidState(format!(
                    "representative {repr} of {id} is not an earlier node"
                )));
            }
            if self.nodes[repr.node].repr.is_some() {
                return Err(AigError::InvalidState(format!(
                    "representative {repr} of {id} is itself merged"
                )));
            }
        }
        Ok(())
    }

    fn check_edge_integrity(&self, edge: &AigEdge) -> Result<()> {
        match self.nodes.get(edge.node) {
            None => Err(AigError::InvalidState(format!(
                "edge pointing at node {} which is not in the AIG",
                edge.node
            ))),
            Some(n) if n.dead => Err(AigError::InvalidState(format!(
                "edge pointing at node {} which has been freed",
                edge.node
            ))),
            Some(_) => Ok(()),
        }
    }

    fn check_strash_integrity(&self) -> Result<()> {
        for (&(fanin0, fanin1), &id) in &self.strash {
            let node = self.nodes.get(id).ok_or(AigError::InvalidState(format!(
                "structural table refers to node {id} which is not in the AIG"
            )))?;
            if node.get_fanins() != Some([fanin0, fanin1]) {
                return Err(AigError::InvalidState(format!(
                    "structural table maps ({fanin0}, {fanin1}) to {id} which has other fanins"
                )));
            }
            if node.dead && node.repr.is_none() {
                return Err(AigError::InvalidState(format!(
                    "structural table maps ({fanin0}, {fanin1}) to {id} which was freed without representative"
                )));
            }
        }
        for node in self.nodes.iter().filter(|n| !n.dead && n.repr.is_none()) {
            if let Some([fanin0, fanin1]) = node.get_fanins() {
                if self.strash.get(&(fanin0, fanin1)) != Some(&node.id) {
                    return Err(AigError::InvalidState(format!(
                        "gate {} is missing from the structural table",
                        node.id
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_choice_integrity(&self) -> Result<()> {
        let mut members = HashSet::new();
        for head in self.choice_heads() {
            let mut next = self.nodes[head].next_equiv;
            while let Some(member) = next {
                if !members.insert(member) {
                    return Err(AigError::InvalidState(format!(
                        "node {member} appears twice in choice chains"
                    )));
                }
                let node = self.nodes.get(member).ok_or(AigError::InvalidState(format!(
                    "choice chain of {head} refers to node {member} which is not in the AIG"
                )))?;
                if node.dead || node.repr.map(|r| r.node) != Some(head) {
                    return Err(AigError::InvalidState(format!(
                        "node {member} is in the choice chain of {head} but does not point to it"
                    )));
                }
                if self.is_reachable(member, head) {
                    return Err(AigError::InvalidState(
                        AigError::CyclicChoice { repr: head, node: member }.to_string(),
                    ));
                }
                next = node.next_equiv;
            }
        }
        Ok(())
    }

    fn check_refs_integrity(&self) -> Result<()> {
        let mut refs = vec![0u32; self.nodes.len()];
        for node in self.nodes.iter().filter(|n| !n.dead) {
            let fanins = node.get_fanins().into_iter().flatten();
            for edge in fanins.chain(node.get_latch_next()) {
                refs[edge.node] += 1;
            }
        }
        for output in &self.outputs {
            refs[output.node] += 1;
        }
        for (node, &expected) in self.nodes.iter().zip(&refs) {
            if node.refs != expected {
                return Err(AigError::InvalidState(format!(
                    "node {} counts {} references but has {}",
                    node.id, node.refs, expected
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{Aig, AigError, FraigParams};

    #[test]
    fn valid_test() {
        for params in [
            FraigParams::strash_only(),
            FraigParams::default(),
            FraigParams::with_choices(),
            FraigParams {
                ref_count: false,
                ..FraigParams::default()
            },
        ] {
            let mut aig = Aig::with_params(params);
            let a = aig.add_input("a").unwrap();
            let b = aig.add_input("b").unwrap();
            let c = aig.add_input("c").unwrap();
            let l = aig.add_latch("l", Some(true)).unwrap();
            let ab = aig.and(a, b).unwrap();
            let abc = aig.and(ab, c).unwrap();
            let bc = aig.and(b, c).unwrap();
            let abc2 = aig.and(a, bc).unwrap();
            let x = aig.xor(abc2, l).unwrap();
            aig.set_latch_next(l.get_node_id(), x).unwrap();
            aig.add_output("abc", abc).unwrap();
            aig.add_output("x", !x).unwrap();
            aig.check_integrity().unwrap();
        }
    }

    #[test]
    fn corrupted_refs_test() {
        let mut aig = Aig::new();
        let a = aig.add_input("a").unwrap();
        let b = aig.add_input("b").unwrap();
        let ab = aig.and(a, b).unwrap();
        aig.add_output("z", ab).unwrap();
        aig.check_integrity().unwrap();
        aig.nodes[ab.get_node_id()].refs = 0;
        assert!(matches!(
            aig.check_integrity(),
            Err(AigError::InvalidState(_))
        ));
    }

    #[test]
    fn corrupted_strash_test() {
        let mut aig = Aig::with_params(FraigParams::strash_only());
        let a = aig.add_input("a").unwrap();
        let b = aig.add_input("b").unwrap();
        aig.and(a, b).unwrap();
        aig.strash.clear();
        assert!(aig.check_integrity().is_err());
    }
}
