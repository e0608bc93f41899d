//! Choice classes: proved-equivalent structures kept side by side instead of being collapsed.
//!
//! A class is headed by its representative (the earliest node of the class). The head links to
//! the first member through `next_equiv`, each member links to the next one, and every member
//! points back to the head through its representative edge.

use log::debug;

use super::{Aig, AigEdge, AigError, NodeId, Result};

/// Iterator over a choice class: the head first, then every alternative,
/// each given with its phase relative to the head.
pub struct ChoiceIter<'a> {
    aig: &'a Aig,
    next: Option<NodeId>,
}

impl Iterator for ChoiceIter<'_> {
    type Item = AigEdge;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = &self.aig.nodes[id];
        self.next = node.next_equiv;
        Some(AigEdge::new(
            id,
            node.repr.is_some_and(|r| r.complement),
        ))
    }
}

impl Aig {
    /// Iterates over the choice class headed by `head`.
    /// A node heading no class yields itself only, a merged node yields nothing.
    pub fn choices(&self, head: NodeId) -> ChoiceIter<'_> {
        ChoiceIter {
            aig: self,
            next: self
                .nodes
                .get(head)
                .filter(|n| n.repr.is_none())
                .map(|n| n.id),
        }
    }

    /// Heads of the choice classes holding at least one alternative.
    pub fn choice_heads(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|n| n.next_equiv.is_some() && n.repr.is_none() && !n.dead)
            .map(|n| n.id)
    }

    pub fn choice_class_count(&self) -> usize {
        self.choice_heads().count()
    }

    /// Number of alternatives over all the classes (heads excluded).
    pub fn alternative_count(&self) -> usize {
        self.choice_heads()
            .map(|head| self.choices(head).count() - 1)
            .sum()
    }

    /// Is `target` reachable from `from` through fanins and choice links?
    pub(super) fn is_reachable(&self, from: NodeId, target: NodeId) -> bool {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        seen[from] = true;
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            let node = &self.nodes[id];
            let fanins = node.get_fanins().into_iter().flatten().map(|e| e.node);
            for next in fanins.chain(node.next_equiv) {
                if !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        false
    }

    /// Appends `node` at the end of the chain headed by `head`.
    fn link_choice(&mut self, head: NodeId, node: NodeId) {
        let mut last = head;
        while let Some(next) = self.nodes[last].next_equiv {
            last = next;
        }
        self.nodes[last].next_equiv = Some(node);
        self.stats.choices += 1;
    }

    /// Records that the fresh node `id` was proved equal to `repr`.
    ///
    /// When choices are enabled the node is kept as an alternative of its representative,
    /// unless that would close a cycle. Otherwise it is freed if reference counting is on.
    pub(super) fn merge(&mut self, id: NodeId, repr: AigEdge) -> Result<()> {
        self.nodes[id].repr = Some(repr);
        self.stats.merges += 1;
        debug!("n{id} merged into {repr}");

        let mut kept = false;
        if self.params.choicing && self.nodes[repr.node].is_and() {
            if self.is_reachable(id, repr.node) {
                self.stats.cyclic_choices += 1;
                debug!("{}", AigError::CyclicChoice { repr: repr.node, node: id });
            } else {
                self.link_choice(repr.node, id);
                kept = true;
            }
        }
        if !kept && self.params.ref_count {
            self.free_node(id);
        }
        Ok(())
    }

    /// **WARNING**
    ///
    /// Records `node` as an alternative of `repr` (complemented iff `complement`),
    /// without proving anything. If the two nodes do not compute the same function (up to the
    /// given phase), every result built on top of this graph is wrong.
    ///
    /// It is public to let external optimizations import equivalences they proved by other means.
    ///
    /// The request is refused, leaving the graph untouched, when:
    /// - either node does not exist or was freed,
    /// - `repr` is not an earlier AND gate heading (or able to head) a class,
    /// - `node` is not an AND gate, or already has a representative or alternatives,
    /// - `repr` is reachable from `node` ([`AigError::CyclicChoice`]).
    pub fn add_choice(&mut self, repr: NodeId, node: NodeId, complement: bool) -> Result<()> {
        self.check_edge(AigEdge::new(repr, false))?;
        self.check_edge(AigEdge::new(node, false))?;
        if repr >= node {
            return Err(AigError::InvalidChoice(format!(
                "representative {repr} must be created before {node}"
            )));
        }
        let (r, n) = (&self.nodes[repr], &self.nodes[node]);
        if !r.is_and() || !n.is_and() {
            return Err(AigError::InvalidChoice(format!(
                "both {repr} and {node} must be and gates"
            )));
        }
        if r.repr.is_some() {
            return Err(AigError::InvalidChoice(format!(
                "{repr} is itself merged into another node"
            )));
        }
        if n.repr.is_some() || n.next_equiv.is_some() {
            return Err(AigError::InvalidChoice(format!(
                "{node} already belongs to a choice class"
            )));
        }
        if self.is_reachable(node, repr) {
            return Err(AigError::CyclicChoice { repr, node });
        }

        self.ftable_remove(node);
        self.nodes[node].repr = Some(AigEdge::new(repr, complement));
        self.link_choice(repr, node);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{Aig, AigEdge, AigError, FraigParams};

    #[test]
    fn choice_class_test() {
        let mut aig = Aig::with_params(FraigParams::with_choices());
        let a = aig.add_input("a").unwrap();
        let b = aig.add_input("b").unwrap();
        let c = aig.add_input("c").unwrap();
        let ab = aig.and(a, b).unwrap();
        let abc = aig.and(ab, c).unwrap();
        let bc = aig.and(b, c).unwrap();
        let abc2 = aig.and(a, bc).unwrap();
        assert_eq!(abc, abc2);
        assert_eq!(aig.choice_class_count(), 1);
        assert_eq!(aig.alternative_count(), 1);
        let class: Vec<AigEdge> = aig.choices(abc.node).collect();
        assert_eq!(class.len(), 2);
        assert_eq!(class[0], abc);
        // the alternative is still alive
        let alt = aig.get_node(class[1].node).unwrap();
        assert!(!alt.is_dead());
        assert_eq!(alt.repr(), Some(abc));
        assert_eq!(aig.stats().freed, 0);
    }

    #[test]
    fn add_choice_test() {
        let mut aig = Aig::with_params(FraigParams::strash_only());
        let a = aig.add_input("a").unwrap();
        let b = aig.add_input("b").unwrap();
        let c = aig.add_input("c").unwrap();
        let ab = aig.and(a, b).unwrap();
        let abc = aig.and(ab, c).unwrap();
        let bc = aig.and(b, c).unwrap();
        let abc2 = aig.and(a, bc).unwrap();
        assert_ne!(abc, abc2);

        // not an and gate
        assert!(matches!(
            aig.add_choice(a.node, abc2.node, false),
            Err(AigError::InvalidChoice(_))
        ));
        // wrong order
        assert!(matches!(
            aig.add_choice(abc2.node, abc.node, false),
            Err(AigError::InvalidChoice(_))
        ));
        // abc reaches ab
        assert!(matches!(
            aig.add_choice(ab.node, abc.node, false),
            Err(AigError::CyclicChoice { .. })
        ));

        aig.add_choice(abc.node, abc2.node, false).unwrap();
        assert_eq!(aig.choices(abc.node).count(), 2);
        // rebuilding a & (b & c) now lands on the representative
        assert_eq!(aig.and(a, bc).unwrap(), abc);
        // already in a class
        assert!(aig.add_choice(abc.node, abc2.node, false).is_err());
        aig.check_integrity().unwrap();
    }

    #[test]
    fn refused_cyclic_choice_test() {
        let mut aig = Aig::with_params(FraigParams::with_choices());
        let a = aig.add_input("a").unwrap();
        let b = aig.add_input("b").unwrap();
        let ab = aig.and(a, b).unwrap();
        let anb = aig.and(a, !b).unwrap();
        // (a & b) | (a & !b) = a, but a is a leaf: it never heads a class
        let x = aig.or(ab, anb).unwrap();
        assert_eq!(x, a);
        assert_eq!(aig.choice_class_count(), 0);

        let c = aig.add_input("c").unwrap();
        let abc = aig.and(ab, c).unwrap();
        // a & (ab & c) is proved equal to abc, which lies in its own fanin
        let y = aig.and(abc, a).unwrap();
        assert_eq!(y, abc);
        assert_eq!(aig.stats().cyclic_choices, 1);
        assert_eq!(aig.choice_class_count(), 0);
        assert_eq!(aig.stats().freed, 2);
        aig.check_integrity().unwrap();
    }

    #[test]
    fn reachability_test() {
        let mut aig = Aig::with_params(FraigParams::strash_only());
        let a = aig.add_input("a").unwrap();
        let b = aig.add_input("b").unwrap();
        let ab = aig.and(a, b).unwrap();
        let c = aig.add_input("c").unwrap();
        let abc = aig.and(ab, c).unwrap();
        assert!(aig.is_reachable(abc.node, a.node));
        assert!(aig.is_reachable(abc.node, abc.node));
        assert!(!aig.is_reachable(ab.node, c.node));
        assert!(!aig.is_reachable(a.node, ab.node));
    }
}
