//! Provides a DFS visitor to allow simple AIG traversal.
//!
//! See [`Dfs`] for details.
//!
//! [`Dfs`]: Dfs

use std::collections::HashSet;

use crate::{Aig, NodeId};

/// A simple DFS visitor over fanin cones.
///
/// Nodes are yielded in preorder. You can:
/// - start a DFS from a node using [`from_node`],
/// - start from several nodes using [`from_nodes`],
/// - or visit the whole logic by starting from the outputs and latch inputs using [`from_outputs`].
///
/// In the latter cases, it will start by the fanin of the last start,
/// then explore all non-previously-explored nodes from the fanin of the previous one,
/// and so on until all the starts have been processed.
///
/// Only fanins are followed: choice links and latch next-state edges are not.
///
/// [`from_node`]: Dfs::from_node
/// [`from_nodes`]: Dfs::from_nodes
/// [`from_outputs`]: Dfs::from_outputs
///
/// Example:
///
/// ```rust
/// use fraigs::{Aig, dfs::Dfs};
/// let mut aig = Aig::new();
/// let a = aig.add_input("a").unwrap();
/// let b = aig.add_input("b").unwrap();
/// let ab = aig.and(a, b).unwrap();
/// aig.add_output("z", ab).unwrap();
/// let mut dfs = Dfs::from_outputs(&aig);
/// let mut count = 0;
/// while let Some(id) = dfs.next(&aig) {
///     // ids are plain handles, aig can be borrowed again here
///     assert!(aig.get_node(id).is_some());
///     count += 1;
/// }
/// assert_eq!(count, 3);
/// ```
///
/// Inspired by [petgraph DFS](https://docs.rs/petgraph/latest/petgraph/visit/struct.Dfs.html).
#[derive(Debug, Clone, Default)]
pub struct Dfs {
    /// Must maintain the following invariant:
    /// - all nodes on the stack have not been visited yet
    /// - they are in `seen` to avoid adding them one more time to the stack
    /// - the different nodes from which to start a DFS are in starts
    ///   (they might have been visited already by the time we start the DFS from them,
    ///   and will simply be discarded if that's the case).
    stack: Vec<NodeId>,
    seen: HashSet<NodeId>,
    starts: Vec<NodeId>,
}

impl Dfs {
    /// Create a DFS from the initial start node.
    /// You will only browse the fanin of this node.
    pub fn from_node(start: NodeId) -> Self {
        Dfs {
            stack: vec![start],
            seen: HashSet::from([start]),
            starts: Vec::new(),
        }
    }

    /// Create a DFS browsing the union of the fanins of the given nodes.
    pub fn from_nodes(starts: impl IntoIterator<Item = NodeId>) -> Self {
        let mut starts: Vec<NodeId> = starts.into_iter().collect();
        match starts.pop() {
            None => Dfs::default(),
            Some(first) => Dfs {
                stack: vec![first],
                seen: HashSet::from([first]),
                starts,
            },
        }
    }

    /// Create a DFS from the outputs (then the latch inputs) of the given AIG,
    /// redirected through representatives.
    pub fn from_outputs(aig: &Aig) -> Self {
        Dfs::from_nodes(
            aig.latch_inputs()
                .into_iter()
                .rev()
                .chain(aig.get_outputs().into_iter().rev())
                .map(|e| e.get_node_id()),
        )
    }

    /// Returns true if we are ready to start again! Else false, we are done.
    /// Should only be called when stack is empty (ie we are done with the current fanin).
    fn new_start(&mut self) -> bool {
        while let Some(id) = self.starts.pop() {
            if self.seen.insert(id) {
                self.stack.push(id);
                return true;
            }
        }
        false
    }

    /// Yield the next node of the DFS, or None if it is done.
    /// This might be a new start if the current fanin has been fully explored.
    pub fn next(&mut self, aig: &Aig) -> Option<NodeId> {
        loop {
            if let Some(id) = self.stack.pop() {
                if let Some(fanins) = aig.get_node(id).and_then(|n| n.get_fanins()) {
                    for child in fanins {
                        if self.seen.insert(child.get_node_id()) {
                            self.stack.push(child.get_node_id());
                        }
                    }
                }
                return Some(id);
            }

            // Maybe we can start from a different node?
            if !self.new_start() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::FraigParams;

    #[test]
    fn from_node_test() {
        let mut aig = Aig::with_params(FraigParams::strash_only());
        let n1 = aig.add_input("a").unwrap();
        let n2 = aig.add_input("b").unwrap();
        let n3 = aig.and(n1, !n2).unwrap();

        let mut dfs = Dfs::from_node(n3.get_node_id());
        assert_eq!(dfs.next(&aig), Some(n3.get_node_id())); // first node is known
        let mut rest = vec![dfs.next(&aig).unwrap(), dfs.next(&aig).unwrap()];
        rest.sort();
        assert_eq!(rest, vec![n1.get_node_id(), n2.get_node_id()]);
        // Now there shouldn't be anything
        assert!(dfs.next(&aig).is_none());
        assert!(dfs.next(&aig).is_none());
    }

    #[test]
    fn from_outputs_test() {
        let mut aig = Aig::with_params(FraigParams::strash_only());
        let a = aig.add_input("a").unwrap();
        let b = aig.add_input("b").unwrap();
        let ab = aig.and(a, b).unwrap();
        let c = aig.add_input("c").unwrap();
        let abc = aig.and(ab, c).unwrap();
        let l = aig.add_latch("l", None).unwrap();
        let d = aig.add_input("d").unwrap();
        let ld = aig.and(l, d).unwrap();
        aig.set_latch_next(l.get_node_id(), ld).unwrap();
        aig.add_output("x", ab).unwrap();
        aig.add_output("y", !abc).unwrap();

        let mut dfs = Dfs::from_outputs(&aig);
        let mut order = Vec::new();
        while let Some(id) = dfs.next(&aig) {
            order.push(id);
        }
        // the first output comes first, then the second one which reaches it
        assert_eq!(order[0], ab.get_node_id());
        assert_eq!(order[3], abc.get_node_id());
        assert_eq!(order[4], c.get_node_id());
        // then the latch input
        assert_eq!(order[5], ld.get_node_id());
        assert_eq!(order.len(), 8);
        assert!(!order.contains(&0));
    }

    #[test]
    fn repeated_node() {
        let mut aig = Aig::with_params(FraigParams::strash_only());
        let n1 = aig.add_input("a").unwrap();
        let n2 = aig.add_input("b").unwrap();
        let n3 = aig.and(n1, n2).unwrap();
        let n4 = aig.and(n3, !n1).unwrap();
        // one hop rewrote it to the constant
        assert!(n4.is_cst_false());
        let n5 = aig.and(!n3, n2).unwrap();
        let mut dfs = Dfs::from_nodes([n5.get_node_id(), n3.get_node_id()]);
        let mut count = 0;
        while dfs.next(&aig).is_some() {
            count += 1;
        }
        assert_eq!(count, 4);
    }
}
