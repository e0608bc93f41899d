use std::{collections::HashMap, fmt::Display};

use log::trace;
use thiserror::Error;

use crate::{
    Aig, AigEdge, AigError, NodeId, Result,
    cnf::{Cnf, Lit},
    dfs::Dfs,
    sat::{SolveResult, Solver},
};

/// Error returned when an operation related to the miter fails.
#[derive(Debug, Error)]
pub enum MiterError {
    /// A node was not mapped to any SAT literal in the miter.
    #[error("node id {0} is not mapped to any literal")]
    UnmappedNodeToLit(NodeId),
}

/// An assignment of the leaves of a miter under which its two edges differ.
///
/// Leaves outside the cones of the two edges are not assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counterexample {
    /// Sorted by node id.
    values: Vec<(NodeId, bool)>,
}

impl Counterexample {
    /// Value given to a leaf, [`None`] if the leaf is not part of the counterexample.
    pub fn value(&self, id: NodeId) -> Option<bool> {
        self.values
            .binary_search_by_key(&id, |&(n, _)| n)
            .ok()
            .map(|k| self.values[k].1)
    }

    /// Assigned leaves, by increasing id.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, bool)> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Display for Counterexample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let assignments: Vec<String> = self
            .values
            .iter()
            .map(|&(id, v)| format!("n{id}={}", u8::from(v)))
            .collect();
        write!(f, "{}", assignments.join(" "))
    }
}

/// The answer of the SAT resolver about two edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The miter is UNSAT: both edges compute the same function.
    Equivalent,
    /// The miter is SAT: the edges differ under the given assignment.
    Inequivalent(Counterexample),
    /// The conflict budget ran out before a decision was reached.
    Unknown,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Equivalent => write!(f, "equivalent"),
            Verdict::Inequivalent(cex) => write!(f, "inequivalent under {cex}"),
            Verdict::Unknown => write!(f, "unknown (backtrack limit reached)"),
        }
    }
}

/// The struct used to perform combinational equivalence checking between two edges of an AIG.
///
/// For background on what is a miter, please check
/// [Verification of large synthesized designs](https://doi.org/10.1109/ICCAD.1993.580110) by D. Brand.
///
/// The CNF covers the union of the fanin cones of both edges, plus the clauses asserting
/// that they differ. Leaves (inputs and latch outputs) are free variables.
///
/// To use this struct:
/// - create a new miter with [`new`],
/// - then call [`solve`] with an optional conflict budget.
///
/// Building or solving a miter never modifies the AIG.
///
/// ```rust
/// use fraigs::{Aig, FraigParams, miter::{Miter, Verdict}};
/// let mut aig = Aig::with_params(FraigParams::strash_only());
/// let a = aig.add_input("a").unwrap();
/// let b = aig.add_input("b").unwrap();
/// let x = aig.or(a, b).unwrap();
/// let y = aig.and(!a, !b).unwrap();
/// let miter = Miter::new(&aig, x, !y).unwrap();
/// assert_eq!(miter.solve(None), Verdict::Equivalent);
/// ```
///
/// [`new`]: Miter::new
/// [`solve`]: Miter::solve
#[derive(Debug, Clone)]
pub struct Miter {
    a: AigEdge,
    b: AigEdge,
    cnf: Cnf,
    /// Associating a SAT literal to each node of the cones (the constant node excepted).
    litmap: HashMap<NodeId, Lit>,
    /// Leaves of the cones, by increasing id.
    leaves: Vec<NodeId>,
}

impl Miter {
    /// Create the miter between two edges of the same AIG.
    ///
    /// This will fail if one of the edges refers to a node that does not exist or was freed.
    pub fn new(aig: &Aig, a: AigEdge, b: AigEdge) -> Result<Self> {
        aig.check_edge(a)?;
        aig.check_edge(b)?;

        let mut litmap = HashMap::new();
        let mut leaves = Vec::new();
        let mut gates = Vec::new();
        let mut next_lit = 1;

        let mut dfs = Dfs::from_nodes([a.get_node_id(), b.get_node_id()]);
        while let Some(id) = dfs.next(aig) {
            let node = aig.get_node(id).ok_or(AigError::NodeDoesNotExist(id))?;
            if node.is_false() {
                continue;
            }
            litmap.insert(id, Lit::from(next_lit));
            next_lit += 1;
            if node.is_and() {
                gates.push(id);
            } else {
                leaves.push(id);
            }
        }
        leaves.sort_unstable();

        let mut cnf = Cnf::new();
        for id in gates {
            let node = aig.get_node(id).ok_or(AigError::NodeDoesNotExist(id))?;
            cnf.add_clauses_node(node, &litmap)?;
        }
        cnf.add_xor_whose_output_is_true(a.get_literal_res(&litmap)?, b.get_literal_res(&litmap)?);

        Ok(Miter {
            a,
            b,
            cnf,
            litmap,
            leaves,
        })
    }

    pub fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    /// Runs the embedded SAT solver on the miter.
    ///
    /// `conflict_limit` bounds the number of backtracks, [`None`] means unbounded.
    pub fn solve(&self, conflict_limit: Option<u64>) -> Verdict {
        let mut solver = Solver::from_cnf(&self.cnf);
        let result = solver.solve(conflict_limit);
        trace!(
            "miter {} vs {}: {} vars, {} clauses, {} conflicts, {:?}",
            self.a,
            self.b,
            solver.num_vars(),
            self.cnf.len(),
            solver.stats().conflicts,
            result
        );
        match result {
            SolveResult::Unsat => Verdict::Equivalent,
            SolveResult::Unknown => Verdict::Unknown,
            SolveResult::Sat => Verdict::Inequivalent(Counterexample {
                values: self
                    .leaves
                    .iter()
                    .map(|&id| {
                        let value = self
                            .litmap
                            .get(&id)
                            .and_then(|&lit| solver.value(lit))
                            .unwrap_or(false);
                        (id, value)
                    })
                    .collect(),
            }),
        }
    }
}
