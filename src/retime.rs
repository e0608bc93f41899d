//! Minimum clock period search under retiming.
//!
//! A trial period `Fi` is checked with l-values: each node gets a lower bound on the arrival
//! time of its signal once latches are moved around. Primary inputs arrive at 0, an AND gate
//! arrives one step after its latest fanin, and a latch output arrives `Fi` steps before its
//! input. The l-values are relaxed until they reach a fixed point: if no primary output
//! arrives after `Fi`, the period is feasible.
//!
//! Choice classes are taken into account: the head of a class arrives as early as its
//! earliest alternative.
//!
//! For background, check
//! [Optimal clock period FPGA technology mapping for sequential circuits](https://doi.org/10.1145/293625.293628)
//! by P. Pan and C.L. Liu.
//!
//! ```rust
//! use fraigs::{Aig, retime::Retimer};
//! let mut aig = Aig::new();
//! let x: Vec<_> = (0..5).map(|k| aig.add_input(&format!("x{k}")).unwrap()).collect();
//! let mut chain = x[0];
//! for &xk in &x[1..] {
//!     chain = aig.and(chain, xk).unwrap();
//! }
//! let l = aig.add_latch("l", None).unwrap();
//! aig.set_latch_next(l.get_node_id(), chain).unwrap();
//! aig.add_output("z", l).unwrap();
//! // the latch can be moved in the middle of the chain
//! let result = Retimer::new(&aig).min_period();
//! assert_eq!((result.period, result.depth), (2, 4));
//! ```

use std::fmt::Display;

use log::debug;

use crate::{Aig, NodeId, NodeKind};

const NEG_INF: i64 = i64::MIN;

/// Knobs of the retiming search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetimeParams {
    /// Maximum number of relaxation passes per trial.
    /// By default, `latches + 2`, times `alternatives + 1` when choices are present.
    pub max_passes: Option<usize>,
}

/// Why a trial period was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfeasibleReason {
    /// A primary output arrives after the period.
    OutputTooLate { output: usize, arrival: i64 },
    /// The l-values kept changing until the pass cap.
    NoFixedPoint { passes: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feasibility {
    /// The l-values settled after the given number of passes.
    Feasible { passes: usize },
    Infeasible(InfeasibleReason),
}

impl Feasibility {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Feasibility::Feasible { .. })
    }
}

impl Display for Feasibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feasibility::Feasible { passes } => write!(f, "feasible after {passes} passes"),
            Feasibility::Infeasible(InfeasibleReason::OutputTooLate { output, arrival }) => {
                write!(f, "infeasible: output {output} arrives at {arrival}")
            }
            Feasibility::Infeasible(InfeasibleReason::NoFixedPoint { passes }) => {
                write!(f, "infeasible: no fixed point after {passes} passes")
            }
        }
    }
}

/// Outcome of [`Retimer::min_period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetimeResult {
    /// Smallest feasible period.
    pub period: u32,
    /// Period of the circuit as it is (longest combinational path), the upper bound of the search.
    pub depth: u32,
    /// Feasibility trials run by the binary search.
    pub trials: usize,
}

impl Display for RetimeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "minimum feasible period {} (depth {}, {} trials)",
            self.period, self.depth, self.trials
        )
    }
}

/// Runs feasibility trials over a borrowed graph.
///
/// L-values and traversal ids belong to the retimer: the graph is never modified,
/// and stays borrowed for the lifetime of the retimer.
#[derive(Debug)]
pub struct Retimer<'a> {
    aig: &'a Aig,
    params: RetimeParams,
    lvalues: Vec<i64>,
    /// A node whose traversal id is the current one has an up to date l-value.
    trav_ids: Vec<u64>,
    trav_id: u64,
}

impl<'a> Retimer<'a> {
    pub fn new(aig: &'a Aig) -> Self {
        Retimer::with_params(aig, RetimeParams::default())
    }

    pub fn with_params(aig: &'a Aig, params: RetimeParams) -> Self {
        Retimer {
            aig,
            params,
            lvalues: vec![NEG_INF; aig.len()],
            trav_ids: vec![0; aig.len()],
            trav_id: 0,
        }
    }

    /// Maximum number of relaxation passes of one trial.
    pub fn pass_cap(&self) -> usize {
        self.params.max_passes.unwrap_or_else(|| {
            (self.aig.get_latches().len() + 2) * (self.aig.alternative_count() + 1)
        })
    }

    /// L-value of a node after the last trial, [`None`] if it is minus infinity.
    pub fn lvalue(&self, id: NodeId) -> Option<i64> {
        self.lvalues.get(id).copied().filter(|&lv| lv != NEG_INF)
    }

    fn reset(&mut self) {
        let aig = self.aig;
        self.lvalues.fill(NEG_INF);
        for &input in aig.get_inputs() {
            self.lvalues[input] = 0;
        }
    }

    /// Computes the l-value of `root` (and of its cone) for the current pass.
    fn eval(&mut self, root: NodeId) -> i64 {
        let aig = self.aig;
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if self.trav_ids[id] == self.trav_id {
                continue;
            }
            let Some(node) = aig.get_node(id) else {
                continue;
            };
            let NodeKind::And { fanin0, fanin1 } = *node.kind() else {
                // inputs and latches keep their value, the constant stays at minus infinity
                self.trav_ids[id] = self.trav_id;
                continue;
            };
            // alternatives only hang below the head of a class
            let alternatives = aig.choices(id).skip(1).map(|e| e.get_node_id());

            if !expanded {
                stack.push((id, true));
                for child in [fanin0.get_node_id(), fanin1.get_node_id()]
                    .into_iter()
                    .chain(alternatives)
                {
                    if self.trav_ids[child] != self.trav_id {
                        stack.push((child, false));
                    }
                }
                continue;
            }

            let latest = self.lvalues[fanin0.get_node_id()].max(self.lvalues[fanin1.get_node_id()]);
            let own = if latest == NEG_INF { NEG_INF } else { latest + 1 };
            let lvalue = alternatives.fold(own, |lv, alt| lv.min(self.lvalues[alt]));
            self.lvalues[id] = lvalue;
            self.trav_ids[id] = self.trav_id;
        }
        self.lvalues[root]
    }

    /// One relaxation pass. Fails as soon as a primary output arrives after `period`.
    fn pass(&mut self, period: u32) -> Result<(), InfeasibleReason> {
        self.trav_id += 1;
        for (output, edge) in self.aig.get_outputs().into_iter().enumerate() {
            let arrival = self.eval(edge.get_node_id());
            if arrival > i64::from(period) {
                return Err(InfeasibleReason::OutputTooLate { output, arrival });
            }
        }
        for edge in self.aig.latch_inputs() {
            self.eval(edge.get_node_id());
        }
        Ok(())
    }

    /// Moves every latch output to `input - period` if that is later. Returns true on change.
    fn update_latches(&mut self, period: u32) -> bool {
        let aig = self.aig;
        let mut changed = false;
        for &latch in aig.get_latches() {
            let Some(next) = aig.get_node(latch).and_then(|n| n.get_latch_next()) else {
                continue;
            };
            let next = aig.canonical(next).get_node_id();
            if self.lvalues[next] == NEG_INF {
                continue;
            }
            let candidate = self.lvalues[next] - i64::from(period);
            if candidate > self.lvalues[latch] {
                self.lvalues[latch] = candidate;
                changed = true;
            }
        }
        changed
    }

    /// Checks whether the circuit can be retimed to run at the given period.
    pub fn is_feasible(&mut self, period: u32) -> Feasibility {
        self.reset();
        let cap = self.pass_cap();
        for passes in 1..=cap {
            if let Err(reason) = self.pass(period) {
                return Feasibility::Infeasible(reason);
            }
            if !self.update_latches(period) {
                return Feasibility::Feasible { passes };
            }
        }
        Feasibility::Infeasible(InfeasibleReason::NoFixedPoint { passes: cap })
    }

    /// Binary search of the smallest feasible period in `[0, depth]`.
    /// The circuit as it is runs at its depth, so that bound is never tried.
    pub fn min_period(&mut self) -> RetimeResult {
        let depth = self.aig.depth();
        let (mut lo, mut hi) = (0, depth);
        let mut trials = 0;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            trials += 1;
            let feasibility = self.is_feasible(mid);
            debug!("period {mid}: {feasibility}");
            if feasibility.is_feasible() {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        RetimeResult {
            period: hi,
            depth,
            trials,
        }
    }
}

impl Aig {
    /// Smallest clock period reachable by retiming, see [`Retimer`].
    pub fn min_feasible_period(&self) -> RetimeResult {
        Retimer::new(self).min_period()
    }
}
