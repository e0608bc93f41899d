//! CNF encoding of AIG cones, as consumed by the embedded SAT solver ([`crate::sat`]).
//!
//! Every AND gate `z = AND(a, b)` contributes the usual Tseitin template:
//! `[a, !z]`, `[b, !z]` and `[!a, !b, z]`.
//!
//! The constant node does not map to any literal: false literals are removed from clauses
//! and clauses containing a true literal are not emitted at all (see the internal `LitRes`).
//!
//! To prove two edges equivalent, check [`crate::miter::Miter`].

use std::{collections::HashMap, fmt::Display, ops::Not};

use crate::{AigEdge, AigNode, NodeId, NodeKind, Result, miter::MiterError};

/// A SAT literal, in DIMACS convention: variable `v` (starting at 1) is `v`, its negation `-v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit(i64);

impl Not for Lit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Lit(-self.0)
    }
}

impl From<i64> for Lit {
    fn from(value: i64) -> Self {
        if value == 0 {
            panic!("Tried to create a Lit from 0. 0 is not a valid literal in DIMACS format.");
        }
        Lit(value)
    }
}

impl Lit {
    /// Zero-based index of the variable.
    pub fn var(&self) -> usize {
        (self.0.unsigned_abs() - 1) as usize
    }

    pub fn is_negated(&self) -> bool {
        self.0 < 0
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

/// A literal, or a constant once the constant node has been folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LitRes {
    False,
    True,
    Lit(Lit),
}

impl Not for LitRes {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            LitRes::False => LitRes::True,
            LitRes::True => LitRes::False,
            LitRes::Lit(lit) => LitRes::Lit(!lit),
        }
    }
}

impl From<Lit> for LitRes {
    fn from(value: Lit) -> Self {
        LitRes::Lit(value)
    }
}

/// A SAT clause. The empty clause is unsatisfiable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause(Vec<Lit>);

impl Clause {
    /// Returns the true SAT clause once we got rid of `True` and `False` literals.
    /// If there is a `True`, then the Clause is obviously satisfied, so we return None.
    /// `False` literals are omitted. If only `False` literals were given,
    /// the empty (unsatisfiable) clause is returned.
    fn from_lit_res(lits: &[LitRes]) -> Option<Clause> {
        let mut literals = Vec::with_capacity(lits.len());

        for &lit_res in lits {
            match lit_res {
                LitRes::True => return None,
                LitRes::False => (),
                LitRes::Lit(lit) => literals.push(lit),
            }
        }

        Some(Clause(literals))
    }

    pub fn lits(&self) -> &[Lit] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Lit>> for Clause {
    fn from(value: Vec<Lit>) -> Self {
        Clause(value)
    }
}

/// A SAT CNF that can be passed to a SAT solver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cnf(Vec<Clause>);

impl Cnf {
    /// A new empty CNF.
    pub fn new() -> Self {
        Cnf(Vec::new())
    }

    /// Add the given clause to the CNF.
    pub fn add_clause(&mut self, clause: Clause) {
        self.0.push(clause);
    }

    /// Add the given clause to the CNF, else does nothing.
    pub fn add_clause_if(&mut self, clause: Option<Clause>) {
        if let Some(c) = clause {
            self.add_clause(c);
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of variables, ie the largest variable index used.
    pub fn num_vars(&self) -> usize {
        self.0
            .iter()
            .flat_map(|c| c.0.iter())
            .map(|l| l.var() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Add clauses induced by the node.
    pub fn add_clauses_node(&mut self, node: &AigNode, litmap: &HashMap<NodeId, Lit>) -> Result<()> {
        // Leaves do not induce any clause, they only generate literals.
        if let NodeKind::And { fanin0, fanin1 } = node.kind() {
            let a = fanin0.get_literal_res(litmap)?;
            let b = fanin1.get_literal_res(litmap)?;
            let id = node.get_id();
            let z = LitRes::from(*litmap.get(&id).ok_or(MiterError::UnmappedNodeToLit(id))?);

            self.add_clause_if(Clause::from_lit_res(&[a, !z]));
            self.add_clause_if(Clause::from_lit_res(&[b, !z]));
            self.add_clause_if(Clause::from_lit_res(&[!a, !b, z]));
        }
        Ok(())
    }

    /// Add clauses that encode `XOR(a, b) = true`.
    ///
    /// This is the output of the miter between two nodes: the CNF is UNSAT iff they are equivalent.
    pub(crate) fn add_xor_whose_output_is_true(&mut self, a: LitRes, b: LitRes) {
        self.add_clause_if(Clause::from_lit_res(&[a, b]));
        self.add_clause_if(Clause::from_lit_res(&[!a, !b]));
    }
}

impl Display for Cnf {
    /// DIMACS format.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars(), self.len())?;
        for clause in &self.0 {
            for lit in &clause.0 {
                write!(f, "{} ", lit.0)?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}

impl AigEdge {
    pub(crate) fn get_literal_res(&self, litmap: &HashMap<NodeId, Lit>) -> Result<LitRes> {
        let lit = if self.node == 0 {
            LitRes::False
        } else {
            LitRes::from(
                *litmap
                    .get(&self.node)
                    .ok_or(MiterError::UnmappedNodeToLit(self.node))?,
            )
        };
        Ok(if self.complement { !lit } else { lit })
    }
}
