//! A small CDCL SAT solver, used as the equivalence oracle of [`crate::miter::Miter`].
//!
//! It is scoped to bounded equivalence queries: every call to [`Solver::solve`] can be given a
//! conflict budget, and gives up with [`SolveResult::Unknown`] once it is exhausted.
//!
//! The usual ingredients are there:
//! - two watched literals (with blockers) for unit propagation,
//! - VSIDS decisions with phase saving,
//! - first UIP learning with local minimization of the learnt clause,
//! - Luby restarts,
//! - periodic reduction of the learnt clauses, based on their LBD and activity.
//!
//! For background, check
//! [An Extensible SAT-solver](https://doi.org/10.1007/978-3-540-24605-3_37) by N. Eén and N. Sörensson.
//!
//! ```rust
//! use fraigs::{cnf::{Clause, Cnf, Lit}, sat::{Solver, SolveResult}};
//! let mut cnf = Cnf::new();
//! cnf.add_clause(Clause::from(vec![Lit::from(1), Lit::from(2)]));
//! cnf.add_clause(Clause::from(vec![Lit::from(-1)]));
//! let mut solver = Solver::from_cnf(&cnf);
//! assert_eq!(solver.solve(None), SolveResult::Sat);
//! assert_eq!(solver.value(Lit::from(2)), Some(true));
//! ```

mod heap;
mod solver;
mod types;

pub use solver::{SolveResult, Solver, SolverStats};
pub use types::{LBool, Literal, Var};
