pub mod aig;
pub mod cnf;
pub mod miter;
pub mod retime;
pub mod sat;

// Re-exporting symbols and modules.
pub use aig::dfs;
pub use aig::{
    Aig, AigEdge, AigError, AigNode, ChoiceIter, FraigParams, FraigStats, NodeId, NodeKind, Result,
};
pub use miter::{Counterexample, Miter, Verdict};
pub use retime::{Feasibility, RetimeParams, RetimeResult, Retimer};
