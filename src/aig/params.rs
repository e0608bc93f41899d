//! Knobs of functional reduction, see [`FraigParams`].

/// Parameters of a functionally reduced AIG.
///
/// ```rust
/// use fraigs::{Aig, FraigParams};
/// let params = FraigParams {
///     choicing: true,
///     backtrack_limit: None,
///     ..FraigParams::default()
/// };
/// let aig = Aig::with_params(params);
/// assert!(aig.params().choicing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FraigParams {
    /// Merge functionally equivalent nodes. When disabled, only structural hashing is performed.
    pub functional_reduction: bool,
    /// Feed counterexamples back into simulation after each disproof.
    pub feedback: bool,
    /// Try to prove equivalences among sparse (near-constant) nodes, including against the constant.
    /// When disabled, sparse nodes are kept apart without any SAT query.
    pub do_sparse: bool,
    /// Maintain reference counts and free nodes as soon as they are merged away.
    /// Ignored for nodes kept as choices.
    pub ref_count: bool,
    /// Record merged nodes as structural alternatives of their representative.
    pub choicing: bool,
    /// Maximum number of conflicts (backtracks) per equivalence query.
    /// [`None`] means unbounded, `Some(0)` gives up at the first conflict.
    pub backtrack_limit: Option<u64>,
    /// Number of random 64-bit simulation words given to every node at creation.
    pub sim_words: usize,
    /// Seed of the simulation patterns.
    pub seed: u64,
    /// Report statistics at `info` level instead of `debug`.
    pub verbose: bool,
}

impl Default for FraigParams {
    fn default() -> Self {
        FraigParams {
            functional_reduction: true,
            feedback: true,
            do_sparse: true,
            ref_count: true,
            choicing: false,
            backtrack_limit: Some(1000),
            sim_words: 4,
            seed: 0,
            verbose: false,
        }
    }
}

impl FraigParams {
    /// Structural hashing only.
    pub fn strash_only() -> Self {
        FraigParams {
            functional_reduction: false,
            ..FraigParams::default()
        }
    }

    /// Functional reduction keeping every proved alternative as a choice.
    pub fn with_choices() -> Self {
        FraigParams {
            choicing: true,
            ..FraigParams::default()
        }
    }
}
