use std::fmt::Display;

/// Counters collected while building a functionally reduced AIG.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FraigStats {
    /// AND requests answered by a trivial identity.
    pub trivial: u64,
    /// AND requests answered by the one-hop containment check.
    pub one_hop: u64,
    /// AND requests answered by the structural table.
    pub strash_hits: u64,
    /// AND nodes allocated.
    pub created: u64,
    pub sat_calls: u64,
    pub sat_equivalent: u64,
    pub sat_inequivalent: u64,
    pub sat_unknown: u64,
    /// Counterexamples folded back into simulation.
    pub feedback_patterns: u64,
    /// Nodes merged into an earlier representative.
    pub merges: u64,
    /// Merged nodes recorded in a choice class.
    pub choices: u64,
    /// Choice insertions refused because they would create a cycle.
    pub cyclic_choices: u64,
    /// Nodes freed by reference counting.
    pub freed: u64,
}

impl Display for FraigStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "created={} trivial={} one-hop={} strash={} | sat calls={} (equiv={} diff={} unknown={}) \
            | feedback={} merges={} choices={} refused={} freed={}",
            self.created,
            self.trivial,
            self.one_hop,
            self.strash_hits,
            self.sat_calls,
            self.sat_equivalent,
            self.sat_inequivalent,
            self.sat_unknown,
            self.feedback_patterns,
            self.merges,
            self.choices,
            self.cyclic_choices,
            self.freed
        )
    }
}
