use crate::{Aig, AigEdge, AigError, FraigParams, NodeId, NodeKind, Result, dfs::Dfs};

/// Image of `edge` in the rebuilt graph.
fn translate(map: &[Option<AigEdge>], edge: AigEdge) -> Result<AigEdge> {
    map[edge.node]
        .map(|e| e.with_phase(edge.complement))
        .ok_or(AigError::InvalidState(format!(
            "node {} was not rebuilt",
            edge.node
        )))
}

impl Aig {
    /// Rebuilds the logic of this AIG into a brand new one, under the given parameters.
    ///
    /// We are not just copying nodes: every gate goes through [`Aig::and`] again, so that the
    /// new graph is reduced according to `params`. Roughly:
    /// - create inputs
    /// - create latches (without next state)
    /// - create the and gates feeding outputs and latch inputs, in creation order
    /// - attach the latches next state
    /// - register outputs.
    ///
    /// Names and the order of inputs, latches and outputs are kept.
    ///
    /// ```rust
    /// use fraigs::{Aig, FraigParams};
    /// let mut aig = Aig::with_params(FraigParams::strash_only());
    /// let a = aig.add_input("a").unwrap();
    /// let b = aig.add_input("b").unwrap();
    /// let c = aig.add_input("c").unwrap();
    /// let ab = aig.and(a, b).unwrap();
    /// let bc = aig.and(b, c).unwrap();
    /// let x = aig.and(ab, c).unwrap();
    /// let y = aig.and(a, bc).unwrap();
    /// aig.add_output("x", x).unwrap();
    /// aig.add_output("y", y).unwrap();
    /// assert_eq!(aig.outputs_equivalent(0, 1).unwrap(), None);
    /// let fraig = aig.reduce(FraigParams::default()).unwrap();
    /// assert_eq!(fraig.outputs_equivalent(0, 1).unwrap(), Some(false));
    /// ```
    pub fn reduce(&self, params: FraigParams) -> Result<Self> {
        self.check_integrity()?;

        let mut aig = Aig::with_params(params);
        let mut map: Vec<Option<AigEdge>> = vec![None; self.nodes.len()];
        map[0] = Some(aig.constant(false));

        // Adding inputs
        for &id in &self.inputs {
            map[id] = Some(aig.add_input(self.name(id).unwrap_or_default())?);
        }

        // Adding latches, their next state comes once the logic is built
        for &id in &self.latches {
            let init = match self.nodes[id].kind {
                NodeKind::Latch { init, .. } => init,
                _ => return Err(AigError::NotALatch(id)),
            };
            map[id] = Some(aig.add_latch(self.name(id).unwrap_or_default(), init)?);
        }

        // Adding and gates in creation order, which is a topological order
        let mut used = vec![false; self.nodes.len()];
        let mut dfs = Dfs::from_outputs(self);
        while let Some(id) = dfs.next(self) {
            used[id] = true;
        }
        for id in (0..self.nodes.len()).filter(|&id| used[id]) {
            if let Some([fanin0, fanin1]) = self.nodes[id].get_fanins() {
                let a = translate(&map, fanin0)?;
                let b = translate(&map, fanin1)?;
                map[id] = Some(aig.and(a, b)?);
            }
        }

        // Edit the next state of the latches
        for &id in &self.latches {
            if let Some(next) = self.nodes[id].get_latch_next() {
                let new_id: NodeId = translate(&map, AigEdge::new(id, false))?.node;
                aig.set_latch_next(new_id, translate(&map, self.canonical(next))?)?;
            }
        }

        // Mark outputs
        for (k, output) in self.get_outputs().into_iter().enumerate() {
            aig.add_output(&self.output_names[k], translate(&map, output)?)?;
        }

        aig.report_stats();
        Ok(aig)
    }
}
