#![allow(dead_code)]

use fraigs::{Aig, AigEdge, FraigParams, NodeKind};
use rand::{Rng, SeedableRng, rngs::StdRng};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Shape of a random graph.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub inputs: usize,
    pub latches: usize,
    pub gates: usize,
    pub outputs: usize,
}

fn pick(rng: &mut StdRng, edges: &[AigEdge]) -> AigEdge {
    let e = edges[rng.random_range(0..edges.len())];
    if rng.random_bool(0.5) { !e } else { e }
}

/// Builds a random graph from `seed`.
///
/// The random draws never depend on what the graph answers, so the same seed and shape give
/// the same logic whatever the parameters.
pub fn random_aig(params: FraigParams, seed: u64, shape: Shape) -> Aig {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut aig = Aig::with_params(params);
    let mut edges: Vec<AigEdge> = (0..shape.inputs)
        .map(|k| aig.add_input(&format!("x{k}")).unwrap())
        .collect();
    let latches: Vec<AigEdge> = (0..shape.latches)
        .map(|k| aig.add_latch(&format!("l{k}"), Some(false)).unwrap())
        .collect();
    edges.extend(&latches);

    for _ in 0..shape.gates {
        let a = pick(&mut rng, &edges);
        let b = pick(&mut rng, &edges);
        let c = pick(&mut rng, &edges);
        let e = match rng.random_range(0..6) {
            0..=2 => aig.and(a, b),
            3 => aig.or(a, b),
            4 => aig.xor(a, b),
            _ => aig.mux(a, b, c),
        }
        .unwrap();
        edges.push(e);
    }

    for latch in latches {
        let next = pick(&mut rng, &edges);
        aig.set_latch_next(latch.get_node_id(), next).unwrap();
    }
    for k in 0..shape.outputs {
        // favour the late gates, they have the deepest cones
        let window = edges.len().min(2 * shape.outputs + 1);
        let e = edges[edges.len() - 1 - rng.random_range(0..window)];
        let e = if k % 2 == 1 { !e } else { e };
        aig.add_output(&format!("y{k}"), e).unwrap();
    }
    aig
}

/// Outputs under every assignment of the inputs and latch outputs.
pub fn truth_table(aig: &Aig) -> Vec<Vec<bool>> {
    let inputs = aig.get_inputs().len();
    let leaves = inputs + aig.get_latches().len();
    assert!(leaves <= 16, "too many leaves for an exhaustive check");
    (0..1u32 << leaves)
        .map(|m| {
            let bits: Vec<bool> = (0..leaves).map(|k| m >> k & 1 == 1).collect();
            aig.evaluate(&bits[..inputs], &bits[inputs..]).unwrap()
        })
        .collect()
}

fn var_table(k: usize) -> u64 {
    (0..64).filter(|m| m >> k & 1 == 1).fold(0, |t, m| t | 1 << m)
}

/// Truth table of every node, when there are at most 6 leaves.
pub fn node_tables(aig: &Aig) -> (Vec<u64>, u64) {
    let inputs = aig.get_inputs().len();
    let leaves = inputs + aig.get_latches().len();
    assert!(leaves <= 6);
    let mask = if leaves == 6 {
        u64::MAX
    } else {
        (1 << (1 << leaves)) - 1
    };
    let edge_table = |tables: &[u64], e: AigEdge| {
        let t = tables[e.get_node_id()];
        if e.get_complement() { !t & mask } else { t }
    };
    let mut tables = Vec::with_capacity(aig.len());
    for node in aig.nodes() {
        let t = match *node.kind() {
            NodeKind::False => 0,
            NodeKind::Input { index } => var_table(index),
            NodeKind::Latch { index, .. } => var_table(inputs + index),
            NodeKind::And { fanin0, fanin1 } => {
                edge_table(&tables, fanin0) & edge_table(&tables, fanin1)
            }
        };
        tables.push(t & mask);
    }
    (tables, mask)
}
