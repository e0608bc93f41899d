mod common;

use common::{Shape, init_logger, node_tables, random_aig, truth_table};
use fraigs::{Aig, AigEdge, FraigParams};

const SMALL: Shape = Shape {
    inputs: 6,
    latches: 0,
    gates: 60,
    outputs: 6,
};

fn variants() -> Vec<FraigParams> {
    vec![
        FraigParams::default(),
        FraigParams::with_choices(),
        FraigParams {
            feedback: false,
            ..FraigParams::default()
        },
        FraigParams {
            do_sparse: false,
            ..FraigParams::default()
        },
        FraigParams {
            ref_count: false,
            ..FraigParams::default()
        },
        FraigParams {
            backtrack_limit: Some(0),
            ..FraigParams::default()
        },
        FraigParams {
            sim_words: 1,
            seed: 42,
            ..FraigParams::default()
        },
    ]
}

#[test]
fn and_or_two_ways() {
    init_logger();
    let mut aig = Aig::with_params(FraigParams::with_choices());
    let a = aig.add_input("a").unwrap();
    let b = aig.add_input("b").unwrap();
    let c = aig.add_input("c").unwrap();
    let d = aig.add_input("d").unwrap();

    // (a & b) | (c & d)
    let ab = aig.and(a, b).unwrap();
    let cd = aig.and(c, d).unwrap();
    let f = aig.or(ab, cd).unwrap();

    // (a | c) & (a | d) & (b | c) & (b | d)
    let ac = aig.or(a, c).unwrap();
    let ad = aig.or(a, d).unwrap();
    let bc = aig.or(b, c).unwrap();
    let bd = aig.or(b, d).unwrap();
    let x = aig.and(ac, ad).unwrap();
    let x = aig.and(x, bc).unwrap();
    let g = aig.and(x, bd).unwrap();

    assert_eq!(f, g);
    assert_eq!(aig.choice_class_count(), 1);
    let head = f.get_node_id();
    assert_eq!(aig.choices(head).count(), 2);
    assert_eq!(aig.stats().merges, 1);
    aig.check_integrity().unwrap();

    aig.add_output("f", f).unwrap();
    aig.add_output("g", g).unwrap();
    assert_eq!(aig.equivalent_outputs(), vec![vec![(0, false), (1, false)]]);
    for m in 0..16u32 {
        let bits: Vec<bool> = (0..4).map(|k| m >> k & 1 == 1).collect();
        let expected = (bits[0] && bits[1]) || (bits[2] && bits[3]);
        assert_eq!(aig.evaluate(&bits, &[]).unwrap(), vec![expected, expected]);
    }
    aig.report_stats();
}

#[test]
fn soundness() {
    init_logger();
    for seed in 0..8 {
        let reference = random_aig(FraigParams::strash_only(), seed, SMALL);
        let expected = truth_table(&reference);
        for params in variants() {
            let aig = random_aig(params.clone(), seed, SMALL);
            aig.check_integrity().unwrap();
            assert_eq!(truth_table(&aig), expected, "seed {seed} with {params:?}");

            let reduced = reference.reduce(params.clone()).unwrap();
            reduced.check_integrity().unwrap();
            assert_eq!(truth_table(&reduced), expected, "seed {seed} with {params:?}");
        }
    }
}

#[test]
fn soundness_sixteen_inputs() {
    init_logger();
    let shape = Shape {
        inputs: 16,
        latches: 0,
        gates: 80,
        outputs: 4,
    };
    let reference = random_aig(FraigParams::strash_only(), 7, shape);
    let aig = random_aig(FraigParams::default(), 7, shape);
    aig.check_integrity().unwrap();
    assert_eq!(truth_table(&aig), truth_table(&reference));
}

#[test]
fn soundness_sequential() {
    init_logger();
    let shape = Shape {
        inputs: 4,
        latches: 3,
        gates: 50,
        outputs: 4,
    };
    for seed in 0..4 {
        let reference = random_aig(FraigParams::strash_only(), seed, shape);
        let aig = random_aig(FraigParams::with_choices(), seed, shape);
        aig.check_integrity().unwrap();
        assert_eq!(truth_table(&aig), truth_table(&reference));
        // next-state functions are preserved too
        let with_next = |aig: &Aig| {
            let mut copy = aig.clone();
            for next in aig.latch_inputs() {
                copy.add_output("next", next).unwrap();
            }
            truth_table(&copy)
        };
        assert_eq!(with_next(&aig), with_next(&reference));
    }
}

#[test]
fn functionally_reduced() {
    init_logger();
    let params = FraigParams {
        backtrack_limit: None,
        ..FraigParams::default()
    };
    for seed in 0..8 {
        let aig = random_aig(params.clone(), seed, SMALL);
        let (tables, mask) = node_tables(&aig);
        let mut seen = std::collections::HashMap::new();
        for node in aig.nodes().filter(|n| !n.is_dead() && n.repr().is_none()) {
            let t = tables[node.get_id()];
            let normalized = if t & 1 == 1 { !t & mask } else { t };
            if let Some(other) = seen.insert(normalized, node.get_id()) {
                panic!("seed {seed}: n{other} and n{} compute the same function", node.get_id());
            }
        }
    }
}

#[test]
fn idempotence() {
    init_logger();
    let mut aig = Aig::new();
    let a = aig.add_input("a").unwrap();
    let b = aig.add_input("b").unwrap();
    let c = aig.add_input("c").unwrap();
    let x = aig.xor(a, b).unwrap();
    let y = aig.mux(c, x, !a).unwrap();
    let len = aig.len();
    assert_eq!(aig.and(a, a).unwrap(), a);
    assert_eq!(aig.xor(a, b).unwrap(), x);
    assert_eq!(aig.mux(c, x, !a).unwrap(), y);
    assert_eq!(aig.len(), len);

    let params = FraigParams {
        backtrack_limit: None,
        ..FraigParams::default()
    };
    for seed in 0..4 {
        let reference = random_aig(FraigParams::strash_only(), seed, SMALL);
        let once = reference.reduce(params.clone()).unwrap();
        let twice = once.reduce(params.clone()).unwrap();
        let thrice = twice.reduce(params.clone()).unwrap();
        assert!(twice.and_count() <= once.and_count());
        assert_eq!(thrice.and_count(), twice.and_count());
        assert_eq!(thrice.live_node_count(), twice.live_node_count());
        assert_eq!(truth_table(&thrice), truth_table(&reference));
    }
}

#[test]
fn commutativity() {
    init_logger();
    for params in [FraigParams::strash_only(), FraigParams::default()] {
        let mut aig = Aig::with_params(params);
        let leaves: Vec<AigEdge> = (0..4)
            .map(|k| aig.add_input(&format!("x{k}")).unwrap())
            .collect();
        let mut edges = leaves.clone();
        for (k, &p) in leaves.iter().enumerate() {
            for &q in &leaves[k + 1..] {
                for (p, q) in [(p, q), (!p, q), (p, !q)] {
                    let x = aig.and(p, q).unwrap();
                    assert_eq!(aig.and(q, p).unwrap(), x);
                    let y = aig.or(p, q).unwrap();
                    assert_eq!(aig.or(q, p).unwrap(), y);
                    let z = aig.xor(p, q).unwrap();
                    assert_eq!(aig.xor(q, p).unwrap(), z);
                    edges.extend([x, y, z]);
                }
            }
        }
        for (k, &p) in edges.iter().enumerate() {
            for &q in &edges[k..] {
                assert_eq!(aig.and(p, q).unwrap(), aig.and(q, p).unwrap());
            }
        }
        aig.check_integrity().unwrap();
    }
}

#[test]
fn trivial_identities() {
    init_logger();
    for params in variants() {
        let mut aig = Aig::with_params(params);
        let a = aig.add_input("a").unwrap();
        let b = aig.add_input("b").unwrap();
        let zero = aig.constant(false);
        let one = aig.constant(true);
        let len = aig.len();

        assert_eq!(aig.and(a, a).unwrap(), a);
        assert_eq!(aig.and(a, !a).unwrap(), zero);
        assert_eq!(aig.and(a, one).unwrap(), a);
        assert_eq!(aig.and(one, a).unwrap(), a);
        assert_eq!(aig.and(a, zero).unwrap(), zero);
        assert_eq!(aig.or(a, !a).unwrap(), one);
        assert_eq!(aig.xor(a, a).unwrap(), zero);
        assert_eq!(aig.mux(one, a, b).unwrap(), a);
        assert_eq!(aig.mux(zero, a, b).unwrap(), b);
        assert_eq!(aig.len(), len);

        let ab = aig.and(a, b).unwrap();
        // one hop
        assert_eq!(aig.and(ab, a).unwrap(), ab);
        assert_eq!(aig.and(ab, !b).unwrap(), zero);
        assert_eq!(aig.and(!ab, !a).unwrap(), !a);
        let nab = aig.and(!a, b).unwrap();
        assert_eq!(aig.and(ab, nab).unwrap(), zero);
        assert_eq!(aig.len(), len + 2);
    }
}
