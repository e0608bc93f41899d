mod common;

use common::{Shape, init_logger, random_aig, truth_table};
use fraigs::{Aig, AigError, FraigParams, Miter, Verdict};

#[test]
fn associativity_is_unsat() {
    init_logger();
    let mut aig = Aig::with_params(FraigParams::strash_only());
    let a = aig.add_input("a").unwrap();
    let b = aig.add_input("b").unwrap();
    let c = aig.add_input("c").unwrap();
    let ab = aig.and(a, b).unwrap();
    let x = aig.and(ab, c).unwrap();
    let bc = aig.and(b, c).unwrap();
    let y = aig.and(a, bc).unwrap();
    let len = aig.len();

    let miter = Miter::new(&aig, x, y).unwrap();
    assert_eq!(miter.solve(None), Verdict::Equivalent);
    assert_eq!(format!("{}", Verdict::Equivalent), "equivalent");
    // the graph is left as is
    assert_eq!(aig.len(), len);
    assert_eq!(aig.stats().sat_calls, 0);
}

#[test]
fn counterexample_is_confirmed() {
    init_logger();
    let mut aig = Aig::with_params(FraigParams::strash_only());
    let a = aig.add_input("a").unwrap();
    let b = aig.add_input("b").unwrap();
    let x = aig.and(a, b).unwrap();
    let y = aig.and(a, !b).unwrap();

    match Miter::new(&aig, x, y).unwrap().solve(Some(1000)) {
        Verdict::Inequivalent(cex) => {
            assert_eq!(cex.value(a.get_node_id()), Some(true));
            let values = aig.evaluate_edges(&[x, y], &cex).unwrap();
            assert_ne!(values[0], values[1]);
            assert!(format!("{}", Verdict::Inequivalent(cex)).starts_with("inequivalent under n1=1"));
        }
        other => panic!("a & b and a & !b differ, got {other}"),
    }
}

#[test]
fn verdicts_match_truth_tables() {
    init_logger();
    let shape = Shape {
        inputs: 5,
        latches: 0,
        gates: 40,
        outputs: 8,
    };
    for seed in 0..4 {
        let aig = random_aig(FraigParams::strash_only(), seed, shape);
        let table = truth_table(&aig);
        let outputs = aig.get_outputs();
        for i in 0..outputs.len() {
            for j in i + 1..outputs.len() {
                let same = table.iter().all(|row| row[i] == row[j]);
                match Miter::new(&aig, outputs[i], outputs[j]).unwrap().solve(None) {
                    Verdict::Equivalent => assert!(same, "seed {seed}: y{i} and y{j} differ"),
                    Verdict::Inequivalent(cex) => {
                        assert!(!same, "seed {seed}: y{i} and y{j} are equal");
                        let values = aig.evaluate_edges(&[outputs[i], outputs[j]], &cex).unwrap();
                        assert_ne!(values[0], values[1]);
                    }
                    Verdict::Unknown => panic!("no conflict limit was given"),
                }
            }
        }
    }
}

#[test]
fn unknown_leaves_graph_untouched() {
    init_logger();
    let params = FraigParams {
        backtrack_limit: Some(0),
        ..FraigParams::default()
    };
    let mut aig = Aig::with_params(params);
    let a = aig.add_input("a").unwrap();
    let b = aig.add_input("b").unwrap();
    let c = aig.add_input("c").unwrap();
    let ab = aig.and(a, b).unwrap();
    let x = aig.and(ab, c).unwrap();
    let bc = aig.and(b, c).unwrap();
    let y = aig.and(a, bc).unwrap();
    // nothing was proved, both nodes stay
    assert_ne!(x, y);
    assert_eq!(aig.stats().sat_unknown, 1);
    assert_eq!(aig.stats().merges, 0);
    aig.check_integrity().unwrap();
    aig.add_output("x", x).unwrap();
    aig.add_output("y", y).unwrap();
    assert_eq!(aig.outputs_equivalent(0, 1).unwrap(), None);
    assert!(matches!(
        aig.outputs_equivalent(0, 2),
        Err(AigError::NoSuchOutput(2))
    ));
}
