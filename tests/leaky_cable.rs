/*! # Stimulate a passive, leaky cable.

Scenario: The fiber has no voltage gated channels, only a linear leak. Apply
the field at a single node in the middle of the cable and observe the membrane
response along the cable.

The response should be symmetric about the stimulated node and decay with
distance from it, and all three integration methods should agree. ***/

use nerve_stim::config::{Config, MechanismKind};
use nerve_stim::table::PotentialTable;
use nerve_stim::{IntegrationMethod, Model};

// Simulation Parameters.
const NUM_NODES: usize = 81;
const CENTER: usize = NUM_NODES / 2;
const DURATION: f64 = 1.0; // Units: ms
const POTENTIAL: f64 = 1e-6;
const ACCURACY: f64 = 0.02; // Units: mV

fn run(method: IntegrationMethod) -> Vec<Vec<f64>> {
    let mut config = Config::default();
    config.simulation.tstop = DURATION;
    config.simulation.method = method;
    config.membrane.mechanism = MechanismKind::Passive;
    let mut values = vec![0.0; NUM_NODES];
    values[CENTER] = POTENTIAL;
    let mut m = Model::new(config, PotentialTable::new(values)).unwrap();
    m.initialize().unwrap();
    return m
        .run()
        .unwrap()
        .trace()
        .iter()
        .map(|sample| sample.voltages.clone())
        .collect();
}

/// Largest distance from rest reached by each node.
fn deflection(trace: &[Vec<f64>]) -> Vec<f64> {
    let rest = &trace[0];
    (0..NUM_NODES)
        .map(|node| {
            trace
                .iter()
                .map(|v| (v[node] - rest[node]).abs())
                .fold(0.0, f64::max)
        })
        .collect()
}

#[test]
fn leaky_cable() {
    let trace = run(IntegrationMethod::BackwardEuler);
    assert_eq!(trace.len(), 1001);
    let deflection = deflection(&trace);
    // Decays with distance.
    for offset in 0..10 {
        assert!(
            deflection[CENTER + offset] > deflection[CENTER + offset + 1],
            "{:?}",
            &deflection[CENTER..CENTER + 12]
        );
    }
    assert!(deflection[CENTER] > 0.2);
    assert!(deflection[CENTER] < 1.0);
    // Symmetric.
    for offset in 1..=CENTER {
        let left = deflection[CENTER - offset];
        let right = deflection[CENTER + offset];
        assert!((left - right).abs() <= 1e-9 * left.max(1.0));
    }
    // Never above the resting potential by much, the leak pulls it back.
    assert!(trace.iter().flatten().all(|v| (v + 80.0).abs() < 1.0));
}

#[test]
fn methods_agree() {
    let backward = run(IntegrationMethod::BackwardEuler);
    for method in &[IntegrationMethod::ForwardEuler, IntegrationMethod::CrankNicholson] {
        let other = run(*method);
        assert_eq!(other.len(), backward.len());
        for (a, b) in backward.iter().zip(&other) {
            for (x, y) in a.iter().zip(b) {
                assert!((x - y).abs() < ACCURACY, "{:?}: {} vs {}", method, x, y);
            }
        }
    }
}
