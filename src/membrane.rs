/*! Membrane mechanisms.

A mechanism supplies the ionic current through one node's membrane and owns
whatever gating state that current depends on. The cable integrator only talks
to mechanisms through the `Mechanism` trait.

Units: voltages in mV, current densities in mA / cm^2, time in ms. */

use crate::cable::CableNode;
use crate::config::{Config, MechanismKind};

/// Voltage offset for the numeric derivative of the ionic current.
const DV: f64 = 0.001;

pub trait Mechanism: std::fmt::Debug {
    /// Put all gating variables into their steady state at voltage `v`.
    fn initialize(&mut self, v: f64);

    /// Net ionic current density at voltage `v` with the gates held fixed.
    fn current(&self, v: f64) -> f64;

    /// Slope conductance `d current / d v`, with the gates held fixed.
    fn conductance(&self, v: f64) -> f64 {
        (self.current(v + DV) - self.current(v)) / DV
    }

    /// Advance the gating variables by `dt` at the fixed voltage `v`.
    fn advance(&mut self, v: f64, dt: f64);
}

/// The mechanism instance for one node, as selected by the configuration.
pub fn for_node(config: &Config, node: &CableNode) -> Box<dyn Mechanism> {
    match config.membrane.mechanism {
        MechanismKind::Sweeney => Box::new(Sweeney::new(
            config.simulation.celsius,
            config.membrane.q10,
        )),
        MechanismKind::Passive => Box::new(Passive::new(node.conductance, config.simulation.v_rest)),
    }
}

/// Linear leak towards a reversal potential.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Passive {
    /// Units: S / cm^2
    pub g: f64,
    /// Units: mV
    pub e: f64,
}

impl Passive {
    pub fn new(g: f64, e: f64) -> Passive {
        Passive { g, e }
    }
}

impl Mechanism for Passive {
    fn initialize(&mut self, _v: f64) {}

    fn current(&self, v: f64) -> f64 {
        self.g * (v - self.e)
    }

    fn conductance(&self, _v: f64) -> f64 {
        self.g
    }

    fn advance(&mut self, _v: f64, _dt: f64) {}
}

// Sweeney, Mortimer & Durand (1987), mammalian node of Ranvier at 37 C.
const G_NA: f64 = 1.445; // S / cm^2
const E_NA: f64 = 35.64; // mV
const G_LEAK: f64 = 0.128; // S / cm^2
const E_LEAK: f64 = -80.01; // mV
const REFERENCE_CELSIUS: f64 = 37.0;

/** Fast sodium and leak currents of a mammalian node of Ranvier.

There is no voltage gated potassium current, repolarization is carried by the
large leak. `current = G_NA * m^2 * h * (v - E_NA) + G_LEAK * (v - E_LEAK)` */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweeney {
    pub m: f64,
    pub h: f64,
    /// Multiplies every rate constant.
    rate_scale: f64,
}

/// Opening and closing rates of the sodium gates. Units: 1 / ms
#[derive(Debug, Clone, Copy)]
struct Rates {
    alpha_m: f64,
    beta_m: f64,
    alpha_h: f64,
    beta_h: f64,
}

impl Sweeney {
    pub fn new(celsius: f64, q10: f64) -> Sweeney {
        Sweeney {
            m: 0.0,
            h: 1.0,
            rate_scale: q10.powf((celsius - REFERENCE_CELSIUS) / 10.0),
        }
    }

    fn rates(&self, v: f64) -> Rates {
        let alpha_m = (126.0 + 0.363 * v) / (1.0 + (-(v + 49.0) / 5.3).exp());
        let beta_m = alpha_m / ((v + 56.2) / 4.17).exp();
        let beta_h = 15.6 / (1.0 + (-(v + 56.0) / 10.0).exp());
        let alpha_h = beta_h / ((v + 74.5) / 5.0).exp();
        Rates {
            alpha_m: alpha_m * self.rate_scale,
            beta_m: beta_m * self.rate_scale,
            alpha_h: alpha_h * self.rate_scale,
            beta_h: beta_h * self.rate_scale,
        }
    }
}

/// Exponential Euler step of a two state gate.
fn relax(x: f64, alpha: f64, beta: f64, dt: f64) -> f64 {
    let tau = 1.0 / (alpha + beta);
    let x_inf = alpha * tau;
    x_inf + (x - x_inf) * (-dt / tau).exp()
}

impl Mechanism for Sweeney {
    fn initialize(&mut self, v: f64) {
        let r = self.rates(v);
        self.m = r.alpha_m / (r.alpha_m + r.beta_m);
        self.h = r.alpha_h / (r.alpha_h + r.beta_h);
    }

    fn current(&self, v: f64) -> f64 {
        G_NA * self.m * self.m * self.h * (v - E_NA) + G_LEAK * (v - E_LEAK)
    }

    fn advance(&mut self, v: f64, dt: f64) {
        let r = self.rates(v);
        self.m = relax(self.m, r.alpha_m, r.beta_m, dt);
        self.h = relax(self.h, r.alpha_h, r.beta_h, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweeney_rest_is_nearly_silent() {
        let mut na = Sweeney::new(37.0, 3.0);
        na.initialize(-80.0);
        assert!(na.m > 0.0 && na.m < 0.01, "m = {}", na.m);
        assert!(na.h > 0.5 && na.h <= 1.0, "h = {}", na.h);
        // Only a tiny inward sodium current offsets the leak at rest.
        assert!(na.current(-80.0).abs() < 1e-3, "i = {}", na.current(-80.0));
    }

    #[test]
    fn gates_hold_still_in_steady_state() {
        let mut na = Sweeney::new(37.0, 3.0);
        na.initialize(-70.0);
        let before = na;
        na.advance(-70.0, 0.001);
        assert!((na.m - before.m).abs() < 1e-12);
        assert!((na.h - before.h).abs() < 1e-12);
    }

    #[test]
    fn depolarization_opens_sodium() {
        let mut na = Sweeney::new(37.0, 3.0);
        na.initialize(-80.0);
        let m_rest = na.m;
        for _ in 0..100 {
            na.advance(-20.0, 0.001);
        }
        assert!(na.m > 10.0 * m_rest);
        // Sodium current is inward when the channels open.
        assert!(na.current(-20.0) < 0.0);
    }

    #[test]
    fn temperature_scales_rates() {
        let cold = Sweeney::new(27.0, 3.0).rates(-60.0);
        let warm = Sweeney::new(37.0, 3.0).rates(-60.0);
        assert!((warm.alpha_m / cold.alpha_m - 3.0).abs() < 1e-9);
        assert!((warm.beta_h / cold.beta_h - 3.0).abs() < 1e-9);
    }

    #[test]
    fn numeric_slope_matches_passive() {
        let leak = Passive::new(5e-4, -80.0);
        assert_eq!(leak.conductance(-40.0), 5e-4);
        let slope = (leak.current(-40.0 + DV) - leak.current(-40.0)) / DV;
        assert!((slope - 5e-4).abs() < 1e-9);
    }
}
