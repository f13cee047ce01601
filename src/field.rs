/*! Applied extracellular field.

The field is not solved for. Each node has a static potential taken from the
potential table, and the field at time `t` is that profile modulated by a
sinusoidal carrier:

`ve[i] = scale * table[i] * amplitude * sin(2 pi * frequency * t)` */

use crate::cable::CableNode;
use crate::config::StimulusConfig;
use std::f64::consts::TAU;

const MS_TO_S: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub scale: f64,
    pub amplitude: f64,
    /// Units: Hz
    pub frequency: f64,
}

impl Field {
    pub fn new(stimulus: &StimulusConfig) -> Field {
        Field {
            scale: stimulus.scale,
            amplitude: stimulus.amplitude,
            frequency: stimulus.frequency,
        }
    }

    /// Value of the carrier at time `t`, in milliseconds.
    pub fn carrier(&self, t: f64) -> f64 {
        f64::sin(TAU * self.frequency * t * MS_TO_S)
    }

    /// Extracellular potential at a node whose table value is `potential`.
    pub fn potential(&self, potential: f64, t: f64) -> f64 {
        self.scale * potential * self.amplitude * self.carrier(t)
    }

    /// Write the field at time `t` into every node's extracellular potential.
    pub fn update(&self, nodes: &mut [CableNode], t: f64) {
        let carrier = self.carrier(t);
        for node in nodes.iter_mut() {
            node.extracellular = self.scale * node.potential * self.amplitude * carrier;
        }
    }
}
