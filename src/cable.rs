/*! # Cable topology

The fiber is modeled as a chain of nodes of Ranvier. The myelinated internodes
are not simulated, they only contribute their length to the axial resistance
between adjacent nodes. Node `i` is connected to nodes `i - 1` and `i + 1`, and
the chain never branches. */

use crate::config::FiberConfig;
use crate::error::{Result, StimError};
use crate::table::PotentialTable;
use std::f64::consts::PI;
use tracing::debug;

const UM_TO_CM: f64 = 1e-4;

/// One compartment of the fiber.
#[derive(Debug, Clone, PartialEq)]
pub struct CableNode {
    pub index: usize,
    /// Units: um
    pub diameter: f64,
    /// Units: um
    pub length: f64,
    /// Axial resistivity, scaled by the internodal spacing. Units: Ohm * cm
    pub axial_resistivity: f64,
    /// Units: uF / cm^2
    pub capacitance: f64,
    /// Units: S / cm^2
    pub conductance: f64,
    /// Value of the potential table at this node.
    pub potential: f64,
    /// Membrane potential. Units: mV
    pub voltage: f64,
    /// Extracellular potential at the outside of the membrane. Units: mV
    pub extracellular: f64,
}

impl CableNode {
    /// Membrane surface area. Units: cm^2
    pub fn area(&self) -> f64 {
        PI * self.diameter * UM_TO_CM * self.length * UM_TO_CM
    }

    /// Total membrane capacitance. Units: uF
    pub fn total_capacitance(&self) -> f64 {
        self.capacitance * self.area()
    }

    /// Resistance from the center of this node to the center of an identical
    /// neighbor. Units: Ohm
    fn axial_resistance(&self) -> f64 {
        let cross_section = PI * (self.diameter * UM_TO_CM).powi(2) / 4.0;
        self.axial_resistivity * self.length * UM_TO_CM / cross_section
    }
}

/** Immutable chain of nodes.

Only the per-node `voltage` and `extracellular` fields change after the cable
is built. */
#[derive(Debug, Clone, PartialEq)]
pub struct Cable {
    nodes: Vec<CableNode>,
    /// Conductance between adjacent node centers. Units: mS
    axial_conductance: f64,
}

impl Cable {
    /** Build the chain of `fiber.nodes` nodes.

    The node count must be odd, so that there is a middle node, and the table
    must hold exactly one potential per node. */
    pub fn build(fiber: &FiberConfig, table: &PotentialTable) -> Result<Cable> {
        if fiber.nodes == 0 || fiber.nodes % 2 == 0 {
            return Err(StimError::Topology(format!(
                "node count must be odd and at least 1, got {}",
                fiber.nodes
            )));
        }
        table.expect_len(fiber.nodes)?;
        let length = fiber.node_length;
        let axial_resistivity =
            fiber.axial_resistivity * (length + fiber.internode_length()) / length;
        let nodes: Vec<CableNode> = (0..fiber.nodes)
            .map(|index| CableNode {
                index,
                diameter: fiber.diameter_ratio * fiber.diameter,
                length,
                axial_resistivity,
                capacitance: fiber.capacitance,
                conductance: fiber.conductance,
                potential: table[index],
                voltage: 0.0,
                extracellular: 0.0,
            })
            .collect();
        // Half of each node's resistance lies on either side of its center.
        let axial_conductance = 1e3 / nodes[0].axial_resistance();
        debug!(
            nodes = nodes.len(),
            area_cm2 = nodes[0].area(),
            capacitance_uf = nodes[0].total_capacitance(),
            axial_conductance_ms = axial_conductance,
            "built cable"
        );
        Ok(Cable {
            nodes,
            axial_conductance,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn middle(&self) -> usize {
        self.nodes.len() / 2
    }

    pub fn nodes(&self) -> &[CableNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [CableNode] {
        &mut self.nodes
    }

    pub fn axial_conductance(&self) -> f64 {
        self.axial_conductance
    }

    /// The nodes adjacent to `index`, one at either end of the cable and two
    /// everywhere else.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> {
        let len = self.nodes.len();
        let left = index.checked_sub(1);
        let right = if index + 1 < len { Some(index + 1) } else { None };
        left.into_iter().chain(right)
    }

    pub fn voltages(&self) -> Vec<f64> {
        self.nodes.iter().map(|node| node.voltage).collect()
    }

    pub fn extracellular(&self) -> Vec<f64> {
        self.nodes.iter().map(|node| node.extracellular).collect()
    }
}
