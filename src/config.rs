/*! Run configuration.

Every field has a default, and the defaults reproduce the reference run: an 81
node, 20 um fiber, stimulated by a 5 kHz carrier for 10 ms. Configuration files
are TOML and may leave out any section or field. */

use crate::error::{Result, StimError};
use crate::IntegrationMethod;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest run accepted, in time steps.
pub const MAX_STEPS: f64 = 1e9;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub fiber: FiberConfig,
    pub membrane: MembraneConfig,
    pub stimulus: StimulusConfig,
    pub record: RecordConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Units: milliseconds
    pub tstop: f64,
    /// Units: milliseconds
    pub dt: f64,
    /// Units: degrees Celsius
    pub celsius: f64,
    /// Resting membrane potential used by `initialize`. Units: mV
    pub v_rest: f64,
    pub method: IntegrationMethod,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tstop: 10.0,
            dt: 0.001,
            celsius: 37.0,
            v_rest: -80.0,
            method: IntegrationMethod::BackwardEuler,
        }
    }
}

/// Geometry and passive electrical properties shared by every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiberConfig {
    /// Number of nodes of Ranvier, must be odd.
    pub nodes: usize,
    /// Fiber diameter. Units: um
    pub diameter: f64,
    /// Node diameter as a fraction of the fiber diameter.
    pub diameter_ratio: f64,
    /// Internodal length as a multiple of the fiber diameter.
    pub internode_factor: f64,
    /// Axoplasmic resistivity. Units: Ohm * cm
    pub axial_resistivity: f64,
    /// Units: uF / cm^2
    pub capacitance: f64,
    /// Node length. Units: um
    pub node_length: f64,
    /// Passive membrane conductance. Units: S / cm^2
    pub conductance: f64,
}

impl Default for FiberConfig {
    fn default() -> Self {
        FiberConfig {
            nodes: 81,
            diameter: 20.0,
            diameter_ratio: 0.6,
            internode_factor: 100.0,
            axial_resistivity: 54.7,
            capacitance: 2.5,
            node_length: 1.5,
            conductance: 1.0 / 2000.0,
        }
    }
}

impl FiberConfig {
    /// Units: um
    pub fn internode_length(&self) -> f64 {
        self.internode_factor * self.diameter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanismKind {
    Sweeney,
    Passive,
}

impl std::str::FromStr for MechanismKind {
    type Err = StimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sweeney" => Ok(MechanismKind::Sweeney),
            "passive" => Ok(MechanismKind::Passive),
            _ => Err(StimError::Config(format!("unknown membrane mechanism {:?}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MembraneConfig {
    pub mechanism: MechanismKind,
    /// Temperature coefficient of the channel rates, relative to 37 C.
    pub q10: f64,
}

impl Default for MembraneConfig {
    fn default() -> Self {
        MembraneConfig {
            mechanism: MechanismKind::Sweeney,
            q10: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusConfig {
    /// Multiplies the table values.
    pub scale: f64,
    /// Multiplies the table values.
    pub amplitude: f64,
    /// Carrier frequency. Units: Hz
    pub frequency: f64,
    /// Not applied to the field. Units: ms
    pub delay: f64,
    /// Not applied to the field. Units: ms
    pub duration: f64,
    /// First character of comment lines in the potential table.
    pub comment_marker: char,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        StimulusConfig {
            scale: 10_000.0,
            amplitude: 35.0,
            frequency: 5_000.0,
            delay: 0.5,
            duration: 1.0,
            comment_marker: crate::table::DEFAULT_COMMENT_MARKER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    /// Node to present. Defaults to the middle of the cable.
    pub node: Option<usize>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;
        Config::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content).map_err(|e| StimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| StimError::Config(e.to_string()))
    }

    /// The node whose trace gets presented.
    pub fn record_node(&self) -> usize {
        self.record.node.unwrap_or(self.fiber.nodes / 2)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("simulation.tstop", self.simulation.tstop),
            ("simulation.dt", self.simulation.dt),
            ("fiber.diameter", self.fiber.diameter),
            ("fiber.diameter_ratio", self.fiber.diameter_ratio),
            ("fiber.axial_resistivity", self.fiber.axial_resistivity),
            ("fiber.capacitance", self.fiber.capacitance),
            ("fiber.node_length", self.fiber.node_length),
            ("membrane.q10", self.membrane.q10),
        ];
        for (name, value) in positive.iter() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(StimError::Config(format!("{} must be positive, got {}", name, value)));
            }
        }
        let non_negative = [
            ("fiber.internode_factor", self.fiber.internode_factor),
            ("fiber.conductance", self.fiber.conductance),
        ];
        for (name, value) in non_negative.iter() {
            if !(value.is_finite() && *value >= 0.0) {
                return Err(StimError::Config(format!("{} must not be negative, got {}", name, value)));
            }
        }
        if !self.simulation.v_rest.is_finite() || !self.simulation.celsius.is_finite() {
            return Err(StimError::Config("resting potential and temperature must be finite".into()));
        }
        let steps = self.simulation.tstop / self.simulation.dt;
        if !(steps.is_finite() && steps <= MAX_STEPS) {
            return Err(StimError::Config(format!(
                "simulation.tstop / simulation.dt is {} steps, at most {} are allowed",
                steps, MAX_STEPS
            )));
        }
        if self.fiber.nodes == 0 || self.fiber.nodes % 2 == 0 {
            return Err(StimError::Config(format!(
                "fiber.nodes must be odd, got {}",
                self.fiber.nodes
            )));
        }
        if self.record_node() >= self.fiber.nodes {
            return Err(StimError::Config(format!(
                "record.node {} is outside the cable ({} nodes)",
                self.record_node(),
                self.fiber.nodes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_reference_run() {
        let config = Config::default();
        assert_eq!(config.simulation.tstop, 10.0);
        assert_eq!(config.simulation.dt, 0.001);
        assert_eq!(config.fiber.nodes, 81);
        assert_eq!(config.fiber.internode_length(), 2000.0);
        assert_eq!(config.stimulus.frequency, 5000.0);
        assert_eq!(config.record_node(), 40);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml() {
        let config = Config::from_toml(
            r#"
            [simulation]
            tstop = 2.0
            method = "crank_nicholson"

            [fiber]
            nodes = 21
            diameter = 10.0

            [membrane]
            mechanism = "passive"
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.tstop, 2.0);
        assert_eq!(config.simulation.dt, 0.001);
        assert_eq!(config.simulation.method, IntegrationMethod::CrankNicholson);
        assert_eq!(config.fiber.nodes, 21);
        assert_eq!(config.fiber.internode_length(), 1000.0);
        assert_eq!(config.membrane.mechanism, MechanismKind::Passive);
        assert_eq!(config.record_node(), 10);
    }

    #[test]
    fn toml_round_trip() {
        let mut config = Config::default();
        config.record.node = Some(12);
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        config.fiber.nodes = 80;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simulation.dt = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.record.node = Some(81);
        assert!(config.validate().is_err());

        assert!(Config::from_toml("[fiber]\nnodes = \"many\"").is_err());
    }

    #[test]
    fn rejects_runs_too_long_to_record() {
        let mut config = Config::default();
        config.simulation.tstop = 1e12;
        config.simulation.dt = 1e-6;
        assert!(matches!(config.validate(), Err(StimError::Config(_))));

        let mut config = Config::default();
        config.simulation.tstop = f64::MAX;
        config.simulation.dt = 1e-300;
        assert!(matches!(config.validate(), Err(StimError::Config(_))));

        let mut config = Config::default();
        config.simulation.tstop = 1e3;
        config.simulation.dt = 1e-6;
        assert!(config.validate().is_ok());
    }
}
