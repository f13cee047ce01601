/*! Extracellular stimulation of a myelinated nerve fiber.

The fiber is a chain of nodes of Ranvier, coupled through the axoplasm. A
static spatial potential profile, loaded from a potential table, is modulated
by a sinusoidal carrier and applied to the outside of every node. The model
integrates the membrane response with a fixed time step and records the
membrane voltage of every node.

```no_run
use nerve_stim::{config::Config, table::PotentialTable, Model};

let config = Config::default();
let table = PotentialTable::from_file("20um_fiber.txt", config.stimulus.comment_marker)?;
let mut model = Model::new(config, table)?;
model.initialize()?;
let recording = model.run()?;
for (time, voltage) in recording.node_trace(40).unwrap_or_default() {
    println!("{} {}", time, voltage);
}
# Ok::<(), nerve_stim::StimError>(())
``` */
pub mod cable;
pub mod config;
mod error;
pub mod field;
pub mod integrator;
pub mod membrane;
pub mod recorder;
pub mod table;

pub use error::{Result, StimError};

use cable::Cable;
use config::Config;
use field::Field;
use integrator::Integrator;
use membrane::Mechanism;
use recorder::Recording;
use serde::{Deserialize, Serialize};
use table::PotentialTable;
use tracing::{debug, error, info, warn};

/// Upper bound on the samples reserved ahead of a run.
const PREALLOCATED_SAMPLES: usize = 100_000;

/// How the cable equations are discretized in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationMethod {
    /// Explicit. Only stable while `dt` is well below the fastest time
    /// constant of the cable.
    ForwardEuler,

    /// Implicit, first order.
    BackwardEuler,

    /// Implicit midpoint solve, second order.
    CrankNicholson,
}

impl std::str::FromStr for IntegrationMethod {
    type Err = StimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "forward_euler" => Ok(IntegrationMethod::ForwardEuler),
            "backward_euler" => Ok(IntegrationMethod::BackwardEuler),
            "crank_nicholson" => Ok(IntegrationMethod::CrankNicholson),
            _ => Err(StimError::Config(format!("unknown integration method {:?}", s))),
        }
    }
}

/** Simulation time, counted in whole time steps.

Time is measured with an integer for accuracy, `time = ticks * dt`. */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    ticks: usize,
    dt: f64,
}

impl SimulationClock {
    pub fn new(dt: f64) -> SimulationClock {
        SimulationClock { ticks: 0, dt }
    }

    /// Units: ms
    pub fn time(&self) -> f64 {
        self.ticks as f64 * self.dt
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    fn tick(&mut self) {
        self.ticks += 1;
    }

    fn reset(&mut self) {
        self.ticks = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Running,
    Finished,
}

/** Main class

Owns the cable, the membrane mechanisms, the clock and the recording. Nothing
else writes to them. A model runs exactly once: build it, `initialize` it, then
`step` or `run` it until it is finished. */
pub struct Model {
    config: Config,
    cable: Cable,
    field: Field,
    mechanisms: Vec<Box<dyn Mechanism>>,
    integrator: Integrator,
    clock: SimulationClock,
    recording: Recording,
    phase: Phase,
    total_steps: usize,
}

impl Model {
    /** Build the cable described by `config`, with `table` as its potential
    profile.

    Fails if the configuration is invalid or if the table does not have
    exactly one value per node. */
    pub fn new(config: Config, table: PotentialTable) -> Result<Model> {
        config.validate()?;
        let cable = Cable::build(&config.fiber, &table)?;
        let mechanisms = cable
            .nodes()
            .iter()
            .map(|node| membrane::for_node(&config, node))
            .collect();
        let stimulus = &config.stimulus;
        if stimulus.delay != 0.0 || stimulus.duration != 0.0 {
            // The field is a continuous wave.
            warn!(
                delay = stimulus.delay,
                duration = stimulus.duration,
                "stimulus delay and duration are not applied to the field"
            );
        }
        let total_steps = step_count(config.simulation.tstop, config.simulation.dt);
        info!(
            nodes = cable.len(),
            method = ?config.simulation.method,
            mechanism = ?config.membrane.mechanism,
            steps = total_steps,
            "built model"
        );
        Ok(Model {
            field: Field::new(stimulus),
            integrator: Integrator::new(config.simulation.method),
            clock: SimulationClock::new(config.simulation.dt),
            recording: Recording::new(),
            phase: Phase::Uninitialized,
            mechanisms,
            cable,
            total_steps,
            config,
        })
    }

    /** Set every node to the resting potential and reset the clock to zero.

    Any steps taken since the last initialization are discarded. The initial
    state is the first sample of the recording. A finished model can not be
    initialized again, build a new one instead. */
    pub fn initialize(&mut self) -> Result<()> {
        if self.phase == Phase::Finished {
            return Err(StimError::Finished);
        }
        let v_rest = self.config.simulation.v_rest;
        for (node, mechanism) in self
            .cable
            .nodes_mut()
            .iter_mut()
            .zip(self.mechanisms.iter_mut())
        {
            node.voltage = v_rest;
            node.extracellular = 0.0;
            mechanism.initialize(v_rest);
        }
        self.clock.reset();
        self.recording = Recording::with_capacity(self.total_steps.min(PREALLOCATED_SAMPLES) + 1);
        self.recording.sample(self.clock.time(), &self.cable.voltages());
        self.phase = if self.total_steps == 0 {
            Phase::Finished
        } else {
            Phase::Running
        };
        debug!(v_rest, "initialized");
        Ok(())
    }

    /** Take one time step.

    Applies the field at the present time, advances the membranes by `dt`,
    then records the new voltages at the new time. A non-finite voltage ends
    the run with `NumericalInstability`. */
    pub fn step(&mut self) -> Result<()> {
        match self.phase {
            Phase::Uninitialized => return Err(StimError::NotRunning),
            Phase::Finished => return Err(StimError::Finished),
            Phase::Running => {}
        }
        let t = self.clock.time();
        self.field.update(self.cable.nodes_mut(), t);
        self.integrator
            .advance(&mut self.cable, &mut self.mechanisms, self.clock.dt());
        if let Some(node) = self.cable.nodes().iter().position(|n| !n.voltage.is_finite()) {
            let step = self.clock.ticks();
            error!(step, node, time = t, "membrane voltage is not finite");
            self.phase = Phase::Finished;
            return Err(StimError::NumericalInstability {
                step,
                node,
                time: t,
            });
        }
        self.clock.tick();
        self.recording.sample(self.clock.time(), &self.cable.voltages());
        if self.clock.ticks() >= self.total_steps {
            self.phase = Phase::Finished;
            info!(time = self.clock.time(), steps = self.clock.ticks(), "run finished");
        }
        Ok(())
    }

    /// Step until the stop time is reached.
    pub fn run(&mut self) -> Result<&Recording> {
        if self.phase == Phase::Uninitialized {
            return Err(StimError::NotRunning);
        }
        while self.phase == Phase::Running {
            self.step()?;
        }
        Ok(&self.recording)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Units: ms
    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    /// Number of steps in a complete run, `ceil(tstop / dt)`.
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn cable(&self) -> &Cable {
        &self.cable
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn into_recording(self) -> Recording {
        self.recording
    }
}

/// `ceil(tstop / dt)`, forgiving the rounding error in `tstop / dt`.
fn step_count(tstop: f64, dt: f64) -> usize {
    let steps = tstop / dt;
    let nearest = steps.round();
    if (steps - nearest).abs() <= nearest * 1e-9 {
        nearest as usize
    } else {
        steps.ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_count_rounding() {
        assert_eq!(step_count(10.0, 0.001), 10_000);
        assert_eq!(step_count(0.3, 0.1), 3);
        assert_eq!(step_count(0.25, 0.1), 3);
        assert_eq!(step_count(0.05, 0.1), 1);
    }

    #[test]
    fn clock_counts_ticks() {
        let mut clock = SimulationClock::new(0.025);
        for _ in 0..40 {
            clock.tick();
        }
        assert_eq!(clock.ticks(), 40);
        assert_eq!(clock.time(), 40.0 * 0.025);
        clock.reset();
        assert_eq!(clock.time(), 0.0);
    }

    #[test]
    fn method_names() {
        assert_eq!(
            "crank_nicholson".parse::<IntegrationMethod>().unwrap(),
            IntegrationMethod::CrankNicholson
        );
        assert!("runge_kutta".parse::<IntegrationMethod>().is_err());
    }
}
