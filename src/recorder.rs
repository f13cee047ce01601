/*! In-memory traces of a run. */

/// Membrane voltage of every node at one moment.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Units: ms
    pub time: f64,
    /// Units: mV, indexed by node.
    pub voltages: Vec<f64>,
}

/** Append-only record of a run.

Holds one sample per completed time step, plus the initial state. Samples are
never modified once written. */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    samples: Vec<Sample>,
}

impl Recording {
    pub fn new() -> Recording {
        Default::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Recording {
        Recording {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Only the model appends, once per step, so time always increases.
    pub(crate) fn sample(&mut self, time: f64, voltages: &[f64]) {
        debug_assert!(self.samples.last().map_or(true, |s| s.time < time));
        self.samples.push(Sample {
            time,
            voltages: voltages.to_vec(),
        });
    }

    pub fn trace(&self) -> &[Sample] {
        &self.samples
    }

    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// `(time, voltage)` pairs of a single node, or `None` if the cable has no
    /// such node.
    pub fn node_trace(&self, node: usize) -> Option<Vec<(f64, f64)>> {
        self.samples
            .iter()
            .map(|s| s.voltages.get(node).map(|v| (s.time, *v)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
