/*! Error types for building and running a stimulation model. */

/// Everything that can stop a run before it produces a trace.
#[derive(Debug, thiserror::Error)]
pub enum StimError {
    /// The potential table does not line up with the cable.
    #[error("potential table has {actual} values, expected one per node ({expected})")]
    TableShape { expected: usize, actual: usize },

    /// A table line whose trailing token is not a number.
    #[error("line {line}: can not parse a potential from {content:?}")]
    MalformedLine { line: usize, content: String },

    /// The requested cable can not be built.
    #[error("invalid topology: {0}")]
    Topology(String),

    /// Bad or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A membrane voltage stopped being finite.
    #[error("numerical instability at step {step} (t = {time} ms): node {node} is not finite")]
    NumericalInstability { step: usize, node: usize, time: f64 },

    /// Stepping before `initialize` was called.
    #[error("model is not initialized")]
    NotRunning,

    /// Stepping after the stop time was reached.
    #[error("model already reached its stop time")]
    Finished,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StimError>;
