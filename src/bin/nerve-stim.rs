/*! Stimulate a fiber and print the membrane voltage of one node.

Run using:
`$ nerve-stim 20um_fiber.txt > trace.txt`

Each line of output is `time voltage`, in ms and mV, ready to be plotted. Logs
go to stderr. */
use nerve_stim::config::{Config, MechanismKind};
use nerve_stim::table::PotentialTable;
use nerve_stim::{IntegrationMethod, Model, StimError};
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, StructOpt)]
#[structopt(name = "nerve-stim")]
struct CLI {
    /// Potential table, one value per node.
    #[structopt(parse(from_os_str))]
    table: PathBuf,

    /// TOML configuration file. Omitted fields keep the reference values.
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Units: ms
    #[structopt(long)]
    tstop: Option<f64>,

    /// Units: ms
    #[structopt(long = "time_step")]
    time_step: Option<f64>,

    /// Number of nodes, must be odd.
    #[structopt(long)]
    nodes: Option<usize>,

    /// Fiber diameter. Units: um
    #[structopt(long)]
    diameter: Option<f64>,

    /// Node to print, defaults to the middle node.
    #[structopt(long)]
    node: Option<usize>,

    /// forward_euler, backward_euler or crank_nicholson
    #[structopt(long)]
    method: Option<IntegrationMethod>,

    /// sweeney or passive
    #[structopt(long)]
    mechanism: Option<MechanismKind>,

    #[structopt(short, long)]
    verbose: bool,
}

impl CLI {
    fn config(&self) -> Result<Config, StimError> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(tstop) = self.tstop {
            config.simulation.tstop = tstop;
        }
        if let Some(dt) = self.time_step {
            config.simulation.dt = dt;
        }
        if let Some(nodes) = self.nodes {
            config.fiber.nodes = nodes;
        }
        if let Some(diameter) = self.diameter {
            config.fiber.diameter = diameter;
        }
        if let Some(node) = self.node {
            config.record.node = Some(node);
        }
        if let Some(method) = self.method {
            config.simulation.method = method;
        }
        if let Some(mechanism) = self.mechanism {
            config.membrane.mechanism = mechanism;
        }
        config.validate()?;
        Ok(config)
    }
}

fn run(args: &CLI) -> Result<(), StimError> {
    let config = args.config()?;
    let node = config.record_node();
    let table = PotentialTable::from_file(&args.table, config.stimulus.comment_marker)?;
    let mut model = Model::new(config, table)?;
    model.initialize()?;
    let start = std::time::Instant::now();
    let recording = model.run()?;
    info!(
        samples = recording.len(),
        seconds = start.elapsed().as_secs_f64(),
        "simulation complete"
    );
    let trace = recording.node_trace(node).ok_or_else(|| {
        StimError::Config(format!("node {} is outside the cable", node))
    })?;
    for (time, voltage) in trace {
        println!("{} {}", time, voltage);
    }
    Ok(())
}

fn main() {
    let args = CLI::from_args();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(err) = run(&args) {
        error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
    eprintln!("============ DONE ============");
}
