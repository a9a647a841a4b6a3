//! The gray command line

// standard library
use std::path::PathBuf;
use std::process::ExitCode;

// external crates
use clap::Parser;
use gray::{run_simulation, Config, Error};
use gray_output::{Format, WriteFlags};
use log::{error, info};

/// A ray-tracing based Monte Carlo simulator for PET
#[derive(Parser, Debug)]
#[command(name = "gray", version, about)]
struct Cli {
    /// Scene description document
    scene: PathBuf,

    /// Isotope table, overriding the one the scene names
    #[arg(long)]
    iso: Option<PathBuf>,

    /// Materials table, overriding the one the scene names
    #[arg(long)]
    mat: Option<PathBuf>,

    /// Write the raw pre-electronics hit stream here
    #[arg(long)]
    hits: Option<PathBuf>,

    /// Write the post-electronics singles stream here
    #[arg(long)]
    singles: Option<PathBuf>,

    /// Write one coincidence stream per terminal coinc stage (repeatable)
    #[arg(long)]
    coinc: Vec<PathBuf>,

    /// Base RNG seed shared by all ranks before decorrelation
    #[arg(long, default_value_t = 5489)]
    seed: u64,

    /// Parallel ranks splitting the run into equal-photon intervals
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Simulated seconds
    #[arg(long, default_value_t = 1.0)]
    time: f64,

    /// Simulation start offset in seconds
    #[arg(long, default_value_t = 0.0)]
    start_time: f64,

    /// Write ASCII records instead of packed binary
    #[arg(long)]
    ascii: bool,

    /// Treat every source as constant-activity
    #[arg(long)]
    no_half_life: bool,

    /// Verbosity; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    stderrlog::new()
        .verbosity(usize::from(cli.verbose) + 2)
        .init()
        .ok();

    let config = Config {
        scene_path: cli.scene,
        materials_path: cli.mat,
        isotopes_path: cli.iso,
        hits_path: cli.hits,
        singles_path: cli.singles,
        coinc_paths: cli.coinc,
        format: if cli.ascii {
            Format::VariableAscii
        } else {
            Format::VariableBinary
        },
        flags: WriteFlags::all(),
        seed: cli.seed,
        threads: cli.threads,
        time: cli.time,
        start_time: cli.start_time,
        simulate_isotope_half_life: !cli.no_half_life,
        ..Default::default()
    };

    match run_simulation(&config) {
        Ok(stats) => {
            info!(
                "simulation complete: {} decays, {} photons traced",
                stats.physics.decays, stats.physics.photons
            );
            info!(
                "{} singles out, {} events dropped in the pipeline, {} transport errors",
                stats.daq.singles_out, stats.daq.dropped_out, stats.physics.errors
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// 1 for configuration and data-loading failures, 2 for runtime errors
fn exit_code(err: &Error) -> u8 {
    match err {
        Error::Config(_)
        | Error::FileNotFound(_)
        | Error::SceneFile(_)
        | Error::Physics(_)
        | Error::Sources(_)
        | Error::Scene(_)
        | Error::Daq(_) => 1,
        Error::IOError(_) | Error::Output(_) => 2,
    }
}
