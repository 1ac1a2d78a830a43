//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use forcebench_traits::Direction;
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "forcebench", version, about = "Linear actuator force-tracking bench")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/forcebench.toml")]
    pub config: PathBuf,

    /// Setpoint file (.csv or .txt); replaces [setpoints] from the config
    #[arg(long, value_name = "FILE")]
    pub setpoints: Option<PathBuf>,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace). RUST_LOG wins when set.
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum DirectionArg {
    Extend,
    Retract,
}

impl From<DirectionArg> for Direction {
    fn from(d: DirectionArg) -> Self {
        match d {
            DirectionArg::Extend => Direction::Extend,
            DirectionArg::Retract => Direction::Retract,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Track the setpoint sequence until interrupted
    Run {
        /// Stop cleanly after this many setpoints have been reached
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
        /// Override control.force_ceiling
        #[arg(long, value_name = "FORCE")]
        max_force: Option<f64>,
    },
    /// Move the actuator by hand with the force guard active
    Jog {
        /// Distance in millimetres
        #[arg(long, value_name = "MM")]
        distance: f64,
        #[arg(long, value_enum)]
        direction: DirectionArg,
    },
    /// Read the load cell and report statistics
    Probe {
        #[arg(long, default_value_t = 1000)]
        samples: usize,
    },
    /// Return the actuator home and release the hardware
    Release,
    /// Validate config and setpoints and bring up the hardware (or sim)
    SelfCheck,
}
