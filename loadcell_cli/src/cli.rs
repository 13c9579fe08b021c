//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "loadcell", version, about = "Load-cell monitor CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/loadcell.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream the device and print live window statistics
    Monitor {
        /// Serial port (overrides config)
        #[arg(long)]
        port: Option<String>,
        /// Baud rate (overrides config)
        #[arg(long)]
        baud: Option<u32>,
        /// Stop after this many seconds (run until Ctrl-C when absent)
        #[arg(long, value_name = "SECS")]
        duration_s: Option<f64>,
        /// Statistics window in seconds (overrides config)
        #[arg(long, value_name = "SECS")]
        window_s: Option<f64>,
        /// Record from start and export to this CSV on exit
        #[arg(long, value_name = "FILE")]
        record: Option<PathBuf>,
        /// Calibration JSON to load before streaming
        #[arg(long, value_name = "FILE")]
        calibration: Option<PathBuf>,
        /// Save calibration JSON here on exit
        #[arg(long, value_name = "FILE")]
        save_calibration: Option<PathBuf>,
        /// Tare every channel once enough samples have arrived
        #[arg(long, action = ArgAction::SetTrue)]
        tare: bool,
        /// Use the simulated device instead of a serial port
        #[arg(long, action = ArgAction::SetTrue)]
        simulate: bool,
    },
    /// List serial ports visible on this system
    Ports,
    /// Quick health check (simulated stream end-to-end)
    SelfCheck,
}
