use clap::{Parser, Subcommand};
use std::path::PathBuf;

use costlay_core::config::{HourBasis, Settings};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Cost column, hourly cost chart and totals overlay for usage dashboards"
)]
pub struct Config {
    /// Enable debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet period before a cycle runs, in milliseconds
    #[arg(long, global = true)]
    pub debounce: Option<u64>,

    /// Bucket hours and read naive dates in UTC instead of the local zone
    #[arg(long, global = true)]
    pub utc: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Simulate a usage dashboard that keeps re-rendering its table
    Demo {
        /// Page without a charting library (text fallback)
        #[arg(long)]
        no_chart: bool,

        /// Dark dashboard theme
        #[arg(long)]
        dark: bool,

        /// Length of the simulated session in seconds
        #[arg(long, default_value_t = 12)]
        seconds: u64,

        /// Write the last rendered page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run one cycle over a JSON rows fixture and print the resulting page
    Render {
        /// JSON array of rows (`date`, `kind`, `model`, `tokens`, `cost`, `cost_detail`)
        #[arg(long)]
        rows: PathBuf,

        /// Page without a charting library (text fallback)
        #[arg(long)]
        no_chart: bool,

        /// Dark dashboard theme
        #[arg(long)]
        dark: bool,

        /// Write the page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Command line overrides for [`Settings`]
pub trait MergeCli {
    /// Apply flags given on the command line (CLI wins over the config file)
    fn merge_cli(&mut self, cli: &Config);
}

impl MergeCli for Settings {
    fn merge_cli(&mut self, cli: &Config) {
        if let Some(debounce) = cli.debounce {
            self.debounce_ms = debounce;
        }
        if cli.utc {
            self.hour_basis = HourBasis::Utc;
        }
    }
}
