use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fleet-analytics")]
#[command(about = "Battery, activity and location analytics for vehicle fleet telemetry")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, conflicts_with = "verbose", help = "Only log errors and hide progress")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

/// Options shared by every command that reads telemetry
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    #[arg(short, long, help = "Telemetry CSV file [default: fleet_data.csv]")]
    pub input: Option<PathBuf>,

    #[arg(short, long, help = "Configuration file (TOML, YAML or JSON)")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full analysis: statistics, charts, insights and CSV exports
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long, help = "Directory for generated files [default: .]")]
        output_dir: Option<PathBuf>,

        #[arg(long, help = "Skip rendering the chart image")]
        no_charts: bool,

        #[arg(long, help = "Charge level (%) below which a record counts as low battery")]
        low_battery_threshold: Option<f64>,

        #[arg(long, help = "Write the full run summary as JSON to this path")]
        summary_json: Option<PathBuf>,
    },

    /// Check that the input loads and report what preprocessing would change
    Validate {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print basic fleet statistics and the most active vehicles
    Info {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long, default_value = "10")]
        top: usize,
    },
}
