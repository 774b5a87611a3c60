use crate::analyzers::{FleetAnalyzer, VehicleAnalyzer};
use crate::cli::args::{Cli, Commands, InputArgs};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::models::DateDerivation;
use crate::pipeline::Pipeline;
use crate::utils::progress::ProgressReporter;
use crate::writers::{preview_table, VehicleSummaryRow};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;

const PREVIEW_ROWS: usize = 5;

fn setup_logging(verbose: bool, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|e| AnalysisError::Config(format!("Failed to initialise logging: {}", e)))
}

fn load_config(input: &InputArgs) -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::load(input.config.as_deref())?;
    if let Some(path) = &input.input {
        config.input_path = path.clone();
    }
    Ok(config)
}

pub fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Analyze {
            input,
            output_dir,
            no_charts,
            low_battery_threshold,
            summary_json,
        } => {
            let mut config = load_config(&input)?;
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if no_charts {
                config.render_charts = false;
            }
            if let Some(threshold) = low_battery_threshold {
                config.low_battery_threshold = threshold;
            }
            if summary_json.is_some() {
                config.summary_json = summary_json;
            }
            let config = config.validated()?;

            println!("Fleet telemetry analysis");
            println!("Input file: {}", config.input_path.display());
            println!("Output directory: {}", config.output_dir.display());

            let progress = ProgressReporter::new_spinner("Starting analysis...", cli.quiet);
            let report = Pipeline::new(config).run(&progress)?;
            progress.finish_with_message("Analysis finished");

            println!("\n{}", report.summary());

            println!("\nVehicle summary preview:");
            println!("{}", preview_table(&report.vehicle_rows, PREVIEW_ROWS));
            println!("\nHourly summary preview:");
            println!("{}", preview_table(&report.hourly_rows, PREVIEW_ROWS));

            println!("\nAnalysis completed successfully!");
        }

        Commands::Validate { input } => {
            let config = load_config(&input)?.validated()?;
            println!("Validating telemetry file: {}", config.input_path.display());

            let progress = ProgressReporter::new_spinner("Validating data...", cli.quiet);
            let (dataset, report) = Pipeline::new(config).prepare()?;
            progress.finish_with_message("Validation complete");

            println!("\n{}", report.summary());
            if report.date_derivation == DateDerivation::Skipped {
                println!("⚠️  Some rows lack a valid calendar date; dates were not derived");
            }
            println!(
                "✅ {} records from {} vehicles ready for analysis",
                dataset.len(),
                dataset.unique_vehicles()
            );
        }

        Commands::Info { input, top } => {
            let config = load_config(&input)?.validated()?;
            println!("Analyzing telemetry file: {}", config.input_path.display());

            let progress = ProgressReporter::new_spinner("Loading data...", cli.quiet);
            let (dataset, _) = Pipeline::new(config).prepare()?;
            progress.finish_with_message(&format!("Loaded {} records", dataset.len()));

            let basic = FleetAnalyzer::new().calculate_statistics(&dataset)?;
            println!("\n{}", basic.summary());

            if top > 0 {
                let vehicles = VehicleAnalyzer::new().analyze(&dataset)?;
                let rows: Vec<VehicleSummaryRow> = vehicles
                    .by_activity()
                    .into_iter()
                    .take(top)
                    .map(VehicleSummaryRow::from)
                    .collect();
                println!("\nMost active vehicles (showing {}):", rows.len());
                println!("{}", preview_table(&rows, top));
            }
        }
    }

    Ok(())
}
