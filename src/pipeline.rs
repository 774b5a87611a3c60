use crate::analyzers::{
    BatteryAnalyzer, BatteryDistribution, FleetAnalyzer, FleetStatistics, GeographicAnalyzer,
    GeographicStatistics, InsightGenerator, InsightSummary, TemporalAnalyzer, TemporalStatistics,
    VehicleAnalyzer, VehicleStatistics,
};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::models::{Dataset, RawRecord};
use crate::processors::{PreprocessReport, Preprocessor};
use crate::readers::TelemetryReader;
use crate::utils::progress::ProgressReporter;
use crate::visualization::DashboardRenderer;
use crate::writers::{write_json, HourlySummaryRow, SummaryWriter, VehicleSummaryRow};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Output of the five aggregators over one cleaned dataset
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResults {
    pub basic: FleetStatistics,
    pub vehicles: VehicleStatistics,
    pub temporal: TemporalStatistics,
    pub geographic: GeographicStatistics,
    pub battery: BatteryDistribution,
}

impl AnalysisResults {
    pub fn summary(&self) -> String {
        [
            self.basic.summary(),
            self.vehicles.summary(),
            self.temporal.summary(),
            self.geographic.summary(),
            self.battery.summary(),
        ]
        .join("\n\n")
    }
}

/// Files produced by a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Artifacts {
    /// `None` when chart rendering is disabled
    pub chart: Option<PathBuf>,
    pub vehicle_summary: PathBuf,
    pub hourly_summary: PathBuf,
    pub summary_json: Option<PathBuf>,
}

/// Everything a completed run computed
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub input: PathBuf,
    pub preprocess: PreprocessReport,
    pub results: AnalysisResults,
    pub insights: InsightSummary,
    pub artifacts: Artifacts,
    #[serde(skip)]
    pub vehicle_rows: Vec<VehicleSummaryRow>,
    #[serde(skip)]
    pub hourly_rows: Vec<HourlySummaryRow>,
}

impl PipelineReport {
    pub fn summary(&self) -> String {
        let mut outputs = Vec::new();
        if let Some(chart) = &self.artifacts.chart {
            outputs.push(format!("- {}", chart.display()));
        }
        outputs.push(format!("- {}", self.artifacts.vehicle_summary.display()));
        outputs.push(format!("- {}", self.artifacts.hourly_summary.display()));
        if let Some(json) = &self.artifacts.summary_json {
            outputs.push(format!("- {}", json.display()));
        }

        format!(
            "{}\n\n{}\n\n{}\n\nGenerated files:\n{}",
            self.preprocess.summary(),
            self.results.summary(),
            self.insights.summary(),
            outputs.join("\n")
        )
    }
}

/// The staged analysis run. Each stage takes the previous stage's value and
/// returns a new one; nothing is written before every aggregate succeeds.
pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn load(&self) -> Result<Vec<RawRecord>> {
        let reader = TelemetryReader::with_delimiter(self.config.delimiter_byte()?);
        reader.read_records(&self.config.input_path)
    }

    /// Load and clean the input without running any analysis
    pub fn prepare(&self) -> Result<(Dataset, PreprocessReport)> {
        let raw = self.load()?;
        Preprocessor::new().process(raw)
    }

    pub fn analyze(&self, dataset: &Dataset) -> Result<AnalysisResults> {
        Ok(AnalysisResults {
            basic: FleetAnalyzer::new().calculate_statistics(dataset)?,
            vehicles: VehicleAnalyzer::new().analyze(dataset)?,
            temporal: TemporalAnalyzer::new().analyze(dataset)?,
            geographic: GeographicAnalyzer::new().analyze(dataset)?,
            battery: BatteryAnalyzer::new().analyze(dataset)?,
        })
    }

    pub fn visualize(&self, dataset: &Dataset, results: &AnalysisResults) -> Result<Option<PathBuf>> {
        if !self.config.render_charts {
            info!("Chart rendering disabled");
            return Ok(None);
        }
        let path = self.config.chart_path();
        DashboardRenderer::new(self.config.chart_width, self.config.chart_height)
            .with_font_path(self.config.font_path.clone())
            .render(dataset, &results.temporal, &results.vehicles, &path)?;
        Ok(Some(path))
    }

    pub fn insights(&self, dataset: &Dataset) -> Result<InsightSummary> {
        InsightGenerator::with_thresholds(self.config.thresholds()).generate(dataset)
    }

    pub fn export(
        &self,
        results: &AnalysisResults,
    ) -> Result<(Vec<VehicleSummaryRow>, Vec<HourlySummaryRow>)> {
        let writer = SummaryWriter::new();
        let vehicles =
            writer.write_vehicle_summary(&results.vehicles.vehicles, &self.config.vehicle_summary_path())?;
        let hourly =
            writer.write_hourly_summary(&results.temporal.hourly, &self.config.hourly_summary_path())?;
        Ok((vehicles, hourly))
    }

    /// Run every stage in order, stopping at the first failure.
    pub fn run(&self, progress: &ProgressReporter) -> Result<PipelineReport> {
        progress.set_message("Loading data...");
        let raw = self.load()?;

        progress.set_message("Preprocessing data...");
        let (dataset, preprocess) = Preprocessor::new().process(raw)?;

        progress.set_message("Computing fleet statistics...");
        let results = self.analyze(&dataset)?;

        progress.set_message("Creating visualizations...");
        let chart = self.visualize(&dataset, &results)?;

        progress.set_message("Generating insights...");
        let insights = self.insights(&dataset)?;

        progress.set_message("Exporting summaries...");
        let (vehicle_rows, hourly_rows) = self.export(&results)?;

        let mut report = PipelineReport {
            input: self.config.input_path.clone(),
            preprocess,
            results,
            insights,
            artifacts: Artifacts {
                chart,
                vehicle_summary: self.config.vehicle_summary_path(),
                hourly_summary: self.config.hourly_summary_path(),
                summary_json: None,
            },
            vehicle_rows,
            hourly_rows,
        };

        if let Some(path) = &self.config.summary_json {
            report.artifacts.summary_json = Some(path.clone());
            write_json(&report, path)?;
        }

        info!(
            "Analysis complete: {} records from {} vehicles",
            report.results.basic.total_records, report.results.basic.unique_vehicles
        );
        Ok(report)
    }
}
