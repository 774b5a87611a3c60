use fleet_analytics::analyzers::Priority;
use fleet_analytics::models::{BatteryRange, DateDerivation, TimePeriod};
use fleet_analytics::utils::ProgressReporter;
use fleet_analytics::{AnalysisConfig, AnalysisError, Pipeline};
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "vin,yearr,mmm,ddd,hr,half_hour,avg_lat,avg_long,avg_bat_charge";

fn write_input(dir: &Path, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join("fleet_data.csv");
    let mut contents = String::from(HEADER);
    for row in rows {
        contents.push('\n');
        contents.push_str(row);
    }
    contents.push('\n');
    std::fs::write(&path, contents).expect("Failed to write input");
    path
}

fn config(dir: &TempDir, input: std::path::PathBuf, render_charts: bool) -> AnalysisConfig {
    AnalysisConfig {
        input_path: input,
        output_dir: dir.path().join("reports"),
        render_charts,
        chart_width: 800,
        chart_height: 600,
        ..Default::default()
    }
}

fn fleet_rows() -> Vec<String> {
    let mut rows = Vec::new();
    for vehicle in 0..6 {
        for hour in 0..24 {
            let charge = (vehicle * 15 + hour * 3) % 101;
            rows.push(format!(
                "VIN{:03},2024,7,{},{},0,{:.4},{:.4},{}",
                vehicle,
                1 + vehicle,
                hour,
                12.8 + vehicle as f64 * 0.05 + hour as f64 * 0.001,
                77.4 + vehicle as f64 * 0.04,
                charge
            ));
        }
    }
    rows
}

#[test]
fn test_end_to_end_analysis() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let rows = fleet_rows();
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let input = write_input(temp_dir.path(), &row_refs);
    let config = config(&temp_dir, input, true);

    let report = Pipeline::new(config.clone())
        .run(&ProgressReporter::hidden())
        .expect("Pipeline failed");

    assert!(config.chart_path().exists());
    assert!(std::fs::metadata(config.chart_path()).unwrap().len() > 1000);
    assert!(config.vehicle_summary_path().exists());
    assert!(config.hourly_summary_path().exists());

    // Per-vehicle record counts cover every row
    let total: usize = report.results.vehicles.vehicles.iter().map(|v| v.records).sum();
    assert_eq!(total, 144);
    assert_eq!(report.results.basic.unique_vehicles, 6);
    assert_eq!(report.results.temporal.hourly.len(), 24);
    assert_eq!(report.results.geographic.cells.len(), 25);

    let hourly = std::fs::read_to_string(config.hourly_summary_path()).unwrap();
    assert_eq!(hourly.lines().count(), 25);
    let vehicles = std::fs::read_to_string(config.vehicle_summary_path()).unwrap();
    assert!(vehicles.starts_with(
        "vin,avg_battery,battery_std,min_battery,max_battery,total_records,avg_latitude,avg_longitude"
    ));
    assert_eq!(vehicles.lines().count(), 7);
}

#[test]
fn test_single_vehicle_scenario() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_input(
        temp_dir.path(),
        &[
            "V1,2024,1,15,1,0,12.9,77.6,10",
            "V1,2024,1,15,13,0,12.9,77.6,50",
            "V1,2024,1,15,20,0,12.9,77.6,90",
        ],
    );
    let config = config(&temp_dir, input, false);

    let report = Pipeline::new(config.clone())
        .run(&ProgressReporter::hidden())
        .expect("Pipeline failed");

    assert_eq!(report.insights.avg_battery, 50.0);
    assert_eq!(report.insights.low_battery_records, 1);
    assert!((report.insights.low_battery_percentage - 33.3).abs() < 0.05);
    assert!(report.insights.has_priority(Priority::High));

    let periods: Vec<TimePeriod> = report
        .results
        .temporal
        .periods
        .iter()
        .filter(|p| p.records > 0)
        .map(|p| p.period)
        .collect();
    assert_eq!(periods, vec![TimePeriod::Night, TimePeriod::Afternoon, TimePeriod::Evening]);

    assert_eq!(report.results.battery.range(BatteryRange::Critical).records, 1);
    assert_eq!(report.results.battery.range(BatteryRange::Medium).records, 1);
    assert_eq!(report.results.battery.range(BatteryRange::Full).records, 1);

    let vehicles = std::fs::read_to_string(config.vehicle_summary_path()).unwrap();
    assert_eq!(vehicles.lines().nth(1), Some("V1,50.0,40.0,10.0,90.0,3,12.9,77.6"));
}

#[test]
fn test_missing_column_produces_no_outputs() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("fleet_data.csv");
    std::fs::write(&input, "vin,yearr,mmm,ddd,hr,half_hour,avg_lat,avg_long\nV1,2024,1,1,1,0,1.0,2.0\n")
        .unwrap();
    let config = config(&temp_dir, input, true);

    let result = Pipeline::new(config.clone()).run(&ProgressReporter::hidden());

    match result {
        Err(AnalysisError::Schema { missing }) => assert_eq!(missing, vec!["avg_bat_charge".to_string()]),
        other => panic!("Expected schema error, got {:?}", other.map(|_| ())),
    }
    assert!(!config.chart_path().exists());
    assert!(!config.vehicle_summary_path().exists());
    assert!(!config.hourly_summary_path().exists());
}

#[test]
fn test_missing_input_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = config(&temp_dir, temp_dir.path().join("absent.csv"), false);

    let result = Pipeline::new(config).run(&ProgressReporter::hidden());
    assert!(matches!(result, Err(AnalysisError::FileNotFound { .. })));
}

#[test]
fn test_all_battery_values_missing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_input(
        temp_dir.path(),
        &["V1,2024,1,15,1,0,12.9,77.6,", "V2,2024,1,15,2,0,12.9,77.6,NA"],
    );
    let config = config(&temp_dir, input, false);

    let result = Pipeline::new(config.clone()).run(&ProgressReporter::hidden());
    assert!(matches!(result, Err(AnalysisError::MissingData(_))));
    assert!(!config.vehicle_summary_path().exists());
}

#[test]
fn test_prepare_reports_duplicates() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_input(
        temp_dir.path(),
        &[
            "V1,2024,1,15,1,0,12.9,77.6,40",
            "V1,2024,1,15,1,0,12.9,77.6,40",
            "V2,2024,1,15,2,0,,,60",
        ],
    );
    let (dataset, report) = Pipeline::new(config(&temp_dir, input, false))
        .prepare()
        .expect("Preparation failed");

    assert_eq!(report.input_records, 3);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.latitudes(), vec![12.9]);
}

#[test]
fn test_rows_with_blank_key_fields_are_analyzed() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = write_input(
        temp_dir.path(),
        &[
            "V1,2024,1,1,3,0,1,1,50",
            "V2,2024,1,1,,0,1,1,60",
            "V3,2024,1,,-1,0,1,1,70",
        ],
    );
    let config = config(&temp_dir, input, false);

    let report = Pipeline::new(config.clone())
        .run(&ProgressReporter::hidden())
        .expect("Pipeline failed");

    assert_eq!(report.preprocess.date_derivation, DateDerivation::Skipped);
    let null_columns: Vec<&str> = report
        .preprocess
        .null_counts
        .iter()
        .map(|n| n.column.as_str())
        .collect();
    assert_eq!(null_columns, vec!["ddd", "hr"]);

    assert_eq!(report.results.basic.total_records, 3);
    assert_eq!(report.results.basic.hour_range, Some((-1, 3)));
    let labelled: usize = report.results.temporal.periods.iter().map(|p| p.records).sum();
    assert_eq!(labelled, 1);

    let hourly = std::fs::read_to_string(config.hourly_summary_path()).unwrap();
    let rows: Vec<&str> = hourly.lines().skip(1).collect();
    assert_eq!(rows, vec!["-1,70.0,1,1", "3,50.0,1,1"]);
}

#[test]
fn test_extra_columns_distinguish_duplicates() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let input = temp_dir.path().join("fleet_data.csv");
    std::fs::write(
        &input,
        format!(
            "{},odometer\nV1,2024,1,1,1,0,1,1,50,100\nV1,2024,1,1,1,0,1,1,50,200\nV1,2024,1,1,1,0,1,1,50,200\n",
            HEADER
        ),
    )
    .unwrap();

    let (dataset, report) = Pipeline::new(config(&temp_dir, input, false))
        .prepare()
        .expect("Preparation failed");

    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(dataset.len(), 2);
}
