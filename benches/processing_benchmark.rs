use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fleet_analytics::analyzers::{
    BatteryAnalyzer, GeographicAnalyzer, InsightGenerator, TemporalAnalyzer, VehicleAnalyzer,
};
use fleet_analytics::models::{Dataset, RawRecord};
use fleet_analytics::processors::Preprocessor;

// Synthetic telemetry: one row per vehicle per hour, every tenth charge missing
fn create_test_records(vehicle_count: usize, days: usize) -> Vec<RawRecord> {
    let mut records = Vec::with_capacity(vehicle_count * days * 24);
    for vehicle in 0..vehicle_count {
        for day in 0..days {
            for hour in 0..24i32 {
                let n = vehicle * 31 + day * 7 + hour as usize;
                let charge = if n % 10 == 0 { None } else { Some((n % 100) as f64 + 0.5) };
                records.push(RawRecord::new(
                    format!("VIN{:05}", vehicle),
                    2024,
                    1 + (day / 28) as i32 % 12,
                    1 + (day % 28) as i32,
                    hour,
                    Some(0.0),
                    Some(12.8 + (n % 50) as f64 * 0.004),
                    Some(77.4 + (n % 70) as f64 * 0.003),
                    charge,
                ));
            }
        }
    }
    records
}

fn prepared_dataset(vehicle_count: usize, days: usize) -> Dataset {
    Preprocessor::new()
        .process(create_test_records(vehicle_count, days))
        .map(|(dataset, _)| dataset)
        .unwrap()
}

fn benchmark_preprocessing(c: &mut Criterion) {
    let records = create_test_records(50, 14);

    c.bench_function("preprocess", |b| {
        b.iter(|| {
            let (dataset, report) = Preprocessor::new().process(records.clone()).unwrap();
            black_box((dataset.len(), report.duplicates_removed))
        })
    });
}

fn benchmark_aggregators(c: &mut Criterion) {
    let dataset = prepared_dataset(50, 14);

    c.bench_function("vehicle_statistics", |b| {
        b.iter(|| black_box(VehicleAnalyzer::new().analyze(&dataset).unwrap().vehicles.len()))
    });

    c.bench_function("temporal_statistics", |b| {
        b.iter(|| black_box(TemporalAnalyzer::new().analyze(&dataset).unwrap().hourly.len()))
    });

    c.bench_function("geographic_statistics", |b| {
        b.iter(|| black_box(GeographicAnalyzer::new().analyze(&dataset).unwrap().cells.len()))
    });

    c.bench_function("battery_distribution", |b| {
        b.iter(|| black_box(BatteryAnalyzer::new().analyze(&dataset).unwrap().uncategorized))
    });

    c.bench_function("insights", |b| {
        b.iter(|| black_box(InsightGenerator::new().generate(&dataset).unwrap().low_battery_records))
    });
}

fn benchmark_varying_data_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis_by_fleet_size");

    for &size in &[10, 50, 100, 500] {
        group.bench_with_input(BenchmarkId::new("vehicles", size), &size, |b, &vehicle_count| {
            let records = create_test_records(vehicle_count, 7);
            b.iter(|| {
                let (dataset, _) = Preprocessor::new().process(records.clone()).unwrap();
                let vehicles = VehicleAnalyzer::new().analyze(&dataset).unwrap();
                black_box(vehicles.avg_records_per_vehicle)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_preprocessing,
    benchmark_aggregators,
    benchmark_varying_data_sizes
);
criterion_main!(benches);
