pub mod telemetry_reader;

pub use telemetry_reader::TelemetryReader;
