pub mod summary_writer;

pub use summary_writer::{preview_table, write_json, HourlySummaryRow, SummaryWriter, VehicleSummaryRow};
