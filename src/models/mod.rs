pub mod buckets;
pub mod dataset;
pub mod record;

pub use buckets::{BatteryRange, TimePeriod, LATITUDE_BANDS, LONGITUDE_BANDS};
pub use dataset::{Dataset, DateDerivation};
pub use record::{RawRecord, RecordKey, TelemetryRecord};
