pub mod preprocessor;

pub use preprocessor::{ColumnNulls, PreprocessReport, Preprocessor};
