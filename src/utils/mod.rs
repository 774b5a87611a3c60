pub mod constants;
pub mod parsing;
pub mod progress;
pub mod stats;

pub use constants::*;
pub use progress::ProgressReporter;
