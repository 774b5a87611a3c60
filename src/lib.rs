pub mod analyzers;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod visualization;
pub mod writers;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};
pub use pipeline::{Pipeline, PipelineReport};
