pub mod config;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod registry;
pub mod workbook;

pub use config::Config;
pub use error::PipelineError;
pub use pipeline::{build_table, run, RunSummary};
