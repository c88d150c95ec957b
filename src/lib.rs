pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::cleaning::{clean_rows, CleaningOutcome, CleaningRun, RunState};
pub use crate::core::etl::{EtlEngine, EtlOutput};
pub use crate::core::pipeline::SalesPipeline;
pub use crate::core::record_builder::{split_header, BuilderOptions, RecordBuilder};
pub use crate::domain::model::{
    DashboardSummary, SalesRecord, ValidationVerdict, Violation, WorkbookLayout,
};
pub use crate::utils::error::{EtlError, Result};
