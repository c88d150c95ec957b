pub mod analytics;
pub mod cleaning;
pub mod etl;
pub mod normalizer;
pub mod pipeline;
pub mod query;
pub mod record_builder;
pub mod validator;
#[cfg(feature = "excel")]
pub mod workbook;

pub use crate::domain::model::{RawRow, SalesRecord, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
