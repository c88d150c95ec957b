use crate::domain::model::{RawRow, TransformResult, WorkbookLayout};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn delimiter(&self) -> u8;
    fn has_header(&self) -> bool;
    fn workbook_layout(&self) -> WorkbookLayout;
    fn fold_accents(&self) -> bool;
    fn top_products_limit(&self) -> usize;
    fn month_filter(&self) -> Option<u32>;
    fn output_formats(&self) -> &[String];
    fn archive_name(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawRow>>;
    async fn transform(&self, rows: Vec<RawRow>) -> Result<TransformResult>;
    async fn load(&self, result: &TransformResult) -> Result<String>;
}
