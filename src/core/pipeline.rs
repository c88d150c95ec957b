use crate::config::is_workbook;
use crate::core::cleaning::CleaningRun;
use crate::core::record_builder::{split_header, BuilderOptions};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    CleaningSummary, DashboardSummary, RawRow, SalesRecord, TransformResult, COLUMNS,
};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const CLEAN_CSV: &str = "clean_records.csv";
pub const CLEAN_TSV: &str = "clean_records.tsv";
pub const REJECTED_CSV: &str = "rejected_records.csv";
pub const SUMMARY_JSON: &str = "summary.json";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads a delimited sales export, cleans it and writes a report archive.
pub struct SalesPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> SalesPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    #[cfg(feature = "excel")]
    fn decode_workbook(&self, data: &[u8]) -> Result<Vec<RawRow>> {
        let layout = self.config.workbook_layout();
        tracing::debug!("Reading first sheet with {:?} layout", layout);
        crate::core::workbook::decode_workbook(data, layout)
    }

    #[cfg(not(feature = "excel"))]
    fn decode_workbook(&self, _data: &[u8]) -> Result<Vec<RawRow>> {
        Err(EtlError::UnsupportedFormatError {
            path: format!(
                "{} (built without workbook support)",
                self.config.input_path()
            ),
        })
    }
}

#[derive(Debug, Serialize)]
struct RejectedRow<'a> {
    row: usize,
    transaction_id: &'a str,
    columns: Vec<&'static str>,
    reasons: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ReportSummary<'a> {
    cleaning: &'a CleaningSummary,
    dashboard: &'a DashboardSummary,
    rejected: Vec<RejectedRow<'a>>,
}

/// Decodes delimited bytes into a raw table, dropping blank lines.
pub fn decode_table(data: &[u8], delimiter: u8) -> Result<Vec<RawRow>> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(data);

    let mut table = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        table.push(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}

fn write_records(records: &[SalesRecord], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    if records.is_empty() {
        writer.write_record(COLUMNS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}

fn write_rejected(result: &TransformResult) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = COLUMNS.to_vec();
    header.push("reasons");
    writer.write_record(&header)?;

    for (record, verdict) in result.rejected() {
        writer.write_record([
            record.transaction_id.clone(),
            record.date.clone(),
            record.product_id.clone(),
            record.product_name.clone(),
            record.category.clone(),
            record.quantity.to_string(),
            record.unit_price.to_string(),
            record.total_amount.to_string(),
            record.country.clone(),
            record.payment_method.clone(),
            verdict.reasons().join("; "),
        ])?;
    }
    writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}

fn write_summary(result: &TransformResult) -> Result<Vec<u8>> {
    let rejected = result
        .records
        .iter()
        .zip(result.verdicts.iter())
        .enumerate()
        .filter(|(_, (_, verdict))| !verdict.is_valid)
        .map(|(index, (record, verdict))| RejectedRow {
            row: index + 1,
            transaction_id: &record.transaction_id,
            columns: verdict.violations.iter().map(|v| v.column()).collect(),
            reasons: verdict.reasons(),
        })
        .collect();

    let report = ReportSummary {
        cleaning: &result.summary,
        dashboard: &result.dashboard,
        rejected,
    };
    Ok(serde_json::to_vec_pretty(&report)?)
}

/// 依設定的輸出格式打包成 ZIP
pub fn build_archive(result: &TransformResult, formats: &[String]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for format in formats {
        match format.as_str() {
            "csv" => {
                zip.start_file(CLEAN_CSV, options)?;
                zip.write_all(&write_records(&result.valid_records, b',')?)?;
                zip.start_file(REJECTED_CSV, options)?;
                zip.write_all(&write_rejected(result)?)?;
            }
            "tsv" => {
                zip.start_file(CLEAN_TSV, options)?;
                zip.write_all(&write_records(&result.valid_records, b'\t')?)?;
            }
            "json" => {
                zip.start_file(SUMMARY_JSON, options)?;
                zip.write_all(&write_summary(result)?)?;
            }
            other => {
                return Err(EtlError::InvalidConfigValueError {
                    field: "output_formats".to_string(),
                    value: other.to_string(),
                    reason: "Unsupported output format".to_string(),
                })
            }
        }
    }

    Ok(zip.finish()?.into_inner())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SalesPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawRow>> {
        let path = self.config.input_path();
        tracing::info!("📥 Reading sales export from: {}", path);

        let data = self.storage.read_file(path).await?;
        let table = if is_workbook(path) {
            self.decode_workbook(&data)?
        } else {
            decode_table(&data, self.config.delimiter())?
        };
        tracing::debug!("Decoded {} non-blank lines", table.len());

        if table.is_empty() {
            return Err(EtlError::EmptyInputError {
                path: path.to_string(),
            });
        }

        let rows = if self.config.has_header() {
            split_header(table)
        } else {
            table
        };
        Ok(rows)
    }

    async fn transform(&self, rows: Vec<RawRow>) -> Result<TransformResult> {
        let mut run = CleaningRun::new(BuilderOptions {
            fold_accents: self.config.fold_accents(),
        });
        let outcome = run.process(&rows).clone();

        let dashboard = DashboardSummary::build(
            &outcome.valid_records,
            self.config.month_filter(),
            self.config.top_products_limit(),
        );
        tracing::debug!(
            "Dashboard: {} transactions, total {:.2}",
            dashboard.total_transactions,
            dashboard.total_sales
        );

        Ok(TransformResult {
            records: outcome.records,
            verdicts: outcome.verdicts,
            valid_records: outcome.valid_records,
            summary: outcome.summary,
            dashboard,
        })
    }

    async fn load(&self, result: &TransformResult) -> Result<String> {
        let archive_name = self.config.archive_name();
        let output_path = format!(
            "{}/{}",
            self.config.output_path().trim_end_matches('/'),
            archive_name
        );

        tracing::debug!(
            "Creating ZIP archive for formats: {}",
            self.config.output_formats().join(", ")
        );
        let zip_data = build_archive(result, self.config.output_formats())?;

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(archive_name, &zip_data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::WorkbookLayout;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct TestConfig {
        input: &'static str,
        has_header: bool,
        month: Option<u32>,
        formats: Vec<String>,
    }

    impl Default for TestConfig {
        fn default() -> Self {
            Self {
                input: "ventas.csv",
                has_header: true,
                month: None,
                formats: vec!["csv".to_string(), "json".to_string()],
            }
        }
    }

    impl ConfigProvider for TestConfig {
        fn input_path(&self) -> &str {
            self.input
        }
        fn output_path(&self) -> &str {
            "./out/"
        }
        fn delimiter(&self) -> u8 {
            b','
        }
        fn has_header(&self) -> bool {
            self.has_header
        }
        fn workbook_layout(&self) -> WorkbookLayout {
            WorkbookLayout::Packed
        }
        fn fold_accents(&self) -> bool {
            false
        }
        fn top_products_limit(&self) -> usize {
            5
        }
        fn month_filter(&self) -> Option<u32> {
            self.month
        }
        fn output_formats(&self) -> &[String] {
            &self.formats
        }
        fn archive_name(&self) -> &str {
            "report.zip"
        }
    }

    const SALES_CSV: &str = "\u{feff}id_transaccion,fecha,id_producto,nombre_producto,categoria,cantidad,precio_unitario,total_venta,pais,metodo_pago
T1,2024-03-15,P1,Widget,Tools,2,10.00,20.00,Mexico,Card

T2,not-a-date,P2,Gadget,Tools,1,5,5,Mexico,Cash
T3,2024-04-02,P1,Widget,Tools,3,10,30,Chile,Cash
";

    #[test]
    fn test_decode_table_skips_blank_lines_and_bom() {
        let table = decode_table(SALES_CSV.as_bytes(), b',').unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table[0][0], "id_transaccion");
        assert_eq!(table[1].len(), 10);
    }

    #[test]
    fn test_decode_table_accepts_ragged_rows() {
        let table = decode_table(b"a;b;c\nT1;2024-01-01\n", b';').unwrap();
        assert_eq!(table, vec![vec!["a", "b", "c"], vec!["T1", "2024-01-01"]]);
    }

    #[tokio::test]
    async fn test_extract_drops_header() {
        let storage = MockStorage::default();
        storage.put("ventas.csv", SALES_CSV.as_bytes()).await;
        let pipeline = SalesPipeline::new(storage, TestConfig::default());

        let rows = pipeline.extract().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "T1");
    }

    #[tokio::test]
    async fn test_extract_without_header_keeps_first_row() {
        let storage = MockStorage::default();
        storage.put("ventas.csv", SALES_CSV.as_bytes()).await;
        let config = TestConfig {
            has_header: false,
            ..TestConfig::default()
        };
        let pipeline = SalesPipeline::new(storage, config);

        assert_eq!(pipeline.extract().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_extract_empty_file_is_error() {
        let storage = MockStorage::default();
        storage.put("ventas.csv", b"\n\n").await;
        let pipeline = SalesPipeline::new(storage, TestConfig::default());

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EtlError::EmptyInputError { .. }));
    }

    #[tokio::test]
    async fn test_extract_header_only_yields_no_rows() {
        let storage = MockStorage::default();
        storage
            .put("ventas.csv", b"id_transaccion,fecha,id_producto\n")
            .await;
        let pipeline = SalesPipeline::new(storage, TestConfig::default());

        assert!(pipeline.extract().await.unwrap().is_empty());
    }

    #[cfg(feature = "excel")]
    #[tokio::test]
    async fn test_extract_workbook_feeds_same_flow() {
        let storage = MockStorage::default();
        storage
            .put("ventas.xlsx", include_bytes!("../../tests/fixtures/ventas.xlsx"))
            .await;
        let config = TestConfig {
            input: "ventas.xlsx",
            ..TestConfig::default()
        };
        let pipeline = SalesPipeline::new(storage, config);

        let rows = pipeline.extract().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][3], "Café Molido");

        let result = pipeline.transform(rows).await.unwrap();
        assert_eq!(result.summary.valid, 2);
        assert_eq!(result.dashboard.total_sales, 50.0);
    }

    #[cfg(not(feature = "excel"))]
    #[tokio::test]
    async fn test_extract_workbook_without_feature_is_unsupported() {
        let storage = MockStorage::default();
        storage.put("ventas.xlsx", b"PK").await;
        let config = TestConfig {
            input: "ventas.xlsx",
            ..TestConfig::default()
        };
        let pipeline = SalesPipeline::new(storage, config);

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EtlError::UnsupportedFormatError { .. }));
    }

    #[tokio::test]
    async fn test_transform_filters_and_aggregates() {
        let storage = MockStorage::default();
        storage.put("ventas.csv", SALES_CSV.as_bytes()).await;
        let pipeline = SalesPipeline::new(storage, TestConfig::default());

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();

        assert_eq!(result.summary.total, 3);
        assert_eq!(result.summary.valid, 2);
        assert_eq!(result.valid_records.len(), 2);
        assert_eq!(result.dashboard.total_sales, 50.0);
        assert_eq!(result.dashboard.top_products[0].name, "Widget");
        assert_eq!(result.dashboard.top_products[0].quantity, 5.0);
        assert_eq!(result.rejected().count(), 1);
    }

    #[tokio::test]
    async fn test_transform_applies_month_filter() {
        let storage = MockStorage::default();
        storage.put("ventas.csv", SALES_CSV.as_bytes()).await;
        let config = TestConfig {
            month: Some(4),
            ..TestConfig::default()
        };
        let pipeline = SalesPipeline::new(storage, config);

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();
        assert_eq!(result.dashboard.total_transactions, 1);
        assert_eq!(result.dashboard.total_sales, 30.0);
        assert_eq!(result.dashboard.sales_by_month.len(), 2);
    }

    #[tokio::test]
    async fn test_load_writes_archive() {
        let storage = MockStorage::default();
        storage.put("ventas.csv", SALES_CSV.as_bytes()).await;
        let pipeline = SalesPipeline::new(storage.clone(), TestConfig::default());

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();
        let output_path = pipeline.load(&result).await.unwrap();
        assert_eq!(output_path, "./out/report.zip");

        let zip_data = storage.get_file("report.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        assert_eq!(archive.len(), 3);

        let mut rejected = String::new();
        archive
            .by_name(REJECTED_CSV)
            .unwrap()
            .read_to_string(&mut rejected)
            .unwrap();
        assert!(rejected.starts_with("id_transaccion,fecha,"));
        assert!(rejected.lines().next().unwrap().ends_with(",metodo_pago,reasons"));
        assert!(rejected.contains("T2,not-a-date"));
        assert!(rejected.contains("invalid date"));

        let mut summary = String::new();
        archive
            .by_name(SUMMARY_JSON)
            .unwrap()
            .read_to_string(&mut summary)
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&summary).unwrap();
        assert_eq!(json["cleaning"]["valid"], 2);
        assert_eq!(json["rejected"][0]["row"], 2);
        assert_eq!(json["rejected"][0]["reasons"][0], "invalid date");
        assert_eq!(json["rejected"][0]["columns"][0], "fecha");
    }

    #[test]
    fn test_build_archive_with_no_valid_records_still_has_header() {
        let result = TransformResult {
            records: Vec::new(),
            verdicts: Vec::new(),
            valid_records: Vec::new(),
            summary: CleaningSummary::default(),
            dashboard: DashboardSummary::build(&[], None, 5),
        };
        let data = build_archive(&result, &["tsv".to_string()]).unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();

        let mut tsv = String::new();
        archive
            .by_name(CLEAN_TSV)
            .unwrap()
            .read_to_string(&mut tsv)
            .unwrap();
        assert!(tsv.starts_with("id_transaccion\tfecha"));
    }

    #[test]
    fn test_build_archive_rejects_unknown_format() {
        let result = TransformResult {
            records: Vec::new(),
            verdicts: Vec::new(),
            valid_records: Vec::new(),
            summary: CleaningSummary::default(),
            dashboard: DashboardSummary::build(&[], None, 5),
        };
        assert!(build_archive(&result, &["xml".to_string()]).is_err());
    }
}
