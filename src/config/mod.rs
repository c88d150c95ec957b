pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::WorkbookLayout;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const INPUT_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];
pub const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsm", "ods"];
pub const OUTPUT_FORMATS: [&str; 3] = ["csv", "tsv", "json"];
pub const DEFAULT_ARCHIVE_NAME: &str = "sales_report.zip";

/// Input extensions this build can read; workbooks need the `excel` feature.
pub fn supported_input_extensions() -> Vec<&'static str> {
    let mut extensions = INPUT_EXTENSIONS.to_vec();
    if cfg!(feature = "excel") {
        extensions.extend(WORKBOOK_EXTENSIONS);
    }
    extensions
}

pub fn is_workbook(path: &str) -> bool {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "sales-etl")]
#[command(about = "Clean, validate and summarize a sales spreadsheet export")]
pub struct CliConfig {
    /// Sales export (CSV/TSV or workbook, header row + one sale per row)
    #[arg(short, long)]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = ",")]
    pub delimiter: String,

    /// The first row is data, not a header
    #[arg(long)]
    pub no_header: bool,

    /// Workbook layout: `packed` reads comma-joined sales from column B
    #[arg(long, value_enum, default_value_t = WorkbookLayout::Packed)]
    pub sheet_layout: WorkbookLayout,

    /// Strip accents from text fields
    #[arg(long)]
    pub fold_accents: bool,

    #[arg(long, default_value = "5")]
    pub top_products: usize,

    /// Restrict dashboard figures to one calendar month (1-12)
    #[arg(long)]
    pub month: Option<u32>,

    #[arg(long, value_delimiter = ',', default_value = "csv,json")]
    pub formats: Vec<String>,

    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
    pub archive_name: String,

    /// Only list records of this category
    #[arg(long)]
    pub category: Option<String>,

    /// Only list records whose product, id or country contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// Page of the record listing to print (0 disables the listing)
    #[arg(long, default_value = "0")]
    pub page: usize,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-phase time and memory")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn delimiter(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }

    fn has_header(&self) -> bool {
        !self.no_header
    }

    fn workbook_layout(&self) -> WorkbookLayout {
        self.sheet_layout
    }

    fn fold_accents(&self) -> bool {
        self.fold_accents
    }

    fn top_products_limit(&self) -> usize {
        self.top_products
    }

    fn month_filter(&self) -> Option<u32> {
        self.month
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn archive_name(&self) -> &str {
        &self.archive_name
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extension("input", &self.input, &supported_input_extensions())?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("archive_name", &self.archive_name)?;
        validation::validate_delimiter("delimiter", &self.delimiter)?;
        validation::validate_positive_number("top_products", self.top_products, 1)?;
        if let Some(month) = self.month {
            validation::validate_range("month", month, 1, 12)?;
        }
        validation::validate_allowed_values("formats", &self.formats, &OUTPUT_FORMATS)?;
        Ok(())
    }
}
