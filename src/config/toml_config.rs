use crate::config::{DEFAULT_ARCHIVE_NAME, OUTPUT_FORMATS};
use crate::core::analytics::DEFAULT_TOP_PRODUCTS;
use crate::config::supported_input_extensions;
use crate::core::ConfigProvider;
use crate::domain::model::WorkbookLayout;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// 可由命令列 --input 覆蓋
    pub path: Option<String>,
    pub delimiter: Option<String>,
    pub has_header: Option<bool>,
    /// 只對 .xlsx/.xls/.ods 有效
    pub sheet_layout: Option<WorkbookLayout>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    pub fold_accents: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub top_products: Option<usize>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub archive_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未定義的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let input = validation::validate_required_field("source.path", &self.source.path)?;
        validation::validate_path("source.path", input)?;
        validation::validate_file_extension("source.path", input, &supported_input_extensions())?;

        if let Some(delimiter) = &self.source.delimiter {
            validation::validate_delimiter("source.delimiter", delimiter)?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_allowed_values(
            "load.output_formats",
            &self.load.output_formats,
            &OUTPUT_FORMATS,
        )?;
        if let Some(name) = &self.load.archive_name {
            validation::validate_non_empty_string("load.archive_name", name)?;
        }

        if let Some(top) = self.analytics.top_products {
            validation::validate_positive_number("analytics.top_products", top, 1)?;
        }
        if let Some(month) = self.analytics.month {
            validation::validate_range("analytics.month", month, 1, 12)?;
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        self.source.path.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn delimiter(&self) -> u8 {
        self.source
            .delimiter
            .as_deref()
            .and_then(|d| d.as_bytes().first().copied())
            .unwrap_or(b',')
    }

    fn has_header(&self) -> bool {
        self.source.has_header.unwrap_or(true)
    }

    fn workbook_layout(&self) -> WorkbookLayout {
        self.source.sheet_layout.unwrap_or_default()
    }

    fn fold_accents(&self) -> bool {
        self.transform.fold_accents.unwrap_or(false)
    }

    fn top_products_limit(&self) -> usize {
        self.analytics.top_products.unwrap_or(DEFAULT_TOP_PRODUCTS)
    }

    fn month_filter(&self) -> Option<u32> {
        self.analytics.month
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive_name(&self) -> &str {
        self.load.archive_name.as_deref().unwrap_or(DEFAULT_ARCHIVE_NAME)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[pipeline]
name = "ventas-mensuales"
version = "1.0.0"

[source]
path = "data/ventas.csv"

[load]
output_path = "./output"
output_formats = ["csv", "json"]
"#;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.pipeline.name, "ventas-mensuales");
        assert_eq!(config.input_path(), "data/ventas.csv");
        assert_eq!(config.delimiter(), b',');
        assert!(config.has_header());
        assert!(!config.fold_accents());
        assert_eq!(config.workbook_layout(), WorkbookLayout::Packed);
        assert_eq!(config.top_products_limit(), DEFAULT_TOP_PRODUCTS);
        assert_eq!(config.month_filter(), None);
        assert_eq!(config.archive_name(), DEFAULT_ARCHIVE_NAME);
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[pipeline]
name = "ventas"
description = "Reporte trimestral"
version = "2.0"

[source]
path = "ventas.tsv"
delimiter = "\t"
has_header = false
sheet_layout = "rows"

[transform]
fold_accents = true

[analytics]
top_products = 10
month = 3

[load]
output_path = "./reports"
output_formats = ["tsv"]
archive_name = "q1.zip"

[monitoring]
enabled = true
json_logs = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.delimiter(), b'\t');
        assert!(!config.has_header());
        assert_eq!(config.workbook_layout(), WorkbookLayout::Rows);
        assert!(config.fold_accents());
        assert_eq!(config.top_products_limit(), 10);
        assert_eq!(config.month_filter(), Some(3));
        assert_eq!(config.archive_name(), "q1.zip");
        assert!(config.monitoring_enabled());
        assert!(config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SALES_ETL_TEST_DATA_DIR", "/srv/data");

        let toml_content = r#"
[pipeline]
name = "test"
version = "1.0"

[source]
path = "${SALES_ETL_TEST_DATA_DIR}/ventas.csv"

[load]
output_path = "${SALES_ETL_TEST_UNDEFINED}"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input_path(), "/srv/data/ventas.csv");
        assert_eq!(config.output_path(), "${SALES_ETL_TEST_UNDEFINED}");

        std::env::remove_var("SALES_ETL_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_validation() {
        let mut config = TomlConfig::from_toml_str(MINIMAL).unwrap();
        config.analytics.month = Some(13);
        assert!(config.validate().is_err());

        let mut config = TomlConfig::from_toml_str(MINIMAL).unwrap();
        config.source.path = None;
        assert!(matches!(
            config.validate(),
            Err(EtlError::MissingConfigError { .. })
        ));

        let mut config = TomlConfig::from_toml_str(MINIMAL).unwrap();
        config.load.output_formats = vec!["xlsx".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[pipeline\nname = ").unwrap_err();
        assert!(matches!(err, EtlError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "ventas-mensuales");
    }
}
