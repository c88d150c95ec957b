use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Workbook could not be read: {message}")]
    WorkbookError { message: String },

    #[error("Unsupported input format: {path}")]
    UnsupportedFormatError { path: String },

    #[error("Input contains no data rows: {path}")]
    EmptyInputError { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Storage,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_)
            | EtlError::WorkbookError { .. }
            | EtlError::UnsupportedFormatError { .. }
            | EtlError::EmptyInputError { .. } => ErrorCategory::Input,
            EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::ZipError(_) | EtlError::SerializationError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 空檔案不是系統錯誤，只是沒有東西可處理
            EtlError::EmptyInputError { .. } => ErrorSeverity::Low,
            EtlError::IoError(_) => ErrorSeverity::Medium,
            EtlError::ZipError(_) | EtlError::SerializationError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ConfigValidationError { .. } => {
                "Check the configuration file syntax and required sections".to_string()
            }
            EtlError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' and try again", field)
            }
            EtlError::MissingConfigError { field } => {
                format!("Add the '{}' setting to the configuration", field)
            }
            EtlError::CsvError(_) | EtlError::UnsupportedFormatError { .. } => {
                "Export the sheet as CSV with one sale per row and 10 columns".to_string()
            }
            EtlError::WorkbookError { .. } => {
                "Keep the sales in the first sheet and save it as .xlsx".to_string()
            }
            EtlError::EmptyInputError { .. } => {
                "Make sure the file has a header row followed by at least one data row".to_string()
            }
            EtlError::IoError(_) => {
                "Verify the input file exists and the output directory is writable".to_string()
            }
            EtlError::ZipError(_) | EtlError::SerializationError(_) => {
                "Free up disk space and re-run; the report could not be written".to_string()
            }
        }
    }

    /// Single message shown to the person running the tool.
    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::CsvError(_)
            | EtlError::WorkbookError { .. }
            | EtlError::UnsupportedFormatError { .. } => {
                "Error processing the file. Check that the format is correct.".to_string()
            }
            EtlError::EmptyInputError { .. } => "The file contains no valid data".to_string(),
            EtlError::IoError(e) => format!("File access failed: {}", e),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
