use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Record source '{source_name}' failed: {message}")]
    SourceError { source_name: String, message: String },

    #[error("Renderer unavailable: {message}")]
    RendererUnavailable { message: String },
}

/// Failure reported by a renderer for a single call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Only this aggregate could not be rendered; the rest may still succeed.
    #[error("failed to render '{aggregate}': {message}")]
    Aggregate { aggregate: String, message: String },

    /// The output capability itself is unusable; no further call can succeed.
    #[error("renderer unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    DataSource,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::ConfigError { .. }
            | ReportError::MissingConfigError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ReportError::ApiError(_) => ErrorCategory::Network,
            ReportError::SourceError { .. }
            | ReportError::SerializationError(_)
            | ReportError::CsvError(_) => ErrorCategory::DataSource,
            ReportError::ZipError(_) | ReportError::RendererUnavailable { .. } => {
                ErrorCategory::Output
            }
            ReportError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常可重試
            ReportError::ApiError(_) | ReportError::SourceError { .. } => ErrorSeverity::Medium,
            ReportError::ConfigError { .. }
            | ReportError::MissingConfigError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::SerializationError(_)
            | ReportError::CsvError(_)
            | ReportError::ZipError(_) => ErrorSeverity::High,
            ReportError::IoError(_) | ReportError::RendererUnavailable { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command line flags or the TOML configuration file"
            }
            ErrorCategory::Network => "Check that the menu/order API is reachable and retry",
            ErrorCategory::DataSource => {
                "Check that the menu and order documents are valid JSON arrays or JSON Lines"
            }
            ErrorCategory::Output => "Check that the output directory is writable",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not reach the data API: {}", self),
            ErrorCategory::DataSource => format!("Could not read restaurant data: {}", self),
            ErrorCategory::Output => format!("Could not write the report: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

impl From<RenderError> for ReportError {
    fn from(err: RenderError) -> Self {
        ReportError::RendererUnavailable {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
