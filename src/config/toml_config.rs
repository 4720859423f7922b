use crate::core::{ConfigProvider, SourceKind};
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportSection,
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// `file` or `http` (`api` is accepted as an alias of `http`).
    pub r#type: String,
    pub menu: String,
    pub orders: String,
    pub data_dir: Option<String>,
    pub timeout_seconds: Option<u64>,
    /// Sent with every http request; values may use `${VAR}`.
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    pub bundle: Option<BundleConfig>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            formats: default_formats(),
            bundle: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    pub enabled: bool,
    pub filename: String,
}

fn default_output_path() -> String {
    "./graphs".to_string()
}

fn default_formats() -> Vec<String> {
    vec!["json".to_string()]
}

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub fn parse_source_kind(value: &str) -> Option<SourceKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "file" => Some(SourceKind::File),
        "http" | "api" => Some(SourceKind::Http),
        _ => None,
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MENU_API})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReportError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn source_kind(&self) -> SourceKind {
        parse_source_kind(&self.source.r#type).unwrap_or(SourceKind::File)
    }

    fn data_dir(&self) -> &str {
        self.source.data_dir.as_deref().unwrap_or(".")
    }

    fn menu_location(&self) -> &str {
        &self.source.menu
    }

    fn orders_location(&self) -> &str {
        &self.source.orders
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn bundle_filename(&self) -> Option<&str> {
        self.output
            .bundle
            .as_ref()
            .filter(|b| b.enabled)
            .map(|b| b.filename.as_str())
    }

    fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .source
            .headers
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        // HashMap 無序，排序後請求內容才穩定
        headers.sort();
        headers
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        crate::utils::validation::validate_non_empty_string("report.name", &self.report.name)?;
        if parse_source_kind(&self.source.r#type).is_none() {
            return Err(ReportError::InvalidConfigValueError {
                field: "source.type".to_string(),
                value: self.source.r#type.clone(),
                reason: "Source type must be 'file' or 'http'".to_string(),
            });
        }
        super::validate_provider(self)
    }
}
