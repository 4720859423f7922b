pub mod cli;
pub mod toml_config;

use crate::core::{ConfigProvider, SourceKind};
use crate::utils::error::{ReportError, Result};
use crate::utils::validation;

pub const COLLECTION_EXTENSIONS: [&str; 3] = ["json", "jsonl", "ndjson"];

/// Checks shared by every configuration front end.
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    match config.source_kind() {
        SourceKind::Http => {
            validation::validate_url("source.menu", config.menu_location())?;
            validation::validate_url("source.orders", config.orders_location())?;
        }
        SourceKind::File => {
            validation::validate_path("source.data_dir", config.data_dir())?;
            validation::validate_non_empty_string("source.menu", config.menu_location())?;
            validation::validate_non_empty_string("source.orders", config.orders_location())?;
            validation::validate_file_extensions(
                "source",
                &[config.menu_location(), config.orders_location()],
                &COLLECTION_EXTENSIONS,
            )?;
        }
    }

    for (name, _) in config.headers() {
        validation::validate_non_empty_string("source.headers", &name)?;
    }
    validation::validate_positive_number("source.timeout_seconds", config.timeout_seconds(), 1)?;
    validation::validate_path("output.path", config.output_path())?;
    validation::validate_output_formats("output.formats", config.output_formats())?;
    if let Some(filename) = config.bundle_filename() {
        validation::validate_file_extensions("output.bundle.filename", &[filename], &["zip"])?;
    }
    Ok(())
}

#[cfg(feature = "cli")]
pub use self::cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use super::*;
    use crate::utils::validation::Validate;
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "restaurant-analytics")]
    #[command(about = "Turns restaurant orders and menu records into dashboard charts")]
    pub struct CliConfig {
        /// Path to a TOML configuration file (overrides the source/output flags)
        #[arg(short, long)]
        pub config: Option<String>,

        /// Where records come from: file or http
        #[arg(long, default_value = "file")]
        pub source: String,

        #[arg(long, default_value = ".")]
        pub data_dir: String,

        /// Menu file name (file source) or URL (http source)
        #[arg(long, default_value = "menu.json")]
        pub menu: String,

        /// Order file name (file source) or URL (http source)
        #[arg(long, default_value = "orders.json")]
        pub orders: String,

        #[arg(long, default_value = "./graphs")]
        pub output_path: String,

        #[arg(long, value_delimiter = ',', default_value = "json")]
        pub formats: Vec<String>,

        /// Also pack every artifact into this zip archive
        #[arg(long)]
        pub bundle: Option<String>,

        #[arg(long, default_value = "30")]
        pub timeout_seconds: u64,

        /// Extra http header, repeatable: --header "Authorization: Bearer <token>"
        #[arg(long = "header", value_name = "NAME:VALUE")]
        pub headers: Vec<String>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub log_json: bool,

        #[arg(long, help = "Print the artifact list as {\"images\": [...]}")]
        pub print_json: bool,
    }

    impl ConfigProvider for CliConfig {
        fn source_kind(&self) -> SourceKind {
            super::toml_config::parse_source_kind(&self.source).unwrap_or(SourceKind::File)
        }

        fn data_dir(&self) -> &str {
            &self.data_dir
        }

        fn menu_location(&self) -> &str {
            &self.menu
        }

        fn orders_location(&self) -> &str {
            &self.orders
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn bundle_filename(&self) -> Option<&str> {
            self.bundle.as_deref()
        }

        fn timeout_seconds(&self) -> u64 {
            self.timeout_seconds
        }

        fn headers(&self) -> Vec<(String, String)> {
            self.headers
                .iter()
                .filter_map(|raw| raw.split_once(':'))
                .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
                .collect()
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            if super::toml_config::parse_source_kind(&self.source).is_none() {
                return Err(ReportError::InvalidConfigValueError {
                    field: "--source".to_string(),
                    value: self.source.clone(),
                    reason: "Source must be 'file' or 'http'".to_string(),
                });
            }
            if let Some(raw) = self.headers.iter().find(|raw| !raw.contains(':')) {
                return Err(ReportError::InvalidConfigValueError {
                    field: "--header".to_string(),
                    value: raw.clone(),
                    reason: "Header must look like 'Name: value'".to_string(),
                });
            }
            validate_provider(self)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_cli_defaults() {
            let config = CliConfig::parse_from(["restaurant-analytics"]);
            assert_eq!(config.source_kind(), SourceKind::File);
            assert_eq!(config.output_path(), "./graphs");
            assert_eq!(config.output_formats(), &["json".to_string()]);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_cli_http_source_requires_urls() {
            let config = CliConfig::parse_from([
                "restaurant-analytics",
                "--source",
                "http",
                "--menu",
                "menu.json",
            ]);
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_cli_headers() {
            let config = CliConfig::parse_from([
                "restaurant-analytics",
                "--header",
                "Authorization: Bearer abc:def",
                "--header",
                "X-Client:dashboard",
            ]);
            assert_eq!(
                config.headers(),
                vec![
                    ("Authorization".to_string(), "Bearer abc:def".to_string()),
                    ("X-Client".to_string(), "dashboard".to_string()),
                ]
            );
            assert!(config.validate().is_ok());

            let bad = CliConfig::parse_from(["restaurant-analytics", "--header", "no-colon"]);
            assert!(bad.validate().is_err());
        }

        #[test]
        fn test_cli_formats_and_bundle() {
            let config = CliConfig::parse_from([
                "restaurant-analytics",
                "--formats",
                "json,csv",
                "--bundle",
                "report.tar",
            ]);
            assert_eq!(config.output_formats().len(), 2);
            assert!(config.validate().is_err());
        }
    }
}
