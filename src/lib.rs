pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::run_report;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::aggregate::aggregate;
pub use core::assemble::assemble;
pub use core::engine::{generate_report, ReportEngine};
pub use core::menu::build_lookup;
pub use core::normalize::normalize;
pub use utils::error::{RenderError, ReportError, Result};
