use clap::Parser;
use restaurant_analytics::core::{ConfigProvider, ReportOutcome};
use restaurant_analytics::utils::error::ErrorSeverity;
use restaurant_analytics::utils::{logger, validation::Validate};
use restaurant_analytics::{run_report, CliConfig, ReportError, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting restaurant-analytics");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let result = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(toml_config) => run(&toml_config).await,
                Err(e) => Err(e),
            }
        }
        None => run(&config).await,
    };

    match result {
        Ok(outcome) => {
            if config.print_json {
                println!(
                    "{}",
                    serde_json::json!({ "images": outcome.artifacts, "failures": outcome.failures })
                );
            } else if outcome.is_empty() {
                println!("No visualizations available yet.");
            } else {
                println!("✅ Generated {} charts:", outcome.artifacts.len());
                for artifact in &outcome.artifacts {
                    println!("  {}", artifact);
                }
                if let Some(bundle) = &outcome.bundle {
                    println!("📦 Bundle: {}", bundle);
                }
            }
            for failure in &outcome.failures {
                eprintln!("⚠️  {} could not be rendered: {}", failure.aggregate, failure.message);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run<C: ConfigProvider + Validate>(config: &C) -> Result<ReportOutcome, ReportError> {
    // 驗證配置
    config.validate()?;
    tracing::info!(
        "Reading {} / {}, writing to {}",
        config.menu_location(),
        config.orders_location(),
        config.output_path()
    );
    run_report(config).await
}
