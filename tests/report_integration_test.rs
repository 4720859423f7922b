use anyhow::Result;
use httpmock::prelude::*;
use restaurant_analytics::{run_report, ReportError, TomlConfig};
use std::io::Read;
use tempfile::TempDir;

fn menu_json() -> serde_json::Value {
    serde_json::json!([
        {"name": "Dosa", "cuisine": "South Indian", "category": "Breakfast", "sellingPrice": 50, "actualPrice": 40},
        {"name": "Noodles", "cuisine": "Chinese", "category": "Dinner", "sellingPrice": 80, "actualPrice": 95},
        {"name": "Chai", "cuisine": "Beverages", "category": "Other", "sellingPrice": "15.50", "actualPrice": "5.25"},
        {"name": "Broken", "cuisine": "Chinese", "category": "Lunch", "sellingPrice": "free", "actualPrice": 3}
    ])
}

fn file_config(data_dir: &str, output_dir: &str, extra: &str) -> Result<TomlConfig> {
    let content = format!(
        r#"
[report]
name = "integration"

[source]
type = "file"
data_dir = "{}"
menu = "menu.json"
orders = "orders.jsonl"

[output]
path = "{}"
formats = ["json", "csv"]
{}
"#,
        data_dir, output_dir, extra
    );
    Ok(TomlConfig::from_toml_str(&content)?)
}

fn normalized(dir: &TempDir) -> String {
    dir.path().to_str().unwrap().replace('\\', "/")
}

/// 檔案來源：JSON 陣列菜單 + JSON Lines 訂單，輸出並打包
#[tokio::test]
async fn test_file_source_end_to_end_with_bundle() -> Result<()> {
    let data_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;

    tokio::fs::write(data_dir.path().join("menu.json"), menu_json().to_string()).await?;
    let orders = [
        r#"{"items": ["Dosa", "Chai"], "datetime": "2024-01-15T08:00:00"}"#,
        r#"{"items": ["Noodles", "Pizza"], "datetime": "2024-02-03T19:30:00+00:00"}"#,
        r#"{"items": ["Broken", "Chai"], "datetime": "2024-02-04T12:15:00"}"#,
        r#"{"items": ["Dosa"], "datetime": "not-a-date"}"#,
    ]
    .join("\n");
    tokio::fs::write(data_dir.path().join("orders.jsonl"), orders).await?;

    let config = file_config(
        &normalized(&data_dir),
        &normalized(&output_dir),
        "[output.bundle]\nenabled = true\nfilename = \"report.zip\"",
    )?;
    let outcome = run_report(&config).await?;

    assert_eq!(outcome.menu_stats.entries, 3);
    assert_eq!(outcome.menu_stats.skipped, 1);
    assert_eq!(outcome.normalize_stats.orders_skipped, 1);
    assert_eq!(outcome.normalize_stats.items_unmatched, 2);
    assert_eq!(outcome.normalize_stats.observations, 4);

    assert_eq!(outcome.artifacts.first().map(String::as_str), Some("cuisine_pie.json"));
    assert!(outcome.artifacts.contains(&"loss_by_item.json".to_string()));
    assert!(outcome.artifacts.contains(&"profit_loss_over_time.json".to_string()));
    assert!(outcome.failures.is_empty());

    let peak: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(output_dir.path().join("peak_hours.json"))?,
    )?;
    assert_eq!(peak["series"].as_array().map(Vec::len), Some(24));
    assert_eq!(peak["series"][8]["value"], 2);
    assert!(output_dir.path().join("peak_hours.csv").exists());

    assert_eq!(outcome.bundle.as_deref(), Some("report.zip"));
    let zip_data = std::fs::read(output_dir.path().join("report.zip"))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    // json 與 csv 兩種格式都在壓縮檔內
    assert_eq!(archive.len(), outcome.artifacts.len() * 2);
    assert!(archive.by_name("peak_hours.csv").is_ok());
    let mut cuisine = String::new();
    archive.by_name("cuisine_pie.json")?.read_to_string(&mut cuisine)?;
    assert!(cuisine.contains("Beverages"));

    Ok(())
}

#[tokio::test]
async fn test_http_source_end_to_end() -> Result<()> {
    let output_dir = TempDir::new()?;
    let server = MockServer::start_async().await;

    let menu_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/get_items");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "items": menu_json() }));
        })
        .await;
    let orders_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/orders");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"items": ["Dosa"], "datetime": "2024-01-15T08:00:00"},
                    {"items": ["Dosa"], "datetime": "2024-02-15T08:00:00"}
                ]));
        })
        .await;

    let content = format!(
        r#"
[report]
name = "http"

[source]
type = "http"
menu = "{}"
orders = "{}"

[output]
path = "{}"
"#,
        server.url("/get_items"),
        server.url("/orders"),
        normalized(&output_dir)
    );
    let config = TomlConfig::from_toml_str(&content)?;
    let outcome = run_report(&config).await?;

    menu_mock.assert_async().await;
    orders_mock.assert_async().await;

    // 兩個月份損益相同：profit_loss_over_time 不輸出，monthly_sales 照常
    assert_eq!(
        outcome.artifacts,
        vec![
            "cuisine_pie.json",
            "category_pie.json",
            "monthly_sales.json",
            "top_items.json",
            "peak_hours.json",
            "weekday_sales.json",
            "profit_loss_by_item.json",
            "most_profitable_items.json",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_http_source_sends_configured_headers() -> Result<()> {
    std::env::set_var("RA_TEST_API_TOKEN", "menu-token");
    let output_dir = TempDir::new()?;
    let server = MockServer::start_async().await;

    let menu_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/get_items")
                .header("Authorization", "Bearer menu-token");
            then.status(200).json_body(serde_json::json!({ "items": menu_json() }));
        })
        .await;
    let orders_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/orders")
                .header("Authorization", "Bearer menu-token");
            then.status(200).json_body(serde_json::json!([
                {"items": ["Dosa"], "datetime": "2024-01-15T08:00:00"}
            ]));
        })
        .await;

    let content = format!(
        r#"
[report]
name = "http-headers"

[source]
type = "http"
menu = "{}"
orders = "{}"

[source.headers]
Authorization = "Bearer ${{RA_TEST_API_TOKEN}}"

[output]
path = "{}"
"#,
        server.url("/get_items"),
        server.url("/orders"),
        normalized(&output_dir)
    );
    let config = TomlConfig::from_toml_str(&content)?;
    let outcome = run_report(&config).await?;
    std::env::remove_var("RA_TEST_API_TOKEN");

    menu_mock.assert_async().await;
    orders_mock.assert_async().await;
    assert_eq!(outcome.artifacts.first().map(String::as_str), Some("cuisine_pie.json"));
    Ok(())
}

#[tokio::test]
async fn test_http_failure_is_reported() -> Result<()> {
    let output_dir = TempDir::new()?;
    let server = MockServer::start_async().await;
    let menu_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/get_items");
            then.status(500);
        })
        .await;

    let content = format!(
        r#"
[report]
name = "http-failure"

[source]
type = "http"
menu = "{}"
orders = "{}"

[output]
path = "{}"
"#,
        server.url("/get_items"),
        server.url("/orders"),
        normalized(&output_dir)
    );
    let config = TomlConfig::from_toml_str(&content)?;
    let result = run_report(&config).await;

    menu_mock.assert_async().await;
    assert!(matches!(result, Err(ReportError::SourceError { .. })));
    Ok(())
}

#[tokio::test]
async fn test_unknown_items_produce_no_data_outcome() -> Result<()> {
    let data_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    tokio::fs::write(data_dir.path().join("menu.json"), menu_json().to_string()).await?;
    tokio::fs::write(
        data_dir.path().join("orders.jsonl"),
        r#"{"items": ["Pizza", "Burger"], "datetime": "2024-01-15T08:00:00"}"#,
    )
    .await?;

    let config = file_config(
        &normalized(&data_dir),
        &normalized(&output_dir),
        "[output.bundle]\nenabled = true\nfilename = \"report.zip\"",
    )?;
    let outcome = run_report(&config).await?;

    assert!(outcome.is_empty());
    assert_eq!(outcome.bundle, None);
    assert_eq!(outcome.normalize_stats.items_unmatched, 2);
    assert!(!output_dir.path().join("report.zip").exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_data_file_is_an_error() -> Result<()> {
    let data_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;
    let config = file_config(&normalized(&data_dir), &normalized(&output_dir), "")?;
    let result = run_report(&config).await;
    assert!(matches!(result, Err(ReportError::IoError(_))));
    Ok(())
}

#[tokio::test]
async fn test_reports_are_reproducible() -> Result<()> {
    let data_dir = TempDir::new()?;
    tokio::fs::write(data_dir.path().join("menu.json"), menu_json().to_string()).await?;
    tokio::fs::write(
        data_dir.path().join("orders.jsonl"),
        [
            r#"{"items": ["Dosa", "Noodles"], "datetime": "2024-01-15T08:00:00"}"#,
            r#"{"items": ["Chai", "Noodles"], "datetime": "2024-03-15T17:00:00-05:00"}"#,
        ]
        .join("\n"),
    )
    .await?;

    let mut rendered = Vec::new();
    for _ in 0..2 {
        let output_dir = TempDir::new()?;
        let config = file_config(&normalized(&data_dir), &normalized(&output_dir), "")?;
        let outcome = run_report(&config).await?;
        let mut files = Vec::new();
        for artifact in &outcome.artifacts {
            files.push(std::fs::read(output_dir.path().join(artifact))?);
        }
        rendered.push((outcome.artifacts, files));
    }
    assert_eq!(rendered[0], rendered[1]);
    Ok(())
}
