use crate::core::{ConfigProvider, RawRecord, RecordSource, SourceKind, Storage};
use crate::utils::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Envelope keys that may wrap a record array (`/get_items` answers `{"items": [...]}`).
const ENVELOPE_KEYS: [&str; 3] = ["items", "orders", "data"];

/// Decode a collection document: JSON array, enveloped array, or JSON Lines.
pub fn parse_collection(name: &str, bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let text = std::str::from_utf8(bytes).map_err(|e| ReportError::SourceError {
        source_name: name.to_string(),
        message: format!("not valid UTF-8: {}", e),
    })?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => unwrap_envelope(name, value),
        Err(_) => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_str::<Value>(line).map_err(ReportError::from))
            .collect(),
    }
}

fn unwrap_envelope(name: &str, value: Value) -> Result<Vec<RawRecord>> {
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(mut obj) => {
            // 只有一個鍵的信封才解開，訂單本身也有 items 欄位
            if obj.len() == 1 {
                if let Some(key) = ENVELOPE_KEYS.iter().find(|k| obj.get(**k).is_some_and(Value::is_array)) {
                    if let Some(Value::Array(records)) = obj.remove(*key) {
                        return Ok(records);
                    }
                }
            }
            Ok(vec![Value::Object(obj)])
        }
        other => Err(ReportError::SourceError {
            source_name: name.to_string(),
            message: format!("expected an array of records, got {}", other),
        }),
    }
}

pub struct FileSource<S: Storage> {
    storage: S,
    menu_file: String,
    orders_file: String,
}

impl<S: Storage> FileSource<S> {
    pub fn new(storage: S, menu_file: impl Into<String>, orders_file: impl Into<String>) -> Self {
        Self {
            storage,
            menu_file: menu_file.into(),
            orders_file: orders_file.into(),
        }
    }

    async fn read_collection(&self, path: &str) -> Result<Vec<RawRecord>> {
        tracing::debug!("Reading collection file: {}", path);
        let bytes = self.storage.read_file(path).await?;
        parse_collection(path, &bytes)
    }
}

#[async_trait]
impl<S: Storage> RecordSource for FileSource<S> {
    async fn fetch_menu(&self) -> Result<Vec<RawRecord>> {
        self.read_collection(&self.menu_file).await
    }

    async fn fetch_orders(&self) -> Result<Vec<RawRecord>> {
        self.read_collection(&self.orders_file).await
    }
}

pub struct HttpSource {
    client: Client,
    menu_url: String,
    orders_url: String,
    headers: Vec<(String, String)>,
}

impl HttpSource {
    pub fn new(menu_url: impl Into<String>, orders_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            menu_url: menu_url.into(),
            orders_url: orders_url.into(),
            headers: Vec::new(),
        })
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    async fn get_collection(&self, url: &str) -> Result<Vec<RawRecord>> {
        tracing::debug!("Making API request to: {} ({} custom headers)", url, self.headers.len());
        let mut request = self.client.get(url);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(ReportError::SourceError {
                source_name: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let bytes = response.bytes().await?;
        parse_collection(url, &bytes)
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch_menu(&self) -> Result<Vec<RawRecord>> {
        self.get_collection(&self.menu_url).await
    }

    async fn fetch_orders(&self) -> Result<Vec<RawRecord>> {
        self.get_collection(&self.orders_url).await
    }
}

/// Source selected at runtime from configuration.
pub enum ConfiguredSource<S: Storage> {
    File(FileSource<S>),
    Http(HttpSource),
}

impl<S: Storage> ConfiguredSource<S> {
    pub fn from_config<C: ConfigProvider>(config: &C, storage: S) -> Result<Self> {
        match config.source_kind() {
            SourceKind::File => Ok(ConfiguredSource::File(FileSource::new(
                storage,
                config.menu_location(),
                config.orders_location(),
            ))),
            SourceKind::Http => Ok(ConfiguredSource::Http(HttpSource::new(
                config.menu_location(),
                config.orders_location(),
                Duration::from_secs(config.timeout_seconds()),
            )?
            .with_headers(config.headers()))),
        }
    }
}

#[async_trait]
impl<S: Storage> RecordSource for ConfiguredSource<S> {
    async fn fetch_menu(&self) -> Result<Vec<RawRecord>> {
        match self {
            ConfiguredSource::File(source) => source.fetch_menu().await,
            ConfiguredSource::Http(source) => source.fetch_menu().await,
        }
    }

    async fn fetch_orders(&self) -> Result<Vec<RawRecord>> {
        match self {
            ConfiguredSource::File(source) => source.fetch_orders().await,
            ConfiguredSource::Http(source) => source.fetch_orders().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let records = parse_collection("menu", br#"[{"name": "Dosa"}, {"name": "Idli"}]"#).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_items_envelope() {
        let records = parse_collection("menu", br#"{"items": [{"name": "Dosa"}]}"#).unwrap();
        assert_eq!(records[0]["name"], "Dosa");
    }

    #[test]
    fn test_parse_json_lines() {
        let body = b"{\"items\": [\"Dosa\"], \"datetime\": \"2024-01-15T08:00:00\"}\n\n{\"items\": [], \"datetime\": \"2024-01-16T08:00:00\"}\n";
        let records = parse_collection("orders", body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["datetime"], "2024-01-16T08:00:00");
    }

    #[test]
    fn test_single_order_document_is_not_unwrapped() {
        let records = parse_collection("orders", br#"{"items": ["Dosa"], "datetime": "2024-01-15T08:00:00"}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["items"][0], "Dosa");
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_collection("orders", b"  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_scalars_and_garbage() {
        assert!(matches!(
            parse_collection("orders", b"42"),
            Err(ReportError::SourceError { .. })
        ));
        assert!(parse_collection("orders", b"{not json").is_err());
    }
}
