use crate::domain::model::{ArtifactRef, NamedAggregate, RawRecord};
use crate::utils::error::{RenderError, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Http,
}

pub trait ConfigProvider: Send + Sync {
    fn source_kind(&self) -> SourceKind;
    /// Base directory for file sources.
    fn data_dir(&self) -> &str;
    /// File name (file source) or URL (http source) of the menu collection.
    fn menu_location(&self) -> &str;
    /// File name (file source) or URL (http source) of the order collection.
    fn orders_location(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn bundle_filename(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
    /// Extra request headers for http sources, as (name, value) pairs.
    fn headers(&self) -> Vec<(String, String)>;
}

/// Read-only access to the raw menu and order collections.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_menu(&self) -> Result<Vec<RawRecord>>;
    async fn fetch_orders(&self) -> Result<Vec<RawRecord>>;
}

/// Output capability: turns one aggregate into an artifact.
pub trait Renderer: Send + Sync {
    fn render(&self, aggregate: &NamedAggregate) -> std::result::Result<ArtifactRef, RenderError>;
}

impl<R: Renderer + ?Sized> Renderer for &R {
    fn render(&self, aggregate: &NamedAggregate) -> std::result::Result<ArtifactRef, RenderError> {
        (**self).render(aggregate)
    }
}
