// Adapters layer: concrete implementations of the ports (record sources, renderers, bundling).

pub mod bundle;
pub mod render;
pub mod source;

pub use bundle::ArtifactBundler;
pub use render::{ArtifactFormat, FileRenderer};
pub use source::{ConfiguredSource, FileSource, HttpSource};
