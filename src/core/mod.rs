pub mod aggregate;
pub mod assemble;
pub mod engine;
pub mod menu;
pub mod normalize;

pub use crate::domain::model::{
    ArtifactRef, NamedAggregate, Observation, RawRecord, ReportOutcome,
};
pub use crate::domain::ports::{ConfigProvider, RecordSource, Renderer, SourceKind, Storage};
pub use crate::utils::error::Result;
