pub mod config;
pub mod domain;
pub mod errors;
pub mod export;
pub mod features;
pub mod pipeline;
pub mod stage;
pub mod store;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::history::{OrderHistory, OrderIndex};
pub use domain::order::{EvalSet, ItemId, Order, OrderId, OrderItem, UserId};
pub use domain::pair::{PairKey, PairKeyFormat};
pub use domain::row::{FeatureRow, FEATURE_COLUMNS};
pub use errors::{DomainError, PipelineError};
pub use export::{write_feature_csv, ExportError};
pub use features::{FeatureTable, NullDaysPolicy};
pub use pipeline::{FeaturePipeline, PipelineReport, PipelineSettings};
pub use stage::{Cell, Column, ColumnType, StageTable};
pub use store::{
    DiscardStageStore, InMemoryOrderSource, InMemoryStageStore, OrderSource, SourceError,
    StageStore, StoreError, REQUIRED_SCHEMA,
};
