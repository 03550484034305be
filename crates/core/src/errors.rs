use thiserror::Error;

use crate::export::ExportError;
use crate::store::{SourceError, StoreError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field} `{id}` does not fit a zero-padded pair key field of width {width}")]
    PairKeyOverflow { field: &'static str, id: i64, width: usize },
    #[error("unsupported eval_set `{0}` (expected prior|train|test)")]
    InvalidEvalSet(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl PipelineError {
    /// Stable, machine-readable class for command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain",
            Self::Source(SourceError::MissingTable { .. })
            | Self::Source(SourceError::MissingColumn { .. }) => "schema",
            Self::Source(_) => "source",
            Self::Store(_) => "stage_store",
            Self::Export(_) => "export",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self.error_class() {
            "schema" => 5,
            "domain" | "source" => 6,
            "stage_store" => 7,
            _ => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::errors::{DomainError, PipelineError};
    use crate::export::ExportError;
    use crate::store::{SourceError, StoreError};

    #[test]
    fn schema_errors_name_the_missing_object() {
        let error = PipelineError::from(SourceError::MissingColumn {
            table: "orders".to_string(),
            column: "order_number".to_string(),
        });

        assert_eq!(error.error_class(), "schema");
        assert_eq!(error.exit_code(), 5);
        let message = error.to_string();
        assert!(message.contains("orders"));
        assert!(message.contains("order_number"));
    }

    #[test]
    fn domain_and_source_failures_share_an_exit_code() {
        let domain = PipelineError::from(DomainError::InvalidEvalSet("holdout".to_string()));
        let source = PipelineError::from(SourceError::Backend("disk I/O error".to_string()));

        assert_eq!(domain.error_class(), "domain");
        assert_eq!(source.error_class(), "source");
        assert_eq!(domain.exit_code(), source.exit_code());
    }

    #[test]
    fn store_and_export_failures_map_to_distinct_classes() {
        let store = PipelineError::from(StoreError::new("fe_features", "database is locked"));
        let export = PipelineError::from(ExportError::Io {
            path: PathBuf::from("out.csv"),
            source: std::io::Error::other("read-only file system"),
        });

        assert_eq!((store.error_class(), store.exit_code()), ("stage_store", 7));
        assert_eq!((export.error_class(), export.exit_code()), ("export", 8));
    }
}
