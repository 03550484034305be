pub mod connection;
pub mod fixtures;
pub mod source;
pub mod stage_store;

pub use connection::{
    connect, connect_with_settings, fork_store, sqlite_file_path, DbPool, OpenMode,
};
pub use fixtures::{SampleDataset, SeedResult};
pub use source::SqlOrderSource;
pub use stage_store::SqlStageStore;

/// Double-quotes an SQLite identifier.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
