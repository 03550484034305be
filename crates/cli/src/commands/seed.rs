use std::fs;
use std::path::PathBuf;

use reorder_core::config::LoadOptions;
use reorder_db::{connect_with_settings, sqlite_file_path, OpenMode, SampleDataset};
use tracing::info;

use crate::commands::{
    current_thread_runtime, load_config, CommandResult, EXIT_DB_CONNECTIVITY, EXIT_SOURCE,
};

/// Loads the bundled sample order history into the configured store,
/// replacing any existing input tables.
pub fn run(options: LoadOptions) -> CommandResult {
    let config = match load_config("seed", options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match current_thread_runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    if let Some(parent) = sqlite_file_path(&config.database.url).and_then(|path| {
        path.parent().filter(|parent| !parent.as_os_str().is_empty()).map(PathBuf::from)
    }) {
        if let Err(error) = fs::create_dir_all(&parent) {
            return CommandResult::failure(
                "seed",
                "db_connectivity",
                format!("could not create database directory `{}`: {error}", parent.display()),
                EXIT_DB_CONNECTIVITY,
            );
        }
    }

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.timeout_secs,
            OpenMode::CreateIfMissing,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;

        let seeded = SampleDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_SOURCE));
        pool.close().await;
        seeded
    });

    match result {
        Ok(seeded) => {
            info!(
                event_name = "cli.seed.completed",
                orders = seeded.orders,
                prior_items = seeded.prior_items,
                train_items = seeded.train_items,
                "sample dataset loaded"
            );
            let message = format!(
                "sample dataset loaded: {} orders, {} prior items, {} train items",
                seeded.orders, seeded.prior_items, seeded.train_items
            );
            CommandResult::success_with_details("seed", message, Some(seeded))
        }
        Err(failure) => CommandResult::from_failure("seed", failure),
    }
}
