use reorder_core::config::LoadOptions;
use reorder_core::pipeline::{FeaturePipeline, PipelineReport};
use reorder_core::store::DiscardStageStore;
use reorder_db::{connect_with_settings, fork_store, OpenMode, SqlOrderSource, SqlStageStore};
use tracing::info;

use crate::commands::{
    current_thread_runtime, load_config, CommandResult, EXIT_DB_CONNECTIVITY, EXIT_STAGE_STORE,
};

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match load_config("build", options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match current_thread_runtime("build") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let output_path = config.pipeline.output_path.clone();
    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.timeout_secs,
            OpenMode::Existing,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;

        let source = SqlOrderSource::new(pool.clone());
        let pipeline = FeaturePipeline::new(config.pipeline.settings());
        let outcome = if config.pipeline.materialize_stages {
            let transformed = match fork_store(
                &config.database.url,
                &config.database.transformed_url,
                config.database.timeout_secs,
            )
            .await
            {
                Ok(transformed) => transformed,
                Err(error) => {
                    pool.close().await;
                    return Err((
                        "stage_store",
                        format!(
                            "could not prepare transformed store `{}`: {error}",
                            config.database.transformed_url
                        ),
                        EXIT_STAGE_STORE,
                    ));
                }
            };
            let stages = SqlStageStore::with_batch_rows(
                transformed.clone(),
                config.pipeline.insert_batch_rows,
            );
            let outcome = pipeline.run(&source, &stages, &output_path).await;
            transformed.close().await;
            outcome
        } else {
            pipeline.run(&source, &DiscardStageStore, &output_path).await
        };
        pool.close().await;

        outcome.map_err(|error| (error.error_class(), error.to_string(), error.exit_code()))
    });

    match result {
        Ok(report) => {
            info!(
                event_name = "cli.build.completed",
                feature_rows = report.feature_rows,
                positive_rows = report.positive_rows,
                "feature build completed"
            );
            CommandResult::success_with_details(
                "build",
                summary(&report, &output_path.display().to_string()),
                Some(report),
            )
        }
        Err(failure) => CommandResult::from_failure("build", failure),
    }
}

fn summary(report: &PipelineReport, output: &str) -> String {
    format!(
        "wrote {} feature rows ({} positive) to `{output}`",
        report.feature_rows, report.positive_rows
    )
}
