//! Runs the five feature stages in order, materializing each stage's output
//! before the next stage starts.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::history::OrderIndex;
use crate::domain::pair::PairKeyFormat;
use crate::errors::PipelineError;
use crate::export::write_feature_csv;
use crate::features::{aggregate, flags, intervals, pairs, recency, FeatureTable, NullDaysPolicy};
use crate::stage::StageTable;
use crate::store::{OrderSource, StageStore};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineSettings {
    pub keys: PairKeyFormat,
    pub null_days: NullDaysPolicy,
}

/// Counts describing one run, suitable for command output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub orders: usize,
    pub users_with_window: usize,
    pub prior_purchases: usize,
    pub dropped_prior_items: usize,
    pub dropped_train_items: usize,
    pub label_pairs: usize,
    pub train_only_pairs: usize,
    pub feature_rows: usize,
    pub positive_rows: usize,
    pub stage_rows_written: u64,
}

#[derive(Debug, Default)]
pub struct FeaturePipeline {
    settings: PipelineSettings,
}

impl FeaturePipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Loads the input, runs every stage, and returns the final table.
    pub async fn build(
        &self,
        source: &dyn OrderSource,
        stages: &dyn StageStore,
    ) -> Result<(FeatureTable, PipelineReport), PipelineError> {
        let keys = &self.settings.keys;

        source.verify_schema().await?;
        let history = source.load_history().await?;
        info!(
            event_name = "pipeline.input.loaded",
            orders = history.orders.len(),
            prior_items = history.prior_items.len(),
            train_items = history.train_items.len(),
            "input tables loaded"
        );

        let index = OrderIndex::build(&history.orders);
        let mut report = PipelineReport { orders: index.len(), ..PipelineReport::default() };

        let pair_set = pairs::extract(&history, &index, keys)?;
        report.prior_purchases = pair_set.purchases.len();
        report.dropped_prior_items = pair_set.dropped_prior_items;
        report.dropped_train_items = pair_set.dropped_train_items;
        report.label_pairs = pair_set.labels.len();
        report.train_only_pairs = pair_set.train_only_pairs();
        if pair_set.dropped_prior_items > 0 || pair_set.dropped_train_items > 0 {
            warn!(
                event_name = "pipeline.pairs.orphan_items",
                dropped_prior_items = pair_set.dropped_prior_items,
                dropped_train_items = pair_set.dropped_train_items,
                "item rows reference orders that are not in the orders table"
            );
        }
        report.stage_rows_written +=
            materialize(stages, "pair_extractor", pair_set.label_table(keys)).await?;
        report.stage_rows_written +=
            materialize(stages, "pair_extractor", pair_set.purchase_table(keys)).await?;

        let recency = recency::index(&history, &index);
        report.users_with_window = recency.windows.len();
        report.stage_rows_written +=
            materialize(stages, "recency_indexer", recency.stage_table()).await?;

        let history_table = aggregate::aggregate(&pair_set);
        report.stage_rows_written +=
            materialize(stages, "history_aggregator", history_table.stage_table(keys)).await?;

        let flag_table = flags::flag(&history_table, &recency, &history.prior_items);
        report.stage_rows_written +=
            materialize(stages, "window_flags", flag_table.stage_table(keys)).await?;

        let features = intervals::build(&history_table, &flag_table, self.settings.null_days);
        report.feature_rows = features.len();
        report.positive_rows = features.rows.iter().filter(|row| row.y == 1).count();
        report.stage_rows_written +=
            materialize(stages, "interval_synthesizer", features.stage_table(keys)).await?;

        Ok((features, report))
    }

    /// [`FeaturePipeline::build`] followed by the CSV export to `output`.
    pub async fn run(
        &self,
        source: &dyn OrderSource,
        stages: &dyn StageStore,
        output: &Path,
    ) -> Result<PipelineReport, PipelineError> {
        let (features, report) = self.build(source, stages).await?;

        let written = write_feature_csv(output, &features.rows, &self.settings.keys)?;
        info!(
            event_name = "pipeline.export.completed",
            path = %output.display(),
            rows = written,
            "feature table exported"
        );

        Ok(report)
    }
}

async fn materialize(
    stages: &dyn StageStore,
    stage: &'static str,
    table: StageTable<'_>,
) -> Result<u64, PipelineError> {
    let name = table.name;
    let written = stages.replace_table(table).await?;
    info!(
        event_name = "pipeline.stage.completed",
        stage,
        table = name,
        rows = written,
        "stage output materialized"
    );
    Ok(written)
}
