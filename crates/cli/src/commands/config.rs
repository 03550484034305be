use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use reorder_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let (config_file_doc, file_warning) = match load_config_file_doc(config_file_path.as_deref()) {
        Ok(doc) => (doc, None),
        Err(error) => (None, Some(format!("warning: {error:#}"))),
    };

    let mut lines = vec!["effective config (source precedence: override > env > file > default):"
        .to_string()];
    lines.extend(file_warning);

    for (key, env_key, value) in entries(&config) {
        let source =
            field_source(key, env_key, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key, &value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn entries(config: &AppConfig) -> Vec<(&'static str, &'static str, String)> {
    let pipeline = &config.pipeline;
    vec![
        ("database.url", "REORDER_DATABASE_URL", config.database.url.clone()),
        (
            "database.transformed_url",
            "REORDER_DATABASE_TRANSFORMED_URL",
            config.database.transformed_url.clone(),
        ),
        (
            "database.timeout_secs",
            "REORDER_DATABASE_TIMEOUT_SECS",
            config.database.timeout_secs.to_string(),
        ),
        (
            "pipeline.output_path",
            "REORDER_PIPELINE_OUTPUT_PATH",
            pipeline.output_path.display().to_string(),
        ),
        (
            "pipeline.user_key_width",
            "REORDER_PIPELINE_USER_KEY_WIDTH",
            pipeline.user_key_width.to_string(),
        ),
        (
            "pipeline.item_key_width",
            "REORDER_PIPELINE_ITEM_KEY_WIDTH",
            pipeline.item_key_width.to_string(),
        ),
        ("pipeline.null_days", "REORDER_PIPELINE_NULL_DAYS", format!("{:?}", pipeline.null_days)),
        (
            "pipeline.materialize_stages",
            "REORDER_PIPELINE_MATERIALIZE_STAGES",
            pipeline.materialize_stages.to_string(),
        ),
        (
            "pipeline.insert_batch_rows",
            "REORDER_PIPELINE_INSERT_BATCH_ROWS",
            pipeline.insert_batch_rows.to_string(),
        ),
        ("logging.level", "REORDER_LOGGING_LEVEL", config.logging.level.clone()),
        ("logging.format", "REORDER_LOGGING_FORMAT", format!("{:?}", config.logging.format)),
    ]
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("reorder.toml"), PathBuf::from("config/reorder.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> anyhow::Result<Option<Value>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read `{}` for source attribution", path.display()))?;
    let doc = raw
        .parse::<Value>()
        .with_context(|| format!("could not parse `{}` for source attribution", path.display()))?;
    Ok(Some(doc))
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var(env_key).is_ok_and(|value| !value.trim().is_empty()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
