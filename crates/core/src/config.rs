use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::pair::PairKeyFormat;
use crate::features::NullDaysPolicy;
use crate::pipeline::PipelineSettings;

/// Widest key segment an `i64` id can need.
pub const MAX_KEY_WIDTH: usize = 19;
pub const MAX_INSERT_BATCH_ROWS: usize = 2000;

#[derive(Clone, Debug, Serialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// Copy of the input store that receives the stage tables.
    pub transformed_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PipelineConfig {
    pub output_path: PathBuf,
    pub user_key_width: usize,
    pub item_key_width: usize,
    pub null_days: NullDaysPolicy,
    pub materialize_stages: bool,
    pub insert_batch_rows: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub output_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://data/interim/instacart_2017_05_01.db".to_string(),
                transformed_url: "sqlite://data/interim/instacart_transformed.db".to_string(),
                timeout_secs: 30,
            },
            pipeline: PipelineConfig {
                output_path: PathBuf::from("data/processed/instacart_final.csv"),
                user_key_width: 6,
                item_key_width: 6,
                null_days: NullDaysPolicy::Propagate,
                materialize_stages: true,
                insert_batch_rows: 500,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl PipelineConfig {
    pub fn pair_key(&self) -> PairKeyFormat {
        PairKeyFormat::new(self.user_key_width, self.item_key_width)
    }

    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings { keys: self.pair_key(), null_days: self.null_days }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("reorder.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(transformed_url) = database.transformed_url {
                self.database.transformed_url = transformed_url;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(pipeline) = patch.pipeline {
            if let Some(output_path) = pipeline.output_path {
                self.pipeline.output_path = output_path;
            }
            if let Some(user_key_width) = pipeline.user_key_width {
                self.pipeline.user_key_width = user_key_width;
            }
            if let Some(item_key_width) = pipeline.item_key_width {
                self.pipeline.item_key_width = item_key_width;
            }
            if let Some(null_days) = pipeline.null_days {
                self.pipeline.null_days = null_days;
            }
            if let Some(materialize_stages) = pipeline.materialize_stages {
                self.pipeline.materialize_stages = materialize_stages;
            }
            if let Some(insert_batch_rows) = pipeline.insert_batch_rows {
                self.pipeline.insert_batch_rows = insert_batch_rows;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("REORDER_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("REORDER_DATABASE_TRANSFORMED_URL") {
            self.database.transformed_url = value;
        }
        if let Some(value) = read_env("REORDER_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("REORDER_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("REORDER_PIPELINE_OUTPUT_PATH") {
            self.pipeline.output_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("REORDER_PIPELINE_USER_KEY_WIDTH") {
            self.pipeline.user_key_width = parse_usize("REORDER_PIPELINE_USER_KEY_WIDTH", &value)?;
        }
        if let Some(value) = read_env("REORDER_PIPELINE_ITEM_KEY_WIDTH") {
            self.pipeline.item_key_width = parse_usize("REORDER_PIPELINE_ITEM_KEY_WIDTH", &value)?;
        }
        if let Some(value) = read_env("REORDER_PIPELINE_NULL_DAYS") {
            self.pipeline.null_days = value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "REORDER_PIPELINE_NULL_DAYS".to_string(),
                value: value.clone(),
            })?;
        }
        if let Some(value) = read_env("REORDER_PIPELINE_MATERIALIZE_STAGES") {
            self.pipeline.materialize_stages =
                parse_bool("REORDER_PIPELINE_MATERIALIZE_STAGES", &value)?;
        }
        if let Some(value) = read_env("REORDER_PIPELINE_INSERT_BATCH_ROWS") {
            self.pipeline.insert_batch_rows =
                parse_usize("REORDER_PIPELINE_INSERT_BATCH_ROWS", &value)?;
        }

        let log_level = read_env("REORDER_LOGGING_LEVEL").or_else(|| read_env("REORDER_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("REORDER_LOGGING_FORMAT").or_else(|| read_env("REORDER_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(output_path) = overrides.output_path {
            self.pipeline.output_path = output_path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_pipeline(&self.pipeline)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("reorder.toml"), PathBuf::from("config/reorder.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let transformed_url = database.transformed_url.trim();
    for (key, value) in [("database.url", url), ("database.transformed_url", transformed_url)] {
        let sqlite_url =
            value.starts_with("sqlite://") || value.starts_with("sqlite::") || value == ":memory:";
        if !sqlite_url {
            return Err(ConfigError::Validation(format!(
                "{key} must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
            )));
        }
    }

    if url == transformed_url && !url.contains(":memory:") {
        return Err(ConfigError::Validation(
            "database.transformed_url must name a different store than database.url".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_pipeline(pipeline: &PipelineConfig) -> Result<(), ConfigError> {
    if pipeline.output_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("pipeline.output_path must not be empty".to_string()));
    }

    for (key, width) in [
        ("pipeline.user_key_width", pipeline.user_key_width),
        ("pipeline.item_key_width", pipeline.item_key_width),
    ] {
        if width == 0 || width > MAX_KEY_WIDTH {
            return Err(ConfigError::Validation(format!(
                "{key} must be in range 1..={MAX_KEY_WIDTH}"
            )));
        }
    }

    if pipeline.insert_batch_rows == 0 || pipeline.insert_batch_rows > MAX_INSERT_BATCH_ROWS {
        return Err(ConfigError::Validation(format!(
            "pipeline.insert_batch_rows must be in range 1..={MAX_INSERT_BATCH_ROWS}"
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    pipeline: Option<PipelinePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatabasePatch {
    url: Option<String>,
    transformed_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PipelinePatch {
    output_path: Option<PathBuf>,
    user_key_width: Option<usize>,
    item_key_width: Option<usize>,
    null_days: Option<NullDaysPolicy>,
    materialize_stages: Option<bool>,
    insert_batch_rows: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::features::NullDaysPolicy;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn write_config(dir: &TempDir, body: &str) -> Result<PathBuf, String> {
        let path = dir.path().join("reorder.toml");
        fs::write(&path, body).map_err(|err| err.to_string())?;
        Ok(path)
    }

    #[test]
    fn defaults_point_at_the_interim_database() -> Result<(), String> {
        let config = AppConfig::default();
        config.validate().map_err(|err| err.to_string())?;

        ensure(
            config.database.url == "sqlite://data/interim/instacart_2017_05_01.db",
            "default database url should be the interim store",
        )?;
        ensure(
            config.database.transformed_url == "sqlite://data/interim/instacart_transformed.db",
            "stage tables should default to a separate transformed store",
        )?;
        ensure(
            config.pipeline.output_path == PathBuf::from("data/processed/instacart_final.csv"),
            "default output should be the processed feature file",
        )?;
        ensure(config.pipeline.pair_key().user_width == 6, "default user key width is 6")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_REORDER_DB_PATH", "/tmp/interpolated.db");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[database]
url = "sqlite://${TEST_REORDER_DB_PATH}"

[pipeline]
null_days = "zero"
item_key_width = 8
"#,
            )?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite:///tmp/interpolated.db",
                "database url should be interpolated from environment",
            )?;
            ensure(config.pipeline.null_days == NullDaysPolicy::Zero, "null policy read from file")?;
            ensure(config.pipeline.pair_key().item_width == 8, "item key width read from file")
        })();

        clear_vars(&["TEST_REORDER_DB_PATH"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&["TEST_REORDER_UNSET"]);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(&dir, "[database]\nurl = \"${TEST_REORDER_UNSET}\"\n")?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() }) {
                Ok(_) => return Err("expected interpolation failure".to_string()),
                Err(error) => error,
            };
        ensure(
            matches!(error, ConfigError::MissingEnvInterpolation { ref var } if var == "TEST_REORDER_UNSET"),
            "error should name the missing variable",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("REORDER_LOG_LEVEL", "warn");
        env::set_var("REORDER_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )
        })();

        clear_vars(&["REORDER_LOG_LEVEL", "REORDER_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("REORDER_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("REORDER_PIPELINE_OUTPUT_PATH", "from-env.csv");
        env::set_var("REORDER_PIPELINE_INSERT_BATCH_ROWS", "250");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[database]
url = "sqlite://from-file.db"

[pipeline]
output_path = "from-file.csv"
insert_batch_rows = 100
materialize_stages = false

[logging]
level = "warn"
"#,
            )?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.pipeline.output_path == PathBuf::from("from-env.csv"),
                "env output path should win over file and defaults",
            )?;
            ensure(config.pipeline.insert_batch_rows == 250, "env batch size should win over file")?;
            ensure(!config.pipeline.materialize_stages, "file value should win over default")
        })();

        clear_vars(&[
            "REORDER_DATABASE_URL",
            "REORDER_PIPELINE_OUTPUT_PATH",
            "REORDER_PIPELINE_INSERT_BATCH_ROWS",
        ]);
        result
    }

    #[test]
    fn invalid_env_override_names_the_variable() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("REORDER_PIPELINE_NULL_DAYS", "ignore");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected invalid override".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. } if key == "REORDER_PIPELINE_NULL_DAYS"
                ),
                "error should name the env variable",
            )
        })();

        clear_vars(&["REORDER_PIPELINE_NULL_DAYS"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("REORDER_PIPELINE_USER_KEY_WIDTH", "20");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("pipeline.user_key_width")
            );
            ensure(has_message, "validation failure should mention pipeline.user_key_width")
        })();

        clear_vars(&["REORDER_PIPELINE_USER_KEY_WIDTH"]);
        result
    }

    #[test]
    fn non_sqlite_urls_are_rejected() -> Result<(), String> {
        let mut config = AppConfig::default();
        config.database.url = "postgres://localhost/orders".to_string();

        ensure(
            matches!(config.validate(), Err(ConfigError::Validation(ref message)) if message.contains("database.url")),
            "postgres url should fail validation",
        )
    }

    #[test]
    fn stage_tables_cannot_share_the_input_store() -> Result<(), String> {
        let mut config = AppConfig::default();
        config.database.transformed_url = config.database.url.clone();

        ensure(
            matches!(config.validate(), Err(ConfigError::Validation(ref message)) if message.contains("database.transformed_url")),
            "transformed store equal to the input store should fail validation",
        )?;

        config.database.url = "sqlite::memory:".to_string();
        config.database.transformed_url = "sqlite::memory:".to_string();
        ensure(config.validate().is_ok(), "separate in-memory stores are allowed")
    }

    #[test]
    fn transformed_url_reads_from_env() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("REORDER_DATABASE_TRANSFORMED_URL", "sqlite://from-env-transformed.db");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            ensure(
                config.database.transformed_url == "sqlite://from-env-transformed.db",
                "env transformed url should win over the default",
            )
        })();

        clear_vars(&["REORDER_DATABASE_TRANSFORMED_URL"]);
        result
    }

    #[test]
    fn unknown_file_keys_are_rejected() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(&dir, "[pipeline]\noutput = \"typo.csv\"\n")?;

        let result = AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });
        ensure(matches!(result, Err(ConfigError::ParseFile { .. })), "typo key should not parse")
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");

        let result = AppConfig::load(LoadOptions {
            config_path: Some(missing),
            require_file: true,
            ..LoadOptions::default()
        });
        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should be reported",
        )
    }
}
