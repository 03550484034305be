use reorder_core::config::{AppConfig, LoadOptions};
use reorder_core::store::OrderSource;
use reorder_core::PipelineError;
use reorder_db::{connect_with_settings, OpenMode, SqlOrderSource};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_DB_CONNECTIVITY, EXIT_RUNTIME};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct ReadinessCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
    #[serde(skip)]
    failure: Option<(&'static str, u8)>,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    summary: String,
    checks: Vec<ReadinessCheck>,
}

impl ReadinessCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into(), failure: None }
    }

    fn fail(
        name: &'static str,
        details: impl Into<String>,
        class: &'static str,
        code: u8,
    ) -> Self {
        Self {
            name,
            status: CheckStatus::Fail,
            details: details.into(),
            failure: Some((class, code)),
        }
    }

    fn skipped(name: &'static str, after: &str) -> Self {
        Self {
            name,
            status: CheckStatus::Skipped,
            details: format!("skipped because {after} failed"),
            failure: None,
        }
    }
}

/// Validates configuration, store connectivity, and the input schema without
/// running the pipeline.
pub fn run(options: LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let first_failure = report.checks.iter().find_map(|check| check.failure);

    if json_output {
        let summary = report.summary.clone();
        return match first_failure {
            None => CommandResult::success_with_details("check", summary, Some(&report)),
            Some((class, code)) => {
                CommandResult::failure_with_details("check", class, summary, code, Some(&report))
            }
        };
    }

    CommandResult {
        exit_code: first_failure.map_or(0, |(_, code)| code),
        output: render_human(&report),
    }
}

fn build_report(options: LoadOptions) -> CheckReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            crate::init_logging(&config.logging);
            checks.push(ReadinessCheck::pass(
                "config_validation",
                "configuration loaded and validated",
            ));
            checks.extend(check_store(&config));
        }
        Err(error) => {
            checks.push(ReadinessCheck::fail(
                "config_validation",
                error.to_string(),
                "config_validation",
                EXIT_CONFIG,
            ));
            checks.push(ReadinessCheck::skipped("database_connectivity", "config_validation"));
            checks.push(ReadinessCheck::skipped("input_schema", "config_validation"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let summary = if all_pass {
        "check: all readiness checks passed".to_string()
    } else {
        "check: one or more readiness checks failed".to_string()
    };

    CheckReport { summary, checks }
}

fn check_store(config: &AppConfig) -> Vec<ReadinessCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![
                ReadinessCheck::fail(
                    "database_connectivity",
                    format!("failed to initialize async runtime: {error}"),
                    "runtime_init",
                    EXIT_RUNTIME,
                ),
                ReadinessCheck::skipped("input_schema", "database_connectivity"),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_settings(
            &config.database.url,
            config.database.timeout_secs,
            OpenMode::Existing,
        )
        .await
        {
            Ok(pool) => pool,
            Err(error) => {
                return vec![
                    ReadinessCheck::fail(
                        "database_connectivity",
                        format!("failed to connect to database: {error}"),
                        "db_connectivity",
                        EXIT_DB_CONNECTIVITY,
                    ),
                    ReadinessCheck::skipped("input_schema", "database_connectivity"),
                ];
            }
        };

        let connectivity = ReadinessCheck::pass(
            "database_connectivity",
            format!("connected using `{}`", config.database.url),
        );
        let schema = match SqlOrderSource::new(pool.clone()).verify_schema().await {
            Ok(()) => {
                ReadinessCheck::pass("input_schema", "required tables and columns are present")
            }
            Err(error) => {
                let error = PipelineError::from(error);
                let (class, code) = (error.error_class(), error.exit_code());
                ReadinessCheck::fail("input_schema", error.to_string(), class, code)
            }
        };
        pool.close().await;

        vec![connectivity, schema]
    })
}

fn render_human(report: &CheckReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
