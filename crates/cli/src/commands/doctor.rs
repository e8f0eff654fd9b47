use quotebook_core::config::{AppConfig, LoadOptions};
use quotebook_db::{migrations, QuoteRepository, SqlQuoteRepository};
use serde::Serialize;

use crate::commands::{
    self, CommandResult, EXIT_CONFIG, EXIT_DB_CONNECTIVITY, EXIT_MIGRATION, EXIT_RUNTIME,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
    #[serde(skip)]
    exit_code: u8,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into(), exit_code: 0 }
    }

    fn fail(name: &'static str, details: impl Into<String>, exit_code: u8) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into(), exit_code }
    }

    fn skipped(name: &'static str, reason: &str) -> Self {
        Self {
            name,
            status: CheckStatus::Skipped,
            details: format!("skipped because {reason}"),
            exit_code: 0,
        }
    }
}

impl DoctorReport {
    /// The exit code of the first failing check, or 0.
    fn exit_code(&self) -> u8 {
        self.checks
            .iter()
            .find(|check| check.status == CheckStatus::Fail)
            .map_or(0, |check| check.exit_code)
    }
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = report.exit_code();

    if json_output {
        return match serde_json::to_string_pretty(&report) {
            Ok(output) => CommandResult { exit_code, output },
            Err(error) => {
                CommandResult::failure("doctor", "serialization", error.to_string(), EXIT_RUNTIME)
            }
        };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let checks = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            let mut checks =
                vec![DoctorCheck::pass("config_validation", "configuration loaded and validated")];
            checks.extend(check_database(&config));
            checks
        }
        Err(error) => vec![
            DoctorCheck::fail("config_validation", error.to_string(), EXIT_CONFIG),
            DoctorCheck::skipped("database_connectivity", "configuration did not load"),
            DoctorCheck::skipped("schema", "configuration did not load"),
            DoctorCheck::skipped("quote_count", "configuration did not load"),
        ],
    };

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_database(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match commands::runtime("doctor") {
        Ok(runtime) => runtime,
        Err(_) => {
            return vec![
                DoctorCheck::fail(
                    "database_connectivity",
                    "failed to initialize async runtime",
                    EXIT_RUNTIME,
                ),
                DoctorCheck::skipped("schema", "the async runtime did not start"),
                DoctorCheck::skipped("quote_count", "the async runtime did not start"),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match commands::connect(config).await {
            Ok(pool) => pool,
            Err((_, message, _)) => {
                return vec![
                    DoctorCheck::fail(
                        "database_connectivity",
                        format!("failed to connect to database: {message}"),
                        EXIT_DB_CONNECTIVITY,
                    ),
                    DoctorCheck::skipped("schema", "the database was unreachable"),
                    DoctorCheck::skipped("quote_count", "the database was unreachable"),
                ];
            }
        };

        let mut checks = vec![DoctorCheck::pass(
            "database_connectivity",
            format!("connected using `{}`", config.database.url),
        )];

        match migrations::schema_ready(&pool).await {
            Ok(true) => {
                checks.push(DoctorCheck::pass("schema", "quote table present"));
                let repository = SqlQuoteRepository::new(pool.clone());
                checks.push(match repository.count().await {
                    Ok(count) => DoctorCheck::pass("quote_count", format!("{count} quotes stored")),
                    Err(error) => {
                        DoctorCheck::fail("quote_count", error.to_string(), EXIT_DB_CONNECTIVITY)
                    }
                });
            }
            Ok(false) => {
                checks.push(DoctorCheck::fail(
                    "schema",
                    "quote table missing; run `quotebook migrate`",
                    EXIT_MIGRATION,
                ));
                checks.push(DoctorCheck::skipped("quote_count", "the schema is not in place"));
            }
            Err(error) => {
                checks.push(DoctorCheck::fail("schema", error.to_string(), EXIT_DB_CONNECTIVITY));
                checks.push(DoctorCheck::skipped("quote_count", "the schema check failed"));
            }
        }

        pool.close().await;
        checks
    })
}

fn render_human(report: &DoctorReport) -> String {
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

#[cfg(test)]
mod tests {
    use super::{render_human, CheckStatus, DoctorCheck, DoctorReport};

    fn report(checks: Vec<DoctorCheck>) -> DoctorReport {
        DoctorReport { overall_status: CheckStatus::Fail, summary: "doctor".to_string(), checks }
    }

    #[test]
    fn exit_code_follows_first_failure() {
        let report = report(vec![
            DoctorCheck::pass("config_validation", "ok"),
            DoctorCheck::fail("schema", "missing", 5),
            DoctorCheck::fail("quote_count", "broken", 4),
        ]);

        assert_eq!(report.exit_code(), 5);
    }

    #[test]
    fn human_output_marks_each_check() {
        let report = report(vec![
            DoctorCheck::pass("config_validation", "loaded"),
            DoctorCheck::skipped("schema", "the database was unreachable"),
        ]);

        let rendered = render_human(&report);

        assert!(rendered.contains("- [ok] config_validation: loaded"));
        assert!(rendered.contains("- [skip] schema: skipped because the database was unreachable"));
    }
}
