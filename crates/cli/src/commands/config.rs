use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use toml::Value;

use crate::commands::{self, CommandResult};
use quotebook_core::config::AppConfig;

/// Config keys paired with the env vars that can set them, in lookup order.
const FIELDS: &[(&str, &[&str])] = &[
    ("database.url", &["QUOTEBOOK_DATABASE_URL"]),
    ("database.max_connections", &["QUOTEBOOK_DATABASE_MAX_CONNECTIONS"]),
    ("database.timeout_secs", &["QUOTEBOOK_DATABASE_TIMEOUT_SECS"]),
    ("server.bind_address", &["QUOTEBOOK_SERVER_BIND_ADDRESS"]),
    ("server.port", &["QUOTEBOOK_SERVER_PORT", "PORT"]),
    ("server.graceful_shutdown_secs", &["QUOTEBOOK_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
    ("cors.allowed_origins", &["QUOTEBOOK_CORS_ALLOWED_ORIGINS"]),
    ("seed.enabled", &["QUOTEBOOK_SEED_ENABLED"]),
    ("logging.level", &["QUOTEBOOK_LOGGING_LEVEL", "QUOTEBOOK_LOG_LEVEL"]),
    ("logging.format", &["QUOTEBOOK_LOGGING_FORMAT", "QUOTEBOOK_LOG_FORMAT"]),
];

#[derive(Serialize)]
struct ConfigReport<'a> {
    command: &'static str,
    status: &'static str,
    config: &'a AppConfig,
    sources: Map<String, JsonValue>,
}

pub fn run() -> CommandResult {
    let config = match commands::load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let sources = FIELDS
        .iter()
        .map(|(key, env_keys)| {
            let source = field_source(
                key,
                env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            );
            (key.to_string(), JsonValue::String(source))
        })
        .collect::<Map<_, _>>();

    let report = ConfigReport { command: "config", status: "ok", config: &config, sources };
    match serde_json::to_string_pretty(&report) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure(
            "config",
            "serialization",
            error.to_string(),
            commands::EXIT_RUNTIME,
        ),
    }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("quotebook.toml"), PathBuf::from("config/quotebook.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
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

#[cfg(test)]
mod tests {
    use std::path::Path;

    use toml::Value;

    use super::{contains_path, field_source};

    fn doc() -> Value {
        "[server]\nport = 4000\n\n[seed]\nenabled = false\n".parse::<Value>().expect("toml")
    }

    #[test]
    fn contains_path_walks_nested_tables() {
        let doc = doc();

        assert!(contains_path(&doc, "server.port"));
        assert!(contains_path(&doc, "seed.enabled"));
        assert!(!contains_path(&doc, "server.bind_address"));
        assert!(!contains_path(&doc, "logging.level"));
    }

    #[test]
    fn field_source_prefers_file_over_default() {
        let doc = doc();
        let path = Path::new("quotebook.toml");

        assert_eq!(
            field_source("server.port", &["QUOTEBOOK_TEST_UNSET_PORT"], Some(&doc), Some(path)),
            "file (quotebook.toml)"
        );
        assert_eq!(
            field_source("logging.level", &["QUOTEBOOK_TEST_UNSET_LEVEL"], Some(&doc), Some(path)),
            "default"
        );
    }
}
