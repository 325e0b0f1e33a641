use std::env;
use std::sync::{Mutex, OnceLock};

use savora_cli::commands::{migrate, seed, smoke};
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("SAVORA_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_unsupported_url() {
    with_env(&[("SAVORA_DATABASE_URL", "postgres://localhost/savora")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_returns_success_with_valid_env() {
    with_env(&[("SAVORA_DATABASE_URL", "sqlite::memory:")], || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected successful seed run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn seed_returns_deterministic_dish_summary() {
    with_env(&[("SAVORA_DATABASE_URL", "sqlite::memory:")], || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected deterministic seed success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let message = payload["message"].as_str().unwrap_or("");
        let margherita_line = "  - dish-margherita: main (Popular vegetarian main)";
        let gnocchi_line = "  - dish-truffle-gnocchi: main (Premium vegetarian main)";
        let salad_line = "  - dish-garden-salad: side (Vegan gluten-free side)";
        assert!(message.contains(margherita_line));
        assert!(message.contains(gnocchi_line));
        assert!(message.contains(salad_line));
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    with_env(&[("SAVORA_DATABASE_URL", "sqlite::memory:")], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["command"], "seed");
        assert_eq!(first_payload["status"], "ok");

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let second_payload = parse_payload(&second.output);
        assert_eq!(second_payload["command"], "seed");
        assert_eq!(second_payload["status"], "ok");

        assert_eq!(first_payload["message"], second_payload["message"]);
    });
}

#[test]
fn smoke_returns_success_report_with_valid_env() {
    with_env(&[("SAVORA_DATABASE_URL", "sqlite::memory:")], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 0, "expected successful smoke report");

        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["command"], "smoke");
        assert_eq!(payload["status"], "pass");

        let checks = payload["checks"].as_array().expect("smoke report lists checks");
        let ranking = checks
            .iter()
            .find(|check| check["name"] == "ranking_surfaces")
            .expect("ranking surfaces check is part of the smoke run");
        assert_eq!(ranking["status"], "pass");
    });
}

#[test]
fn smoke_returns_failure_when_config_invalid() {
    with_env(&[("SAVORA_DATABASE_URL", "postgres://localhost/savora")], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 6, "expected smoke failure code");

        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["command"], "smoke");
        assert_eq!(payload["status"], "fail");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "SAVORA_DATABASE_URL",
        "SAVORA_DATABASE_MAX_CONNECTIONS",
        "SAVORA_DATABASE_TIMEOUT_SECS",
        "SAVORA_SERVER_BIND_ADDRESS",
        "SAVORA_SERVER_PORT",
        "SAVORA_SERVER_HEALTH_CHECK_PORT",
        "SAVORA_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "SAVORA_RECOMMEND_FEED_LIMIT",
        "SAVORA_RECOMMEND_SIMILAR_LIMIT",
        "SAVORA_RECOMMEND_TRENDING_LIMIT",
        "SAVORA_RECOMMEND_TRENDING_WINDOW_DAYS",
        "SAVORA_LOGGING_LEVEL",
        "SAVORA_LOGGING_FORMAT",
        "SAVORA_LOG_LEVEL",
        "SAVORA_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
