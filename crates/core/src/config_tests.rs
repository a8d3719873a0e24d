use super::*;
use serial_test::serial;

const ENV_VARS: &[&str] = &[
    "CB_REDIS_URL",
    "CB_HEARTBEAT_TIMEOUT_MS",
    "CB_LEADER_LEASE_MS",
    "CB_RATE_LIMIT_WINDOW_MS",
    "CB_DEFAULT_CAPACITY",
    "CB_SNAPSHOT_EVERY_N",
    "CB_PROCESSED_EVENT_TTL_S",
    "CB_STREAM_TRIM_MAX_LEN",
    "CB_AUTO_ASSIGN_DELAY_MS",
    "CB_INSTANCE_ID",
    "CB_ROLES",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn defaults_match_spec_table() {
    clear_env();
    let config = Config::load(None);
    assert_eq!(config.heartbeat_timeout_ms, 30_000);
    assert_eq!(config.leader_lease_ms, 30_000);
    assert_eq!(config.rate_limit_window_ms, 60_000);
    assert_eq!(config.default_capacity, 10);
    assert_eq!(config.snapshot_every_n, 100);
    assert_eq!(config.processed_event_ttl_s, 86_400);
    assert_eq!(config.roles, vec!["worker".to_string()]);
    clear_env();
}

#[test]
#[serial]
fn env_vars_override_defaults() {
    clear_env();
    std::env::set_var("CB_HEARTBEAT_TIMEOUT_MS", "5000");
    std::env::set_var("CB_ROLES", "worker, leader");
    let config = Config::load(None);
    assert_eq!(config.heartbeat_timeout_ms, 5000);
    assert_eq!(config.roles, vec!["worker".to_string(), "leader".to_string()]);
    clear_env();
}
