//! Server configuration loaded from file and environment
//!
//! These tests mutate process environment variables, so they run serially.

use collabnotes::backend::error::BackendError;
use collabnotes::backend::server::config::{ServerConfig, CONFIG_PATH_ENV, DEFAULT_MAX_MESSAGE_SIZE, DEV_JWT_SECRET};
use assert_matches::assert_matches;
use serial_test::serial;
use std::io::Write;
use std::net::SocketAddr;

const VARS: [&str; 6] = [
    CONFIG_PATH_ENV,
    "BIND_ADDR",
    "SERVER_PORT",
    "JWT_SECRET",
    "DATABASE_URL",
    "MAX_MESSAGE_SIZE",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_load_defaults_from_empty_environment() {
    clear_env();
    let config = ServerConfig::load().unwrap();
    assert_eq!(config.bind_addr.port(), 3000);
    assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
    assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
    assert!(config.database_url.is_none());
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
bind_addr = "127.0.0.1:4000"
jwt_secret = "from-file"
max_message_size = 2048
"#
    )
    .unwrap();

    std::env::set_var(CONFIG_PATH_ENV, file.path());
    std::env::set_var("SERVER_PORT", "5000");
    std::env::set_var("JWT_SECRET", "from-env");
    let config = ServerConfig::load();
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.bind_addr, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
    assert_eq!(config.jwt_secret, "from-env");
    assert_eq!(config.max_message_size, 2048);
}

#[test]
#[serial]
fn test_missing_config_file_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var(CONFIG_PATH_ENV, dir.path().join("absent.toml"));
    let result = ServerConfig::load();
    clear_env();

    assert_matches!(result, Err(BackendError::ConfigError { .. }));
}

#[test]
#[serial]
fn test_invalid_environment_value_is_an_error() {
    clear_env();
    std::env::set_var("MAX_MESSAGE_SIZE", "lots");
    let result = ServerConfig::load();
    clear_env();

    assert_matches!(result, Err(BackendError::ConfigError { .. }));
}
