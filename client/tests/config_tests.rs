// tests/config_tests.rs
mod common;

use carepath::{ClientConfig, ClientError};
use common::*;
use serial_test::serial;
use std::time::Duration;

const VARS: &[&str] = &[
  "CAREPATH_API_BASE_URL",
  "CAREPATH_PAYMENT_KEY",
  "CAREPATH_CURRENCY",
  "CAREPATH_CASE_TYPE",
  "CAREPATH_MIRROR_PATH",
  "CAREPATH_HTTP_TIMEOUT_SECS",
  "CAREPATH_AUTH_TOKEN",
];

fn clear_env() {
  for var in VARS {
    std::env::remove_var(var);
  }
}

#[test]
#[serial]
fn from_env_reads_values_and_defaults() {
  setup_tracing();
  clear_env();
  std::env::set_var("CAREPATH_API_BASE_URL", "https://api.carepath.test");
  std::env::set_var("CAREPATH_PAYMENT_KEY", "rzp_live_x");
  std::env::set_var("CAREPATH_HTTP_TIMEOUT_SECS", "15");

  let config = ClientConfig::from_env().unwrap();
  assert_eq!(config.api_base_url, "https://api.carepath.test");
  assert_eq!(config.payment_key.as_deref(), Some("rzp_live_x"));
  assert_eq!(config.http_timeout, Some(Duration::from_secs(15)));
  assert_eq!(config.currency, "INR");
  assert_eq!(config.case_type, "1");
  assert_eq!(config.mirror_path, None);
  clear_env();
}

#[test]
#[serial]
fn missing_base_url_or_bad_timeout_is_a_config_error() {
  setup_tracing();
  clear_env();
  assert!(matches!(ClientConfig::from_env(), Err(ClientError::Config(_))));

  std::env::set_var("CAREPATH_API_BASE_URL", "https://api.carepath.test");
  std::env::set_var("CAREPATH_HTTP_TIMEOUT_SECS", "soon");
  assert!(matches!(ClientConfig::from_env(), Err(ClientError::Config(_))));
  clear_env();
}
