// carepath/src/config.rs

use crate::errors::{ClientError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Backend REST root, e.g. `https://api.example.com`.
  pub api_base_url: String,
  pub auth_token: Option<String>,
  pub http_timeout: Option<Duration>,

  /// Public key handed to the payment widget. Paid checkout refuses to open
  /// the widget without one.
  pub payment_key: Option<String>,
  pub currency: String,
  pub merchant_name: String,

  /// Case-type code sent with every booking status update.
  pub case_type: String,

  /// Directory for the file-backed cart mirror; in-memory when unset.
  pub mirror_path: Option<PathBuf>,
}

impl ClientConfig {
  pub fn new(api_base_url: impl Into<String>) -> Self {
    Self {
      api_base_url: api_base_url.into(),
      auth_token: None,
      http_timeout: None,
      payment_key: None,
      currency: "INR".to_string(),
      merchant_name: "Carepath".to_string(),
      case_type: "1".to_string(),
      mirror_path: None,
    }
  }

  pub fn with_payment_key(mut self, key: impl Into<String>) -> Self {
    self.payment_key = Some(key.into());
    self
  }

  pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
    self.auth_token = Some(token.into());
    self
  }

  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| ClientError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let api_base_url = get_env("CAREPATH_API_BASE_URL")?;
    let auth_token = get_env("CAREPATH_AUTH_TOKEN").ok();
    let http_timeout = match get_env("CAREPATH_HTTP_TIMEOUT_SECS").ok() {
      Some(raw) => Some(Duration::from_secs(raw.parse::<u64>().map_err(|e| {
        ClientError::Config(format!("Invalid CAREPATH_HTTP_TIMEOUT_SECS: {}", e))
      })?)),
      None => None,
    };
    let payment_key = get_env("CAREPATH_PAYMENT_KEY").ok();
    let currency = get_env("CAREPATH_CURRENCY").unwrap_or_else(|_| "INR".to_string());
    let merchant_name = get_env("CAREPATH_MERCHANT_NAME").unwrap_or_else(|_| "Carepath".to_string());
    let case_type = get_env("CAREPATH_CASE_TYPE").unwrap_or_else(|_| "1".to_string());
    let mirror_path = get_env("CAREPATH_MIRROR_PATH").ok().map(PathBuf::from);

    if payment_key.is_none() {
      tracing::warn!("CAREPATH_PAYMENT_KEY is not set; paid checkout will be unavailable.");
    }
    tracing::info!(api_base_url = %api_base_url, currency = %currency, "Client configuration loaded.");

    Ok(Self {
      api_base_url,
      auth_token,
      http_timeout,
      payment_key,
      currency,
      merchant_name,
      case_type,
      mirror_path,
    })
  }
}
