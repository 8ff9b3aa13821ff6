// carepath/src/errors.rs

use carepath_flow::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
  /// The request never produced an HTTP response (DNS, connect, TLS, reset).
  #[error("Transport Error: {0}")]
  Transport(String),

  #[error("HTTP {status}: {body}")]
  Status { status: u16, body: String },

  #[error("Malformed Response: {0}")]
  Decode(String),

  /// Collapsed fetch failure. Normalizers report every transport/status/decode
  /// problem this way.
  #[error("Fetch Failed: {0}")]
  FetchFailed(String),

  #[error("Validation Error: {0}")]
  Validation(String),

  /// The backend understood the request and said no (bad coupon, closed slot).
  #[error("Rejected: {0}")]
  Rejected(String),

  #[error("Storage Error: {0}")]
  Storage(String),

  #[error("Payment Gateway Unavailable: {0}")]
  GatewayUnavailable(String),

  #[error("Payment Failed: {0}")]
  Payment(String),

  #[error("Payment Dismissed")]
  PaymentDismissed,

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Checkout Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Error: {0}")]
  Internal(String),
}

impl ClientError {
  /// The toast-level message for this error. Deliberately coarse: transport,
  /// status and decode problems all read the same to the user.
  pub fn user_message(&self) -> String {
    match self {
      ClientError::Transport(_) | ClientError::Status { .. } | ClientError::Decode(_) | ClientError::FetchFailed(_) => {
        "Something went wrong. Please try again.".to_string()
      }
      ClientError::Validation(m) | ClientError::Rejected(m) => m.clone(),
      ClientError::Storage(_) => "Could not update your saved cart.".to_string(),
      ClientError::GatewayUnavailable(_) => "Payment is unavailable right now. Please try again shortly.".to_string(),
      ClientError::Payment(_) => "Payment failed. You have not been charged for this attempt.".to_string(),
      ClientError::PaymentDismissed => "Payment was cancelled.".to_string(),
      ClientError::Config(_) | ClientError::Workflow { .. } | ClientError::Internal(_) => {
        "An unexpected error occurred.".to_string()
      }
    }
  }

  pub fn is_rejection(&self) -> bool {
    matches!(self, ClientError::Rejected(_))
  }
}

impl From<reqwest::Error> for ClientError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      return ClientError::Decode(err.to_string());
    }
    if let Some(status) = err.status() {
      return ClientError::Status {
        status: status.as_u16(),
        body: err.to_string(),
      };
    }
    ClientError::Transport(err.to_string())
  }
}

impl From<serde_json::Error> for ClientError {
  fn from(err: serde_json::Error) -> Self {
    ClientError::Decode(err.to_string())
  }
}

impl From<std::io::Error> for ClientError {
  fn from(err: std::io::Error) -> Self {
    ClientError::Storage(err.to_string())
  }
}

impl From<anyhow::Error> for ClientError {
  fn from(err: anyhow::Error) -> Self {
    ClientError::Internal(err.to_string())
  }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
