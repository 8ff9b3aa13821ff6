// carepath/src/services/payment_gateway.rs

//! The third-party payment widget, seen from the client.

use crate::errors::{ClientError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, instrument};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prefill {
  pub name: String,
  pub contact: String,
  pub email: String,
}

/// What the widget is opened with. `amount_minor` is in the currency's minor
/// unit (paise for INR).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
  pub key: String,
  pub amount_minor: u64,
  pub currency: String,
  pub merchant_name: String,
  pub description: String,
  pub reference: String,
  pub prefill: Prefill,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
  Succeeded { payment_id: String },
  Failed { reason: String },
  Dismissed,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// Loads the widget's runtime. Called once per checkout session, in the
  /// background.
  async fn load(&self) -> Result<()>;

  /// Opens the widget and resolves once the user finishes with it.
  async fn open(&self, request: PaymentRequest) -> PaymentOutcome;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayStatus {
  Pending,
  Ready,
  Failed(String),
}

/// Rupees to paise, rounded to the nearest paisa.
pub fn to_minor_units(amount: f64) -> u64 {
  if !amount.is_finite() || amount <= 0.0 {
    return 0;
  }
  (amount * 100.0).round() as u64
}

/// Watches the gateway's load state. Cloning shares the same state.
#[derive(Debug, Clone)]
pub struct GatewayReadiness {
  receiver: watch::Receiver<GatewayStatus>,
}

impl GatewayReadiness {
  /// Starts loading `gateway` on the current runtime and returns immediately.
  #[instrument(name = "GatewayReadiness::spawn", skip(gateway))]
  pub fn spawn(gateway: Arc<dyn PaymentGateway>) -> Self {
    let (sender, receiver) = watch::channel(GatewayStatus::Pending);
    tokio::spawn(async move {
      let status = match gateway.load().await {
        Ok(()) => {
          info!("Payment gateway ready.");
          GatewayStatus::Ready
        }
        Err(e) => {
          error!(error = %e, "Payment gateway failed to load.");
          GatewayStatus::Failed(e.to_string())
        }
      };
      let _ = sender.send(status);
    });
    Self { receiver }
  }

  pub fn fixed(status: GatewayStatus) -> Self {
    let (_sender, receiver) = watch::channel(status);
    Self { receiver }
  }

  pub fn status(&self) -> GatewayStatus {
    self.receiver.borrow().clone()
  }

  /// Waits until loading has finished one way or the other.
  pub async fn settled(&self) -> GatewayStatus {
    let mut receiver = self.receiver.clone();
    let settled = match receiver.wait_for(|s| *s != GatewayStatus::Pending).await {
      Ok(status) => Some(status.clone()),
      // Loader dropped without reporting; fall back to the last value seen.
      Err(_) => None,
    };
    settled.unwrap_or_else(|| receiver.borrow().clone())
  }

  /// `Ok` only when the gateway can be opened right now.
  pub fn ensure_ready(&self) -> Result<()> {
    match self.status() {
      GatewayStatus::Ready => Ok(()),
      GatewayStatus::Pending => Err(ClientError::GatewayUnavailable(
        "The payment gateway is still loading.".to_string(),
      )),
      GatewayStatus::Failed(reason) => Err(ClientError::GatewayUnavailable(reason)),
    }
  }
}
