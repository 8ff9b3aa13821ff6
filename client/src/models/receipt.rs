// carepath/src/models/receipt.rs

use crate::models::{CartItemDetails, CartStatusResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementMode {
  /// Zero total: bookings are confirmed without opening the gateway.
  Free,
  Paid,
}

impl SettlementMode {
  pub fn for_total(total: f64) -> Option<Self> {
    if total == 0.0 {
      Some(SettlementMode::Free)
    } else if total > 0.0 {
      Some(SettlementMode::Paid)
    } else {
      None
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemConfirmation {
  pub cart_details_id: i64,
  pub item_name: String,
  pub response: CartStatusResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFailure {
  pub cart_details_id: i64,
  pub item_name: String,
  pub reason: String,
}

/// Per-line outcome of the booking-status updates that follow a payment.
/// Failures are recorded, never rolled back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationReport {
  pub confirmed: Vec<ItemConfirmation>,
  pub failed: Vec<ItemFailure>,
}

impl ConfirmationReport {
  pub fn is_complete(&self) -> bool {
    self.failed.is_empty()
  }

  pub fn confirmed_ids(&self) -> impl Iterator<Item = i64> + '_ {
    self.confirmed.iter().map(|c| c.cart_details_id)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
  pub receipt_id: Uuid,
  pub session_id: Uuid,
  pub mode: SettlementMode,
  pub employee_ref_id: Option<String>,
  pub cart_unique_id: Option<String>,
  pub items: Vec<CartItemDetails>,
  pub total_amount: f64,
  pub amount_minor: u64,
  pub currency: String,
  pub payment_id: Option<String>,
  pub report: ConfirmationReport,
  /// The payment went through but the local cart still lists purchased lines.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub local_cart_error: Option<String>,
  pub issued_at: DateTime<Utc>,
}

/// Where the screen goes after a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
  Receipt(Box<Receipt>),
}
