// carepath/src/pipelines/contexts.rs

//! State carried through the checkout flow. Handlers receive it wrapped in
//! `carepath_flow::FlowContext`.

use crate::config::ClientConfig;
use crate::models::{CartItemDetails, CartStatusResponse, ConfirmationReport, Receipt, SettlementMode};
use crate::services::backend::Backend;
use crate::services::cart_details::CartDetailService;
use crate::services::events::CartEvents;
use crate::services::mirror::CartMirror;
use crate::services::payment_gateway::{GatewayReadiness, PaymentGateway, Prefill};
use std::sync::Arc;
use uuid::Uuid;

/// Collaborators a checkout needs. Cheap to clone.
#[derive(Clone)]
pub struct CheckoutDeps {
  pub config: Arc<ClientConfig>,
  pub backend: Arc<dyn Backend>,
  pub gateway: Arc<dyn PaymentGateway>,
  pub mirror: CartMirror,
  pub events: CartEvents,
}

impl CheckoutDeps {
  pub fn cart_details(&self) -> CartDetailService {
    CartDetailService::new(self.backend.clone())
  }
}

pub struct CheckoutCtxData {
  pub deps: CheckoutDeps,
  pub readiness: GatewayReadiness,
  pub session_id: Uuid,

  pub employee_ref_id: Option<String>,
  pub cart_unique_id: Option<String>,
  pub customer: Prefill,

  pub items: Vec<CartItemDetails>,
  pub total: f64,
  pub amount_minor: u64,
  pub mode: Option<SettlementMode>,

  pub payment_id: Option<String>,
  pub free_confirmation: Option<CartStatusResponse>,
  pub report: ConfirmationReport,
  pub remaining_local_items: Option<usize>,
  /// Set when the local cart could not be updated after payment.
  pub local_cart_error: Option<String>,
  pub receipt: Option<Receipt>,
}

impl CheckoutCtxData {
  pub fn new(
    deps: CheckoutDeps,
    readiness: GatewayReadiness,
    session_id: Uuid,
    employee_ref_id: Option<String>,
    cart_unique_id: Option<String>,
    customer: Prefill,
    items: Vec<CartItemDetails>,
  ) -> Self {
    Self {
      deps,
      readiness,
      session_id,
      employee_ref_id,
      cart_unique_id,
      customer,
      items,
      total: 0.0,
      amount_minor: 0,
      mode: None,
      payment_id: None,
      free_confirmation: None,
      report: ConfirmationReport::default(),
      remaining_local_items: None,
      local_cart_error: None,
      receipt: None,
    }
  }

  pub fn is_paid(&self) -> bool {
    self.mode == Some(SettlementMode::Paid)
  }
}

/// Sum of `ItemAmount * Quantity` over the lines. Stored `TotalAmount` values
/// are ignored.
pub fn cart_total(items: &[CartItemDetails]) -> f64 {
  items.iter().map(CartItemDetails::line_amount).sum()
}
