// carepath/src/checkout.rs

//! Checkout screen state machine.
//!
//! ```text
//! Loading -> ReadyWithItems | EmptyCart
//! ReadyWithItems -> ProcessingFreeConfirmation | ProcessingPaidPayment
//! Processing* -> Success | Failed -> ReadyWithItems
//! ```
//!
//! Gateway loading starts when the session is created and runs alongside
//! everything else. Only the paid path waits on it, and it does not wait: an
//! unready gateway is an error the user can retry.

use crate::errors::{ClientError, Result};
use crate::models::{CartItemDetails, Navigation, SettlementMode};
use crate::pipelines::checkout_pipeline::{build_checkout_flow, CheckoutFlow};
use crate::pipelines::contexts::{cart_total, CheckoutCtxData, CheckoutDeps};
use crate::services::payment_gateway::{GatewayReadiness, GatewayStatus, Prefill};
use carepath_flow::{FlowContext, FlowOutcome};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
  Loading,
  ReadyWithItems,
  EmptyCart,
  ProcessingFreeConfirmation,
  ProcessingPaidPayment,
  Success { receipt_id: Uuid },
  Failed { message: String },
}

/// How the checkout screen was reached. Items handed over by the previous
/// screen are used as-is; otherwise the cart is fetched when both
/// identifiers are known.
#[derive(Debug, Clone, Default)]
pub struct CheckoutEntry {
  pub employee_ref_id: Option<String>,
  pub cart_unique_id: Option<String>,
  pub items: Option<Vec<CartItemDetails>>,
  pub customer: Prefill,
}

pub struct CheckoutSession {
  id: Uuid,
  deps: CheckoutDeps,
  readiness: GatewayReadiness,
  flow: Arc<CheckoutFlow>,
  entry: CheckoutEntry,
  items: Vec<CartItemDetails>,
  state: CheckoutState,
  history: Vec<CheckoutState>,
  last_error: Option<String>,
}

impl CheckoutSession {
  /// Creates the session and starts loading the payment gateway in the
  /// background. Must be called inside a tokio runtime.
  pub fn new(deps: CheckoutDeps, entry: CheckoutEntry) -> Self {
    let readiness = GatewayReadiness::spawn(deps.gateway.clone());
    Self::with_readiness(deps, entry, readiness)
  }

  pub fn with_readiness(deps: CheckoutDeps, entry: CheckoutEntry, readiness: GatewayReadiness) -> Self {
    let id = Uuid::new_v4();
    info!(session_id = %id, "Checkout session created.");
    Self {
      id,
      deps,
      readiness,
      flow: build_checkout_flow(),
      entry,
      items: Vec::new(),
      state: CheckoutState::Loading,
      history: vec![CheckoutState::Loading],
      last_error: None,
    }
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn state(&self) -> &CheckoutState {
    &self.state
  }

  /// Every state the session has been in, oldest first.
  pub fn history(&self) -> &[CheckoutState] {
    &self.history
  }

  pub fn items(&self) -> &[CartItemDetails] {
    &self.items
  }

  pub fn last_error(&self) -> Option<&str> {
    self.last_error.as_deref()
  }

  pub fn total(&self) -> f64 {
    cart_total(&self.items)
  }

  pub fn settlement_mode(&self) -> Option<SettlementMode> {
    SettlementMode::for_total(self.total())
  }

  pub fn gateway_status(&self) -> GatewayStatus {
    self.readiness.status()
  }

  pub async fn gateway_settled(&self) -> GatewayStatus {
    self.readiness.settled().await
  }

  fn transition(&mut self, next: CheckoutState) {
    info!(session_id = %self.id, from = ?self.state, to = ?next, "Checkout state change.");
    self.state = next.clone();
    self.history.push(next);
  }

  /// Resolves the cart for this session. A fetch failure leaves the session
  /// in `EmptyCart` and is returned to the caller.
  #[instrument(skip(self), fields(session_id = %self.id))]
  pub async fn load(&mut self) -> Result<&CheckoutState> {
    let loaded = match self.entry.items.clone() {
      Some(items) => Ok(items),
      None => match (&self.entry.employee_ref_id, &self.entry.cart_unique_id) {
        (Some(employee_ref_id), Some(cart_unique_id)) => {
          self.deps.cart_details().fetch(employee_ref_id, cart_unique_id).await
        }
        _ => {
          warn!("Cart identifiers missing; skipping cart fetch.");
          Ok(Vec::new())
        }
      },
    };

    match loaded {
      Ok(items) => {
        self.items = items;
        let next = if self.items.is_empty() {
          CheckoutState::EmptyCart
        } else {
          CheckoutState::ReadyWithItems
        };
        self.transition(next);
        Ok(&self.state)
      }
      Err(e) => {
        self.last_error = Some(e.user_message());
        self.transition(CheckoutState::EmptyCart);
        Err(e)
      }
    }
  }

  /// Runs the checkout flow for the loaded items.
  ///
  /// On failure the session returns to `ReadyWithItems` so the user can retry.
  /// Retrying re-submits everything; nothing here is idempotent.
  #[instrument(skip(self), fields(session_id = %self.id))]
  pub async fn confirm(&mut self) -> Result<Navigation> {
    if self.state != CheckoutState::ReadyWithItems {
      return Err(ClientError::Validation(format!(
        "Checkout cannot be confirmed while {:?}.",
        self.state
      )));
    }
    let processing = match self.settlement_mode() {
      Some(SettlementMode::Free) => CheckoutState::ProcessingFreeConfirmation,
      Some(SettlementMode::Paid) => CheckoutState::ProcessingPaidPayment,
      None => return Err(ClientError::Validation("The cart total is invalid.".to_string())),
    };
    self.transition(processing);
    self.last_error = None;

    let ctx = FlowContext::new(CheckoutCtxData::new(
      self.deps.clone(),
      self.readiness.clone(),
      self.id,
      self.entry.employee_ref_id.clone(),
      self.entry.cart_unique_id.clone(),
      self.entry.customer.clone(),
      self.items.clone(),
    ));

    let outcome = self.flow.run(ctx.clone()).await;
    let receipt = match outcome {
      Ok(FlowOutcome::Completed) => ctx.write().receipt.take(),
      Ok(FlowOutcome::Stopped) => None,
      Err(e) => return Err(self.fail(e)),
    };

    match receipt {
      Some(receipt) => {
        self.transition(CheckoutState::Success {
          receipt_id: receipt.receipt_id,
        });
        Ok(Navigation::Receipt(Box::new(receipt)))
      }
      None => Err(self.fail(ClientError::Internal("Checkout finished without a receipt.".to_string()))),
    }
  }

  fn fail(&mut self, e: ClientError) -> ClientError {
    error!(session_id = %self.id, error = %e, "Checkout failed.");
    let message = e.user_message();
    self.last_error = Some(message.clone());
    self.transition(CheckoutState::Failed { message });
    self.transition(CheckoutState::ReadyWithItems);
    e
  }
}
