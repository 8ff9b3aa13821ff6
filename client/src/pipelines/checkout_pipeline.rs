// carepath/src/pipelines/checkout_pipeline.rs

//! The checkout flow.
//!
//! ```text
//! ensure_items -> compute_total -> settle -> clear_purchased -> announce -> build_receipt
//!                                   |
//!                                   +-- free: confirm_first_item
//!                                   +-- paid: require_gateway -> collect_payment -> confirm_items
//! ```
//!
//! `clear_purchased` and `announce` only run for paid checkouts.

use crate::errors::ClientError;
use crate::models::{ItemConfirmation, ItemFailure, Receipt, SettlementMode};
use crate::pipelines::contexts::{cart_total, CheckoutCtxData};
use crate::services::events::CartEvent;
use crate::services::payment_gateway::{to_minor_units, PaymentOutcome, PaymentRequest};
use carepath_flow::{Flow, FlowContext, FlowControl, NoMatch, StepDef};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub type CheckoutFlow = Flow<CheckoutCtxData, ClientError>;

pub fn build_checkout_flow() -> Arc<CheckoutFlow> {
  let mut flow = CheckoutFlow::new(
    "checkout",
    vec![
      StepDef::required("ensure_items"),
      StepDef::required("compute_total"),
      StepDef::required("settle"),
      StepDef::required("clear_purchased").skip_if(|s: &CheckoutCtxData| !s.is_paid()),
      StepDef::required("announce").skip_if(|s: &CheckoutCtxData| !s.is_paid()),
      StepDef::required("build_receipt"),
    ],
  );

  flow.on("ensure_items", |ctx: FlowContext<CheckoutCtxData>| async move {
    let (needs_fetch, ids, service) = {
      let guard = ctx.read();
      (
        guard.items.is_empty(),
        guard.employee_ref_id.clone().zip(guard.cart_unique_id.clone()),
        guard.deps.cart_details(),
      )
    };
    if needs_fetch {
      if let Some((employee_ref_id, cart_unique_id)) = ids {
        let items = service.fetch(&employee_ref_id, &cart_unique_id).await?;
        ctx.update(|s| s.items = items);
      }
    }
    if ctx.read().items.is_empty() {
      return Err(ClientError::Validation("Your cart is empty.".to_string()));
    }
    Ok::<_, ClientError>(FlowControl::Continue)
  });

  flow.on("compute_total", |ctx: FlowContext<CheckoutCtxData>| async move {
    ctx.update(|s| {
      s.total = cart_total(&s.items);
      s.amount_minor = to_minor_units(s.total);
      s.mode = SettlementMode::for_total(s.total);
      info!(total = s.total, amount_minor = s.amount_minor, mode = ?s.mode, "Checkout total computed.");
    });
    Ok::<_, ClientError>(FlowControl::Continue)
  });

  flow
    .branches_for_step("settle")
    .when("free", |s: &CheckoutCtxData| s.mode == Some(SettlementMode::Free), free_flow())
    .when("paid", |s: &CheckoutCtxData| s.mode == Some(SettlementMode::Paid), paid_flow())
    .if_no_match(NoMatch::Fail)
    .finalize();

  // Payment is already captured here. Storage trouble is recorded on the
  // receipt and never fails the checkout.
  flow.on("clear_purchased", |ctx: FlowContext<CheckoutCtxData>| async move {
    let (employee_ref_id, mirror, purchased) = {
      let guard = ctx.read();
      let purchased: HashSet<i64> = guard.report.confirmed_ids().collect();
      (guard.employee_ref_id.clone(), guard.deps.mirror.clone(), purchased)
    };
    let outcome = async {
      let employee_ref_id = match employee_ref_id {
        Some(id) => Some(id),
        None => mirror.employee_ref_id().await?,
      };
      let Some(employee_ref_id) = employee_ref_id else {
        return Ok(None);
      };
      let remaining = mirror.remove_purchased(&employee_ref_id, &purchased).await?;
      Ok::<_, ClientError>(Some((employee_ref_id, remaining.len())))
    }
    .await;

    match outcome {
      Ok(Some((employee_ref_id, remaining))) => ctx.update(|s| {
        s.employee_ref_id = Some(employee_ref_id);
        s.remaining_local_items = Some(remaining);
      }),
      Ok(None) => warn!("No employee reference available; local cart left untouched."),
      Err(e) => {
        warn!(error = %e, "Local cart not updated after payment.");
        ctx.update(|s| s.local_cart_error = Some(e.to_string()));
      }
    }
    Ok::<_, ClientError>(FlowControl::Continue)
  });

  flow.on("announce", |ctx: FlowContext<CheckoutCtxData>| async move {
    let guard = ctx.read();
    let delivered = guard.deps.events.publish(CartEvent::CartChanged {
      employee_ref_id: guard.employee_ref_id.clone(),
      remaining_items: guard.remaining_local_items.unwrap_or(0),
    });
    info!(subscribers = delivered, "Cart change announced.");
    Ok::<_, ClientError>(FlowControl::Continue)
  });

  flow.on("build_receipt", |ctx: FlowContext<CheckoutCtxData>| async move {
    ctx.update(|s| {
      let receipt = Receipt {
        receipt_id: Uuid::new_v4(),
        session_id: s.session_id,
        mode: s.mode.unwrap_or(SettlementMode::Paid),
        employee_ref_id: s.employee_ref_id.clone(),
        cart_unique_id: s.cart_unique_id.clone(),
        items: s.items.clone(),
        total_amount: s.total,
        amount_minor: s.amount_minor,
        currency: s.deps.config.currency.clone(),
        payment_id: s.payment_id.clone(),
        report: s.report.clone(),
        local_cart_error: s.local_cart_error.clone(),
        issued_at: Utc::now(),
      };
      info!(receipt_id = %receipt.receipt_id, "Receipt issued.");
      s.receipt = Some(receipt);
    });
    Ok::<_, ClientError>(FlowControl::Continue)
  });

  Arc::new(flow)
}

fn free_flow() -> Arc<CheckoutFlow> {
  let mut flow = CheckoutFlow::with_steps("checkout_free", &["confirm_first_item"]);

  // A zero-total cart is confirmed through its first line only.
  flow.on("confirm_first_item", |ctx: FlowContext<CheckoutCtxData>| async move {
    let (item, service, case_type) = {
      let guard = ctx.read();
      (
        guard.items.first().cloned(),
        guard.deps.cart_details(),
        guard.deps.config.case_type.clone(),
      )
    };
    let Some(item) = item else {
      return Err(ClientError::Validation("Your cart is empty.".to_string()));
    };
    let response = service.confirm_item(&item, &case_type).await.map_err(|e| {
      error!(cart_details_id = item.cart_details_id, error = %e, "Free booking confirmation failed.");
      e
    })?;
    ctx.update(|s| {
      s.report.confirmed.push(ItemConfirmation {
        cart_details_id: item.cart_details_id,
        item_name: item.item_name.clone(),
        response: response.clone(),
      });
      s.free_confirmation = Some(response);
    });
    Ok::<_, ClientError>(FlowControl::Continue)
  });

  Arc::new(flow)
}

fn paid_flow() -> Arc<CheckoutFlow> {
  let mut flow =
    CheckoutFlow::with_steps("checkout_paid", &["require_gateway", "collect_payment", "confirm_items"]);

  flow.on("require_gateway", |ctx: FlowContext<CheckoutCtxData>| async move {
    let guard = ctx.read();
    guard.readiness.ensure_ready()?;
    if guard.deps.config.payment_key.is_none() {
      return Err(ClientError::GatewayUnavailable("No payment key is configured.".to_string()));
    }
    Ok::<_, ClientError>(FlowControl::Continue)
  });

  flow.on("collect_payment", |ctx: FlowContext<CheckoutCtxData>| async move {
    let (gateway, request) = {
      let guard = ctx.read();
      let config = &guard.deps.config;
      let request = PaymentRequest {
        key: config.payment_key.clone().unwrap_or_default(),
        amount_minor: guard.amount_minor,
        currency: config.currency.clone(),
        merchant_name: config.merchant_name.clone(),
        description: format!("Payment for {} item(s)", guard.items.len()),
        reference: guard.session_id.to_string(),
        prefill: guard.customer.clone(),
      };
      (guard.deps.gateway.clone(), request)
    };

    info!(amount_minor = request.amount_minor, currency = %request.currency, "Opening payment gateway.");
    match gateway.open(request).await {
      PaymentOutcome::Succeeded { payment_id } => {
        info!(payment_id = %payment_id, "Payment captured.");
        ctx.update(|s| s.payment_id = Some(payment_id));
        Ok(FlowControl::Continue)
      }
      PaymentOutcome::Failed { reason } => {
        error!(reason = %reason, "Payment failed.");
        Err(ClientError::Payment(reason))
      }
      PaymentOutcome::Dismissed => {
        warn!("Payment window dismissed.");
        Err(ClientError::PaymentDismissed)
      }
    }
  });

  // Lines are confirmed one at a time. A failed line is recorded and the loop
  // moves on; the payment has already been captured.
  flow.on("confirm_items", |ctx: FlowContext<CheckoutCtxData>| async move {
    let (items, service, case_type) = {
      let guard = ctx.read();
      (guard.items.clone(), guard.deps.cart_details(), guard.deps.config.case_type.clone())
    };
    for item in items {
      match service.confirm_item(&item, &case_type).await {
        Ok(response) => ctx.update(|s| {
          s.report.confirmed.push(ItemConfirmation {
            cart_details_id: item.cart_details_id,
            item_name: item.item_name.clone(),
            response,
          })
        }),
        Err(e) => {
          error!(cart_details_id = item.cart_details_id, error = %e, "Booking confirmation failed after payment.");
          ctx.update(|s| {
            s.report.failed.push(ItemFailure {
              cart_details_id: item.cart_details_id,
              item_name: item.item_name.clone(),
              reason: e.to_string(),
            })
          });
        }
      }
    }
    let report = ctx.map_read(|s| &s.report);
    info!(confirmed = report.confirmed.len(), failed = report.failed.len(), "Paid bookings processed.");
    Ok::<_, ClientError>(FlowControl::Continue)
  });

  Arc::new(flow)
}
