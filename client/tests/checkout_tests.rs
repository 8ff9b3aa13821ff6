// tests/checkout_tests.rs
mod common;

use carepath::models::{Navigation, SettlementMode};
use carepath::services::cart_details::{CART_DETAILS_PATH, STATUS_UPDATE_PATH};
use carepath::services::payment_gateway::GatewayReadiness;
use carepath::{
  CartEvent, CheckoutEntry, CheckoutSession, CheckoutState, ClientError, GatewayStatus, PaymentOutcome, Prefill,
};
use common::*;
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;

fn entry_with(items: Vec<carepath::models::CartItemDetails>) -> CheckoutEntry {
  CheckoutEntry {
    employee_ref_id: Some("EMP-1".to_string()),
    cart_unique_id: Some("CART-1".to_string()),
    items: Some(items),
    customer: Prefill {
      name: "Asha Rao".to_string(),
      contact: "9800000000".to_string(),
      email: "asha@example.com".to_string(),
    },
  }
}

async fn ready_session(
  backend: Arc<MockBackend>,
  gateway: Arc<MockGateway>,
  entry: CheckoutEntry,
) -> (carepath::CareClient, CheckoutSession) {
  let client = client_with(backend);
  let mut session = client.checkout(gateway, entry);
  session.load().await.unwrap();
  session.gateway_settled().await;
  (client, session)
}

#[test]
fn checkout_flow_steps_are_in_order() {
  let flow = carepath::pipelines::checkout_pipeline::build_checkout_flow();
  assert_eq!(
    flow.step_names(),
    vec!["ensure_items", "compute_total", "settle", "clear_purchased", "announce", "build_receipt"]
  );
}

#[tokio::test]
#[serial]
async fn zero_total_confirms_first_item_without_gateway() {
  setup_tracing();
  let backend = MockBackend::new();
  backend.on("POST", STATUS_UPDATE_PATH, status_ok("APT-1"));
  let gateway = MockGateway::succeeding("pay_unused");

  let (_client, mut session) =
    ready_session(backend.clone(), gateway.clone(), entry_with(vec![cart_line(1, 0.0, 1), cart_line(2, 0.0, 1)])).await;
  assert_eq!(session.settlement_mode(), Some(SettlementMode::Free));

  let Navigation::Receipt(receipt) = session.confirm().await.unwrap();

  assert!(gateway.opened().is_empty());
  let updates = backend.calls_to("POST", STATUS_UPDATE_PATH);
  assert_eq!(updates.len(), 1);
  let body = updates[0].body.clone().unwrap();
  assert_eq!(body["CartDetailsId"], json!(1));
  assert_eq!(body["CaseLeadId"], json!("CASE-1"));
  assert_eq!(body["CaseType"], json!("1"));
  assert_eq!(body["CollectionDate"], json!("2026-11-02 09:30"));
  assert_eq!(body["STMId"], json!("STM-1"));
  assert_eq!(body["DCSelection"], json!("DC-7"));

  assert_eq!(receipt.mode, SettlementMode::Free);
  assert_eq!(receipt.payment_id, None);
  assert_eq!(receipt.report.confirmed[0].response.appointment_id.as_deref(), Some("APT-1"));
  assert_eq!(
    session.history(),
    &[
      CheckoutState::Loading,
      CheckoutState::ReadyWithItems,
      CheckoutState::ProcessingFreeConfirmation,
      CheckoutState::Success {
        receipt_id: receipt.receipt_id
      },
    ]
  );
}

#[tokio::test]
#[serial]
async fn free_confirmation_failure_returns_to_ready() {
  setup_tracing();
  let backend = MockBackend::new();
  backend.once(
    "POST",
    STATUS_UPDATE_PATH,
    Err(ClientError::Status {
      status: 500,
      body: "down".to_string(),
    }),
  );
  backend.on("POST", STATUS_UPDATE_PATH, status_ok("APT-2"));

  let (_client, mut session) =
    ready_session(backend.clone(), MockGateway::succeeding("unused"), entry_with(vec![cart_line(1, 0.0, 1)])).await;

  let err = session.confirm().await.unwrap_err();
  assert!(matches!(err, ClientError::Status { status: 500, .. }));
  assert_eq!(session.state(), &CheckoutState::ReadyWithItems);
  assert!(session.last_error().is_some());
  assert!(session
    .history()
    .iter()
    .any(|s| matches!(s, CheckoutState::Failed { .. })));

  // Manual retry.
  assert!(session.confirm().await.is_ok());
  assert_eq!(backend.calls_to("POST", STATUS_UPDATE_PATH).len(), 2);
}

#[tokio::test]
#[serial]
async fn paid_checkout_charges_minor_units_and_clears_only_purchased_lines() {
  setup_tracing();
  let backend = MockBackend::new();
  backend.on("POST", STATUS_UPDATE_PATH, status_ok("APT-9"));
  let gateway = MockGateway::succeeding("pay_123");

  let a = cart_line(1, 499.5, 1);
  let b = cart_line(2, 100.25, 2);
  let c = cart_line(3, 80.0, 1);

  let client = client_with(backend.clone());
  client
    .mirror
    .replace_employee_cart("EMP-1", &[a.clone(), b.clone(), c.clone()])
    .await
    .unwrap();
  let mut events = client.events.subscribe();

  let mut session = client.checkout(gateway.clone(), entry_with(vec![a, b]));
  session.load().await.unwrap();
  assert_eq!(session.gateway_settled().await, GatewayStatus::Ready);

  let Navigation::Receipt(receipt) = session.confirm().await.unwrap();

  let opened = gateway.opened();
  assert_eq!(opened.len(), 1);
  assert_eq!(opened[0].amount_minor, 70000);
  assert_eq!(opened[0].currency, "INR");
  assert_eq!(opened[0].key, PAYMENT_KEY);
  assert_eq!(opened[0].prefill.email, "asha@example.com");

  let updates = backend.calls_to("POST", STATUS_UPDATE_PATH);
  let confirmed_ids: Vec<_> = updates.iter().map(|c| c.body.clone().unwrap()["CartDetailsId"].clone()).collect();
  assert_eq!(confirmed_ids, vec![json!(1), json!(2)]);

  let remaining = client.mirror.employee_cart("EMP-1").await.unwrap();
  assert_eq!(remaining, vec![c]);

  assert_eq!(
    events.recv().await.unwrap(),
    CartEvent::CartChanged {
      employee_ref_id: Some("EMP-1".to_string()),
      remaining_items: 1,
    }
  );

  assert_eq!(receipt.mode, SettlementMode::Paid);
  assert_eq!(receipt.payment_id.as_deref(), Some("pay_123"));
  assert_eq!(receipt.total_amount, 700.0);
  assert!(receipt.report.is_complete());
  assert_eq!(session.state(), &CheckoutState::Success { receipt_id: receipt.receipt_id });
}

#[tokio::test]
#[serial]
async fn partial_confirmation_failure_is_reported_not_rolled_back() {
  setup_tracing();
  let backend = MockBackend::new();
  backend.once("POST", STATUS_UPDATE_PATH, Ok(status_ok("APT-1")));
  backend.once("POST", STATUS_UPDATE_PATH, Ok(json!({ "success": false, "message": "Slot unavailable" })));

  let a = cart_line(1, 100.0, 1);
  let b = cart_line(2, 100.0, 1);
  let client = client_with(backend.clone());
  client
    .mirror
    .replace_employee_cart("EMP-1", &[a.clone(), b.clone()])
    .await
    .unwrap();

  let mut session = client.checkout(MockGateway::succeeding("pay_1"), entry_with(vec![a, b.clone()]));
  session.load().await.unwrap();
  session.gateway_settled().await;

  let Navigation::Receipt(receipt) = session.confirm().await.unwrap();

  assert_eq!(receipt.report.confirmed.len(), 1);
  assert_eq!(receipt.report.failed.len(), 1);
  assert_eq!(receipt.report.failed[0].cart_details_id, 2);
  assert!(receipt.report.failed[0].reason.contains("Slot unavailable"));
  assert_eq!(client.mirror.employee_cart("EMP-1").await.unwrap(), vec![b]);
}

#[tokio::test]
#[serial]
async fn dismissed_payment_returns_to_ready_without_confirming() {
  setup_tracing();
  let backend = MockBackend::new();
  let gateway = MockGateway::with_outcome(PaymentOutcome::Dismissed);
  let (_client, mut session) =
    ready_session(backend.clone(), gateway.clone(), entry_with(vec![cart_line(1, 250.0, 1)])).await;

  let err = session.confirm().await.unwrap_err();
  assert!(matches!(err, ClientError::PaymentDismissed));
  assert_eq!(session.state(), &CheckoutState::ReadyWithItems);
  assert!(backend.calls_to("POST", STATUS_UPDATE_PATH).is_empty());

  gateway.set_outcome(PaymentOutcome::Failed {
    reason: "card declined".to_string(),
  });
  let err = session.confirm().await.unwrap_err();
  assert!(matches!(err, ClientError::Payment(ref r) if r == "card declined"));
  assert_eq!(gateway.opened().len(), 2);
}

#[tokio::test]
#[serial]
async fn paid_path_requires_a_ready_gateway() {
  setup_tracing();
  let backend = MockBackend::new();

  let gateway = MockGateway::failing_to_load("script blocked");
  let (_client, mut session) =
    ready_session(backend.clone(), gateway.clone(), entry_with(vec![cart_line(1, 10.0, 1)])).await;
  assert!(matches!(session.gateway_status(), GatewayStatus::Failed(_)));
  let err = session.confirm().await.unwrap_err();
  assert!(matches!(err, ClientError::GatewayUnavailable(ref r) if r.contains("script blocked")));
  assert!(gateway.opened().is_empty());

  let client = client_with(backend);
  let pending_gateway = MockGateway::succeeding("unused");
  let mut pending = CheckoutSession::with_readiness(
    client.checkout_deps(pending_gateway.clone()),
    entry_with(vec![cart_line(1, 10.0, 1)]),
    GatewayReadiness::fixed(GatewayStatus::Pending),
  );
  pending.load().await.unwrap();
  let err = pending.confirm().await.unwrap_err();
  assert!(matches!(err, ClientError::GatewayUnavailable(ref r) if r.contains("still loading")));
  assert!(pending_gateway.opened().is_empty());
}

#[tokio::test]
#[serial]
async fn cart_is_fetched_when_not_supplied() {
  setup_tracing();
  let backend = MockBackend::new();
  backend.on(
    "GET",
    CART_DETAILS_PATH,
    json!({ "data": [{ "cart_details_id": 11, "item_name": "Lipid Profile", "price": "0" }] }),
  );
  let mut entry = entry_with(Vec::new());
  entry.items = None;

  let (_client, session) = ready_session(backend.clone(), MockGateway::succeeding("x"), entry).await;

  assert_eq!(session.state(), &CheckoutState::ReadyWithItems);
  assert_eq!(session.items()[0].item_name, "Lipid Profile");
  let fetches = backend.calls_to("GET", CART_DETAILS_PATH);
  assert_eq!(
    fetches[0].query,
    vec![
      ("employeeRefId".to_string(), "EMP-1".to_string()),
      ("cartUniqueId".to_string(), "CART-1".to_string())
    ]
  );
}

#[tokio::test]
#[serial]
async fn missing_identifiers_skip_the_fetch() {
  setup_tracing();
  let backend = MockBackend::new();
  let entry = CheckoutEntry {
    employee_ref_id: Some("EMP-1".to_string()),
    ..Default::default()
  };
  let (_client, mut session) = ready_session(backend.clone(), MockGateway::succeeding("x"), entry).await;

  assert_eq!(session.state(), &CheckoutState::EmptyCart);
  assert!(backend.calls().is_empty());
  assert!(matches!(session.confirm().await, Err(ClientError::Validation(_))));
}

#[tokio::test]
#[serial]
async fn fetch_failures_collapse_to_fetch_failed() {
  setup_tracing();
  let backend = MockBackend::new();
  backend.once("GET", CART_DETAILS_PATH, Err(ClientError::Transport("connection reset".to_string())));

  let client = client_with(backend);
  let mut entry = entry_with(Vec::new());
  entry.items = None;
  let mut session = client.checkout(MockGateway::succeeding("x"), entry);

  let err = session.load().await.unwrap_err();
  assert!(matches!(err, ClientError::FetchFailed(_)));
  assert_eq!(session.state(), &CheckoutState::EmptyCart);
  assert_eq!(err.user_message(), "Something went wrong. Please try again.");
}

#[tokio::test]
#[serial]
async fn storage_failure_after_payment_still_reaches_the_receipt() {
  setup_tracing();
  let backend = MockBackend::new();
  backend.on("POST", STATUS_UPDATE_PATH, status_ok("APT-3"));
  let gateway = MockGateway::succeeding("pay_777");
  let client = carepath::CareClient::with_parts(test_config(), backend.clone(), Arc::new(FullDiskStore));

  let mut session = client.checkout(gateway.clone(), entry_with(vec![cart_line(1, 120.0, 1)]));
  session.load().await.unwrap();
  session.gateway_settled().await;

  let Navigation::Receipt(receipt) = session.confirm().await.unwrap();

  assert_eq!(receipt.payment_id.as_deref(), Some("pay_777"));
  assert!(receipt.report.is_complete());
  assert!(receipt.local_cart_error.as_deref().unwrap().contains("disk full"));
  assert_eq!(session.state(), &CheckoutState::Success { receipt_id: receipt.receipt_id });
  assert_eq!(gateway.opened().len(), 1);
  assert_eq!(backend.calls_to("POST", STATUS_UPDATE_PATH).len(), 1);
}

#[tokio::test]
#[serial]
async fn settled_falls_back_to_last_status_when_loader_is_gone() {
  setup_tracing();
  assert_eq!(GatewayReadiness::fixed(GatewayStatus::Pending).settled().await, GatewayStatus::Pending);
  assert_eq!(GatewayReadiness::fixed(GatewayStatus::Ready).settled().await, GatewayStatus::Ready);
}
