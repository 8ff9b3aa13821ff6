// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use carepath::models::CartItemDetails;
use carepath::{
  Backend, CareClient, ClientConfig, ClientError, KeyValueStore, MemoryStore, MultipartForm, PaymentGateway,
  PaymentOutcome, PaymentRequest, Result,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
  pub method: &'static str,
  pub path: String,
  pub query: Vec<(String, String)>,
  pub body: Option<Value>,
  pub form: Option<MultipartForm>,
}

/// Scripted backend. Queued replies are consumed first, then the route's
/// standing reply. Unknown routes answer 404.
#[derive(Default)]
pub struct MockBackend {
  queued: Mutex<HashMap<String, VecDeque<Result<Value>>>>,
  standing: Mutex<HashMap<String, Value>>,
  calls: Mutex<Vec<RecordedCall>>,
}

fn route(method: &str, path: &str) -> String {
  format!("{} {}", method, path)
}

impl MockBackend {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn on(&self, method: &str, path: &str, body: Value) -> &Self {
    self.standing.lock().insert(route(method, path), body);
    self
  }

  pub fn once(&self, method: &str, path: &str, reply: Result<Value>) -> &Self {
    self
      .queued
      .lock()
      .entry(route(method, path))
      .or_default()
      .push_back(reply);
    self
  }

  pub fn calls(&self) -> Vec<RecordedCall> {
    self.calls.lock().clone()
  }

  pub fn calls_to(&self, method: &str, path: &str) -> Vec<RecordedCall> {
    self
      .calls()
      .into_iter()
      .filter(|c| c.method == method && c.path == path)
      .collect()
  }

  fn reply(&self, call: RecordedCall) -> Result<Value> {
    let key = route(call.method, &call.path);
    self.calls.lock().push(call);
    if let Some(reply) = self.queued.lock().get_mut(&key).and_then(VecDeque::pop_front) {
      return reply;
    }
    match self.standing.lock().get(&key) {
      Some(body) => Ok(body.clone()),
      None => Err(ClientError::Status {
        status: 404,
        body: format!("no mock for {}", key),
      }),
    }
  }
}

#[async_trait]
impl Backend for MockBackend {
  async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
    self.reply(RecordedCall {
      method: "GET",
      path: path.to_string(),
      query: query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
      body: None,
      form: None,
    })
  }

  async fn post(&self, path: &str, body: &Value) -> Result<Value> {
    self.reply(RecordedCall {
      method: "POST",
      path: path.to_string(),
      query: Vec::new(),
      body: Some(body.clone()),
      form: None,
    })
  }

  async fn put(&self, path: &str, body: &Value) -> Result<Value> {
    self.reply(RecordedCall {
      method: "PUT",
      path: path.to_string(),
      query: Vec::new(),
      body: Some(body.clone()),
      form: None,
    })
  }

  async fn delete(&self, path: &str) -> Result<Value> {
    self.reply(RecordedCall {
      method: "DELETE",
      path: path.to_string(),
      query: Vec::new(),
      body: None,
      form: None,
    })
  }

  async fn post_multipart(&self, path: &str, form: MultipartForm) -> Result<Value> {
    self.reply(RecordedCall {
      method: "MULTIPART",
      path: path.to_string(),
      query: Vec::new(),
      body: None,
      form: Some(form),
    })
  }
}

/// Payment widget stand-in that records what it was opened with.
pub struct MockGateway {
  load_error: Option<String>,
  outcome: Mutex<PaymentOutcome>,
  opened: Mutex<Vec<PaymentRequest>>,
}

impl MockGateway {
  pub fn succeeding(payment_id: &str) -> Arc<Self> {
    Arc::new(Self {
      load_error: None,
      outcome: Mutex::new(PaymentOutcome::Succeeded {
        payment_id: payment_id.to_string(),
      }),
      opened: Mutex::new(Vec::new()),
    })
  }

  pub fn with_outcome(outcome: PaymentOutcome) -> Arc<Self> {
    Arc::new(Self {
      load_error: None,
      outcome: Mutex::new(outcome),
      opened: Mutex::new(Vec::new()),
    })
  }

  pub fn failing_to_load(reason: &str) -> Arc<Self> {
    Arc::new(Self {
      load_error: Some(reason.to_string()),
      outcome: Mutex::new(PaymentOutcome::Dismissed),
      opened: Mutex::new(Vec::new()),
    })
  }

  pub fn set_outcome(&self, outcome: PaymentOutcome) {
    *self.outcome.lock() = outcome;
  }

  pub fn opened(&self) -> Vec<PaymentRequest> {
    self.opened.lock().clone()
  }
}

#[async_trait]
impl PaymentGateway for MockGateway {
  async fn load(&self) -> Result<()> {
    match &self.load_error {
      Some(reason) => Err(ClientError::GatewayUnavailable(reason.clone())),
      None => Ok(()),
    }
  }

  async fn open(&self, request: PaymentRequest) -> PaymentOutcome {
    self.opened.lock().push(request);
    self.outcome.lock().clone()
  }
}

pub const PAYMENT_KEY: &str = "rzp_test_key";

pub fn test_config() -> ClientConfig {
  ClientConfig::new("http://backend.test").with_payment_key(PAYMENT_KEY)
}

pub fn client_with(backend: Arc<MockBackend>) -> CareClient {
  CareClient::with_parts(test_config(), backend, Arc::new(MemoryStore::new()))
}

/// Reads come back empty and every write fails.
#[derive(Debug, Default)]
pub struct FullDiskStore;

#[async_trait]
impl KeyValueStore for FullDiskStore {
  async fn load(&self, _key: &str) -> Result<Option<String>> {
    Ok(None)
  }

  async fn save(&self, _key: &str, _value: String) -> Result<()> {
    Err(ClientError::Storage("disk full".to_string()))
  }

  async fn remove(&self, _key: &str) -> Result<()> {
    Err(ClientError::Storage("disk full".to_string()))
  }
}

/// A normalized cart line with the given id, price and quantity.
pub fn cart_line(id: i64, amount: f64, quantity: i64) -> CartItemDetails {
  CartItemDetails::from_raw(&json!({
    "CartDetailsId": id,
    "CartUniqueId": "CART-1",
    "CaseRefId": format!("CASE-{}", id),
    "PersonName": "Asha Rao",
    "ItemName": format!("Test {}", id),
    "ItemAmount": amount,
    "Quantity": quantity,
    "AppointmentDate": "2026-11-02",
    "AppointmentTime": "09:30",
    "STMId": format!("STM-{}", id),
    "DCSelection": "DC-7",
  }))
}

pub fn status_ok(appointment_id: &str) -> Value {
  json!({
    "Message": "Booking confirmed",
    "AppointmentId": appointment_id,
    "LocalityName": "Indiranagar",
  })
}
