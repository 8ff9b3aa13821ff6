// carepath/src/state.rs

use crate::checkout::{CheckoutEntry, CheckoutSession};
use crate::config::ClientConfig;
use crate::errors::Result;
use crate::models::RELATIONSHIPS;
use crate::pipelines::contexts::CheckoutDeps;
use crate::services::backend::{Backend, HttpBackend};
use crate::services::cart_details::CartDetailService;
use crate::services::dependants::DependantService;
use crate::services::events::CartEvents;
use crate::services::mirror::{CartMirror, FileStore, KeyValueStore, MemoryStore};
use crate::services::payment_gateway::PaymentGateway;
use crate::services::pharmacy::PharmacyService;
use std::sync::Arc;

/// Shared handles for one signed-in session. Cloning shares the backend,
/// mirror and event channel.
#[derive(Clone)]
pub struct CareClient {
  pub config: Arc<ClientConfig>,
  pub backend: Arc<dyn Backend>,
  pub mirror: CartMirror,
  pub events: CartEvents,
}

impl CareClient {
  /// HTTP backend plus a file-backed mirror when `mirror_path` is set.
  pub fn from_config(config: ClientConfig) -> Result<Self> {
    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config)?);
    let store: Arc<dyn KeyValueStore> = match &config.mirror_path {
      Some(dir) => Arc::new(FileStore::new(dir.clone())),
      None => Arc::new(MemoryStore::new()),
    };
    Ok(Self::with_parts(config, backend, store))
  }

  pub fn with_parts(config: ClientConfig, backend: Arc<dyn Backend>, store: Arc<dyn KeyValueStore>) -> Self {
    Self {
      config: Arc::new(config),
      backend,
      mirror: CartMirror::new(store),
      events: CartEvents::default(),
    }
  }

  pub fn cart_details(&self) -> CartDetailService {
    CartDetailService::new(self.backend.clone())
  }

  pub fn pharmacy(&self) -> PharmacyService {
    PharmacyService::new(self.backend.clone(), self.mirror.clone(), self.events.clone())
  }

  pub fn dependants(&self) -> DependantService {
    DependantService::new(self.backend.clone(), RELATIONSHIPS)
  }

  pub fn checkout_deps(&self, gateway: Arc<dyn PaymentGateway>) -> CheckoutDeps {
    CheckoutDeps {
      config: self.config.clone(),
      backend: self.backend.clone(),
      gateway,
      mirror: self.mirror.clone(),
      events: self.events.clone(),
    }
  }

  /// Starts a checkout session; gateway loading begins immediately.
  pub fn checkout(&self, gateway: Arc<dyn PaymentGateway>, entry: CheckoutEntry) -> CheckoutSession {
    CheckoutSession::new(self.checkout_deps(gateway), entry)
  }
}
