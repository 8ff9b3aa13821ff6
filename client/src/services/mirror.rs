// carepath/src/services/mirror.rs

//! Local persisted copies of server state.
//!
//! The mirror is a read-through cache. Every write replaces the stored value
//! wholesale; nothing is merged.

use crate::errors::Result;
use crate::models::{CartItemDetails, CartSummary};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const PHARMACY_CART_KEY: &str = "pharmacy_cart";
pub const EMPLOYEE_REF_KEY: &str = "employee_ref_id";

pub fn employee_cart_key(employee_ref_id: &str) -> String {
  format!("cart_{}", employee_ref_id)
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
  async fn load(&self, key: &str) -> Result<Option<String>>;
  async fn save(&self, key: &str, value: String) -> Result<()>;
  async fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
  async fn load(&self, key: &str) -> Result<Option<String>> {
    Ok(self.entries.lock().get(key).cloned())
  }

  async fn save(&self, key: &str, value: String) -> Result<()> {
    self.entries.lock().insert(key.to_string(), value);
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<()> {
    self.entries.lock().remove(key);
    Ok(())
  }
}

/// One JSON file per key under a directory. Writes go to a temporary file that
/// is then renamed over the old one.
#[derive(Debug, Clone)]
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  fn path_for(&self, key: &str) -> PathBuf {
    let safe: String = key
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
      .collect();
    self.dir.join(format!("{}.json", safe))
  }
}

#[async_trait]
impl KeyValueStore for FileStore {
  async fn load(&self, key: &str) -> Result<Option<String>> {
    match tokio::fs::read_to_string(self.path_for(key)).await {
      Ok(contents) => Ok(Some(contents)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  async fn save(&self, key: &str, value: String) -> Result<()> {
    tokio::fs::create_dir_all(&self.dir).await?;
    let path = self.path_for(key);
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, value).await?;
    tokio::fs::rename(&tmp, &path).await?;
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<()> {
    match tokio::fs::remove_file(self.path_for(key)).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

/// Typed view over the store for the two cart mirrors and the stored
/// employee reference.
#[derive(Clone)]
pub struct CartMirror {
  store: Arc<dyn KeyValueStore>,
}

impl CartMirror {
  pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
    Self { store }
  }

  pub fn in_memory() -> Self {
    Self::new(Arc::new(MemoryStore::new()))
  }

  pub fn store(&self) -> &Arc<dyn KeyValueStore> {
    &self.store
  }

  #[instrument(skip(self, cart), fields(items = cart.items.len()))]
  pub async fn replace_pharmacy_cart(&self, cart: &CartSummary) -> Result<()> {
    let encoded = serde_json::to_string(cart)?;
    self.store.save(PHARMACY_CART_KEY, encoded).await?;
    debug!("Pharmacy cart mirror replaced.");
    Ok(())
  }

  /// A missing or unreadable mirror is `None`; a corrupt entry is logged and
  /// treated as absent.
  pub async fn pharmacy_cart(&self) -> Result<Option<CartSummary>> {
    let Some(raw) = self.store.load(PHARMACY_CART_KEY).await? else {
      return Ok(None);
    };
    match serde_json::from_str(&raw) {
      Ok(cart) => Ok(Some(cart)),
      Err(e) => {
        warn!(error = %e, "Discarding unreadable pharmacy cart mirror.");
        Ok(None)
      }
    }
  }

  pub async fn employee_ref_id(&self) -> Result<Option<String>> {
    Ok(
      self
        .store
        .load(EMPLOYEE_REF_KEY)
        .await?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()),
    )
  }

  pub async fn set_employee_ref_id(&self, employee_ref_id: &str) -> Result<()> {
    self.store.save(EMPLOYEE_REF_KEY, employee_ref_id.to_string()).await
  }

  pub async fn employee_cart(&self, employee_ref_id: &str) -> Result<Vec<CartItemDetails>> {
    let Some(raw) = self.store.load(&employee_cart_key(employee_ref_id)).await? else {
      return Ok(Vec::new());
    };
    match serde_json::from_str(&raw) {
      Ok(items) => Ok(items),
      Err(e) => {
        warn!(employee_ref_id, error = %e, "Discarding unreadable employee cart mirror.");
        Ok(Vec::new())
      }
    }
  }

  pub async fn replace_employee_cart(&self, employee_ref_id: &str, items: &[CartItemDetails]) -> Result<()> {
    let encoded = serde_json::to_string(items)?;
    self.store.save(&employee_cart_key(employee_ref_id), encoded).await
  }

  /// Drops the given cart lines from the employee's mirror and returns what
  /// remains.
  #[instrument(skip(self, purchased), fields(purchased = purchased.len()))]
  pub async fn remove_purchased(
    &self,
    employee_ref_id: &str,
    purchased: &HashSet<i64>,
  ) -> Result<Vec<CartItemDetails>> {
    let remaining: Vec<CartItemDetails> = self
      .employee_cart(employee_ref_id)
      .await?
      .into_iter()
      .filter(|item| !purchased.contains(&item.cart_details_id))
      .collect();
    self.replace_employee_cart(employee_ref_id, &remaining).await?;
    debug!(remaining = remaining.len(), "Purchased lines removed from employee cart mirror.");
    Ok(remaining)
  }
}
