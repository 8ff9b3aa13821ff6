// carepath/src/services/dependants.rs

use crate::errors::{ClientError, Result};
use crate::models::{City, Dependant, DependantRequest, RelationshipTable};
use crate::normalize::{extract_list, extract_object, rejection_message};
use crate::services::backend::Backend;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

const DEPENDANTS_PATH: &str = "/api/dependants/";
const CITIES_PATH: &str = "/api/location/cities/";

fn dependant_path(id: i64) -> String {
  format!("{}{}/", DEPENDANTS_PATH, id)
}

/// Family-member records for an employee. The relationship table is given at
/// construction and never changes.
#[derive(Clone)]
pub struct DependantService {
  backend: Arc<dyn Backend>,
  relationships: RelationshipTable,
}

impl DependantService {
  pub fn new(backend: Arc<dyn Backend>, relationships: RelationshipTable) -> Self {
    Self { backend, relationships }
  }

  fn normalize(&self, raw: &Value) -> Dependant {
    Dependant::from_raw(raw, &self.relationships)
  }

  #[instrument(skip(self))]
  pub async fn list(&self, employee_ref_id: &str) -> Result<Vec<Dependant>> {
    let body = self
      .backend
      .get(DEPENDANTS_PATH, &[("employee_ref_id", employee_ref_id.to_string())])
      .await?;
    let dependants: Vec<Dependant> = extract_list(&body).iter().map(|raw| self.normalize(raw)).collect();
    info!(count = dependants.len(), "Dependants loaded.");
    Ok(dependants)
  }

  #[instrument(skip(self))]
  pub async fn get(&self, id: i64) -> Result<Dependant> {
    let body = self.backend.get(&dependant_path(id), &[]).await?;
    Ok(self.normalize(extract_object(&body)))
  }

  /// Creates, or updates when the request carries a positive id. Validation
  /// runs before any request is made.
  #[instrument(skip(self, request), fields(id = ?request.id))]
  pub async fn save(&self, request: &DependantRequest) -> Result<Dependant> {
    let payload = request.validated_payload(&self.relationships)?;
    let body = match request.existing_id() {
      Some(id) => self.backend.put(&dependant_path(id), &payload).await?,
      None => self.backend.post(DEPENDANTS_PATH, &payload).await?,
    };
    if let Some(message) = rejection_message(&body) {
      warn!(message = %message, "Dependant save rejected.");
      return Err(ClientError::Rejected(message));
    }
    let saved = self.normalize(extract_object(&body));
    info!(id = saved.id, "Dependant saved.");
    Ok(saved)
  }

  #[instrument(skip(self))]
  pub async fn deactivate(&self, id: i64) -> Result<()> {
    if id <= 0 {
      return Err(ClientError::Validation("Unknown dependant.".to_string()));
    }
    let body = self.backend.delete(&dependant_path(id)).await?;
    if let Some(message) = rejection_message(&body) {
      return Err(ClientError::Rejected(message));
    }
    Ok(())
  }

  #[instrument(skip(self))]
  pub async fn cities(&self) -> Result<Vec<City>> {
    let body = self.backend.get(CITIES_PATH, &[]).await?;
    Ok(extract_list(&body).iter().map(City::from_raw).collect())
  }
}
