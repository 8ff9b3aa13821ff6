// carepath/src/services/cart_details.rs

use crate::errors::{ClientError, Result};
use crate::models::{CartItemDetails, CartStatusResponse};
use crate::normalize::{extract_list, rejection_message};
use crate::services::backend::Backend;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument};

pub const CART_DETAILS_PATH: &str = "/api/appointments/cart/";
pub const STATUS_UPDATE_PATH: &str = "/CRMCustomerCartStatustUpdation";

/// Fetches appointment carts and confirms individual bookings.
#[derive(Clone)]
pub struct CartDetailService {
  backend: Arc<dyn Backend>,
}

impl CartDetailService {
  pub fn new(backend: Arc<dyn Backend>) -> Self {
    Self { backend }
  }

  /// Both identifiers are expected to be present; callers skip the fetch
  /// otherwise. Any transport, status or decode problem is logged and reported
  /// as `FetchFailed`.
  #[instrument(skip(self))]
  pub async fn fetch(&self, employee_ref_id: &str, cart_unique_id: &str) -> Result<Vec<CartItemDetails>> {
    let query = [
      ("employeeRefId", employee_ref_id.to_string()),
      ("cartUniqueId", cart_unique_id.to_string()),
    ];
    let body = self.backend.get(CART_DETAILS_PATH, &query).await.map_err(|e| {
      error!(error = %e, "Failed to fetch cart details.");
      ClientError::FetchFailed("Failed to fetch cart details".to_string())
    })?;

    let items: Vec<CartItemDetails> = extract_list(&body).iter().map(CartItemDetails::from_raw).collect();
    info!(count = items.len(), "Cart details normalized.");
    Ok(items)
  }

  /// Submits the booking-status update for one cart line.
  #[instrument(skip(self, item), fields(cart_details_id = item.cart_details_id))]
  pub async fn confirm_item(&self, item: &CartItemDetails, case_type: &str) -> Result<CartStatusResponse> {
    use crate::models::cart_item::fields::{DC_SELECTION, STM_ID};

    let payload = json!({
      "CaseLeadId": item.case_ref_id,
      "CaseType": case_type,
      "CartUniqueId": item.cart_unique_id,
      "CartDetailsId": item.cart_details_id,
      "STMId": item.extra_text(&STM_ID),
      "CollectionDate": item.collection_date(),
      "DCSelection": item.extra_text(&DC_SELECTION),
    });
    let body = self.backend.post(STATUS_UPDATE_PATH, &payload).await?;
    if let Some(message) = rejection_message(&body) {
      return Err(ClientError::Rejected(message));
    }
    Ok(CartStatusResponse::from_raw(&body))
  }
}
