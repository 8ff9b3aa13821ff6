// carepath/src/services/pharmacy.rs

//! Pharmacy catalog, cart and order operations.
//!
//! The server cart is authoritative. Every mutating call is followed by a
//! fresh `GET` of the cart, and that result replaces the local mirror. There
//! is no optimistic update.

use crate::errors::{ClientError, Result};
use crate::models::{
  Attachment, CartSummary, CheckoutOverview, Coupon, DeliveryEstimate, MedicineFilter, NewCoupon, OrderAttempt,
  OrderConfirmation, OrderRequest, PharmacyAddress, PharmacyCategory, PharmacyMedicine, PrescriptionUpload,
};
use crate::normalize::{extract_list, extract_object, rejection_message};
use crate::services::backend::{Backend, MultipartForm};
use crate::services::events::{CartEvent, CartEvents};
use crate::services::mirror::CartMirror;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const BASE: &str = "/api/pharmacy";

fn path(suffix: &str) -> String {
  format!("{}/{}", BASE, suffix)
}

fn accepted(body: Value) -> Result<Value> {
  match rejection_message(&body) {
    Some(message) => {
      warn!(message = %message, "Pharmacy request rejected.");
      Err(ClientError::Rejected(message))
    }
    None => Ok(body),
  }
}

#[derive(Clone)]
pub struct PharmacyService {
  backend: Arc<dyn Backend>,
  mirror: CartMirror,
  events: CartEvents,
}

impl PharmacyService {
  pub fn new(backend: Arc<dyn Backend>, mirror: CartMirror, events: CartEvents) -> Self {
    Self { backend, mirror, events }
  }

  // --- Catalog ---

  #[instrument(skip(self))]
  pub async fn categories(&self) -> Result<Vec<PharmacyCategory>> {
    let body = self.backend.get(&path("categories"), &[]).await?;
    Ok(extract_list(&body).iter().map(PharmacyCategory::from_raw).collect())
  }

  #[instrument(skip(self))]
  pub async fn medicines(&self, category_id: Option<i64>, search: Option<&str>) -> Result<Vec<PharmacyMedicine>> {
    let filter = MedicineFilter {
      category_id,
      search: search.map(str::to_string),
      ..Default::default()
    };
    let body = self.backend.get(&path("medicines"), &filter.to_query()).await?;
    Ok(extract_list(&body).iter().map(PharmacyMedicine::from_raw).collect())
  }

  #[instrument(skip(self))]
  pub async fn filter_medicines(&self, filter: &MedicineFilter) -> Result<Vec<PharmacyMedicine>> {
    let body = self.backend.get(&path("medicines/filter"), &filter.to_query()).await?;
    Ok(extract_list(&body).iter().map(PharmacyMedicine::from_raw).collect())
  }

  // --- Cart ---

  /// Fetches the server cart and overwrites the mirror with it.
  #[instrument(skip(self))]
  pub async fn cart(&self) -> Result<CartSummary> {
    let body = self.backend.get(&path("cart"), &[]).await?;
    let cart = CartSummary::from_raw(&body);
    self.mirror.replace_pharmacy_cart(&cart).await?;
    self.events.publish(CartEvent::PharmacyCartRefreshed {
      item_count: cart.item_count(),
    });
    Ok(cart)
  }

  /// The last mirrored cart, for rendering before the network answers.
  pub async fn cached_cart(&self) -> Result<Option<CartSummary>> {
    self.mirror.pharmacy_cart().await
  }

  async fn mutate(&self, suffix: &str, body: Value) -> Result<CartSummary> {
    accepted(self.backend.post(&path(suffix), &body).await?)?;
    self.cart().await
  }

  #[instrument(skip(self))]
  pub async fn add_to_cart(&self, medicine_id: i64, quantity: i64) -> Result<CartSummary> {
    if quantity < 1 {
      return Err(ClientError::Validation("Quantity must be at least 1.".to_string()));
    }
    self
      .mutate("cart/add", json!({ "medicine_id": medicine_id, "quantity": quantity }))
      .await
  }

  #[instrument(skip(self))]
  pub async fn remove_item(&self, item_id: i64) -> Result<CartSummary> {
    accepted(self.backend.delete(&path(&format!("cart/item/{}/remove", item_id))).await?)?;
    self.cart().await
  }

  #[instrument(skip(self))]
  pub async fn increase(&self, item_id: i64) -> Result<CartSummary> {
    self.mutate("cart/increase", json!({ "item_id": item_id })).await
  }

  #[instrument(skip(self))]
  pub async fn decrease(&self, item_id: i64) -> Result<CartSummary> {
    self.mutate("cart/decrease", json!({ "item_id": item_id })).await
  }

  // --- Coupons ---

  #[instrument(skip(self))]
  pub async fn coupons(&self) -> Result<Vec<Coupon>> {
    let body = self.backend.get(&path("coupons"), &[]).await?;
    Ok(extract_list(&body).iter().map(Coupon::from_raw).collect())
  }

  #[instrument(skip(self))]
  pub async fn apply_coupon(&self, code: &str) -> Result<CartSummary> {
    let code = code.trim();
    if code.is_empty() {
      return Err(ClientError::Validation("Enter a coupon code.".to_string()));
    }
    let cart = self.mutate("cart/coupon/apply", json!({ "coupon_code": code })).await?;
    info!(coupon = %code, discount = cart.discount_amount, "Coupon applied.");
    Ok(cart)
  }

  #[instrument(skip(self))]
  pub async fn remove_coupon(&self) -> Result<CartSummary> {
    self.mutate("cart/coupon/remove", json!({})).await
  }

  #[instrument(skip(self, coupon), fields(code = %coupon.code))]
  pub async fn create_coupon(&self, coupon: NewCoupon) -> Result<Coupon> {
    if coupon.code.trim().is_empty() {
      return Err(ClientError::Validation("Coupon code is required.".to_string()));
    }
    let mut form = MultipartForm::new()
      .text("code", coupon.code.trim())
      .text("description", coupon.description)
      .text("discount_value", coupon.discount_value.to_string())
      .text("min_order_amount", coupon.min_order_amount.to_string());
    if let Some(valid_till) = coupon.valid_till {
      form = form.text("valid_till", valid_till);
    }
    if let Some(document) = coupon.document {
      form = form.file("document", document);
    }
    let body = accepted(self.backend.post_multipart(&path("coupons"), form).await?)?;
    Ok(Coupon::from_raw(extract_object(&body)))
  }

  // --- Addresses and delivery ---

  #[instrument(skip(self))]
  pub async fn addresses(&self) -> Result<Vec<PharmacyAddress>> {
    let body = self.backend.get(&path("cart/addresses"), &[]).await?;
    Ok(extract_list(&body).iter().map(PharmacyAddress::from_raw).collect())
  }

  #[instrument(skip(self))]
  pub async fn select_address(&self, address_id: i64) -> Result<CartSummary> {
    self
      .mutate("cart/addresses/select", json!({ "address_id": address_id }))
      .await
  }

  #[instrument(skip(self))]
  pub async fn delivery_estimate(&self, pincode: Option<&str>) -> Result<DeliveryEstimate> {
    let query: Vec<(&str, String)> = pincode.map(|p| ("pincode", p.to_string())).into_iter().collect();
    let body = self.backend.get(&path("cart/delivery/estimate"), &query).await?;
    Ok(DeliveryEstimate::from_raw(&body))
  }

  #[instrument(skip(self))]
  pub async fn set_delivery_mode(&self, mode: &str) -> Result<CartSummary> {
    self.mutate("cart/delivery_mode", json!({ "delivery_mode": mode })).await
  }

  // --- Order ---

  /// Cart and address list, fetched concurrently.
  #[instrument(skip(self))]
  pub async fn checkout_overview(&self) -> Result<CheckoutOverview> {
    let (cart, addresses) = futures_util::try_join!(self.cart(), self.addresses())?;
    Ok(CheckoutOverview { cart, addresses })
  }

  /// Places the order against the server-selected address. Without one,
  /// nothing is submitted and the caller gets the address list to prompt with.
  #[instrument(skip(self, request), fields(payment_method = %request.payment_method))]
  pub async fn place_order(&self, request: &OrderRequest) -> Result<OrderAttempt> {
    let overview = self.checkout_overview().await?;
    if overview.cart.items.is_empty() {
      return Err(ClientError::Validation("Your cart is empty.".to_string()));
    }
    let Some(address_id) = overview.selected_address() else {
      info!("No delivery address selected; prompting for one.");
      return Ok(OrderAttempt::AddressSelectionRequired {
        addresses: overview.addresses,
      });
    };

    let body = accepted(
      self
        .backend
        .post(
          &path("cart/order/create"),
          &json!({
            "address_id": address_id,
            "payment_method": request.payment_method,
            "notes": request.notes,
          }),
        )
        .await?,
    )?;
    let confirmation = OrderConfirmation::from_raw(&body);
    info!(order_id = %confirmation.order_id, "Pharmacy order placed.");

    let cart = self.cart().await?;
    Ok(OrderAttempt::Placed { confirmation, cart })
  }

  #[instrument(skip(self, file), fields(file_name = %file.file_name))]
  pub async fn upload_prescription(&self, file: Attachment) -> Result<PrescriptionUpload> {
    if file.bytes.is_empty() {
      return Err(ClientError::Validation("The prescription file is empty.".to_string()));
    }
    let form = MultipartForm::new().file("prescription", file);
    let body = accepted(self.backend.post_multipart(&path("cart/prescription/upload"), form).await?)?;
    let upload = PrescriptionUpload::from_raw(&body);
    self.cart().await?;
    Ok(upload)
  }
}
