// carepath/src/models/pharmacy.rs

use crate::normalize::{extract_list, extract_object, FieldRule};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ID: FieldRule = FieldRule::new("id", &["id", "Id", "ID"]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyCategory {
  pub id: i64,
  pub name: String,
  pub image_url: Option<String>,
}

impl PharmacyCategory {
  const ID: FieldRule = FieldRule::new("id", &["id", "category_id"]);
  const NAME: FieldRule = FieldRule::new("name", &["name", "category_name", "title"]);
  const IMAGE: FieldRule = FieldRule::new("image_url", &["image_url", "image", "icon"]);

  pub fn from_raw(raw: &Value) -> Self {
    Self {
      id: Self::ID.integer(raw).unwrap_or(0),
      name: Self::NAME.text_or_default(raw),
      image_url: Self::IMAGE.text(raw),
    }
  }
}

/// Catalog entry. Prices and stock arrive as strings more often than not and
/// are parsed here, `0` when unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyMedicine {
  pub id: i64,
  pub name: String,
  pub category_id: Option<i64>,
  pub manufacturer: Option<String>,
  pub price: f64,
  pub mrp: f64,
  pub discount: f64,
  pub stock: i64,
  pub requires_prescription: bool,
  pub image_url: Option<String>,
}

impl PharmacyMedicine {
  const ID: FieldRule = FieldRule::new("id", &["id", "medicine_id"]);
  const NAME: FieldRule = FieldRule::new("name", &["name", "medicine_name", "title"]);
  const CATEGORY: FieldRule = FieldRule::new("category_id", &["category_id", "category.id", "category"]);
  const MANUFACTURER: FieldRule =
    FieldRule::new("manufacturer", &["manufacturer", "manufacturer_name", "brand", "company"]);
  const PRICE: FieldRule = FieldRule::new("price", &["price", "selling_price", "sale_price", "final_price"]);
  const MRP: FieldRule = FieldRule::new("mrp", &["mrp", "MRP", "max_retail_price"]);
  const DISCOUNT: FieldRule =
    FieldRule::new("discount", &["discount", "discount_percent", "discount_percentage"]);
  const STOCK: FieldRule = FieldRule::new("stock", &["stock", "stock_quantity", "available_quantity"]);
  const PRESCRIPTION: FieldRule = FieldRule::new(
    "requires_prescription",
    &["requires_prescription", "prescription_required", "is_prescription_required", "rx_required"],
  );
  const IMAGE: FieldRule = FieldRule::new("image_url", &["image_url", "image", "thumbnail"]);

  pub fn from_raw(raw: &Value) -> Self {
    Self {
      id: Self::ID.integer(raw).unwrap_or(0),
      name: Self::NAME.text_or_default(raw),
      category_id: Self::CATEGORY.integer(raw),
      manufacturer: Self::MANUFACTURER.text(raw),
      price: Self::PRICE.money(raw),
      mrp: Self::MRP.money(raw),
      discount: Self::DISCOUNT.money(raw),
      stock: Self::STOCK.integer(raw).unwrap_or(0),
      requires_prescription: Self::PRESCRIPTION.flag(raw).unwrap_or(false),
      image_url: Self::IMAGE.text(raw),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
  pub item_id: i64,
  pub medicine_id: i64,
  pub name: String,
  pub quantity: i64,
  pub unit_price: f64,
  pub mrp: f64,
  pub line_total: f64,
  pub requires_prescription: bool,
}

impl CartItem {
  const ITEM_ID: FieldRule = FieldRule::new("item_id", &["item_id", "cart_item_id", "id"]);
  const MEDICINE_ID: FieldRule = FieldRule::new("medicine_id", &["medicine_id", "medicine.id", "product_id"]);
  const NAME: FieldRule = FieldRule::new("name", &["name", "medicine_name", "medicine.name"]);
  const QUANTITY: FieldRule = FieldRule::new("quantity", &["quantity", "qty"]);
  const UNIT_PRICE: FieldRule =
    FieldRule::new("unit_price", &["unit_price", "price", "selling_price", "medicine.price"]);
  const MRP: FieldRule = FieldRule::new("mrp", &["mrp", "MRP", "medicine.mrp"]);
  const LINE_TOTAL: FieldRule = FieldRule::new("line_total", &["line_total", "total_price", "subtotal", "total"]);
  const PRESCRIPTION: FieldRule = FieldRule::new(
    "requires_prescription",
    &["requires_prescription", "prescription_required", "medicine.requires_prescription"],
  );

  pub fn from_raw(raw: &Value) -> Self {
    Self {
      item_id: Self::ITEM_ID.integer(raw).unwrap_or(0),
      medicine_id: Self::MEDICINE_ID.integer(raw).unwrap_or(0),
      name: Self::NAME.text_or_default(raw),
      quantity: Self::QUANTITY.integer(raw).unwrap_or(0),
      unit_price: Self::UNIT_PRICE.money(raw),
      mrp: Self::MRP.money(raw),
      line_total: Self::LINE_TOTAL.money(raw),
      requires_prescription: Self::PRESCRIPTION.flag(raw).unwrap_or(false),
    }
  }
}

/// Server-computed pharmacy cart. `final_amount` is displayed as returned and
/// never recomputed locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
  pub items: Vec<CartItem>,
  pub total_amount: f64,
  pub discount_amount: f64,
  pub final_amount: f64,
  pub delivery_charges: f64,
  pub coupon_code: Option<String>,
  pub selected_address_id: Option<i64>,
  pub delivery_mode: Option<String>,
}

impl CartSummary {
  const TOTAL: FieldRule = FieldRule::new("total_amount", &["total_amount", "subtotal", "total"]);
  const DISCOUNT: FieldRule =
    FieldRule::new("discount_amount", &["discount_amount", "coupon_discount", "discount"]);
  const FINAL: FieldRule =
    FieldRule::new("final_amount", &["final_amount", "grand_total", "payable_amount", "net_amount"]);
  const DELIVERY: FieldRule = FieldRule::new(
    "delivery_charges",
    &["delivery_charges", "delivery_charge", "shipping_charges"],
  );
  const COUPON: FieldRule = FieldRule::new("coupon_code", &["coupon_code", "applied_coupon", "coupon.code"]);
  const ADDRESS: FieldRule = FieldRule::new(
    "selected_address_id",
    &["selected_address_id", "address_id", "selected_address.id", "address.id"],
  );
  const DELIVERY_MODE: FieldRule = FieldRule::new("delivery_mode", &["delivery_mode", "deliveryMode"]);

  /// Accepts the cart bare, wrapped in `{data: ...}`, or as `{cart: ...}`.
  pub fn from_raw(body: &Value) -> Self {
    let outer = extract_object(body);
    let raw = match outer.get("cart") {
      Some(cart @ Value::Object(_)) => cart,
      _ => outer,
    };
    let items = match raw.get("cart_items") {
      Some(Value::Array(list)) => list.as_slice(),
      _ => extract_list(raw),
    };
    Self {
      items: items.iter().map(CartItem::from_raw).collect(),
      total_amount: Self::TOTAL.money(raw),
      discount_amount: Self::DISCOUNT.money(raw),
      final_amount: Self::FINAL.money(raw),
      delivery_charges: Self::DELIVERY.money(raw),
      coupon_code: Self::COUPON.text(raw),
      selected_address_id: Self::ADDRESS.integer(raw),
      delivery_mode: Self::DELIVERY_MODE.text(raw),
    }
  }

  pub fn item_count(&self) -> usize {
    self.items.len()
  }

  pub fn needs_prescription(&self) -> bool {
    self.items.iter().any(|i| i.requires_prescription)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PharmacyAddress {
  pub id: i64,
  pub label: Option<String>,
  pub line1: String,
  pub line2: Option<String>,
  pub city: String,
  pub state: Option<String>,
  pub pincode: String,
  pub is_selected: bool,
}

impl PharmacyAddress {
  const LABEL: FieldRule = FieldRule::new("label", &["label", "address_type", "name"]);
  const LINE1: FieldRule = FieldRule::new("line1", &["line1", "address_line1", "address_line_1", "address"]);
  const LINE2: FieldRule = FieldRule::new("line2", &["line2", "address_line2", "address_line_2", "landmark"]);
  const CITY: FieldRule = FieldRule::new("city", &["city", "city_name", "city.name"]);
  const STATE: FieldRule = FieldRule::new("state", &["state", "state_name", "state.name"]);
  const PINCODE: FieldRule = FieldRule::new("pincode", &["pincode", "pin_code", "zip", "postal_code"]);
  const SELECTED: FieldRule = FieldRule::new("is_selected", &["is_selected", "selected"]);

  pub fn from_raw(raw: &Value) -> Self {
    Self {
      id: ID.integer(raw).unwrap_or(0),
      label: Self::LABEL.text(raw),
      line1: Self::LINE1.text_or_default(raw),
      line2: Self::LINE2.text(raw),
      city: Self::CITY.text_or_default(raw),
      state: Self::STATE.text(raw),
      pincode: Self::PINCODE.text_or_default(raw),
      is_selected: Self::SELECTED.flag(raw).unwrap_or(false),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
  pub code: String,
  pub description: Option<String>,
  pub discount_value: f64,
  pub min_order_amount: f64,
  pub valid_till: Option<String>,
}

impl Coupon {
  const CODE: FieldRule = FieldRule::new("code", &["code", "coupon_code"]);
  const DESCRIPTION: FieldRule = FieldRule::new("description", &["description", "title", "details"]);
  const VALUE: FieldRule = FieldRule::new(
    "discount_value",
    &["discount_value", "discount_amount", "discount", "value"],
  );
  const MIN_ORDER: FieldRule = FieldRule::new(
    "min_order_amount",
    &["min_order_amount", "minimum_order_value", "min_order_value", "min_amount"],
  );
  const VALID_TILL: FieldRule = FieldRule::new("valid_till", &["valid_till", "valid_to", "expiry_date", "expires_at"]);

  pub fn from_raw(raw: &Value) -> Self {
    Self {
      code: Self::CODE.text_or_default(raw),
      description: Self::DESCRIPTION.text(raw),
      discount_value: Self::VALUE.money(raw),
      min_order_amount: Self::MIN_ORDER.money(raw),
      valid_till: Self::VALID_TILL.text(raw),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEstimate {
  pub delivery_charges: f64,
  pub estimated_days: Option<i64>,
  pub estimated_date: Option<String>,
  pub serviceable: bool,
}

impl DeliveryEstimate {
  const CHARGES: FieldRule = FieldRule::new(
    "delivery_charges",
    &["delivery_charges", "delivery_charge", "charges", "shipping_charges"],
  );
  const DAYS: FieldRule = FieldRule::new("estimated_days", &["estimated_days", "days", "delivery_days"]);
  const DATE: FieldRule = FieldRule::new(
    "estimated_date",
    &["estimated_date", "estimated_delivery_date", "delivery_date"],
  );
  const SERVICEABLE: FieldRule = FieldRule::new("serviceable", &["serviceable", "is_serviceable", "available"]);

  pub fn from_raw(body: &Value) -> Self {
    let raw = extract_object(body);
    Self {
      delivery_charges: Self::CHARGES.money(raw),
      estimated_days: Self::DAYS.integer(raw),
      estimated_date: Self::DATE.text(raw),
      serviceable: Self::SERVICEABLE.flag(raw).unwrap_or(true),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
  pub order_id: String,
  pub status: Option<String>,
  pub final_amount: f64,
  pub message: Option<String>,
}

impl OrderConfirmation {
  const ORDER_ID: FieldRule = FieldRule::new("order_id", &["order_id", "order_number", "order.id", "id"]);
  const STATUS: FieldRule = FieldRule::new("status", &["order_status", "status", "order.status"]);
  const AMOUNT: FieldRule = FieldRule::new("final_amount", &["final_amount", "amount", "order.final_amount"]);
  const MESSAGE: FieldRule = FieldRule::new("message", &["message", "detail"]);

  pub fn from_raw(body: &Value) -> Self {
    let raw = extract_object(body);
    Self {
      order_id: Self::ORDER_ID.text(raw).or_else(|| Self::ORDER_ID.text(body)).unwrap_or_default(),
      status: Self::STATUS.text(raw),
      final_amount: Self::AMOUNT.money(raw),
      message: Self::MESSAGE.text(body),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionUpload {
  pub id: Option<i64>,
  pub file_url: Option<String>,
  pub status: Option<String>,
}

impl PrescriptionUpload {
  const ID: FieldRule = FieldRule::new("id", &["id", "prescription_id"]);
  const URL: FieldRule = FieldRule::new("file_url", &["file_url", "url", "file", "prescription_url"]);
  const STATUS: FieldRule = FieldRule::new("status", &["status", "verification_status"]);

  pub fn from_raw(body: &Value) -> Self {
    let raw = extract_object(body);
    Self {
      id: Self::ID.integer(raw),
      file_url: Self::URL.text(raw),
      status: Self::STATUS.text(raw),
    }
  }
}

/// Query for the filtered medicine listing. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MedicineFilter {
  pub category_id: Option<i64>,
  pub search: Option<String>,
  pub min_price: Option<f64>,
  pub max_price: Option<f64>,
  pub requires_prescription: Option<bool>,
  pub sort_by: Option<String>,
}

impl MedicineFilter {
  pub fn to_query(&self) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(v) = self.category_id {
      query.push(("category_id", v.to_string()));
    }
    if let Some(v) = self.search.as_ref().filter(|s| !s.trim().is_empty()) {
      query.push(("search", v.trim().to_string()));
    }
    if let Some(v) = self.min_price {
      query.push(("min_price", v.to_string()));
    }
    if let Some(v) = self.max_price {
      query.push(("max_price", v.to_string()));
    }
    if let Some(v) = self.requires_prescription {
      query.push(("requires_prescription", v.to_string()));
    }
    if let Some(v) = &self.sort_by {
      query.push(("sort_by", v.clone()));
    }
    query
  }
}

/// A file sent as one part of a multipart request.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
  pub file_name: String,
  pub mime_type: String,
  pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
  pub code: String,
  pub description: String,
  pub discount_value: f64,
  pub min_order_amount: f64,
  pub valid_till: Option<String>,
  pub document: Option<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderRequest {
  pub payment_method: String,
  pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOverview {
  pub cart: CartSummary,
  pub addresses: Vec<PharmacyAddress>,
}

impl CheckoutOverview {
  /// The server-side selection, as reported by the cart or by the address list.
  pub fn selected_address(&self) -> Option<i64> {
    self
      .cart
      .selected_address_id
      .or_else(|| self.addresses.iter().find(|a| a.is_selected).map(|a| a.id))
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderAttempt {
  Placed {
    confirmation: OrderConfirmation,
    cart: CartSummary,
  },
  /// No address is selected server-side; nothing was submitted.
  AddressSelectionRequired { addresses: Vec<PharmacyAddress> },
}
