// carepath/src/models/cart_item.rs

use crate::normalize::{passthrough, FieldRule};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Candidate tables for `CartItemDetails`. Legacy camel-case first, then
/// snake_case, then nested paths.
pub mod fields {
  use crate::normalize::FieldRule;

  pub const CART_DETAILS_ID: FieldRule = FieldRule::new(
    "CartDetailsId",
    &["CartDetailsId", "cart_details_id", "cart_item_id", "id"],
  );
  pub const CART_UNIQUE_ID: FieldRule =
    FieldRule::new("CartUniqueId", &["CartUniqueId", "cart_unique_id", "cart.unique_id"]);
  pub const CASE_REF_ID: FieldRule = FieldRule::new(
    "CaseRefId",
    &["CaseRefId", "case_ref_id", "case_id", "appointment.case_ref_id"],
  );
  pub const PERSON_NAME: FieldRule = FieldRule::new(
    "PersonName",
    &["PersonName", "person_name", "patient_name", "beneficiary_name", "patient.name", "beneficiary.name"],
  );
  pub const RELATIONSHIP: FieldRule = FieldRule::new(
    "Relationship",
    &["Relationship", "relationship", "relation", "patient.relationship"],
  );
  pub const MOBILE_NO: FieldRule =
    FieldRule::new("MobileNo", &["MobileNo", "mobile_no", "mobile", "phone", "patient.mobile"]);
  pub const EMAIL_ID: FieldRule = FieldRule::new("Emailid", &["Emailid", "EmailId", "email_id", "email", "patient.email"]);
  pub const ITEM_NAME: FieldRule = FieldRule::new(
    "ItemName",
    &["ItemName", "item_name", "test_name", "service_name", "name", "item.name"],
  );
  pub const ITEM_AMOUNT: FieldRule = FieldRule::new(
    "ItemAmount",
    &["ItemAmount", "item_amount", "final_price", "price", "amount", "item.price"],
  );
  pub const QUANTITY: FieldRule = FieldRule::new("Quantity", &["Quantity", "quantity", "qty"]);
  pub const TOTAL_AMOUNT: FieldRule =
    FieldRule::new("TotalAmount", &["TotalAmount", "total_amount", "total_price", "total"]);
  pub const APPOINTMENT_DATE: FieldRule = FieldRule::new(
    "AppointmentDate",
    &["AppointmentDate", "appointment_date", "date", "slot.date", "appointment.date"],
  );
  pub const APPOINTMENT_TIME: FieldRule = FieldRule::new(
    "AppointmentTime",
    &["AppointmentTime", "appointment_time", "time", "slot.time", "appointment.time"],
  );
  pub const DOCTOR_NAME: FieldRule = FieldRule::new("DoctorName", &["DoctorName", "doctor_name", "doctor.name"]);
  pub const DOCTOR_SPECIALITY: FieldRule = FieldRule::new(
    "DoctorSpeciality",
    &["DoctorSpeciality", "doctor_speciality", "speciality", "doctor.speciality"],
  );
  pub const DC_ADDRESS: FieldRule = FieldRule::new(
    "DCAddress",
    &["DCAddress", "dc_address", "center_address", "diagnostic_center.address"],
  );
  pub const CENTER_NAME: FieldRule = FieldRule::new(
    "center_name",
    &["CenterName", "center_name", "dc_name", "diagnostic_center.name"],
  );

  pub const ALL: &[FieldRule] = &[
    CART_DETAILS_ID,
    CART_UNIQUE_ID,
    CASE_REF_ID,
    PERSON_NAME,
    RELATIONSHIP,
    MOBILE_NO,
    EMAIL_ID,
    ITEM_NAME,
    ITEM_AMOUNT,
    QUANTITY,
    TOTAL_AMOUNT,
    APPOINTMENT_DATE,
    APPOINTMENT_TIME,
    DOCTOR_NAME,
    DOCTOR_SPECIALITY,
    DC_ADDRESS,
    CENTER_NAME,
  ];

  // Read from pass-through fields when building a status update.
  pub const STM_ID: FieldRule = FieldRule::new("STMId", &["STMId", "stm_id", "StmId"]);
  pub const DC_SELECTION: FieldRule = FieldRule::new("DCSelection", &["DCSelection", "dc_selection", "dc_id"]);
}

/// One line of a mixed consultation/diagnostics cart.
///
/// Serialized with the backend's legacy field names. `TotalAmount` is kept as
/// received and may disagree with `ItemAmount * Quantity`; checkout always
/// recomputes from the latter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemDetails {
  #[serde(rename = "CartDetailsId")]
  pub cart_details_id: i64,
  #[serde(rename = "CartUniqueId", default)]
  pub cart_unique_id: String,
  #[serde(rename = "CaseRefId", default)]
  pub case_ref_id: String,

  #[serde(rename = "PersonName", default)]
  pub person_name: String,
  #[serde(rename = "Relationship", default)]
  pub relationship: String,
  #[serde(rename = "MobileNo", default)]
  pub mobile_no: String,
  #[serde(rename = "Emailid", default)]
  pub email_id: String,

  #[serde(rename = "ItemName", default)]
  pub item_name: String,
  #[serde(rename = "ItemAmount", default)]
  pub item_amount: f64,
  #[serde(rename = "Quantity", default = "default_quantity")]
  pub quantity: i64,
  #[serde(rename = "TotalAmount", default)]
  pub total_amount: f64,

  #[serde(rename = "AppointmentDate", default)]
  pub appointment_date: String,
  #[serde(rename = "AppointmentTime", default)]
  pub appointment_time: String,

  #[serde(rename = "DoctorName", default)]
  pub doctor_name: String,
  #[serde(rename = "DoctorSpeciality", default)]
  pub doctor_speciality: String,
  #[serde(rename = "DCAddress", default)]
  pub dc_address: String,
  #[serde(default)]
  pub center_name: String,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

fn default_quantity() -> i64 {
  1
}

impl CartItemDetails {
  pub fn from_raw(raw: &Value) -> Self {
    use fields::*;
    Self {
      cart_details_id: CART_DETAILS_ID.integer(raw).unwrap_or(0),
      cart_unique_id: CART_UNIQUE_ID.text_or_default(raw),
      case_ref_id: CASE_REF_ID.text_or_default(raw),
      person_name: PERSON_NAME.text_or_default(raw),
      relationship: RELATIONSHIP.text_or_default(raw),
      mobile_no: MOBILE_NO.text_or_default(raw),
      email_id: EMAIL_ID.text_or_default(raw),
      item_name: ITEM_NAME.text_or_default(raw),
      item_amount: ITEM_AMOUNT.money(raw),
      quantity: QUANTITY.integer(raw).unwrap_or_else(default_quantity),
      total_amount: TOTAL_AMOUNT.money(raw),
      appointment_date: APPOINTMENT_DATE.text_or_default(raw),
      appointment_time: APPOINTMENT_TIME.text_or_default(raw),
      doctor_name: DOCTOR_NAME.text_or_default(raw),
      doctor_speciality: DOCTOR_SPECIALITY.text_or_default(raw),
      dc_address: DC_ADDRESS.text_or_default(raw),
      center_name: CENTER_NAME.text_or_default(raw),
      extra: passthrough(raw, fields::ALL),
    }
  }

  /// `ItemAmount * Quantity`, the figure checkout charges for this line.
  pub fn line_amount(&self) -> f64 {
    self.item_amount * self.quantity as f64
  }

  /// Reads a field that only exists in the pass-through map.
  pub fn extra_text(&self, rule: &FieldRule) -> String {
    rule
      .text(&Value::Object(self.extra.clone()))
      .unwrap_or_default()
  }

  /// `"<date> <time>"` with blank parts dropped.
  pub fn collection_date(&self) -> String {
    [self.appointment_date.as_str(), self.appointment_time.as_str()]
      .iter()
      .filter(|s| !s.is_empty())
      .copied()
      .collect::<Vec<_>>()
      .join(" ")
  }
}

/// The backend's answer to a single booking-status update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartStatusResponse {
  #[serde(rename = "Message")]
  pub message: String,
  #[serde(rename = "AppointmentId")]
  pub appointment_id: Option<String>,
  #[serde(rename = "LocalityName")]
  pub locality_name: Option<String>,
}

impl CartStatusResponse {
  const MESSAGE: FieldRule = FieldRule::new("Message", &["Message", "message", "msg", "data.message"]);
  const APPOINTMENT_ID: FieldRule = FieldRule::new(
    "AppointmentId",
    &["AppointmentId", "ApointmentId", "appointment_id", "data.AppointmentId", "data.appointment_id"],
  );
  const LOCALITY_NAME: FieldRule = FieldRule::new(
    "LocalityName",
    &["LocalityName", "locality_name", "locality", "data.LocalityName", "data.locality_name"],
  );

  pub fn from_raw(raw: &Value) -> Self {
    Self {
      message: Self::MESSAGE.text_or_default(raw),
      appointment_id: Self::APPOINTMENT_ID.text(raw),
      locality_name: Self::LOCALITY_NAME.text(raw),
    }
  }
}
