// carepath/src/models/dependant.rs

use crate::errors::{ClientError, Result};
use crate::normalize::passthrough;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Immutable id -> display-name mapping for family relationships.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipTable(&'static [(i64, &'static str)]);

pub const RELATIONSHIPS: RelationshipTable = RelationshipTable(&[
  (1, "Self"),
  (2, "Spouse"),
  (3, "Son"),
  (4, "Daughter"),
  (5, "Father"),
  (6, "Mother"),
  (7, "Brother"),
  (8, "Sister"),
]);

impl RelationshipTable {
  pub const UNKNOWN: &'static str = "Unknown";

  pub fn name_for(&self, id: i64) -> &'static str {
    self
      .0
      .iter()
      .find(|(key, _)| *key == id)
      .map(|(_, name)| *name)
      .unwrap_or(Self::UNKNOWN)
  }

  pub fn contains(&self, id: i64) -> bool {
    self.0.iter().any(|(key, _)| *key == id)
  }

  pub fn entries(&self) -> &'static [(i64, &'static str)] {
    self.0
  }
}

pub mod fields {
  use crate::normalize::FieldRule;

  pub const ID: FieldRule = FieldRule::new("DependentId", &["DependentId", "dependent_id", "dependant_id", "id"]);
  pub const EMPLOYEE_REF_ID: FieldRule = FieldRule::new(
    "EmployeeRefId",
    &["EmployeeRefId", "employee_ref_id", "employee_id", "employee.ref_id"],
  );
  pub const NAME: FieldRule = FieldRule::new(
    "DependentName",
    &["DependentName", "dependent_name", "dependant_name", "name", "full_name"],
  );
  pub const RELATIONSHIP_ID: FieldRule = FieldRule::new(
    "RelationshipId",
    &["RelationshipId", "relationship_id", "relation_id", "relationship.id"],
  );
  pub const GENDER: FieldRule = FieldRule::new("Gender", &["Gender", "gender", "sex"]);
  pub const DATE_OF_BIRTH: FieldRule =
    FieldRule::new("DOB", &["DOB", "DateOfBirth", "date_of_birth", "dob", "birth_date"]);
  pub const MOBILE_NO: FieldRule = FieldRule::new("MobileNo", &["MobileNo", "mobile_no", "mobile", "phone"]);
  pub const EMAIL_ID: FieldRule = FieldRule::new("EmailId", &["EmailId", "Emailid", "email_id", "email"]);
  pub const IS_ACTIVE: FieldRule = FieldRule::new("IsActive", &["IsActive", "is_active", "active", "status"]);

  // Consumed alongside RELATIONSHIP_ID so they do not leak into `extra`.
  pub const RELATIONSHIP_NAME: FieldRule = FieldRule::new("Relationship", &["Relationship", "relationship"]);

  pub const ALL: &[FieldRule] = &[
    ID,
    EMPLOYEE_REF_ID,
    NAME,
    RELATIONSHIP_ID,
    GENDER,
    DATE_OF_BIRTH,
    MOBILE_NO,
    EMAIL_ID,
    IS_ACTIVE,
    RELATIONSHIP_NAME,
  ];
}

/// A family member registered under an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependant {
  #[serde(rename = "DependentId")]
  pub id: i64,
  #[serde(rename = "EmployeeRefId")]
  pub employee_ref_id: Option<String>,
  #[serde(rename = "DependentName")]
  pub name: String,
  #[serde(rename = "RelationshipId")]
  pub relationship_id: i64,
  #[serde(rename = "Relationship")]
  pub relationship: String,
  #[serde(rename = "Gender")]
  pub gender: Option<String>,
  /// `YYYY-MM-DD` when the backend value could be read as a date, otherwise
  /// the raw string.
  #[serde(rename = "DOB")]
  pub date_of_birth: Option<String>,
  #[serde(rename = "MobileNo")]
  pub mobile_no: Option<String>,
  #[serde(rename = "EmailId")]
  pub email_id: Option<String>,
  #[serde(rename = "IsActive")]
  pub is_active: bool,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl Dependant {
  pub fn from_raw(raw: &Value, relationships: &RelationshipTable) -> Self {
    use fields::*;
    let relationship_id = RELATIONSHIP_ID.integer(raw).unwrap_or(0);
    let is_active = match IS_ACTIVE.value(raw) {
      Some(Value::String(s)) if s.eq_ignore_ascii_case("inactive") => false,
      Some(Value::String(s)) if s.eq_ignore_ascii_case("active") => true,
      _ => IS_ACTIVE.flag(raw).unwrap_or(true),
    };
    Self {
      id: ID.integer(raw).unwrap_or(0),
      employee_ref_id: EMPLOYEE_REF_ID.text(raw),
      name: NAME.text_or_default(raw),
      relationship_id,
      relationship: relationships.name_for(relationship_id).to_string(),
      gender: GENDER.text(raw),
      date_of_birth: DATE_OF_BIRTH
        .text(raw)
        .map(|d| normalize_date(&d).unwrap_or(d)),
      mobile_no: MOBILE_NO.text(raw),
      email_id: EMAIL_ID.text(raw),
      is_active,
      extra: passthrough(raw, fields::ALL),
    }
  }
}

/// Normalizes `DD/MM/YYYY`, `YYYY-MM-DD` and `YYYY-MM-DDThh:mm...` to
/// `YYYY-MM-DD`.
pub fn normalize_date(input: &str) -> Result<String> {
  let trimmed = input.trim();
  let parsed = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").or_else(|_| {
    let date_part = trimmed
      .split(|c| c == 'T' || c == ' ')
      .next()
      .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
  });
  parsed
    .map(|d| d.format("%Y-%m-%d").to_string())
    .map_err(|_| ClientError::Validation(format!("Unrecognised date '{}'. Use DD/MM/YYYY.", trimmed)))
}

/// Create-or-update payload. A positive `id` means update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependantRequest {
  pub id: Option<i64>,
  pub employee_ref_id: String,
  pub name: String,
  pub relationship_id: i64,
  pub gender: Option<String>,
  pub date_of_birth: String,
  pub mobile_no: Option<String>,
  pub email_id: Option<String>,
}

impl DependantRequest {
  pub fn existing_id(&self) -> Option<i64> {
    self.id.filter(|id| *id > 0)
  }

  /// Checks required fields and returns the JSON body with the date
  /// normalized.
  pub fn validated_payload(&self, relationships: &RelationshipTable) -> Result<Value> {
    if self.name.trim().is_empty() {
      return Err(ClientError::Validation("Name is required.".to_string()));
    }
    if self.employee_ref_id.trim().is_empty() {
      return Err(ClientError::Validation("Employee reference is required.".to_string()));
    }
    if !relationships.contains(self.relationship_id) {
      return Err(ClientError::Validation("Please choose a valid relationship.".to_string()));
    }
    if self.date_of_birth.trim().is_empty() {
      return Err(ClientError::Validation("Date of birth is required.".to_string()));
    }
    let date_of_birth = normalize_date(&self.date_of_birth)?;

    Ok(json!({
      "employee_ref_id": self.employee_ref_id.trim(),
      "name": self.name.trim(),
      "relationship_id": self.relationship_id,
      "gender": self.gender,
      "date_of_birth": date_of_birth,
      "mobile": self.mobile_no,
      "email": self.email_id,
    }))
  }
}
