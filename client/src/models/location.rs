// carepath/src/models/location.rs

use crate::normalize::FieldRule;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
  pub id: i64,
  pub name: String,
  pub state: Option<String>,
}

impl City {
  const ID: FieldRule = FieldRule::new("id", &["id", "city_id", "CityId"]);
  const NAME: FieldRule = FieldRule::new("name", &["name", "city_name", "CityName"]);
  const STATE: FieldRule = FieldRule::new("state", &["state", "state_name", "StateName", "state.name"]);

  pub fn from_raw(raw: &Value) -> Self {
    Self {
      id: Self::ID.integer(raw).unwrap_or(0),
      name: Self::NAME.text_or_default(raw),
      state: Self::STATE.text(raw),
    }
  }
}
