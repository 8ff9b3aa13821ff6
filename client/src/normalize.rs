// carepath/src/normalize.rs

//! Field-candidate tables for reconciling the backend's inconsistent payloads.
//!
//! Each view-model field is described by a [`FieldRule`]: the field's own name
//! plus an ordered list of places the backend may have put it. A candidate is
//! a dotted path (`patient.name`) into nested objects. The first candidate
//! holding a present, non-null, non-empty value wins.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
  pub target: &'static str,
  pub candidates: &'static [&'static str],
}

impl FieldRule {
  pub const fn new(target: &'static str, candidates: &'static [&'static str]) -> Self {
    Self { target, candidates }
  }

  pub fn value<'a>(&self, raw: &'a Value) -> Option<&'a Value> {
    first_value(raw, self.candidates)
  }

  pub fn text(&self, raw: &Value) -> Option<String> {
    self.value(raw).and_then(as_text)
  }

  pub fn text_or_default(&self, raw: &Value) -> String {
    self.text(raw).unwrap_or_default()
  }

  pub fn money(&self, raw: &Value) -> f64 {
    self.value(raw).map(parse_money).unwrap_or(0.0)
  }

  pub fn integer(&self, raw: &Value) -> Option<i64> {
    self.value(raw).and_then(parse_integer)
  }

  pub fn flag(&self, raw: &Value) -> Option<bool> {
    self.value(raw).and_then(parse_flag)
  }
}

/// Resolves a dotted path. Array segments are addressed by index (`items.0`).
pub fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
  path.split('.').try_fold(raw, |current, segment| match current {
    Value::Object(map) => map.get(segment),
    Value::Array(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
    _ => None,
  })
}

fn is_present(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::String(s) => !s.trim().is_empty(),
    _ => true,
  }
}

pub fn first_value<'a>(raw: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
  candidates
    .iter()
    .filter_map(|path| lookup(raw, path))
    .find(|v| is_present(v))
}

pub fn as_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

/// Parses a price that may arrive as a number or a string such as
/// `"1,250.00"`, `"₹ 99"` or `"Rs.500"`. Only a leading currency marker and
/// thousands separators are tolerated; anything else is `0.0`. The result is
/// always finite.
pub fn parse_money(value: &Value) -> f64 {
  let parsed = match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => {
      let trimmed = s.trim();
      let unprefixed = CURRENCY_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed)
        .trim_start();
      let cleaned = unprefixed.replace(',', "");
      if is_plain_decimal(&cleaned) {
        cleaned.parse::<f64>().ok()
      } else {
        None
      }
    }
    _ => None,
  };
  parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

// Longest first so "Rs." wins over "Rs".
const CURRENCY_PREFIXES: &[&str] = &["₹", "Rs.", "Rs", "INR"];

// Optional sign, digits, at most one dot. Rejects exponents, "inf" and "NaN".
fn is_plain_decimal(s: &str) -> bool {
  let digits = s.strip_prefix('-').unwrap_or(s);
  let mut dots = 0;
  let mut any_digit = false;
  for c in digits.chars() {
    match c {
      '0'..='9' => any_digit = true,
      '.' => dots += 1,
      _ => return false,
    }
  }
  any_digit && dots <= 1
}

pub fn parse_integer(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
    Value::String(s) => {
      let s = s.trim();
      s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
    }
    _ => None,
  }
}

pub fn parse_flag(value: &Value) -> Option<bool> {
  match value {
    Value::Bool(b) => Some(*b),
    Value::Number(n) => n.as_i64().map(|i| i != 0),
    Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
      "true" | "yes" | "y" | "1" => Some(true),
      "false" | "no" | "n" | "0" => Some(false),
      _ => None,
    },
    _ => None,
  }
}

/// Finds the record list in a response body. Checked in order: bare array,
/// `items`, `data`, `results`, then `data.items` and `data.results`.
pub fn extract_list(body: &Value) -> &[Value] {
  if let Value::Array(list) = body {
    return list;
  }
  for path in ["items", "data", "results", "data.items", "data.results"] {
    if let Some(Value::Array(list)) = lookup(body, path) {
      return list;
    }
  }
  &[]
}

/// Unwraps a single-record body that may be wrapped as `{data: {...}}`.
pub fn extract_object(body: &Value) -> &Value {
  match body.get("data") {
    Some(inner @ Value::Object(_)) => inner,
    _ => body,
  }
}

/// Copies the top-level fields of `raw` that no rule reads and that do not
/// collide with a target name.
pub fn passthrough(raw: &Value, rules: &[FieldRule]) -> Map<String, Value> {
  let Value::Object(map) = raw else {
    return Map::new();
  };
  map
    .iter()
    .filter(|(key, _)| {
      !rules
        .iter()
        .any(|rule| rule.target == key.as_str() || rule.candidates.contains(&key.as_str()))
    })
    .map(|(k, v)| (k.clone(), v.clone()))
    .collect()
}

/// Reads a business rejection out of an otherwise successful response:
/// `{success: false, message}` or `{status: "error", message}`.
pub fn rejection_message(body: &Value) -> Option<String> {
  const MESSAGE: FieldRule = FieldRule::new("message", &["message", "Message", "detail", "error", "errors.0"]);

  let failed = match body.get("success").or_else(|| body.get("Success")) {
    Some(v) => parse_flag(v) == Some(false),
    None => matches!(body.get("status").and_then(Value::as_str), Some("error" | "failed")),
  };
  if !failed {
    return None;
  }
  Some(MESSAGE.text(body).unwrap_or_else(|| "The request was rejected.".to_string()))
}

