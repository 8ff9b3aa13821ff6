// carepath/src/services/backend.rs

//! REST transport. Every orchestrator talks to the backend through the
//! [`Backend`] trait and receives raw JSON; normalization happens above it.

use crate::config::ClientConfig;
use crate::errors::{ClientError, Result};
use crate::models::Attachment;
use crate::normalize::rejection_message;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Multipart body kept transport-neutral so it can be inspected in tests and
/// converted to a `reqwest::multipart::Form` only at the edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
  pub fields: Vec<(String, String)>,
  pub files: Vec<(String, Attachment)>,
}

impl MultipartForm {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.fields.push((name.into(), value.into()));
    self
  }

  pub fn file(mut self, name: impl Into<String>, attachment: Attachment) -> Self {
    self.files.push((name.into(), attachment));
    self
  }

  pub fn field(&self, name: &str) -> Option<&str> {
    self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
  }

  fn into_reqwest(self) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for (name, value) in self.fields {
      form = form.text(name, value);
    }
    for (name, attachment) in self.files {
      let part = reqwest::multipart::Part::bytes(attachment.bytes)
        .file_name(attachment.file_name)
        .mime_str(&attachment.mime_type)
        .map_err(|e| ClientError::Validation(format!("Invalid attachment type: {}", e)))?;
      form = form.part(name, part);
    }
    Ok(form)
  }
}

/// Paths are relative to the configured base URL, e.g. `/api/pharmacy/cart`.
/// Successful empty bodies come back as `Value::Null`.
#[async_trait]
pub trait Backend: Send + Sync {
  async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value>;

  async fn post(&self, path: &str, body: &Value) -> Result<Value>;

  async fn put(&self, path: &str, body: &Value) -> Result<Value>;

  async fn delete(&self, path: &str) -> Result<Value>;

  async fn post_multipart(&self, path: &str, form: MultipartForm) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
  client: Client,
  base_url: String,
  token: Option<String>,
}

impl HttpBackend {
  pub fn new(config: &ClientConfig) -> Result<Self> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.http_timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder
      .build()
      .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

    Ok(Self {
      client,
      base_url: config.api_base_url.trim_end_matches('/').to_string(),
      token: config.auth_token.clone(),
    })
  }

  pub fn with_token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }

  fn url(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path.trim_start_matches('/'))
  }

  fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
    let request = self.client.request(method, self.url(path));
    match &self.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }

  async fn handle_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
      warn!(status = status.as_u16(), "Backend returned a non-success status.");
      let parsed = serde_json::from_str::<Value>(&text).ok();
      let message = parsed.as_ref().and_then(error_message);
      return match (status, message) {
        (s, Some(message)) if s.is_client_error() && s != StatusCode::UNAUTHORIZED => {
          Err(ClientError::Rejected(message))
        }
        _ => Err(ClientError::Status {
          status: status.as_u16(),
          body: text,
        }),
      };
    }

    if text.trim().is_empty() {
      return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
  }
}

fn error_message(body: &Value) -> Option<String> {
  rejection_message(body).or_else(|| {
    ["message", "detail", "error"]
      .iter()
      .find_map(|k| body.get(*k).and_then(Value::as_str))
      .map(str::to_string)
  })
}

#[async_trait]
impl Backend for HttpBackend {
  #[instrument(name = "http::get", skip(self, query), fields(path = %path))]
  async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
    debug!(params = query.len(), "Sending GET.");
    let response = self.request(Method::GET, path).query(query).send().await?;
    Self::handle_response(response).await
  }

  #[instrument(name = "http::post", skip(self, body), fields(path = %path))]
  async fn post(&self, path: &str, body: &Value) -> Result<Value> {
    let response = self.request(Method::POST, path).json(body).send().await?;
    Self::handle_response(response).await
  }

  #[instrument(name = "http::put", skip(self, body), fields(path = %path))]
  async fn put(&self, path: &str, body: &Value) -> Result<Value> {
    let response = self.request(Method::PUT, path).json(body).send().await?;
    Self::handle_response(response).await
  }

  #[instrument(name = "http::delete", skip(self), fields(path = %path))]
  async fn delete(&self, path: &str) -> Result<Value> {
    let response = self.request(Method::DELETE, path).send().await?;
    Self::handle_response(response).await
  }

  #[instrument(name = "http::post_multipart", skip(self, form), fields(path = %path, files = form.files.len()))]
  async fn post_multipart(&self, path: &str, form: MultipartForm) -> Result<Value> {
    let form = form.into_reqwest()?;
    let response = self.request(Method::POST, path).multipart(form).send().await?;
    Self::handle_response(response).await
  }
}
