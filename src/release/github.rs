//! GitHub release creation via the REST API

use crate::core::config::CreatedStatus;
use crate::core::error::{ConfigError, RemoteReleaseError, ShipError, ShipResult};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = concat!("shiprail/", env!("CARGO_PKG_VERSION"));

/// One GitHub release, built once per run and consumed by the API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
  pub owner: String,
  pub repo: String,
  /// `v` + version
  pub tag_name: String,
  pub name: String,
  /// Newest changelog section
  pub body: String,
}

/// Request body for `POST /repos/{owner}/{repo}/releases`
#[derive(Serialize)]
struct ReleasePayload<'a> {
  tag_name: &'a str,
  name: &'a str,
  body: &'a str,
}

/// Successful API answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseResponse {
  pub status: u16,
}

/// Creates releases on the hosting service
pub trait ReleaseApi: Send + Sync {
  /// Non-2xx answers are `RemoteReleaseError::Rejected`
  fn create_release(&self, token: &str, record: &ReleaseRecord) -> ShipResult<ReleaseResponse>;
}

/// Blocking GitHub REST client
pub struct GitHubClient {
  api_url: String,
  http_client: reqwest::blocking::Client,
}

impl GitHubClient {
  pub fn new(api_url: &str) -> ShipResult<Self> {
    let http_client = reqwest::blocking::Client::builder()
      .user_agent(USER_AGENT)
      .timeout(REQUEST_TIMEOUT)
      .build()?;

    Ok(Self {
      api_url: api_url.trim_end_matches('/').to_string(),
      http_client,
    })
  }

  fn releases_url(&self, record: &ReleaseRecord) -> String {
    format!("{}/repos/{}/{}/releases", self.api_url, record.owner, record.repo)
  }
}

impl ReleaseApi for GitHubClient {
  fn create_release(&self, token: &str, record: &ReleaseRecord) -> ShipResult<ReleaseResponse> {
    let url = self.releases_url(record);
    debug!(%url, tag = %record.tag_name, "creating GitHub release");

    let response = self
      .http_client
      .post(&url)
      .header("Authorization", format!("token {}", token))
      .header("Accept", "application/vnd.github+json")
      .json(&ReleasePayload {
        tag_name: &record.tag_name,
        name: &record.name,
        body: &record.body,
      })
      .send()?;

    let status = response.status();
    if !status.is_success() {
      let text = response.text().unwrap_or_default();
      return Err(ShipError::RemoteRelease(RemoteReleaseError::Rejected {
        status: status.as_u16(),
        message: api_error_message(&text),
      }));
    }

    Ok(ReleaseResponse {
      status: status.as_u16(),
    })
  }
}

/// GitHub error bodies carry a `message` field; fall back to the raw text
fn api_error_message(body: &str) -> String {
  serde_json::from_str::<serde_json::Value>(body)
    .ok()
    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
    .unwrap_or_else(|| body.trim().to_string())
}

/// Read the API token. Absent file means no GitHub release.
pub fn read_token(path: &Path) -> ShipResult<Option<String>> {
  if !path.exists() {
    return Ok(None);
  }
  let token = fs::read_to_string(path)?.trim().to_string();
  if token.is_empty() {
    return Err(ShipError::Config(ConfigError::EmptyCredential {
      path: path.to_path_buf(),
    }));
  }
  Ok(Some(token))
}

/// Log the API answer; returns the line logged
pub fn report_created(response: ReleaseResponse, mode: CreatedStatus, tag: &str) -> String {
  match (response.status, mode) {
    (201, CreatedStatus::LegacyWarning) => {
      let line = "Failed to create release tag".to_string();
      warn!(status = response.status, tag, "{}", line);
      line
    }
    _ => {
      let line = format!("Created GitHub release {}", tag);
      info!(status = response.status, "{}", line);
      line
    }
  }
}

#[cfg(test)]
pub mod testing {
  use super::*;
  use std::sync::Mutex;

  /// Records releases instead of calling GitHub
  pub struct FakeApi {
    pub status: u16,
    pub reject: Option<(u16, String)>,
    pub created: Mutex<Vec<(String, ReleaseRecord)>>,
  }

  impl FakeApi {
    pub fn new() -> Self {
      Self {
        status: 201,
        reject: None,
        created: Mutex::new(Vec::new()),
      }
    }

    pub fn rejecting(status: u16, message: &str) -> Self {
      Self {
        reject: Some((status, message.to_string())),
        ..Self::new()
      }
    }

    pub fn records(&self) -> Vec<(String, ReleaseRecord)> {
      self.created.lock().unwrap().clone()
    }
  }

  impl ReleaseApi for FakeApi {
    fn create_release(&self, token: &str, record: &ReleaseRecord) -> ShipResult<ReleaseResponse> {
      self.created.lock().unwrap().push((token.to_string(), record.clone()));
      if let Some((status, message)) = &self.reject {
        return Err(ShipError::RemoteRelease(RemoteReleaseError::Rejected {
          status: *status,
          message: message.clone(),
        }));
      }
      Ok(ReleaseResponse { status: self.status })
    }
  }
}
