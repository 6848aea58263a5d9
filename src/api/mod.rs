pub mod transport;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

pub use transport::{HttpTransport, HttpTransportConfig, Transport};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL '{url}'")]
    InvalidBase { url: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("invalid JSON response: {0}")]
    Decode(String),

    #[error("{0}")]
    Application(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

// a request is described as path segments so ids are percent-encoded by the transport
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: reqwest::Method,
    pub segments: Vec<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn get(segments: &[&str]) -> Self {
        Self {
            method: reqwest::Method::GET,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            body: None,
        }
    }

    fn post(segments: &[&str], body: Option<Value>) -> Self {
        Self {
            method: reqwest::Method::POST,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            body,
        }
    }

    pub fn path(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            out.push_str(segment);
        }
        out
    }
}

#[derive(Clone, Debug)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Every call the client knows how to make against the scrape API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    ScrapeUrl { url: String },
    ListRaces,
    RaceEntries { race_id: String },
    ScrapeHorses { race_id: String },
    CheckScratches { race_id: String },
    CheckAllScratches,
    ScrapeHorse { horse_id: String },
    ScrapeHorseProfile { horse_url: String },
    ListHorses,
    PedigreeCheckMissing,
    CheckAndUpdateHorses,
    ScrapeNullHorses,
}

impl Endpoint {
    pub fn request(&self) -> ApiRequest {
        match self {
            Endpoint::ScrapeUrl { url } => {
                ApiRequest::post(&["api", "scrape"], Some(json!({ "url": url })))
            }
            Endpoint::ListRaces => ApiRequest::get(&["api", "races"]),
            Endpoint::RaceEntries { race_id } => {
                ApiRequest::get(&["api", "races", race_id.as_str(), "entries"])
            }
            Endpoint::ScrapeHorses { race_id } => {
                ApiRequest::post(&["api", "scrape-horses", race_id.as_str()], None)
            }
            Endpoint::CheckScratches { race_id } => {
                ApiRequest::post(&["api", "races", race_id.as_str(), "check-scratches"], None)
            }
            Endpoint::CheckAllScratches => ApiRequest::post(&["api", "check-all-scratches"], None),
            Endpoint::ScrapeHorse { horse_id } => {
                ApiRequest::post(&["api", "scrape-horse", horse_id.as_str()], Some(json!({})))
            }
            Endpoint::ScrapeHorseProfile { horse_url } => ApiRequest::post(
                &["api", "scrape-horse-profile"],
                Some(json!({ "horse_url": horse_url })),
            ),
            Endpoint::ListHorses => ApiRequest::get(&["api", "horses"]),
            Endpoint::PedigreeCheckMissing => ApiRequest::post(
                &["api", "pedigree", "check-missing-horses"],
                Some(json!({})),
            ),
            Endpoint::CheckAndUpdateHorses => {
                ApiRequest::post(&["api", "check-and-update-horses"], None)
            }
            Endpoint::ScrapeNullHorses => ApiRequest::post(&["api", "scrape-null-horses"], None),
        }
    }
}

fn server_message(body: &Value, status: u16) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("server error: {status}"))
}

pub struct ApiClient<T: Transport> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends the endpoint's request and returns the JSON body of a 2xx reply.
    pub async fn call(&self, endpoint: &Endpoint) -> Result<Value, ApiError> {
        let request = endpoint.request();
        tracing::debug!(method = %request.method, path = %request.path(), "api request");
        let reply = self.transport.send(&request).await?;
        tracing::debug!(status = reply.status, path = %request.path(), "api reply");
        if !reply.is_success() {
            return Err(ApiError::Http {
                status: reply.status,
                message: server_message(&reply.body, reply.status),
            });
        }
        Ok(reply.body)
    }

    pub async fn call_as<R: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<R, ApiError> {
        let body = self.call(endpoint).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
