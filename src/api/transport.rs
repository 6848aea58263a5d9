use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Proxy};
use serde_json::Value;

use super::{ApiError, ApiReply, ApiRequest};

pub const USER_AGENT: &str = concat!("paddock/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiReply, ApiError>;
}

#[derive(Clone, Debug, Default)]
pub struct HttpTransportConfig {
    pub base_url: String,
    pub timeout: usize,
    pub proxy: Option<String>,
    pub header: Option<(reqwest::header::HeaderName, reqwest::header::HeaderValue)>,
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, ApiError> {
        let base_url = reqwest::Url::parse(config.base_url.trim()).map_err(|_| {
            ApiError::InvalidBase {
                url: config.base_url.clone(),
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBase {
                url: config.base_url,
            });
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Some((name, value)) = config.header {
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::limited(10))
            .timeout(Duration::from_secs(config.timeout.try_into().unwrap_or(30)));
        if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            let proxy = Proxy::all(proxy)
                .map_err(|e| ApiError::Transport(format!("could not set up proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    pub fn url_for(&self, request: &ApiRequest) -> Result<reqwest::Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| ApiError::InvalidBase {
                url: self.base_url.to_string(),
            })?;
            segments.pop_if_empty();
            segments.extend(request.segments.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiReply, ApiError> {
        let url = self.url_for(request)?;
        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(v) => v,
                // a proxy or crashed backend answering with HTML still surfaces as an HTTP error
                Err(_) if !(200..300).contains(&status) => Value::Null,
                Err(e) => return Err(ApiError::Decode(e.to_string())),
            }
        };
        Ok(ApiReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoint;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(HttpTransportConfig {
            base_url: base.to_string(),
            timeout: 5,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn joins_segments_onto_base() {
        let t = transport("http://127.0.0.1:5000");
        let url = t.url_for(&Endpoint::ListRaces.request()).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/races");
    }

    #[test]
    fn keeps_base_path_prefix() {
        let t = transport("http://host/proxy/");
        let url = t.url_for(&Endpoint::ListHorses.request()).unwrap();
        assert_eq!(url.as_str(), "http://host/proxy/api/horses");
    }

    #[test]
    fn percent_encodes_ids() {
        let t = transport("http://host");
        let req = Endpoint::ScrapeHorse {
            horse_id: "Big Red/2".to_string(),
        }
        .request();
        let url = t.url_for(&req).unwrap();
        assert_eq!(url.as_str(), "http://host/api/scrape-horse/Big%20Red%2F2");
    }

    #[test]
    fn rejects_bad_base() {
        assert!(matches!(
            HttpTransport::new(HttpTransportConfig {
                base_url: "not a url".to_string(),
                ..Default::default()
            }),
            Err(ApiError::InvalidBase { .. })
        ));
    }
}
