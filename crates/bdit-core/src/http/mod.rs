//! Blocking JSON-over-HTTP client for the platform APIs under test.
//!
//! Uses the curl crate (libcurl), one `Easy` handle per request. Errors come
//! back as [`RequestError`], which the retry loop knows how to classify.

mod error;

pub use error::RequestError;

use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const TOTAL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub method: Method,
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Turn any status other than `expected` into [`RequestError::UnexpectedStatus`].
    pub fn expect_status(self, expected: u16) -> Result<Self, RequestError> {
        if self.status == expected {
            return Ok(self);
        }
        Err(RequestError::UnexpectedStatus {
            method: self.method.as_str().to_string(),
            url: self.url,
            expected,
            status: self.status,
            body: error::excerpt(&self.body),
        })
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        serde_json::from_slice(&self.body).map_err(|source| RequestError::Decode {
            url: self.url.clone(),
            source,
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Client bound to one service base URL.
#[derive(Clone)]
pub struct HttpClient {
    base_url: Url,
    bearer_token: Option<String>,
    connect_timeout: Duration,
    timeout: Duration,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout", &self.connect_timeout)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, RequestError> {
        let base_url = Url::parse(base_url).map_err(|source| RequestError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            base_url,
            bearer_token: None,
            connect_timeout: CONNECT_TIMEOUT,
            timeout: TOTAL_TIMEOUT,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request. `None` sends no header.
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `path` appended verbatim and `query` pairs added.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, RequestError> {
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|source| RequestError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().copied());
        }
        Ok(url)
    }

    pub fn get(&self, path: &str) -> Result<HttpResponse, RequestError> {
        self.request(Method::Get, path, &[], None)
    }

    pub fn put_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse, RequestError> {
        self.request(Method::Put, path, query, Some(body))
    }

    /// Perform one request. Any status is returned as a response; only
    /// transport and encoding problems are errors here.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, RequestError> {
        let url = self.url(path, query)?;
        let transport = |source: curl::Error| RequestError::Transport {
            method: method.as_str().to_string(),
            url: url.to_string(),
            source,
        };

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str()).map_err(transport)?;
        easy.follow_location(true).map_err(transport)?;
        easy.connect_timeout(self.connect_timeout).map_err(transport)?;
        easy.timeout(self.timeout).map_err(transport)?;

        let mut list = curl::easy::List::new();
        list.append("Accept: application/json").map_err(transport)?;
        if let Some(token) = &self.bearer_token {
            list.append(&format!("Authorization: Bearer {}", token))
                .map_err(transport)?;
        }

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(|source| RequestError::Encode {
                method: method.as_str().to_string(),
                url: url.to_string(),
                source,
            })?;
            list.append("Content-Type: application/json").map_err(transport)?;
            // Small bodies only; suppress curl's 100-continue handshake.
            list.append("Expect:").map_err(transport)?;
            easy.post_fields_copy(&bytes).map_err(transport)?;
        }
        match method {
            Method::Get => easy.get(true).map_err(transport)?,
            Method::Post => easy.post(true).map_err(transport)?,
            Method::Put => easy.custom_request(method.as_str()).map_err(transport)?,
        }
        easy.http_headers(list).map_err(transport)?;

        let mut received = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    received.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(transport)?;
            transfer.perform().map_err(transport)?;
        }

        let status = easy.response_code().map_err(transport)?;
        tracing::debug!("{} {} -> {}", method, url, status);

        Ok(HttpResponse {
            method,
            url: url.to_string(),
            status: u16::try_from(status).unwrap_or(0),
            body: received,
        })
    }
}
