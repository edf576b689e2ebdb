pub mod dto;

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::AppError;

pub const LIST_COURSES: Endpoint = Endpoint::new(HttpMethod::Get, "/courses");
pub const SEARCH_COURSES: Endpoint = Endpoint::new(HttpMethod::Get, "/courses/search");
pub const CREATE_COURSE: Endpoint = Endpoint::new(HttpMethod::Post, "/courses");
pub const LOGIN: Endpoint = Endpoint::new(HttpMethod::Post, "/auth/login");
pub const REGISTER: Endpoint = Endpoint::new(HttpMethod::Post, "/auth/register");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// Resource path and method an executor is bound to for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: &'static str,
}

impl Endpoint {
    pub const fn new(method: HttpMethod, path: &'static str) -> Self {
        Self { method, path }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// One outbound call, already serialized.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub query: Option<serde_json::Value>,
    pub body: Option<serde_json::Value>,
    pub request_id: Uuid,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs exactly one call and returns the parsed JSON body of a 2xx response.
    async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, AppError>;
}

pub struct HttpTransport {
    client: Client,
    config: ApiConfig,
}

impl HttpTransport {
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, AppError> {
        let url = self.config.url(request.endpoint.path);
        debug!(request_id = %request.request_id, "{} {}", request.endpoint.method, url);

        let mut builder = self
            .client
            .request(request.endpoint.method.as_reqwest(), &url)
            .header("x-request-id", request.request_id.to_string());

        if let Some(query) = &request.query {
            builder = builder.query(query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            warn!(
                request_id = %request.request_id,
                "{} returned {}: {}", request.endpoint, status, body_text
            );
            return Err(AppError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        serde_json::from_str(&body_text).map_err(|e| {
            warn!(request_id = %request.request_id, "Failed to parse: {}", e);
            AppError::Decode(e)
        })
    }
}
