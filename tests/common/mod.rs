#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use catalog::api::{ApiRequest, Transport};
use catalog::error::AppError;
use serde_json::{Value, json};

type Responder = Box<dyn Fn(&ApiRequest) -> Result<Value, AppError> + Send + Sync>;

/// In-process backend answering from a closure and recording every request.
pub struct ScriptedTransport {
    responder: Responder,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new(
        responder: impl Fn(&ApiRequest) -> Result<Value, AppError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.endpoint.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(&request)
    }
}

pub fn course(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("About {}", title),
        "instructor": "Dr. Ada",
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-02T10:00:00Z",
        "rating": 4.5,
        "totalRatings": 12,
        "totalVisits": 300,
        "tags": ["cs"]
    })
}

pub fn query_u64(request: &ApiRequest, key: &str) -> Option<u64> {
    request.query.as_ref().and_then(|q| q[key].as_u64())
}

pub fn query_str(request: &ApiRequest, key: &str) -> Option<String> {
    request
        .query
        .as_ref()
        .and_then(|q| q[key].as_str())
        .map(str::to_string)
}

/// Three courses over pages of any size: page 0 holds two, page 1 holds one.
/// Searching for "algorithms" finds one course, anything else finds none.
pub fn catalog_backend() -> Arc<ScriptedTransport> {
    ScriptedTransport::new(|request| match request.endpoint.path {
        "/courses" => {
            let courses = match query_u64(request, "page").unwrap_or(0) {
                0 => vec![course(1, "Algorithms I"), course(2, "Biology")],
                1 => vec![course(3, "Chemistry")],
                _ => vec![],
            };
            Ok(json!({ "success": true, "courses": courses, "total": 3 }))
        }
        "/courses/search" => {
            let results = match query_str(request, "query").as_deref() {
                Some("algorithms") => vec![course(7, "Advanced Algorithms")],
                _ => vec![],
            };
            Ok(json!({ "success": true, "results": results }))
        }
        other => Err(AppError::Status {
            status: 404,
            body: other.to_string(),
        }),
    })
}

pub fn titles(records: &[catalog::models::Course]) -> Vec<String> {
    records.iter().map(|c| c.title.clone()).collect()
}

/// Backend that accepts every call and never answers.
pub struct StalledTransport;

#[async_trait]
impl Transport for StalledTransport {
    async fn send(&self, _request: ApiRequest) -> Result<Value, AppError> {
        futures::future::pending().await
    }
}
