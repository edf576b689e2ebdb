use serde::{Deserialize, Serialize};

use crate::models::Course;

/// Common shape of every backend response: a success flag plus an optional message.
pub trait Envelope {
    fn succeeded(&self) -> bool;
    fn message(&self) -> Option<&str>;

    /// Server-provided message when present and non-empty, otherwise `fallback`.
    fn failure_message(&self, fallback: &str) -> String {
        match self.message() {
            Some(msg) if !msg.trim().is_empty() => msg.to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListParams {
    pub page: u32,
    pub size: u32,
    pub sort: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchParams {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListCoursesResponse {
    pub success: bool,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default, alias = "totalElements")]
    pub total: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchCoursesResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Vec<Course>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateCourseResponse {
    pub success: bool,
    #[serde(default)]
    pub course: Option<Course>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

macro_rules! impl_envelope {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Envelope for $ty {
                fn succeeded(&self) -> bool {
                    self.success
                }

                fn message(&self) -> Option<&str> {
                    self.message.as_deref()
                }
            }
        )*
    };
}

impl_envelope!(
    ListCoursesResponse,
    SearchCoursesResponse,
    CreateCourseResponse,
    LoginResponse,
    RegisterResponse,
);
