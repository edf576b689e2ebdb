use std::sync::Arc;

use tracing::{info, warn};

use crate::api::dto::{CreateCourseResponse, Envelope, LoginResponse, RegisterResponse};
use crate::api::{CREATE_COURSE, LOGIN, REGISTER, Transport};
use crate::executor::{Dispatch, RequestExecutor, Settlement};
use crate::models::{Course, LoginRequest, NewCourseRequest, RegisterRequest, Session};

const CREATE_REJECTED: &str = "Failed to create course. Please try again.";
const CREATE_FAILED: &str = "An error occurred while creating the course. Please try again.";
const LOGIN_REJECTED: &str = "Login failed. Please check your credentials.";
const LOGIN_FAILED: &str = "An error occurred during login. Please try again.";
const REGISTER_REJECTED: &str = "Registration failed. Please try again.";
const REGISTER_FAILED: &str = "An error occurred during registration. Please try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    Accepted(T),
    Rejected(String),
}

impl<T> SubmitOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub instructor: String,
    tags: Vec<String>,
}

impl CourseDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        instructor: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            instructor: instructor.into(),
            tags: Vec::new(),
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Appends a tag unless it is blank or already present.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn to_request(&self) -> NewCourseRequest {
        NewCourseRequest {
            title: self.title.clone(),
            description: self.description.clone(),
            instructor: self.instructor.clone(),
            tags: self.tags.clone(),
        }
    }
}

pub struct CourseCreator {
    executor: RequestExecutor<CreateCourseResponse>,
}

impl CourseCreator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            executor: RequestExecutor::new(CREATE_COURSE, transport),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.executor.is_pending()
    }

    pub fn dispatch(&mut self, draft: &CourseDraft) -> Dispatch<CreateCourseResponse> {
        self.executor.dispatch_body(draft.to_request())
    }

    /// Applies a finished create call. Returns `None` when the call was superseded or abandoned.
    /// The draft is cleared only when the server accepted it.
    pub fn complete(
        &mut self,
        settlement: Settlement<CreateCourseResponse>,
        draft: &mut CourseDraft,
    ) -> Option<SubmitOutcome<Course>> {
        if !self.executor.is_current(settlement.ticket) {
            return None;
        }

        let outcome = match &settlement.result {
            Err(e) => SubmitOutcome::Rejected(e.user_message(CREATE_FAILED)),
            Ok(CreateCourseResponse {
                success: true,
                course: Some(course),
                ..
            }) => {
                info!("course created: {} ({})", course.title, course.id);
                draft.clear();
                SubmitOutcome::Accepted(course.clone())
            }
            Ok(other) => {
                warn!("course creation rejected: {:?}", other.message());
                SubmitOutcome::Rejected(other.failure_message(CREATE_REJECTED))
            }
        };
        self.executor.settle(settlement);
        Some(outcome)
    }

    pub async fn submit(&mut self, draft: &mut CourseDraft) -> SubmitOutcome<Course> {
        let dispatch = self.dispatch(draft);
        let settlement = self.executor.wait(dispatch).await;
        self.complete(settlement, draft)
            .unwrap_or_else(|| SubmitOutcome::Rejected(CREATE_FAILED.to_string()))
    }
}

pub struct Authenticator {
    login: RequestExecutor<LoginResponse>,
    register: RequestExecutor<RegisterResponse>,
}

impl Authenticator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            login: RequestExecutor::new(LOGIN, Arc::clone(&transport)),
            register: RequestExecutor::new(REGISTER, transport),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.login.is_pending() || self.register.is_pending()
    }

    pub fn dispatch_login(&mut self, request: LoginRequest) -> Dispatch<LoginResponse> {
        info!("logging in as {}", request.username);
        self.login.dispatch_body(request)
    }

    pub fn complete_login(
        &mut self,
        settlement: Settlement<LoginResponse>,
    ) -> Option<SubmitOutcome<Session>> {
        if !self.login.is_current(settlement.ticket) {
            return None;
        }

        let outcome = match &settlement.result {
            Err(e) => SubmitOutcome::Rejected(e.user_message(LOGIN_FAILED)),
            Ok(LoginResponse {
                success: true,
                token: Some(token),
                user,
                ..
            }) => SubmitOutcome::Accepted(Session {
                token: token.clone(),
                user: user.clone(),
            }),
            Ok(other) => {
                warn!("login rejected: {:?}", other.message());
                SubmitOutcome::Rejected(other.failure_message(LOGIN_REJECTED))
            }
        };
        self.login.settle(settlement);
        Some(outcome)
    }

    pub async fn login(&mut self, request: LoginRequest) -> SubmitOutcome<Session> {
        let dispatch = self.dispatch_login(request);
        let settlement = self.login.wait(dispatch).await;
        self.complete_login(settlement)
            .unwrap_or_else(|| SubmitOutcome::Rejected(LOGIN_FAILED.to_string()))
    }

    pub fn dispatch_register(&mut self, request: RegisterRequest) -> Dispatch<RegisterResponse> {
        info!("registering {}", request.username);
        self.register.dispatch_body(request)
    }

    pub fn complete_register(
        &mut self,
        settlement: Settlement<RegisterResponse>,
    ) -> Option<SubmitOutcome<()>> {
        if !self.register.is_current(settlement.ticket) {
            return None;
        }

        let outcome = match &settlement.result {
            Err(e) => SubmitOutcome::Rejected(e.user_message(REGISTER_FAILED)),
            Ok(response) if response.succeeded() => SubmitOutcome::Accepted(()),
            Ok(response) => {
                warn!("registration rejected: {:?}", response.message());
                SubmitOutcome::Rejected(response.failure_message(REGISTER_REJECTED))
            }
        };
        self.register.settle(settlement);
        Some(outcome)
    }

    pub async fn register(&mut self, request: RegisterRequest) -> SubmitOutcome<()> {
        let dispatch = self.dispatch_register(request);
        let settlement = self.register.wait(dispatch).await;
        self.complete_register(settlement)
            .unwrap_or_else(|| SubmitOutcome::Rejected(REGISTER_FAILED.to_string()))
    }
}
