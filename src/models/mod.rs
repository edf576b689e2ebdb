pub mod auth;
pub mod course;

pub use auth::{LoginRequest, RegisterRequest, Session};
pub use course::{Course, CourseId, NewCourseRequest};
