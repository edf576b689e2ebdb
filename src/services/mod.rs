pub mod forms;

pub use forms::{Authenticator, CourseCreator, CourseDraft, SubmitOutcome};
