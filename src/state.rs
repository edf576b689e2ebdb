use std::sync::Arc;

use crate::api::{HttpTransport, Transport};
use crate::config::ApiConfig;
use crate::controller::CatalogController;
use crate::error::AppError;
use crate::services::{Authenticator, CourseCreator};

/// Shared transport handle every view-level component is built from.
#[derive(Clone)]
pub struct AppState {
    pub transport: Arc<dyn Transport>,
}

impl AppState {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn connect(config: ApiConfig) -> Result<Self, AppError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport)))
    }

    pub fn catalog(&self) -> CatalogController {
        CatalogController::new(Arc::clone(&self.transport))
    }

    pub fn course_creator(&self) -> CourseCreator {
        CourseCreator::new(Arc::clone(&self.transport))
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(Arc::clone(&self.transport))
    }
}
