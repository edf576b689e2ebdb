use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url)
            .map_err(|e| AppError::Config(format!("invalid api url {}: {}", base_url, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::Config(format!(
                "api url must be http or https, got {}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url,
            timeout: None,
        })
    }

    pub fn new_from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let base_url = env::var("CATALOG_API_URL")
            .map_err(|_| AppError::Config("CATALOG_API_URL is not set".to_string()))?;
        let mut config = Self::new(base_url)?;

        if let Ok(raw) = env::var("CATALOG_API_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!("CATALOG_API_TIMEOUT_SECS is not a number: {}", raw))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}
