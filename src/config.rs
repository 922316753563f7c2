use crate::errors::AppError;

/// Environment variable naming the backend base URL.
pub const API_BASE_VAR: &str = "COLD_MAILER_API_BASE";

/// Base URL used when nothing is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Client configuration. Deployments differ only in where the email service lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    api_base: String,
}

impl ClientConfig {
    pub fn new(api_base: &str) -> Result<Self, AppError> {
        let trimmed = api_base.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(AppError::InvalidConfig { value: api_base.to_string() });
        }
        Ok(Self { api_base: trimmed.to_string() })
    }

    /// Resolves the base URL from an optional value, e.g. `option_env!` in the web build.
    pub fn from_value(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Self::new(v),
            None => Ok(Self::default()),
        }
    }

    /// Reads `COLD_MAILER_API_BASE` from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_value(std::env::var(API_BASE_VAR).ok().as_deref())
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_base: DEFAULT_API_BASE.to_string() }
    }
}
