use crate::error::PlannerError;

pub const API_KEY_VAR: &str = "AZURE_MAPS_KEY";
pub const BASE_URL_VAR: &str = "AZURE_MAPS_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://atlas.microsoft.com";

/// Credential and endpoint of the directions service.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    api_key: String,
    base_url: String,
}

impl ServiceConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, PlannerError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(PlannerError::ConfigurationMissing);
        }
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let base_url = if base_url.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            base_url
        };
        Ok(Self { api_key, base_url })
    }

    /// Reads the key and optional endpoint from the process environment.
    pub fn from_env() -> Result<Self, PlannerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the key and optional endpoint baked in at compile time.
    pub fn from_build_env() -> Result<Self, PlannerError> {
        Self::from_lookup(|name| match name {
            API_KEY_VAR => option_env!("AZURE_MAPS_KEY").map(str::to_string),
            BASE_URL_VAR => option_env!("AZURE_MAPS_BASE_URL").map(str::to_string),
            _ => None,
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PlannerError> {
        let api_key = lookup(API_KEY_VAR).ok_or(PlannerError::ConfigurationMissing)?;
        let base_url = lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(api_key, base_url)
    }

    /// Replaces the key, keeping the endpoint. Used by the interactive override field.
    pub fn with_api_key(&self, api_key: impl Into<String>) -> Result<Self, PlannerError> {
        Self::new(api_key, self.base_url.clone())
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// The key never reaches logs.
impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
