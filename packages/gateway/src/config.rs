//! Urban API connection settings.

use crate::GatewayError;

/// Environment variable holding the Urban API base URL.
pub const BASE_URL_ENV: &str = "URBAN_API_URL";

/// Where the Urban API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrbanApiConfig {
    /// Base URL without a trailing slash (e.g. `"https://urban-api.example.org"`).
    pub base_url: String,
}

impl UrbanApiConfig {
    /// Creates a config for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the URL is blank or not
    /// `http(s)`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let base_url = base_url.into();
        let base_url = base_url.trim().trim_end_matches('/');

        if base_url.is_empty() {
            return Err(GatewayError::Config {
                message: "Urban API base URL is empty".to_string(),
            });
        }

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GatewayError::Config {
                message: format!("Urban API base URL must be http(s): {base_url}"),
            });
        }

        Ok(Self {
            base_url: base_url.to_string(),
        })
    }

    /// Reads the base URL from `URBAN_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the variable is unset or invalid.
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_var(std::env::var(BASE_URL_ENV).ok())
    }

    fn from_var(value: Option<String>) -> Result<Self, GatewayError> {
        let value = value.ok_or_else(|| GatewayError::Config {
            message: format!("{BASE_URL_ENV} environment variable not set"),
        })?;
        Self::new(value)
    }
}
