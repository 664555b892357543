#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client gateway to the Urban API.
//!
//! [`UrbanApiGateway`] is a stateless façade over an [`UrbanApiHandler`]
//! (the HTTP seam, implemented with `reqwest` by
//! [`ReqwestUrbanApiHandler`]). Each operation builds one endpoint path,
//! awaits the handler, and reshapes the JSON/`GeoJSON` response:
//!
//! - picks the best functional zone source of a scenario (`OSM`, then
//!   `PZZ`, then `User`, most recent year first),
//! - normalizes functional zone features into [`FunctionalZone`] records,
//! - reprojects the project territory into its local UTM zone,
//! - passes indicator values through untouched.
//!
//! Every failure to find data surfaces as [`GatewayError::NotFound`],
//! which carries a 404 status, a message, and the offending identifier.
//!
//! [`FunctionalZone`]: urbanomy_gateway_models::FunctionalZone

pub mod config;
pub mod gateway;
pub mod handler;
pub mod selection;
pub mod zones;

use thiserror::Error;

pub use config::UrbanApiConfig;
pub use gateway::UrbanApiGateway;
pub use handler::{ReqwestUrbanApiHandler, UrbanApiHandler};

/// Errors that can occur while talking to the Urban API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The Urban API answered with a non-success status.
    #[error("Urban API returned status {status} for {endpoint}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Endpoint path that was requested.
        endpoint: String,
    },

    /// The requested data does not exist or could not be retrieved.
    #[error("{message}: {identifier}")]
    NotFound {
        /// Human-readable description.
        message: String,
        /// The identifier (scenario id, source label, ...) that was not found.
        identifier: String,
    },

    /// A geometry could not be parsed or reprojected.
    #[error("Geometry error: {0}")]
    Geometry(#[from] urbanomy_projection::ProjectionError),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

impl GatewayError {
    /// Builds a [`GatewayError::NotFound`].
    pub fn not_found(message: impl Into<String>, identifier: impl std::fmt::Display) -> Self {
        Self::NotFound {
            message: message.into(),
            identifier: identifier.to_string(),
        }
    }

    /// HTTP-style status code for this error.
    ///
    /// `404` for [`GatewayError::NotFound`], the upstream status for
    /// [`GatewayError::Status`], `500` otherwise.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Status { status, .. } => *status,
            Self::Http(_)
            | Self::Json(_)
            | Self::Geometry(_)
            | Self::Config { .. } => 500,
        }
    }

    /// Returns `true` for [`GatewayError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
