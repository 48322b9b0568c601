//! API error types shared by the step store and deploy clients

use thiserror::Error;

/// Errors from a remote call, classified by failure mode.
///
/// `endpoint` names the logical endpoint family ("steps", "bots",
/// "matrix"), not a URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// 401 Unauthorized - API key invalid or expired
    #[error("{endpoint}: unauthorized (401)")]
    Unauthorized { endpoint: String },

    /// 403 Forbidden - API key lacks required permissions
    #[error("{endpoint}: forbidden (403)")]
    Forbidden { endpoint: String },

    /// 429 Rate Limited
    #[error("{endpoint}: rate limited{}", .retry_after_secs.map(|s| format!(" - retry after {s}s")).unwrap_or_default())]
    RateLimited {
        endpoint: String,
        retry_after_secs: Option<u64>,
    },

    /// Network or timeout error before an HTTP status was received
    #[error("{endpoint}: network error - {message}")]
    Network { endpoint: String, message: String },

    /// Any other HTTP error, including unparseable response bodies
    #[error("{endpoint}: HTTP {status} - {message}")]
    Http {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// Client not configured (no API key available)
    #[error("{endpoint}: not configured (no API key)")]
    NotConfigured { endpoint: String },
}

impl ApiError {
    pub fn unauthorized(endpoint: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            endpoint: endpoint.into(),
        }
    }

    pub fn forbidden(endpoint: impl Into<String>) -> Self {
        ApiError::Forbidden {
            endpoint: endpoint.into(),
        }
    }

    pub fn rate_limited(endpoint: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        ApiError::RateLimited {
            endpoint: endpoint.into(),
            retry_after_secs,
        }
    }

    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn http(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        ApiError::Http {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    pub fn not_configured(endpoint: impl Into<String>) -> Self {
        ApiError::NotConfigured {
            endpoint: endpoint.into(),
        }
    }

    /// Check if this is an authentication error (401 or 403)
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. }
        )
    }

    /// Check if this is a rate limiting error
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited { .. })
    }

    /// Get the logical endpoint name for this error
    pub fn endpoint(&self) -> &str {
        match self {
            ApiError::Unauthorized { endpoint }
            | ApiError::Forbidden { endpoint }
            | ApiError::RateLimited { endpoint, .. }
            | ApiError::Network { endpoint, .. }
            | ApiError::Http { endpoint, .. }
            | ApiError::NotConfigured { endpoint } => endpoint,
        }
    }
}
