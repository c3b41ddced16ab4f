// Error type shared by both thermostat API families. The variants map onto
// the categories the menu reports separately: bad credentials, unreachable
// host, timeout, and everything else the vendor or transport can throw.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Vendor rejected the credentials (login error code or HTTP 401/403).
    #[error("Invalid credentials")]
    Auth,

    #[error("Could not connect to the API: {0}")]
    Connection(String),

    #[error("The API request timed out")]
    Timeout,

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Request reached the vendor but the payload reported a failure.
    #[error("API reported error code {0}")]
    ErrorCode(i64),

    #[error("Unexpected response from API: {0}")]
    Decode(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Not logged in")]
    NotLoggedIn,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::Timeout;
        }
        if err.is_connect() {
            return ApiError::Connection(err.to_string());
        }
        if let Some(status) = err.status() {
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return ApiError::Auth;
            }
        }
        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }
        ApiError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
