use thiserror::Error;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Backend(#[from] BackendError),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Search backend client errors
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Connection failed to backend at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Backend returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid response from backend at {url}: {source}")]
    InvalidResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed response from backend: {message}")]
    Malformed { message: String },

    #[error("Backend client is closed")]
    Closed,
}

impl BackendError {
    /// HTTP status reported by the backend, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Upstream { status, .. } => Some(*status),
            BackendError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for failures that never produced an HTTP response
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Transport { .. } | BackendError::Closed)
    }
}

impl ServiceError {
    /// Upstream HTTP status, for diagnostics
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Backend(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ServiceError::Backend(e) if e.is_transport())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        ServiceError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Message shown to the calling agent at the tool boundary
    pub fn tool_message(&self) -> String {
        format!("Error: {}", self)
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
