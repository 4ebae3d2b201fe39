use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::{debug, error};
use miniapp_engine::{helpers::InitDataError, AuthApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Malformed launch data. {0}")]
    MalformedInput(String),
    #[error("authentication failed")]
    Unauthenticated(#[from] AuthError),
    #[error("Another sign-in for this account is in flight. Retry the request.")]
    Conflict,
    #[error("The storage backend is unavailable.")]
    StorageUnavailable,
    #[error("The storage backend timed out.")]
    Timeout,
    #[error("Could not sign access token. {0}")]
    InternalSigningFault(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InternalSigningFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // One constant shape for every authentication failure. The precise cause is logged,
            // never returned, so callers cannot probe the verifier.
            Self::Unauthenticated(cause) => {
                debug!("🔐️ Authentication failure: {cause}");
                "authentication failed".to_string()
            },
            Self::InternalSigningFault(detail) => {
                error!("🔐️ Token signing backend fault: {detail}");
                "internal server error".to_string()
            },
            Self::InitializeError(_) | Self::ConfigurationError(_) | Self::IOError(_) | Self::Unspecified(_) => {
                error!("{self}");
                "internal server error".to_string()
            },
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": message }).to_string())
    }
}

/// Internal diagnostics for authentication failures. These are logged; the client only ever sees
/// the constant `authentication failed` body.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Launch data carried no signature")]
    MissingSignature,
    #[error("Launch data signature mismatch")]
    InvalidSignature,
    #[error("Bearer token missing or unreadable")]
    MissingToken,
    #[error("Bearer token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Bearer token declares a foreign signing algorithm: {0}")]
    AlgorithmMismatch(String),
    #[error("Bearer token failed validation. {0}")]
    ValidationError(String),
    #[error("Bearer token expired or not yet valid")]
    OutsideValidityWindow,
}

impl From<InitDataError> for ServerError {
    fn from(e: InitDataError) -> Self {
        match e {
            InitDataError::MissingSignature => Self::Unauthenticated(AuthError::MissingSignature),
            InitDataError::InvalidSignature => Self::Unauthenticated(AuthError::InvalidSignature),
            other => Self::MalformedInput(other.to_string()),
        }
    }
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::DuplicateUser => Self::Conflict,
            AuthApiError::Timeout => Self::Timeout,
            AuthApiError::UserNotFound => Self::NoRecordFound("user account".to_string()),
            AuthApiError::DatabaseError(e) => {
                error!("🗃️ Database error: {e}");
                Self::StorageUnavailable
            },
        }
    }
}
