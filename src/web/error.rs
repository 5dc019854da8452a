use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::CryptError,
    error::log_error,
    mail::MailError,
    model::{DatabaseError, ResourceType},
    payment::PaymentError,
    web::UserRole,
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("RegistrationUserConflict")]
    RegistrationUserConflict,

    #[error("RegistrationInvalid: {reason}")]
    RegistrationInvalid { reason: String },
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationTokenInvalid, source: {source_name}. Error: {error}")]
    AuthenticationTokenInvalid {
        source_name: String,
        error: jsonwebtoken::errors::Error,
    },

    #[error("AuthenticationTokenMalformed, source: {source_name}")]
    AuthenticationTokenMalformed { source_name: String },

    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,

    #[error("AuthenticationRoleForbidden, required: {required}")]
    AuthenticationRoleForbidden { required: UserRole },
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceForbidden: {resource_type:?}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceBadRequest: {resource_type:?}, {reason}")]
    ResourceBadRequest {
        resource_type: ResourceType,
        reason: String,
    },

    #[error("ResourceConflict: {resource_type:?}, {reason}")]
    ResourceConflict {
        resource_type: ResourceType,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum PaymentFlowError {
    #[error("PaymentVerificationFailed: {reason}")]
    PaymentVerificationFailed { reason: String },

    #[error("PaymentGatewayError: {0}")]
    PaymentGatewayError(#[from] PaymentError),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] CryptError),

    #[error("ServerMailError: {0}")]
    ServerMailError(#[from] MailError),

    #[error("ServerIoError: {0}")]
    ServerIoError(#[from] std::io::Error),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServerMailError(_) => StatusCode::BAD_GATEWAY,
            Self::ServerCryptError(_) | Self::ServerIoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ServerMailError(_) => String::from("Unable to send email, try again later."),
            _ => String::from("Internal server error."),
        }
    }
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RegistrationUserConflict => StatusCode::CONFLICT,
            Self::RegistrationInvalid { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RegistrationUserConflict => {
                String::from("Registration error, user already exists.")
            }
            Self::RegistrationInvalid { reason } => format!("Registration error, {reason}."),
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::AuthenticationTokenInvalid { .. } => StatusCode::UNAUTHORIZED,
            Self::AuthenticationTokenMalformed { .. } => StatusCode::UNAUTHORIZED,
            Self::AuthenticationInvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AuthenticationRoleForbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationTokenInvalid { .. } | Self::AuthenticationTokenMalformed { .. } => {
                String::from("Authentication error, token is invalid.")
            }
            Self::AuthenticationRequired => String::from("Authentication required."),
            Self::AuthenticationInvalidCredentials => {
                String::from("Authentication error, user not found or password is invalid.")
            }
            Self::AuthenticationRoleForbidden { required } => {
                format!("This is a protected route for {required}s only.")
            }
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { .. } => String::from("Resource error, resource not found."),
            Self::ResourceForbidden { .. } => String::from("Resource error, resource forbidden."),
            Self::ResourceFetchError { .. } => {
                String::from("Resource error, unable to fetch resource.")
            }
            Self::ResourceBadRequest { reason, .. } => reason.clone(),
            Self::ResourceConflict { reason, .. } => reason.clone(),
        }
    }
}

impl PaymentFlowError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::PaymentVerificationFailed { .. } => StatusCode::BAD_REQUEST,
            Self::PaymentGatewayError(PaymentError::InvalidAmount(_)) => StatusCode::BAD_REQUEST,
            Self::PaymentGatewayError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::PaymentVerificationFailed { .. } => String::from("Payment Failed"),
            Self::PaymentGatewayError(PaymentError::InvalidAmount(_)) => {
                String::from("Payment error, invalid order amount.")
            }
            Self::PaymentGatewayError(_) => String::from("Could not initiate order."),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("RegistrationError - {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("PaymentError - {0}")]
    PaymentError(#[from] PaymentFlowError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    /// Maps an ownership check failure to 403, anything else to a fetch error.
    pub fn resource_access_error(r#type: ResourceType, error: DatabaseError) -> Self {
        if let DatabaseError::Forbidden = error {
            Self::resource_forbidden(r#type)
        } else {
            Self::resource_fetch_error(r#type, error)
        }
    }

    pub fn resource_bad_request<S: Into<String>>(r#type: ResourceType, reason: S) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            resource_type: r#type,
            reason: reason.into(),
        })
    }

    pub fn resource_conflict<S: Into<String>>(r#type: ResourceType, reason: S) -> Self {
        Self::ResourceError(ResourceError::ResourceConflict {
            resource_type: r#type,
            reason: reason.into(),
        })
    }

    pub fn auth_token_invalid<S: Into<String>>(
        source_name: S,
        error: jsonwebtoken::errors::Error,
    ) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenInvalid {
            source_name: source_name.into(),
            error,
        })
    }

    pub fn auth_token_malformed<S: Into<String>>(source_name: S) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenMalformed {
            source_name: source_name.into(),
        })
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn role_forbidden(required: UserRole) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRoleForbidden { required })
    }

    pub fn registration_conflict() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationUserConflict)
    }

    pub fn registration_invalid<S: Into<String>>(reason: S) -> Self {
        Self::RegistrationError(RegistrationError::RegistrationInvalid {
            reason: reason.into(),
        })
    }

    pub fn payment_failed<S: Into<String>>(reason: S) -> Self {
        Self::PaymentError(PaymentFlowError::PaymentVerificationFailed {
            reason: reason.into(),
        })
    }

    pub fn payment_gateway_error(e: PaymentError) -> Self {
        Self::PaymentError(PaymentFlowError::PaymentGatewayError(e))
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn server_mail_error(e: MailError) -> Self {
        Self::ServerError(ServerError::ServerMailError(e))
    }

    pub fn server_io_error(e: std::io::Error) -> Self {
        Self::ServerError(ServerError::ServerIoError(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::RegistrationError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::PaymentError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::RegistrationError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::PaymentError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();

        let body = ErrorResponse {
            success: false,
            message: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}
