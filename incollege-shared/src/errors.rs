use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::result::DatabaseErrorKind;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Coarse error classes every caller can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    ResourceExhausted,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ResourceExhausted => "resource_exhausted",
            Self::Internal => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: User, profile and experience errors
/// - E3xxx: Connection errors
/// - E4xxx: Job errors
/// - E5xxx: Messaging errors
/// - E6xxx: Preference errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    InvalidInput,
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    ResourceExhausted,

    // Auth (E1xxx)
    InvalidCredentials,
    TokenExpired,
    TokenInvalid,

    // User (E2xxx)
    UsernameTaken,
    UserLimitReached,
    UserNotFound,
    ProfileNotFound,
    ExperienceLimitReached,
    ExperienceNotFound,

    // Connections (E3xxx)
    CannotConnectSelf,
    ConnectionAlreadyExists,
    NotConnected,

    // Jobs (E4xxx)
    JobNotFound,
    NotJobOwner,
    JobPostingLimitReached,
    CannotApplyOwnJob,
    AlreadyApplied,
    AlreadyMarked,
    JobNotMarked,
    InvalidSalary,

    // Messaging (E5xxx)
    CannotMessageSelf,
    ConversationExists,
    ConversationNotFound,
    MessagingNotAllowed,

    // Preferences (E6xxx)
    PreferencesNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::InvalidInput => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::Conflict => "E0006",
            Self::ResourceExhausted => "E0007",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::TokenExpired => "E1002",
            Self::TokenInvalid => "E1003",

            // User
            Self::UsernameTaken => "E2001",
            Self::UserLimitReached => "E2002",
            Self::UserNotFound => "E2003",
            Self::ProfileNotFound => "E2004",
            Self::ExperienceLimitReached => "E2005",
            Self::ExperienceNotFound => "E2006",

            // Connections
            Self::CannotConnectSelf => "E3001",
            Self::ConnectionAlreadyExists => "E3002",
            Self::NotConnected => "E3003",

            // Jobs
            Self::JobNotFound => "E4001",
            Self::NotJobOwner => "E4002",
            Self::JobPostingLimitReached => "E4003",
            Self::CannotApplyOwnJob => "E4004",
            Self::AlreadyApplied => "E4005",
            Self::AlreadyMarked => "E4006",
            Self::JobNotMarked => "E4007",
            Self::InvalidSalary => "E4008",

            // Messaging
            Self::CannotMessageSelf => "E5001",
            Self::ConversationExists => "E5002",
            Self::ConversationNotFound => "E5003",
            Self::MessagingNotAllowed => "E5004",

            // Preferences
            Self::PreferencesNotFound => "E6001",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InternalError => ErrorKind::Internal,
            Self::InvalidInput | Self::CannotConnectSelf | Self::CannotApplyOwnJob
            | Self::InvalidSalary | Self::CannotMessageSelf => ErrorKind::InvalidInput,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenExpired
            | Self::TokenInvalid => ErrorKind::Unauthorized,
            Self::Forbidden | Self::NotJobOwner | Self::MessagingNotAllowed => ErrorKind::Forbidden,
            Self::NotFound | Self::UserNotFound | Self::ProfileNotFound | Self::ExperienceNotFound
            | Self::NotConnected | Self::JobNotFound | Self::JobNotMarked
            | Self::ConversationNotFound | Self::PreferencesNotFound => ErrorKind::NotFound,
            Self::Conflict | Self::UsernameTaken | Self::ConnectionAlreadyExists
            | Self::AlreadyApplied | Self::AlreadyMarked | Self::ConversationExists => ErrorKind::Conflict,
            Self::ResourceExhausted | Self::UserLimitReached | Self::ExperienceLimitReached
            | Self::JobPostingLimitReached => ErrorKind::ResourceExhausted,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known { code: ErrorCode, message: String },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The stable class of this error, including errors raised by the store.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Known { code, .. } => code.kind(),
            AppError::Internal(_) => ErrorKind::Internal,
            AppError::Database(err) => database_error_kind(err),
        }
    }

    /// The refined error code, when one is known.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            AppError::Known { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn database_error_kind(err: &diesel::result::Error) -> ErrorKind {
    match err {
        diesel::result::Error::NotFound => ErrorKind::NotFound,
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => ErrorKind::Conflict,
        diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => ErrorKind::NotFound,
        diesel::result::Error::DatabaseError(DatabaseErrorKind::CheckViolation, _)
        | diesel::result::Error::DatabaseError(DatabaseErrorKind::NotNullViolation, _) => ErrorKind::InvalidInput,
        _ => ErrorKind::Internal,
    }
}

/// Generic code reported for store errors that carry no refined code.
fn fallback_code(kind: ErrorKind) -> ErrorCode {
    match kind {
        ErrorKind::InvalidInput => ErrorCode::InvalidInput,
        ErrorKind::Unauthorized => ErrorCode::Unauthorized,
        ErrorKind::Forbidden => ErrorCode::Forbidden,
        ErrorKind::NotFound => ErrorCode::NotFound,
        ErrorKind::Conflict => ErrorCode::Conflict,
        ErrorKind::ResourceExhausted => ErrorCode::ResourceExhausted,
        ErrorKind::Internal => ErrorCode::InternalError,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (code, message) = match self {
            AppError::Known { code, message } => (code, message),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (ErrorCode::InternalError, "internal server error".to_string())
            }
            AppError::Database(err) => {
                let message = match kind {
                    ErrorKind::NotFound => "resource not found",
                    ErrorKind::Conflict => "resource already exists",
                    ErrorKind::InvalidInput => "constraint violated",
                    _ => {
                        tracing::error!(error = %err, "database error");
                        "database error"
                    }
                };
                (fallback_code(kind), message.to_string())
            }
        };

        let body = ApiErrorResponse::new(code.code(), kind.as_str(), message);
        (kind.status_code(), Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
