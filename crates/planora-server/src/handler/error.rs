//! HTTP error handling for the request handlers.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;
use crate::repository::RepositoryError;

/// The error type produced by handlers and the session service.
///
/// Wraps an [`ErrorKind`] with an optional message override. The codec-level
/// token errors never appear here: every call site remaps them into the
/// flow-specific kind before they can reach a client.
#[derive(Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error {
    kind: ErrorKind,
    message: Option<Cow<'static, str>>,
}

impl Error {
    /// Creates a new [`Error`] with the specified kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Overrides the default user-facing message for this error.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message override if present.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("status", &self.kind.status_code())
            .field("message", &self.message)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let response = self.kind.response();
        let message = self.message.as_deref().unwrap_or(&response.error);
        write!(f, "{} ({}): {}", response.code, response.status, message)
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let mut response = self.kind.response();
        if let Some(message) = self.message {
            response = response.with_error(message);
        }
        response.into_response()
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<RepositoryError> for Error {
    /// Default mapping for repository failures reached via `?`.
    ///
    /// Flows with an opacity requirement (sign-in) match repository results
    /// explicitly instead of using this conversion.
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => ErrorKind::NotFound.into_error(),
            RepositoryError::DuplicateEmail => ErrorKind::CredentialsExists.into_error(),
            RepositoryError::Storage(_) => ErrorKind::InternalError.into_error(),
        }
    }
}

/// A specialized [`Result`] type for HTTP operations.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Enumeration of all error kinds a request can fail with.
///
/// The wire code strings and the status mapping live in
/// [`ErrorKind::response`]; handlers never pick status codes themselves.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400 - Malformed input, already-verified account, bad verification or
    /// invite token.
    BadRequest,
    /// 401 - Sign-in failure. Deliberately identical for "no such account"
    /// and "wrong password" so responses do not leak account existence.
    InvalidCredentials,
    /// 401 - Identity gate rejection.
    InvalidAccessToken,
    /// 401 - Refresh flow rejection.
    InvalidRefreshToken,
    /// 404 - Resource lookup came back empty.
    NotFound,
    /// 409 - Sign-up collision with an existing account.
    CredentialsExists,
    /// 500 - Unexpected collaborator failure.
    #[default]
    InternalError,
}

impl ErrorKind {
    /// Converts this error kind into a full [`Error`].
    #[inline]
    pub fn into_error(self) -> Error {
        Error::new(self)
    }

    /// Creates an [`Error`] with a message override.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Error {
        Error::new(self).with_message(message)
    }

    /// Returns the HTTP status code for this error kind.
    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.response().status
    }

    /// Returns the wire representation of this error kind.
    #[inline]
    pub fn response(self) -> ErrorResponse {
        match self {
            Self::BadRequest => ErrorResponse::BAD_REQUEST,
            Self::InvalidCredentials => ErrorResponse::INVALID_CREDENTIALS,
            Self::InvalidAccessToken => ErrorResponse::INVALID_ACCESS_TOKEN,
            Self::InvalidRefreshToken => ErrorResponse::INVALID_REFRESH_TOKEN,
            Self::NotFound => ErrorResponse::NOT_FOUND,
            Self::CredentialsExists => ErrorResponse::CREDENTIALS_EXISTS,
            Self::InternalError => ErrorResponse::INTERNAL_ERROR,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.response().code)
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}
