//! Wire envelopes shared by every handler.

use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Error envelope returned for every failed request.
///
/// The `code` strings are part of the client contract and are matched by the
/// frontend; they change only with a coordinated client release.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Always `false` for errors.
    pub success: bool,
    /// Stable machine-readable error code.
    pub code: Cow<'static, str>,
    /// Human-readable message safe for client display.
    pub error: Cow<'static, str>,
    /// HTTP status code (not serialized).
    #[serde(skip)]
    pub status: StatusCode,
}

impl ErrorResponse {
    pub const BAD_REQUEST: Self = Self::new(
        "BadRequest",
        "The request could not be processed",
        StatusCode::BAD_REQUEST,
    );
    pub const INVALID_CREDENTIALS: Self = Self::new(
        "InvalidCredentials",
        "There is no user with such credentials",
        StatusCode::UNAUTHORIZED,
    );
    pub const INVALID_ACCESS_TOKEN: Self = Self::new(
        "InvalidAccessToken",
        "The access token is invalid",
        StatusCode::UNAUTHORIZED,
    );
    pub const INVALID_REFRESH_TOKEN: Self = Self::new(
        "InvalidRefreshToken",
        "The refresh token is invalid",
        StatusCode::UNAUTHORIZED,
    );
    pub const NOT_FOUND: Self = Self::new(
        "NotFound",
        "The requested resource was not found",
        StatusCode::NOT_FOUND,
    );
    pub const CREDENTIALS_EXISTS: Self = Self::new(
        "CredentialsExists",
        "A user with such credentials already exists",
        StatusCode::CONFLICT,
    );
    pub const INTERNAL_ERROR: Self = Self::new(
        "InternalError",
        "An internal server error occurred. Please try again later",
        StatusCode::INTERNAL_SERVER_ERROR,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(code: &'static str, error: &'static str, status: StatusCode) -> Self {
        Self {
            success: false,
            code: Cow::Borrowed(code),
            error: Cow::Borrowed(error),
            status,
        }
    }

    /// Replaces the human-readable message.
    pub fn with_error(mut self, error: impl Into<Cow<'static, str>>) -> Self {
        self.error = error.into();
        self
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// Success envelope for operations with no payload of their own.
#[must_use]
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
    /// Short confirmation message.
    pub message: Cow<'static, str>,
}

impl SuccessResponse {
    /// Creates a success envelope with the given message.
    #[inline]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

impl IntoResponse for SuccessResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
