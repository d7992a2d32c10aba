//! Validated JSON extractor with automatic validation.

use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::handler::{Error, ErrorKind};

/// JSON extractor that validates the body after deserializing it.
///
/// Works with any type implementing both `serde::Deserialize` and
/// `validator::Validate`. Malformed JSON and failed validation both answer
/// with the `BadRequest` envelope.
///
/// Also see [`Json`].
///
/// [`Json`]: axum::extract::Json
#[must_use]
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    /// Returns the inner validated value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(data) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "json deserialization failed");
                ErrorKind::BadRequest.with_message(rejection.body_text())
            })?;

        data.validate()?;
        Ok(Self(data))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let fields: Vec<&str> = field_errors
            .keys()
            .map(|field| field.as_ref())
            .collect();

        tracing::warn!(
            errors = ?errors.field_errors(),
            "request validation failed"
        );

        ErrorKind::BadRequest.with_message(format!("Invalid fields: {}", fields.join(", ")))
    }
}
