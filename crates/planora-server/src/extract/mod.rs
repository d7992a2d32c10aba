//! Custom HTTP request extractors.

mod auth_subject;
mod validated_json;

pub use crate::extract::auth_subject::AuthSubject;
pub use crate::extract::validated_json::ValidateJson;
