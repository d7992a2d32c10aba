//! Request middleware.

mod identify;

pub use crate::middleware::identify::{RouterIdentityExt, require_identity};
