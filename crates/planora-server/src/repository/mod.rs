//! Principal persistence contract.
//!
//! The token machinery treats accounts as opaque numeric subjects; this
//! module defines the narrow repository seam through which the session
//! flows read and mutate them. Real persistence lives behind the trait;
//! the in-memory implementation here backs tests and local runs.

mod memory;

use serde::Serialize;
use thiserror::Error;

pub use self::memory::InMemoryPrincipals;

/// Result type for repository operations.
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Failures of the principal repository collaborator.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No principal matched the lookup.
    #[error("principal not found")]
    NotFound,

    /// The email address is already registered.
    #[error("a principal with this email already exists")]
    DuplicateEmail,

    /// The underlying storage failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Privilege level of a principal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[derive(strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PrincipalRole {
    /// Regular account.
    #[default]
    User,
    /// Full administrative privileges.
    Admin,
    /// Workspace moderation privileges.
    Moderator,
}

/// An authenticated account.
///
/// The password hash never serializes: every response that carries a
/// principal goes out with the hash stripped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Unique numeric account id; the subject of access, refresh and
    /// verification tokens.
    pub id: i64,
    /// Display name for UI and communications.
    pub username: String,
    /// Primary email for authentication and communications.
    pub email: String,
    /// Optional URL to a profile avatar image.
    pub image: Option<String>,
    /// Privilege level.
    pub role: PrincipalRole,
    /// Email ownership confirmation status.
    pub is_verified: bool,
    /// Argon2id PHC hash of the account password.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Data for creating a new principal.
///
/// The password arrives already hashed; the repository never sees
/// plaintext credentials.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    /// Display name.
    pub username: String,
    /// Primary email; unique across principals.
    pub email: String,
    /// Argon2id PHC hash of the account password.
    pub password_hash: String,
}

/// Repository contract for principal storage.
///
/// One flow issues at most one mutating call plus one read-back; no
/// multi-statement transactional guarantee is offered or needed here.
#[async_trait::async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Finds a principal by email address.
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Principal>>;

    /// Finds a principal by its numeric id.
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Principal>>;

    /// Creates a new, unverified principal.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::DuplicateEmail`] if the email address is
    /// already registered.
    async fn create(&self, new_principal: NewPrincipal) -> RepositoryResult<Principal>;

    /// Marks the principal's email address as verified.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if no principal has this id.
    async fn mark_verified(&self, id: i64) -> RepositoryResult<()>;
}
