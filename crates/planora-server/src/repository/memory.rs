//! In-memory principal repository for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::sync::RwLock;

use super::{
    NewPrincipal, Principal, PrincipalRepository, PrincipalRole, RepositoryError, RepositoryResult,
};

/// Thread-safe in-memory implementation of [`PrincipalRepository`].
///
/// Ids are assigned from a monotonically increasing counter, emails are
/// matched case-insensitively like the production store's unique index.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPrincipals {
    principals: Arc<RwLock<HashMap<i64, Principal>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryPrincipals {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored principals.
    pub async fn len(&self) -> usize {
        self.principals.read().await.len()
    }

    /// Whether the repository holds no principals.
    pub async fn is_empty(&self) -> bool {
        self.principals.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl PrincipalRepository for InMemoryPrincipals {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Principal>> {
        let principals = self.principals.read().await;
        Ok(principals
            .values()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Principal>> {
        let principals = self.principals.read().await;
        Ok(principals.get(&id).cloned())
    }

    async fn create(&self, new_principal: NewPrincipal) -> RepositoryResult<Principal> {
        let mut principals = self.principals.write().await;

        let duplicate = principals
            .values()
            .any(|p| p.email.eq_ignore_ascii_case(&new_principal.email));
        if duplicate {
            return Err(RepositoryError::DuplicateEmail);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let principal = Principal {
            id,
            username: new_principal.username,
            email: new_principal.email,
            image: None,
            role: PrincipalRole::User,
            is_verified: false,
            password_hash: new_principal.password_hash,
        };

        principals.insert(id, principal.clone());
        Ok(principal)
    }

    async fn mark_verified(&self, id: i64) -> RepositoryResult<()> {
        let mut principals = self.principals.write().await;
        let principal = principals.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        principal.is_verified = true;
        Ok(())
    }
}
