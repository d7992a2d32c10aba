//! One-way credential hashing and verification using Argon2id.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use rand::rngs::OsRng;

/// Tracing target for credential hashing operations.
const TRACING_TARGET: &str = "planora_auth::hasher";

/// One-way hashing and verification of plaintext secrets.
///
/// Uses Argon2id with the library's default parameters (19 MiB memory,
/// 2 iterations, 1 lane, per the OWASP recommendation) and a fresh random
/// salt per hash, producing PHC strings suitable for long-term storage.
///
/// Hashing never fails under contract: with valid parameters the only
/// failure modes are catastrophic (operating system RNG unavailable), which
/// are treated as process-fatal rather than reported. Verification never
/// fails either: any mismatch or malformed stored hash is simply `false`.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Creates a hasher with the default Argon2id configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes a plaintext secret with a fresh random salt.
    ///
    /// Two hashes of the same secret differ (unique salts); equality is only
    /// observable through [`verify`](Self::verify).
    ///
    /// # Panics
    ///
    /// Panics if the operating system RNG is unavailable. That situation is
    /// unrecoverable for an authentication service and is deliberately fatal
    /// instead of surfacing as a per-request error.
    pub fn hash(&self, secret: &str) -> String {
        let salt = SaltString::try_from_rng(&mut OsRng)
            .expect("operating system RNG must be available");

        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .expect("Argon2id hashing with default parameters cannot fail")
            .to_string()
    }

    /// Verifies a plaintext secret against a stored PHC hash string.
    ///
    /// Returns `false` for a wrong secret and for any malformed stored hash;
    /// it never raises. The comparison is timing-safe.
    #[must_use]
    pub fn verify(&self, secret: &str, stored_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %e,
                    "stored credential hash is not a valid PHC string"
                );
                return false;
            }
        };

        self.argon2
            .verify_password(secret.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Verifies a throwaway secret to equalize timing when no account exists.
    ///
    /// Performs the same cryptographic work as a real verification so that
    /// sign-in latency does not reveal whether an email address is
    /// registered. Always returns `false`.
    pub fn verify_dummy(&self, secret: &str) -> bool {
        use rand::Rng;

        let dummy: String = (0..24)
            .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
            .collect();

        let dummy_hash = self.hash(&dummy);
        let _ = self.verify(secret, &dummy_hash);
        false
    }
}
