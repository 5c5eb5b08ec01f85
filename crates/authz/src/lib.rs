//! Credential verification behind the API-key access gate.
//!
//! Requests carry a shared secret in the `apikey` query parameter. The gate only
//! answers "allowed or not"; it never distinguishes a missing key from a wrong one.

use std::fmt;
use std::sync::Arc;

use anyhow::bail;

/// Decides whether a presented credential grants access.
pub trait CredentialVerifier: Send + Sync {
    /// Short label used in logs.
    fn scheme(&self) -> &'static str;

    /// Returns `true` iff `presented` is an acceptable credential.
    fn verify(&self, presented: &str) -> bool;
}

/// Exact match against one configured shared secret.
pub struct StaticKeyVerifier {
    secret: String,
}

impl StaticKeyVerifier {
    /// Build a verifier for `secret`; an empty secret is refused so the gate can
    /// never be opened by an empty query parameter.
    pub fn new(secret: impl Into<String>) -> anyhow::Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            bail!("static API key must not be empty");
        }
        Ok(Self { secret })
    }
}

impl fmt::Debug for StaticKeyVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticKeyVerifier").finish_non_exhaustive()
    }
}

impl CredentialVerifier for StaticKeyVerifier {
    fn scheme(&self) -> &'static str {
        "static-key"
    }

    fn verify(&self, presented: &str) -> bool {
        presented == self.secret
    }
}

/// Shared handle to the configured verifier, cheap to clone into request state.
#[derive(Clone)]
pub struct AccessGate {
    verifier: Arc<dyn CredentialVerifier>,
}

impl AccessGate {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Gate backed by a [`StaticKeyVerifier`].
    pub fn static_key(secret: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(StaticKeyVerifier::new(secret)?)))
    }

    /// `true` iff a key was provided and the verifier accepts it.
    pub fn authorize(&self, provided: Option<&str>) -> bool {
        let allowed = provided.is_some_and(|key| self.verifier.verify(key));
        if !allowed {
            tracing::debug!(
                scheme = self.verifier.scheme(),
                key_present = provided.is_some(),
                "access gate rejected request"
            );
        }
        allowed
    }
}

impl fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGate")
            .field("scheme", &self.verifier.scheme())
            .finish()
    }
}
