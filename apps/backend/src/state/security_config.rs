use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Whether the authentication gate checks the token signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignaturePolicy {
    /// Verify the HMAC signature with the configured secret.
    #[default]
    Verify,
    /// Decode structure and expiry only. The token's authenticity must be
    /// established by a layer in front of this service.
    DecodeOnly,
}

impl SignaturePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "verify" => Some(Self::Verify),
            "decode-only" | "decode_only" => Some(Self::DecodeOnly),
            _ => None,
        }
    }
}

/// Configuration for JWT security settings
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT secret key for signing and verifying tokens
    pub jwt_secret: Vec<u8>,
    /// JWT algorithm to use (defaults to HS256)
    pub algorithm: Algorithm,
    pub signature: SignaturePolicy,
    /// Lifetime of tokens minted by the refresh endpoint
    pub access_ttl: Duration,
    /// How long past its expiry a token may still be exchanged for a new one
    pub refresh_window: Duration,
}

impl SecurityConfig {
    pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(60 * 60);
    pub const DEFAULT_REFRESH_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    /// Create a new SecurityConfig with the given JWT secret
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            signature: SignaturePolicy::Verify,
            access_ttl: Self::DEFAULT_ACCESS_TTL,
            refresh_window: Self::DEFAULT_REFRESH_WINDOW,
        }
    }

    pub fn with_signature(mut self, signature: SignaturePolicy) -> Self {
        self.signature = signature;
        self
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_window(mut self, window: Duration) -> Self {
        self.refresh_window = window;
        self
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec())
    }
}
