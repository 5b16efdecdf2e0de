use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::auth::claims::TokenClaims;
use crate::state::security_config::{SecurityConfig, SignaturePolicy};
use crate::AppError;

/// Why the gate refused a bearer token.
///
/// The `Display` strings are the exact plain-text bodies of the 401 response.
#[derive(Debug, Error)]
pub enum TokenRejection {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    /// The header value carried bytes that are not visible ASCII.
    #[error("Invalid token")]
    UnreadableHeader,
}

impl TokenRejection {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenRejection::Expired)
    }

    /// Short machine-readable reason for log lines.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenRejection::Expired => "token_expired",
            TokenRejection::Invalid(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => "invalid_signature",
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => "invalid_algorithm",
                _ => "invalid_token",
            },
            TokenRejection::UnreadableHeader => "unreadable_header",
        }
    }
}

impl From<TokenRejection> for AppError {
    fn from(rejection: TokenRejection) -> Self {
        if rejection.is_expired() {
            AppError::unauthorized_expired_jwt()
        } else {
            AppError::unauthorized_invalid_jwt()
        }
    }
}

/// Decodes bearer tokens into [`TokenClaims`].
///
/// Expiry is checked here against a caller-supplied instant rather than by
/// `jsonwebtoken`, so a token with no `exp` claim can be told apart from a
/// structurally broken one.
#[derive(Clone)]
pub struct TokenDecoder {
    key: DecodingKey,
    validation: Validation,
    policy: SignaturePolicy,
}

impl TokenDecoder {
    /// Build a decoder honouring the configured signature policy.
    pub fn new(security: &SecurityConfig) -> Self {
        match security.signature {
            SignaturePolicy::Verify => Self::verifying(security),
            SignaturePolicy::DecodeOnly => Self::decode_only(),
        }
    }

    /// Decoder that pins the configured algorithm and checks the signature.
    pub fn verifying(security: &SecurityConfig) -> Self {
        Self {
            key: DecodingKey::from_secret(&security.jwt_secret),
            validation: structural_validation(Validation::new(security.algorithm)),
            policy: SignaturePolicy::Verify,
        }
    }

    /// Decoder that accepts any well-formed token regardless of signature.
    pub fn decode_only() -> Self {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();

        Self {
            key: DecodingKey::from_secret(&[]),
            validation: structural_validation(validation),
            policy: SignaturePolicy::DecodeOnly,
        }
    }

    pub fn policy(&self) -> SignaturePolicy {
        self.policy
    }

    /// Decode the payload without looking at `exp`.
    pub fn decode_claims(&self, token: &str) -> Result<TokenClaims, TokenRejection> {
        decode::<TokenClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenRejection::Invalid)
    }

    /// Decode the payload and reject it if it expired before `now_secs`.
    pub fn decode(&self, token: &str, now_secs: i64) -> Result<TokenClaims, TokenRejection> {
        let claims = self.decode_claims(token)?;

        if claims.is_expired_at(now_secs) {
            return Err(TokenRejection::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenDecoder")
            .field("policy", &self.policy)
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

/// Registered-claim checks are all handled by [`TokenDecoder::decode`].
fn structural_validation(mut validation: Validation) -> Validation {
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Mint a signed access token carrying `claims`, valid for `security.access_ttl`.
///
/// `iat` and `exp` on the input are overwritten.
pub fn mint_access_token(
    claims: &TokenClaims,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("Failed to get current time"))?
        .as_secs();
    let iat = i64::try_from(iat).unwrap_or(i64::MAX);
    let ttl = i64::try_from(security.access_ttl.as_secs()).unwrap_or(i64::MAX);
    let exp = iat.saturating_add(ttl);

    let claims = TokenClaims {
        iat: Some(iat),
        exp: Some(exp),
        ..claims.clone()
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
}
