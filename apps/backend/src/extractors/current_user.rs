use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::claims::RequestClaims;
use crate::error::AppError;

/// Caller identity for handlers that require one.
///
/// Built from the claims the gate stored in request extensions; fails with
/// `UNAUTHORIZED_MISSING_BEARER` when no subject id was established.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Authenticated {
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
}

impl Authenticated {
    pub fn from_claims(claims: RequestClaims) -> Result<Self, AppError> {
        let user_id = claims
            .user_id
            .ok_or_else(AppError::unauthorized_missing_bearer)?;

        Ok(Self {
            user_id,
            user_name: claims.user_name,
            email: claims.email,
            avatar_url: claims.avatar_url,
            role: claims.role,
        })
    }

    /// Fail with `FORBIDDEN` unless the caller holds exactly `role`.
    pub fn require_role(&self, role: &str) -> Result<(), AppError> {
        if self.role.as_deref() == Some(role) {
            Ok(())
        } else {
            Err(AppError::forbidden())
        }
    }
}

impl FromRequest for Authenticated {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req
            .extensions()
            .get::<RequestClaims>()
            .cloned()
            .unwrap_or_default();

        Box::pin(async move { Authenticated::from_claims(claims) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_user_id() {
        let claims = RequestClaims {
            user_name: Some("eve".to_string()),
            ..RequestClaims::default()
        };
        assert!(matches!(
            Authenticated::from_claims(claims),
            Err(AppError::UnauthorizedMissingBearer)
        ));
    }

    #[test]
    fn test_require_role() {
        let user = Authenticated::from_claims(RequestClaims {
            user_id: Some(Uuid::new_v4()),
            role: Some("Staff".to_string()),
            ..RequestClaims::default()
        })
        .unwrap();

        assert!(user.require_role("Staff").is_ok());
        assert!(matches!(user.require_role("Admin"), Err(AppError::Forbidden)));
    }

    #[test]
    fn test_missing_role_is_forbidden() {
        let user = Authenticated::from_claims(RequestClaims {
            user_id: Some(Uuid::new_v4()),
            ..RequestClaims::default()
        })
        .unwrap();

        assert!(matches!(user.require_role("Admin"), Err(AppError::Forbidden)));
    }
}
