use std::time::Duration;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::claims::RequestClaims;
use crate::auth::jwt::{mint_access_token, TokenDecoder};
use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    /// Expiry of the new token (seconds since epoch)
    pub expires_at: i64,
}

/// Exchange an access token, expired or not, for a fresh one.
///
/// Reachable without passing the gate's checks. The signature is always
/// verified here, whatever policy the gate runs under, and the old token may
/// be at most `refresh_window` past its expiry.
async fn refresh_token(
    req: web::Json<RefreshRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let token = req.access_token.trim();
    if token.is_empty() {
        return Err(AppError::bad_request(
            "INVALID_ACCESS_TOKEN",
            "accessToken cannot be empty".to_string(),
        ));
    }

    let security = &app_state.security;
    let claims = TokenDecoder::verifying(security)
        .decode_claims(token)
        .map_err(AppError::from)?;

    let now = app_state.clock.unix_seconds();
    let window = window_secs(security.refresh_window);
    match claims.exp {
        Some(exp) if exp.saturating_add(window) >= now => {}
        _ => return Err(AppError::unauthorized_expired_jwt()),
    }

    let identity = RequestClaims::from(claims);
    let Some(user_id) = identity.user_id else {
        return Err(AppError::unauthorized_invalid_jwt());
    };

    let access_token = mint_access_token(&identity.to_token_claims(), app_state.clock.now(), security)?;
    let expires_at = now.saturating_add(window_secs(security.access_ttl));

    info!(user_id = %user_id, "access token refreshed");

    Ok(HttpResponse::Ok().json(RefreshResponse {
        access_token,
        expires_at,
    }))
}

fn window_secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/refresh-token", web::post().to(refresh_token));
}
