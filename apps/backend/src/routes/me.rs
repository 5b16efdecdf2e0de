use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::extractors::Authenticated;

pub const ADMIN_ROLE: &str = "Admin";

/// Echo the caller's identity as seen by downstream handlers.
async fn me(user: Authenticated) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(user))
}

async fn admin_session(user: Authenticated) -> Result<HttpResponse, AppError> {
    user.require_role(ADMIN_ROLE)?;
    Ok(HttpResponse::Ok().json(user))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/me", web::get().to(me))
        .route("/admin/session", web::get().to(admin_session));
}
