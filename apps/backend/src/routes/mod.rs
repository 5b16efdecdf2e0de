use actix_web::web;

pub mod auth;
pub mod health;
pub mod me;

/// Register every route. Middleware (including the authentication gate) is
/// wrapped around the whole `App` by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Root and health check routes: /, /health
    health::configure_routes(cfg);

    // Auth routes: /api/auth/**
    cfg.service(web::scope("/api/auth").configure(auth::configure_routes));

    // Identity routes: /api/me, /api/admin/**
    cfg.service(web::scope("/api").configure(me::configure_routes));
}
