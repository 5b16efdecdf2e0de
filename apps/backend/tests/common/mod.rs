#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::{test, web, App, HttpResponse};
use storefront_backend::auth::clock::FixedClock;
use storefront_backend::auth::exempt::ExemptRoutes;
use storefront_backend::{
    mint_access_token, AppState, AuthGate, RequestClaims, RequestTrace, SecurityConfig,
    StructuredLogger, TokenClaims, TraceSpan,
};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Fixed "now" shared by the test clock and token minting.
pub const NOW: u64 = 1_700_000_000;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only";

pub fn test_security() -> SecurityConfig {
    SecurityConfig::new(TEST_SECRET.as_bytes())
}

pub fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

pub fn state_with(security: SecurityConfig, exemptions: ExemptRoutes) -> AppState {
    AppState::with_clock(security, exemptions, Arc::new(FixedClock::at_unix(NOW)))
}

pub fn test_state() -> AppState {
    state_with(test_security(), ExemptRoutes::with_defaults())
}

/// Token signed with the test secret, issued at `issued`.
pub fn token_issued_at(claims: &TokenClaims, issued: u64) -> String {
    mint_access_token(claims, at(issued), &test_security()).expect("mint token")
}

pub fn fresh_token(claims: &TokenClaims) -> String {
    token_issued_at(claims, NOW)
}

/// Token whose `exp` lies `ago` seconds before `NOW`.
pub fn expired_token(claims: &TokenClaims, ago: u64) -> String {
    let ttl = test_security().access_ttl.as_secs();
    token_issued_at(claims, NOW - ttl - ago)
}

/// Counts how often downstream handlers ran.
#[derive(Default)]
pub struct Hits(AtomicUsize);

impl Hits {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Downstream probe: records the call and echoes the claim bag.
pub async fn probe(hits: web::Data<Hits>, claims: RequestClaims) -> HttpResponse {
    hits.0.fetch_add(1, Ordering::SeqCst);
    HttpResponse::Ok().json(claims)
}

/// Build the production middleware chain around `routes` and send one request.
pub async fn send_with<F>(state: &AppState, routes: F, req: Request) -> ServiceResponse<BoxBody>
where
    F: FnOnce(&mut web::ServiceConfig),
{
    let app = test::init_service(
        App::new()
            .wrap(AuthGate::new(state.gatekeeper.clone()))
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(web::Data::new(state.clone()))
            .configure(routes),
    )
    .await;

    test::call_service(&app, req).await.map_into_boxed_body()
}

/// Send one request through the production routes.
pub async fn send(state: &AppState, req: Request) -> ServiceResponse<BoxBody> {
    send_with(state, storefront_backend::routes::configure, req).await
}
