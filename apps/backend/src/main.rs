use actix_web::{web, App, HttpServer};
use storefront_backend::config::Config;
use storefront_backend::middleware::auth_gate::AuthGate;
use storefront_backend::middleware::cors::cors_middleware;
use storefront_backend::middleware::request_trace::RequestTrace;
use storefront_backend::middleware::structured_logger::StructuredLogger;
use storefront_backend::middleware::trace_span::TraceSpan;
use storefront_backend::routes;
use storefront_backend::state::app_state::AppState;
use storefront_backend::state::security_config::SignaturePolicy;
use tracing::{error, info, warn};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file, or `set -a; . ./.env; set +a` locally).
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    if config.security.signature == SignaturePolicy::DecodeOnly {
        warn!(
            "AUTH_SIGNATURE_POLICY=decode-only: bearer token signatures are NOT verified; \
             only run this behind a layer that verifies them"
        );
    }

    let app_state = AppState::new(config.security.clone(), config.exempt_routes.clone());
    let gatekeeper = app_state.gatekeeper.clone();

    info!(
        host = %config.host,
        port = config.port,
        exempt_routes = config.exempt_routes.len(),
        "starting storefront backend"
    );

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    // Request flow: RequestTrace -> TraceSpan -> StructuredLogger -> CORS -> AuthGate -> routes
    HttpServer::new(move || {
        App::new()
            .wrap(AuthGate::new(gatekeeper.clone()))
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
