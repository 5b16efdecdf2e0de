//! Authentication gate middleware
//!
//! Runs the [`Gatekeeper`] on every request. Forwarded requests carry a
//! [`RequestClaims`] in their extensions (empty when anonymous or exempt).
//! Expired and malformed tokens are answered here with a plain-text 401 and
//! never reach downstream services.

use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, ContentType};
use actix_web::{Error, HttpMessage, HttpResponse};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::{debug, warn};

use crate::auth::claims::RequestClaims;
use crate::auth::gate::{GateOutcome, Gatekeeper, RouteMatch};

#[derive(Clone)]
pub struct AuthGate {
    gatekeeper: Arc<Gatekeeper>,
}

impl AuthGate {
    pub fn new(gatekeeper: Arc<Gatekeeper>) -> Self {
        Self { gatekeeper }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateMiddleware {
            service,
            gatekeeper: self.gatekeeper.clone(),
        }))
    }
}

pub struct AuthGateMiddleware<S> {
    service: S,
    gatekeeper: Arc<Gatekeeper>,
}

impl<S, B> Service<ServiceRequest> for AuthGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let pattern = req.match_pattern();
        let route = RouteMatch {
            pattern: pattern.as_deref(),
            path: req.path(),
        };

        let outcome = self
            .gatekeeper
            .authenticate(route, req.headers().get(header::AUTHORIZATION));

        let claims: RequestClaims = match outcome {
            GateOutcome::Rejected(rejection) => {
                warn!(
                    url.path = %req.path(),
                    reason = rejection.reason(),
                    "bearer token rejected"
                );

                let response = HttpResponse::Unauthorized()
                    .content_type(ContentType::plaintext())
                    .body(rejection.to_string());
                let res = req.into_response(response).map_into_right_body();
                return Box::pin(async { Ok(res) });
            }
            GateOutcome::Bypassed => {
                debug!(url.path = %req.path(), "route exempt from authentication");
                RequestClaims::default()
            }
            GateOutcome::Anonymous => RequestClaims::default(),
            GateOutcome::Authenticated(claims) => claims,
        };

        // Store claims in request extensions BEFORE calling the service
        req.extensions_mut().insert(claims);

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
