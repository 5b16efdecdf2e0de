//! Authentication decision for a single request.
//!
//! This is the framework-free half of the gate: it sees the matched route and
//! the raw `Authorization` header and decides whether to forward the request
//! (with or without identity) or reject it. [`crate::middleware::auth_gate`]
//! adapts it to actix.

use std::fmt;
use std::sync::Arc;

use actix_web::http::header::HeaderValue;

use crate::auth::claims::RequestClaims;
use crate::auth::clock::{Clock, SystemClock};
use crate::auth::exempt::ExemptRoutes;
use crate::auth::jwt::{TokenDecoder, TokenRejection};
use crate::state::security_config::SecurityConfig;

const BEARER: &str = "Bearer";

/// The route a request resolved to.
#[derive(Debug, Clone, Copy)]
pub struct RouteMatch<'a> {
    /// Registered resource pattern, when the router knows one.
    pub pattern: Option<&'a str>,
    pub path: &'a str,
}

impl<'a> RouteMatch<'a> {
    pub fn path(path: &'a str) -> Self {
        Self {
            pattern: None,
            path,
        }
    }
}

#[derive(Debug)]
pub enum GateOutcome {
    /// Route is exempt; the header was not read.
    Bypassed,
    /// No token presented.
    Anonymous,
    Authenticated(RequestClaims),
    Rejected(TokenRejection),
}

impl GateOutcome {
    /// Claim bag for a forwarded request. `None` for rejections.
    pub fn into_claims(self) -> Option<RequestClaims> {
        match self {
            GateOutcome::Bypassed | GateOutcome::Anonymous => Some(RequestClaims::default()),
            GateOutcome::Authenticated(claims) => Some(claims),
            GateOutcome::Rejected(_) => None,
        }
    }
}

pub struct Gatekeeper {
    decoder: TokenDecoder,
    exemptions: ExemptRoutes,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Gatekeeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gatekeeper")
            .field("decoder", &self.decoder)
            .field("exemptions", &self.exemptions)
            .finish_non_exhaustive()
    }
}

impl Gatekeeper {
    pub fn new(decoder: TokenDecoder, exemptions: ExemptRoutes, clock: Arc<dyn Clock>) -> Self {
        Self {
            decoder,
            exemptions,
            clock,
        }
    }

    /// Gatekeeper over the system clock, honouring the configured signature policy.
    pub fn from_security(security: &SecurityConfig, exemptions: ExemptRoutes) -> Self {
        Self::new(
            TokenDecoder::new(security),
            exemptions,
            Arc::new(SystemClock),
        )
    }

    pub fn decoder(&self) -> &TokenDecoder {
        &self.decoder
    }

    pub fn exemptions(&self) -> &ExemptRoutes {
        &self.exemptions
    }

    pub fn is_exempt(&self, route: RouteMatch<'_>) -> bool {
        route
            .pattern
            .is_some_and(|pattern| self.exemptions.is_exempt(pattern))
            || self.exemptions.is_exempt(route.path)
    }

    pub fn authenticate(
        &self,
        route: RouteMatch<'_>,
        authorization: Option<&HeaderValue>,
    ) -> GateOutcome {
        if self.is_exempt(route) {
            return GateOutcome::Bypassed;
        }

        let Some(value) = authorization else {
            return GateOutcome::Anonymous;
        };

        let Ok(value) = value.to_str() else {
            return GateOutcome::Rejected(TokenRejection::UnreadableHeader);
        };

        let token = bearer_token(value);
        if token.is_empty() {
            return GateOutcome::Anonymous;
        }

        match self.decoder.decode(token, self.clock.unix_seconds()) {
            Ok(claims) => GateOutcome::Authenticated(RequestClaims::from(claims)),
            Err(rejection) => GateOutcome::Rejected(rejection),
        }
    }
}

/// Raw token from an `Authorization` header value.
///
/// Strips the case-sensitive `Bearer ` prefix. A bare `Bearer` (whose
/// trailing space the HTTP layer may have trimmed) yields an empty token. A
/// value without the prefix is returned whole.
pub fn bearer_token(value: &str) -> &str {
    let value = value.trim();
    if value == BEARER {
        return "";
    }

    value
        .strip_prefix(BEARER)
        .and_then(|rest| rest.strip_prefix(' '))
        .unwrap_or(value)
        .trim()
}
