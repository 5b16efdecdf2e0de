use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};

use crate::auth::claims::RequestClaims;
use crate::error::AppError;

/// The claim bag stored by the authentication gate.
///
/// Never fails: a request the gate did not see (or an anonymous one) yields an
/// empty bag.
impl FromRequest for RequestClaims {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req
            .extensions()
            .get::<RequestClaims>()
            .cloned()
            .unwrap_or_default();

        Box::pin(async move { Ok(claims) })
    }
}
