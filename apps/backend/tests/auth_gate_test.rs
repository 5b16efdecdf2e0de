mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web};
use backend_test_support::problem_details::assert_plain_unauthorized;
use common::{
    expired_token, fresh_token, probe, send_with, state_with, test_security, test_state, Hits,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use storefront_backend::auth::exempt::ExemptRoutes;
use storefront_backend::{RequestClaims, SecurityConfig, SignaturePolicy, TokenClaims};
use uuid::Uuid;

fn probe_routes(hits: web::Data<Hits>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(hits)
            .route("/probe", web::get().to(probe))
            .route("/open/ping", web::get().to(probe));
    }
}

fn get_probe(authorization: Option<&str>) -> actix_http::Request {
    let mut req = test::TestRequest::get().uri("/probe");
    if let Some(value) = authorization {
        req = req.insert_header(("Authorization", value));
    }
    req.to_request()
}

fn alice(id: Uuid) -> TokenClaims {
    TokenClaims {
        id: Some(id.to_string()),
        user_name: Some("alice".to_string()),
        role: Some("Admin".to_string()),
        ..TokenClaims::default()
    }
}

#[actix_web::test]
async fn test_exempt_route_ignores_authorization_header() {
    let state = state_with(
        test_security(),
        ExemptRoutes::with_defaults().allow("/open/ping"),
    );
    let hits = web::Data::new(Hits::default());

    let expired = format!("Bearer {}", expired_token(&TokenClaims::default(), 60));
    for header in ["Bearer garbage", expired.as_str()] {
        let req = test::TestRequest::get()
            .uri("/open/ping")
            .insert_header(("Authorization", header))
            .to_request();

        let resp = send_with(&state, probe_routes(hits.clone()), req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let bag: RequestClaims = test::read_body_json(resp).await;
        assert!(bag.is_empty());
    }

    assert_eq!(hits.count(), 2);
}

#[actix_web::test]
async fn test_missing_header_forwards_with_empty_claims() {
    let hits = web::Data::new(Hits::default());
    let resp = send_with(&test_state(), probe_routes(hits.clone()), get_probe(None)).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let bag: RequestClaims = test::read_body_json(resp).await;
    assert!(bag.is_empty());
    assert_eq!(hits.count(), 1);
}

#[actix_web::test]
async fn test_expired_token_is_rejected_before_downstream() {
    let hits = web::Data::new(Hits::default());
    let token = expired_token(&alice(Uuid::new_v4()), 1);

    let resp = send_with(
        &test_state(),
        probe_routes(hits.clone()),
        get_probe(Some(&format!("Bearer {token}"))),
    )
    .await;

    assert_plain_unauthorized(resp, "Token has expired").await;
    assert_eq!(hits.count(), 0);
}

#[actix_web::test]
async fn test_malformed_tokens_are_rejected() {
    let hits = web::Data::new(Hits::default());
    let valid = fresh_token(&alice(Uuid::new_v4()));
    let truncated = valid.rsplit_once('.').map(|(head, _)| head.to_string()).unwrap();

    for token in ["garbage", "a.b.c", "!!!.???.***", truncated.as_str()] {
        let resp = send_with(
            &test_state(),
            probe_routes(hits.clone()),
            get_probe(Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_plain_unauthorized(resp, "Invalid token").await;
    }

    assert_eq!(hits.count(), 0);
}

#[actix_web::test]
async fn test_valid_token_populates_named_claims() {
    let hits = web::Data::new(Hits::default());
    let id = Uuid::new_v4();
    let token = fresh_token(&alice(id));

    let resp = send_with(
        &test_state(),
        probe_routes(hits.clone()),
        get_probe(Some(&format!("Bearer {token}"))),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["userId"], id.to_string());
    assert_eq!(body["userName"], "alice");
    assert_eq!(body["role"], "Admin");
    assert_eq!(body["email"], Value::Null);
    assert_eq!(body["avatarUrl"], Value::Null);
    assert_eq!(hits.count(), 1);
}

#[actix_web::test]
async fn test_non_uuid_id_is_dropped_but_forwarded() {
    let hits = web::Data::new(Hits::default());
    let token = fresh_token(&TokenClaims {
        id: Some("not-a-uuid".to_string()),
        user_name: Some("mallory".to_string()),
        ..TokenClaims::default()
    });

    let resp = send_with(
        &test_state(),
        probe_routes(hits.clone()),
        get_probe(Some(&format!("Bearer {token}"))),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let bag: RequestClaims = test::read_body_json(resp).await;
    assert_eq!(bag.user_id, None);
    assert_eq!(bag.user_name.as_deref(), Some("mallory"));
    assert_eq!(hits.count(), 1);
}

#[actix_web::test]
async fn test_same_token_twice_yields_identical_claims() {
    let hits = web::Data::new(Hits::default());
    let token = fresh_token(&TokenClaims {
        id: Some(Uuid::new_v4().to_string()),
        email: Some("bob@example.com".to_string()),
        avatar_url: Some("https://cdn.example.com/bob.png".to_string()),
        ..TokenClaims::default()
    });
    let header = format!("Bearer {token}");

    let state = test_state();
    let first = send_with(&state, probe_routes(hits.clone()), get_probe(Some(&header))).await;
    let second = send_with(&state, probe_routes(hits.clone()), get_probe(Some(&header))).await;

    let first: RequestClaims = test::read_body_json(first).await;
    let second: RequestClaims = test::read_body_json(second).await;
    assert!(first.is_authenticated());
    assert_eq!(first, second);
}

#[actix_web::test]
async fn test_blank_bearer_behaves_like_missing_header() {
    let hits = web::Data::new(Hits::default());

    for header in ["Bearer   ", "Bearer ", "Bearer", ""] {
        let resp = send_with(&test_state(), probe_routes(hits.clone()), get_probe(Some(header))).await;
        assert_eq!(resp.status(), StatusCode::OK, "header {header:?}");

        let bag: RequestClaims = test::read_body_json(resp).await;
        assert!(bag.is_empty());
    }

    assert_eq!(hits.count(), 4);
}

#[actix_web::test]
async fn test_foreign_signature_depends_on_policy() {
    let forged = encode(
        &Header::default(),
        &TokenClaims {
            id: Some(Uuid::new_v4().to_string()),
            role: Some("Admin".to_string()),
            exp: Some(common::NOW as i64 + 600),
            ..TokenClaims::default()
        },
        &EncodingKey::from_secret(b"someone-elses-secret"),
    )
    .unwrap();
    let header = format!("Bearer {forged}");

    let hits = web::Data::new(Hits::default());
    let resp = send_with(&test_state(), probe_routes(hits.clone()), get_probe(Some(&header))).await;
    assert_plain_unauthorized(resp, "Invalid token").await;

    let decode_only = state_with(
        SecurityConfig::new(common::TEST_SECRET.as_bytes()).with_signature(SignaturePolicy::DecodeOnly),
        ExemptRoutes::with_defaults(),
    );
    let resp = send_with(&decode_only, probe_routes(hits.clone()), get_probe(Some(&header))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bag: RequestClaims = test::read_body_json(resp).await;
    assert!(bag.has_role("Admin"));
}

#[actix_web::test]
async fn test_token_without_expiry_is_expired() {
    let token = encode(
        &Header::default(),
        &TokenClaims {
            id: Some(Uuid::new_v4().to_string()),
            ..TokenClaims::default()
        },
        &EncodingKey::from_secret(common::TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let hits = web::Data::new(Hits::default());
    let resp = send_with(
        &test_state(),
        probe_routes(hits.clone()),
        get_probe(Some(&format!("Bearer {token}"))),
    )
    .await;

    assert_plain_unauthorized(resp, "Token has expired").await;
    assert_eq!(hits.count(), 0);
}

#[actix_web::test]
async fn test_mistyped_claims_are_dropped_not_rejected() {
    let payload = serde_json::json!({
        "Id": 42,
        "UserName": "alice",
        "Email": "alice@example.com",
        "Role": ["Admin", "Staff"],
        "exp": common::NOW as f64 + 60.5,
    });
    let token = encode(
        &Header::default(),
        &payload,
        &EncodingKey::from_secret(common::TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let hits = web::Data::new(Hits::default());
    let resp = send_with(
        &test_state(),
        probe_routes(hits.clone()),
        get_probe(Some(&format!("Bearer {token}"))),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let bag: RequestClaims = test::read_body_json(resp).await;
    assert_eq!(bag.user_id, None);
    assert_eq!(bag.user_name.as_deref(), Some("alice"));
    assert_eq!(bag.email.as_deref(), Some("alice@example.com"));
    assert!(bag.has_role("Admin"));
    assert_eq!(hits.count(), 1);
}

#[actix_web::test]
async fn test_rejection_still_carries_request_id() {
    let hits = web::Data::new(Hits::default());
    let resp = send_with(
        &test_state(),
        probe_routes(hits),
        get_probe(Some("Bearer nope")),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key("x-request-id"));
}
