use actix_web::http::StatusCode;
use mas_common::Secret;
use serde_json::Value;

use super::{helpers::*, mocks::MockUserDb};
use crate::{auth::TokenIssuer, config::AuthConfig};

#[actix_web::test]
async fn profile_without_a_token_is_unauthorized() {
    let (status, body) = get_protected("/api/profile", "", MockUserDb::new()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, CONSTANT_401_BODY);
}

#[actix_web::test]
async fn garbage_token_is_unauthorized() {
    let (status, body) = get_protected("/api/profile", "Bearer made-up-nonsense", MockUserDb::new()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, CONSTANT_401_BODY);
}

#[actix_web::test]
async fn non_bearer_scheme_is_unauthorized() {
    let user = stored_user(7, 99, "Andrew");
    let (status, body) = get_protected("/api/profile", &format!("Basic {}", issue_token(&user)), MockUserDb::new()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, CONSTANT_401_BODY);
}

#[actix_web::test]
async fn token_under_a_different_secret_is_unauthorized() {
    let other = TokenIssuer::new(&AuthConfig { jwt_secret: Secret::new("a-completely-different-secret-value".into()) });
    let token = other.issue_token(&stored_user(7, 99, "Andrew")).unwrap();
    let (status, body) = get_protected("/api/profile", &format!("Bearer {token}"), MockUserDb::new()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, CONSTANT_401_BODY);
}

#[actix_web::test]
async fn valid_token_fetches_the_caller_profile() {
    let user = stored_user(7, 99, "Andrew");
    let token = issue_token(&user);
    let mut db = MockUserDb::new();
    db.expect_fetch_user_by_id().times(1).returning(move |id| {
        assert_eq!(id, 7);
        Ok(Some(stored_user(7, 99, "Andrew")))
    });
    let (status, body) = get_protected("/api/profile", &format!("Bearer {token}"), db).await;
    assert!(status.is_success(), "was: {status} {body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["telegram_id"], 99);
    assert_eq!(json["first_name"], "Andrew");
}

#[actix_web::test]
async fn profile_for_a_vanished_account_is_not_found() {
    // Valid token, but the account row is gone. The claims were still good, so this is 404.
    let token = issue_token(&stored_user(7, 99, "Andrew"));
    let mut db = MockUserDb::new();
    db.expect_fetch_user_by_id().times(1).returning(|_| Ok(None));
    let (status, body) = get_protected("/api/profile", &format!("Bearer {token}"), db).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("user account 7"), "was: {body}");
}

#[actix_web::test]
async fn check_token_echoes_the_validated_claims() {
    let token = issue_token(&stored_user(7, 99, "Andrew"));
    let (status, body) = get_protected("/api/check_token", &format!("Bearer {token}"), MockUserDb::new()).await;
    assert!(status.is_success());
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["user_id"], 7);
    assert_eq!(json["telegram_id"], 99);
}
