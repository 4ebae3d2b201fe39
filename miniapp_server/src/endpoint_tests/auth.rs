use actix_web::http::StatusCode;
use log::*;
use miniapp_engine::traits::AuthApiError;
use mockall::Sequence;
use serde_json::Value;

use super::{helpers::*, mocks::MockUserDb};
use crate::{auth::TokenIssuer, config::InitDataPolicy};

#[actix_web::test]
async fn first_sign_in_returns_a_validating_token() {
    let _ = env_logger::try_init().ok();
    let mut db = MockUserDb::new();
    db.expect_fetch_user_by_telegram_id().times(1).returning(|_| Ok(None));
    db.expect_insert_user().times(1).returning(|claim| Ok(stored_user(1, claim.id, "Ann")));
    let (status, body) = post_auth("/auth/telegram", SIGNED_INIT_DATA, enforced_policy(), db).await;
    info!("Response body: {body}");
    assert!(status.is_success());
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["user"]["telegram_id"], 123);
    assert_eq!(json["user"]["first_name"], "Ann");
    // The token must verify under the same signing secret and carry the resolved account.
    let claims = TokenIssuer::new(&auth_config()).validate_token(json["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.user_id, 1);
    assert_eq!(claims.telegram_id, 123);
}

#[actix_web::test]
async fn tampered_payload_gets_the_constant_401_body() {
    // Storage must never be touched: no expectations are set on the mock.
    let tampered = SIGNED_INIT_DATA.replace("Ann", "Abn");
    let (status, body) = post_auth("/auth/telegram", &tampered, enforced_policy(), MockUserDb::new()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, CONSTANT_401_BODY);
}

#[actix_web::test]
async fn missing_signature_gets_the_same_constant_body() {
    let unsigned = "auth_date=1700000000&user=%7B%22id%22%3A123%2C%22first_name%22%3A%22Ann%22%7D";
    let (status, body) = post_auth("/auth/telegram", unsigned, enforced_policy(), MockUserDb::new()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, CONSTANT_401_BODY);
}

#[actix_web::test]
async fn empty_launch_data_is_a_bad_request() {
    let (status, body) = post_auth("/auth/telegram", "", enforced_policy(), MockUserDb::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Malformed launch data"), "was: {body}");
}

#[actix_web::test]
async fn returning_user_with_changed_profile_is_updated_not_inserted() {
    let mut db = MockUserDb::new();
    db.expect_fetch_user_by_telegram_id().times(1).returning(|_| Ok(Some(stored_user(9, 123, "Anne"))));
    db.expect_update_user_profile().times(1).returning(|id, claim| {
        assert_eq!(id, 9);
        Ok(stored_user(id, claim.id, claim.first_name.as_deref().unwrap()))
    });
    let (status, body) = post_auth("/auth/telegram", SIGNED_INIT_DATA, enforced_policy(), db).await;
    assert!(status.is_success());
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["user"]["id"], 9);
    assert_eq!(json["user"]["first_name"], "Ann");
}

#[actix_web::test]
async fn losing_the_first_sign_in_race_still_succeeds() {
    let mut db = MockUserDb::new();
    let mut seq = Sequence::new();
    db.expect_fetch_user_by_telegram_id().times(1).in_sequence(&mut seq).returning(|_| Ok(None));
    db.expect_insert_user().times(1).in_sequence(&mut seq).returning(|_| Err(AuthApiError::DuplicateUser));
    db.expect_fetch_user_by_telegram_id()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(Some(stored_user(3, 123, "Ann"))));
    let (status, body) = post_auth("/auth/telegram", SIGNED_INIT_DATA, enforced_policy(), db).await;
    assert!(status.is_success(), "was: {status} {body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["user"]["id"], 3);
}

#[actix_web::test]
async fn unresolvable_race_is_a_retryable_conflict() {
    let mut db = MockUserDb::new();
    db.expect_fetch_user_by_telegram_id().times(2).returning(|_| Ok(None));
    db.expect_insert_user().times(1).returning(|_| Err(AuthApiError::DuplicateUser));
    let (status, body) = post_auth("/auth/telegram", SIGNED_INIT_DATA, enforced_policy(), db).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("Retry the request"), "was: {body}");
}

#[actix_web::test]
async fn storage_trouble_maps_to_service_unavailable() {
    let mut db = MockUserDb::new();
    db.expect_fetch_user_by_telegram_id()
        .times(1)
        .returning(|_| Err(AuthApiError::DatabaseError("connection refused".into())));
    let (status, body) = post_auth("/auth/telegram", SIGNED_INIT_DATA, enforced_policy(), db).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("storage backend is unavailable"), "was: {body}");
}

#[actix_web::test]
async fn storage_timeout_maps_to_gateway_timeout() {
    let mut db = MockUserDb::new();
    db.expect_fetch_user_by_telegram_id().times(1).returning(|_| Err(AuthApiError::Timeout));
    let (status, body) = post_auth("/auth/telegram", SIGNED_INIT_DATA, enforced_policy(), db).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body.contains("timed out"), "was: {body}");
}

#[actix_web::test]
async fn disabled_checks_accept_an_unsigned_payload() {
    let unsigned = "auth_date=1700000000&user=%7B%22id%22%3A123%2C%22first_name%22%3A%22Ann%22%7D";
    let mut db = MockUserDb::new();
    db.expect_fetch_user_by_telegram_id().times(1).returning(|_| Ok(None));
    db.expect_insert_user().times(1).returning(|claim| Ok(stored_user(1, claim.id, "Ann")));
    let (status, _) = post_auth("/auth/telegram", unsigned, InitDataPolicy::DisabledForTesting, db).await;
    assert!(status.is_success());
}

#[actix_web::test]
async fn flat_parameter_shim_works_in_test_mode() {
    let mut db = MockUserDb::new();
    db.expect_fetch_user_by_telegram_id().times(1).returning(|_| Ok(None));
    db.expect_insert_user().times(1).returning(|claim| {
        assert_eq!(claim.username.as_deref(), Some("ann"));
        Ok(stored_user(1, claim.id, "Ann"))
    });
    let (status, body) =
        post_auth("/auth/telegram/test", "user_id=42&username=ann&first_name=Ann", InitDataPolicy::DisabledForTesting, db)
            .await;
    assert!(status.is_success());
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["user"]["telegram_id"], 42);
}

#[actix_web::test]
async fn flat_parameter_shim_does_not_exist_when_enforcing() {
    let (status, _) =
        post_auth("/auth/telegram/test", "user_id=42&username=ann", enforced_policy(), MockUserDb::new()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
