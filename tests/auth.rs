use actix_web::{dev::Payload, test, FromRequest, ResponseError};
use forum_api::auth::{
    create_access_token, create_refresh_token, decode_access_token, decode_refresh_token, hash_password,
    verify_password, Auth,
};
use serial_test::serial;
use std::env;

// Helper that guarantees sufficiently long keys for tests.
fn set_keys() {
    env::set_var("ACCESS_TOKEN_KEY", "access-secret-must-be-32-bytes-long!!");
    env::set_var("REFRESH_TOKEN_KEY", "refresh-secret-must-be-32-bytes-long!");
    env::set_var("BCRYPT_COST", "4");
    env::remove_var("ACCESS_TOKEN_AGE");
}

#[actix_web::test]
#[serial]
async fn access_token_roundtrip_through_extractor() {
    set_keys();
    let token = create_access_token("user-42", "tester").expect("token");
    let req = test::TestRequest::default()
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_http_request();
    let mut pl = Payload::None;
    let auth = Auth::from_request(&req, &mut pl).await.expect("extract");
    assert_eq!(auth.user_id(), "user-42");
    assert_eq!(auth.0.username, "tester");
    assert!(auth.0.exp.is_some());
}

#[actix_web::test]
#[serial]
async fn extractor_rejects_missing_and_invalid_tokens() {
    set_keys();
    let mut pl = Payload::None;

    let req = test::TestRequest::default().to_http_request();
    let err = Auth::from_request(&req, &mut pl).await.err().expect("missing header rejected");
    assert_eq!(err.status_code(), 401);

    let req = test::TestRequest::default()
        .insert_header(("Authorization", "Bearer notatoken"))
        .to_http_request();
    let err = Auth::from_request(&req, &mut pl).await.err().expect("garbage rejected");
    assert_eq!(err.status_code(), 401);
}

#[actix_web::test]
#[serial]
async fn refresh_tokens_are_not_access_tokens() {
    set_keys();
    let refresh = create_refresh_token("user-1", "tester").unwrap();
    let claims = decode_refresh_token(&refresh).unwrap();
    assert_eq!(claims.sub, "user-1");
    assert!(claims.exp.is_none());
    assert!(decode_access_token(&refresh).is_err());

    let access = create_access_token("user-1", "tester").unwrap();
    assert!(decode_refresh_token(&access).is_err());
}

#[actix_web::test]
#[serial]
async fn tokens_are_unique_per_issue() {
    set_keys();
    let a = create_refresh_token("user-1", "tester").unwrap();
    let b = create_refresh_token("user-1", "tester").unwrap();
    assert_ne!(a, b);
}

#[actix_web::test]
#[serial]
async fn expired_access_token_is_rejected() {
    set_keys();
    // beyond the default validation leeway
    env::set_var("ACCESS_TOKEN_AGE", "-600");
    let token = create_access_token("user-1", "tester").unwrap();
    env::remove_var("ACCESS_TOKEN_AGE");
    assert!(decode_access_token(&token).is_err());
}

#[actix_web::test]
#[serial]
async fn password_hash_and_verify() {
    set_keys();
    let hash = hash_password("secret".into()).await.unwrap();
    assert_ne!(hash, "secret");
    assert!(verify_password("secret".into(), hash.clone()).await.unwrap());
    assert!(!verify_password("wrong".into(), hash).await.unwrap());
}
