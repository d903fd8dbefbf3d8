use actix_web::{dev::Payload, FromRequest, HttpRequest};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use std::future::{ready, Ready};

use crate::error::ApiError;

pub const ACCESS_TOKEN_KEY: &str = "ACCESS_TOKEN_KEY";
pub const REFRESH_TOKEN_KEY: &str = "REFRESH_TOKEN_KEY";
pub const DEFAULT_ACCESS_TOKEN_AGE: i64 = 3000; // seconds

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("{0} not set")]
    MissingKey(&'static str),
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("blocking task failed")]
    Blocking(#[from] actix_web::error::BlockingError),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // user id
    pub username: String,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>, // refresh tokens carry none
    pub jti: String,
}

fn key(var: &'static str) -> Result<String, AuthError> {
    env::var(var).map_err(|_| AuthError::MissingKey(var))
}

fn access_token_age() -> i64 {
    env::var("ACCESS_TOKEN_AGE").ok().and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_ACCESS_TOKEN_AGE)
}

fn sign(claims: &Claims, var: &'static str) -> Result<String, AuthError> {
    let secret = key(var)?;
    Ok(encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))?)
}

fn claims_for(user_id: &str, username: &str, exp: Option<i64>) -> Claims {
    Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        iat: chrono::Utc::now().timestamp(),
        exp,
        jti: uuid::Uuid::new_v4().simple().to_string(),
    }
}

/// Short-lived token presented on authenticated routes.
pub fn create_access_token(user_id: &str, username: &str) -> Result<String, AuthError> {
    let exp = chrono::Utc::now().timestamp() + access_token_age();
    sign(&claims_for(user_id, username, Some(exp)), ACCESS_TOKEN_KEY)
}

/// Non-expiring token; validity is governed by the authentication store.
pub fn create_refresh_token(user_id: &str, username: &str) -> Result<String, AuthError> {
    sign(&claims_for(user_id, username, None), REFRESH_TOKEN_KEY)
}

pub fn decode_access_token(token: &str) -> Result<Claims, AuthError> {
    let secret = key(ACCESS_TOKEN_KEY)?;
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
    Ok(data.claims)
}

pub fn decode_refresh_token(token: &str) -> Result<Claims, AuthError> {
    let secret = key(REFRESH_TOKEN_KEY)?;
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
    Ok(data.claims)
}

fn bcrypt_cost() -> u32 {
    env::var("BCRYPT_COST").ok().and_then(|v| v.parse().ok()).unwrap_or(bcrypt::DEFAULT_COST)
}

pub async fn hash_password(password: String) -> Result<String, AuthError> {
    let cost = bcrypt_cost();
    Ok(actix_web::web::block(move || bcrypt::hash(password, cost)).await??)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    Ok(actix_web::web::block(move || bcrypt::verify(password, &hash)).await??)
}

/// Extractor yielding the validated access token `Claims`.
pub struct Auth(pub Claims);

impl Auth {
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }
}

impl FromRequest for Auth {
    type Error = ApiError;
    type Future = Ready<Result<Self, ApiError>>;

    fn from_request(req: &HttpRequest, pl: &mut Payload) -> Self::Future {
        // Delegate to BearerAuth to parse the header.
        let Ok(bearer) = BearerAuth::from_request(req, pl).into_inner() else {
            return ready(Err(ApiError::Unauthorized("Missing authentication".into())));
        };
        match decode_access_token(bearer.token()) {
            Ok(claims) => ready(Ok(Auth(claims))),
            Err(AuthError::MissingKey(var)) => {
                tracing::error!("{var} not configured");
                ready(Err(ApiError::Internal))
            }
            Err(e) => {
                tracing::debug!("rejected access token: {e}");
                ready(Err(ApiError::Unauthorized("access token tidak valid".into())))
            }
        }
    }
}
