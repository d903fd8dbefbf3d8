//! Application use cases: validation, authorization and repository calls
//! composed per request, independent of the HTTP layer.

use tracing::{debug, info};

use crate::auth::{self, AuthError};
use crate::error::ApiError;
use crate::models::*;
use crate::repo::{Repo, RepoError};
use crate::thread_detail::{format_thread_detail, ThreadDetail};

const THREAD_NOT_FOUND: &str = "thread tidak ditemukan";
const COMMENT_NOT_FOUND: &str = "komentar tidak ditemukan";
const REFRESH_TOKEN_NOT_FOUND: &str = "refresh token tidak ditemukan di database";

pub async fn register_user(repo: &dyn Repo, payload: RegisterUserRequest) -> Result<AddedUser, ApiError> {
    let reg = payload.validate()?;
    let password = auth::hash_password(reg.password).await?;
    let user = repo
        .create_user(NewUserRecord { username: reg.username, password, fullname: reg.fullname })
        .await
        .map_err(|e| match e {
            RepoError::Conflict => ApiError::BadRequest("username tidak tersedia".into()),
            other => other.into(),
        })?;
    info!(user_id = %user.id, "registered user");
    Ok(user.into())
}

pub async fn login(repo: &dyn Repo, payload: LoginRequest) -> Result<TokenPair, ApiError> {
    let (username, password) = payload.validate()?;
    let user = repo.find_user_by_username(&username).await.map_err(|e| match e {
        RepoError::NotFound => ApiError::BadRequest("username yang Anda masukkan salah".into()),
        other => other.into(),
    })?;
    if !auth::verify_password(password, user.password.clone()).await? {
        return Err(ApiError::Unauthorized("kredensial yang Anda masukkan salah".into()));
    }
    let access_token = auth::create_access_token(&user.id, &user.username)?;
    let refresh_token = auth::create_refresh_token(&user.id, &user.username)?;
    repo.add_refresh_token(&refresh_token).await?;
    Ok(TokenPair { access_token, refresh_token })
}

pub async fn refresh_access_token(repo: &dyn Repo, payload: RefreshTokenRequest) -> Result<AccessToken, ApiError> {
    let token = payload.validate()?;
    let claims = auth::decode_refresh_token(&token).map_err(|e| match e {
        AuthError::Token(_) => ApiError::BadRequest("refresh token tidak valid".into()),
        other => other.into(),
    })?;
    repo.verify_refresh_token(&token).await.map_err(|e| match e {
        RepoError::NotFound => ApiError::BadRequest(REFRESH_TOKEN_NOT_FOUND.into()),
        other => other.into(),
    })?;
    let access_token = auth::create_access_token(&claims.sub, &claims.username)?;
    Ok(AccessToken { access_token })
}

pub async fn logout(repo: &dyn Repo, payload: RefreshTokenRequest) -> Result<(), ApiError> {
    let token = payload.validate()?;
    repo.delete_refresh_token(&token).await.map_err(|e| match e {
        RepoError::NotFound => ApiError::BadRequest(REFRESH_TOKEN_NOT_FOUND.into()),
        other => other.into(),
    })
}

pub async fn add_thread(repo: &dyn Repo, payload: NewThread, owner: &str) -> Result<AddedThread, ApiError> {
    let new = payload.validate(owner)?;
    let thread = repo.create_thread(new).await.map_err(|e| ApiError::from_repo(e, "user tidak ditemukan"))?;
    info!(thread_id = %thread.id, owner, "created thread");
    Ok(thread.into())
}

pub async fn get_thread_detail(repo: &dyn Repo, thread_id: &str) -> Result<ThreadDetail, ApiError> {
    let rows = repo.thread_detail_rows(thread_id).await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(THREAD_NOT_FOUND.into()));
    }
    debug!(thread_id, rows = rows.len(), "aggregating thread detail");
    Ok(format_thread_detail(rows)?)
}

pub async fn add_comment(repo: &dyn Repo, payload: NewComment, thread_id: &str, owner: &str) -> Result<AddedComment, ApiError> {
    let new = payload.validate(thread_id, owner)?;
    repo.get_thread(thread_id).await.map_err(|e| ApiError::from_repo(e, THREAD_NOT_FOUND))?;
    let comment = repo.create_comment(new).await.map_err(|e| ApiError::from_repo(e, THREAD_NOT_FOUND))?;
    info!(comment_id = %comment.id, thread_id, owner, "created comment");
    Ok(comment.into())
}

pub async fn delete_comment(repo: &dyn Repo, thread_id: &str, comment_id: &str, owner: &str) -> Result<(), ApiError> {
    repo.get_thread(thread_id).await.map_err(|e| ApiError::from_repo(e, THREAD_NOT_FOUND))?;
    let comment = repo.get_comment(comment_id).await.map_err(|e| ApiError::from_repo(e, COMMENT_NOT_FOUND))?;
    if comment.thread_id != thread_id || comment.is_delete {
        return Err(ApiError::NotFound(COMMENT_NOT_FOUND.into()));
    }
    if comment.owner != owner {
        return Err(ApiError::Forbidden("Anda tidak berhak menghapus komentar ini".into()));
    }
    repo.soft_delete_comment(comment_id).await.map_err(|e| ApiError::from_repo(e, COMMENT_NOT_FOUND))?;
    info!(comment_id, thread_id, owner, "soft-deleted comment");
    Ok(())
}
