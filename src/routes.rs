use std::sync::Arc;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::json;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::*;
use crate::repo::Repo;
use crate::thread_detail::ThreadDetail;
use crate::usecase;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/", web::get().to(index))
        .service(web::resource("/users").route(web::post().to(register_user)))
        .service(
            web::resource("/authentications")
                .route(web::post().to(login))
                .route(web::put().to(refresh_authentication))
                .route(web::delete().to(logout)),
        )
        .service(web::resource("/threads").route(web::post().to(create_thread)))
        .service(web::resource("/threads/{thread_id}").route(web::get().to(get_thread_detail)))
        .service(web::resource("/threads/{thread_id}/comments").route(web::post().to(create_comment)))
        .service(
            web::resource("/threads/{thread_id}/comments/{comment_id}")
                .route(web::delete().to(delete_comment)),
        )
        .default_service(web::to(not_found));
}

/// Body deserialization failures become 400 `fail` envelopes.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!("rejected JSON payload: {err}");
        ApiError::BadRequest("tidak dapat memproses permintaan karena tipe data tidak sesuai".into()).into()
    })
}

#[derive(Clone)]
pub struct AppState { pub repo: Arc<dyn Repo> }

/// `{status: "success", message?, data?}` response envelope.
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Success<T> {
    pub fn data(data: T) -> Self {
        Self { status: "success", message: None, data: Some(data) }
    }
}

impl Success<()> {
    pub fn empty() -> Self {
        Self { status: "success", message: None, data: None }
    }

    pub fn message(message: &'static str) -> Self {
        Self { status: "success", message: Some(message), data: None }
    }
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(Success::message("Hello World! Forum API is running"))
}

async fn not_found(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    tracing::debug!(path = req.path(), "no route matched");
    Err(ApiError::NotFound("resource tidak ditemukan".into()))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered; `data.addedUser`", body = AddedUser),
        (status = 400, description = "Invalid payload or username taken")
    )
)]
pub async fn register_user(
    data: web::Data<AppState>,
    payload: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let added_user = usecase::register_user(data.repo.as_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(Success::data(json!({ "addedUser": added_user }))))
}

#[utoipa::path(
    post,
    path = "/authentications",
    tag = "authentications",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Logged in; `data` holds both tokens", body = TokenPair),
        (status = 400, description = "Invalid payload or unknown username"),
        (status = 401, description = "Wrong password")
    )
)]
pub async fn login(
    data: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let tokens = usecase::login(data.repo.as_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(Success::data(tokens)))
}

#[utoipa::path(
    put,
    path = "/authentications",
    tag = "authentications",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token", body = AccessToken),
        (status = 400, description = "Invalid or unknown refresh token")
    )
)]
pub async fn refresh_authentication(
    data: web::Data<AppState>,
    payload: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    let token = usecase::refresh_access_token(data.repo.as_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Success::data(token)))
}

#[utoipa::path(
    delete,
    path = "/authentications",
    tag = "authentications",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Refresh token revoked"),
        (status = 400, description = "Unknown refresh token")
    )
)]
pub async fn logout(
    data: web::Data<AppState>,
    payload: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    usecase::logout(data.repo.as_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Success::empty()))
}

#[utoipa::path(
    post,
    path = "/threads",
    tag = "threads",
    request_body = NewThread,
    responses(
        (status = 201, description = "Thread created; `data.addedThread`", body = AddedThread),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid access token")
    )
)]
pub async fn create_thread(
    auth: Auth,
    data: web::Data<AppState>,
    payload: web::Json<NewThread>,
) -> Result<HttpResponse, ApiError> {
    let added_thread = usecase::add_thread(data.repo.as_ref(), payload.into_inner(), auth.user_id()).await?;
    Ok(HttpResponse::Created().json(Success::data(json!({ "addedThread": added_thread }))))
}

#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    tag = "threads",
    params(("thread_id" = String, Path, description = "Thread id")),
    responses(
        (status = 200, description = "Thread with its comments; `data.thread`", body = ThreadDetail),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn get_thread_detail(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let thread = usecase::get_thread_detail(data.repo.as_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Success::data(json!({ "thread": thread }))))
}

#[utoipa::path(
    post,
    path = "/threads/{thread_id}/comments",
    tag = "comments",
    params(("thread_id" = String, Path, description = "Thread id")),
    request_body = NewComment,
    responses(
        (status = 201, description = "Comment created; `data.addedComment`", body = AddedComment),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn create_comment(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<NewComment>,
) -> Result<HttpResponse, ApiError> {
    let thread_id = path.into_inner();
    let added_comment =
        usecase::add_comment(data.repo.as_ref(), payload.into_inner(), &thread_id, auth.user_id()).await?;
    Ok(HttpResponse::Created().json(Success::data(json!({ "addedComment": added_comment }))))
}

#[utoipa::path(
    delete,
    path = "/threads/{thread_id}/comments/{comment_id}",
    tag = "comments",
    params(
        ("thread_id" = String, Path, description = "Thread id"),
        ("comment_id" = String, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment soft-deleted"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Not the comment owner"),
        (status = 404, description = "Thread or comment not found")
    )
)]
pub async fn delete_comment(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (thread_id, comment_id) = path.into_inner();
    usecase::delete_comment(data.repo.as_ref(), &thread_id, &comment_id, auth.user_id()).await?;
    Ok(HttpResponse::Ok().json(Success::message("Komentar berhasil dihapus")))
}
