use crate::models::{
    AccessToken, AddedComment, AddedThread, AddedUser, LoginRequest, NewComment, NewThread, RefreshTokenRequest,
    RegisterUserRequest, TokenPair,
};
use crate::thread_detail::{CommentView, ThreadDetail};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::register_user,
        crate::routes::login,
        crate::routes::refresh_authentication,
        crate::routes::logout,
        crate::routes::create_thread,
        crate::routes::get_thread_detail,
        crate::routes::create_comment,
        crate::routes::delete_comment,
    ),
    components(schemas(
        RegisterUserRequest, AddedUser, LoginRequest, RefreshTokenRequest, TokenPair, AccessToken,
        NewThread, AddedThread, ThreadDetail, CommentView, NewComment, AddedComment
    )),
    tags(
        (name = "users", description = "User registration"),
        (name = "authentications", description = "Login, token refresh and logout"),
        (name = "threads", description = "Thread operations"),
        (name = "comments", description = "Comment operations"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        for p in ["/users", "/authentications", "/threads", "/threads/{thread_id}", "/threads/{thread_id}/comments/{comment_id}"] {
            assert!(paths.iter().any(|k| k == p), "missing {p}");
        }
    }
}
