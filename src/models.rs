use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub type Id = String;

pub const USERNAME_MAX_LEN: usize = 50;
pub const TITLE_MAX_LEN: usize = 100;

/// Prefixed random identifier, e.g. `thread-3f9c...`.
pub fn new_id(prefix: &str) -> Id {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Id,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String, // bcrypt hash
    pub fullname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Thread {
    pub id: Id,
    pub title: String,
    pub body: String,
    pub owner: Id,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Comment {
    pub id: Id,
    pub content: String,
    pub thread_id: Id,
    pub owner: Id,
    pub is_delete: bool, // soft delete marker, never reverts
    pub created_at: DateTime<Utc>,
}

// Insert records handed to the repositories (already validated)
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub password: String,
    pub fullname: String,
}
#[derive(Debug, Clone)]
pub struct NewThreadRecord {
    pub title: String,
    pub body: String,
    pub owner: Id,
}
#[derive(Debug, Clone)]
pub struct NewCommentRecord {
    pub thread_id: Id,
    pub content: String,
    pub owner: Id,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("tidak dapat membuat user baru karena properti yang dibutuhkan tidak ada")]
    RegisterMissingProperty,
    #[error("tidak dapat membuat user baru karena karakter username melebihi batas limit")]
    UsernameTooLong,
    #[error("tidak dapat membuat user baru karena username mengandung karakter terlarang")]
    UsernameRestrictedCharacter,
    #[error("harus mengirimkan username dan password")]
    LoginMissingProperty,
    #[error("harus mengirimkan token refresh")]
    MissingRefreshToken,
    #[error("tidak dapat membuat thread karena properti yang dibutuhkan tidak ada")]
    ThreadMissingProperty,
    #[error("tidak dapat membuat thread karena karakter title melebihi batas limit")]
    TitleTooLong,
    #[error("tidak dapat membuat comment karena properti yang dibutuhkan tidak ada")]
    CommentMissingProperty,
}

/// Empty strings count as missing.
fn present(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub fullname: Option<String>,
}

/// Validated registration; `password` is still plain text here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
    pub fullname: String,
}

impl RegisterUserRequest {
    pub fn validate(self) -> Result<RegisterUser, ValidationError> {
        let (Some(username), Some(password), Some(fullname)) =
            (present(self.username), present(self.password), present(self.fullname))
        else {
            return Err(ValidationError::RegisterMissingProperty);
        };
        if username.chars().count() > USERNAME_MAX_LEN {
            return Err(ValidationError::UsernameTooLong);
        }
        if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ValidationError::UsernameRestrictedCharacter);
        }
        Ok(RegisterUser { username, password, fullname })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns `(username, password)`.
    pub fn validate(self) -> Result<(String, String), ValidationError> {
        match (present(self.username), present(self.password)) {
            (Some(u), Some(p)) => Ok((u, p)),
            _ => Err(ValidationError::LoginMissingProperty),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

impl RefreshTokenRequest {
    pub fn validate(self) -> Result<String, ValidationError> {
        present(self.refresh_token).ok_or(ValidationError::MissingRefreshToken)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewThread {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl NewThread {
    pub fn validate(self, owner: &str) -> Result<NewThreadRecord, ValidationError> {
        let (Some(title), Some(body)) = (present(self.title), present(self.body)) else {
            return Err(ValidationError::ThreadMissingProperty);
        };
        if title.chars().count() > TITLE_MAX_LEN {
            return Err(ValidationError::TitleTooLong);
        }
        Ok(NewThreadRecord { title, body, owner: owner.to_string() })
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewComment {
    pub content: Option<String>,
}

impl NewComment {
    pub fn validate(self, thread_id: &str, owner: &str) -> Result<NewCommentRecord, ValidationError> {
        let content = present(self.content).ok_or(ValidationError::CommentMissingProperty)?;
        Ok(NewCommentRecord { thread_id: thread_id.to_string(), content, owner: owner.to_string() })
    }
}

// Response documents
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddedUser {
    pub id: Id,
    pub username: String,
    pub fullname: String,
}

impl From<User> for AddedUser {
    fn from(u: User) -> Self {
        Self { id: u.id, username: u.username, fullname: u.fullname }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddedThread {
    pub id: Id,
    pub title: String,
    pub owner: Id,
}

impl From<Thread> for AddedThread {
    fn from(t: Thread) -> Self {
        Self { id: t.id, title: t.title, owner: t.owner }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddedComment {
    pub id: Id,
    pub content: String,
    pub owner: Id,
}

impl From<Comment> for AddedComment {
    fn from(c: Comment) -> Self {
        Self { id: c.id, content: c.content, owner: c.owner }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: Some(username.into()),
            password: Some("secret".into()),
            fullname: Some("Dicoding Indonesia".into()),
        }
    }

    #[test]
    fn register_requires_all_fields() {
        let mut req = register("dicoding");
        req.fullname = None;
        assert_eq!(req.validate().unwrap_err(), ValidationError::RegisterMissingProperty);
    }

    #[test]
    fn register_rejects_long_and_restricted_usernames() {
        let long = "a".repeat(USERNAME_MAX_LEN + 1);
        assert_eq!(register(&long).validate().unwrap_err(), ValidationError::UsernameTooLong);
        assert_eq!(register("dico ding").validate().unwrap_err(), ValidationError::UsernameRestrictedCharacter);
        assert_eq!(register("dico-ding").validate().unwrap_err(), ValidationError::UsernameRestrictedCharacter);
        assert!(register("dico_ding_2").validate().is_ok());
    }

    #[test]
    fn login_requires_username_and_password() {
        let missing_password = LoginRequest { username: Some("dicoding".into()), password: None };
        assert_eq!(missing_password.validate().unwrap_err(), ValidationError::LoginMissingProperty);
        let empty_username = LoginRequest { username: Some(String::new()), password: Some("secret".into()) };
        assert_eq!(empty_username.validate().unwrap_err(), ValidationError::LoginMissingProperty);
        assert_eq!(
            ValidationError::LoginMissingProperty.to_string(),
            "harus mengirimkan username dan password"
        );
    }

    #[test]
    fn thread_title_limit_is_inclusive() {
        let ok = NewThread { title: Some("a".repeat(TITLE_MAX_LEN)), body: Some("Isi thread".into()) };
        let rec = ok.validate("user-123").unwrap();
        assert_eq!(rec.title.len(), TITLE_MAX_LEN);
        assert_eq!(rec.owner, "user-123");

        let too_long = NewThread { title: Some("a".repeat(TITLE_MAX_LEN + 1)), body: Some("Isi thread".into()) };
        assert_eq!(too_long.validate("user-123").unwrap_err(), ValidationError::TitleTooLong);
    }

    #[test]
    fn thread_requires_title_and_body() {
        let missing = NewThread { title: Some("sebuah thread".into()), body: None };
        assert_eq!(missing.validate("user-123").unwrap_err(), ValidationError::ThreadMissingProperty);
    }

    #[test]
    fn empty_comment_content_counts_as_missing() {
        let c = NewComment { content: Some(String::new()) };
        assert_eq!(c.validate("thread-1", "user-1").unwrap_err(), ValidationError::CommentMissingProperty);
        let ok = NewComment { content: Some("Sebuah Comment".into()) }.validate("thread-1", "user-1").unwrap();
        assert_eq!(ok.content, "Sebuah Comment");
        assert_eq!(ok.thread_id, "thread-1");
    }

    #[test]
    fn token_payloads_use_camel_case() {
        let req: RefreshTokenRequest = serde_json::from_str(r#"{"refreshToken":"abc"}"#).unwrap();
        assert_eq!(req.validate().unwrap(), "abc");
        let pair = serde_json::to_value(TokenPair { access_token: "a".into(), refresh_token: "r".into() }).unwrap();
        assert_eq!(pair["accessToken"], "a");
        assert_eq!(pair["refreshToken"], "r");
    }

    #[test]
    fn user_password_is_not_serialized() {
        let u = User { id: "user-1".into(), username: "dicoding".into(), password: "hash".into(), fullname: "D".into() };
        let v = serde_json::to_value(&u).unwrap();
        assert!(v.get("password").is_none());
    }
}
