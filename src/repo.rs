use async_trait::async_trait;

use crate::models::*;
use crate::thread_detail::JoinedRow;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")] NotFound,
    #[error("conflict")] Conflict,
    #[error("internal: {0}")] Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// `Conflict` when the username is taken.
    async fn create_user(&self, new: NewUserRecord) -> RepoResult<User>;
    async fn find_user_by_username(&self, username: &str) -> RepoResult<User>;
}

#[async_trait]
pub trait AuthenticationRepo: Send + Sync {
    async fn add_refresh_token(&self, token: &str) -> RepoResult<()>;
    async fn verify_refresh_token(&self, token: &str) -> RepoResult<()>;
    async fn delete_refresh_token(&self, token: &str) -> RepoResult<()>;
}

#[async_trait]
pub trait ThreadRepo: Send + Sync {
    async fn create_thread(&self, new: NewThreadRecord) -> RepoResult<Thread>;
    async fn get_thread(&self, id: &str) -> RepoResult<Thread>;
    /// Joined rows ordered by comment creation time (ascending). Empty when
    /// the thread does not exist; a single row with null comment columns when
    /// it has no comments.
    async fn thread_detail_rows(&self, id: &str) -> RepoResult<Vec<JoinedRow>>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    /// `NotFound` when the thread does not exist.
    async fn create_comment(&self, new: NewCommentRecord) -> RepoResult<Comment>;
    async fn get_comment(&self, id: &str) -> RepoResult<Comment>;
    async fn soft_delete_comment(&self, id: &str) -> RepoResult<()>;
}

pub trait Repo: UserRepo + AuthenticationRepo + ThreadRepo + CommentRepo {}

impl<T> Repo for T where T: UserRepo + AuthenticationRepo + ThreadRepo + CommentRepo {}

#[cfg(feature = "inmem-store")]
pub mod inmem {
    use super::*;
    use chrono::{DateTime, SubsecRound, Utc};
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

    #[derive(Default)]
    struct State {
        users: HashMap<Id, User>,
        refresh_tokens: HashSet<String>,
        threads: HashMap<Id, Thread>,
        comments: Vec<Comment>, // insertion order
    }

    // matches the millisecond resolution of the Postgres column defaults
    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    #[derive(Clone, Default)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
    }

    impl InMemRepo {
        pub fn new() -> Self {
            Self::default()
        }

        fn read(&self) -> RepoResult<RwLockReadGuard<'_, State>> {
            self.state.read().map_err(|e| RepoError::Internal(e.to_string()))
        }

        fn write(&self) -> RepoResult<RwLockWriteGuard<'_, State>> {
            self.state.write().map_err(|e| RepoError::Internal(e.to_string()))
        }
    }

    #[async_trait]
    impl UserRepo for InMemRepo {
        async fn create_user(&self, new: NewUserRecord) -> RepoResult<User> {
            let mut s = self.write()?;
            if s.users.values().any(|u| u.username == new.username) {
                return Err(RepoError::Conflict);
            }
            let user = User {
                id: new_id("user"),
                username: new.username,
                password: new.password,
                fullname: new.fullname,
            };
            s.users.insert(user.id.clone(), user.clone());
            Ok(user)
        }
        async fn find_user_by_username(&self, username: &str) -> RepoResult<User> {
            let s = self.read()?;
            s.users.values().find(|u| u.username == username).cloned().ok_or(RepoError::NotFound)
        }
    }

    #[async_trait]
    impl AuthenticationRepo for InMemRepo {
        async fn add_refresh_token(&self, token: &str) -> RepoResult<()> {
            self.write()?.refresh_tokens.insert(token.to_string());
            Ok(())
        }
        async fn verify_refresh_token(&self, token: &str) -> RepoResult<()> {
            if self.read()?.refresh_tokens.contains(token) { Ok(()) } else { Err(RepoError::NotFound) }
        }
        async fn delete_refresh_token(&self, token: &str) -> RepoResult<()> {
            if self.write()?.refresh_tokens.remove(token) { Ok(()) } else { Err(RepoError::NotFound) }
        }
    }

    #[async_trait]
    impl ThreadRepo for InMemRepo {
        async fn create_thread(&self, new: NewThreadRecord) -> RepoResult<Thread> {
            let mut s = self.write()?;
            if !s.users.contains_key(&new.owner) { return Err(RepoError::NotFound); }
            let thread = Thread {
                id: new_id("thread"),
                title: new.title,
                body: new.body,
                owner: new.owner,
                created_at: now(),
            };
            s.threads.insert(thread.id.clone(), thread.clone());
            Ok(thread)
        }
        async fn get_thread(&self, id: &str) -> RepoResult<Thread> {
            self.read()?.threads.get(id).cloned().ok_or(RepoError::NotFound)
        }
        async fn thread_detail_rows(&self, id: &str) -> RepoResult<Vec<JoinedRow>> {
            let s = self.read()?;
            let Some(thread) = s.threads.get(id) else { return Ok(Vec::new()) };
            let username = |owner: &Id| s.users.get(owner).map(|u| u.username.clone());
            let Some(thread_username) = username(&thread.owner) else { return Ok(Vec::new()) };

            let base = JoinedRow {
                id: thread.id.clone(),
                title: thread.title.clone(),
                body: thread.body.clone(),
                date: thread.created_at,
                username: thread_username,
                comment_id: None,
                comment_content: None,
                comment_date: None,
                comment_is_delete: None,
                comment_username: None,
            };

            let mut comments: Vec<&Comment> = s.comments.iter().filter(|c| c.thread_id == thread.id).collect();
            // stable: equal timestamps keep insertion order, as `seq` does in Postgres
            comments.sort_by_key(|c| c.created_at);
            if comments.is_empty() {
                return Ok(vec![base]);
            }
            Ok(comments
                .into_iter()
                .map(|c| JoinedRow {
                    comment_id: Some(c.id.clone()),
                    comment_content: Some(c.content.clone()),
                    comment_date: Some(c.created_at),
                    comment_is_delete: Some(c.is_delete),
                    comment_username: username(&c.owner),
                    ..base.clone()
                })
                .collect())
        }
    }

    #[async_trait]
    impl CommentRepo for InMemRepo {
        async fn create_comment(&self, new: NewCommentRecord) -> RepoResult<Comment> {
            let mut s = self.write()?;
            if !s.threads.contains_key(&new.thread_id) || !s.users.contains_key(&new.owner) {
                return Err(RepoError::NotFound);
            }
            let comment = Comment {
                id: new_id("comment"),
                content: new.content,
                thread_id: new.thread_id,
                owner: new.owner,
                is_delete: false,
                created_at: now(),
            };
            s.comments.push(comment.clone());
            Ok(comment)
        }
        async fn get_comment(&self, id: &str) -> RepoResult<Comment> {
            self.read()?.comments.iter().find(|c| c.id == id).cloned().ok_or(RepoError::NotFound)
        }
        async fn soft_delete_comment(&self, id: &str) -> RepoResult<()> {
            let mut s = self.write()?;
            let comment = s.comments.iter_mut().find(|c| c.id == id).ok_or(RepoError::NotFound)?;
            comment.is_delete = true;
            Ok(())
        }
    }
}

// Postgres implementation (feature = "postgres-store")
#[cfg(feature = "postgres-store")]
pub mod pg {
    use super::*;
    use sqlx::{Pool, Postgres};

    #[derive(Clone)]
    pub struct PgRepo { pool: Pool<Postgres> }

    impl PgRepo {
        pub fn new(pool: Pool<Postgres>) -> Self { Self { pool } }

        pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
            sqlx::migrate!("./migrations").run(&self.pool).await
        }
    }

    fn internal(e: sqlx::Error) -> RepoError {
        match e {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Conflict,
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => RepoError::NotFound,
            other => RepoError::Internal(other.to_string()),
        }
    }

    #[async_trait]
    impl UserRepo for PgRepo {
        async fn create_user(&self, new: NewUserRecord) -> RepoResult<User> {
            sqlx::query_as::<_, User>(
                "INSERT INTO users (id, username, password, fullname) VALUES ($1,$2,$3,$4) RETURNING id, username, password, fullname"
            )
            .bind(new_id("user"))
            .bind(&new.username)
            .bind(&new.password)
            .bind(&new.fullname)
            .fetch_one(&self.pool).await.map_err(internal)
        }
        async fn find_user_by_username(&self, username: &str) -> RepoResult<User> {
            sqlx::query_as::<_, User>("SELECT id, username, password, fullname FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(&self.pool).await.map_err(internal)
        }
    }

    #[async_trait]
    impl AuthenticationRepo for PgRepo {
        async fn add_refresh_token(&self, token: &str) -> RepoResult<()> {
            sqlx::query("INSERT INTO authentications (token) VALUES ($1)")
                .bind(token)
                .execute(&self.pool).await.map_err(internal)?;
            Ok(())
        }
        async fn verify_refresh_token(&self, token: &str) -> RepoResult<()> {
            sqlx::query("SELECT token FROM authentications WHERE token = $1")
                .bind(token)
                .fetch_one(&self.pool).await.map_err(internal)?;
            Ok(())
        }
        async fn delete_refresh_token(&self, token: &str) -> RepoResult<()> {
            let res = sqlx::query("DELETE FROM authentications WHERE token = $1")
                .bind(token)
                .execute(&self.pool).await.map_err(internal)?;
            if res.rows_affected() == 0 { return Err(RepoError::NotFound); }
            Ok(())
        }
    }

    #[async_trait]
    impl ThreadRepo for PgRepo {
        async fn create_thread(&self, new: NewThreadRecord) -> RepoResult<Thread> {
            sqlx::query_as::<_, Thread>(
                "INSERT INTO threads (id, title, body, owner) VALUES ($1,$2,$3,$4) RETURNING id, title, body, owner, created_at"
            )
            .bind(new_id("thread"))
            .bind(&new.title)
            .bind(&new.body)
            .bind(&new.owner)
            .fetch_one(&self.pool).await.map_err(internal)
        }
        async fn get_thread(&self, id: &str) -> RepoResult<Thread> {
            sqlx::query_as::<_, Thread>("SELECT id, title, body, owner, created_at FROM threads WHERE id = $1")
                .bind(id)
                .fetch_one(&self.pool).await.map_err(internal)
        }
        async fn thread_detail_rows(&self, id: &str) -> RepoResult<Vec<JoinedRow>> {
            sqlx::query_as::<_, JoinedRow>(r#"
                SELECT t.id, t.title, t.body, t.created_at AS date, u.username,
                       c.id AS comment_id,
                       c.content AS comment_content,
                       c.created_at AS comment_date,
                       c.is_delete AS comment_is_delete,
                       cu.username AS comment_username
                FROM threads t
                JOIN users u ON t.owner = u.id
                LEFT JOIN comments c ON t.id = c.thread_id
                LEFT JOIN users cu ON c.owner = cu.id
                WHERE t.id = $1
                ORDER BY c.created_at ASC, c.seq ASC
            "#)
                .bind(id)
                .fetch_all(&self.pool).await.map_err(internal)
        }
    }

    #[async_trait]
    impl CommentRepo for PgRepo {
        async fn create_comment(&self, new: NewCommentRecord) -> RepoResult<Comment> {
            // FK violation on thread_id maps to NotFound
            sqlx::query_as::<_, Comment>(
                "INSERT INTO comments (id, content, thread_id, owner) VALUES ($1,$2,$3,$4) RETURNING id, content, thread_id, owner, is_delete, created_at"
            )
            .bind(new_id("comment"))
            .bind(&new.content)
            .bind(&new.thread_id)
            .bind(&new.owner)
            .fetch_one(&self.pool).await.map_err(internal)
        }
        async fn get_comment(&self, id: &str) -> RepoResult<Comment> {
            sqlx::query_as::<_, Comment>(
                "SELECT id, content, thread_id, owner, is_delete, created_at FROM comments WHERE id = $1"
            )
            .bind(id)
            .fetch_one(&self.pool).await.map_err(internal)
        }
        async fn soft_delete_comment(&self, id: &str) -> RepoResult<()> {
            let res = sqlx::query("UPDATE comments SET is_delete = TRUE WHERE id = $1")
                .bind(id)
                .execute(&self.pool).await.map_err(internal)?;
            if res.rows_affected() == 0 { return Err(RepoError::NotFound); }
            Ok(())
        }
    }
}
