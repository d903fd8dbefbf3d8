#![cfg(feature = "inmem-store")]

use forum_api::{
    models::{NewCommentRecord, NewThreadRecord, NewUserRecord, User},
    repo::{inmem::InMemRepo, RepoError},
};
// Bring trait method namespaces into scope so calls on InMemRepo resolve.
use forum_api::repo::{AuthenticationRepo, CommentRepo, ThreadRepo, UserRepo};

async fn user(r: &InMemRepo, username: &str) -> User {
    r.create_user(NewUserRecord {
        username: username.into(),
        password: "hashed".into(),
        fullname: "Full Name".into(),
    })
    .await
    .unwrap()
}

fn thread(owner: &str) -> NewThreadRecord {
    NewThreadRecord { title: "Thread Title".into(), body: "Thread Body".into(), owner: owner.into() }
}

#[tokio::test]
async fn user_create_conflict_and_lookup() {
    let r = InMemRepo::new();
    let u = user(&r, "dicoding").await;
    assert!(u.id.starts_with("user-"));

    let err = r
        .create_user(NewUserRecord { username: "dicoding".into(), password: "x".into(), fullname: "Dup".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict));

    let found = r.find_user_by_username("dicoding").await.unwrap();
    assert_eq!(found.id, u.id);
    assert!(matches!(r.find_user_by_username("nobody").await.unwrap_err(), RepoError::NotFound));
}

#[tokio::test]
async fn refresh_token_lifecycle() {
    let r = InMemRepo::new();
    assert!(matches!(r.verify_refresh_token("t").await.unwrap_err(), RepoError::NotFound));
    r.add_refresh_token("t").await.unwrap();
    r.verify_refresh_token("t").await.unwrap();
    r.delete_refresh_token("t").await.unwrap();
    assert!(matches!(r.delete_refresh_token("t").await.unwrap_err(), RepoError::NotFound));
}

#[tokio::test]
async fn detail_rows_for_missing_and_empty_threads() {
    let r = InMemRepo::new();
    assert!(r.thread_detail_rows("thread-nope").await.unwrap().is_empty());

    let owner = user(&r, "dicoding").await;
    let t = r.create_thread(thread(&owner.id)).await.unwrap();
    assert!(t.id.starts_with("thread-"));

    let rows = r.thread_detail_rows(&t.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username, "dicoding");
    assert!(rows[0].comment_id.is_none());
    assert!(rows[0].comment_username.is_none());
    assert!(rows[0].comment_is_delete.is_none());
}

#[tokio::test]
async fn detail_rows_follow_comment_creation_order() {
    let r = InMemRepo::new();
    let op = user(&r, "dicoding").await;
    let john = user(&r, "johndoe").await;
    let t = r.create_thread(thread(&op.id)).await.unwrap();

    let mut ids = Vec::new();
    for (i, author) in [&john, &op, &john].into_iter().enumerate() {
        let c = r
            .create_comment(NewCommentRecord {
                thread_id: t.id.clone(),
                content: format!("komentar {i}"),
                owner: author.id.clone(),
            })
            .await
            .unwrap();
        ids.push(c.id);
    }
    r.soft_delete_comment(&ids[1]).await.unwrap();

    let rows = r.thread_detail_rows(&t.id).await.unwrap();
    let got: Vec<_> = rows.iter().map(|row| row.comment_id.clone().unwrap()).collect();
    assert_eq!(got, ids);
    assert!(rows.iter().all(|row| row.id == t.id && row.username == "dicoding"));
    assert_eq!(rows[0].comment_username.as_deref(), Some("johndoe"));
    assert_eq!(rows[1].comment_is_delete, Some(true));
    // soft delete keeps the original content in storage
    assert_eq!(rows[1].comment_content.as_deref(), Some("komentar 1"));
    assert!(rows.windows(2).all(|w| w[0].comment_date <= w[1].comment_date));
}

#[tokio::test]
async fn comments_require_existing_thread() {
    let r = InMemRepo::new();
    let owner = user(&r, "dicoding").await;
    let err = r
        .create_comment(NewCommentRecord { thread_id: "thread-x".into(), content: "hi".into(), owner: owner.id })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
    assert!(matches!(r.soft_delete_comment("comment-x").await.unwrap_err(), RepoError::NotFound));
}

#[tokio::test]
async fn comments_require_existing_owner() {
    let r = InMemRepo::new();
    let owner = user(&r, "dicoding").await;
    let t = r.create_thread(thread(&owner.id)).await.unwrap();
    let err = r
        .create_comment(NewCommentRecord { thread_id: t.id.clone(), content: "hi".into(), owner: "user-ghost".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
    assert_eq!(r.thread_detail_rows(&t.id).await.unwrap()[0].comment_id, None);
}

#[tokio::test]
async fn timestamps_are_stored_at_millisecond_resolution() {
    use chrono::Timelike;
    let r = InMemRepo::new();
    let owner = user(&r, "dicoding").await;
    let t = r.create_thread(thread(&owner.id)).await.unwrap();
    let c = r
        .create_comment(NewCommentRecord { thread_id: t.id.clone(), content: "hi".into(), owner: owner.id })
        .await
        .unwrap();
    assert_eq!(t.created_at.nanosecond() % 1_000_000, 0);
    assert_eq!(c.created_at.nanosecond() % 1_000_000, 0);
}

#[tokio::test]
async fn soft_delete_retains_comment() {
    let r = InMemRepo::new();
    let owner = user(&r, "dicoding").await;
    let t = r.create_thread(thread(&owner.id)).await.unwrap();
    let c = r
        .create_comment(NewCommentRecord { thread_id: t.id.clone(), content: "hi".into(), owner: owner.id.clone() })
        .await
        .unwrap();
    assert!(!c.is_delete);
    r.soft_delete_comment(&c.id).await.unwrap();
    let stored = r.get_comment(&c.id).await.unwrap();
    assert!(stored.is_delete);
    assert_eq!(stored.content, "hi");
}
