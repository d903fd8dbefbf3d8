//! Folding of joined thread/comment rows into a single thread-detail document.
//!
//! The persistence layer answers a thread-detail request with one row per
//! (thread, comment) pair from a `threads LEFT JOIN comments` query. A thread
//! without comments still yields exactly one row, with every `comment_*`
//! column null. [`format_thread_detail`] turns that flat, ordered row set into
//! a [`ThreadDetail`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Id;

/// Content shown in place of a soft-deleted comment.
pub const DELETED_COMMENT_CONTENT: &str = "**komentar telah dihapus**";

/// One row of the thread x comment x comment-author join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct JoinedRow {
    pub id: Id,
    pub title: String,
    pub body: String,
    pub date: DateTime<Utc>,
    pub username: String,
    pub comment_id: Option<Id>,
    pub comment_content: Option<String>,
    pub comment_date: Option<DateTime<Utc>>,
    pub comment_is_delete: Option<bool>,
    pub comment_username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CommentView {
    pub id: Id,
    pub username: Option<String>,
    #[serde(with = "millis::option")]
    pub date: Option<DateTime<Utc>>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ThreadDetail {
    pub id: Id,
    pub title: String,
    pub body: String,
    #[serde(with = "millis")]
    pub date: DateTime<Utc>,
    pub username: String,
    pub comments: Vec<CommentView>,
}

/// RFC 3339 in UTC with exactly three fractional digits, e.g.
/// `2021-08-08T07:19:09.775Z`.
mod millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(d)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(date: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<DateTime<Utc>>::deserialize(d)
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ThreadDetailError {
    /// No rows were supplied. Callers resolve "thread not found" before
    /// aggregating, so this is a contract violation rather than a 404.
    #[error("thread detail requires at least one row")]
    EmptyData,
}

fn comment_view(row: JoinedRow) -> Option<CommentView> {
    let id = row.comment_id?;
    let content = if row.comment_is_delete == Some(true) {
        Some(DELETED_COMMENT_CONTENT.to_string())
    } else {
        row.comment_content
    };
    Some(CommentView { id, username: row.comment_username, date: row.comment_date, content })
}

/// Aggregate joined rows into a [`ThreadDetail`].
///
/// Thread fields are read from the first row. Rows without a comment id (the
/// LEFT JOIN placeholder) are skipped; every other row becomes a
/// [`CommentView`] in input order. Rows must already be sorted by comment
/// creation time, ascending; no sorting happens here.
pub fn format_thread_detail<I>(rows: I) -> Result<ThreadDetail, ThreadDetailError>
where
    I: IntoIterator<Item = JoinedRow>,
{
    let mut rows = rows.into_iter();
    let first = rows.next().ok_or(ThreadDetailError::EmptyData)?;

    let mut detail = ThreadDetail {
        id: first.id.clone(),
        title: first.title.clone(),
        body: first.body.clone(),
        date: first.date,
        username: first.username.clone(),
        comments: Vec::with_capacity(rows.size_hint().0 + 1),
    };
    detail.comments.extend(std::iter::once(first).chain(rows).filter_map(comment_view));
    Ok(detail)
}
