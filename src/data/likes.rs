//! Community post likes
//!
//! A like is an `(post_id, account_id)` pair in `community_post_likes`; the
//! unique constraint makes liking a set insert. Writers take an open
//! connection so toggles run inside the caller's transaction.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqliteConnection};

use super::database::{Database, is_unique_violation};
use super::models::{Account, EntityId, PostLike};
use crate::error::AppError;

/// Record that `account_id` likes `post_id`
///
/// # Errors
/// `AppError::Conflict` if the pair already exists
pub async fn create_like(
    conn: &mut SqliteConnection,
    post_id: &str,
    account_id: &str,
) -> Result<PostLike, AppError> {
    let like = PostLike {
        id: EntityId::new().0,
        post_id: post_id.to_string(),
        account_id: account_id.to_string(),
        created_at: Utc::now(),
    };

    let result = sqlx::query(
        "INSERT INTO community_post_likes (id, post_id, account_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&like.id)
    .bind(&like.post_id)
    .bind(&like.account_id)
    .bind(like.created_at)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(like),
        Err(error) if is_unique_violation(&error) => {
            Err(AppError::Conflict("Post already liked".to_string()))
        }
        Err(error) => Err(error.into()),
    }
}

/// Remove a like
///
/// # Returns
/// `true` if a like was removed
pub async fn delete_like(
    conn: &mut SqliteConnection,
    post_id: &str,
    account_id: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM community_post_likes WHERE post_id = ? AND account_id = ?")
            .bind(post_id)
            .bind(account_id)
            .execute(&mut *conn)
            .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn like_exists<'e, E>(
    executor: E,
    post_id: &str,
    account_id: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let exists: i64 = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM community_post_likes WHERE post_id = ? AND account_id = ?)",
    )
    .bind(post_id)
    .bind(account_id)
    .fetch_one(executor)
    .await?;

    Ok(exists != 0)
}

/// Account IDs that like a post, in like order
pub async fn liker_ids<'e, E>(executor: E, post_id: &str) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, String>(
        "SELECT account_id FROM community_post_likes WHERE post_id = ? ORDER BY created_at ASC, rowid ASC",
    )
    .bind(post_id)
    .fetch_all(executor)
    .await
}

impl Database {
    /// Check whether an account likes a post
    pub async fn post_liked_by(&self, post_id: &str, account_id: &str) -> Result<bool, AppError> {
        Ok(like_exists(self.pool(), post_id, account_id).await?)
    }

    /// Accounts that like a post, in like order
    pub async fn get_post_likers(&self, post_id: &str) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT a.* FROM community_post_likes l
            INNER JOIN accounts a ON a.id = l.account_id
            WHERE l.post_id = ?
            ORDER BY l.created_at ASC, l.rowid ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await?;

        Ok(accounts)
    }
}
