//! Relationship repository
//!
//! The `follows` table is the single writable representation of the social
//! graph. Writers take an open connection so they can join the caller's
//! transaction; readers are generic over any executor.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqliteConnection};

use super::database::{Database, is_unique_violation};
use super::models::{Account, EdgeRole, EntityId, FollowEdge};
use crate::error::{AppError, GraphError};

/// Persist a new edge
///
/// # Errors
/// - `SelfReference` if both endpoints are the same account
/// - `DuplicateEdge` if the ordered pair already exists. The unique
///   constraint is what serializes concurrent inserts of the same pair.
pub async fn create_edge(
    conn: &mut SqliteConnection,
    follower_id: &str,
    following_id: &str,
) -> Result<FollowEdge, GraphError> {
    if follower_id == following_id {
        return Err(GraphError::SelfReference);
    }

    let edge = FollowEdge {
        id: EntityId::new().0,
        follower_id: follower_id.to_string(),
        following_id: following_id.to_string(),
        created_at: Utc::now(),
    };

    let result = sqlx::query(
        "INSERT INTO follows (id, follower_id, following_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&edge.id)
    .bind(&edge.follower_id)
    .bind(&edge.following_id)
    .bind(edge.created_at)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(edge),
        Err(error) if is_unique_violation(&error) => Err(GraphError::DuplicateEdge),
        Err(error) => Err(error.into()),
    }
}

/// Remove an edge
///
/// # Errors
/// `NotFound` if the ordered pair does not exist
pub async fn delete_edge(
    conn: &mut SqliteConnection,
    follower_id: &str,
    following_id: &str,
) -> Result<(), GraphError> {
    let result = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND following_id = ?")
        .bind(follower_id)
        .bind(following_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(GraphError::NotFound);
    }

    Ok(())
}

/// Check whether `follower_id` follows `following_id`
pub async fn edge_exists<'e, E>(
    executor: E,
    follower_id: &str,
    following_id: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let exists: i64 = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ? AND following_id = ?)",
    )
    .bind(follower_id)
    .bind(following_id)
    .fetch_one(executor)
    .await?;

    Ok(exists != 0)
}

/// Count edges in which the account plays `role`
pub async fn count_edges_where<'e, E>(
    executor: E,
    role: EdgeRole,
    account_id: &str,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = match role {
        EdgeRole::Follower => "SELECT COUNT(*) FROM follows WHERE follower_id = ?",
        EdgeRole::Followee => "SELECT COUNT(*) FROM follows WHERE following_id = ?",
    };

    sqlx::query_scalar::<_, i64>(query)
        .bind(account_id)
        .fetch_one(executor)
        .await
}

/// Account IDs on the other side of the account's edges, in edge creation order
///
/// For `EdgeRole::Followee` these are the account's followers; for
/// `EdgeRole::Follower` the accounts it follows.
pub async fn neighbour_ids<'e, E>(
    executor: E,
    role: EdgeRole,
    account_id: &str,
) -> Result<Vec<String>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = match role {
        EdgeRole::Follower => {
            "SELECT following_id FROM follows WHERE follower_id = ? ORDER BY created_at ASC, rowid ASC"
        }
        EdgeRole::Followee => {
            "SELECT follower_id FROM follows WHERE following_id = ? ORDER BY created_at ASC, rowid ASC"
        }
    };

    sqlx::query_scalar::<_, String>(query)
        .bind(account_id)
        .fetch_all(executor)
        .await
}

impl Database {
    /// Check whether an edge exists for the ordered pair
    pub async fn edge_exists(&self, follower_id: &str, following_id: &str) -> Result<bool, GraphError> {
        Ok(edge_exists(self.pool(), follower_id, following_id).await?)
    }

    /// Count edges where the account is follower or followee
    pub async fn count_edges_where(
        &self,
        role: EdgeRole,
        account_id: &str,
    ) -> Result<i64, GraphError> {
        Ok(count_edges_where(self.pool(), role, account_id).await?)
    }

    /// Accounts following the given account, in follow order
    pub async fn get_followers(&self, account_id: &str) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT a.* FROM follows f
            INNER JOIN accounts a ON a.id = f.follower_id
            WHERE f.following_id = ?
            ORDER BY f.created_at ASC, f.rowid ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(self.pool())
        .await?;

        Ok(accounts)
    }

    /// Accounts the given account follows, in follow order
    pub async fn get_following(&self, account_id: &str) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT a.* FROM follows f
            INNER JOIN accounts a ON a.id = f.following_id
            WHERE f.follower_id = ?
            ORDER BY f.created_at ASC, f.rowid ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(self.pool())
        .await?;

        Ok(accounts)
    }
}
