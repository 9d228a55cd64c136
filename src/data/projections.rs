//! Follower/following projections
//!
//! Account lists and counters, and profile lists, are derived from the
//! `follows` table. They are recomputed (never incrementally patched) on the
//! caller's connection, so a refresh inside a transaction commits or rolls
//! back together with the edge change that triggered it.

use sqlx::SqliteConnection;
use sqlx::types::Json;

use super::database::{Database, insert_profile};
use super::edges::neighbour_ids;
use super::models::{Account, EdgeRole, Profile};
use crate::error::{AppError, GraphError};

/// Stored account projection before and after a refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionRefresh {
    pub account_id: String,
    pub previous_followers_count: i64,
    pub previous_following_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    /// Whether the stored lists or counters differed from the edges
    pub changed: bool,
}

/// Recompute an account's lists and counters from its edges
///
/// # Errors
/// `GraphError::TargetNotFound` if the account row does not exist
pub async fn refresh_account(
    conn: &mut SqliteConnection,
    account_id: &str,
) -> Result<ProjectionRefresh, GraphError> {
    let stored = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
        .bind(account_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(GraphError::TargetNotFound)?;

    let followers = neighbour_ids(&mut *conn, EdgeRole::Followee, account_id).await?;
    let following = neighbour_ids(&mut *conn, EdgeRole::Follower, account_id).await?;
    let followers_count = followers.len() as i64;
    let following_count = following.len() as i64;

    let changed = stored.followers_count != followers_count
        || stored.following_count != following_count
        || stored.followers.0 != followers
        || stored.following.0 != following;

    if changed {
        sqlx::query(
            r#"
            UPDATE accounts
            SET followers = ?, following = ?, followers_count = ?, following_count = ?
            WHERE id = ?
            "#,
        )
        .bind(Json(&followers))
        .bind(Json(&following))
        .bind(followers_count)
        .bind(following_count)
        .bind(account_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(ProjectionRefresh {
        account_id: account_id.to_string(),
        previous_followers_count: stored.followers_count,
        previous_following_count: stored.following_count,
        followers_count,
        following_count,
        changed,
    })
}

/// Recompute the profile lists of the profile owned by `account_id`
///
/// Profile lists hold the profile IDs of the owner's graph neighbours that
/// have a profile, in edge creation order. Accounts without a profile are
/// a no-op.
///
/// # Returns
/// `true` if a stored list changed
pub async fn refresh_profile_of(
    conn: &mut SqliteConnection,
    account_id: &str,
) -> Result<bool, GraphError> {
    let Some(stored) = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE account_id = ?")
        .bind(account_id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(false);
    };

    let followers = sqlx::query_scalar::<_, String>(
        r#"
        SELECT p.id FROM follows f
        INNER JOIN profiles p ON p.account_id = f.follower_id
        WHERE f.following_id = ?
        ORDER BY f.created_at ASC, f.rowid ASC
        "#,
    )
    .bind(account_id)
    .fetch_all(&mut *conn)
    .await?;

    let following = sqlx::query_scalar::<_, String>(
        r#"
        SELECT p.id FROM follows f
        INNER JOIN profiles p ON p.account_id = f.following_id
        WHERE f.follower_id = ?
        ORDER BY f.created_at ASC, f.rowid ASC
        "#,
    )
    .bind(account_id)
    .fetch_all(&mut *conn)
    .await?;

    if stored.followers.0 == followers && stored.following.0 == following {
        return Ok(false);
    }

    sqlx::query("UPDATE profiles SET followers = ?, following = ? WHERE id = ?")
        .bind(Json(&followers))
        .bind(Json(&following))
        .bind(&stored.id)
        .execute(&mut *conn)
        .await?;

    Ok(true)
}

/// Refresh everything a single edge (follower → following) touches
pub async fn refresh_pair(
    conn: &mut SqliteConnection,
    follower_id: &str,
    following_id: &str,
) -> Result<(), GraphError> {
    refresh_account(&mut *conn, follower_id).await?;
    refresh_account(&mut *conn, following_id).await?;
    refresh_profile_of(&mut *conn, follower_id).await?;
    refresh_profile_of(&mut *conn, following_id).await?;
    Ok(())
}

/// Refresh the profile lists of an account and all of its graph neighbours
///
/// Needed when the account's own profile appears or disappears, since its
/// profile ID is listed on every neighbour's profile.
pub async fn refresh_neighbourhood(
    conn: &mut SqliteConnection,
    account_id: &str,
) -> Result<(), GraphError> {
    let mut neighbours = neighbour_ids(&mut *conn, EdgeRole::Followee, account_id).await?;
    for id in neighbour_ids(&mut *conn, EdgeRole::Follower, account_id).await? {
        if !neighbours.contains(&id) {
            neighbours.push(id);
        }
    }

    refresh_profile_of(&mut *conn, account_id).await?;
    for neighbour in &neighbours {
        refresh_profile_of(&mut *conn, neighbour).await?;
    }

    Ok(())
}

impl Database {
    /// Create a profile and wire it into the existing graph
    ///
    /// The new profile's lists and every neighbour's lists are populated in
    /// the same transaction as the insert.
    pub async fn create_profile(&self, profile: &Profile) -> Result<Profile, AppError> {
        let mut tx = self.begin().await?;

        insert_profile(&mut tx, profile).await?;
        refresh_neighbourhood(&mut tx, &profile.account_id).await?;

        let created = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
            .bind(&profile.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Delete a profile owned by `account_id` and drop it from neighbours' lists
    ///
    /// # Returns
    /// `false` if no such profile is owned by the account
    pub async fn delete_profile(&self, id: &str, account_id: &str) -> Result<bool, AppError> {
        let mut tx = self.begin().await?;

        let result = sqlx::query("DELETE FROM profiles WHERE id = ? AND account_id = ?")
            .bind(id)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        refresh_neighbourhood(&mut tx, account_id).await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Profiles of the accounts following `account_id`, in follow order
    pub async fn get_follower_profiles(&self, account_id: &str) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT p.* FROM follows f
            INNER JOIN profiles p ON p.account_id = f.follower_id
            WHERE f.following_id = ?
            ORDER BY f.created_at ASC, f.rowid ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(self.pool())
        .await?;

        Ok(profiles)
    }

    /// Profiles of the accounts `account_id` follows, in follow order
    pub async fn get_following_profiles(&self, account_id: &str) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT p.* FROM follows f
            INNER JOIN profiles p ON p.account_id = f.following_id
            WHERE f.follower_id = ?
            ORDER BY f.created_at ASC, f.rowid ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(self.pool())
        .await?;

        Ok(profiles)
    }
}
