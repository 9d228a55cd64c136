//! Communities, community posts and their comments
//!
//! Likes live in `likes.rs`.

use super::database::{Database, is_unique_violation};
use super::models::{Community, CommunityPost, CommunityPostView, PostComment, PostCommentView};
use crate::error::AppError;

const POST_VIEW_SELECT: &str = r#"
    SELECT p.*, a.full_name AS author_full_name, a.profile_picture AS author_profile_picture
    FROM community_posts p
    INNER JOIN accounts a ON a.id = p.author_id
"#;

const COMMENT_VIEW_SELECT: &str = r#"
    SELECT c.*, a.full_name AS author_full_name, a.profile_picture AS author_profile_picture
    FROM community_post_comments c
    INNER JOIN accounts a ON a.id = c.author_id
"#;

fn community_name_conflict(name: &str) -> AppError {
    AppError::Conflict(format!("Community {name} already exists"))
}

impl Database {
    // =========================================================================
    // Communities
    // =========================================================================

    /// Insert a community
    ///
    /// # Errors
    /// `AppError::Conflict` if the name is taken (case-insensitive)
    pub async fn insert_community(&self, community: &Community) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO communities (
                id, name, description, sport_category, created_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&community.id)
        .bind(&community.name)
        .bind(&community.description)
        .bind(&community.sport_category)
        .bind(&community.created_by)
        .bind(community.created_at)
        .bind(community.updated_at)
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => Err(community_name_conflict(&community.name)),
            Err(error) => Err(error.into()),
        }
    }

    pub async fn get_community(&self, id: &str) -> Result<Option<Community>, AppError> {
        let community = sqlx::query_as::<_, Community>("SELECT * FROM communities WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(community)
    }

    /// All communities, alphabetically
    pub async fn list_communities(&self) -> Result<Vec<Community>, AppError> {
        let communities = sqlx::query_as::<_, Community>(
            "SELECT * FROM communities ORDER BY name COLLATE NOCASE ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(communities)
    }

    /// Update the editable community columns
    ///
    /// # Errors
    /// `AppError::Conflict` if the new name is taken
    pub async fn update_community(&self, community: &Community) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE communities
            SET name = ?, description = ?, sport_category = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&community.name)
        .bind(&community.description)
        .bind(&community.sport_category)
        .bind(community.updated_at)
        .bind(&community.id)
        .execute(self.pool())
        .await;

        match result {
            Ok(result) => Ok(result.rows_affected() == 1),
            Err(error) if is_unique_violation(&error) => Err(community_name_conflict(&community.name)),
            Err(error) => Err(error.into()),
        }
    }

    /// Delete a community; its posts stay on the feed without a community
    pub async fn delete_community(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM communities WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Community posts
    // =========================================================================

    pub async fn insert_community_post(&self, post: &CommunityPost) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO community_posts (id, author_id, community_id, text, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.author_id)
        .bind(&post.community_id)
        .bind(&post.text)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn get_community_post(&self, id: &str) -> Result<Option<CommunityPost>, AppError> {
        let post = sqlx::query_as::<_, CommunityPost>("SELECT * FROM community_posts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(post)
    }

    /// Get a post with its author's display fields
    pub async fn get_community_post_view(
        &self,
        id: &str,
    ) -> Result<Option<CommunityPostView>, AppError> {
        let view = sqlx::query_as::<_, CommunityPostView>(&format!(
            "{POST_VIEW_SELECT} WHERE p.id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(view)
    }

    /// One page of the feed, newest first, optionally within one community
    pub async fn list_community_posts(
        &self,
        community_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommunityPostView>, AppError> {
        let posts = match community_id {
            Some(community_id) => {
                sqlx::query_as::<_, CommunityPostView>(&format!(
                    "{POST_VIEW_SELECT} WHERE p.community_id = ? \
                     ORDER BY p.created_at DESC, p.rowid DESC LIMIT ? OFFSET ?"
                ))
                .bind(community_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, CommunityPostView>(&format!(
                    "{POST_VIEW_SELECT} ORDER BY p.created_at DESC, p.rowid DESC LIMIT ? OFFSET ?"
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(self.pool())
                .await?
            }
        };

        Ok(posts)
    }

    pub async fn count_community_posts(&self, community_id: Option<&str>) -> Result<i64, AppError> {
        let count = match community_id {
            Some(community_id) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM community_posts WHERE community_id = ?",
                )
                .bind(community_id)
                .fetch_one(self.pool())
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM community_posts")
                    .fetch_one(self.pool())
                    .await?
            }
        };

        Ok(count)
    }

    /// Delete a post together with its likes and comments
    pub async fn delete_community_post(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM community_posts WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Comments
    // =========================================================================

    pub async fn insert_post_comment(&self, comment: &PostComment) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO community_post_comments (id, post_id, author_id, text, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&comment.id)
        .bind(&comment.post_id)
        .bind(&comment.author_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn get_post_comment_view(&self, id: &str) -> Result<Option<PostCommentView>, AppError> {
        let comment = sqlx::query_as::<_, PostCommentView>(&format!(
            "{COMMENT_VIEW_SELECT} WHERE c.id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(comment)
    }

    /// Comments on a post, oldest first
    pub async fn get_post_comments(&self, post_id: &str) -> Result<Vec<PostCommentView>, AppError> {
        let comments = sqlx::query_as::<_, PostCommentView>(&format!(
            "{COMMENT_VIEW_SELECT} WHERE c.post_id = ? ORDER BY c.created_at ASC, c.rowid ASC"
        ))
        .bind(post_id)
        .fetch_all(self.pool())
        .await?;

        Ok(comments)
    }
}
