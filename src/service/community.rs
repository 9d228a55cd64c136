//! Community service
//!
//! Communities and the community feed: posts, likes and comments. A like is
//! a set membership, so toggling runs the delete and the insert in one
//! transaction.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use super::account::normalize_required;
use super::profile::normalize_optional_text;
use crate::auth::Session;
use crate::data::{
    Account, Community, CommunityPost, CommunityPostView, Database, EntityId, PostComment,
    PostCommentView, likes,
};
use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Create/update input for a community
///
/// On update, omitted or empty fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommunityPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sport_category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCommunityPost {
    pub text: String,
    #[serde(default)]
    pub community_id: Option<String>,
}

/// Feed page request; out-of-range values are clamped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageRequest {
    /// `(page, limit)` with page ≥ 1 and 1 ≤ limit ≤ `MAX_PAGE_SIZE`
    pub fn resolve(self) -> (i64, i64) {
        let page = self.page.filter(|page| *page >= 1).unwrap_or(1);
        let limit = self
            .limit
            .filter(|limit| *limit >= 1)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        (page, limit)
    }
}

/// A community with its creator resolved
#[derive(Debug, Clone)]
pub struct CommunityDetails {
    pub community: Community,
    pub creator: Account,
}

/// A post with its likers and comments
#[derive(Debug, Clone)]
pub struct PostThread {
    pub post: CommunityPostView,
    pub likers: Vec<Account>,
    pub comments: Vec<PostCommentView>,
}

#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<PostThread>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_posts: i64,
}

/// Outcome of a like toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeToggle {
    /// Whether the actor likes the post after the toggle
    pub liked: bool,
    /// Account IDs liking the post, in like order
    pub likers: Vec<String>,
}

fn may_manage(actor: &Session, owner_id: &str) -> bool {
    actor.account_id == owner_id || actor.is_admin()
}

impl CommunityPatch {
    fn apply(self, community: &mut Community) {
        if let Some(name) = self.name.and_then(normalize_optional_text) {
            community.name = name;
        }
        if let Some(description) = self.description.and_then(normalize_optional_text) {
            community.description = Some(description);
        }
        if let Some(sport_category) = self.sport_category.and_then(normalize_optional_text) {
            community.sport_category = Some(sport_category);
        }
    }
}

/// Community service
pub struct CommunityService {
    db: Arc<Database>,
}

impl CommunityService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // =========================================================================
    // Communities
    // =========================================================================

    /// Create a community owned by `actor_id`
    ///
    /// # Errors
    /// - `Validation` if `name` is missing
    /// - `Conflict` if the name is taken
    pub async fn create_community(
        &self,
        actor_id: &str,
        input: CommunityPatch,
    ) -> Result<Community, AppError> {
        let name = normalize_required(input.name.as_deref().unwrap_or_default(), "name")?;

        let now = Utc::now();
        let community = Community {
            id: EntityId::new().0,
            name,
            description: input.description.and_then(normalize_optional_text),
            sport_category: input.sport_category.and_then(normalize_optional_text),
            created_by: actor_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_community(&community).await?;
        tracing::info!(community = %community.id, name = %community.name, "Community created");

        Ok(community)
    }

    pub async fn list_communities(&self) -> Result<Vec<Community>, AppError> {
        self.db.list_communities().await
    }

    async fn get_community(&self, id: &str) -> Result<Community, AppError> {
        self.db
            .get_community(id)
            .await?
            .ok_or(AppError::NotFound("Community"))
    }

    pub async fn get_community_details(&self, id: &str) -> Result<CommunityDetails, AppError> {
        let community = self.get_community(id).await?;
        let creator = self
            .db
            .get_account(&community.created_by)
            .await?
            .ok_or(AppError::NotFound("User"))?;
        Ok(CommunityDetails { community, creator })
    }

    /// Update a community; creator or admin only
    pub async fn update_community(
        &self,
        id: &str,
        actor: &Session,
        patch: CommunityPatch,
    ) -> Result<Community, AppError> {
        let mut community = self.get_community(id).await?;
        if !may_manage(actor, &community.created_by) {
            return Err(AppError::Forbidden);
        }

        patch.apply(&mut community);
        community.updated_at = Utc::now();
        if !self.db.update_community(&community).await? {
            return Err(AppError::NotFound("Community"));
        }
        Ok(community)
    }

    /// Delete a community; creator or admin only
    pub async fn delete_community(&self, id: &str, actor: &Session) -> Result<(), AppError> {
        let community = self.get_community(id).await?;
        if !may_manage(actor, &community.created_by) {
            return Err(AppError::Forbidden);
        }

        if !self.db.delete_community(id).await? {
            return Err(AppError::NotFound("Community"));
        }
        tracing::info!(community = %id, actor = %actor.account_id, "Community deleted");
        Ok(())
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Publish a post on the feed
    ///
    /// # Errors
    /// - `Validation` if the text is empty
    /// - `NotFound` if `communityId` names no community
    pub async fn create_post(
        &self,
        author_id: &str,
        input: NewCommunityPost,
    ) -> Result<PostThread, AppError> {
        let text = normalize_required(&input.text, "text")?;
        let community_id = input.community_id.and_then(normalize_optional_text);
        if let Some(community_id) = &community_id {
            self.get_community(community_id).await?;
        }

        let now = Utc::now();
        let post = CommunityPost {
            id: EntityId::new().0,
            author_id: author_id.to_string(),
            community_id,
            text,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_community_post(&post).await?;
        tracing::info!(author = %author_id, post = %post.id, "Community post created");

        self.get_post(&post.id).await
    }

    /// A post with likers and comments
    pub async fn get_post(&self, id: &str) -> Result<PostThread, AppError> {
        let post = self
            .db
            .get_community_post_view(id)
            .await?
            .ok_or(AppError::NotFound("Community post"))?;
        self.thread(post).await
    }

    async fn thread(&self, post: CommunityPostView) -> Result<PostThread, AppError> {
        let likers = self.db.get_post_likers(&post.post.id).await?;
        let comments = self.db.get_post_comments(&post.post.id).await?;
        Ok(PostThread {
            post,
            likers,
            comments,
        })
    }

    /// One page of the feed, newest first
    pub async fn list_posts(
        &self,
        community_id: Option<&str>,
        request: PageRequest,
    ) -> Result<PostPage, AppError> {
        let (page, limit) = request.resolve();
        let community_id = community_id.map(str::trim).filter(|id| !id.is_empty());

        let total_posts = self.db.count_community_posts(community_id).await?;
        let views = self
            .db
            .list_community_posts(community_id, limit, (page - 1) * limit)
            .await?;

        let mut posts = Vec::with_capacity(views.len());
        for view in views {
            posts.push(self.thread(view).await?);
        }

        Ok(PostPage {
            posts,
            current_page: page,
            total_pages: (total_posts + limit - 1) / limit,
            total_posts,
        })
    }

    /// Like the post if the actor does not like it yet, otherwise unlike it
    pub async fn toggle_like(&self, post_id: &str, actor_id: &str) -> Result<LikeToggle, AppError> {
        if self.db.get_community_post(post_id).await?.is_none() {
            return Err(AppError::NotFound("Community post"));
        }

        let mut tx = self.db.begin().await?;
        // The delete takes the write lock, so no other toggle can interleave
        // before the insert below.
        let liked = if likes::delete_like(&mut tx, post_id, actor_id).await? {
            false
        } else {
            likes::create_like(&mut tx, post_id, actor_id).await?;
            true
        };
        let likers = likes::liker_ids(&mut *tx, post_id).await?;
        tx.commit().await?;

        tracing::debug!(post = %post_id, actor = %actor_id, liked, "Community post like toggled");
        Ok(LikeToggle { liked, likers })
    }

    /// Comment on a post
    ///
    /// # Errors
    /// - `NotFound` if the post does not exist
    /// - `Validation` if the text is empty
    pub async fn add_comment(
        &self,
        post_id: &str,
        author_id: &str,
        text: &str,
    ) -> Result<PostCommentView, AppError> {
        if self.db.get_community_post(post_id).await?.is_none() {
            return Err(AppError::NotFound("Community post"));
        }
        let text = normalize_required(text, "text")?;

        let comment = PostComment {
            id: EntityId::new().0,
            post_id: post_id.to_string(),
            author_id: author_id.to_string(),
            text,
            created_at: Utc::now(),
        };
        self.db.insert_post_comment(&comment).await?;

        self.db
            .get_post_comment_view(&comment.id)
            .await?
            .ok_or(AppError::NotFound("Comment"))
    }

    /// Delete a post with its likes and comments; author or admin only
    pub async fn delete_post(&self, id: &str, actor: &Session) -> Result<(), AppError> {
        let post = self
            .db
            .get_community_post(id)
            .await?
            .ok_or(AppError::NotFound("Community post"))?;
        if !may_manage(actor, &post.author_id) {
            tracing::warn!(post = %id, actor = %actor.account_id, "Community post delete refused");
            return Err(AppError::Forbidden);
        }

        if !self.db.delete_community_post(id).await? {
            return Err(AppError::NotFound("Community post"));
        }
        tracing::info!(post = %id, "Community post deleted");
        Ok(())
    }
}
