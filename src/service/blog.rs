//! Blog service
//!
//! Blog post CRUD. Content is sanitized on every write; edits and deletes
//! are restricted to the author.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json;

use crate::data::{BlogPost, Database, EntityId, PublicationStatus, Visibility};
use crate::error::AppError;

/// Create/update input
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BlogPatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub content: Option<String>,
    /// Accepts "Draft"/"draft" or "Published"/"published"/"publish"
    pub status: Option<String>,
    /// Accepts "Public"/"public" or "Private"/"private"
    pub visibility: Option<String>,
}

fn parse_status(value: &str) -> Result<PublicationStatus, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "draft" => Ok(PublicationStatus::Draft),
        "published" | "publish" => Ok(PublicationStatus::Published),
        other => Err(AppError::Validation(format!("unknown status \"{other}\""))),
    }
}

fn parse_visibility(value: &str) -> Result<Visibility, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "public" => Ok(Visibility::Public),
        "private" => Ok(Visibility::Private),
        other => Err(AppError::Validation(format!("unknown visibility \"{other}\""))),
    }
}

/// Trim tags and drop empty or repeated ones, keeping first-seen order
pub(super) fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !normalized.iter().any(|existing| existing == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

fn required_text(value: String, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn sanitize_content(content: String) -> Result<String, AppError> {
    let clean = ammonia::clean(&content);
    if clean.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }
    Ok(clean)
}

impl BlogPatch {
    fn apply(self, post: &mut BlogPost) -> Result<(), AppError> {
        if let Some(title) = self.title {
            post.title = required_text(title, "title")?;
        }
        if let Some(summary) = self.summary {
            post.summary = required_text(summary, "summary")?;
        }
        if let Some(category) = self.category {
            let category = category.trim();
            post.category = (!category.is_empty()).then(|| category.to_string());
        }
        if let Some(tags) = self.tags {
            post.tags = Json(normalize_tags(tags));
        }
        if let Some(content) = self.content {
            post.content = sanitize_content(content)?;
        }
        if let Some(status) = self.status {
            post.status = parse_status(&status)?.as_str().to_string();
        }
        if let Some(visibility) = self.visibility {
            post.visibility = parse_visibility(&visibility)?.as_str().to_string();
        }
        Ok(())
    }
}

/// Blog service
pub struct BlogService {
    db: Arc<Database>,
}

impl BlogService {
    /// Create new blog service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a post authored by `author_id`
    ///
    /// # Errors
    /// `Validation` if title, summary or content is missing, or status or
    /// visibility is not recognized
    pub async fn create(&self, author_id: &str, input: BlogPatch) -> Result<BlogPost, AppError> {
        for (field, value) in [
            ("title", &input.title),
            ("summary", &input.summary),
            ("content", &input.content),
        ] {
            if value.as_deref().map(str::trim).is_none_or(str::is_empty) {
                return Err(AppError::Validation(format!("{field} is required")));
            }
        }

        let now = Utc::now();
        let mut post = BlogPost {
            id: EntityId::new().0,
            author_id: author_id.to_string(),
            title: String::new(),
            summary: String::new(),
            category: None,
            tags: Json(Vec::new()),
            content: String::new(),
            status: PublicationStatus::default().as_str().to_string(),
            visibility: Visibility::default().as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        input.apply(&mut post)?;

        self.db.insert_blog_post(&post).await?;
        tracing::info!(author = %author_id, post = %post.id, status = %post.status, "Blog post created");

        Ok(post)
    }

    /// Get post by ID
    pub async fn get(&self, id: &str) -> Result<BlogPost, AppError> {
        self.db
            .get_blog_post(id)
            .await?
            .ok_or(AppError::NotFound("Blog post"))
    }

    async fn get_owned(&self, id: &str, actor_id: &str) -> Result<BlogPost, AppError> {
        let post = self.get(id).await?;
        if post.author_id != actor_id {
            tracing::warn!(post = %id, actor = %actor_id, "Blog post edit refused for non-author");
            return Err(AppError::Forbidden);
        }
        Ok(post)
    }

    /// Apply a partial update; author only
    pub async fn update(&self, id: &str, actor_id: &str, patch: BlogPatch) -> Result<BlogPost, AppError> {
        let mut post = self.get_owned(id, actor_id).await?;
        patch.apply(&mut post)?;
        post.updated_at = Utc::now();

        if !self.db.update_blog_post(&post).await? {
            return Err(AppError::NotFound("Blog post"));
        }
        Ok(post)
    }

    /// Delete a post; author only
    pub async fn delete(&self, id: &str, actor_id: &str) -> Result<(), AppError> {
        self.get_owned(id, actor_id).await?;
        if !self.db.delete_blog_post(id).await? {
            return Err(AppError::NotFound("Blog post"));
        }
        tracing::info!(post = %id, "Blog post deleted");
        Ok(())
    }

    /// Published public posts, newest first
    ///
    /// A category of "All" (or empty) disables the filter.
    pub async fn list_public(&self, category: Option<&str>) -> Result<Vec<BlogPost>, AppError> {
        let category = category
            .map(str::trim)
            .filter(|category| !category.is_empty() && *category != "All");
        self.db.get_public_blog_posts(category).await
    }

    /// Distinct categories among published public posts
    pub async fn categories(&self) -> Result<Vec<String>, AppError> {
        self.db.get_public_blog_categories().await
    }

    /// Every post by an author, whatever its status
    pub async fn list_by_author(&self, author_id: &str) -> Result<Vec<BlogPost>, AppError> {
        self.db.get_blog_posts_by_author(author_id).await
    }
}
