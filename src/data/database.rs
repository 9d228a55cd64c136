//! SQLite database operations
//!
//! All database access goes through this module.
//! Relationship edges live in `edges.rs`, projection maintenance in
//! `projections.rs`, communities in `community.rs` and post likes in
//! `likes.rs`; each adds methods to the same `Database`.

use sqlx::{Pool, Sqlite, SqliteConnection, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Transaction handle used for multi-row graph mutations
pub type DbTransaction = sqlx::Transaction<'static, Sqlite>;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_error) if db_error.is_unique_violation())
}

/// Insert a profile row on an open connection or transaction
///
/// # Errors
/// `AppError::Conflict` if the account already has a profile
pub(crate) async fn insert_profile(
    conn: &mut SqliteConnection,
    profile: &Profile,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO profiles (
            id, account_id, full_name, date_of_birth, gender, location,
            primary_sport, current_level, bio, achievements,
            contact_email, contact_phone, followers, following, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&profile.id)
    .bind(&profile.account_id)
    .bind(&profile.full_name)
    .bind(&profile.date_of_birth)
    .bind(&profile.gender)
    .bind(&profile.location)
    .bind(&profile.primary_sport)
    .bind(&profile.current_level)
    .bind(&profile.bio)
    .bind(&profile.achievements)
    .bind(&profile.contact_email)
    .bind(&profile.contact_phone)
    .bind(&profile.followers)
    .bind(&profile.following)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(error) if is_unique_violation(&error) => Err(AppError::Conflict(
            "Profile already exists for this user".to_string(),
        )),
        Err(error) => Err(error.into()),
    }
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        // Create connection string
        let connection_string = format!("sqlite:{}?mode=rwc", path.display());

        // Create connection pool
        let pool = SqlitePool::connect(&connection_string).await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    /// Start a transaction
    ///
    /// Dropping the returned handle without committing rolls it back.
    pub async fn begin(&self) -> Result<DbTransaction, sqlx::Error> {
        self.pool.begin().await
    }

    pub(crate) fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Insert a newly registered account
    ///
    /// # Errors
    /// `AppError::Conflict` if the email is already registered
    pub async fn insert_account(&self, account: &Account) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (
                id, full_name, email, password_hash, role, membership, profile_picture,
                followers_count, following_count, followers, following, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.full_name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.role)
        .bind(&account.membership)
        .bind(&account.profile_picture)
        .bind(account.followers_count)
        .bind(account.following_count)
        .bind(&account.followers)
        .bind(&account.following)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => {
                Err(AppError::Conflict("User already exists".to_string()))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Get account by ID
    pub async fn get_account(&self, id: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Get account by email (case-insensitive)
    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Check whether an account exists
    pub async fn account_exists(&self, id: &str) -> Result<bool, sqlx::Error> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists != 0)
    }

    /// Stored `(followers_count, following_count)` of an account
    pub async fn stored_follow_counts(&self, id: &str) -> Result<Option<(i64, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT followers_count, following_count FROM accounts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// All account IDs, oldest first
    pub async fn list_account_ids(&self) -> Result<Vec<String>, AppError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT id FROM accounts ORDER BY created_at ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Promote an existing account to the admin role
    pub async fn set_account_role(&self, id: &str, role: Role) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE accounts SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(chrono::Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Overwrite follow counters without touching edges
    #[cfg(test)]
    pub(crate) async fn set_follow_counters_for_test(
        &self,
        id: &str,
        followers_count: i64,
        following_count: i64,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE accounts SET followers_count = ?, following_count = ? WHERE id = ?")
            .bind(followers_count)
            .bind(following_count)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// Get profile by ID
    pub async fn get_profile(&self, id: &str) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    /// Get the profile owned by an account
    pub async fn get_profile_by_account(
        &self,
        account_id: &str,
    ) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE account_id = ?")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    /// Resolve a profile ID to its owning account ID
    pub async fn resolve_profile_owner(
        &self,
        profile_id: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let owner = sqlx::query_scalar::<_, String>("SELECT account_id FROM profiles WHERE id = ?")
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner)
    }

    /// List profiles, optionally excluding one account's profile
    pub async fn list_profiles(
        &self,
        excluding_account: Option<&str>,
    ) -> Result<Vec<Profile>, AppError> {
        let profiles = match excluding_account {
            Some(account_id) => {
                sqlx::query_as::<_, Profile>(
                    "SELECT * FROM profiles WHERE account_id != ? ORDER BY created_at DESC",
                )
                .bind(account_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(profiles)
    }

    /// Update the editable profile columns
    ///
    /// Follower/following projections are deliberately left out of this
    /// statement; they are owned by the projection refresh.
    ///
    /// # Returns
    /// `true` if updated, `false` if no matching profile row exists.
    pub async fn update_profile(&self, profile: &Profile) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET full_name = ?, date_of_birth = ?, gender = ?, location = ?,
                primary_sport = ?, current_level = ?, bio = ?, achievements = ?,
                contact_email = ?, contact_phone = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.full_name)
        .bind(&profile.date_of_birth)
        .bind(&profile.gender)
        .bind(&profile.location)
        .bind(&profile.primary_sport)
        .bind(&profile.current_level)
        .bind(&profile.bio)
        .bind(&profile.achievements)
        .bind(&profile.contact_email)
        .bind(&profile.contact_phone)
        .bind(profile.updated_at)
        .bind(&profile.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Blog posts
    // =========================================================================

    /// Insert a blog post
    pub async fn insert_blog_post(&self, post: &BlogPost) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO blog_posts (
                id, author_id, title, summary, category, tags, content,
                status, visibility, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.author_id)
        .bind(&post.title)
        .bind(&post.summary)
        .bind(&post.category)
        .bind(&post.tags)
        .bind(&post.content)
        .bind(&post.status)
        .bind(&post.visibility)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get blog post by ID
    pub async fn get_blog_post(&self, id: &str) -> Result<Option<BlogPost>, AppError> {
        let post = sqlx::query_as::<_, BlogPost>("SELECT * FROM blog_posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    /// Update the editable blog post columns
    pub async fn update_blog_post(&self, post: &BlogPost) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE blog_posts
            SET title = ?, summary = ?, category = ?, tags = ?, content = ?,
                status = ?, visibility = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.summary)
        .bind(&post.category)
        .bind(&post.tags)
        .bind(&post.content)
        .bind(&post.status)
        .bind(&post.visibility)
        .bind(post.updated_at)
        .bind(&post.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete blog post
    pub async fn delete_blog_post(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All posts by one author, newest first
    pub async fn get_blog_posts_by_author(
        &self,
        author_id: &str,
    ) -> Result<Vec<BlogPost>, AppError> {
        let posts = sqlx::query_as::<_, BlogPost>(
            "SELECT * FROM blog_posts WHERE author_id = ? ORDER BY created_at DESC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Published public posts, newest first, optionally filtered by category
    pub async fn get_public_blog_posts(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<BlogPost>, AppError> {
        let posts = match category {
            Some(category) => {
                sqlx::query_as::<_, BlogPost>(
                    r#"
                    SELECT * FROM blog_posts
                    WHERE status = 'Published' AND visibility = 'Public' AND category = ?
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(category)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, BlogPost>(
                    r#"
                    SELECT * FROM blog_posts
                    WHERE status = 'Published' AND visibility = 'Public'
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(posts)
    }

    /// Distinct categories of published public posts
    pub async fn get_public_blog_categories(&self) -> Result<Vec<String>, AppError> {
        let categories = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT category FROM blog_posts
            WHERE status = 'Published' AND visibility = 'Public' AND category IS NOT NULL
            ORDER BY category ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Count every post authored by an account, regardless of publication state
    pub async fn count_posts_by_author(&self, author_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM blog_posts WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
    }

    // =========================================================================
    // Membership plans
    // =========================================================================

    /// List membership plans, cheapest first
    pub async fn get_membership_plans(&self) -> Result<Vec<MembershipPlan>, AppError> {
        let plans = sqlx::query_as::<_, MembershipPlan>(
            "SELECT * FROM membership_plans ORDER BY price_per_month ASC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    /// Insert a membership plan
    ///
    /// # Errors
    /// `AppError::Conflict` if a plan with that name already exists
    pub async fn insert_membership_plan(&self, plan: &MembershipPlan) -> Result<(), AppError> {
        let result = sqlx::query(
            "INSERT INTO membership_plans (id, name, price_per_month, features) VALUES (?, ?, ?, ?)",
        )
        .bind(&plan.id)
        .bind(&plan.name)
        .bind(plan.price_per_month)
        .bind(&plan.features)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => Err(AppError::Conflict(format!(
                "Membership plan {} already exists",
                plan.name
            ))),
            Err(error) => Err(error.into()),
        }
    }

    // =========================================================================
    // Resumes
    // =========================================================================

    /// Insert a resume
    ///
    /// # Errors
    /// `AppError::Conflict` if the account already has a resume
    pub async fn insert_resume(&self, resume: &Resume) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO resumes (
                id, account_id, full_name, date_of_birth, gender, nationality,
                email, phone, address, athletic_details, education, career_stats,
                achievements, tournaments, skills, certifications, referees,
                video_links, social_links, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&resume.id)
        .bind(&resume.account_id)
        .bind(&resume.full_name)
        .bind(&resume.date_of_birth)
        .bind(&resume.gender)
        .bind(&resume.nationality)
        .bind(&resume.email)
        .bind(&resume.phone)
        .bind(&resume.address)
        .bind(&resume.athletic_details)
        .bind(&resume.education)
        .bind(&resume.career_stats)
        .bind(&resume.achievements)
        .bind(&resume.tournaments)
        .bind(&resume.skills)
        .bind(&resume.certifications)
        .bind(&resume.referees)
        .bind(&resume.video_links)
        .bind(&resume.social_links)
        .bind(resume.created_at)
        .bind(resume.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => Err(AppError::Conflict(
                "Resume already exists for this user; update it instead".to_string(),
            )),
            Err(error) => Err(error.into()),
        }
    }

    pub async fn get_resume(&self, id: &str) -> Result<Option<Resume>, AppError> {
        let resume = sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(resume)
    }

    pub async fn get_resume_by_account(&self, account_id: &str) -> Result<Option<Resume>, AppError> {
        let resume = sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE account_id = ?")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(resume)
    }

    /// Update every editable resume column
    pub async fn update_resume(&self, resume: &Resume) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE resumes
            SET full_name = ?, date_of_birth = ?, gender = ?, nationality = ?,
                email = ?, phone = ?, address = ?, athletic_details = ?, education = ?,
                career_stats = ?, achievements = ?, tournaments = ?, skills = ?,
                certifications = ?, referees = ?, video_links = ?, social_links = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&resume.full_name)
        .bind(&resume.date_of_birth)
        .bind(&resume.gender)
        .bind(&resume.nationality)
        .bind(&resume.email)
        .bind(&resume.phone)
        .bind(&resume.address)
        .bind(&resume.athletic_details)
        .bind(&resume.education)
        .bind(&resume.career_stats)
        .bind(&resume.achievements)
        .bind(&resume.tournaments)
        .bind(&resume.skills)
        .bind(&resume.certifications)
        .bind(&resume.referees)
        .bind(&resume.video_links)
        .bind(&resume.social_links)
        .bind(resume.updated_at)
        .bind(&resume.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Contact messages
    // =========================================================================

    pub async fn insert_contact_message(&self, message: &ContactMessage) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO contact_messages (id, name, email, subject, message, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Contact messages, newest first
    pub async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, AppError> {
        let messages = sqlx::query_as::<_, ContactMessage>(
            "SELECT * FROM contact_messages ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
