//! Profile service
//!
//! Profile CRUD. Follower/following lists on a profile are never written
//! here; they are projections maintained by the graph service.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json;

use crate::data::{Account, Achievement, BlogPost, CurrentLevel, Database, EntityId, Profile};
use crate::error::AppError;

/// Create/update input
///
/// Every field is optional so the same shape serves partial updates.
/// An empty string clears an optional text field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub primary_sport: Option<String>,
    pub current_level: Option<CurrentLevel>,
    pub bio: Option<String>,
    pub achievements: Option<Vec<Achievement>>,
    #[serde(rename = "email")]
    pub contact_email: Option<String>,
    #[serde(rename = "phone")]
    pub contact_phone: Option<String>,
}

/// A profile with its owner, graph neighbours and posts resolved
#[derive(Debug, Clone)]
pub struct ProfileDetails {
    pub profile: Profile,
    pub owner: Account,
    pub followers: Vec<Profile>,
    pub following: Vec<Profile>,
    pub posts: Vec<BlogPost>,
}

pub(super) fn normalize_optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn normalize_achievements(achievements: Vec<Achievement>) -> Result<Vec<Achievement>, AppError> {
    achievements
        .into_iter()
        .map(|achievement| {
            let title = achievement.title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::Validation(
                    "achievement title is required".to_string(),
                ));
            }
            Ok(Achievement {
                title,
                date: achievement.date.and_then(normalize_optional_text),
                description: achievement.description.and_then(normalize_optional_text),
            })
        })
        .collect()
}

impl ProfilePatch {
    fn apply(self, profile: &mut Profile) -> Result<(), AppError> {
        if let Some(full_name) = self.full_name {
            profile.full_name = normalize_optional_text(full_name)
                .ok_or_else(|| AppError::Validation("fullName cannot be empty".to_string()))?;
        }
        if let Some(value) = self.date_of_birth {
            profile.date_of_birth = normalize_optional_text(value);
        }
        if let Some(value) = self.gender {
            profile.gender = normalize_optional_text(value);
        }
        if let Some(value) = self.location {
            profile.location = normalize_optional_text(value);
        }
        if let Some(value) = self.primary_sport {
            profile.primary_sport = normalize_optional_text(value);
        }
        if let Some(level) = self.current_level {
            profile.current_level = Some(level.as_str().to_string());
        }
        if let Some(value) = self.bio {
            profile.bio = normalize_optional_text(value);
        }
        if let Some(achievements) = self.achievements {
            profile.achievements = Json(normalize_achievements(achievements)?);
        }
        if let Some(value) = self.contact_email {
            profile.contact_email = normalize_optional_text(value);
        }
        if let Some(value) = self.contact_phone {
            profile.contact_phone = normalize_optional_text(value);
        }
        Ok(())
    }
}

/// Profile service
pub struct ProfileService {
    db: Arc<Database>,
}

impl ProfileService {
    /// Create new profile service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create the caller's profile
    ///
    /// Existing follow edges of the account are reflected in the new
    /// profile's lists immediately.
    ///
    /// # Errors
    /// - `Validation` if `fullName` is missing
    /// - `Conflict` if the account already has a profile
    pub async fn create(&self, account_id: &str, input: ProfilePatch) -> Result<Profile, AppError> {
        if input
            .full_name
            .as_deref()
            .map(str::trim)
            .is_none_or(str::is_empty)
        {
            return Err(AppError::Validation("fullName is required".to_string()));
        }
        if !self.db.account_exists(account_id).await? {
            return Err(AppError::NotFound("User"));
        }

        let now = Utc::now();
        let mut profile = Profile {
            id: EntityId::new().0,
            account_id: account_id.to_string(),
            full_name: String::new(),
            date_of_birth: None,
            gender: None,
            location: None,
            primary_sport: None,
            current_level: None,
            bio: None,
            achievements: Json(Vec::new()),
            contact_email: None,
            contact_phone: None,
            followers: Json(Vec::new()),
            following: Json(Vec::new()),
            created_at: now,
            updated_at: now,
        };
        input.apply(&mut profile)?;

        let created = self.db.create_profile(&profile).await?;
        tracing::info!(account = %account_id, profile = %created.id, "Profile created");

        Ok(created)
    }

    /// Get the caller's own profile
    pub async fn get_own(&self, account_id: &str) -> Result<Profile, AppError> {
        self.db
            .get_profile_by_account(account_id)
            .await?
            .ok_or(AppError::NotFound("Profile"))
    }

    /// Apply a partial update to the caller's profile
    pub async fn update(&self, account_id: &str, patch: ProfilePatch) -> Result<Profile, AppError> {
        let mut profile = self.get_own(account_id).await?;
        patch.apply(&mut profile)?;
        profile.updated_at = Utc::now();

        if !self.db.update_profile(&profile).await? {
            return Err(AppError::NotFound("Profile"));
        }

        // Re-read so concurrently refreshed projections are not reported stale.
        self.get_own(account_id).await
    }

    /// All profiles, newest first
    pub async fn list_all(&self) -> Result<Vec<Profile>, AppError> {
        self.db.list_profiles(None).await
    }

    /// All profiles except the caller's
    pub async fn list_except(&self, account_id: &str) -> Result<Vec<Profile>, AppError> {
        self.db.list_profiles(Some(account_id)).await
    }

    /// Profile by ID with owner, neighbour profiles and posts
    pub async fn get_details(&self, profile_id: &str) -> Result<ProfileDetails, AppError> {
        let profile = self
            .db
            .get_profile(profile_id)
            .await?
            .ok_or(AppError::NotFound("Profile"))?;
        let owner = self
            .db
            .get_account(&profile.account_id)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        let followers = self.db.get_follower_profiles(&profile.account_id).await?;
        let following = self.db.get_following_profiles(&profile.account_id).await?;
        let posts = self.db.get_blog_posts_by_author(&profile.account_id).await?;

        Ok(ProfileDetails {
            profile,
            owner,
            followers,
            following,
            posts,
        })
    }

    /// Delete the caller's profile
    ///
    /// Account-level follow edges are kept; only profile projections change.
    ///
    /// # Errors
    /// - `NotFound` if the profile does not exist
    /// - `Forbidden` if it belongs to another account
    pub async fn delete(&self, account_id: &str, profile_id: &str) -> Result<(), AppError> {
        let owner = self
            .db
            .resolve_profile_owner(profile_id)
            .await?
            .ok_or(AppError::NotFound("Profile"))?;
        if owner != account_id {
            return Err(AppError::Forbidden);
        }

        if !self.db.delete_profile(profile_id, account_id).await? {
            return Err(AppError::NotFound("Profile"));
        }
        tracing::info!(account = %account_id, profile = %profile_id, "Profile deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Role;
    use crate::service::{AccountService, GraphService, NewAccount};
    use tempfile::TempDir;

    async fn create_test_db() -> (Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("service-profile.db");
        let db = Database::connect(&db_path).await.unwrap();
        (Arc::new(db), temp_dir)
    }

    async fn register(db: &Arc<Database>, email: &str) -> Account {
        AccountService::new(db.clone())
            .register(NewAccount {
                full_name: "Test Athlete".to_string(),
                email: email.to_string(),
                password: "long-enough-password".to_string(),
                role: Role::Athlete,
            })
            .await
            .unwrap()
    }

    fn patch(full_name: &str) -> ProfilePatch {
        ProfilePatch {
            full_name: Some(full_name.to_string()),
            primary_sport: Some(" Athletics ".to_string()),
            current_level: Some(CurrentLevel::SemiProfessional),
            achievements: Some(vec![Achievement {
                title: " State champion ".to_string(),
                date: Some("2023-05-01".to_string()),
                description: Some(String::new()),
            }]),
            contact_email: Some("contact@example.com".to_string()),
            ..ProfilePatch::default()
        }
    }

    #[tokio::test]
    async fn create_and_read_own_profile() {
        let (db, _temp_dir) = create_test_db().await;
        let service = ProfileService::new(db.clone());
        let account = register(&db, "a@example.com").await;

        let profile = service.create(&account.id, patch("Asha K")).await.unwrap();
        assert_eq!(profile.full_name, "Asha K");
        assert_eq!(profile.primary_sport.as_deref(), Some("Athletics"));
        assert_eq!(profile.current_level.as_deref(), Some("semi-professional"));
        assert_eq!(profile.achievements.0[0].title, "State champion");
        assert_eq!(profile.achievements.0[0].description, None);

        assert_eq!(service.get_own(&account.id).await.unwrap(), profile);

        let duplicate = service.create(&account.id, patch("Again")).await.unwrap_err();
        assert!(matches!(duplicate, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_requires_full_name() {
        let (db, _temp_dir) = create_test_db().await;
        let service = ProfileService::new(db.clone());
        let account = register(&db, "a@example.com").await;

        let error = service
            .create(&account.id, ProfilePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));

        let error = service.get_own(&account.id).await.unwrap_err();
        assert!(matches!(error, AppError::NotFound("Profile")));
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_fields_and_projections() {
        let (db, _temp_dir) = create_test_db().await;
        let service = ProfileService::new(db.clone());
        let graph = GraphService::new(db.clone(), false);
        let a = register(&db, "a@example.com").await;
        let b = register(&db, "b@example.com").await;
        service.create(&a.id, patch("Asha")).await.unwrap();
        let b_profile = service.create(&b.id, patch("Bilal")).await.unwrap();
        graph.follow(&b.id, &a.id).await.unwrap();

        let updated = service
            .update(
                &a.id,
                ProfilePatch {
                    bio: Some("Sprinter".to_string()),
                    location: Some(String::new()),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.bio.as_deref(), Some("Sprinter"));
        assert_eq!(updated.location, None);
        assert_eq!(updated.full_name, "Asha");
        assert_eq!(updated.primary_sport.as_deref(), Some("Athletics"));
        assert_eq!(updated.followers.0, vec![b_profile.id]);

        let error = service
            .update(
                &a.id,
                ProfilePatch {
                    full_name: Some(" ".to_string()),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn listing_and_details() {
        let (db, _temp_dir) = create_test_db().await;
        let service = ProfileService::new(db.clone());
        let graph = GraphService::new(db.clone(), false);
        let a = register(&db, "a@example.com").await;
        let b = register(&db, "b@example.com").await;
        let a_profile = service.create(&a.id, patch("Asha")).await.unwrap();
        let b_profile = service.create(&b.id, patch("Bilal")).await.unwrap();

        assert_eq!(service.list_all().await.unwrap().len(), 2);
        let others = service.list_except(&a.id).await.unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].id, b_profile.id);

        graph.follow(&a.id, &b.id).await.unwrap();
        let details = service.get_details(&b_profile.id).await.unwrap();
        assert_eq!(details.owner.id, b.id);
        assert_eq!(details.followers.len(), 1);
        assert_eq!(details.followers[0].id, a_profile.id);
        assert!(details.following.is_empty());
        assert!(details.posts.is_empty());

        let error = service.get_details("missing").await.unwrap_err();
        assert!(matches!(error, AppError::NotFound("Profile")));
    }

    #[tokio::test]
    async fn delete_only_own_profile() {
        let (db, _temp_dir) = create_test_db().await;
        let service = ProfileService::new(db.clone());
        let a = register(&db, "a@example.com").await;
        let b = register(&db, "b@example.com").await;
        let a_profile = service.create(&a.id, patch("Asha")).await.unwrap();

        let error = service.delete(&b.id, &a_profile.id).await.unwrap_err();
        assert!(matches!(error, AppError::Forbidden));

        service.delete(&a.id, &a_profile.id).await.unwrap();
        let error = service.delete(&a.id, &a_profile.id).await.unwrap_err();
        assert!(matches!(error, AppError::NotFound("Profile")));
    }
}
