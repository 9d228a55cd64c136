//! Resume service
//!
//! One sports resume per account. Updates replace whichever top-level fields
//! the request carries.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json;

use super::account::normalize_email;
use super::blog::normalize_tags;
use super::profile::normalize_optional_text;
use crate::auth::Session;
use crate::data::{
    Account, Achievement, AthleticDetails, Certification, Database, Education, EntityId, Referee,
    Resume, Tournament,
};
use crate::error::AppError;

/// Create/update input
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResumePatch {
    pub full_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub athletic_details: Option<AthleticDetails>,
    pub education: Option<Vec<Education>>,
    pub career_stats: Option<String>,
    pub achievements: Option<Vec<Achievement>>,
    pub tournaments: Option<Vec<Tournament>>,
    pub skills: Option<Vec<String>>,
    pub certifications: Option<Vec<Certification>>,
    #[serde(rename = "references")]
    pub referees: Option<Vec<Referee>>,
    pub video_links: Option<Vec<String>>,
    pub social_links: Option<Vec<String>>,
}

/// A resume with its owner resolved
#[derive(Debug, Clone)]
pub struct ResumeDetails {
    pub resume: Resume,
    pub owner: Account,
}

fn text(value: Option<String>) -> Option<String> {
    value.and_then(normalize_optional_text)
}

fn required_name(value: String, what: &str) -> Result<String, AppError> {
    normalize_optional_text(value)
        .ok_or_else(|| AppError::Validation(format!("{what} name is required")))
}

fn measurement(value: Option<f64>, field: &str) -> Result<Option<f64>, AppError> {
    match value {
        Some(value) if !value.is_finite() || value <= 0.0 => Err(AppError::Validation(format!(
            "athleticDetails.{field} must be a positive number"
        ))),
        other => Ok(other),
    }
}

fn normalize_athletic_details(details: AthleticDetails) -> Result<AthleticDetails, AppError> {
    Ok(AthleticDetails {
        primary_sport: text(details.primary_sport),
        position: text(details.position),
        height: measurement(details.height, "height")?,
        weight: measurement(details.weight, "weight")?,
        dominant_side: text(details.dominant_side),
        current_team: text(details.current_team),
    })
}

fn normalize_education(entries: Vec<Education>) -> Result<Vec<Education>, AppError> {
    entries
        .into_iter()
        .map(|entry| {
            let institution = normalize_optional_text(entry.institution).ok_or_else(|| {
                AppError::Validation("education institution is required".to_string())
            })?;
            Ok(Education {
                institution,
                qualification: text(entry.qualification),
                year: text(entry.year),
            })
        })
        .collect()
}

fn normalize_achievements(entries: Vec<Achievement>) -> Result<Vec<Achievement>, AppError> {
    entries
        .into_iter()
        .map(|entry| {
            let title = normalize_optional_text(entry.title).ok_or_else(|| {
                AppError::Validation("achievement title is required".to_string())
            })?;
            Ok(Achievement {
                title,
                date: text(entry.date),
                description: text(entry.description),
            })
        })
        .collect()
}

fn normalize_tournaments(entries: Vec<Tournament>) -> Result<Vec<Tournament>, AppError> {
    entries
        .into_iter()
        .map(|entry| {
            Ok(Tournament {
                name: required_name(entry.name, "tournament")?,
                date: text(entry.date),
                venue: text(entry.venue),
                result: text(entry.result),
            })
        })
        .collect()
}

fn normalize_certifications(entries: Vec<Certification>) -> Result<Vec<Certification>, AppError> {
    entries
        .into_iter()
        .map(|entry| {
            Ok(Certification {
                name: required_name(entry.name, "certification")?,
                issuer: text(entry.issuer),
                year: text(entry.year),
            })
        })
        .collect()
}

fn normalize_referees(entries: Vec<Referee>) -> Result<Vec<Referee>, AppError> {
    entries
        .into_iter()
        .map(|entry| {
            Ok(Referee {
                name: required_name(entry.name, "reference")?,
                position: text(entry.position),
                contact: text(entry.contact),
            })
        })
        .collect()
}

impl ResumePatch {
    fn apply(self, resume: &mut Resume) -> Result<(), AppError> {
        if let Some(full_name) = self.full_name {
            resume.full_name = normalize_optional_text(full_name)
                .ok_or_else(|| AppError::Validation("fullName cannot be empty".to_string()))?;
        }
        if let Some(value) = self.date_of_birth {
            resume.date_of_birth = normalize_optional_text(value);
        }
        if let Some(value) = self.gender {
            resume.gender = normalize_optional_text(value);
        }
        if let Some(value) = self.nationality {
            resume.nationality = normalize_optional_text(value);
        }
        if let Some(value) = self.email {
            resume.email = match normalize_optional_text(value) {
                Some(email) => Some(normalize_email(&email)?),
                None => None,
            };
        }
        if let Some(value) = self.phone {
            resume.phone = normalize_optional_text(value);
        }
        if let Some(value) = self.address {
            resume.address = normalize_optional_text(value);
        }
        if let Some(details) = self.athletic_details {
            resume.athletic_details = Json(normalize_athletic_details(details)?);
        }
        if let Some(entries) = self.education {
            resume.education = Json(normalize_education(entries)?);
        }
        if let Some(value) = self.career_stats {
            resume.career_stats = normalize_optional_text(value);
        }
        if let Some(entries) = self.achievements {
            resume.achievements = Json(normalize_achievements(entries)?);
        }
        if let Some(entries) = self.tournaments {
            resume.tournaments = Json(normalize_tournaments(entries)?);
        }
        if let Some(skills) = self.skills {
            resume.skills = Json(normalize_tags(skills));
        }
        if let Some(entries) = self.certifications {
            resume.certifications = Json(normalize_certifications(entries)?);
        }
        if let Some(entries) = self.referees {
            resume.referees = Json(normalize_referees(entries)?);
        }
        if let Some(links) = self.video_links {
            resume.video_links = Json(normalize_tags(links));
        }
        if let Some(links) = self.social_links {
            resume.social_links = Json(normalize_tags(links));
        }
        Ok(())
    }
}

/// Resume service
pub struct ResumeService {
    db: Arc<Database>,
}

impl ResumeService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create the caller's resume
    ///
    /// # Errors
    /// - `Validation` if `fullName` is missing or a nested entry is invalid
    /// - `Conflict` if the account already has a resume
    pub async fn create(&self, account_id: &str, input: ResumePatch) -> Result<Resume, AppError> {
        if input
            .full_name
            .as_deref()
            .map(str::trim)
            .is_none_or(str::is_empty)
        {
            return Err(AppError::Validation("fullName is required".to_string()));
        }

        let now = Utc::now();
        let mut resume = Resume {
            id: EntityId::new().0,
            account_id: account_id.to_string(),
            full_name: String::new(),
            date_of_birth: None,
            gender: None,
            nationality: None,
            email: None,
            phone: None,
            address: None,
            athletic_details: Json(AthleticDetails::default()),
            education: Json(Vec::new()),
            career_stats: None,
            achievements: Json(Vec::new()),
            tournaments: Json(Vec::new()),
            skills: Json(Vec::new()),
            certifications: Json(Vec::new()),
            referees: Json(Vec::new()),
            video_links: Json(Vec::new()),
            social_links: Json(Vec::new()),
            created_at: now,
            updated_at: now,
        };
        input.apply(&mut resume)?;

        self.db.insert_resume(&resume).await?;
        tracing::info!(account = %account_id, resume = %resume.id, "Resume created");

        Ok(resume)
    }

    async fn with_owner(&self, resume: Resume) -> Result<ResumeDetails, AppError> {
        let owner = self
            .db
            .get_account(&resume.account_id)
            .await?
            .ok_or(AppError::NotFound("User"))?;
        Ok(ResumeDetails { resume, owner })
    }

    /// The caller's own resume
    pub async fn get_own(&self, account_id: &str) -> Result<ResumeDetails, AppError> {
        let resume = self
            .db
            .get_resume_by_account(account_id)
            .await?
            .ok_or(AppError::NotFound("Resume"))?;
        self.with_owner(resume).await
    }

    /// Resume by ID; visible to its owner and admins
    pub async fn get(&self, id: &str, actor: &Session) -> Result<ResumeDetails, AppError> {
        let resume = self
            .db
            .get_resume(id)
            .await?
            .ok_or(AppError::NotFound("Resume"))?;
        if resume.account_id != actor.account_id && !actor.is_admin() {
            return Err(AppError::Forbidden);
        }
        self.with_owner(resume).await
    }

    /// Apply an update; owner only
    ///
    /// # Errors
    /// - `NotFound` if the resume does not exist
    /// - `Forbidden` if it belongs to another account
    pub async fn update(
        &self,
        id: &str,
        actor_id: &str,
        patch: ResumePatch,
    ) -> Result<ResumeDetails, AppError> {
        let mut resume = self
            .db
            .get_resume(id)
            .await?
            .ok_or(AppError::NotFound("Resume"))?;
        if resume.account_id != actor_id {
            tracing::warn!(resume = %id, actor = %actor_id, "Resume update refused for non-owner");
            return Err(AppError::Forbidden);
        }

        patch.apply(&mut resume)?;
        resume.updated_at = Utc::now();
        if !self.db.update_resume(&resume).await? {
            return Err(AppError::NotFound("Resume"));
        }
        self.with_owner(resume).await
    }
}
