//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Create from existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Account
// =============================================================================

/// A registered user
///
/// `followers`, `following` and both counters are projections of the
/// `follows` table. They are rewritten only by the projection refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: String,
    pub full_name: String,
    pub email: String,
    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Values: athlete, sponsor, admin, coach
    pub role: String,
    /// Values: free, premium, sponsorship
    pub membership: String,
    pub profile_picture: String,
    pub followers_count: i64,
    pub following_count: i64,
    /// Account IDs following this account
    pub followers: Json<Vec<String>>,
    /// Account IDs this account follows
    pub following: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Athlete,
    Sponsor,
    Admin,
    Coach,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Athlete => "athlete",
            Self::Sponsor => "sponsor",
            Self::Admin => "admin",
            Self::Coach => "coach",
        }
    }

    /// Parse the stored column value, falling back to the default role
    pub fn from_stored(value: &str) -> Self {
        match value {
            "sponsor" => Self::Sponsor,
            "admin" => Self::Admin,
            "coach" => Self::Coach,
            _ => Self::Athlete,
        }
    }
}

/// Membership tier stored on the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Membership {
    #[default]
    Free,
    Premium,
    Sponsorship,
}

impl Membership {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Sponsorship => "sponsorship",
        }
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Public-facing athlete profile, at most one per account
///
/// `followers`/`following` hold Profile IDs and are projections of the
/// account-level edges between the owning accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub account_id: String,
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub primary_sport: Option<String>,
    /// Values: beginner, intermediate, advanced, semi-professional, professional
    pub current_level: Option<String>,
    pub bio: Option<String>,
    pub achievements: Json<Vec<Achievement>>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub followers: Json<Vec<String>>,
    pub following: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Achievement {
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Competitive level of an athlete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurrentLevel {
    Beginner,
    Intermediate,
    Advanced,
    SemiProfessional,
    Professional,
}

impl CurrentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::SemiProfessional => "semi-professional",
            Self::Professional => "professional",
        }
    }
}

// =============================================================================
// Follow relationships
// =============================================================================

/// A directed follower → followee edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FollowEdge {
    pub id: String,
    pub follower_id: String,
    pub following_id: String,
    pub created_at: DateTime<Utc>,
}

/// Which side of an edge an account is counted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRole {
    /// The account is the one following
    Follower,
    /// The account is the one being followed
    Followee,
}

// =============================================================================
// Blog posts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BlogPost {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub summary: String,
    pub category: Option<String>,
    pub tags: Json<Vec<String>>,
    /// Sanitized HTML
    pub content: String,
    /// Values: Draft, Published
    pub status: String,
    /// Values: Public, Private
    pub visibility: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PublicationStatus {
    #[default]
    Draft,
    Published,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Published => "Published",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
        }
    }
}

// =============================================================================
// Membership plans
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MembershipPlan {
    pub id: String,
    /// Values: Free, Premium, Sponsorship
    pub name: String,
    pub price_per_month: f64,
    pub features: Json<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanName {
    Free,
    Premium,
    Sponsorship,
}

impl PlanName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Premium => "Premium",
            Self::Sponsorship => "Sponsorship",
        }
    }
}

// =============================================================================
// Communities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Community {
    pub id: String,
    /// Unique, case-insensitively
    pub name: String,
    pub description: Option<String>,
    pub sport_category: Option<String>,
    /// Account ID of the creator
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A short text post on the community feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommunityPost {
    pub id: String,
    pub author_id: String,
    pub community_id: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A community post joined with its author's display fields
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CommunityPostView {
    #[sqlx(flatten)]
    pub post: CommunityPost,
    pub author_full_name: String,
    pub author_profile_picture: String,
}

/// One account liking one post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostLike {
    pub id: String,
    pub post_id: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostComment {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PostCommentView {
    #[sqlx(flatten)]
    pub comment: PostComment,
    pub author_full_name: String,
    pub author_profile_picture: String,
}

// =============================================================================
// Resumes
// =============================================================================

/// Sports resume, at most one per account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resume {
    pub id: String,
    pub account_id: String,
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub athletic_details: Json<AthleticDetails>,
    pub education: Json<Vec<Education>>,
    pub career_stats: Option<String>,
    pub achievements: Json<Vec<Achievement>>,
    pub tournaments: Json<Vec<Tournament>>,
    pub skills: Json<Vec<String>>,
    pub certifications: Json<Vec<Certification>>,
    pub referees: Json<Vec<Referee>>,
    pub video_links: Json<Vec<String>>,
    pub social_links: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AthleticDetails {
    #[serde(default)]
    pub primary_sport: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    /// Centimetres
    #[serde(default)]
    pub height: Option<f64>,
    /// Kilograms
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub dominant_side: Option<String>,
    #[serde(default)]
    pub current_team: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Education {
    pub institution: String,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tournament {
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Certification {
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
}

/// A person vouching for the athlete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Referee {
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

// =============================================================================
// Contact messages
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
