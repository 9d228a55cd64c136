//! API request and response DTOs
//!
//! All JSON on the wire is camelCase. Request bodies reject unknown fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{
    Achievement, AthleticDetails, Certification, Education, Referee, Role, Tournament,
};

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/follow`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FollowProfileRequest {
    /// Profile ID of the account to follow
    pub followee_id: String,
}

/// `?exact=true` on profile stats
#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub exact: Option<bool>,
}

/// `?category=` on the public blog list
#[derive(Debug, Default, Deserialize)]
pub struct BlogListQuery {
    pub category: Option<String>,
}

/// `?page=&limit=&community=` on the community feed
#[derive(Debug, Default, Deserialize)]
pub struct CommunityFeedQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub community: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommentRequest {
    pub text: String,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub membership: String,
    pub profile_picture: String,
    pub followers_count: i64,
    pub following_count: i64,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Account shape used inside follower/following lists
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: String,
    pub full_name: String,
    pub profile_picture: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatusResponse {
    pub is_following: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleticInfo {
    pub primary_sport: Option<String>,
    pub current_level: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    /// Owning account ID
    pub user: String,
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub athletic_info: AthleticInfo,
    pub achievements: Vec<Achievement>,
    pub contact: ContactInfo,
    /// Profile IDs
    pub followers: Vec<String>,
    /// Profile IDs
    pub following: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOwner {
    pub id: String,
    pub full_name: String,
    pub email: String,
}

/// Profile by ID with resolved neighbours and posts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetailsResponse {
    pub id: String,
    pub user: ProfileOwner,
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub athletic_info: AthleticInfo,
    pub achievements: Vec<Achievement>,
    pub contact: ContactInfo,
    pub followers: Vec<ProfileSummary>,
    pub following: Vec<ProfileSummary>,
    pub posts: Vec<BlogPostResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCreatedResponse {
    pub message: String,
    pub profile: ProfileResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub status: String,
    pub visibility: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostResponse {
    pub id: String,
    /// Author account ID
    pub author: String,
    pub title: String,
    pub summary: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub content: String,
    pub publication: Publication,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogCreatedResponse {
    pub message: String,
    pub blog: BlogPostResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListResponse {
    pub blogs: Vec<BlogPostResponse>,
    pub total_blogs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlanResponse {
    pub id: String,
    pub name: String,
    pub price_per_month: f64,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCreatedResponse {
    pub message: String,
    pub plan: MembershipPlanResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub sport_category: Option<String>,
    /// Creator account ID
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Community by ID with its creator resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityDetailsResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub sport_category: Option<String>,
    pub created_by: AccountSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub user: AccountSummary,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPostResponse {
    pub id: String,
    pub text: String,
    pub author: AccountSummary,
    /// Community ID, if the post belongs to one
    pub community: Option<String>,
    pub likes: Vec<AccountSummary>,
    pub likes_count: usize,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityFeedResponse {
    pub posts: Vec<CommunityPostResponse>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_posts: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesResponse {
    pub liked: bool,
    /// Account IDs, in like order
    pub likes: Vec<String>,
    pub likes_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResponse {
    pub id: String,
    pub user: ProfileOwner,
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub athletic_details: AthleticDetails,
    pub education: Vec<Education>,
    pub career_stats: Option<String>,
    pub achievements: Vec<Achievement>,
    pub tournaments: Vec<Tournament>,
    pub skills: Vec<String>,
    pub certifications: Vec<Certification>,
    pub references: Vec<Referee>,
    pub video_links: Vec<String>,
    pub social_links: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
