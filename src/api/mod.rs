//! API layer
//!
//! HTTP handlers for:
//! - Accounts and account-level follows
//! - Profile-level follows
//! - Profiles, blog posts, membership plans
//! - Communities and the community feed
//! - Resumes and the contact form
//! - Metrics (Prometheus)

mod blogs;
mod community;
mod contact;
mod converters;
mod dto;
mod follow;
mod membership;
pub mod metrics;
mod profiles;
mod resumes;
mod users;

pub use converters::*;
pub use dto::*;

pub use blogs::blogs_router;
pub use community::{communities_router, community_posts_router};
pub use contact::contact_router;
pub use follow::follow_router;
pub use membership::membership_router;
pub use metrics::{metrics_router, track_http_metrics};
pub use profiles::profiles_router;
pub use resumes::resumes_router;
pub use users::{auth_router, users_router};
