//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Every follow mutation goes through `GraphService`.

mod account;
mod blog;
mod community;
mod contact;
mod graph;
mod membership;
mod profile;
mod resume;

pub use account::{AccountService, NewAccount};
pub use blog::{BlogPatch, BlogService};
pub use community::{
    CommunityDetails, CommunityPatch, CommunityService, LikeToggle, NewCommunityPost, PageRequest,
    PostPage, PostThread,
};
pub use contact::{ContactService, NewContactMessage};
pub use graph::{AccountStats, GraphService, ReconcileReport};
pub use membership::{MembershipService, NewPlan};
pub use profile::{ProfileDetails, ProfilePatch, ProfileService};
pub use resume::{ResumeDetails, ResumePatch, ResumeService};
