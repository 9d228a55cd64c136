//! Conversion functions from database models to API DTOs

use crate::api::dto::*;
use crate::data::{
    Account, BlogPost, Community, ContactMessage, MembershipPlan, PostCommentView, Profile,
};
use crate::service::{CommunityDetails, LikeToggle, PostThread, ProfileDetails, ResumeDetails};

/// Convert Account to AccountResponse (never includes the password hash)
pub fn account_to_response(account: &Account) -> AccountResponse {
    AccountResponse {
        id: account.id.clone(),
        full_name: account.full_name.clone(),
        email: account.email.clone(),
        role: account.role.clone(),
        membership: account.membership.clone(),
        profile_picture: account.profile_picture.clone(),
        followers_count: account.followers_count,
        following_count: account.following_count,
        followers: account.followers.0.clone(),
        following: account.following.0.clone(),
        created_at: account.created_at,
    }
}

pub fn account_to_summary(account: &Account) -> AccountSummary {
    AccountSummary {
        id: account.id.clone(),
        full_name: account.full_name.clone(),
        profile_picture: account.profile_picture.clone(),
    }
}

fn athletic_info(profile: &Profile) -> AthleticInfo {
    AthleticInfo {
        primary_sport: profile.primary_sport.clone(),
        current_level: profile.current_level.clone(),
        bio: profile.bio.clone(),
    }
}

fn contact_info(profile: &Profile) -> ContactInfo {
    ContactInfo {
        email: profile.contact_email.clone(),
        phone: profile.contact_phone.clone(),
    }
}

pub fn profile_to_response(profile: &Profile) -> ProfileResponse {
    ProfileResponse {
        id: profile.id.clone(),
        user: profile.account_id.clone(),
        full_name: profile.full_name.clone(),
        date_of_birth: profile.date_of_birth.clone(),
        gender: profile.gender.clone(),
        location: profile.location.clone(),
        athletic_info: athletic_info(profile),
        achievements: profile.achievements.0.clone(),
        contact: contact_info(profile),
        followers: profile.followers.0.clone(),
        following: profile.following.0.clone(),
        created_at: profile.created_at,
        updated_at: profile.updated_at,
    }
}

fn profile_to_summary(profile: &Profile) -> ProfileSummary {
    ProfileSummary {
        id: profile.id.clone(),
        full_name: profile.full_name.clone(),
    }
}

pub fn profile_details_to_response(details: &ProfileDetails) -> ProfileDetailsResponse {
    let profile = &details.profile;
    ProfileDetailsResponse {
        id: profile.id.clone(),
        user: ProfileOwner {
            id: details.owner.id.clone(),
            full_name: details.owner.full_name.clone(),
            email: details.owner.email.clone(),
        },
        full_name: profile.full_name.clone(),
        date_of_birth: profile.date_of_birth.clone(),
        gender: profile.gender.clone(),
        location: profile.location.clone(),
        athletic_info: athletic_info(profile),
        achievements: profile.achievements.0.clone(),
        contact: contact_info(profile),
        followers: details.followers.iter().map(profile_to_summary).collect(),
        following: details.following.iter().map(profile_to_summary).collect(),
        posts: details.posts.iter().map(blog_post_to_response).collect(),
        created_at: profile.created_at,
        updated_at: profile.updated_at,
    }
}

pub fn blog_post_to_response(post: &BlogPost) -> BlogPostResponse {
    BlogPostResponse {
        id: post.id.clone(),
        author: post.author_id.clone(),
        title: post.title.clone(),
        summary: post.summary.clone(),
        category: post.category.clone(),
        tags: post.tags.0.clone(),
        content: post.content.clone(),
        publication: Publication {
            status: post.status.clone(),
            visibility: post.visibility.clone(),
        },
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub fn plan_to_response(plan: &MembershipPlan) -> MembershipPlanResponse {
    MembershipPlanResponse {
        id: plan.id.clone(),
        name: plan.name.clone(),
        price_per_month: plan.price_per_month,
        features: plan.features.0.clone(),
    }
}

pub fn community_to_response(community: &Community) -> CommunityResponse {
    CommunityResponse {
        id: community.id.clone(),
        name: community.name.clone(),
        description: community.description.clone(),
        sport_category: community.sport_category.clone(),
        created_by: community.created_by.clone(),
        created_at: community.created_at,
        updated_at: community.updated_at,
    }
}

pub fn community_details_to_response(details: &CommunityDetails) -> CommunityDetailsResponse {
    let community = &details.community;
    CommunityDetailsResponse {
        id: community.id.clone(),
        name: community.name.clone(),
        description: community.description.clone(),
        sport_category: community.sport_category.clone(),
        created_by: account_to_summary(&details.creator),
        created_at: community.created_at,
        updated_at: community.updated_at,
    }
}

pub fn comment_to_response(view: &PostCommentView) -> CommentResponse {
    CommentResponse {
        id: view.comment.id.clone(),
        user: AccountSummary {
            id: view.comment.author_id.clone(),
            full_name: view.author_full_name.clone(),
            profile_picture: view.author_profile_picture.clone(),
        },
        text: view.comment.text.clone(),
        created_at: view.comment.created_at,
    }
}

pub fn post_thread_to_response(thread: &PostThread) -> CommunityPostResponse {
    let post = &thread.post.post;
    CommunityPostResponse {
        id: post.id.clone(),
        text: post.text.clone(),
        author: AccountSummary {
            id: post.author_id.clone(),
            full_name: thread.post.author_full_name.clone(),
            profile_picture: thread.post.author_profile_picture.clone(),
        },
        community: post.community_id.clone(),
        likes: thread.likers.iter().map(account_to_summary).collect(),
        likes_count: thread.likers.len(),
        comments: thread.comments.iter().map(comment_to_response).collect(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub fn like_toggle_to_response(toggle: LikeToggle) -> LikesResponse {
    LikesResponse {
        liked: toggle.liked,
        likes_count: toggle.likers.len(),
        likes: toggle.likers,
    }
}

pub fn resume_to_response(details: &ResumeDetails) -> ResumeResponse {
    let resume = &details.resume;
    ResumeResponse {
        id: resume.id.clone(),
        user: ProfileOwner {
            id: details.owner.id.clone(),
            full_name: details.owner.full_name.clone(),
            email: details.owner.email.clone(),
        },
        full_name: resume.full_name.clone(),
        date_of_birth: resume.date_of_birth.clone(),
        gender: resume.gender.clone(),
        nationality: resume.nationality.clone(),
        email: resume.email.clone(),
        phone: resume.phone.clone(),
        address: resume.address.clone(),
        athletic_details: resume.athletic_details.0.clone(),
        education: resume.education.0.clone(),
        career_stats: resume.career_stats.clone(),
        achievements: resume.achievements.0.clone(),
        tournaments: resume.tournaments.0.clone(),
        skills: resume.skills.0.clone(),
        certifications: resume.certifications.0.clone(),
        references: resume.referees.0.clone(),
        video_links: resume.video_links.0.clone(),
        social_links: resume.social_links.0.clone(),
        created_at: resume.created_at,
        updated_at: resume.updated_at,
    }
}

pub fn contact_message_to_response(message: &ContactMessage) -> ContactMessageResponse {
    ContactMessageResponse {
        id: message.id.clone(),
        name: message.name.clone(),
        email: message.email.clone(),
        subject: message.subject.clone(),
        message: message.message.clone(),
        created_at: message.created_at,
    }
}
