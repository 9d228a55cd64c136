//! Database tests

use super::*;
use crate::error::{AppError, GraphError};
use chrono::{Duration, Utc};
use sqlx::types::Json;
use tempfile::TempDir;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn test_account(email: &str) -> Account {
    let now = Utc::now();
    Account {
        id: EntityId::new().0,
        full_name: "Test Athlete".to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        role: Role::Athlete.as_str().to_string(),
        membership: Membership::Free.as_str().to_string(),
        profile_picture: String::new(),
        followers_count: 0,
        following_count: 0,
        followers: Json(vec![]),
        following: Json(vec![]),
        created_at: now,
        updated_at: now,
    }
}

async fn insert_account(db: &Database, email: &str) -> Account {
    let account = test_account(email);
    db.insert_account(&account).await.unwrap();
    account
}

fn test_profile(account: &Account) -> Profile {
    let now = Utc::now();
    Profile {
        id: EntityId::new().0,
        account_id: account.id.clone(),
        full_name: account.full_name.clone(),
        date_of_birth: None,
        gender: None,
        location: Some("Pune".to_string()),
        primary_sport: Some("athletics".to_string()),
        current_level: Some(CurrentLevel::Intermediate.as_str().to_string()),
        bio: None,
        achievements: Json(vec![]),
        contact_email: None,
        contact_phone: None,
        followers: Json(vec![]),
        following: Json(vec![]),
        created_at: now,
        updated_at: now,
    }
}

fn test_post(author: &Account, category: &str, status: PublicationStatus) -> BlogPost {
    let now = Utc::now();
    BlogPost {
        id: EntityId::new().0,
        author_id: author.id.clone(),
        title: "Training log".to_string(),
        summary: "Week one".to_string(),
        category: Some(category.to_string()),
        tags: Json(vec!["sprint".to_string()]),
        content: "<p>Intervals</p>".to_string(),
        status: status.as_str().to_string(),
        visibility: Visibility::Public.as_str().to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// Insert an edge and refresh both endpoints, committing
async fn link(db: &Database, follower: &Account, following: &Account) {
    let mut tx = db.begin().await.unwrap();
    edges::create_edge(&mut tx, &follower.id, &following.id)
        .await
        .unwrap();
    projections::refresh_pair(&mut tx, &follower.id, &following.id)
        .await
        .unwrap();
    tx.commit().await.unwrap();
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
    // Connection successful if we get here without panicking
}

#[tokio::test]
async fn test_account_insert_and_get() {
    let (db, _temp_dir) = create_test_db().await;
    let account = insert_account(&db, "runner@example.com").await;

    let retrieved = db.get_account(&account.id).await.unwrap().unwrap();
    assert_eq!(retrieved.email, "runner@example.com");
    assert_eq!(retrieved.full_name, "Test Athlete");
    assert_eq!(retrieved.followers_count, 0);
    assert!(retrieved.followers.0.is_empty());

    assert!(db.account_exists(&account.id).await.unwrap());
    assert!(!db.account_exists("missing").await.unwrap());
}

#[tokio::test]
async fn test_email_is_unique_case_insensitively() {
    let (db, _temp_dir) = create_test_db().await;
    insert_account(&db, "runner@example.com").await;

    let duplicate = test_account("Runner@Example.com");
    let result = db.insert_account(&duplicate).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let found = db
        .get_account_by_email("RUNNER@example.com")
        .await
        .unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn test_set_account_role() {
    let (db, _temp_dir) = create_test_db().await;
    let account = insert_account(&db, "coach@example.com").await;

    assert!(db.set_account_role(&account.id, Role::Admin).await.unwrap());
    let updated = db.get_account(&account.id).await.unwrap().unwrap();
    assert_eq!(Role::from_stored(&updated.role), Role::Admin);

    assert!(!db.set_account_role("missing", Role::Admin).await.unwrap());
}

#[tokio::test]
async fn test_list_account_ids_in_creation_order() {
    let (db, _temp_dir) = create_test_db().await;
    let first = insert_account(&db, "a@example.com").await;
    let second = insert_account(&db, "b@example.com").await;

    let ids = db.list_account_ids().await.unwrap();
    assert_eq!(ids, vec![first.id, second.id]);
}

// =============================================================================
// Edges
// =============================================================================

#[tokio::test]
async fn test_edge_create_and_delete() {
    let (db, _temp_dir) = create_test_db().await;
    let a = insert_account(&db, "a@example.com").await;
    let b = insert_account(&db, "b@example.com").await;

    let mut tx = db.begin().await.unwrap();
    let edge = edges::create_edge(&mut tx, &a.id, &b.id).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(edge.follower_id, a.id);
    assert_eq!(edge.following_id, b.id);
    assert!(db.edge_exists(&a.id, &b.id).await.unwrap());
    assert!(!db.edge_exists(&b.id, &a.id).await.unwrap());

    let mut tx = db.begin().await.unwrap();
    edges::delete_edge(&mut tx, &a.id, &b.id).await.unwrap();
    tx.commit().await.unwrap();

    assert!(!db.edge_exists(&a.id, &b.id).await.unwrap());
}

#[tokio::test]
async fn test_duplicate_edge_is_rejected() {
    let (db, _temp_dir) = create_test_db().await;
    let a = insert_account(&db, "a@example.com").await;
    let b = insert_account(&db, "b@example.com").await;

    let mut tx = db.begin().await.unwrap();
    edges::create_edge(&mut tx, &a.id, &b.id).await.unwrap();
    let result = edges::create_edge(&mut tx, &a.id, &b.id).await;
    assert!(matches!(result, Err(GraphError::DuplicateEdge)));
    tx.commit().await.unwrap();

    assert_eq!(
        db.count_edges_where(EdgeRole::Follower, &a.id).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_self_edge_is_rejected() {
    let (db, _temp_dir) = create_test_db().await;
    let a = insert_account(&db, "a@example.com").await;

    let mut tx = db.begin().await.unwrap();
    let result = edges::create_edge(&mut tx, &a.id, &a.id).await;
    assert!(matches!(result, Err(GraphError::SelfReference)));
}

#[tokio::test]
async fn test_delete_missing_edge() {
    let (db, _temp_dir) = create_test_db().await;
    let a = insert_account(&db, "a@example.com").await;
    let b = insert_account(&db, "b@example.com").await;

    let mut tx = db.begin().await.unwrap();
    let result = edges::delete_edge(&mut tx, &a.id, &b.id).await;
    assert!(matches!(result, Err(GraphError::NotFound)));
}

#[tokio::test]
async fn test_rolled_back_edge_leaves_no_trace() {
    let (db, _temp_dir) = create_test_db().await;
    let a = insert_account(&db, "a@example.com").await;
    let b = insert_account(&db, "b@example.com").await;

    {
        let mut tx = db.begin().await.unwrap();
        edges::create_edge(&mut tx, &a.id, &b.id).await.unwrap();
        projections::refresh_pair(&mut tx, &a.id, &b.id)
            .await
            .unwrap();
        tx.rollback().await.unwrap();
    }

    assert!(!db.edge_exists(&a.id, &b.id).await.unwrap());
    let a = db.get_account(&a.id).await.unwrap().unwrap();
    assert_eq!(a.following_count, 0);
    assert!(a.following.0.is_empty());
}

#[tokio::test]
async fn test_followers_listed_in_follow_order() {
    let (db, _temp_dir) = create_test_db().await;
    let target = insert_account(&db, "target@example.com").await;
    let first = insert_account(&db, "first@example.com").await;
    let second = insert_account(&db, "second@example.com").await;

    link(&db, &first, &target).await;
    link(&db, &second, &target).await;

    let followers = db.get_followers(&target.id).await.unwrap();
    let ids: Vec<_> = followers.iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, vec![first.id.clone(), second.id.clone()]);

    let following = db.get_following(&first.id).await.unwrap();
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].id, target.id);

    assert_eq!(
        db.count_edges_where(EdgeRole::Followee, &target.id)
            .await
            .unwrap(),
        2
    );
}

// =============================================================================
// Projections
// =============================================================================

#[tokio::test]
async fn test_refresh_pair_writes_account_projections() {
    let (db, _temp_dir) = create_test_db().await;
    let a = insert_account(&db, "a@example.com").await;
    let b = insert_account(&db, "b@example.com").await;

    link(&db, &a, &b).await;

    let a = db.get_account(&a.id).await.unwrap().unwrap();
    let b = db.get_account(&b.id).await.unwrap().unwrap();
    assert_eq!(a.following.0, vec![b.id.clone()]);
    assert_eq!(a.following_count, 1);
    assert_eq!(a.followers_count, 0);
    assert_eq!(b.followers.0, vec![a.id.clone()]);
    assert_eq!(b.followers_count, 1);
}

#[tokio::test]
async fn test_refresh_account_repairs_drift() {
    let (db, _temp_dir) = create_test_db().await;
    let a = insert_account(&db, "a@example.com").await;
    let b = insert_account(&db, "b@example.com").await;
    link(&db, &a, &b).await;

    db.set_follow_counters_for_test(&b.id, 7, 3).await.unwrap();

    let mut tx = db.begin().await.unwrap();
    let refresh = projections::refresh_account(&mut tx, &b.id).await.unwrap();
    tx.commit().await.unwrap();

    assert!(refresh.changed);
    assert_eq!(refresh.previous_followers_count, 7);
    assert_eq!(refresh.previous_following_count, 3);
    assert_eq!(refresh.followers_count, 1);
    assert_eq!(refresh.following_count, 0);

    let mut tx = db.begin().await.unwrap();
    let again = projections::refresh_account(&mut tx, &b.id).await.unwrap();
    tx.commit().await.unwrap();
    assert!(!again.changed);
}

#[tokio::test]
async fn test_refresh_missing_account() {
    let (db, _temp_dir) = create_test_db().await;

    let mut tx = db.begin().await.unwrap();
    let result = projections::refresh_account(&mut tx, "missing").await;
    assert!(matches!(result, Err(GraphError::TargetNotFound)));
}

// =============================================================================
// Profiles
// =============================================================================

#[tokio::test]
async fn test_profile_create_picks_up_existing_edges() {
    let (db, _temp_dir) = create_test_db().await;
    let a = insert_account(&db, "a@example.com").await;
    let b = insert_account(&db, "b@example.com").await;
    let profile_b = db.create_profile(&test_profile(&b)).await.unwrap();

    link(&db, &a, &b).await;

    // b's profile did not list a yet: a has no profile
    let stored_b = db.get_profile(&profile_b.id).await.unwrap().unwrap();
    assert!(stored_b.followers.0.is_empty());

    let profile_a = db.create_profile(&test_profile(&a)).await.unwrap();
    assert_eq!(profile_a.following.0, vec![profile_b.id.clone()]);

    let stored_b = db.get_profile(&profile_b.id).await.unwrap().unwrap();
    assert_eq!(stored_b.followers.0, vec![profile_a.id.clone()]);
}

#[tokio::test]
async fn test_one_profile_per_account() {
    let (db, _temp_dir) = create_test_db().await;
    let a = insert_account(&db, "a@example.com").await;
    db.create_profile(&test_profile(&a)).await.unwrap();

    let result = db.create_profile(&test_profile(&a)).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_profile_delete_drops_it_from_neighbours() {
    let (db, _temp_dir) = create_test_db().await;
    let a = insert_account(&db, "a@example.com").await;
    let b = insert_account(&db, "b@example.com").await;
    let profile_a = db.create_profile(&test_profile(&a)).await.unwrap();
    let profile_b = db.create_profile(&test_profile(&b)).await.unwrap();
    link(&db, &a, &b).await;

    // Wrong owner
    assert!(!db.delete_profile(&profile_a.id, &b.id).await.unwrap());

    assert!(db.delete_profile(&profile_a.id, &a.id).await.unwrap());
    assert!(db.get_profile(&profile_a.id).await.unwrap().is_none());

    let stored_b = db.get_profile(&profile_b.id).await.unwrap().unwrap();
    assert!(stored_b.followers.0.is_empty());

    // The account edge survives the profile
    assert!(db.edge_exists(&a.id, &b.id).await.unwrap());
}

#[tokio::test]
async fn test_profile_update_keeps_projections() {
    let (db, _temp_dir) = create_test_db().await;
    let a = insert_account(&db, "a@example.com").await;
    let b = insert_account(&db, "b@example.com").await;
    let profile_a = db.create_profile(&test_profile(&a)).await.unwrap();
    let profile_b = db.create_profile(&test_profile(&b)).await.unwrap();
    link(&db, &a, &b).await;

    let mut edited = db.get_profile(&profile_b.id).await.unwrap().unwrap();
    edited.bio = Some("Sprinter".to_string());
    edited.followers = Json(vec![]);
    edited.updated_at = Utc::now();
    assert!(db.update_profile(&edited).await.unwrap());

    let stored = db.get_profile(&profile_b.id).await.unwrap().unwrap();
    assert_eq!(stored.bio.as_deref(), Some("Sprinter"));
    assert_eq!(stored.followers.0, vec![profile_a.id.clone()]);
}

#[tokio::test]
async fn test_list_profiles_excluding_account() {
    let (db, _temp_dir) = create_test_db().await;
    let a = insert_account(&db, "a@example.com").await;
    let b = insert_account(&db, "b@example.com").await;
    db.create_profile(&test_profile(&a)).await.unwrap();
    let profile_b = db.create_profile(&test_profile(&b)).await.unwrap();

    assert_eq!(db.list_profiles(None).await.unwrap().len(), 2);

    let others = db.list_profiles(Some(&a.id)).await.unwrap();
    assert_eq!(others.len(), 1);
    assert_eq!(others[0].id, profile_b.id);

    assert_eq!(
        db.resolve_profile_owner(&profile_b.id).await.unwrap(),
        Some(b.id.clone())
    );
    assert_eq!(db.resolve_profile_owner("missing").await.unwrap(), None);
}

// =============================================================================
// Blog posts
// =============================================================================

#[tokio::test]
async fn test_public_blog_posts_filtering() {
    let (db, _temp_dir) = create_test_db().await;
    let author = insert_account(&db, "author@example.com").await;

    let mut older = test_post(&author, "Training", PublicationStatus::Published);
    older.created_at = Utc::now() - Duration::minutes(5);
    db.insert_blog_post(&older).await.unwrap();

    let newer = test_post(&author, "Nutrition", PublicationStatus::Published);
    db.insert_blog_post(&newer).await.unwrap();

    let draft = test_post(&author, "Recovery", PublicationStatus::Draft);
    db.insert_blog_post(&draft).await.unwrap();

    let mut private = test_post(&author, "Training", PublicationStatus::Published);
    private.visibility = Visibility::Private.as_str().to_string();
    db.insert_blog_post(&private).await.unwrap();

    let public = db.get_public_blog_posts(None).await.unwrap();
    let ids: Vec<_> = public.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![newer.id.clone(), older.id.clone()]);

    let training = db.get_public_blog_posts(Some("Training")).await.unwrap();
    assert_eq!(training.len(), 1);
    assert_eq!(training[0].id, older.id);

    let categories = db.get_public_blog_categories().await.unwrap();
    assert_eq!(categories, vec!["Nutrition".to_string(), "Training".to_string()]);

    assert_eq!(db.count_posts_by_author(&author.id).await.unwrap(), 4);
    assert_eq!(
        db.get_blog_posts_by_author(&author.id).await.unwrap().len(),
        4
    );
}

#[tokio::test]
async fn test_blog_post_update_and_delete() {
    let (db, _temp_dir) = create_test_db().await;
    let author = insert_account(&db, "author@example.com").await;
    let mut post = test_post(&author, "Training", PublicationStatus::Draft);
    db.insert_blog_post(&post).await.unwrap();

    post.title = "Updated".to_string();
    post.status = PublicationStatus::Published.as_str().to_string();
    assert!(db.update_blog_post(&post).await.unwrap());

    let stored = db.get_blog_post(&post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Updated");
    assert_eq!(stored.status, "Published");

    assert!(db.delete_blog_post(&post.id).await.unwrap());
    assert!(!db.delete_blog_post(&post.id).await.unwrap());
    assert!(db.get_blog_post(&post.id).await.unwrap().is_none());
}

// =============================================================================
// Membership plans
// =============================================================================

#[tokio::test]
async fn test_membership_plans() {
    let (db, _temp_dir) = create_test_db().await;

    let premium = MembershipPlan {
        id: EntityId::new().0,
        name: PlanName::Premium.as_str().to_string(),
        price_per_month: 9.99,
        features: Json(vec!["Analytics".to_string()]),
    };
    let free = MembershipPlan {
        id: EntityId::new().0,
        name: PlanName::Free.as_str().to_string(),
        price_per_month: 0.0,
        features: Json(vec![]),
    };
    db.insert_membership_plan(&premium).await.unwrap();
    db.insert_membership_plan(&free).await.unwrap();

    let plans = db.get_membership_plans().await.unwrap();
    let names: Vec<_> = plans.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Free", "Premium"]);

    let duplicate = MembershipPlan {
        id: EntityId::new().0,
        ..premium.clone()
    };
    let result = db.insert_membership_plan(&duplicate).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

// =============================================================================
// Communities and likes
// =============================================================================

async fn insert_post(db: &Database, author: &Account, community_id: Option<&str>) -> CommunityPost {
    let now = Utc::now();
    let post = CommunityPost {
        id: EntityId::new().0,
        author_id: author.id.clone(),
        community_id: community_id.map(str::to_string),
        text: "Hill sprints".to_string(),
        created_at: now,
        updated_at: now,
    };
    db.insert_community_post(&post).await.unwrap();
    post
}

#[tokio::test]
async fn test_like_is_unique_per_account() {
    let (db, _temp_dir) = create_test_db().await;
    let author = insert_account(&db, "author@example.com").await;
    let fan = insert_account(&db, "fan@example.com").await;
    let post = insert_post(&db, &author, None).await;

    let mut tx = db.begin().await.unwrap();
    likes::create_like(&mut tx, &post.id, &fan.id).await.unwrap();
    let again = likes::create_like(&mut tx, &post.id, &fan.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    tx.commit().await.unwrap();

    assert!(db.post_liked_by(&post.id, &fan.id).await.unwrap());
    assert!(!db.post_liked_by(&post.id, &author.id).await.unwrap());
    let likers = db.get_post_likers(&post.id).await.unwrap();
    assert_eq!(likers.len(), 1);
    assert_eq!(likers[0].id, fan.id);

    let mut tx = db.begin().await.unwrap();
    assert!(likes::delete_like(&mut tx, &post.id, &fan.id).await.unwrap());
    assert!(!likes::delete_like(&mut tx, &post.id, &fan.id).await.unwrap());
    tx.commit().await.unwrap();
    assert!(db.get_post_likers(&post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_community_keeps_its_posts() {
    let (db, _temp_dir) = create_test_db().await;
    let author = insert_account(&db, "author@example.com").await;
    let now = Utc::now();
    let community = Community {
        id: EntityId::new().0,
        name: "Jumpers".to_string(),
        description: None,
        sport_category: None,
        created_by: author.id.clone(),
        created_at: now,
        updated_at: now,
    };
    db.insert_community(&community).await.unwrap();

    let duplicate = Community {
        id: EntityId::new().0,
        name: "JUMPERS".to_string(),
        ..community.clone()
    };
    let result = db.insert_community(&duplicate).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let post = insert_post(&db, &author, Some(&community.id)).await;
    assert_eq!(db.count_community_posts(Some(&community.id)).await.unwrap(), 1);

    assert!(db.delete_community(&community.id).await.unwrap());
    let orphan = db.get_community_post(&post.id).await.unwrap().unwrap();
    assert_eq!(orphan.community_id, None);
    assert_eq!(db.count_community_posts(None).await.unwrap(), 1);
}

// =============================================================================
// Resumes and contact messages
// =============================================================================

fn test_resume(account: &Account) -> Resume {
    let now = Utc::now();
    Resume {
        id: EntityId::new().0,
        account_id: account.id.clone(),
        full_name: account.full_name.clone(),
        date_of_birth: None,
        gender: None,
        nationality: None,
        email: None,
        phone: None,
        address: None,
        athletic_details: Json(AthleticDetails::default()),
        education: Json(vec![]),
        career_stats: None,
        achievements: Json(vec![]),
        tournaments: Json(vec![]),
        skills: Json(vec!["speed".to_string()]),
        certifications: Json(vec![]),
        referees: Json(vec![]),
        video_links: Json(vec![]),
        social_links: Json(vec![]),
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_one_resume_per_account() {
    let (db, _temp_dir) = create_test_db().await;
    let account = insert_account(&db, "athlete@example.com").await;

    let mut resume = test_resume(&account);
    db.insert_resume(&resume).await.unwrap();
    let second = test_resume(&account);
    assert!(matches!(
        db.insert_resume(&second).await,
        Err(AppError::Conflict(_))
    ));

    resume.career_stats = Some("42 caps".to_string());
    assert!(db.update_resume(&resume).await.unwrap());
    let stored = db.get_resume_by_account(&account.id).await.unwrap().unwrap();
    assert_eq!(stored.id, resume.id);
    assert_eq!(stored.career_stats.as_deref(), Some("42 caps"));
    assert_eq!(stored.skills.0, vec!["speed".to_string()]);
}

#[tokio::test]
async fn test_contact_messages_newest_first() {
    let (db, _temp_dir) = create_test_db().await;
    let now = Utc::now();
    for (offset, subject) in [(2, "older"), (1, "newer")] {
        let message = ContactMessage {
            id: EntityId::new().0,
            name: "Visitor".to_string(),
            email: "visitor@example.com".to_string(),
            subject: Some(subject.to_string()),
            message: "Hello".to_string(),
            created_at: now - Duration::minutes(offset),
        };
        db.insert_contact_message(&message).await.unwrap();
    }

    let messages = db.list_contact_messages().await.unwrap();
    let subjects: Vec<_> = messages.iter().filter_map(|m| m.subject.as_deref()).collect();
    assert_eq!(subjects, vec!["newer", "older"]);
}
