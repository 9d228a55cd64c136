//! Graph consistency service
//!
//! Single entry point for follow/unfollow. Each mutation writes the edge and
//! recomputes the affected account and profile projections in one
//! transaction, so edge, lists and counters are applied together or not at
//! all.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use crate::data::{Database, DbTransaction, EdgeRole, FollowEdge, ProjectionRefresh, edges, projections};
use crate::error::{AppError, GraphError};
use crate::metrics::{GRAPH_DRIFT_TOTAL, GRAPH_OPERATIONS_TOTAL, STORAGE_RETRIES_TOTAL};

/// Follow statistics for one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
}

/// Outcome of reconciling one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub account_id: String,
    pub drifted: bool,
    pub followers_count: i64,
    pub following_count: i64,
}

/// Busy/locked databases, pool exhaustion and I/O errors can succeed on retry
fn is_transient(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db_error) => db_error
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            // SQLITE_BUSY (5) / SQLITE_LOCKED (6), including extended codes
            .map(|code| matches!(code & 0xff, 5 | 6))
            .unwrap_or(false),
        _ => false,
    }
}

/// Run `operation`, retrying once on a transient storage error
///
/// The retry re-runs the whole closure, idempotency pre-check included.
async fn with_storage_retry<T, F, Fut>(name: &'static str, mut operation: F) -> Result<T, GraphError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GraphError>>,
{
    match operation().await {
        Err(GraphError::Storage(error)) if is_transient(&error) => {
            tracing::warn!(operation = name, %error, "Transient storage error; retrying once");
            STORAGE_RETRIES_TOTAL.with_label_values(&[name]).inc();
            match operation().await {
                Err(GraphError::Storage(error)) if is_transient(&error) => {
                    tracing::error!(operation = name, %error, "Storage still unavailable after retry");
                    Err(GraphError::StorageUnavailable)
                }
                other => other,
            }
        }
        other => other,
    }
}

fn record(operation: &'static str, result: &Result<impl Sized, GraphError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(GraphError::SelfFollow) => "self_follow",
        Err(GraphError::TargetNotFound) => "target_not_found",
        Err(GraphError::AlreadyFollowing) => "already_following",
        Err(GraphError::NotFollowing) => "not_following",
        Err(GraphError::StorageUnavailable) => "storage_unavailable",
        Err(_) => "error",
    };
    GRAPH_OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Graph consistency service
pub struct GraphService {
    db: Arc<Database>,
    exact_counts: bool,
}

impl GraphService {
    /// Create new graph service
    ///
    /// # Arguments
    /// * `exact_counts` - default for `get_stats` when the caller does not ask
    pub fn new(db: Arc<Database>, exact_counts: bool) -> Self {
        Self { db, exact_counts }
    }

    /// Follow `target_id` as `actor_id`
    ///
    /// # Errors
    /// - `SelfFollow` if actor and target are the same account
    /// - `TargetNotFound` if the target account does not exist
    /// - `AlreadyFollowing` if the edge exists, including when a concurrent
    ///   request created it first
    pub async fn follow(&self, actor_id: &str, target_id: &str) -> Result<FollowEdge, GraphError> {
        let result = self.follow_inner(actor_id, target_id).await;
        record("follow", &result);
        if result.is_ok() {
            tracing::info!(actor = %actor_id, target = %target_id, "Account followed");
        }
        result
    }

    async fn follow_inner(&self, actor_id: &str, target_id: &str) -> Result<FollowEdge, GraphError> {
        if actor_id == target_id {
            return Err(GraphError::SelfFollow);
        }

        with_storage_retry("follow", move || self.try_follow(actor_id, target_id)).await
    }

    async fn try_follow(&self, actor_id: &str, target_id: &str) -> Result<FollowEdge, GraphError> {
        if !self.db.account_exists(target_id).await? {
            return Err(GraphError::TargetNotFound);
        }
        if self.db.edge_exists(actor_id, target_id).await? {
            return Err(GraphError::AlreadyFollowing);
        }

        let mut tx = self.db.begin().await?;
        // The edge insert is the first statement so the write lock is held
        // before any projection is read.
        let edge = match edges::create_edge(&mut tx, actor_id, target_id).await {
            Ok(edge) => edge,
            Err(GraphError::DuplicateEdge) => {
                tracing::debug!(actor = %actor_id, target = %target_id, "Lost follow race");
                return Err(GraphError::AlreadyFollowing);
            }
            Err(error) => return Err(error),
        };
        projections::refresh_pair(&mut tx, actor_id, target_id).await?;
        tx.commit().await?;

        Ok(edge)
    }

    /// Unfollow `target_id` as `actor_id`
    ///
    /// # Errors
    /// `NotFollowing` if no edge exists; nothing is mutated in that case
    pub async fn unfollow(&self, actor_id: &str, target_id: &str) -> Result<(), GraphError> {
        let result =
            with_storage_retry("unfollow", move || self.try_unfollow(actor_id, target_id)).await;
        record("unfollow", &result);
        if result.is_ok() {
            tracing::info!(actor = %actor_id, target = %target_id, "Account unfollowed");
        }
        result
    }

    async fn try_unfollow(&self, actor_id: &str, target_id: &str) -> Result<(), GraphError> {
        let mut tx: DbTransaction = self.db.begin().await?;
        match edges::delete_edge(&mut tx, actor_id, target_id).await {
            Ok(()) => {}
            Err(GraphError::NotFound) => return Err(GraphError::NotFollowing),
            Err(error) => return Err(error),
        }
        projections::refresh_pair(&mut tx, actor_id, target_id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Whether `actor_id` follows `target_id`, read from the edge table
    pub async fn is_following(&self, actor_id: &str, target_id: &str) -> Result<bool, GraphError> {
        self.db.edge_exists(actor_id, target_id).await
    }

    /// Follow the owner of a profile
    ///
    /// # Errors
    /// `TargetNotFound` if the profile does not exist, otherwise as `follow`
    pub async fn follow_profile(
        &self,
        actor_id: &str,
        target_profile_id: &str,
    ) -> Result<FollowEdge, GraphError> {
        let owner = self.resolve_owner(target_profile_id).await?;
        self.follow(actor_id, &owner).await
    }

    /// Unfollow the owner of a profile
    ///
    /// # Errors
    /// `TargetNotFound` if the profile does not exist, otherwise as `unfollow`
    pub async fn unfollow_profile(
        &self,
        actor_id: &str,
        target_profile_id: &str,
    ) -> Result<(), GraphError> {
        let owner = self.resolve_owner(target_profile_id).await?;
        self.unfollow(actor_id, &owner).await
    }

    /// Posts and follow counts for an account
    ///
    /// # Arguments
    /// * `exact` - recompute counts from the edge table instead of trusting
    ///   the stored counters; falls back to the configured default
    pub async fn get_stats(
        &self,
        account_id: &str,
        exact: Option<bool>,
    ) -> Result<AccountStats, AppError> {
        let exact = exact.unwrap_or(self.exact_counts);
        with_storage_retry("stats", move || self.try_get_stats(account_id, exact))
            .await?
            .ok_or(AppError::NotFound("User"))
    }

    async fn try_get_stats(
        &self,
        account_id: &str,
        exact: bool,
    ) -> Result<Option<AccountStats>, GraphError> {
        let Some((stored_followers, stored_following)) =
            self.db.stored_follow_counts(account_id).await?
        else {
            return Ok(None);
        };
        let posts_count = self.db.count_posts_by_author(account_id).await?;

        if !exact {
            return Ok(Some(AccountStats {
                posts_count,
                followers_count: stored_followers,
                following_count: stored_following,
            }));
        }

        let followers_count = self
            .db
            .count_edges_where(EdgeRole::Followee, account_id)
            .await?;
        let following_count = self
            .db
            .count_edges_where(EdgeRole::Follower, account_id)
            .await?;

        report_drift(account_id, "followersCount", stored_followers, followers_count);
        report_drift(account_id, "followingCount", stored_following, following_count);

        Ok(Some(AccountStats {
            posts_count,
            followers_count,
            following_count,
        }))
    }

    /// Recompute one account's projections from its edges
    ///
    /// Also refreshes the account's profile lists.
    pub async fn reconcile(&self, account_id: &str) -> Result<ReconcileReport, GraphError> {
        let refresh = with_storage_retry("reconcile", move || self.try_reconcile(account_id)).await?;

        if refresh.changed {
            report_drift(
                account_id,
                "followersCount",
                refresh.previous_followers_count,
                refresh.followers_count,
            );
            report_drift(
                account_id,
                "followingCount",
                refresh.previous_following_count,
                refresh.following_count,
            );
            tracing::info!(account = %account_id, "Projections reconciled");
        }

        Ok(ReconcileReport {
            account_id: refresh.account_id,
            drifted: refresh.changed,
            followers_count: refresh.followers_count,
            following_count: refresh.following_count,
        })
    }

    async fn try_reconcile(&self, account_id: &str) -> Result<ProjectionRefresh, GraphError> {
        let mut tx = self.db.begin().await?;
        let refresh = projections::refresh_account(&mut tx, account_id).await?;
        projections::refresh_profile_of(&mut tx, account_id).await?;
        tx.commit().await?;
        Ok(refresh)
    }

    /// Reconcile every account
    ///
    /// # Returns
    /// Number of accounts whose projections had drifted
    pub async fn reconcile_all(&self) -> Result<usize, AppError> {
        let mut drifted = 0;
        for account_id in self.db.list_account_ids().await? {
            if self.reconcile(&account_id).await?.drifted {
                drifted += 1;
            }
        }
        Ok(drifted)
    }

    async fn resolve_owner(&self, profile_id: &str) -> Result<String, GraphError> {
        self.db
            .resolve_profile_owner(profile_id)
            .await?
            .ok_or(GraphError::TargetNotFound)
    }
}

fn report_drift(account_id: &str, field: &'static str, stored: i64, actual: i64) {
    if stored == actual {
        return;
    }

    let drift = GraphError::InconsistentState {
        account_id: account_id.to_string(),
        field,
        stored,
        actual,
    };
    tracing::warn!(error = %drift, "Follow counter drift detected");
    GRAPH_DRIFT_TOTAL.with_label_values(&[field]).inc();
}
