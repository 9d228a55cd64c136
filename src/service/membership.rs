//! Membership plan service

use std::sync::Arc;

use serde::Deserialize;
use sqlx::types::Json;

use crate::data::{Database, EntityId, MembershipPlan, PlanName};
use crate::error::AppError;

/// Plan creation input
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPlan {
    pub name: PlanName,
    pub price_per_month: f64,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Membership plan service
pub struct MembershipService {
    db: Arc<Database>,
}

impl MembershipService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list_plans(&self) -> Result<Vec<MembershipPlan>, AppError> {
        self.db.get_membership_plans().await
    }

    /// Create a plan
    ///
    /// # Errors
    /// - `Validation` if the price is negative or not finite
    /// - `Conflict` if a plan with that name exists
    pub async fn create_plan(&self, input: NewPlan) -> Result<MembershipPlan, AppError> {
        if !input.price_per_month.is_finite() || input.price_per_month < 0.0 {
            return Err(AppError::Validation(
                "pricePerMonth must be a non-negative number".to_string(),
            ));
        }

        let features = input
            .features
            .into_iter()
            .map(|feature| feature.trim().to_string())
            .filter(|feature| !feature.is_empty())
            .collect();

        let plan = MembershipPlan {
            id: EntityId::new().0,
            name: input.name.as_str().to_string(),
            price_per_month: input.price_per_month,
            features: Json(features),
        };
        self.db.insert_membership_plan(&plan).await?;
        tracing::info!(plan = %plan.name, "Membership plan created");

        Ok(plan)
    }
}
