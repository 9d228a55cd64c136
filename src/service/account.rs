//! Account service
//!
//! Registration, login and the bootstrap admin account.

use std::sync::Arc;

use chrono::Utc;
use sqlx::types::Json;

use crate::auth::password::{hash_password, verify_password};
use crate::config::AdminConfig;
use crate::data::{Account, Database, EntityId, Membership, Role};
use crate::error::AppError;

const MIN_PASSWORD_CHARS: usize = 8;

/// Registration input
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

pub(super) fn normalize_required(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

pub(super) fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = normalize_required(email, "email")?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::Validation("email is not a valid address".to_string())),
    }
}

async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
}

/// Account service
pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    /// Create new account service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get account by ID
    pub async fn get_account(&self, id: &str) -> Result<Account, AppError> {
        self.db.get_account(id).await?.ok_or(AppError::NotFound("User"))
    }

    /// Register a new account
    ///
    /// # Errors
    /// - `Validation` for missing fields, a short password, or the admin role
    /// - `Conflict` if the email is already registered
    pub async fn register(&self, input: NewAccount) -> Result<Account, AppError> {
        if input.role == Role::Admin {
            return Err(AppError::Validation(
                "the admin role cannot be self-assigned".to_string(),
            ));
        }
        self.create(input).await
    }

    async fn create(&self, input: NewAccount) -> Result<Account, AppError> {
        let full_name = normalize_required(&input.full_name, "fullName")?;
        let email = normalize_email(&input.email)?;
        if input.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AppError::Validation(format!(
                "password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }

        // Fast-path guard before the expensive hash.
        if self.db.get_account_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_blocking(input.password).await?;
        let now = Utc::now();
        let account = Account {
            id: EntityId::new().0,
            full_name,
            email,
            password_hash,
            role: input.role.as_str().to_string(),
            membership: Membership::default().as_str().to_string(),
            profile_picture: String::new(),
            followers_count: 0,
            following_count: 0,
            followers: Json(Vec::new()),
            following: Json(Vec::new()),
            created_at: now,
            updated_at: now,
        };

        self.db.insert_account(&account).await?;
        tracing::info!(account = %account.id, role = %account.role, "Account registered");

        Ok(account)
    }

    /// Check credentials
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown email or a wrong password alike
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AppError> {
        let Some(account) = self.db.get_account_by_email(email.trim()).await? else {
            return Err(AppError::InvalidCredentials);
        };

        let hash = account.password_hash.clone();
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(e.into()))?;

        if !matches {
            tracing::debug!(account = %account.id, "Password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Ensure the configured admin account exists
    ///
    /// Creates it when the email is unknown and promotes an existing
    /// account otherwise. The stored password of an existing account is
    /// left unchanged.
    ///
    /// # Returns
    /// The admin account, or `None` when no admin is configured
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> Result<Option<Account>, AppError> {
        let (Some(email), Some(password)) = (&admin.email, &admin.password) else {
            return Ok(None);
        };

        if let Some(account) = self.db.get_account_by_email(email.trim()).await? {
            if account.role != Role::Admin.as_str() {
                self.db.set_account_role(&account.id, Role::Admin).await?;
                tracing::info!(account = %account.id, "Existing account promoted to admin");
            } else {
                tracing::info!(account = %account.id, "Admin account exists");
            }
            return Ok(self.db.get_account(&account.id).await?);
        }

        let account = self
            .create(NewAccount {
                full_name: admin.full_name.clone(),
                email: email.clone(),
                password: password.clone(),
                role: Role::Admin,
            })
            .await?;
        tracing::info!(account = %account.id, "Admin account created");

        Ok(Some(account))
    }
}
