//! Contact form service

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use super::account::{normalize_email, normalize_required};
use super::profile::normalize_optional_text;
use crate::data::{ContactMessage, Database, EntityId};
use crate::error::AppError;

const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

pub struct ContactService {
    db: Arc<Database>,
}

impl ContactService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a message from the public contact form
    ///
    /// # Errors
    /// `Validation` if name, email or message is missing, the email is
    /// malformed, or the message is longer than 5000 characters
    pub async fn submit(&self, input: NewContactMessage) -> Result<ContactMessage, AppError> {
        let name = normalize_required(&input.name, "name")?;
        let email = normalize_email(&input.email)?;
        let message = normalize_required(&input.message, "message")?;
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AppError::Validation(format!(
                "message cannot exceed {MAX_MESSAGE_CHARS} characters"
            )));
        }

        let message = ContactMessage {
            id: EntityId::new().0,
            name,
            email,
            subject: input.subject.and_then(normalize_optional_text),
            message,
            created_at: Utc::now(),
        };
        self.db.insert_contact_message(&message).await?;
        tracing::info!(message = %message.id, "Contact message received");

        Ok(message)
    }

    /// All messages, newest first
    pub async fn list_messages(&self) -> Result<Vec<ContactMessage>, AppError> {
        self.db.list_contact_messages().await
    }
}
