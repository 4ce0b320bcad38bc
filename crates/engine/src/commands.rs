//! Command structs for engine operations.
//!
//! These types group parameters for write operations (user sync, transaction
//! creation, split), keeping call sites readable.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::normalize_optional_text};

/// Profile metadata forwarded by the identity provider on sign-in.
#[derive(Clone, Debug, Default)]
pub struct UserMetadata {
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    /// Sign-in provider (`google`, `email`, ...).
    pub provider: Option<String>,
}

/// Create or refresh a local user from the identity provider.
#[derive(Clone, Debug)]
pub struct SyncUserCmd {
    pub id: String,
    pub email: String,
    pub metadata: UserMetadata,
}

impl SyncUserCmd {
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            metadata: UserMetadata::default(),
        }
    }

    #[must_use]
    pub fn full_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.full_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.metadata.provider = Some(provider.into());
        self
    }

    #[must_use]
    pub fn avatar_url(mut self, url: impl Into<String>) -> Self {
        self.metadata.avatar_url = Some(url.into());
        self
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::InvalidInput("id is required".to_string()));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(EngineError::InvalidInput("email is required".to_string()));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(EngineError::InvalidInput(format!("invalid email: {email}"))),
        }
    }

    /// Name shown for the user: full name, then name, then the local part
    /// of the email.
    pub(crate) fn display_name(&self) -> String {
        normalize_optional_text(self.metadata.full_name.as_deref())
            .or_else(|| normalize_optional_text(self.metadata.name.as_deref()))
            .unwrap_or_else(|| {
                let email = self.email.trim();
                email.split('@').next().unwrap_or(email).to_string()
            })
    }

    pub(crate) fn google_id(&self) -> Option<String> {
        self.metadata
            .provider
            .as_deref()
            .filter(|p| p.eq_ignore_ascii_case("google"))
            .map(|_| self.id.trim().to_string())
    }
}

/// Create a transaction owned by `user_id`.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub user_id: String,
    pub amount_minor: i64,
    pub description: String,
    pub date: DateTime<Utc>,
}

/// Split a transaction owned by `user_id` evenly with `friend_ids`.
#[derive(Clone, Debug)]
pub struct SplitCmd {
    pub transaction_id: Uuid,
    pub user_id: String,
    pub friend_ids: Vec<String>,
}

impl SplitCmd {
    /// Checks the friend list before anything touches the database.
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.friend_ids.is_empty() {
            return Err(EngineError::InvalidInput(
                "friendIds must not be empty".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(self.friend_ids.len());
        for friend_id in &self.friend_ids {
            if friend_id.trim().is_empty() {
                return Err(EngineError::InvalidInput(
                    "friendIds must not contain blank ids".to_string(),
                ));
            }
            if friend_id == &self.user_id {
                return Err(EngineError::InvalidInput(
                    "cannot split a transaction with yourself".to_string(),
                ));
            }
            if !seen.insert(friend_id.as_str()) {
                return Err(EngineError::InvalidInput(format!(
                    "duplicate friend id: {friend_id}"
                )));
            }
        }
        Ok(())
    }
}
