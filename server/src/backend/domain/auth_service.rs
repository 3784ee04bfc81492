//! Parent account signup, login and session lifecycle.

use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::commands::auth::{LoginCommand, SignupCommand};
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::parent::Parent;
use crate::backend::domain::session::{SessionContext, SessionStore};
use crate::backend::storage::{Connection, ParentStorage};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Clone)]
pub struct AuthService<C: Connection> {
    parent_repository: C::ParentRepository,
    sessions: SessionStore,
}

impl<C: Connection> AuthService<C> {
    pub fn new(connection: Arc<C>, sessions: SessionStore) -> Self {
        Self {
            parent_repository: connection.create_parent_repository(),
            sessions,
        }
    }

    /// Create a parent account. Does not sign the parent in.
    pub async fn signup(&self, command: SignupCommand) -> DomainResult<Parent> {
        validate_signup(&command)?;

        let parent = Parent::new(&command.email, &command.password, Utc::now());
        if !self.parent_repository.store_parent(&parent).await? {
            warn!("Signup rejected: email already registered");
            return Err(DomainError::Conflict("Email is already registered".to_string()));
        }

        info!("Created parent account {}", parent.id);
        Ok(parent)
    }

    pub async fn login(&self, command: LoginCommand) -> DomainResult<SessionContext> {
        let parent = self
            .parent_repository
            .find_by_email(&command.email)
            .await?
            .filter(|parent| parent.verify_password(&command.password))
            .ok_or_else(|| {
                warn!("Login failed");
                DomainError::Unauthenticated
            })?;

        Ok(self.sessions.open(&parent, Utc::now()))
    }

    /// Clear the session. Logging out twice is fine.
    pub fn logout(&self, token: &str) {
        if self.sessions.close(token) {
            info!("Closed parent session");
        }
    }

    /// Resolve the session behind a bearer token
    pub fn current(&self, token: &str) -> DomainResult<SessionContext> {
        self.sessions.resolve(token, Utc::now())
    }

    pub fn purge_expired_sessions(&self) -> usize {
        self.sessions.purge_expired(Utc::now())
    }
}

fn validate_signup(command: &SignupCommand) -> DomainResult<()> {
    let email = command.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::Validation("A valid email address is required".to_string()));
    }

    if command.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if command.password != command.password_confirm {
        return Err(DomainError::Validation("Passwords do not match".to_string()));
    }

    Ok(())
}
