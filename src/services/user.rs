//! User service
//!
//! Implements business logic for user accounts:
//! - Registration through the lifecycle pipeline (password hashing before the
//!   insert, welcome email after it)
//! - Lookup by ID

use std::sync::Arc;

use anyhow::Context;

use crate::db::repositories::{is_unique_violation, UserRepository};
use crate::lifecycle::{CreateError, LifecycleError, LifecyclePipeline};
use crate::models::{CreateUserInput, User};
use crate::services::validation;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User not found
    #[error("User not found: {0}")]
    NotFound(i64),

    /// Email already registered
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// The password could not be hashed
    #[error("Credentials rejected: {0}")]
    CredentialsRejected(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<CreateError> for UserServiceError {
    fn from(err: CreateError) -> Self {
        match err {
            CreateError::Rejected {
                source: LifecycleError::Hashing(e),
                ..
            } => UserServiceError::CredentialsRejected(e.to_string()),
            CreateError::Rejected { source, .. } => {
                UserServiceError::ValidationError(source.to_string())
            }
            CreateError::Persistence(e) => UserServiceError::InternalError(e),
        }
    }
}

/// User service for managing accounts
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    pipeline: Arc<LifecyclePipeline>,
}

impl UserService {
    /// Create a new user service
    pub fn new(repo: Arc<dyn UserRepository>, pipeline: Arc<LifecyclePipeline>) -> Self {
        Self { repo, pipeline }
    }

    /// Register a new user.
    ///
    /// The plaintext password is replaced by its hash before the row is
    /// written; the welcome email is queued once the row exists.
    ///
    /// # Errors
    /// - `ValidationError` for blank, overlong or malformed fields
    /// - `EmailTaken` if the email is already registered, including when a
    ///   concurrent registration wins the insert
    /// - `CredentialsRejected` if the password cannot be hashed; nothing is written
    pub async fn create(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        self.validate_create_input(&input)?;

        let email = input.email.trim().to_string();
        if self
            .repo
            .exists_by_email(&email)
            .await
            .context("Failed to check email uniqueness")?
        {
            return Err(UserServiceError::EmailTaken(email));
        }

        let user = User::new(
            email.clone(),
            input.firstname.trim().to_string(),
            input.lastname.trim().to_string(),
            input.password,
        );

        let repo = self.repo.clone();
        let created = self
            .pipeline
            .run_create(user, move |u| async move { repo.create(&u).await })
            .await
            .map_err(|e| match e {
                CreateError::Persistence(err) if is_unique_violation(&err) => {
                    UserServiceError::EmailTaken(email)
                }
                other => other.into(),
            })?;

        tracing::info!(user_id = created.id, "User registered");
        Ok(created)
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<User, UserServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::NotFound(id))
    }

    fn validate_create_input(&self, input: &CreateUserInput) -> Result<(), UserServiceError> {
        validation::email(&input.email)
            .and_then(|_| validation::required_text(&input.firstname, "N'oubliez pas votre prénom."))
            .and_then(|_| validation::required_text(&input.lastname, "N'oubliez pas votre nom."))
            .and_then(|_| validation::not_blank(&input.password, "N'oubliez pas votre mot de passe."))
            .map_err(UserServiceError::ValidationError)
    }
}
