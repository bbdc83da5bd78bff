//! User model
//!
//! A registered account. `password` holds the caller-supplied plaintext until
//! the pre-create lifecycle phase replaces it with an Argon2id hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role granted to every account
pub const ROLE_USER: &str = "ROLE_USER";

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Email address (unique), also the welcome mail recipient
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    /// Plaintext before pre-create, password hash afterwards
    #[serde(skip_serializing)]
    pub password: String,
    /// Security roles
    pub roles: Vec<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new, not yet persisted user.
    ///
    /// The password is the caller's plaintext; it is hashed by the lifecycle
    /// pipeline before the row is written.
    pub fn new(email: String, firstname: String, lastname: String, password: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            email,
            firstname,
            lastname,
            password,
            roles: vec![ROLE_USER.to_string()],
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a new user (before password hashing)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    /// Plaintext password (will be hashed)
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new(
            "jane@actu.news".to_string(),
            "Jane".to_string(),
            "Doe".to_string(),
            "p@ss".to_string(),
        )
    }

    #[test]
    fn test_user_new() {
        let user = sample_user();

        assert_eq!(user.id, 0);
        assert_eq!(user.email, "jane@actu.news");
        assert_eq!(user.roles, vec![ROLE_USER.to_string()]);
        assert_eq!(user.firstname, "Jane");
        assert_eq!(user.password, "p@ss");
    }

    #[test]
    fn test_password_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "jane@actu.news");
    }
}
