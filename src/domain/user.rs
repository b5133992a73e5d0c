//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to insert a user row.
///
/// The id is chosen before insertion so that session tokens can be
/// signed and stored in the same transaction as the user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Registration input after shape validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "alice1")]
    pub username: String,
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(example = "a@x.com")]
    pub email: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_has_no_password_hash() {
        let user = NewUser {
            id: Uuid::new_v4(),
            username: "alice1".to_string(),
            email: "a@x.com".to_string(),
            name: "Alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
        }
        .into_user(Utc::now());

        let json = serde_json::to_string(&UserResponse::from(user.clone())).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("alice1"));

        // The entity itself never serializes the hash either
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
    }
}
