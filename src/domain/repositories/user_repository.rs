use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::user::Email;

/// User data for persistence
///
/// Simple struct for user CRUD operations
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub avatar_url: Option<String>,
}

/// Repository trait for User records
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: User) -> Result<Uuid, String>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, String>;

    /// Find a user by email address
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, String>;

    /// Anonymize a deleted account (name/email scrubbed, row kept for references)
    async fn anonymize(&self, id: Uuid) -> Result<(), String>;
}
