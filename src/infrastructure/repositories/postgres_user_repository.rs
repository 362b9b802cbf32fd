use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::repositories::{User, UserRepository};
use crate::domain::user::Email;

/// PostgreSQL implementation of UserRepository
///
/// Uses runtime-checked queries so the crate builds without a live
/// database; rows map through [`FromRow`] structs.
pub struct PostgresUserRepository {
    pool: PgPool,
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    avatar_url: Option<String>,
}

impl UserRow {
    fn into_user(self) -> Result<User, String> {
        let email = Email::new(&self.email)
            .map_err(|e| format!("Invalid email from database: {}", e))?;
        Ok(User {
            id: self.id,
            name: self.name,
            email,
            password_hash: self.password_hash,
            avatar_url: self.avatar_url,
        })
    }
}

const SELECT_COLUMNS: &str = "id, name, email, password_hash, avatar_url";

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<Uuid, String> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, avatar_url)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.avatar_url)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create user: {}", e))?;

        Ok(user.id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, String> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to find user by id: {}", e))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, String> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE email = $1",
            SELECT_COLUMNS
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to find user by email: {}", e))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn anonymize(&self, id: Uuid) -> Result<(), String> {
        // Placeholder email keeps the unique constraint and decodability
        let result = sqlx::query(
            "UPDATE users
             SET name = '[deleted]',
                 email = 'deleted+' || id::text || '@users.invalid',
                 avatar_url = NULL,
                 password_hash = ''
             WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to anonymize user: {}", e))?;

        if result.rows_affected() == 0 {
            return Err(format!("User not found: {}", id));
        }
        Ok(())
    }
}
