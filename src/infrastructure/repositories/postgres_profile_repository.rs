use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::profile::{Education, Experience, PendingClaim, Profile, ProjectRef};
use crate::domain::repositories::{DeveloperSummary, ProfileRepository};

/// PostgreSQL implementation of ProfileRepository
///
/// Nested claim lists persist as JSONB columns; the profile row is one
/// half of the membership aggregate, so the fetch/persist helpers are
/// shared with the transactional store.
pub struct PostgresProfileRepository {
    pool: PgPool,
}

#[derive(FromRow)]
struct ProfileRow {
    id: Uuid,
    user_id: Uuid,
    skills: Json<Vec<String>>,
    bio: Option<String>,
    website: Option<String>,
    location: Option<String>,
    github_username: Option<String>,
    current_job: Option<Uuid>,
    offers: Json<Vec<PendingClaim>>,
    applied: Json<Vec<PendingClaim>>,
    projects: Json<Vec<ProjectRef>>,
    experience: Json<Vec<Experience>>,
    education: Json<Vec<Education>>,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> Profile {
        Profile::from_persistence(
            self.id,
            self.user_id,
            self.skills.0,
            self.bio,
            self.website,
            self.location,
            self.github_username,
            self.current_job,
            self.offers.0,
            self.applied.0,
            self.projects.0,
            self.experience.0,
            self.education.0,
            self.created_at,
        )
    }
}

const SELECT_PROFILE: &str = "SELECT id, user_id, skills, bio, website, location, \
     github_username, current_job, offers, applied, projects, experience, education, \
     created_at FROM profiles WHERE user_id = $1";

/// Fetches a profile by user id
pub(crate) async fn fetch_profile(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Option<Profile>, sqlx::Error> {
    let row: Option<ProfileRow> = sqlx::query_as(SELECT_PROFILE)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(ProfileRow::into_profile))
}

/// Fetches a profile by user id, locking the row for the transaction
pub(crate) async fn fetch_profile_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Option<Profile>, sqlx::Error> {
    let row: Option<ProfileRow> = sqlx::query_as(&format!("{} FOR UPDATE", SELECT_PROFILE))
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(ProfileRow::into_profile))
}

/// Upserts a profile row
pub(crate) async fn persist_profile(
    conn: &mut PgConnection,
    profile: &Profile,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO profiles (
            id, user_id, skills, bio, website, location, github_username,
            current_job, offers, applied, projects, experience, education, created_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
         ON CONFLICT (id) DO UPDATE SET
            skills = EXCLUDED.skills,
            bio = EXCLUDED.bio,
            website = EXCLUDED.website,
            location = EXCLUDED.location,
            github_username = EXCLUDED.github_username,
            current_job = EXCLUDED.current_job,
            offers = EXCLUDED.offers,
            applied = EXCLUDED.applied,
            projects = EXCLUDED.projects,
            experience = EXCLUDED.experience,
            education = EXCLUDED.education",
    )
    .bind(profile.id())
    .bind(profile.user_id())
    .bind(Json(profile.skills()))
    .bind(profile.bio())
    .bind(profile.website())
    .bind(profile.location())
    .bind(profile.github_username())
    .bind(profile.current_job())
    .bind(Json(profile.offers()))
    .bind(Json(profile.applied()))
    .bind(Json(profile.projects()))
    .bind(Json(profile.experience()))
    .bind(Json(profile.education()))
    .bind(profile.created_at())
    .execute(conn)
    .await?;
    Ok(())
}

#[derive(FromRow)]
struct DeveloperSummaryRow {
    user_id: Uuid,
    name: String,
    avatar_url: Option<String>,
    skills: Json<Vec<String>>,
}

impl PostgresProfileRepository {
    /// Creates a new PostgresProfileRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn save(&self, profile: &Profile) -> Result<(), String> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| format!("Failed to acquire connection: {}", e))?;
        persist_profile(&mut conn, profile)
            .await
            .map_err(|e| format!("Failed to save profile: {}", e))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, String> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| format!("Failed to acquire connection: {}", e))?;
        fetch_profile(&mut conn, user_id)
            .await
            .map_err(|e| format!("Failed to find profile: {}", e))
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<(), String> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to delete profile: {}", e))?;

        if result.rows_affected() == 0 {
            return Err(format!("Profile not found for user: {}", user_id));
        }
        Ok(())
    }

    async fn find_available(
        &self,
        role: &str,
        exclude: &[Uuid],
        page: u32,
        per_page: u32,
    ) -> Result<Vec<DeveloperSummary>, String> {
        let offset = super::page_offset(page, per_page);
        let rows: Vec<DeveloperSummaryRow> = sqlx::query_as(
            "SELECT p.user_id, u.name, u.avatar_url, p.skills
             FROM profiles p
             JOIN users u ON u.id = p.user_id
             WHERE p.current_job IS NULL
               AND p.skills @> $1
               AND p.user_id <> ALL($2)
             ORDER BY p.created_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(Json(vec![role]))
        .bind(exclude)
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to search developers: {}", e))?;

        Ok(rows
            .into_iter()
            .map(|r| DeveloperSummary {
                user_id: r.user_id,
                name: r.name,
                avatar_url: r.avatar_url,
                skills: r.skills.0,
            })
            .collect())
    }
}
