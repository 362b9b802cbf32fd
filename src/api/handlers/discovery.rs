//! Directory search over profiles and projects
//!
//! Results a caller already has a pending claim on are filtered out, so
//! a dangling cross-reference left by a past accept never resurfaces in
//! a listing.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::JwtAuth;
use crate::domain::repositories::{
    DeveloperSummary, ProfileRepository, ProjectRepository, ProjectSummary,
};
use crate::infrastructure::repositories::{PostgresProfileRepository, PostgresProjectRepository};

const PAGE_SIZE: u32 = 15;

/// Query parameters for the developer directory
#[derive(Debug, Deserialize)]
pub struct FindDevelopersQuery {
    pub role: String,
    pub page: Option<u32>,
}

/// Query parameters for the project directory
#[derive(Debug, Deserialize)]
pub struct FindProjectsQuery {
    /// Comma-separated skill list
    pub skills: String,
    pub page: Option<u32>,
}

/// Developer directory entry
#[derive(Debug, Serialize)]
pub struct DeveloperEntry {
    pub user_id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub skills: Vec<String>,
}

impl From<DeveloperSummary> for DeveloperEntry {
    fn from(summary: DeveloperSummary) -> Self {
        Self {
            user_id: summary.user_id,
            name: summary.name,
            avatar_url: summary.avatar_url,
            skills: summary.skills,
        }
    }
}

/// Project directory entry
#[derive(Debug, Serialize)]
pub struct ProjectEntry {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub open_roles: Vec<String>,
}

impl From<ProjectSummary> for ProjectEntry {
    fn from(summary: ProjectSummary) -> Self {
        let open_roles = summary
            .members
            .iter()
            .filter(|slot| slot.vacancy)
            .map(|slot| slot.role.clone())
            .collect();
        Self {
            id: summary.id,
            title: summary.title,
            description: summary.description,
            open_roles,
        }
    }
}

/// Find unemployed developers for an open role on the caller's project
///
/// Developers who already hold a claim on that project for the role are
/// excluded from the listing.
///
/// GET /api/find/developers?role=&page=
pub async fn find_developers(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Query(query): Query<FindDevelopersQuery>,
) -> Result<Json<Vec<DeveloperEntry>>, ApiError> {
    let project_repo = PostgresProjectRepository::new(pool.clone());
    let project = project_repo
        .find_active_by_owner(user_id)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("no active project owned by this user"))?;

    if !project.roster().has_role(&query.role) {
        return Err(ApiError::not_found(format!(
            "role '{}' not found",
            query.role
        )));
    }
    if !project.roster().has_vacancy(&query.role) {
        return Err(ApiError::conflict("no vacancy for this role"));
    }

    let exclude: Vec<Uuid> = project
        .applicants()
        .iter()
        .chain(project.offered().iter())
        .filter(|p| p.role == query.role)
        .map(|p| p.developer)
        .collect();

    let profile_repo = PostgresProfileRepository::new(pool);
    let developers = profile_repo
        .find_available(&query.role, &exclude, query.page.unwrap_or(1), PAGE_SIZE)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Search failed: {}", e)))?;

    Ok(Json(developers.into_iter().map(Into::into).collect()))
}

/// Find hiring projects with an open slot matching the caller's skills
///
/// GET /api/find/projects?skills=&page=
pub async fn find_projects(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Query(query): Query<FindProjectsQuery>,
) -> Result<Json<Vec<ProjectEntry>>, ApiError> {
    let skills: Vec<String> = query
        .skills
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if skills.is_empty() {
        return Err(ApiError::bad_request("at least one skill is required"));
    }

    let profile_repo = PostgresProfileRepository::new(pool.clone());
    let profile = profile_repo
        .find_by_user(user_id)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("profile not found"))?;

    if profile.is_employed() {
        return Err(ApiError::conflict("already employed"));
    }
    if let Some(missing) = skills.iter().find(|s| !profile.has_skill(s)) {
        return Err(ApiError::conflict(format!(
            "profile does not list the skill '{}'",
            missing
        )));
    }

    let exclude: Vec<Uuid> = profile
        .applied()
        .iter()
        .chain(profile.offers().iter())
        .map(|claim| claim.project_id)
        .collect();

    let project_repo = PostgresProjectRepository::new(pool);
    let projects = project_repo
        .find_hiring(&skills, &exclude, query.page.unwrap_or(1), PAGE_SIZE)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Search failed: {}", e)))?;

    Ok(Json(projects.into_iter().map(Into::into).collect()))
}
