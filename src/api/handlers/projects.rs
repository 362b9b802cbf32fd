use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::JwtAuth;
use crate::domain::project::{PendingDev, Post, Project, ProjectStatus, Slot, Task};
use crate::domain::repositories::ProjectRepository;
use crate::infrastructure::repositories::PostgresProjectRepository;
use crate::infrastructure::PgMembershipStore;

/// Request body for creating a project
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    pub roles: Vec<String>,
}

/// Request body for opening an additional role
#[derive(Debug, Deserialize)]
pub struct AddRoleRequest {
    pub role: String,
}

/// Full project view
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub members: Vec<Slot>,
    pub applicants: Vec<PendingDev>,
    pub offered: Vec<PendingDev>,
    pub tasks: Vec<Task>,
    pub posts: Vec<Post>,
    pub created_at: DateTime<Utc>,
}

impl From<&Project> for ProjectResponse {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id(),
            owner: project.owner(),
            title: project.title().to_string(),
            description: project.description().to_string(),
            status: project.status(),
            members: project.members().to_vec(),
            applicants: project.applicants().to_vec(),
            offered: project.offered().to_vec(),
            tasks: project.tasks().to_vec(),
            posts: project.posts().to_vec(),
            created_at: project.created_at(),
        }
    }
}

/// Posting view shown to non-participants; members-only content omitted
#[derive(Debug, Serialize)]
pub struct PublicProjectResponse {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub members: Vec<Slot>,
    pub created_at: DateTime<Utc>,
}

impl From<&Project> for PublicProjectResponse {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id(),
            owner: project.owner(),
            title: project.title().to_string(),
            description: project.description().to_string(),
            status: project.status(),
            members: project.members().to_vec(),
            created_at: project.created_at(),
        }
    }
}

/// Create a new project owned by the caller
///
/// POST /api/projects
pub async fn create_project(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let store = PgMembershipStore::new(pool);
    let project = store
        .create_project(user_id, req.title, req.description, req.roles)
        .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(&project))))
}

/// Get a project by ID
///
/// Participants see the whole aggregate; everyone else gets the posting
/// view without pending claims, tasks or the board.
///
/// GET /api/projects/:id
pub async fn get_project(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = PostgresProjectRepository::new(pool);
    let project = repo
        .find_by_id(id)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found(format!("Project not found: {}", id)))?;

    if project.is_participant(user_id) {
        Ok(Json(ProjectResponse::from(&project)).into_response())
    } else {
        Ok(Json(PublicProjectResponse::from(&project)).into_response())
    }
}

/// Open an additional role slot on the caller's project
///
/// PUT /api/projects/:id/roles
pub async fn add_role(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<AddRoleRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let store = PgMembershipStore::new(pool);
    let project = store.add_role(user_id, id, &req.role).await?;

    Ok(Json(ProjectResponse::from(&project)))
}

/// Close the caller's project, evicting all members
///
/// DELETE /api/projects/:id
pub async fn close_project(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let store = PgMembershipStore::new(pool);
    let project = store.close_project(user_id, id).await?;

    Ok(Json(ProjectResponse::from(&project)))
}
