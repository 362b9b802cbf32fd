use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::handlers::projects::ProjectResponse;
use crate::api::handlers::{load_project, save_project};
use crate::api::middleware::JwtAuth;
use crate::infrastructure::repositories::PostgresProjectRepository;

/// Request body for creating a task
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub developer: Uuid,
    pub title: String,
    pub description: String,
}

/// Request body for returning a task to its assignee
#[derive(Debug, Deserialize)]
pub struct ReturnTaskRequest {
    pub note: String,
}

/// Create a task assigned to a member
///
/// POST /api/projects/:id/tasks
pub async fn create_task(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let repo = PostgresProjectRepository::new(pool);
    let mut project = load_project(&repo, project_id).await?;
    project.add_task(user_id, req.developer, req.title, req.description)?;
    save_project(&repo, &project).await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(&project))))
}

/// Advance a task along its lifecycle
///
/// PUT /api/projects/:id/tasks/:task_id/advance
pub async fn advance_task(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let repo = PostgresProjectRepository::new(pool);
    let mut project = load_project(&repo, project_id).await?;
    project.advance_task(user_id, task_id)?;
    save_project(&repo, &project).await?;

    Ok(Json(ProjectResponse::from(&project)))
}

/// Return a completed task to its assignee with a note
///
/// PUT /api/projects/:id/tasks/:task_id/return
pub async fn return_task(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ReturnTaskRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let repo = PostgresProjectRepository::new(pool);
    let mut project = load_project(&repo, project_id).await?;
    project.return_task(user_id, task_id, req.note)?;
    save_project(&repo, &project).await?;

    Ok(Json(ProjectResponse::from(&project)))
}

/// Close a completed task
///
/// PUT /api/projects/:id/tasks/:task_id/close
pub async fn close_task(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let repo = PostgresProjectRepository::new(pool);
    let mut project = load_project(&repo, project_id).await?;
    project.close_task(user_id, task_id)?;
    save_project(&repo, &project).await?;

    Ok(Json(ProjectResponse::from(&project)))
}
