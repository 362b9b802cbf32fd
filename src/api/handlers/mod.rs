// HTTP handlers, one module per resource

pub mod auth;
pub mod discovery;
pub mod membership;
pub mod posts;
pub mod profiles;
pub mod projects;
pub mod tasks;

use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::domain::project::Project;
use crate::domain::repositories::ProjectRepository;
use crate::infrastructure::repositories::PostgresProjectRepository;

pub(crate) async fn load_project(
    repo: &PostgresProjectRepository,
    id: Uuid,
) -> Result<Project, ApiError> {
    repo.find_by_id(id)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found(format!("Project not found: {}", id)))
}

pub(crate) async fn save_project(
    repo: &PostgresProjectRepository,
    project: &Project,
) -> Result<(), ApiError> {
    repo.save(project)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to save project: {}", e)))
}
