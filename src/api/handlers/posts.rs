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
use crate::domain::project::Post;
use crate::infrastructure::repositories::PostgresProjectRepository;

/// Request body for creating a post
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub text: String,
}

/// Request body for commenting on a post
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

/// Create a post on the project board
///
/// POST /api/projects/:id/posts
pub async fn create_post(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let repo = PostgresProjectRepository::new(pool);
    let mut project = load_project(&repo, project_id).await?;
    project.add_post(user_id, req.title, req.text)?;
    save_project(&repo, &project).await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(&project))))
}

/// Get a single post; members only
///
/// GET /api/projects/:id/posts/:post_id
pub async fn get_post(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path((project_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Post>, ApiError> {
    let repo = PostgresProjectRepository::new(pool);
    let project = load_project(&repo, project_id).await?;
    let post = project.board_post(user_id, post_id)?;

    Ok(Json(post.clone()))
}

/// Delete a post authored by the caller
///
/// DELETE /api/projects/:id/posts/:post_id
pub async fn delete_post(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path((project_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let repo = PostgresProjectRepository::new(pool);
    let mut project = load_project(&repo, project_id).await?;
    project.remove_post(user_id, post_id)?;
    save_project(&repo, &project).await?;

    Ok(Json(ProjectResponse::from(&project)))
}

/// Like a post
///
/// PUT /api/projects/:id/posts/:post_id/like
pub async fn like_post(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path((project_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let repo = PostgresProjectRepository::new(pool);
    let mut project = load_project(&repo, project_id).await?;
    project.like_post(user_id, post_id)?;
    save_project(&repo, &project).await?;

    Ok(Json(ProjectResponse::from(&project)))
}

/// Remove the caller's like from a post
///
/// PUT /api/projects/:id/posts/:post_id/unlike
pub async fn unlike_post(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path((project_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let repo = PostgresProjectRepository::new(pool);
    let mut project = load_project(&repo, project_id).await?;
    project.unlike_post(user_id, post_id)?;
    save_project(&repo, &project).await?;

    Ok(Json(ProjectResponse::from(&project)))
}

/// Comment on a post
///
/// POST /api/projects/:id/posts/:post_id/comments
pub async fn add_comment(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path((project_id, post_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let repo = PostgresProjectRepository::new(pool);
    let mut project = load_project(&repo, project_id).await?;
    project.add_comment(user_id, post_id, req.text)?;
    save_project(&repo, &project).await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(&project))))
}

/// Delete a comment authored by the caller
///
/// DELETE /api/projects/:id/posts/:post_id/comments/:comment_id
pub async fn delete_comment(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path((project_id, post_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let repo = PostgresProjectRepository::new(pool);
    let mut project = load_project(&repo, project_id).await?;
    project.remove_comment(user_id, post_id, comment_id)?;
    save_project(&repo, &project).await?;

    Ok(Json(ProjectResponse::from(&project)))
}
