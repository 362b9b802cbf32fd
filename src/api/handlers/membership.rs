//! Handlers for the apply/offer/accept/reject workflow
//!
//! Every handler delegates to the transactional store; both sides of the
//! aggregate change together or not at all.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::handlers::profiles::ProfileResponse;
use crate::api::handlers::projects::ProjectResponse;
use crate::api::middleware::JwtAuth;
use crate::infrastructure::PgMembershipStore;

/// Request body naming the role of a claim
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

/// Apply the caller to an open role
///
/// PUT /api/projects/:id/apply
pub async fn apply(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path(project_id): Path<Uuid>,
    Json(req): Json<RoleRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let store = PgMembershipStore::new(pool);
    let project = store.apply(user_id, project_id, &req.role).await?;
    Ok(Json(ProjectResponse::from(&project)))
}

/// Offer a role to a developer
///
/// PUT /api/projects/:id/offer/:user_id
pub async fn offer(
    State(pool): State<PgPool>,
    JwtAuth(owner_id): JwtAuth,
    Path((project_id, developer_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<RoleRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let store = PgMembershipStore::new(pool);
    let project = store
        .offer(owner_id, developer_id, project_id, &req.role)
        .await?;
    Ok(Json(ProjectResponse::from(&project)))
}

/// Accept an offer held by the caller
///
/// PUT /api/projects/:id/offer/accept
pub async fn accept_offer(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let store = PgMembershipStore::new(pool);
    let project = store.accept_offer(user_id, project_id).await?;
    Ok(Json(ProjectResponse::from(&project)))
}

/// Accept an applicant into the caller's project
///
/// PUT /api/projects/:id/applicants/:user_id/accept
pub async fn accept_applicant(
    State(pool): State<PgPool>,
    JwtAuth(owner_id): JwtAuth,
    Path((project_id, developer_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let store = PgMembershipStore::new(pool);
    let project = store
        .accept_application(owner_id, developer_id, project_id)
        .await?;
    Ok(Json(ProjectResponse::from(&project)))
}

/// Reject an offer held by the caller
///
/// DELETE /api/projects/:id/offer
pub async fn reject_offer(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let store = PgMembershipStore::new(pool);
    let profile = store.reject_offer(user_id, project_id).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

/// Withdraw the caller's application
///
/// DELETE /api/projects/:id/application
pub async fn withdraw_application(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let store = PgMembershipStore::new(pool);
    let profile = store.withdraw_application(user_id, project_id).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

/// Cancel an offer the caller previously made
///
/// DELETE /api/projects/:id/offer/:user_id
pub async fn cancel_offer(
    State(pool): State<PgPool>,
    JwtAuth(owner_id): JwtAuth,
    Path((project_id, developer_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let store = PgMembershipStore::new(pool);
    let project = store
        .cancel_offer(owner_id, developer_id, project_id)
        .await?;
    Ok(Json(ProjectResponse::from(&project)))
}

/// Reject an applicant to the caller's project
///
/// DELETE /api/projects/:id/applicants/:user_id
pub async fn reject_applicant(
    State(pool): State<PgPool>,
    JwtAuth(owner_id): JwtAuth,
    Path((project_id, developer_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let store = PgMembershipStore::new(pool);
    let project = store
        .reject_applicant(owner_id, developer_id, project_id)
        .await?;
    Ok(Json(ProjectResponse::from(&project)))
}

/// Leave the project the caller is a member of
///
/// DELETE /api/projects/:id/members/me
pub async fn leave(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let store = PgMembershipStore::new(pool);
    let profile = store.leave(user_id, project_id).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

/// Remove a member from the caller's project
///
/// DELETE /api/projects/:id/members/:user_id
pub async fn remove_member(
    State(pool): State<PgPool>,
    JwtAuth(owner_id): JwtAuth,
    Path((project_id, developer_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let store = PgMembershipStore::new(pool);
    let project = store
        .remove_member(owner_id, developer_id, project_id)
        .await?;
    Ok(Json(ProjectResponse::from(&project)))
}
