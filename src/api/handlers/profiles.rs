use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::JwtAuth;
use crate::domain::profile::{
    Education, Experience, PendingClaim, Profile, ProfileDetails, ProjectRef,
};
use crate::domain::repositories::{ProfileRepository, UserRepository};
use crate::infrastructure::repositories::{PostgresProfileRepository, PostgresUserRepository};

/// Request body for creating or updating a profile
#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub github_username: Option<String>,
}

/// Full profile view, shown only to its owner
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub github_username: Option<String>,
    pub current_job: Option<Uuid>,
    pub offers: Vec<PendingClaim>,
    pub applied: Vec<PendingClaim>,
    pub projects: Vec<ProjectRef>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id(),
            skills: profile.skills().to_vec(),
            bio: profile.bio().map(String::from),
            website: profile.website().map(String::from),
            location: profile.location().map(String::from),
            github_username: profile.github_username().map(String::from),
            current_job: profile.current_job(),
            offers: profile.offers().to_vec(),
            applied: profile.applied().to_vec(),
            projects: profile.projects().to_vec(),
            experience: profile.experience().to_vec(),
            education: profile.education().to_vec(),
        }
    }
}

/// Public profile view; pending claims stay private
#[derive(Debug, Serialize)]
pub struct PublicProfileResponse {
    pub user_id: Uuid,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub github_username: Option<String>,
    pub current_job: Option<Uuid>,
    pub projects: Vec<ProjectRef>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
}

impl From<&Profile> for PublicProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id(),
            skills: profile.skills().to_vec(),
            bio: profile.bio().map(String::from),
            website: profile.website().map(String::from),
            location: profile.location().map(String::from),
            github_username: profile.github_username().map(String::from),
            current_job: profile.current_job(),
            projects: profile.projects().to_vec(),
            experience: profile.experience().to_vec(),
            education: profile.education().to_vec(),
        }
    }
}

fn details_from(req: &UpsertProfileRequest) -> ProfileDetails {
    ProfileDetails {
        bio: req.bio.clone(),
        website: req.website.clone(),
        location: req.location.clone(),
        github_username: req.github_username.clone(),
    }
}

async fn load_profile(repo: &PostgresProfileRepository, user_id: Uuid) -> Result<Profile, ApiError> {
    repo.find_by_user(user_id)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::not_found("profile not found"))
}

/// Create the caller's profile, or replace its details if one exists
///
/// POST /api/profiles
pub async fn upsert_profile(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Json(req): Json<UpsertProfileRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), ApiError> {
    let repo = PostgresProfileRepository::new(pool);

    let existing = repo
        .find_by_user(user_id)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Database error: {}", e)))?;

    let (profile, created) = match existing {
        Some(mut profile) => {
            profile.set_skills(req.skills.clone())?;
            profile.update_details(details_from(&req));
            (profile, false)
        }
        None => {
            let profile = Profile::new(user_id, req.skills.clone(), details_from(&req))?;
            (profile, true)
        }
    };

    repo.save(&profile)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to save profile: {}", e)))?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ProfileResponse::from(&profile))))
}

/// Get the caller's own profile
///
/// GET /api/profiles/me
pub async fn get_own_profile(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
) -> Result<Json<ProfileResponse>, ApiError> {
    let repo = PostgresProfileRepository::new(pool);
    let profile = load_profile(&repo, user_id).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

/// Get another user's profile
///
/// GET /api/profiles/:user_id
pub async fn get_profile(
    State(pool): State<PgPool>,
    JwtAuth(_caller): JwtAuth,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PublicProfileResponse>, ApiError> {
    let repo = PostgresProfileRepository::new(pool);
    let profile = load_profile(&repo, user_id).await?;
    Ok(Json(PublicProfileResponse::from(&profile)))
}

/// Get the caller's skill list
///
/// GET /api/profiles/me/skills
pub async fn get_own_skills(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
) -> Result<Json<Vec<String>>, ApiError> {
    let repo = PostgresProfileRepository::new(pool);
    let profile = load_profile(&repo, user_id).await?;
    Ok(Json(profile.skills().to_vec()))
}

/// Get the caller's current project membership, if any
///
/// GET /api/profiles/me/job
pub async fn get_own_job(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
) -> Result<Json<Option<ProjectRef>>, ApiError> {
    let repo = PostgresProfileRepository::new(pool);
    let profile = load_profile(&repo, user_id).await?;
    let job = profile
        .current_job()
        .and_then(|id| profile.projects().iter().find(|p| p.project_id == id))
        .cloned();
    Ok(Json(job))
}

/// Delete the caller's account
///
/// Refused while the caller is part of a project. The user record is
/// anonymized rather than removed, so project history keeps resolving.
///
/// DELETE /api/profiles
pub async fn delete_account(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
) -> Result<StatusCode, ApiError> {
    let profile_repo = PostgresProfileRepository::new(pool.clone());
    let profile = load_profile(&profile_repo, user_id).await?;

    if profile.is_employed() {
        return Err(ApiError::conflict(
            "leave your current project before deleting the account",
        ));
    }

    profile_repo
        .delete_by_user(user_id)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to delete profile: {}", e)))?;

    let user_repo = PostgresUserRepository::new(pool);
    user_repo
        .anonymize(user_id)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to anonymize user: {}", e)))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Request body for adding a work experience entry
#[derive(Debug, Deserialize)]
pub struct ExperienceRequest {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: DateTime<Utc>,
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

/// Add a work experience entry
///
/// PUT /api/profiles/experience
pub async fn add_experience(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Json(req): Json<ExperienceRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    if req.title.trim().is_empty() || req.company.trim().is_empty() {
        return Err(ApiError::bad_request("title and company are required"));
    }

    let repo = PostgresProfileRepository::new(pool);
    let mut profile = load_profile(&repo, user_id).await?;
    profile.add_experience(Experience {
        id: Uuid::new_v4(),
        title: req.title,
        company: req.company,
        location: req.location,
        from: req.from,
        to: req.to,
        current: req.current,
        description: req.description,
    });
    repo.save(&profile)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to save profile: {}", e)))?;

    Ok(Json(ProfileResponse::from(&profile)))
}

/// Remove a work experience entry
///
/// DELETE /api/profiles/experience/:id
pub async fn remove_experience(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let repo = PostgresProfileRepository::new(pool);
    let mut profile = load_profile(&repo, user_id).await?;
    profile.remove_experience(id)?;
    repo.save(&profile)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to save profile: {}", e)))?;

    Ok(Json(ProfileResponse::from(&profile)))
}

/// Request body for adding an education entry
#[derive(Debug, Deserialize)]
pub struct EducationRequest {
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub from: DateTime<Utc>,
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

/// Add an education entry
///
/// PUT /api/profiles/education
pub async fn add_education(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Json(req): Json<EducationRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    if req.school.trim().is_empty() || req.degree.trim().is_empty() {
        return Err(ApiError::bad_request("school and degree are required"));
    }

    let repo = PostgresProfileRepository::new(pool);
    let mut profile = load_profile(&repo, user_id).await?;
    profile.add_education(Education {
        id: Uuid::new_v4(),
        school: req.school,
        degree: req.degree,
        field_of_study: req.field_of_study,
        from: req.from,
        to: req.to,
        current: req.current,
        description: req.description,
    });
    repo.save(&profile)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to save profile: {}", e)))?;

    Ok(Json(ProfileResponse::from(&profile)))
}

/// Remove an education entry
///
/// DELETE /api/profiles/education/:id
pub async fn remove_education(
    State(pool): State<PgPool>,
    JwtAuth(user_id): JwtAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let repo = PostgresProfileRepository::new(pool);
    let mut profile = load_profile(&repo, user_id).await?;
    profile.remove_education(id)?;
    repo.save(&profile)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Failed to save profile: {}", e)))?;

    Ok(Json(ProfileResponse::from(&profile)))
}
