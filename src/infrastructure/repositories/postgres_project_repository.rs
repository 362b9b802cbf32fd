use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::project::{
    PendingDev, Post, Project, ProjectStatus, Slot, Task,
};
use crate::domain::repositories::{ProjectRepository, ProjectSummary};

/// PostgreSQL implementation of ProjectRepository
///
/// The roster and every nested list persist as JSONB; the project row is
/// the other half of the membership aggregate, so the fetch/persist
/// helpers are shared with the transactional store.
pub struct PostgresProjectRepository {
    pool: PgPool,
}

#[derive(FromRow)]
struct ProjectRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    description: String,
    status: String,
    members: Json<Vec<Slot>>,
    applicants: Json<Vec<PendingDev>>,
    offered: Json<Vec<PendingDev>>,
    tasks: Json<Vec<Task>>,
    posts: Json<Vec<Post>>,
    created_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self) -> Result<Project, sqlx::Error> {
        let status = ProjectStatus::parse(&self.status)
            .map_err(|e| sqlx::Error::Decode(e.into()))?;
        Ok(Project::from_persistence(
            self.id,
            self.owner_id,
            self.title,
            self.description,
            status,
            self.members.0,
            self.applicants.0,
            self.offered.0,
            self.tasks.0,
            self.posts.0,
            self.created_at,
        ))
    }
}

const SELECT_PROJECT: &str = "SELECT id, owner_id, title, description, status, members, \
     applicants, offered, tasks, posts, created_at FROM projects";

/// Fetches a project by id
pub(crate) async fn fetch_project(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Project>, sqlx::Error> {
    let row: Option<ProjectRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_PROJECT))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    row.map(ProjectRow::into_project).transpose()
}

/// Fetches a project by id, locking the row for the transaction
///
/// Multi-document transactions always take this lock before any profile
/// lock, so concurrent accepts serialize on the project row.
pub(crate) async fn fetch_project_for_update(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Project>, sqlx::Error> {
    let row: Option<ProjectRow> =
        sqlx::query_as(&format!("{} WHERE id = $1 FOR UPDATE", SELECT_PROJECT))
            .bind(id)
            .fetch_optional(conn)
            .await?;
    row.map(ProjectRow::into_project).transpose()
}

/// Upserts a project row
pub(crate) async fn persist_project(
    conn: &mut PgConnection,
    project: &Project,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO projects (
            id, owner_id, title, description, status, members, applicants,
            offered, tasks, posts, created_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         ON CONFLICT (id) DO UPDATE SET
            title = EXCLUDED.title,
            description = EXCLUDED.description,
            status = EXCLUDED.status,
            members = EXCLUDED.members,
            applicants = EXCLUDED.applicants,
            offered = EXCLUDED.offered,
            tasks = EXCLUDED.tasks,
            posts = EXCLUDED.posts",
    )
    .bind(project.id())
    .bind(project.owner())
    .bind(project.title())
    .bind(project.description())
    .bind(project.status().as_str())
    .bind(Json(project.members()))
    .bind(Json(project.applicants()))
    .bind(Json(project.offered()))
    .bind(Json(project.tasks()))
    .bind(Json(project.posts()))
    .bind(project.created_at())
    .execute(conn)
    .await?;
    Ok(())
}

#[derive(FromRow)]
struct ProjectSummaryRow {
    id: Uuid,
    title: String,
    description: String,
    members: Json<Vec<Slot>>,
}

impl PostgresProjectRepository {
    /// Creates a new PostgresProjectRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn save(&self, project: &Project) -> Result<(), String> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| format!("Failed to acquire connection: {}", e))?;
        persist_project(&mut conn, project)
            .await
            .map_err(|e| format!("Failed to save project: {}", e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, String> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| format!("Failed to acquire connection: {}", e))?;
        fetch_project(&mut conn, id)
            .await
            .map_err(|e| format!("Failed to find project: {}", e))
    }

    async fn find_active_by_owner(&self, owner: Uuid) -> Result<Option<Project>, String> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!(
            "{} WHERE owner_id = $1 AND status <> 'COMPLETE' LIMIT 1",
            SELECT_PROJECT
        ))
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to find project by owner: {}", e))?;

        row.map(ProjectRow::into_project)
            .transpose()
            .map_err(|e| format!("Failed to decode project: {}", e))
    }

    async fn find_hiring(
        &self,
        roles: &[String],
        exclude: &[Uuid],
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ProjectSummary>, String> {
        let offset = super::page_offset(page, per_page);
        let rows: Vec<ProjectSummaryRow> = sqlx::query_as(
            "SELECT id, title, description, members
             FROM projects
             WHERE status = 'HIRING'
               AND id <> ALL($2)
               AND EXISTS (
                   SELECT 1 FROM jsonb_array_elements(members) AS m
                   WHERE (m->>'vacancy')::boolean AND m->>'role' = ANY($1)
               )
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(roles)
        .bind(exclude)
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to search projects: {}", e))?;

        Ok(rows
            .into_iter()
            .map(|r| ProjectSummary {
                id: r.id,
                title: r.title,
                description: r.description,
                members: r.members.0,
            })
            .collect())
    }
}
