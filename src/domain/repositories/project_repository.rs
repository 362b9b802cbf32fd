use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::project::{Project, Slot};

/// Directory listing entry produced by project discovery
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub members: Vec<Slot>,
}

/// Repository trait for the Project aggregate
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Save a project (insert or update)
    async fn save(&self, project: &Project) -> Result<(), String>;

    /// Find a project by its ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, String>;

    /// Find the owner's project that is not yet complete, if any
    async fn find_active_by_owner(&self, owner: Uuid) -> Result<Option<Project>, String>;

    /// Hiring projects with an open slot in one of the given roles,
    /// excluding the given project ids
    ///
    /// Pages are 1-based with a fixed page size.
    async fn find_hiring(
        &self,
        roles: &[String],
        exclude: &[Uuid],
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ProjectSummary>, String>;
}
