use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::profile::Profile;

/// Directory listing entry produced by developer discovery
#[derive(Debug, Clone)]
pub struct DeveloperSummary {
    pub user_id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub skills: Vec<String>,
}

/// Repository trait for the Profile aggregate
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Save a profile (insert or update)
    async fn save(&self, profile: &Profile) -> Result<(), String>;

    /// Find the profile belonging to a user
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, String>;

    /// Delete the profile belonging to a user
    async fn delete_by_user(&self, user_id: Uuid) -> Result<(), String>;

    /// Unemployed developers holding a skill, excluding the given users
    ///
    /// Pages are 1-based with a fixed page size.
    async fn find_available(
        &self,
        role: &str,
        exclude: &[Uuid],
        page: u32,
        per_page: u32,
    ) -> Result<Vec<DeveloperSummary>, String>;
}
