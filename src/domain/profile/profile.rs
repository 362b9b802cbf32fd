use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::value_objects::{Education, Experience, PendingClaim, ProjectRef};
use crate::domain::error::{DomainError, DomainResult};

/// Profile aggregate root
///
/// The developer half of the membership aggregate. One-to-one with a user.
///
/// # Invariants
/// - `skills` is never empty
/// - `current_job` is set iff the developer occupies a filled slot in that project
/// - `offers` and `applied` are empty whenever `current_job` is set
/// - `projects` is an append-only history, most-recent-first
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    id: Uuid,
    user_id: Uuid,
    skills: Vec<String>,
    bio: Option<String>,
    website: Option<String>,
    location: Option<String>,
    github_username: Option<String>,
    current_job: Option<Uuid>,
    offers: Vec<PendingClaim>,
    applied: Vec<PendingClaim>,
    projects: Vec<ProjectRef>,
    experience: Vec<Experience>,
    education: Vec<Education>,
    created_at: DateTime<Utc>,
}

/// Mutable profile details outside the membership state
#[derive(Debug, Clone, Default)]
pub struct ProfileDetails {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub github_username: Option<String>,
}

impl Profile {
    /// Creates a new Profile for a user
    ///
    /// # Business Rules Enforced
    /// - At least one skill is required
    /// - A fresh profile is unemployed with no pending claims
    pub fn new(user_id: Uuid, skills: Vec<String>, details: ProfileDetails) -> DomainResult<Self> {
        let skills: Vec<String> = skills
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if skills.is_empty() {
            return Err(DomainError::conflict("at least one skill is required"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            skills,
            bio: details.bio,
            website: details.website,
            location: details.location,
            github_username: details.github_username,
            current_job: None,
            offers: Vec::new(),
            applied: Vec::new(),
            projects: Vec::new(),
            experience: Vec::new(),
            education: Vec::new(),
            created_at: Utc::now(),
        })
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn github_username(&self) -> Option<&str> {
        self.github_username.as_deref()
    }

    pub fn current_job(&self) -> Option<Uuid> {
        self.current_job
    }

    pub fn offers(&self) -> &[PendingClaim] {
        &self.offers
    }

    pub fn applied(&self) -> &[PendingClaim] {
        &self.applied
    }

    pub fn projects(&self) -> &[ProjectRef] {
        &self.projects
    }

    pub fn experience(&self) -> &[Experience] {
        &self.experience
    }

    pub fn education(&self) -> &[Education] {
        &self.education
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the developer currently occupies a filled slot somewhere
    pub fn is_employed(&self) -> bool {
        self.current_job.is_some()
    }

    /// Whether the developer lists the given role among their skills
    pub fn has_skill(&self, role: &str) -> bool {
        self.skills.iter().any(|s| s == role)
    }

    /// The pending offer for a project, if any
    pub fn offer_for(&self, project_id: Uuid) -> Option<&PendingClaim> {
        self.offers.iter().find(|o| o.project_id == project_id)
    }

    /// The pending application for a project, if any
    pub fn application_for(&self, project_id: Uuid) -> Option<&PendingClaim> {
        self.applied.iter().find(|a| a.project_id == project_id)
    }

    // ===== Membership transitions (driven by the engine) =====

    /// Records a pending offer from a project
    pub fn push_offer(&mut self, claim: PendingClaim) {
        self.offers.push(claim);
    }

    /// Records a pending application to a project
    pub fn push_application(&mut self, claim: PendingClaim) {
        self.applied.push(claim);
    }

    /// Removes the pending offer for a project; returns whether one existed
    pub fn retract_offer(&mut self, project_id: Uuid) -> bool {
        let before = self.offers.len();
        self.offers.retain(|o| o.project_id != project_id);
        self.offers.len() < before
    }

    /// Removes the pending application for a project; returns whether one existed
    pub fn retract_application(&mut self, project_id: Uuid) -> bool {
        let before = self.applied.len();
        self.applied.retain(|a| a.project_id != project_id);
        self.applied.len() < before
    }

    /// Takes up a filled slot in a project
    ///
    /// Sets `current_job`, purges every other pending offer and application
    /// and pushes a history entry, most-recent-first.
    pub fn start_job(&mut self, project_id: Uuid, title: &str, role: &str) -> DomainResult<()> {
        if self.current_job.is_some() {
            return Err(DomainError::conflict("already employed"));
        }

        self.current_job = Some(project_id);
        self.offers.clear();
        self.applied.clear();
        self.projects.insert(
            0,
            ProjectRef {
                project_id,
                title: title.to_string(),
                role: role.to_string(),
            },
        );
        Ok(())
    }

    /// Leaves the current job, dropping the matching history entry
    ///
    /// History removal is keyed by project id; employment in any other
    /// project is untouched.
    pub fn end_job(&mut self, project_id: Uuid) -> DomainResult<()> {
        if self.current_job != Some(project_id) {
            return Err(DomainError::conflict("not employed in this project"));
        }
        self.current_job = None;
        if let Some(idx) = self.projects.iter().position(|p| p.project_id == project_id) {
            self.projects.remove(idx);
        }
        Ok(())
    }

    /// Clears `current_job` when a project completes
    ///
    /// Unlike [`end_job`](Self::end_job) the history entry is kept.
    pub fn release_job(&mut self, project_id: Uuid) {
        if self.current_job == Some(project_id) {
            self.current_job = None;
        }
    }

    // ===== Profile CRUD =====

    /// Replaces the skill set; rejects an empty result
    pub fn set_skills(&mut self, skills: Vec<String>) -> DomainResult<()> {
        let skills: Vec<String> = skills
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if skills.is_empty() {
            return Err(DomainError::conflict("at least one skill is required"));
        }
        self.skills = skills;
        Ok(())
    }

    /// Updates the free-form profile details
    pub fn update_details(&mut self, details: ProfileDetails) {
        self.bio = details.bio;
        self.website = details.website;
        self.location = details.location;
        self.github_username = details.github_username;
    }

    /// Adds a work experience entry, most-recent-first
    pub fn add_experience(&mut self, experience: Experience) {
        self.experience.insert(0, experience);
    }

    /// Removes a work experience entry by id
    pub fn remove_experience(&mut self, id: Uuid) -> DomainResult<()> {
        let before = self.experience.len();
        self.experience.retain(|e| e.id != id);
        if self.experience.len() == before {
            return Err(DomainError::not_found("experience entry"));
        }
        Ok(())
    }

    /// Adds an education entry, most-recent-first
    pub fn add_education(&mut self, education: Education) {
        self.education.insert(0, education);
    }

    /// Removes an education entry by id
    pub fn remove_education(&mut self, id: Uuid) -> DomainResult<()> {
        let before = self.education.len();
        self.education.retain(|e| e.id != id);
        if self.education.len() == before {
            return Err(DomainError::not_found("education entry"));
        }
        Ok(())
    }

    /// Reconstructs a Profile from persistence layer data
    ///
    /// Bypasses business rules validation since the data was validated
    /// before it was stored.
    ///
    /// # Note
    /// Only to be used by repository implementations for data reconstruction.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        user_id: Uuid,
        skills: Vec<String>,
        bio: Option<String>,
        website: Option<String>,
        location: Option<String>,
        github_username: Option<String>,
        current_job: Option<Uuid>,
        offers: Vec<PendingClaim>,
        applied: Vec<PendingClaim>,
        projects: Vec<ProjectRef>,
        experience: Vec<Experience>,
        education: Vec<Education>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            skills,
            bio,
            website,
            location,
            github_username,
            current_job,
            offers,
            applied,
            projects,
            experience,
            education,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_skills(skills: &[&str]) -> Profile {
        Profile::new(
            Uuid::new_v4(),
            skills.iter().map(|s| s.to_string()).collect(),
            ProfileDetails::default(),
        )
        .unwrap()
    }

    #[test]
    fn create_profile_requires_skills() {
        let result = Profile::new(Uuid::new_v4(), vec![], ProfileDetails::default());
        assert!(result.is_err());

        let result = Profile::new(
            Uuid::new_v4(),
            vec!["  ".to_string()],
            ProfileDetails::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn create_profile_trims_skills() {
        let profile = profile_with_skills(&[" backend ", "design"]);
        assert_eq!(profile.skills(), &["backend", "design"]);
        assert!(profile.has_skill("backend"));
        assert!(!profile.has_skill("frontend"));
    }

    #[test]
    fn start_job_purges_pending_claims() {
        let mut profile = profile_with_skills(&["backend"]);
        let job = Uuid::new_v4();
        let other = Uuid::new_v4();
        profile.push_offer(PendingClaim {
            project_id: job,
            role: "backend".to_string(),
        });
        profile.push_application(PendingClaim {
            project_id: other,
            role: "backend".to_string(),
        });

        profile.start_job(job, "proj", "backend").unwrap();

        assert_eq!(profile.current_job(), Some(job));
        assert!(profile.offers().is_empty());
        assert!(profile.applied().is_empty());
        assert_eq!(profile.projects()[0].project_id, job);
    }

    #[test]
    fn start_job_while_employed_fails() {
        let mut profile = profile_with_skills(&["backend"]);
        profile.start_job(Uuid::new_v4(), "a", "backend").unwrap();

        let result = profile.start_job(Uuid::new_v4(), "b", "backend");
        assert_eq!(result, Err(DomainError::conflict("already employed")));
    }

    #[test]
    fn end_job_removes_history_entry() {
        let mut profile = profile_with_skills(&["backend"]);
        let job = Uuid::new_v4();
        profile.start_job(job, "proj", "backend").unwrap();

        profile.end_job(job).unwrap();

        assert_eq!(profile.current_job(), None);
        assert!(profile.projects().is_empty());
    }

    #[test]
    fn end_job_for_wrong_project_fails() {
        let mut profile = profile_with_skills(&["backend"]);
        profile.start_job(Uuid::new_v4(), "proj", "backend").unwrap();

        assert!(profile.end_job(Uuid::new_v4()).is_err());
    }

    #[test]
    fn release_job_keeps_history() {
        let mut profile = profile_with_skills(&["backend"]);
        let job = Uuid::new_v4();
        profile.start_job(job, "proj", "backend").unwrap();

        profile.release_job(job);

        assert_eq!(profile.current_job(), None);
        assert_eq!(profile.projects().len(), 1);
    }

    #[test]
    fn retract_reports_whether_claim_existed() {
        let mut profile = profile_with_skills(&["backend"]);
        let project = Uuid::new_v4();
        profile.push_offer(PendingClaim {
            project_id: project,
            role: "backend".to_string(),
        });

        assert!(profile.retract_offer(project));
        assert!(!profile.retract_offer(project));
        assert!(!profile.retract_application(project));
    }
}
