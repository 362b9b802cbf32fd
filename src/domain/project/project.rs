use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::roster::Roster;
use super::value_objects::{Comment, PendingDev, Post, ProjectStatus, Slot, Task, TaskStatus};
use super::LEADER_ROLE;
use crate::domain::error::{DomainError, DomainResult};

/// Project aggregate root
///
/// A job posting plus a lightweight collaboration surface. The project half
/// of the membership aggregate; its counterpart is the
/// [`Profile`](crate::domain::profile::Profile) of each developer involved.
///
/// # Invariants
/// - The owner holds a filled `LEADER` slot and is immutable after creation
/// - `status` is `Full` exactly when no slot has an open vacancy
/// - A developer appears at most once in `applicants` + `offered`
/// - Tasks reference filled members only
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    id: Uuid,
    owner: Uuid,
    title: String,
    description: String,
    status: ProjectStatus,
    members: Vec<Slot>,
    applicants: Vec<PendingDev>,
    offered: Vec<PendingDev>,
    tasks: Vec<Task>,
    posts: Vec<Post>,
    created_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new Project with open slots for the given roles
    ///
    /// # Business Rules Enforced
    /// - Title and description must not be empty
    /// - At least one role is required
    /// - The owner is auto-assigned a filled `LEADER` slot
    /// - Initial status is always `Hiring`
    pub fn new(
        owner: Uuid,
        title: String,
        description: String,
        roles: Vec<String>,
    ) -> DomainResult<Self> {
        if title.trim().is_empty() {
            return Err(DomainError::conflict("title is required"));
        }
        if description.trim().is_empty() {
            return Err(DomainError::conflict("description is required"));
        }
        let roles: Vec<String> = roles
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if roles.is_empty() {
            return Err(DomainError::conflict("at least one role is required"));
        }

        let mut members = vec![Slot::filled(owner, LEADER_ROLE)];
        members.extend(roles.into_iter().map(Slot::open));

        Ok(Self {
            id: Uuid::new_v4(),
            owner,
            title,
            description,
            status: ProjectStatus::Hiring,
            members,
            applicants: Vec::new(),
            offered: Vec::new(),
            tasks: Vec::new(),
            posts: Vec::new(),
            created_at: Utc::now(),
        })
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub fn members(&self) -> &[Slot] {
        &self.members
    }

    pub fn applicants(&self) -> &[PendingDev] {
        &self.applicants
    }

    pub fn offered(&self) -> &[PendingDev] {
        &self.offered
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Vacancy queries over the member roster
    pub fn roster(&self) -> Roster<'_> {
        Roster::new(&self.members)
    }

    /// Whether the user is the owner or holds a filled slot
    pub fn is_participant(&self, user: Uuid) -> bool {
        self.owner == user || self.roster().is_member(user)
    }

    /// The pending application of a developer, if any
    pub fn applicant_for(&self, developer: Uuid) -> Option<&PendingDev> {
        self.applicants.iter().find(|a| a.developer == developer)
    }

    /// The pending offer made to a developer, if any
    pub fn offered_for(&self, developer: Uuid) -> Option<&PendingDev> {
        self.offered.iter().find(|o| o.developer == developer)
    }

    // ===== Membership transitions (driven by the engine) =====

    pub fn push_applicant(&mut self, pending: PendingDev) {
        self.applicants.push(pending);
    }

    pub fn push_offered(&mut self, pending: PendingDev) {
        self.offered.push(pending);
    }

    /// Removes a developer's pending application; returns whether one existed
    pub fn retract_applicant(&mut self, developer: Uuid) -> bool {
        let before = self.applicants.len();
        self.applicants.retain(|a| a.developer != developer);
        self.applicants.len() < before
    }

    /// Removes a pending offer to a developer; returns whether one existed
    pub fn retract_offered(&mut self, developer: Uuid) -> bool {
        let before = self.offered.len();
        self.offered.retain(|o| o.developer != developer);
        self.offered.len() < before
    }

    /// Fills the first open slot for a role with a developer
    pub fn fill_slot(&mut self, role: &str, developer: Uuid) -> DomainResult<()> {
        let idx = self
            .roster()
            .first_open_slot(role)
            .ok_or_else(|| DomainError::conflict("no more vacancies left"))?;
        self.members[idx] = Slot::filled(developer, role);
        Ok(())
    }

    /// Clears a developer's filled slot back to an open vacancy
    ///
    /// Returns the vacated role.
    pub fn vacate_slot(&mut self, developer: Uuid) -> DomainResult<String> {
        let idx = self
            .roster()
            .filled_slot_of(developer)
            .ok_or_else(|| DomainError::not_found("membership"))?;
        let role = self.members[idx].role.clone();
        self.members[idx] = Slot::open(role.clone());
        Ok(role)
    }

    /// Appends a new open slot for a role
    pub fn add_open_role(&mut self, role: &str) -> DomainResult<()> {
        if self.status == ProjectStatus::Complete {
            return Err(DomainError::conflict("project is complete"));
        }
        let role = role.trim();
        if role.is_empty() {
            return Err(DomainError::conflict("role is required"));
        }
        self.members.push(Slot::open(role));
        self.recompute_status();
        Ok(())
    }

    /// Re-derives `status` from the roster
    ///
    /// `Full` exactly when no slot has an open vacancy; `Complete` is terminal.
    pub fn recompute_status(&mut self) {
        if self.status == ProjectStatus::Complete {
            return;
        }
        self.status = if self.roster().is_fully_staffed() {
            ProjectStatus::Full
        } else {
            ProjectStatus::Hiring
        };
    }

    /// Closes the project
    ///
    /// Vacates every filled non-leader slot, empties tasks and posts and
    /// moves the status to `Complete`. Returns the ids of the evicted
    /// developers so their profiles can be released in the same transaction.
    pub fn close(&mut self) -> Vec<Uuid> {
        let evicted: Vec<Uuid> = self
            .members
            .iter()
            .filter(|s| !s.vacancy && s.developer != Some(self.owner))
            .filter_map(|s| s.developer)
            .collect();

        for slot in &mut self.members {
            if !slot.vacancy && slot.developer != Some(self.owner) {
                *slot = Slot::open(slot.role.clone());
            }
        }
        self.tasks.clear();
        self.posts.clear();
        self.applicants.clear();
        self.offered.clear();
        self.status = ProjectStatus::Complete;
        evicted
    }

    /// Drops every task assigned to a developer
    pub fn strip_tasks_of(&mut self, developer: Uuid) {
        self.tasks.retain(|t| t.developer != developer);
    }

    // ===== Task board =====

    /// Creates a task assigned to a filled member
    ///
    /// Only the owner creates tasks; the assignee must hold a filled slot.
    pub fn add_task(
        &mut self,
        caller: Uuid,
        developer: Uuid,
        title: String,
        description: String,
    ) -> DomainResult<Uuid> {
        if caller != self.owner {
            return Err(DomainError::unauthorized(
                "only the project owner can create tasks",
            ));
        }
        if self.status == ProjectStatus::Complete {
            return Err(DomainError::conflict("project is complete"));
        }
        if !self.roster().is_member(developer) {
            return Err(DomainError::conflict("assignee is not a project member"));
        }
        if title.trim().is_empty() {
            return Err(DomainError::conflict("title is required"));
        }
        if description.trim().is_empty() {
            return Err(DomainError::conflict("description is required"));
        }

        let task = Task {
            id: Uuid::new_v4(),
            developer,
            title,
            description,
            note: None,
            status: TaskStatus::Todo,
        };
        let id = task.id;
        self.tasks.push(task);
        Ok(id)
    }

    /// Advances a task along `Todo -> Doing -> Done`
    ///
    /// Only the assignee may advance their own task.
    pub fn advance_task(&mut self, caller: Uuid, task_id: Uuid) -> DomainResult<TaskStatus> {
        let task = self.task_mut(task_id)?;
        if task.developer != caller {
            return Err(DomainError::unauthorized(
                "only the assignee can advance a task",
            ));
        }
        let next = task
            .status
            .advanced()
            .ok_or_else(|| DomainError::conflict(format!("task cannot advance from {}", task.status)))?;
        task.status = next;
        Ok(next)
    }

    /// Returns a `Done` task to `Doing`, recording the owner's note
    pub fn return_task(&mut self, caller: Uuid, task_id: Uuid, note: String) -> DomainResult<()> {
        if caller != self.owner {
            return Err(DomainError::unauthorized(
                "only the project owner can return a task",
            ));
        }
        let task = self.task_mut(task_id)?;
        if !task.status.can_transition_to(TaskStatus::Doing) || task.status != TaskStatus::Done {
            return Err(DomainError::conflict(format!(
                "task cannot be returned from {}",
                task.status
            )));
        }
        task.status = TaskStatus::Doing;
        task.note = Some(note);
        Ok(())
    }

    /// Closes a `Done` task as `Complete`
    pub fn close_task(&mut self, caller: Uuid, task_id: Uuid) -> DomainResult<()> {
        if caller != self.owner {
            return Err(DomainError::unauthorized(
                "only the project owner can close a task",
            ));
        }
        let task = self.task_mut(task_id)?;
        if !task.status.can_transition_to(TaskStatus::Complete) {
            return Err(DomainError::conflict(format!(
                "task cannot be closed from {}",
                task.status
            )));
        }
        task.status = TaskStatus::Complete;
        Ok(())
    }

    fn task_mut(&mut self, task_id: Uuid) -> DomainResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| DomainError::not_found("task"))
    }

    // ===== Posts =====

    /// Creates a post, most-recent-first
    pub fn add_post(&mut self, author: Uuid, title: String, text: String) -> DomainResult<Uuid> {
        if !self.is_participant(author) {
            return Err(DomainError::unauthorized("user not part of project"));
        }
        if title.trim().is_empty() || text.trim().is_empty() {
            return Err(DomainError::conflict("title and text are required"));
        }

        let post = Post {
            id: Uuid::new_v4(),
            author,
            title,
            text,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        };
        let id = post.id;
        self.posts.insert(0, post);
        Ok(id)
    }

    pub fn post(&self, post_id: Uuid) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    /// Fetches a post on behalf of a caller; the board is members-only
    pub fn board_post(&self, caller: Uuid, post_id: Uuid) -> DomainResult<&Post> {
        if !self.is_participant(caller) {
            return Err(DomainError::unauthorized("user not part of project"));
        }
        self.post(post_id)
            .ok_or_else(|| DomainError::not_found("post"))
    }

    /// Deletes a post; author only
    pub fn remove_post(&mut self, caller: Uuid, post_id: Uuid) -> DomainResult<()> {
        let post = self
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .ok_or_else(|| DomainError::not_found("post"))?;
        if post.author != caller {
            return Err(DomainError::unauthorized("user not authorised"));
        }
        self.posts.retain(|p| p.id != post_id);
        Ok(())
    }

    /// Likes a post; one like per user
    pub fn like_post(&mut self, caller: Uuid, post_id: Uuid) -> DomainResult<()> {
        if !self.is_participant(caller) {
            return Err(DomainError::unauthorized("user not part of project"));
        }
        let post = self.post_mut(post_id)?;
        if post.likes.contains(&caller) {
            return Err(DomainError::conflict("post already liked"));
        }
        post.likes.push(caller);
        Ok(())
    }

    /// Removes the caller's like from a post
    pub fn unlike_post(&mut self, caller: Uuid, post_id: Uuid) -> DomainResult<()> {
        if !self.is_participant(caller) {
            return Err(DomainError::unauthorized("user not part of project"));
        }
        let post = self.post_mut(post_id)?;
        let before = post.likes.len();
        post.likes.retain(|u| *u != caller);
        if post.likes.len() == before {
            return Err(DomainError::conflict("post has not yet been liked"));
        }
        Ok(())
    }

    /// Comments on a post
    pub fn add_comment(&mut self, author: Uuid, post_id: Uuid, text: String) -> DomainResult<Uuid> {
        if !self.is_participant(author) {
            return Err(DomainError::unauthorized("user not part of project"));
        }
        if text.trim().is_empty() {
            return Err(DomainError::conflict("text is required"));
        }
        let post = self.post_mut(post_id)?;
        let comment = Comment {
            id: Uuid::new_v4(),
            author,
            text,
            created_at: Utc::now(),
        };
        let id = comment.id;
        post.comments.push(comment);
        Ok(id)
    }

    /// Deletes a comment; comment author only
    pub fn remove_comment(
        &mut self,
        caller: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> DomainResult<()> {
        let post = self.post_mut(post_id)?;
        let comment = post
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| DomainError::not_found("comment"))?;
        if comment.author != caller {
            return Err(DomainError::unauthorized("user not authorised"));
        }
        post.comments.retain(|c| c.id != comment_id);
        Ok(())
    }

    fn post_mut(&mut self, post_id: Uuid) -> DomainResult<&mut Post> {
        self.posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| DomainError::not_found("post"))
    }

    /// Reconstructs a Project from persistence layer data
    ///
    /// Bypasses business rules validation since the data was validated
    /// before it was stored.
    ///
    /// # Note
    /// Only to be used by repository implementations for data reconstruction.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: Uuid,
        owner: Uuid,
        title: String,
        description: String,
        status: ProjectStatus,
        members: Vec<Slot>,
        applicants: Vec<PendingDev>,
        offered: Vec<PendingDev>,
        tasks: Vec<Task>,
        posts: Vec<Post>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            title,
            description,
            status,
            members,
            applicants,
            offered,
            tasks,
            posts,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(owner: Uuid, roles: &[&str]) -> Project {
        Project::new(
            owner,
            "Test project".to_string(),
            "Build a thing".to_string(),
            roles.iter().map(|r| r.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn create_project_assigns_leader_slot() {
        let owner = Uuid::new_v4();
        let project = project(owner, &["backend", "design"]);

        assert_eq!(project.status(), ProjectStatus::Hiring);
        assert_eq!(project.members().len(), 3);
        assert_eq!(project.members()[0], Slot::filled(owner, "LEADER"));
        assert!(project.is_participant(owner));
    }

    #[test]
    fn create_project_requires_roles() {
        let result = Project::new(
            Uuid::new_v4(),
            "t".to_string(),
            "d".to_string(),
            vec![" ".to_string()],
        );
        assert!(result.is_err());
    }

    #[test]
    fn fill_last_slot_makes_project_full() {
        let mut project = project(Uuid::new_v4(), &["backend"]);
        project.fill_slot("backend", Uuid::new_v4()).unwrap();
        project.recompute_status();

        assert_eq!(project.status(), ProjectStatus::Full);
        assert!(project.fill_slot("backend", Uuid::new_v4()).is_err());
    }

    #[test]
    fn add_role_reopens_full_project() {
        let mut project = project(Uuid::new_v4(), &["backend"]);
        project.fill_slot("backend", Uuid::new_v4()).unwrap();
        project.recompute_status();
        assert_eq!(project.status(), ProjectStatus::Full);

        project.add_open_role("design").unwrap();
        assert_eq!(project.status(), ProjectStatus::Hiring);
    }

    #[test]
    fn vacate_slot_reopens_vacancy() {
        let dev = Uuid::new_v4();
        let mut project = project(Uuid::new_v4(), &["backend"]);
        project.fill_slot("backend", dev).unwrap();

        let role = project.vacate_slot(dev).unwrap();
        assert_eq!(role, "backend");
        assert!(project.roster().has_vacancy("backend"));
        assert!(project.vacate_slot(dev).is_err());
    }

    #[test]
    fn close_evicts_non_leader_members() {
        let owner = Uuid::new_v4();
        let dev = Uuid::new_v4();
        let mut project = project(owner, &["backend"]);
        project.fill_slot("backend", dev).unwrap();
        project
            .add_task(owner, dev, "t".to_string(), "d".to_string())
            .unwrap();
        project
            .add_post(owner, "p".to_string(), "text".to_string())
            .unwrap();

        let evicted = project.close();

        assert_eq!(evicted, vec![dev]);
        assert_eq!(project.status(), ProjectStatus::Complete);
        assert!(project.tasks().is_empty());
        assert!(project.posts().is_empty());
        // Leader slot survives as a historical record
        assert_eq!(project.members()[0].developer, Some(owner));
    }

    #[test]
    fn task_lifecycle_with_return_edge() {
        let owner = Uuid::new_v4();
        let dev = Uuid::new_v4();
        let mut project = project(owner, &["backend"]);
        project.fill_slot("backend", dev).unwrap();

        let task_id = project
            .add_task(owner, dev, "api".to_string(), "write it".to_string())
            .unwrap();

        // Only the assignee advances
        assert!(project.advance_task(owner, task_id).is_err());
        assert_eq!(project.advance_task(dev, task_id).unwrap(), TaskStatus::Doing);
        assert_eq!(project.advance_task(dev, task_id).unwrap(), TaskStatus::Done);
        assert!(project.advance_task(dev, task_id).is_err());

        // Only the owner returns, with a note
        assert!(project.return_task(dev, task_id, "redo".to_string()).is_err());
        project.return_task(owner, task_id, "redo".to_string()).unwrap();
        assert_eq!(project.tasks()[0].status, TaskStatus::Doing);
        assert_eq!(project.tasks()[0].note.as_deref(), Some("redo"));

        project.advance_task(dev, task_id).unwrap();
        project.close_task(owner, task_id).unwrap();
        assert_eq!(project.tasks()[0].status, TaskStatus::Complete);
    }

    #[test]
    fn task_assignee_must_be_member() {
        let owner = Uuid::new_v4();
        let mut project = project(owner, &["backend"]);

        let result = project.add_task(owner, Uuid::new_v4(), "t".to_string(), "d".to_string());
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[test]
    fn post_and_comment_authorization() {
        let owner = Uuid::new_v4();
        let dev = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let mut project = project(owner, &["backend"]);
        project.fill_slot("backend", dev).unwrap();

        assert!(project
            .add_post(outsider, "x".to_string(), "y".to_string())
            .is_err());

        let post_id = project
            .add_post(dev, "standup".to_string(), "notes".to_string())
            .unwrap();
        let comment_id = project
            .add_comment(owner, post_id, "ack".to_string())
            .unwrap();

        // Only authors delete their content
        assert!(project.remove_comment(dev, post_id, comment_id).is_err());
        project.remove_comment(owner, post_id, comment_id).unwrap();
        assert!(project.remove_post(owner, post_id).is_err());
        project.remove_post(dev, post_id).unwrap();
    }

    #[test]
    fn like_is_idempotent_per_user() {
        let owner = Uuid::new_v4();
        let mut project = project(owner, &["backend"]);
        let post_id = project
            .add_post(owner, "t".to_string(), "x".to_string())
            .unwrap();

        project.like_post(owner, post_id).unwrap();
        assert!(project.like_post(owner, post_id).is_err());
        project.unlike_post(owner, post_id).unwrap();
        assert!(project.unlike_post(owner, post_id).is_err());
    }

    #[test]
    fn board_is_members_only() {
        let owner = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let mut project = project(owner, &["backend"]);
        let post_id = project
            .add_post(owner, "standup".to_string(), "notes".to_string())
            .unwrap();

        let err = project.board_post(outsider, post_id).unwrap_err();
        assert_eq!(err, DomainError::unauthorized("user not part of project"));
        assert_eq!(project.board_post(owner, post_id).unwrap().id, post_id);

        // Reads and like removal are gated the same way as likes
        project.like_post(owner, post_id).unwrap();
        let err = project.unlike_post(outsider, post_id).unwrap_err();
        assert_eq!(err, DomainError::unauthorized("user not part of project"));
    }
}
