use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the staffing status of a project
///
/// # Status Transitions
/// ```text
/// Hiring <-> Full
///    |        |
///    +--------+--> Complete
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    /// At least one slot has an open vacancy
    Hiring,
    /// Every slot is filled
    Full,
    /// Closed by the owner; terminal
    Complete,
}

impl ProjectStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// `Hiring` and `Full` are derived from the roster and flip freely;
    /// `Complete` is terminal.
    pub fn can_transition_to(&self, next: ProjectStatus) -> bool {
        use ProjectStatus::*;
        matches!(
            (self, next),
            (Hiring, Full) | (Full, Hiring) | (Hiring, Complete) | (Full, Complete)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Hiring => "HIRING",
            ProjectStatus::Full => "FULL",
            ProjectStatus::Complete => "COMPLETE",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "HIRING" => Ok(ProjectStatus::Hiring),
            "FULL" => Ok(ProjectStatus::Full),
            "COMPLETE" => Ok(ProjectStatus::Complete),
            other => Err(format!("unknown project status: {}", other)),
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of one task on the board
///
/// # Status Transitions
/// ```text
/// Todo -> Doing -> Done -> Complete
///           ^--------+  (returned by the owner with a note)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
    Complete,
}

impl TaskStatus {
    /// Checks if a transition from current status to next status is valid
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Todo, Doing) | (Doing, Done) | (Done, Doing) | (Done, Complete)
        )
    }

    /// The next status on the assignee's forward path, if any
    pub fn advanced(&self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Todo => Some(TaskStatus::Doing),
            TaskStatus::Doing => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::Doing => "DOING",
            TaskStatus::Done => "DONE",
            TaskStatus::Complete => "COMPLETE",
        };
        f.write_str(s)
    }
}

/// One role position within a project's member roster
///
/// A slot starts open (`vacancy: true`, no developer) and is filled by
/// assigning a developer and clearing the vacancy flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub developer: Option<Uuid>,
    pub role: String,
    pub vacancy: bool,
}

impl Slot {
    /// Creates an open slot for a role
    pub fn open(role: impl Into<String>) -> Self {
        Self {
            developer: None,
            role: role.into(),
            vacancy: true,
        }
    }

    /// Creates a slot already filled by a developer
    pub fn filled(developer: Uuid, role: impl Into<String>) -> Self {
        Self {
            developer: Some(developer),
            role: role.into(),
            vacancy: false,
        }
    }
}

/// Project-side pending record: a developer claiming (or being offered) a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDev {
    pub developer: Uuid,
    pub role: String,
}

/// One task on the project board, owned by exactly one assignee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub developer: Uuid,
    pub title: String,
    pub description: String,
    pub note: Option<String>,
    pub status: TaskStatus,
}

/// A post on the project's collaboration board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author: Uuid,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub likes: Vec<Uuid>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

/// A comment nested under a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
