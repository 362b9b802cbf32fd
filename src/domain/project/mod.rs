// Project domain module
// Job posting plus collaboration surface: role slots, pending claims,
// task board and posts

#![allow(clippy::module_inception)]

pub mod project;
pub mod roster;
pub mod value_objects;

pub use project::Project;
pub use roster::Roster;
pub use value_objects::{
    Comment, PendingDev, Post, ProjectStatus, Slot, Task, TaskStatus,
};

/// Role automatically held by the project owner
pub const LEADER_ROLE: &str = "LEADER";
