// Repository traits (ports)
// Implementations live in the infrastructure layer

pub mod profile_repository;
pub mod project_repository;
pub mod user_repository;

pub use profile_repository::{DeveloperSummary, ProfileRepository};
pub use project_repository::{ProjectRepository, ProjectSummary};
pub use user_repository::{User, UserRepository};
