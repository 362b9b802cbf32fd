// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of infrastructure concerns

pub mod error;
pub mod membership;
pub mod profile;
pub mod project;
pub mod repositories;
pub mod user;

pub use error::{DomainError, DomainResult};
