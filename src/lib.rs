//! DevCrew API Library
//!
//! This library provides the core functionality for the DevCrew API,
//! a project-membership service matching developers to project role
//! slots through an apply/offer/accept workflow. It exposes the domain
//! logic, repositories, and infrastructure components.

pub mod api;
pub mod auth;
pub mod domain;
pub mod infrastructure;
