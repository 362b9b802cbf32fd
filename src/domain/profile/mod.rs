// Profile domain module
// Developer half of the membership aggregate: pending claims,
// employment state and project history

#![allow(clippy::module_inception)]

pub mod profile;
pub mod value_objects;

pub use profile::{Profile, ProfileDetails};
pub use value_objects::{Education, Experience, PendingClaim, ProjectRef};
