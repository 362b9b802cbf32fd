// Infrastructure layer module
// Contains database adapters and the transactional membership store

pub mod membership_store;
pub mod repositories;

pub use membership_store::PgMembershipStore;
