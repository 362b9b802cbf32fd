// Membership domain module
// The state machine mediating every Profile <-> Project transition

pub mod engine;
pub mod state;

pub use engine::{AcceptOutcome, ClaimKind, DisplacedClaim};
pub use state::ClaimState;
