use uuid::Uuid;

use crate::domain::profile::Profile;
use crate::domain::project::{Project, ProjectStatus};

/// Named state of one (developer, project, role) relationship
///
/// Replaces scattered "is this id in list X" checks with an explicit
/// transition table, derived from the pending lists and the roster.
///
/// # State Transitions
/// ```text
/// Open -> Applied | Offered -> Filled -> Open (vacated)
///           |          |          `----> Closed (project completed)
///           `----------+---> Open (rejected / withdrawn / cascaded)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimState {
    /// No claim between the developer and the role
    Open,
    /// The developer has a pending application
    Applied,
    /// The project has a pending offer out to the developer
    Offered,
    /// The developer occupies a filled slot
    Filled,
    /// The project has completed; terminal
    Closed,
}

impl ClaimState {
    /// Checks if a transition from current state to next state is valid
    pub fn can_transition_to(&self, next: ClaimState) -> bool {
        use ClaimState::*;
        matches!(
            (self, next),
            (Open, Applied)
                | (Open, Offered)
                | (Applied, Filled)
                | (Offered, Filled)
                | (Applied, Open)
                | (Offered, Open)
                | (Filled, Open)
                | (Filled, Closed)
        )
    }

    /// Classifies the current relationship between a developer and a project
    ///
    /// Both halves of the aggregate are consulted; a claim recorded on either
    /// side counts, so a half-removed record is still visible to the guard.
    pub fn of(profile: &Profile, project: &Project) -> ClaimState {
        let developer = profile.user_id();
        if project.roster().is_member(developer) {
            return if project.status() == ProjectStatus::Complete {
                ClaimState::Closed
            } else {
                ClaimState::Filled
            };
        }
        if Self::has_application(profile, project, developer) {
            return ClaimState::Applied;
        }
        if Self::has_offer(profile, project, developer) {
            return ClaimState::Offered;
        }
        ClaimState::Open
    }

    fn has_application(profile: &Profile, project: &Project, developer: Uuid) -> bool {
        profile.application_for(project.id()).is_some() || project.applicant_for(developer).is_some()
    }

    fn has_offer(profile: &Profile, project: &Project, developer: Uuid) -> bool {
        profile.offer_for(project.id()).is_some() || project.offered_for(developer).is_some()
    }
}
