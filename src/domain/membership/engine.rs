//! Membership state machine transitions
//!
//! Pure functions over in-memory [`Profile`] and [`Project`] aggregates.
//! Each operation validates every precondition before the first mutation,
//! so a returned error means neither aggregate changed. Persistence and
//! atomicity are the transactional store's concern; operations touching
//! more than the two primary documents report the extra work through
//! [`AcceptOutcome::displaced`].

use uuid::Uuid;

use super::state::ClaimState;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::profile::{PendingClaim, Profile};
use crate::domain::project::{PendingDev, Project, ProjectStatus};

/// Which pending list a displaced claim was removed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKind {
    Application,
    Offer,
}

/// A peer claim rejected by the cascade when a role's last vacancy filled
///
/// The project-side record is already removed; the named developer's
/// profile still holds the matching entry and must be updated in the
/// same transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplacedClaim {
    pub developer: Uuid,
    pub kind: ClaimKind,
}

/// Result of a successful accept transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptOutcome {
    /// The role the developer was hired into
    pub role: String,
    /// Peer profiles needing a same-transaction cleanup
    pub displaced: Vec<DisplacedClaim>,
}

/// Applies a developer to an open role
///
/// # Preconditions
/// - Project is hiring and the role has an open vacancy
/// - Developer is unemployed, holds the skill, and is not the owner
/// - No existing claim between the pair (in either direction)
pub fn apply(profile: &mut Profile, project: &mut Project, role: &str) -> DomainResult<()> {
    if project.status() != ProjectStatus::Hiring {
        return Err(DomainError::conflict("project is not hiring"));
    }
    if profile.user_id() == project.owner() {
        return Err(DomainError::conflict("owner cannot apply to their own project"));
    }
    if profile.is_employed() {
        return Err(DomainError::conflict("already employed"));
    }
    if !profile.has_skill(role) {
        return Err(DomainError::conflict("developer does not have this skill"));
    }
    ensure_open_vacancy(project, role)?;
    ensure_no_claim(profile, project, ClaimState::Applied)?;

    profile.push_application(PendingClaim {
        project_id: project.id(),
        role: role.to_string(),
    });
    project.push_applicant(PendingDev {
        developer: profile.user_id(),
        role: role.to_string(),
    });
    Ok(())
}

/// Offers a role to a developer on behalf of the project owner
///
/// Symmetric to [`apply`]; additionally requires the caller to own the
/// project.
pub fn offer(
    owner_id: Uuid,
    profile: &mut Profile,
    project: &mut Project,
    role: &str,
) -> DomainResult<()> {
    ensure_owner(owner_id, project)?;
    if profile.user_id() == owner_id {
        return Err(DomainError::conflict("owner cannot be offered a role"));
    }
    if project.status() != ProjectStatus::Hiring {
        return Err(DomainError::conflict("project is not hiring"));
    }
    if profile.is_employed() {
        return Err(DomainError::conflict("developer is already employed"));
    }
    if !profile.has_skill(role) {
        return Err(DomainError::conflict("developer does not have this skill"));
    }
    ensure_open_vacancy(project, role)?;
    ensure_no_claim(profile, project, ClaimState::Offered)?;

    profile.push_offer(PendingClaim {
        project_id: project.id(),
        role: role.to_string(),
    });
    project.push_offered(PendingDev {
        developer: profile.user_id(),
        role: role.to_string(),
    });
    Ok(())
}

/// Accepts a pending offer: the compound `Offered -> Filled` transition
///
/// Re-validates every precondition against the current aggregate state
/// (the store calls this under row locks, closing the last-vacancy race):
/// the role must still have a vacancy, the project-side offer must still
/// exist, and the developer must still be unemployed. On success the slot
/// is filled, the consumed record removed, peers on the now-exhausted role
/// cascade-rejected, the status recomputed and the profile employed.
pub fn accept_offer(profile: &mut Profile, project: &mut Project) -> DomainResult<AcceptOutcome> {
    let claim = profile
        .offer_for(project.id())
        .cloned()
        .ok_or_else(|| missing_claim(project, "offer"))?;

    if !project.roster().has_vacancy(&claim.role) {
        return Err(DomainError::conflict("no more vacancies left"));
    }
    if project.offered_for(profile.user_id()).is_none() {
        return Err(DomainError::conflict("the offer has been revoked"));
    }
    if profile.is_employed() {
        return Err(DomainError::conflict("already employed"));
    }

    project.retract_offered(profile.user_id());
    fill_and_settle(profile, project, &claim.role)
}

/// Accepts a pending application on behalf of the project owner
///
/// The mirror image of [`accept_offer`]: the consumed record is the
/// project-side applicant entry, and the withdrawn-counterpart check looks
/// at the developer's profile.
pub fn accept_application(
    owner_id: Uuid,
    profile: &mut Profile,
    project: &mut Project,
) -> DomainResult<AcceptOutcome> {
    ensure_owner(owner_id, project)?;
    let pending = project
        .applicant_for(profile.user_id())
        .cloned()
        .ok_or_else(|| missing_claim(project, "application"))?;

    if !project.roster().has_vacancy(&pending.role) {
        return Err(DomainError::conflict("no more vacancies left"));
    }
    if profile.application_for(project.id()).is_none() {
        return Err(DomainError::conflict("the application has been withdrawn"));
    }
    if profile.is_employed() {
        return Err(DomainError::conflict("developer is already employed"));
    }

    project.retract_applicant(profile.user_id());
    fill_and_settle(profile, project, &pending.role)
}

/// Rejects a pending offer (developer side); no cascade
pub fn reject_offer(profile: &mut Profile, project: &mut Project) -> DomainResult<()> {
    if profile.offer_for(project.id()).is_none() {
        return Err(DomainError::not_found("offer"));
    }
    project.retract_offered(profile.user_id());
    profile.retract_offer(project.id());
    Ok(())
}

/// Withdraws a pending application (developer side); no cascade
pub fn withdraw_application(profile: &mut Profile, project: &mut Project) -> DomainResult<()> {
    if profile.application_for(project.id()).is_none() {
        return Err(DomainError::not_found("application"));
    }
    project.retract_applicant(profile.user_id());
    profile.retract_application(project.id());
    Ok(())
}

/// Cancels an offer previously made by the owner
pub fn cancel_offer(
    owner_id: Uuid,
    profile: &mut Profile,
    project: &mut Project,
) -> DomainResult<()> {
    ensure_owner(owner_id, project)?;
    if project.offered_for(profile.user_id()).is_none() {
        return Err(DomainError::not_found("offer"));
    }
    project.retract_offered(profile.user_id());
    profile.retract_offer(project.id());
    Ok(())
}

/// Rejects an applicant on behalf of the owner
pub fn reject_applicant(
    owner_id: Uuid,
    profile: &mut Profile,
    project: &mut Project,
) -> DomainResult<()> {
    ensure_owner(owner_id, project)?;
    if project.applicant_for(profile.user_id()).is_none() {
        return Err(DomainError::not_found("application"));
    }
    project.retract_applicant(profile.user_id());
    profile.retract_application(project.id());
    Ok(())
}

/// A member leaves the project: the `Filled -> Open` transition
///
/// Vacates the slot, strips the developer's tasks, removes the history
/// entry keyed by project id and reverts `Full` to `Hiring`.
pub fn leave(profile: &mut Profile, project: &mut Project) -> DomainResult<()> {
    if profile.user_id() == project.owner() {
        return Err(DomainError::conflict("the owner must close the project instead"));
    }
    project.vacate_slot(profile.user_id())?;
    project.strip_tasks_of(profile.user_id());
    project.recompute_status();
    profile.end_job(project.id())?;
    Ok(())
}

/// The owner removes a member; same effects as [`leave`]
pub fn remove_member(
    owner_id: Uuid,
    profile: &mut Profile,
    project: &mut Project,
) -> DomainResult<()> {
    ensure_owner(owner_id, project)?;
    if profile.user_id() == owner_id {
        return Err(DomainError::conflict("the owner cannot be removed"));
    }
    project.vacate_slot(profile.user_id())?;
    project.strip_tasks_of(profile.user_id());
    project.recompute_status();
    profile.end_job(project.id())?;
    Ok(())
}

/// Closes the project: the terminal transition
///
/// Evicts every filled non-leader member, empties tasks and posts and
/// marks the project `Complete`. Returns the evicted developers whose
/// profiles must be released in the same transaction; the owner's own
/// profile is released here.
pub fn close_project(
    owner_id: Uuid,
    owner_profile: &mut Profile,
    project: &mut Project,
) -> DomainResult<Vec<Uuid>> {
    ensure_owner(owner_id, project)?;
    if project.status() == ProjectStatus::Complete {
        return Err(DomainError::conflict("project is already complete"));
    }
    let evicted = project.close();
    owner_profile.release_job(project.id());
    Ok(evicted)
}

/// Adds a new open role slot; a `Full` project reverts to `Hiring`
pub fn add_role(owner_id: Uuid, project: &mut Project, role: &str) -> DomainResult<()> {
    ensure_owner(owner_id, project)?;
    project.add_open_role(role)
}

// ===== Internals =====

/// Error for a claim that is no longer on record
///
/// When the roster has filled up in the meantime, the claim was consumed
/// by a cascade; a raced accept then reports the exhausted vacancy rather
/// than a dangling lookup.
fn missing_claim(project: &Project, what: &str) -> DomainError {
    if project.roster().is_fully_staffed() {
        DomainError::conflict("no more vacancies left")
    } else {
        DomainError::not_found(what)
    }
}

fn ensure_owner(caller: Uuid, project: &Project) -> DomainResult<()> {
    if project.owner() != caller {
        return Err(DomainError::unauthorized("caller is not the project owner"));
    }
    Ok(())
}

fn ensure_open_vacancy(project: &Project, role: &str) -> DomainResult<()> {
    let roster = project.roster();
    if !roster.has_role(role) {
        return Err(DomainError::not_found(format!("role '{}'", role)));
    }
    if !roster.has_vacancy(role) {
        return Err(DomainError::conflict("no vacancy for this role"));
    }
    Ok(())
}

/// Guards `Open -> Applied` / `Open -> Offered` with the named-state table
fn ensure_no_claim(profile: &Profile, project: &Project, next: ClaimState) -> DomainResult<()> {
    let state = ClaimState::of(profile, project);
    if state.can_transition_to(next) {
        return Ok(());
    }
    Err(match state {
        ClaimState::Applied => {
            DomainError::conflict("developer has already applied to this project")
        }
        ClaimState::Offered => {
            DomainError::conflict("an offer is already pending for this project")
        }
        ClaimState::Filled | ClaimState::Closed => {
            DomainError::conflict("user already part of project")
        }
        ClaimState::Open => DomainError::conflict("claim is not open"),
    })
}

/// Steps 4-8 of the compound accept: fill, cascade, recompute, employ
fn fill_and_settle(
    profile: &mut Profile,
    project: &mut Project,
    role: &str,
) -> DomainResult<AcceptOutcome> {
    project.fill_slot(role, profile.user_id())?;
    let displaced = cascade_reject(project, role);
    project.recompute_status();
    profile.start_job(project.id(), project.title(), role)?;
    Ok(AcceptOutcome {
        role: role.to_string(),
        displaced,
    })
}

/// Cascade rejection for a role whose last vacancy just filled
///
/// The displaced set is computed in full before any removal (no mutation
/// while iterating); returns the profile-side cleanups still owed.
fn cascade_reject(project: &mut Project, role: &str) -> Vec<DisplacedClaim> {
    if project.roster().has_vacancy(role) {
        return Vec::new();
    }

    let mut displaced: Vec<DisplacedClaim> = project
        .applicants()
        .iter()
        .filter(|a| a.role == role)
        .map(|a| DisplacedClaim {
            developer: a.developer,
            kind: ClaimKind::Application,
        })
        .collect();
    displaced.extend(
        project
            .offered()
            .iter()
            .filter(|o| o.role == role)
            .map(|o| DisplacedClaim {
                developer: o.developer,
                kind: ClaimKind::Offer,
            }),
    );

    for claim in &displaced {
        match claim.kind {
            ClaimKind::Application => project.retract_applicant(claim.developer),
            ClaimKind::Offer => project.retract_offered(claim.developer),
        };
    }
    displaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::ProfileDetails;

    fn profile(skills: &[&str]) -> Profile {
        Profile::new(
            Uuid::new_v4(),
            skills.iter().map(|s| s.to_string()).collect(),
            ProfileDetails::default(),
        )
        .unwrap()
    }

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
    fn apply_records_both_sides() {
        let mut dev = profile(&["backend"]);
        let mut proj = project(Uuid::new_v4(), &["backend"]);

        apply(&mut dev, &mut proj, "backend").unwrap();

        assert_eq!(dev.applied().len(), 1);
        assert_eq!(proj.applicants().len(), 1);
        assert_eq!(proj.applicants()[0].developer, dev.user_id());
    }

    #[test]
    fn apply_twice_is_a_conflict() {
        let mut dev = profile(&["backend"]);
        let mut proj = project(Uuid::new_v4(), &["backend"]);

        apply(&mut dev, &mut proj, "backend").unwrap();
        let err = apply(&mut dev, &mut proj, "backend").unwrap_err();
        assert_eq!(
            err,
            DomainError::conflict("developer has already applied to this project")
        );
    }

    #[test]
    fn apply_without_skill_fails() {
        let mut dev = profile(&["design"]);
        let mut proj = project(Uuid::new_v4(), &["backend"]);

        assert!(apply(&mut dev, &mut proj, "backend").is_err());
    }

    #[test]
    fn apply_for_missing_role_is_not_found() {
        let mut dev = profile(&["frontend"]);
        let mut proj = project(Uuid::new_v4(), &["backend"]);

        let err = apply(&mut dev, &mut proj, "frontend").unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn offer_then_apply_violates_disjointness() {
        let owner = Uuid::new_v4();
        let mut dev = profile(&["backend"]);
        let mut proj = project(owner, &["backend"]);

        offer(owner, &mut dev, &mut proj, "backend").unwrap();
        let err = apply(&mut dev, &mut proj, "backend").unwrap_err();
        assert_eq!(
            err,
            DomainError::conflict("an offer is already pending for this project")
        );
    }

    #[test]
    fn offer_requires_ownership() {
        let mut dev = profile(&["backend"]);
        let mut proj = project(Uuid::new_v4(), &["backend"]);

        let err = offer(Uuid::new_v4(), &mut dev, &mut proj, "backend").unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[test]
    fn accept_offer_fills_slot_and_employs() {
        let owner = Uuid::new_v4();
        let mut dev = profile(&["backend"]);
        let mut proj = project(owner, &["backend", "design"]);
        offer(owner, &mut dev, &mut proj, "backend").unwrap();

        let outcome = accept_offer(&mut dev, &mut proj).unwrap();

        assert_eq!(outcome.role, "backend");
        assert!(outcome.displaced.is_empty());
        assert_eq!(dev.current_job(), Some(proj.id()));
        assert!(proj.roster().is_member(dev.user_id()));
        assert!(proj.offered().is_empty());
        // design slot still open
        assert_eq!(proj.status(), ProjectStatus::Hiring);
    }

    #[test]
    fn accept_offer_cascades_on_last_vacancy() {
        let owner = Uuid::new_v4();
        let mut hired = profile(&["backend"]);
        let mut peer_applicant = profile(&["backend"]);
        let mut peer_offered = profile(&["backend"]);
        let mut proj = project(owner, &["backend"]);

        apply(&mut peer_applicant, &mut proj, "backend").unwrap();
        offer(owner, &mut peer_offered, &mut proj, "backend").unwrap();
        offer(owner, &mut hired, &mut proj, "backend").unwrap();

        let outcome = accept_offer(&mut hired, &mut proj).unwrap();

        // Both peers displaced, project side already clean
        assert_eq!(outcome.displaced.len(), 2);
        assert!(proj.applicants().is_empty());
        assert!(proj.offered().is_empty());
        assert!(outcome.displaced.contains(&DisplacedClaim {
            developer: peer_applicant.user_id(),
            kind: ClaimKind::Application,
        }));
        assert!(outcome.displaced.contains(&DisplacedClaim {
            developer: peer_offered.user_id(),
            kind: ClaimKind::Offer,
        }));
        assert_eq!(proj.status(), ProjectStatus::Full);
    }

    #[test]
    fn cascade_spares_other_roles() {
        let owner = Uuid::new_v4();
        let mut hired = profile(&["backend"]);
        let mut designer = profile(&["design"]);
        let mut proj = project(owner, &["backend", "design"]);

        apply(&mut designer, &mut proj, "design").unwrap();
        offer(owner, &mut hired, &mut proj, "backend").unwrap();

        let outcome = accept_offer(&mut hired, &mut proj).unwrap();

        assert!(outcome.displaced.is_empty());
        assert_eq!(proj.applicants().len(), 1);
        assert_eq!(proj.status(), ProjectStatus::Hiring);
    }

    #[test]
    fn accept_offer_when_slot_raced_away_leaves_no_trace() {
        let owner = Uuid::new_v4();
        let mut first = profile(&["backend"]);
        let mut second = profile(&["backend"]);
        let mut proj = project(owner, &["backend"]);

        offer(owner, &mut first, &mut proj, "backend").unwrap();
        offer(owner, &mut second, &mut proj, "backend").unwrap();

        accept_offer(&mut first, &mut proj).unwrap();

        // The cascade removed second's project-side record, but the profile
        // half survives until the store applies the displaced cleanup; the
        // re-validation still refuses with no state change.
        let before_profile = second.clone();
        let before_project = proj.clone();
        let err = accept_offer(&mut second, &mut proj).unwrap_err();
        assert_eq!(err, DomainError::conflict("no more vacancies left"));
        assert_eq!(second, before_profile);
        assert_eq!(proj, before_project);
    }

    #[test]
    fn accept_revoked_offer_fails() {
        let owner = Uuid::new_v4();
        let mut dev = profile(&["backend"]);
        let mut proj = project(owner, &["backend", "backend"]);

        offer(owner, &mut dev, &mut proj, "backend").unwrap();
        // Owner cancels, developer's profile copy is stale
        proj.retract_offered(dev.user_id());

        let err = accept_offer(&mut dev, &mut proj).unwrap_err();
        assert_eq!(err, DomainError::conflict("the offer has been revoked"));
    }

    #[test]
    fn accept_application_flow() {
        let owner = Uuid::new_v4();
        let mut dev = profile(&["backend"]);
        let mut proj = project(owner, &["backend"]);

        apply(&mut dev, &mut proj, "backend").unwrap();
        let outcome = accept_application(owner, &mut dev, &mut proj).unwrap();

        assert_eq!(outcome.role, "backend");
        assert_eq!(dev.current_job(), Some(proj.id()));
        assert!(proj.applicants().is_empty());
        assert_eq!(proj.status(), ProjectStatus::Full);
    }

    #[test]
    fn accept_withdrawn_application_fails() {
        let owner = Uuid::new_v4();
        let mut dev = profile(&["backend"]);
        let mut proj = project(owner, &["backend"]);

        apply(&mut dev, &mut proj, "backend").unwrap();
        dev.retract_application(proj.id());

        let err = accept_application(owner, &mut dev, &mut proj).unwrap_err();
        assert_eq!(
            err,
            DomainError::conflict("the application has been withdrawn")
        );
    }

    #[test]
    fn reject_and_withdraw_clean_both_sides() {
        let owner = Uuid::new_v4();
        let mut dev = profile(&["backend"]);
        let mut proj = project(owner, &["backend"]);

        offer(owner, &mut dev, &mut proj, "backend").unwrap();
        reject_offer(&mut dev, &mut proj).unwrap();
        assert!(dev.offers().is_empty());
        assert!(proj.offered().is_empty());

        apply(&mut dev, &mut proj, "backend").unwrap();
        withdraw_application(&mut dev, &mut proj).unwrap();
        assert!(dev.applied().is_empty());
        assert!(proj.applicants().is_empty());
    }

    #[test]
    fn leave_reopens_slot_and_clears_job() {
        let owner = Uuid::new_v4();
        let mut dev = profile(&["backend"]);
        let mut proj = project(owner, &["backend"]);
        apply(&mut dev, &mut proj, "backend").unwrap();
        accept_application(owner, &mut dev, &mut proj).unwrap();
        proj.add_task(owner, dev.user_id(), "t".to_string(), "d".to_string())
            .unwrap();
        assert_eq!(proj.status(), ProjectStatus::Full);

        leave(&mut dev, &mut proj).unwrap();

        assert_eq!(dev.current_job(), None);
        assert!(dev.projects().is_empty());
        assert!(proj.tasks().is_empty());
        assert!(proj.roster().has_vacancy("backend"));
        assert_eq!(proj.status(), ProjectStatus::Hiring);
    }

    #[test]
    fn owner_cannot_leave_or_be_removed() {
        let owner_id = Uuid::new_v4();
        let mut owner_profile = Profile::new(
            owner_id,
            vec!["backend".to_string()],
            ProfileDetails::default(),
        )
        .unwrap();
        let mut proj = project(owner_id, &["backend"]);

        assert!(leave(&mut owner_profile, &mut proj).is_err());
        assert!(remove_member(owner_id, &mut owner_profile, &mut proj).is_err());
    }

    #[test]
    fn close_project_reports_evicted_members() {
        let owner_id = Uuid::new_v4();
        let mut owner_profile = Profile::new(
            owner_id,
            vec!["backend".to_string()],
            ProfileDetails::default(),
        )
        .unwrap();
        let mut dev = profile(&["backend"]);
        let mut proj = project(owner_id, &["backend"]);
        owner_profile
            .start_job(proj.id(), "Test project", "LEADER")
            .unwrap();
        apply(&mut dev, &mut proj, "backend").unwrap();
        accept_application(owner_id, &mut dev, &mut proj).unwrap();

        let evicted = close_project(owner_id, &mut owner_profile, &mut proj).unwrap();

        assert_eq!(evicted, vec![dev.user_id()]);
        assert_eq!(proj.status(), ProjectStatus::Complete);
        assert_eq!(owner_profile.current_job(), None);
        // Completion keeps the owner's history entry
        assert_eq!(owner_profile.projects().len(), 1);
        assert!(close_project(owner_id, &mut owner_profile, &mut proj).is_err());
    }

    #[test]
    fn add_role_is_owner_only() {
        let owner_id = Uuid::new_v4();
        let mut proj = project(owner_id, &["backend"]);

        assert!(add_role(Uuid::new_v4(), &mut proj, "design").is_err());
        add_role(owner_id, &mut proj, "design").unwrap();
        assert!(proj.roster().has_vacancy("design"));
    }
}
