//! Scenario tests for the membership workflow
//!
//! These exercise the full apply/offer/accept/reject lifecycle through
//! the crate's public domain API, covering the compound transitions and
//! the cleanup they must leave behind.

use devcrew_api::domain::membership::{engine, ClaimKind, ClaimState};
use devcrew_api::domain::profile::{Profile, ProfileDetails};
use devcrew_api::domain::project::{Project, ProjectStatus, LEADER_ROLE};
use devcrew_api::domain::DomainError;
use uuid::Uuid;

fn developer(skills: &[&str]) -> Profile {
    Profile::new(
        Uuid::new_v4(),
        skills.iter().map(|s| s.to_string()).collect(),
        ProfileDetails::default(),
    )
    .unwrap()
}

fn project_with_roles(owner: Uuid, roles: &[&str]) -> Project {
    Project::new(
        owner,
        "Job board".to_string(),
        "A platform connecting developers with projects".to_string(),
        roles.iter().map(|s| s.to_string()).collect(),
    )
    .unwrap()
}

#[test]
fn apply_then_accept_fills_the_slot_and_employs_the_developer() {
    let owner = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND", "FRONTEND"]);
    let mut dev = developer(&["BACKEND"]);

    engine::apply(&mut dev, &mut project, "BACKEND").unwrap();
    assert_eq!(ClaimState::of(&dev, &project), ClaimState::Applied);

    let outcome = engine::accept_application(owner, &mut dev, &mut project).unwrap();
    assert_eq!(outcome.role, "BACKEND");

    assert_eq!(ClaimState::of(&dev, &project), ClaimState::Filled);
    assert!(project.roster().is_member(dev.user_id()));
    assert_eq!(dev.current_job(), Some(project.id()));
    assert_eq!(dev.projects()[0].role, "BACKEND");
    // FRONTEND is still open
    assert_eq!(project.status(), ProjectStatus::Hiring);
}

#[test]
fn filling_the_last_vacancy_moves_the_project_to_full() {
    let owner = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND"]);
    let mut dev = developer(&["BACKEND"]);

    engine::offer(owner, &mut dev, &mut project, "BACKEND").unwrap();
    engine::accept_offer(&mut dev, &mut project).unwrap();

    assert_eq!(project.status(), ProjectStatus::Full);
    assert!(project.roster().is_fully_staffed());
}

#[test]
fn accepting_the_last_vacancy_cascade_rejects_every_peer_on_the_role() {
    let owner = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND"]);
    let mut winner = developer(&["BACKEND"]);
    let mut rival_applicant = developer(&["BACKEND"]);
    let mut rival_offered = developer(&["BACKEND"]);

    engine::apply(&mut winner, &mut project, "BACKEND").unwrap();
    engine::apply(&mut rival_applicant, &mut project, "BACKEND").unwrap();
    engine::offer(owner, &mut rival_offered, &mut project, "BACKEND").unwrap();

    let outcome = engine::accept_application(owner, &mut winner, &mut project).unwrap();

    let displaced: Vec<(Uuid, ClaimKind)> = outcome
        .displaced
        .iter()
        .map(|d| (d.developer, d.kind))
        .collect();
    assert!(displaced.contains(&(rival_applicant.user_id(), ClaimKind::Application)));
    assert!(displaced.contains(&(rival_offered.user_id(), ClaimKind::Offer)));
    assert_eq!(displaced.len(), 2);

    // The project side is already clean; the winner is never displaced
    assert!(project.applicants().is_empty());
    assert!(project.offered().is_empty());
    assert!(project.roster().is_member(winner.user_id()));
}

#[test]
fn cascade_spares_peers_on_roles_that_still_have_vacancies() {
    let owner = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND", "BACKEND"]);
    let mut winner = developer(&["BACKEND"]);
    let mut peer = developer(&["BACKEND"]);

    engine::apply(&mut winner, &mut project, "BACKEND").unwrap();
    engine::apply(&mut peer, &mut project, "BACKEND").unwrap();

    let outcome = engine::accept_application(owner, &mut winner, &mut project).unwrap();

    assert!(outcome.displaced.is_empty());
    assert_eq!(project.applicants().len(), 1);
    assert_eq!(ClaimState::of(&peer, &project), ClaimState::Applied);
}

#[test]
fn accepting_an_offer_purges_every_other_pending_claim_from_the_profile() {
    let owner_a = Uuid::new_v4();
    let owner_b = Uuid::new_v4();
    let mut project_a = project_with_roles(owner_a, &["BACKEND"]);
    let mut project_b = project_with_roles(owner_b, &["BACKEND"]);
    let mut dev = developer(&["BACKEND"]);

    engine::offer(owner_a, &mut dev, &mut project_a, "BACKEND").unwrap();
    engine::apply(&mut dev, &mut project_b, "BACKEND").unwrap();

    engine::accept_offer(&mut dev, &mut project_a).unwrap();

    assert!(dev.offers().is_empty());
    assert!(dev.applied().is_empty());
    // The record in the other project dangles until a later accept or a
    // discovery pass filters it; its profile counterpart is gone
    assert_eq!(project_b.applicants().len(), 1);
    assert!(dev.application_for(project_b.id()).is_none());
}

#[test]
fn raced_accept_fails_and_leaves_no_trace() {
    let owner = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND"]);
    let mut first = developer(&["BACKEND"]);
    let mut second = developer(&["BACKEND"]);

    engine::apply(&mut first, &mut project, "BACKEND").unwrap();
    engine::apply(&mut second, &mut project, "BACKEND").unwrap();

    let outcome = engine::accept_application(owner, &mut first, &mut project).unwrap();
    // The cascade already removed the loser's project-side record
    assert_eq!(outcome.displaced.len(), 1);

    let err = engine::accept_application(owner, &mut second, &mut project).unwrap_err();
    assert_eq!(err, DomainError::conflict("no more vacancies left"));

    assert!(!second.is_employed());
    assert!(!project.roster().is_member(second.user_id()));
    assert_eq!(project.members().iter().filter(|s| !s.vacancy).count(), 2);
}

#[test]
fn an_offer_revoked_elsewhere_cannot_be_accepted() {
    let owner = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND"]);
    let mut dev = developer(&["BACKEND"]);

    engine::offer(owner, &mut dev, &mut project, "BACKEND").unwrap();
    // Simulate the project-side record disappearing in another transaction
    project.retract_offered(dev.user_id());

    let err = engine::accept_offer(&mut dev, &mut project).unwrap_err();
    assert_eq!(err, DomainError::conflict("the offer has been revoked"));
    assert!(!dev.is_employed());
}

#[test]
fn claims_are_disjoint_per_pair() {
    let owner = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND", "FRONTEND"]);
    let mut dev = developer(&["BACKEND", "FRONTEND"]);

    engine::apply(&mut dev, &mut project, "BACKEND").unwrap();

    // A second claim between the same pair is rejected in both directions
    assert!(engine::apply(&mut dev, &mut project, "FRONTEND").is_err());
    assert!(engine::offer(owner, &mut dev, &mut project, "FRONTEND").is_err());
}

#[test]
fn withdrawing_an_application_cleans_both_sides() {
    let owner = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND"]);
    let mut dev = developer(&["BACKEND"]);

    engine::apply(&mut dev, &mut project, "BACKEND").unwrap();
    engine::withdraw_application(&mut dev, &mut project).unwrap();

    assert_eq!(ClaimState::of(&dev, &project), ClaimState::Open);
    assert!(project.applicants().is_empty());
    // The pair may start over
    engine::apply(&mut dev, &mut project, "BACKEND").unwrap();
}

#[test]
fn leaving_reopens_the_slot_and_unemploys_the_developer() {
    let owner = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND"]);
    let mut dev = developer(&["BACKEND"]);

    engine::apply(&mut dev, &mut project, "BACKEND").unwrap();
    engine::accept_application(owner, &mut dev, &mut project).unwrap();
    assert_eq!(project.status(), ProjectStatus::Full);

    engine::leave(&mut dev, &mut project).unwrap();

    assert_eq!(project.status(), ProjectStatus::Hiring);
    assert!(project.roster().has_vacancy("BACKEND"));
    assert!(!dev.is_employed());
    assert!(dev.projects().is_empty());
}

#[test]
fn leaving_strips_the_members_tasks() {
    let owner = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND"]);
    let mut dev = developer(&["BACKEND"]);

    engine::apply(&mut dev, &mut project, "BACKEND").unwrap();
    engine::accept_application(owner, &mut dev, &mut project).unwrap();
    project
        .add_task(
            owner,
            dev.user_id(),
            "Wire the API".to_string(),
            "Expose the search endpoint".to_string(),
        )
        .unwrap();

    engine::leave(&mut dev, &mut project).unwrap();
    assert!(project.tasks().is_empty());
}

#[test]
fn the_owner_cannot_leave_their_own_project() {
    let owner = Uuid::new_v4();
    let mut owner_profile = Profile::new(
        owner,
        vec!["BACKEND".to_string()],
        ProfileDetails::default(),
    )
    .unwrap();
    let mut project = project_with_roles(owner, &["BACKEND"]);
    owner_profile
        .start_job(project.id(), project.title(), LEADER_ROLE)
        .unwrap();

    let err = engine::leave(&mut owner_profile, &mut project).unwrap_err();
    assert_eq!(
        err,
        DomainError::conflict("the owner must close the project instead")
    );
}

#[test]
fn closing_a_project_evicts_members_and_is_terminal() {
    let owner = Uuid::new_v4();
    let mut owner_profile = Profile::new(
        owner,
        vec!["BACKEND".to_string()],
        ProfileDetails::default(),
    )
    .unwrap();
    let mut project = project_with_roles(owner, &["BACKEND"]);
    owner_profile
        .start_job(project.id(), project.title(), LEADER_ROLE)
        .unwrap();

    let mut dev = developer(&["BACKEND"]);
    engine::apply(&mut dev, &mut project, "BACKEND").unwrap();
    engine::accept_application(owner, &mut dev, &mut project).unwrap();

    let evicted = engine::close_project(owner, &mut owner_profile, &mut project).unwrap();
    assert_eq!(evicted, vec![dev.user_id()]);
    assert_eq!(project.status(), ProjectStatus::Complete);

    // The owner keeps the history entry but is free again
    assert!(owner_profile.current_job().is_none());
    assert_eq!(owner_profile.projects().len(), 1);

    // No further transitions out of Complete
    assert!(engine::add_role(owner, &mut project, "FRONTEND").is_err());
    let err = engine::close_project(owner, &mut owner_profile, &mut project).unwrap_err();
    assert_eq!(err, DomainError::conflict("project is already complete"));
}

#[test]
fn only_the_owner_drives_owner_side_operations() {
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND"]);
    let mut dev = developer(&["BACKEND"]);

    engine::apply(&mut dev, &mut project, "BACKEND").unwrap();

    let expected = DomainError::unauthorized("caller is not the project owner");
    assert_eq!(
        engine::accept_application(stranger, &mut dev, &mut project).unwrap_err(),
        expected
    );
    assert_eq!(
        engine::reject_applicant(stranger, &mut dev, &mut project).unwrap_err(),
        expected
    );
    assert_eq!(
        engine::add_role(stranger, &mut project, "FRONTEND").unwrap_err(),
        expected
    );
}

#[test]
fn employed_developers_hold_no_new_claims() {
    let owner_a = Uuid::new_v4();
    let owner_b = Uuid::new_v4();
    let mut project_a = project_with_roles(owner_a, &["BACKEND"]);
    let mut project_b = project_with_roles(owner_b, &["BACKEND"]);
    let mut dev = developer(&["BACKEND"]);

    engine::apply(&mut dev, &mut project_a, "BACKEND").unwrap();
    engine::accept_application(owner_a, &mut dev, &mut project_a).unwrap();

    assert_eq!(
        engine::apply(&mut dev, &mut project_b, "BACKEND").unwrap_err(),
        DomainError::conflict("already employed")
    );
    assert_eq!(
        engine::offer(owner_b, &mut dev, &mut project_b, "BACKEND").unwrap_err(),
        DomainError::conflict("developer is already employed")
    );
}

#[test]
fn applying_without_the_skill_is_rejected() {
    let owner = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND"]);
    let mut dev = developer(&["FRONTEND"]);

    assert_eq!(
        engine::apply(&mut dev, &mut project, "BACKEND").unwrap_err(),
        DomainError::conflict("developer does not have this skill")
    );
}

#[test]
fn adding_a_role_reopens_a_full_project() {
    let owner = Uuid::new_v4();
    let mut project = project_with_roles(owner, &["BACKEND"]);
    let mut dev = developer(&["BACKEND"]);

    engine::offer(owner, &mut dev, &mut project, "BACKEND").unwrap();
    engine::accept_offer(&mut dev, &mut project).unwrap();
    assert_eq!(project.status(), ProjectStatus::Full);

    engine::add_role(owner, &mut project, "FRONTEND").unwrap();
    assert_eq!(project.status(), ProjectStatus::Hiring);
    assert!(project.roster().has_vacancy("FRONTEND"));
}
