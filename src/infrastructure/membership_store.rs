//! Transactional unit of work for the membership state machine
//!
//! The Profile and Project rows are one logical aggregate stored as two
//! documents; every operation mutating both runs here as a single
//! database transaction. Rows are locked `FOR UPDATE` (project first,
//! then profiles) and all preconditions are re-validated by the pure
//! engine under those locks, so a raced accept fails with a Conflict
//! instead of double-filling a slot. Any error before commit drops the
//! transaction and rolls back every write.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::membership::engine;
use crate::domain::membership::ClaimKind;
use crate::domain::profile::Profile;
use crate::domain::project::{Project, LEADER_ROLE};

use super::repositories::postgres_profile_repository::{fetch_profile_for_update, persist_profile};
use super::repositories::postgres_project_repository::{fetch_project_for_update, persist_project};

/// Executes membership transitions atomically across both halves of the
/// aggregate
pub struct PgMembershipStore {
    pool: PgPool,
}

impl PgMembershipStore {
    /// Creates a new PgMembershipStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a project and employs the owner as its leader
    ///
    /// Fails if the owner already owns a non-complete project or is
    /// employed anywhere.
    pub async fn create_project(
        &self,
        owner_id: Uuid,
        title: String,
        description: String,
        roles: Vec<String>,
    ) -> DomainResult<Project> {
        let mut tx = self.begin().await?;

        let already_owner: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM projects WHERE owner_id = $1 AND status <> 'COMPLETE' LIMIT 1",
        )
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;
        if already_owner.is_some() {
            return Err(DomainError::conflict("user already has a project"));
        }

        let mut profile = lock_profile(&mut tx, owner_id).await?;
        if profile.is_employed() {
            return Err(DomainError::conflict("user already part of a project"));
        }

        let project = Project::new(owner_id, title, description, roles)?;
        profile.start_job(project.id(), project.title(), LEADER_ROLE)?;

        persist_project(&mut tx, &project).await.map_err(storage)?;
        persist_profile(&mut tx, &profile).await.map_err(storage)?;
        commit(tx).await?;
        Ok(project)
    }

    /// Applies a developer to an open role
    pub async fn apply(
        &self,
        developer_id: Uuid,
        project_id: Uuid,
        role: &str,
    ) -> DomainResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = lock_project(&mut tx, project_id).await?;
        let mut profile = lock_profile(&mut tx, developer_id).await?;

        engine::apply(&mut profile, &mut project, role)?;

        persist_profile(&mut tx, &profile).await.map_err(storage)?;
        persist_project(&mut tx, &project).await.map_err(storage)?;
        commit(tx).await?;
        Ok(project)
    }

    /// Offers a role to a developer on behalf of the owner
    pub async fn offer(
        &self,
        owner_id: Uuid,
        developer_id: Uuid,
        project_id: Uuid,
        role: &str,
    ) -> DomainResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = lock_project(&mut tx, project_id).await?;
        let mut profile = lock_profile(&mut tx, developer_id).await?;

        engine::offer(owner_id, &mut profile, &mut project, role)?;

        persist_profile(&mut tx, &profile).await.map_err(storage)?;
        persist_project(&mut tx, &project).await.map_err(storage)?;
        commit(tx).await?;
        Ok(project)
    }

    /// Atomic accept of a pending offer, including cascade rejection
    pub async fn accept_offer(
        &self,
        developer_id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = lock_project(&mut tx, project_id).await?;
        let mut profile = lock_profile(&mut tx, developer_id).await?;

        let outcome = engine::accept_offer(&mut profile, &mut project)?;
        apply_displaced(&mut tx, project_id, &outcome.displaced).await?;

        persist_profile(&mut tx, &profile).await.map_err(storage)?;
        persist_project(&mut tx, &project).await.map_err(storage)?;
        commit(tx).await?;
        Ok(project)
    }

    /// Atomic accept of a pending application, including cascade rejection
    pub async fn accept_application(
        &self,
        owner_id: Uuid,
        developer_id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = lock_project(&mut tx, project_id).await?;
        let mut profile = lock_profile(&mut tx, developer_id).await?;

        let outcome = engine::accept_application(owner_id, &mut profile, &mut project)?;
        apply_displaced(&mut tx, project_id, &outcome.displaced).await?;

        persist_profile(&mut tx, &profile).await.map_err(storage)?;
        persist_project(&mut tx, &project).await.map_err(storage)?;
        commit(tx).await?;
        Ok(project)
    }

    /// Developer rejects a pending offer
    pub async fn reject_offer(
        &self,
        developer_id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Profile> {
        self.two_sided_removal(developer_id, project_id, |profile, project| {
            engine::reject_offer(profile, project)
        })
        .await
    }

    /// Developer withdraws a pending application
    pub async fn withdraw_application(
        &self,
        developer_id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Profile> {
        self.two_sided_removal(developer_id, project_id, |profile, project| {
            engine::withdraw_application(profile, project)
        })
        .await
    }

    /// Owner cancels an offer previously made to a developer
    pub async fn cancel_offer(
        &self,
        owner_id: Uuid,
        developer_id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = lock_project(&mut tx, project_id).await?;
        let mut profile = lock_profile(&mut tx, developer_id).await?;

        engine::cancel_offer(owner_id, &mut profile, &mut project)?;

        persist_profile(&mut tx, &profile).await.map_err(storage)?;
        persist_project(&mut tx, &project).await.map_err(storage)?;
        commit(tx).await?;
        Ok(project)
    }

    /// Owner rejects a pending applicant
    pub async fn reject_applicant(
        &self,
        owner_id: Uuid,
        developer_id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = lock_project(&mut tx, project_id).await?;
        let mut profile = lock_profile(&mut tx, developer_id).await?;

        engine::reject_applicant(owner_id, &mut profile, &mut project)?;

        persist_profile(&mut tx, &profile).await.map_err(storage)?;
        persist_project(&mut tx, &project).await.map_err(storage)?;
        commit(tx).await?;
        Ok(project)
    }

    /// A member leaves the project
    pub async fn leave(&self, developer_id: Uuid, project_id: Uuid) -> DomainResult<Profile> {
        self.two_sided_removal(developer_id, project_id, |profile, project| {
            engine::leave(profile, project)
        })
        .await
    }

    /// Owner removes a member from the project
    pub async fn remove_member(
        &self,
        owner_id: Uuid,
        developer_id: Uuid,
        project_id: Uuid,
    ) -> DomainResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = lock_project(&mut tx, project_id).await?;
        let mut profile = lock_profile(&mut tx, developer_id).await?;

        engine::remove_member(owner_id, &mut profile, &mut project)?;

        persist_profile(&mut tx, &profile).await.map_err(storage)?;
        persist_project(&mut tx, &project).await.map_err(storage)?;
        commit(tx).await?;
        Ok(project)
    }

    /// Owner closes the project, evicting every filled non-leader member
    pub async fn close_project(&self, owner_id: Uuid, project_id: Uuid) -> DomainResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = lock_project(&mut tx, project_id).await?;
        let mut owner_profile = lock_profile(&mut tx, owner_id).await?;

        let evicted = engine::close_project(owner_id, &mut owner_profile, &mut project)?;
        for developer in evicted {
            let mut member = lock_profile(&mut tx, developer).await?;
            member.release_job(project_id);
            persist_profile(&mut tx, &member).await.map_err(storage)?;
        }

        persist_profile(&mut tx, &owner_profile)
            .await
            .map_err(storage)?;
        persist_project(&mut tx, &project).await.map_err(storage)?;
        commit(tx).await?;
        Ok(project)
    }

    /// Owner adds a new open role slot
    pub async fn add_role(
        &self,
        owner_id: Uuid,
        project_id: Uuid,
        role: &str,
    ) -> DomainResult<Project> {
        let mut tx = self.begin().await?;
        let mut project = lock_project(&mut tx, project_id).await?;

        engine::add_role(owner_id, &mut project, role)?;

        persist_project(&mut tx, &project).await.map_err(storage)?;
        commit(tx).await?;
        Ok(project)
    }

    async fn begin(&self) -> DomainResult<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(storage)
    }

    /// Shared shape of the developer-initiated symmetric removals
    async fn two_sided_removal<F>(
        &self,
        developer_id: Uuid,
        project_id: Uuid,
        transition: F,
    ) -> DomainResult<Profile>
    where
        F: FnOnce(&mut Profile, &mut Project) -> DomainResult<()>,
    {
        let mut tx = self.begin().await?;
        let mut project = lock_project(&mut tx, project_id).await?;
        let mut profile = lock_profile(&mut tx, developer_id).await?;

        transition(&mut profile, &mut project)?;

        persist_profile(&mut tx, &profile).await.map_err(storage)?;
        persist_project(&mut tx, &project).await.map_err(storage)?;
        commit(tx).await?;
        Ok(profile)
    }
}

/// Applies profile-side cleanup for every cascade-rejected peer
async fn apply_displaced(
    tx: &mut Transaction<'static, Postgres>,
    project_id: Uuid,
    displaced: &[crate::domain::membership::DisplacedClaim],
) -> DomainResult<()> {
    for claim in displaced {
        let mut peer = lock_profile(tx, claim.developer).await?;
        match claim.kind {
            ClaimKind::Application => peer.retract_application(project_id),
            ClaimKind::Offer => peer.retract_offer(project_id),
        };
        persist_profile(tx, &peer).await.map_err(storage)?;
    }
    Ok(())
}

async fn lock_project(
    tx: &mut Transaction<'static, Postgres>,
    id: Uuid,
) -> DomainResult<Project> {
    fetch_project_for_update(&mut *tx, id)
        .await
        .map_err(storage)?
        .ok_or_else(|| DomainError::not_found("project"))
}

async fn lock_profile(
    tx: &mut Transaction<'static, Postgres>,
    user_id: Uuid,
) -> DomainResult<Profile> {
    fetch_profile_for_update(&mut *tx, user_id)
        .await
        .map_err(storage)?
        .ok_or_else(|| DomainError::not_found("profile"))
}

async fn commit(tx: Transaction<'static, Postgres>) -> DomainResult<()> {
    tx.commit().await.map_err(storage)
}

fn storage(e: sqlx::Error) -> DomainError {
    DomainError::TransactionAborted(e.to_string())
}
