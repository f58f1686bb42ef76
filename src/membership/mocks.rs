#![allow(clippy::significant_drop_tightening)]

//! In-memory backends emulating the hosted invitation procedures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::repository::{InvitationRepository, InviteOrgMember, MemberRepository};
use super::types::{Invitation, InvitationDetails, Member, Role};
use crate::crypto::generate_token_default;
use crate::{BackendError, SecretString};

fn poisoned() -> BackendError {
    BackendError::Internal("lock poisoned".into())
}

#[derive(Clone, Default)]
pub struct MockInvitationRepository {
    invitations: Arc<RwLock<Vec<Invitation>>>,
    organization_names: Arc<RwLock<HashMap<Uuid, String>>>,
    failure: Arc<RwLock<Option<BackendError>>>,
    list_calls: Arc<AtomicUsize>,
}

impl MockInvitationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names an organization so validated tokens carry `organization_name`.
    pub fn with_organization(self, id: Uuid, name: impl Into<String>) -> Self {
        if let Ok(mut names) = self.organization_names.write() {
            names.insert(id, name.into());
        }
        self
    }

    /// Makes every subsequent call fail with `err` until cleared with `None`.
    pub fn set_failure(&self, err: Option<BackendError>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = err;
        }
    }

    /// Seeds an invitation row directly.
    pub fn insert(&self, invitation: Invitation) {
        if let Ok(mut invitations) = self.invitations.write() {
            invitations.push(invitation);
        }
    }

    pub fn all(&self) -> Vec<Invitation> {
        self.invitations
            .read()
            .map(|invitations| invitations.clone())
            .unwrap_or_default()
    }

    /// Number of `find_by_organization` calls that reached this backend.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), BackendError> {
        let failure = self.failure.read().map_err(|_| poisoned())?;
        match failure.as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn find_usable<'a>(invitations: &'a [Invitation], token: &SecretString) -> Option<&'a Invitation> {
        invitations
            .iter()
            .find(|i| i.token == *token && i.is_pending())
    }
}

#[async_trait]
impl InvitationRepository for MockInvitationRepository {
    async fn invite_org_member(&self, data: InviteOrgMember) -> Result<SecretString, BackendError> {
        self.check_failure()?;

        let token = SecretString::new(generate_token_default());
        let invitation = Invitation {
            id: Uuid::new_v4(),
            email: data.email,
            organization_id: data.organization_id,
            team_id: data.team_id,
            role_id: data.role_id,
            membership_type: data.membership_type,
            token: token.clone(),
            expires_at: data.expires_at,
            accepted_at: None,
            invited_by: data.invited_by,
            created_at: Utc::now(),
        };

        self.invitations
            .write()
            .map_err(|_| poisoned())?
            .push(invitation);

        Ok(token)
    }

    async fn validate_invitation_token(
        &self,
        token: &SecretString,
    ) -> Result<Option<InvitationDetails>, BackendError> {
        self.check_failure()?;

        let invitations = self.invitations.read().map_err(|_| poisoned())?;
        let names = self.organization_names.read().map_err(|_| poisoned())?;

        Ok(Self::find_usable(&invitations, token).map(|i| InvitationDetails {
            invitation_id: i.id,
            email: i.email.clone(),
            organization_id: i.organization_id,
            organization_name: names.get(&i.organization_id).cloned(),
            team_id: i.team_id,
            role_id: i.role_id,
            role_name: None,
            membership_type: i.membership_type,
            expires_at: i.expires_at,
        }))
    }

    async fn process_invitation(
        &self,
        token: &SecretString,
        _user_id: Uuid,
    ) -> Result<bool, BackendError> {
        self.check_failure()?;

        let mut invitations = self.invitations.write().map_err(|_| poisoned())?;
        let Some(invitation) = invitations
            .iter_mut()
            .find(|i| i.token == *token && i.is_pending())
        else {
            return Ok(false);
        };

        invitation.accepted_at = Some(Utc::now());
        Ok(true)
    }

    async fn revoke_invitation(&self, token: &SecretString) -> Result<bool, BackendError> {
        self.check_failure()?;

        let mut invitations = self.invitations.write().map_err(|_| poisoned())?;
        let before = invitations.len();
        invitations.retain(|i| i.token != *token || i.is_accepted());

        Ok(invitations.len() < before)
    }

    async fn find_by_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<Invitation>, BackendError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let invitations = self.invitations.read().map_err(|_| poisoned())?;
        let mut rows: Vec<Invitation> = invitations
            .iter()
            .filter(|i| i.organization_id == organization_id && !i.is_accepted())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(rows)
    }

    async fn find_pending(
        &self,
        organization_id: Uuid,
        email: &str,
    ) -> Result<Option<Invitation>, BackendError> {
        self.check_failure()?;

        let invitations = self.invitations.read().map_err(|_| poisoned())?;
        Ok(invitations
            .iter()
            .find(|i| {
                i.organization_id == organization_id
                    && i.email.eq_ignore_ascii_case(email)
                    && i.is_pending()
            })
            .cloned())
    }
}

#[derive(Clone, Default)]
pub struct MockMemberRepository {
    members: Arc<RwLock<HashMap<(Uuid, Uuid), Member>>>,
    roles: Arc<RwLock<Vec<Role>>>,
}

impl MockMemberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&self, organization_id: Uuid, user_id: Uuid, member: Member) {
        if let Ok(mut members) = self.members.write() {
            members.insert((organization_id, user_id), member);
        }
    }

    /// Registers a role and returns its generated id.
    pub fn add_role(&self, name: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        if let Ok(mut roles) = self.roles.write() {
            roles.push(Role {
                id,
                name: name.into(),
            });
        }
        id
    }
}

#[async_trait]
impl MemberRepository for MockMemberRepository {
    async fn find_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, BackendError> {
        let members = self.members.read().map_err(|_| poisoned())?;
        Ok(members.get(&(organization_id, user_id)).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, BackendError> {
        let roles = self.roles.read().map_err(|_| poisoned())?;
        Ok(roles.iter().find(|r| r.name == name).cloned())
    }
}
