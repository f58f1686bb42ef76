//! Core types for organization membership and invitations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::SecretString;

/// Returned when a stored vocabulary string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: \"{value}\"")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

/// How a member belongs to an organization.
///
/// `Team` members get full organization access; `Client` members are
/// scoped to a single workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipType {
    #[default]
    Team,
    Client,
}

impl MembershipType {
    pub const ALL: [Self; 2] = [Self::Team, Self::Client];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Client => "client",
        }
    }

    /// Human-readable label, as shown in the invite form's selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::Team => "Team",
            Self::Client => "Client",
        }
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "team" => Ok(Self::Team),
            "client" => Ok(Self::Client),
            other => Err(UnknownValue {
                kind: "membership type",
                value: other.to_owned(),
            }),
        }
    }
}

/// Role names known to the `roles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Admin,
    Member,
}

impl RoleName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl FromStr for RoleName {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(UnknownValue {
                kind: "role",
                value: other.to_owned(),
            }),
        }
    }
}

/// Permission actions known to the `permissions` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionAction {
    ManageOrganization,
    ManageTeam,
}

impl PermissionAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManageOrganization => "manage_organization",
            Self::ManageTeam => "manage_team",
        }
    }
}

impl fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionAction {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manage_organization" => Ok(Self::ManageOrganization),
            "manage_team" => Ok(Self::ManageTeam),
            other => Err(UnknownValue {
                kind: "permission action",
                value: other.to_owned(),
            }),
        }
    }
}

/// A row of the `roles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
}

/// `{ "action": "manage_team" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRef {
    pub action: String,
}

/// `{ "permission": { "action": "manage_team" } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    pub permission: PermissionRef,
}

/// A member's role with the permissions granted through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRole {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<RolePermission>,
}

/// A member of an organization, in the nested shape the hosted backend
/// returns when the role and its permissions are embedded:
///
/// ```json
/// { "membership_type": "client",
///   "role": { "name": "admin",
///             "permissions": [ { "permission": { "action": "manage_team" } } ] } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub membership_type: MembershipType,
    pub role: MemberRole,
}

impl Member {
    pub fn new(membership_type: MembershipType, role_name: impl Into<String>) -> Self {
        Self {
            membership_type,
            role: MemberRole {
                name: role_name.into(),
                permissions: Vec::new(),
            },
        }
    }

    /// Adds a permission action to the member's role.
    #[must_use]
    pub fn with_permission(mut self, action: impl Into<String>) -> Self {
        self.role.permissions.push(RolePermission {
            permission: PermissionRef {
                action: action.into(),
            },
        });
        self
    }

    /// Iterates over the member's permission action strings.
    pub fn permission_actions(&self) -> impl Iterator<Item = &str> {
        self.role
            .permissions
            .iter()
            .map(|p| p.permission.action.as_str())
    }

    pub fn role_name(&self) -> Option<RoleName> {
        self.role.name.parse().ok()
    }
}

/// An invitation for someone to join an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub organization_id: Uuid,
    pub team_id: Option<Uuid>,
    pub role_id: Uuid,
    pub membership_type: MembershipType,
    pub token: SecretString,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub invited_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted_at.is_some()
    }

    /// Neither accepted nor expired.
    pub fn is_pending(&self) -> bool {
        !self.is_accepted() && !self.is_expired()
    }
}

/// The row `validate_invitation_token` returns for a usable token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvitationDetails {
    pub invitation_id: Uuid,
    pub email: String,
    pub organization_id: Uuid,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub team_id: Option<Uuid>,
    pub role_id: Uuid,
    #[serde(default)]
    pub role_name: Option<String>,
    pub membership_type: MembershipType,
    pub expires_at: DateTime<Utc>,
}
