use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::db_error;
use crate::membership::{Member, MemberRepository, MembershipType, Role};
use crate::BackendError;

/// PostgreSQL-backed member and role lookups.
#[derive(Clone)]
pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MemberRecord {
    membership_type: String,
    role_name: String,
    permissions: Vec<String>,
}

impl TryFrom<MemberRecord> for Member {
    type Error = BackendError;

    fn try_from(row: MemberRecord) -> Result<Self, Self::Error> {
        let membership_type: MembershipType = row.membership_type.parse()?;
        Ok(row
            .permissions
            .into_iter()
            .fold(Member::new(membership_type, row.role_name), Member::with_permission))
    }
}

#[derive(FromRow)]
struct RoleRecord {
    id: Uuid,
    name: String,
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, BackendError> {
        let row: Option<MemberRecord> = sqlx::query_as(
            r"
            SELECT om.membership_type::text AS membership_type,
                   r.name AS role_name,
                   COALESCE(
                       array_agg(p.action::text) FILTER (WHERE p.action IS NOT NULL),
                       '{}'
                   ) AS permissions
            FROM organization_members om
            JOIN roles r ON r.id = om.role_id
            LEFT JOIN role_permissions rp ON rp.role_id = r.id
            LEFT JOIN permissions p ON p.id = rp.permission_id
            WHERE om.organization_id = $1 AND om.user_id = $2
            GROUP BY om.membership_type, r.name
            ",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find_member"))?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, BackendError> {
        let row: Option<RoleRecord> = sqlx::query_as("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find_role_by_name"))?;

        Ok(row.map(|r| Role {
            id: r.id,
            name: r.name,
        }))
    }
}
