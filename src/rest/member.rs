use async_trait::async_trait;
use uuid::Uuid;

use super::RestClient;
use crate::membership::{Member, MemberRepository, Role};
use crate::BackendError;

/// Embeds the member's role and the role's permission actions in one read.
const MEMBER_SELECT: &str =
    "membership_type,role:roles(name,permissions:role_permissions(permission:permissions(action)))";

#[derive(Clone)]
pub struct RestMemberRepository {
    client: RestClient,
}

impl RestMemberRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MemberRepository for RestMemberRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Member>, BackendError> {
        let rows: Vec<Member> = self
            .client
            .select(
                "organization_members",
                &[
                    ("select", MEMBER_SELECT.to_owned()),
                    ("organization_id", format!("eq.{organization_id}")),
                    ("user_id", format!("eq.{user_id}")),
                    ("limit", "1".to_owned()),
                ],
            )
            .await?;

        Ok(rows.into_iter().next())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, BackendError> {
        let rows: Vec<Role> = self
            .client
            .select(
                "roles",
                &[
                    ("select", "id,name".to_owned()),
                    ("name", format!("eq.{name}")),
                    ("limit", "1".to_owned()),
                ],
            )
            .await?;

        Ok(rows.into_iter().next())
    }
}
