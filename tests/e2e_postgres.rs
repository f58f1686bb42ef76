// these tests use #[serial] because setup_db() drops and recreates the test
// schema before each test.

//! End-to-end tests for the `PostgreSQL` repositories.
//!
//! These tests need a running `PostgreSQL` (13 or later) and are skipped when
//! neither `ORGKIT_TEST_DATABASE_URL` nor `DATABASE_URL` is set.
//! Run with: `cargo test --features sqlx_postgres --test e2e_postgres`
//!
//! Each test recreates the `orgkit_test` schema from
//! `tests/fixtures/postgres_schema.sql`, which stands in for the hosted
//! tables and invitation functions.

#![cfg(feature = "sqlx_postgres")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::str::FromStr;

use chrono::{Duration, Utc};
use orgkit::membership::{
    InvitationRepository, InviteOrgMember, MemberRepository, MembershipType, PermissionAction,
    PermissionSet,
};
use orgkit::postgres::{create_repositories, PostgresInvitationRepository, PostgresMemberRepository};
use orgkit::SecretString;
use serial_test::serial;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use uuid::Uuid;

const SCHEMA: &str = include_str!("fixtures/postgres_schema.sql");

async fn setup_db() -> Option<PgPool> {
    let Ok(database_url) =
        std::env::var("ORGKIT_TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL"))
    else {
        eprintln!("skipping: set ORGKIT_TEST_DATABASE_URL to run the Postgres tests");
        return None;
    };

    let options = PgConnectOptions::from_str(&database_url)
        .expect("Invalid database URL")
        .options([("search_path", "orgkit_test")]);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("Failed to connect to database");

    sqlx::raw_sql("DROP SCHEMA IF EXISTS orgkit_test CASCADE; CREATE SCHEMA orgkit_test;")
        .execute(&pool)
        .await
        .expect("Failed to reset schema");
    sqlx::raw_sql(SCHEMA)
        .execute(&pool)
        .await
        .expect("Failed to create schema");

    Some(pool)
}

async fn seed_organization(pool: &PgPool, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO organizations (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await
        .expect("Failed to insert organization");
    id
}

async fn seed_role(pool: &PgPool, name: &str, actions: &[&str]) -> Uuid {
    let role_id: Uuid = sqlx::query_scalar("INSERT INTO roles (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("Failed to insert role");

    for action in actions {
        sqlx::query(
            "WITH p AS (
                 INSERT INTO permissions (action) VALUES ($2)
                 ON CONFLICT (action) DO UPDATE SET action = EXCLUDED.action
                 RETURNING id
             )
             INSERT INTO role_permissions (role_id, permission_id) SELECT $1, id FROM p",
        )
        .bind(role_id)
        .bind(*action)
        .execute(pool)
        .await
        .expect("Failed to grant permission");
    }
    role_id
}

fn invite(organization_id: Uuid, role_id: Uuid, email: &str) -> InviteOrgMember {
    InviteOrgMember {
        organization_id,
        membership_type: MembershipType::Client,
        email: email.to_owned(),
        role_id,
        invited_by: Uuid::new_v4(),
        expires_at: Utc::now() + Duration::days(7),
        team_id: Some(Uuid::new_v4()),
    }
}

fn repositories(pool: &PgPool) -> (PostgresInvitationRepository, PostgresMemberRepository) {
    create_repositories(pool.clone())
}

#[tokio::test]
#[serial]
async fn test_invitation_lifecycle() {
    let Some(pool) = setup_db().await else { return };
    let (invitations, members) = repositories(&pool);
    let organization_id = seed_organization(&pool, "Acme").await;
    let role_id = seed_role(&pool, "member", &[]).await;

    let data = invite(organization_id, role_id, "invitee@example.com");
    let team_id = data.team_id;
    let token = invitations
        .invite_org_member(data)
        .await
        .expect("Failed to invite");
    assert!(!token.is_empty());

    let details = invitations
        .validate_invitation_token(&token)
        .await
        .expect("Failed to validate")
        .expect("Invitation not found");
    assert_eq!(details.email, "invitee@example.com");
    assert_eq!(details.organization_id, organization_id);
    assert_eq!(details.organization_name.as_deref(), Some("Acme"));
    assert_eq!(details.role_name.as_deref(), Some("member"));
    assert_eq!(details.membership_type, MembershipType::Client);
    assert_eq!(details.team_id, team_id);

    let user_id = Uuid::new_v4();
    assert!(invitations.process_invitation(&token, user_id).await.unwrap());

    // the accepted invitation made the user a member
    let member = members
        .find_member(organization_id, user_id)
        .await
        .unwrap()
        .expect("Member not created");
    assert_eq!(member.membership_type, MembershipType::Client);

    // a consumed token is neither valid nor reusable
    assert!(invitations.validate_invitation_token(&token).await.unwrap().is_none());
    assert!(!invitations.process_invitation(&token, Uuid::new_v4()).await.unwrap());
    assert!(invitations.find_by_organization(organization_id).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_revoke_invitation() {
    let Some(pool) = setup_db().await else { return };
    let (invitations, _) = repositories(&pool);
    let organization_id = seed_organization(&pool, "Acme").await;
    let role_id = seed_role(&pool, "member", &[]).await;

    let token = invitations
        .invite_org_member(invite(organization_id, role_id, "invitee@example.com"))
        .await
        .unwrap();

    assert!(invitations.revoke_invitation(&token).await.unwrap());
    assert!(!invitations.revoke_invitation(&token).await.unwrap());
    assert!(invitations.validate_invitation_token(&token).await.unwrap().is_none());
    assert!(!invitations
        .revoke_invitation(&SecretString::new("unknown"))
        .await
        .unwrap());
}

#[tokio::test]
#[serial]
async fn test_team_invitation_without_workspace() {
    let Some(pool) = setup_db().await else { return };
    let (invitations, _) = repositories(&pool);
    let organization_id = seed_organization(&pool, "Acme").await;
    let role_id = seed_role(&pool, "admin", &[]).await;

    let token = invitations
        .invite_org_member(InviteOrgMember {
            membership_type: MembershipType::Team,
            team_id: None,
            ..invite(organization_id, role_id, "staff@example.com")
        })
        .await
        .unwrap();

    let details = invitations
        .validate_invitation_token(&token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(details.membership_type, MembershipType::Team);
    assert_eq!(details.team_id, None);
}

#[tokio::test]
#[serial]
async fn test_find_by_organization_newest_first() {
    let Some(pool) = setup_db().await else { return };
    let (invitations, _) = repositories(&pool);
    let organization_id = seed_organization(&pool, "Acme").await;
    let other_organization = seed_organization(&pool, "Globex").await;
    let role_id = seed_role(&pool, "member", &[]).await;

    for email in ["first@example.com", "second@example.com"] {
        invitations
            .invite_org_member(invite(organization_id, role_id, email))
            .await
            .unwrap();
    }
    invitations
        .invite_org_member(invite(other_organization, role_id, "elsewhere@example.com"))
        .await
        .unwrap();

    let listed = invitations.find_by_organization(organization_id).await.unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].email, "second@example.com");
    assert_eq!(listed[1].email, "first@example.com");
    assert!(listed.iter().all(|i| i.is_pending()));
    assert_eq!(listed[0].membership_type, MembershipType::Client);
}

#[tokio::test]
#[serial]
async fn test_find_pending_ignores_case_and_expired() {
    let Some(pool) = setup_db().await else { return };
    let (invitations, _) = repositories(&pool);
    let organization_id = seed_organization(&pool, "Acme").await;
    let role_id = seed_role(&pool, "member", &[]).await;

    invitations
        .invite_org_member(invite(organization_id, role_id, "Invitee@Example.com"))
        .await
        .unwrap();
    invitations
        .invite_org_member(InviteOrgMember {
            expires_at: Utc::now() - Duration::days(1),
            ..invite(organization_id, role_id, "stale@example.com")
        })
        .await
        .unwrap();

    let pending = invitations
        .find_pending(organization_id, "invitee@example.com")
        .await
        .unwrap()
        .expect("Pending invitation not found");
    assert_eq!(pending.email, "Invitee@Example.com");

    assert!(invitations
        .find_pending(organization_id, "stale@example.com")
        .await
        .unwrap()
        .is_none());
    assert!(invitations
        .find_pending(Uuid::new_v4(), "invitee@example.com")
        .await
        .unwrap()
        .is_none());

    // expired invitations are still listed until accepted or revoked
    let listed = invitations.find_by_organization(organization_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed.iter().filter(|i| i.is_expired()).count(), 1);
}

#[tokio::test]
#[serial]
async fn test_find_member_aggregates_permissions() {
    let Some(pool) = setup_db().await else { return };
    let (_, members) = repositories(&pool);
    let organization_id = seed_organization(&pool, "Acme").await;
    let admin_role = seed_role(&pool, "admin", &["manage_organization", "manage_team"]).await;
    let member_role = seed_role(&pool, "member", &[]).await;

    let admin = Uuid::new_v4();
    let plain = Uuid::new_v4();
    for (user_id, role_id, membership_type) in [
        (admin, admin_role, "team"),
        (plain, member_role, "client"),
    ] {
        sqlx::query(
            "INSERT INTO organization_members (organization_id, user_id, role_id, membership_type)
             VALUES ($1, $2, $3, $4::membership_type)",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(role_id)
        .bind(membership_type)
        .execute(&pool)
        .await
        .unwrap();
    }

    let found = members
        .find_member(organization_id, admin)
        .await
        .unwrap()
        .expect("Admin not found");
    assert_eq!(found.membership_type, MembershipType::Team);
    let perms = PermissionSet::from(&found);
    assert!(perms.can(PermissionAction::ManageOrganization));
    assert!(perms.can(PermissionAction::ManageTeam));
    assert_eq!(perms.len(), 2);

    let found = members
        .find_member(organization_id, plain)
        .await
        .unwrap()
        .expect("Member not found");
    assert_eq!(found.membership_type, MembershipType::Client);
    assert!(PermissionSet::from(&found).is_empty());

    assert!(members
        .find_member(organization_id, Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[serial]
async fn test_find_role_by_name() {
    let Some(pool) = setup_db().await else { return };
    let (_, members) = repositories(&pool);
    let role_id = seed_role(&pool, "member", &[]).await;

    let role = members
        .find_role_by_name("member")
        .await
        .unwrap()
        .expect("Role not found");
    assert_eq!(role.id, role_id);
    assert_eq!(role.name, "member");

    assert!(members.find_role_by_name("owner").await.unwrap().is_none());
}
