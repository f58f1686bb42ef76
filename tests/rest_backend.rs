//! Tests for the REST gateway backend against a mock HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use orgkit::membership::{
    InvitationRepository, InviteOrgMember, MemberRepository, MembershipType, PermissionAction,
    PermissionSet,
};
use orgkit::rest::{create_repositories, RestClient, RestInvitationRepository, RestMemberRepository};
use orgkit::{BackendError, SecretString};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "service-role-key";

async fn setup() -> (MockServer, RestInvitationRepository, RestMemberRepository) {
    let server = MockServer::start().await;
    let client = RestClient::new(server.uri(), SecretString::new(KEY), Duration::from_secs(5)).unwrap();
    let (invitations, members) = create_repositories(client);
    (server, invitations, members)
}

#[tokio::test]
async fn test_invite_org_member_sends_prefixed_params() {
    let (server, invitations, _) = setup().await;
    let organization_id = Uuid::new_v4();
    let role_id = Uuid::new_v4();
    let invited_by = Uuid::new_v4();
    let team_id = Uuid::new_v4();
    let expires_at = Utc::now() + ChronoDuration::days(7);

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/invite_org_member"))
        .and(header("apikey", KEY))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .and(body_json(json!({
            "p_organization_id": organization_id,
            "p_membership_type": "client",
            "p_email": "invitee@example.com",
            "p_role_id": role_id,
            "p_invited_by": invited_by,
            "p_expires_at": expires_at,
            "p_team_id": team_id,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("tok_123")))
        .expect(1)
        .mount(&server)
        .await;

    let token = invitations
        .invite_org_member(InviteOrgMember {
            organization_id,
            membership_type: MembershipType::Client,
            email: "invitee@example.com".to_owned(),
            role_id,
            invited_by,
            expires_at,
            team_id: Some(team_id),
        })
        .await
        .unwrap();

    assert_eq!(token.expose_secret(), "tok_123");
}

#[tokio::test]
async fn test_invite_org_member_without_token_is_empty_result() {
    let (server, invitations, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/invite_org_member"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    let err = invitations
        .invite_org_member(InviteOrgMember {
            organization_id: Uuid::new_v4(),
            membership_type: MembershipType::Team,
            email: "invitee@example.com".to_owned(),
            role_id: Uuid::new_v4(),
            invited_by: Uuid::new_v4(),
            expires_at: Utc::now() + ChronoDuration::days(7),
            team_id: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err, BackendError::EmptyResult("invite_org_member"));
}

#[tokio::test]
async fn test_validate_token_takes_first_row() {
    let (server, invitations, _) = setup().await;
    let invitation_id = Uuid::new_v4();
    let organization_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/validate_invitation_token"))
        .and(body_json(json!({ "p_token": "tok_123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "invitation_id": invitation_id,
            "email": "invitee@example.com",
            "organization_id": organization_id,
            "organization_name": "Acme",
            "role_id": Uuid::new_v4(),
            "membership_type": "team",
            "expires_at": Utc::now() + ChronoDuration::days(3),
        }])))
        .mount(&server)
        .await;

    let details = invitations
        .validate_invitation_token(&SecretString::new("tok_123"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(details.invitation_id, invitation_id);
    assert_eq!(details.organization_name.as_deref(), Some("Acme"));
    assert_eq!(details.team_id, None);
}

#[tokio::test]
async fn test_validate_unknown_token_is_none() {
    let (server, invitations, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/validate_invitation_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let details = invitations
        .validate_invitation_token(&SecretString::new("unknown"))
        .await
        .unwrap();
    assert!(details.is_none());
}

#[tokio::test]
async fn test_process_and_revoke_return_remote_bool() {
    let (server, invitations, _) = setup().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/process_invitation"))
        .and(body_json(json!({ "p_token": "tok_123", "p_user_id": user_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/revoke_invitation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
        .mount(&server)
        .await;

    let token = SecretString::new("tok_123");
    assert!(invitations.process_invitation(&token, user_id).await.unwrap());
    assert!(!invitations.revoke_invitation(&token).await.unwrap());
}

#[tokio::test]
async fn test_http_error_is_reported_with_status() {
    let (server, invitations, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/revoke_invitation"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = invitations
        .revoke_invitation(&SecretString::new("tok_123"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BackendError::Http {
            status: 401,
            body: "invalid api key".to_owned()
        }
    );
}

#[tokio::test]
async fn test_unexpected_shape_is_decode_error() {
    let (server, invitations, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/process_invitation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let err = invitations
        .process_invitation(&SecretString::new("tok_123"), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Decode(_)));
}

#[tokio::test]
async fn test_list_organization_invitations() {
    let (server, invitations, _) = setup().await;
    let organization_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/invitations"))
        .and(query_param("organization_id", format!("eq.{organization_id}").as_str()))
        .and(query_param("accepted_at", "is.null"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "email": "invitee@example.com",
            "organization_id": organization_id,
            "team_id": null,
            "role_id": Uuid::new_v4(),
            "membership_type": "team",
            "token": "tok_123",
            "expires_at": Utc::now() + ChronoDuration::days(7),
            "accepted_at": null,
            "invited_by": Uuid::new_v4(),
            "created_at": Utc::now(),
        }])))
        .mount(&server)
        .await;

    let rows = invitations.find_by_organization(organization_id).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_pending());
    assert_eq!(rows[0].token.expose_secret(), "tok_123");
}

#[tokio::test]
async fn test_find_member_reads_embedded_permissions() {
    let (server, _, members) = setup().await;
    let organization_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/organization_members"))
        .and(query_param(
            "select",
            "membership_type,role:roles(name,permissions:role_permissions(permission:permissions(action)))",
        ))
        .and(query_param("user_id", format!("eq.{user_id}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "membership_type": "client",
            "role": {
                "name": "admin",
                "permissions": [{ "permission": { "action": "manage_team" } }]
            }
        }])))
        .mount(&server)
        .await;

    let member = members
        .find_member(organization_id, user_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(member.membership_type, MembershipType::Client);
    let perms = PermissionSet::from(&member);
    assert!(perms.can(PermissionAction::ManageTeam));
    assert!(!perms.can(PermissionAction::ManageOrganization));
}

#[tokio::test]
async fn test_find_role_by_name() {
    let (server, _, members) = setup().await;
    let role_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/roles"))
        .and(query_param("name", "eq.member"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": role_id, "name": "member" }])),
        )
        .mount(&server)
        .await;

    let role = members.find_role_by_name("member").await.unwrap().unwrap();
    assert_eq!(role.id, role_id);
}
