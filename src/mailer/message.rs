use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::MailerError;
use crate::membership::MembershipType;
use crate::SecretString;

/// What the caller supplies to send an invitation email.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationEmailData {
    pub email: String,
    pub token: SecretString,
    pub organization_name: String,
    pub inviter_name: String,
    #[serde(default)]
    pub membership_type: MembershipType,
}

/// A rendered invitation email, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvitationEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    /// The accept link embedded in both bodies.
    #[serde(skip)]
    pub accept_url: String,
}

impl InvitationEmail {
    /// Renders the email. The accept link is `{app_url}/invite?token={token}`.
    pub fn render(data: &InvitationEmailData, app_url: &str) -> Result<Self, MailerError> {
        let mut url = Url::parse(&format!("{}/invite", app_url.trim_end_matches('/')))
            .map_err(|e| MailerError::InvalidAppUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("token", data.token.expose_secret());
        let accept_url = url.to_string();

        let subject = format!("You've been invited to join {}", data.organization_name);
        let label = data.membership_type.label();

        let text = format!(
            "{inviter} has invited you to join {org} as a {label} member.\n\n\
             Accept the invitation: {accept_url}\n\n\
             If you weren't expecting this invitation, you can ignore this email.\n",
            inviter = data.inviter_name,
            org = data.organization_name,
        );

        let html = format!(
            "<p>{inviter} has invited you to join <strong>{org}</strong> as a {label} member.</p>\n\
             <p><a href=\"{href}\">Accept invitation</a></p>\n\
             <p>If you weren't expecting this invitation, you can ignore this email.</p>\n",
            inviter = html_escape(&data.inviter_name),
            org = html_escape(&data.organization_name),
            href = html_escape(&accept_url),
        );

        Ok(Self {
            to: data.email.clone(),
            subject,
            html,
            text,
            accept_url,
        })
    }
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
