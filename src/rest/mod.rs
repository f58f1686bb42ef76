//! REST gateway backend.
//!
//! Procedures are invoked as `POST {url}/rest/v1/rpc/{name}` with `p_*`
//! parameters in a JSON body. Table reads use `GET {url}/rest/v1/{table}`
//! with the gateway's `column=op.value` filters.

mod client;
mod invitation;
mod member;

pub use client::RestClient;
pub use invitation::RestInvitationRepository;
pub use member::RestMemberRepository;

/// Creates both REST repositories sharing one client.
pub fn create_repositories(client: RestClient) -> (RestInvitationRepository, RestMemberRepository) {
    (
        RestInvitationRepository::new(client.clone()),
        RestMemberRepository::new(client),
    )
}
