use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::BackendConfig;
use crate::{BackendError, SecretString};

/// Thin client for the hosted service's REST gateway.
///
/// Every request carries the service key both as the `apikey` header and
/// as a bearer token, which is what the gateway expects for
/// service-role access.
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    service_key: SecretString,
}

impl RestClient {
    pub fn new(
        base_url: impl Into<String>,
        service_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            service_key,
        })
    }

    /// Builds a client from `rest_url` and `service_key`. Fails when either
    /// is missing.
    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        let base_url = config
            .rest_url
            .as_deref()
            .ok_or_else(|| BackendError::Internal("rest_url is not configured".into()))?;
        let service_key = config
            .service_key
            .clone()
            .ok_or_else(|| BackendError::Internal("service_key is not configured".into()))?;

        Self::new(base_url, service_key, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.service_key.expose_secret();
        request
            .header("apikey", key)
            .bearer_auth(key)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Calls a remote procedure: `POST /rest/v1/rpc/{name}` with `params` as
    /// the JSON body.
    pub async fn rpc<P, T>(&self, name: &str, params: &P) -> Result<T, BackendError>
    where
        P: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/rest/v1/rpc/{name}", self.base_url);
        let response = self
            .authorize(self.http.post(&url))
            .json(params)
            .send()
            .await
            .map_err(|e| transport_error(name, e))?;

        decode(name, response).await
    }

    /// Reads rows: `GET /rest/v1/{table}` with gateway filter parameters,
    /// e.g. `("organization_id", "eq.<uuid>")`.
    pub async fn select<T>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>, BackendError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/rest/v1/{table}", self.base_url);
        let response = self
            .authorize(self.http.get(&url))
            .query(query)
            .send()
            .await
            .map_err(|e| transport_error(table, e))?;

        decode(table, response).await
    }
}

fn transport_error(operation: &str, e: reqwest::Error) -> BackendError {
    log::error!(target: "orgkit", "msg=\"rest request failed\", operation=\"{operation}\", error=\"{e}\"");
    BackendError::from(e)
}

async fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::error!(
            target: "orgkit",
            "msg=\"rest call rejected\", operation=\"{operation}\", status={}, body=\"{body}\"",
            status.as_u16()
        );
        return Err(BackendError::Http {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await.map_err(BackendError::from)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        log::error!(target: "orgkit", "msg=\"unexpected rest response\", operation=\"{operation}\", error=\"{e}\"");
        BackendError::Decode(e.to_string())
    })
}
