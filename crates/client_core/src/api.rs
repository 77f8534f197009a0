//! HTTP access to the macro backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{MacroId, MacroRecord, MacroVersion},
    error::ApiErrorBody,
    protocol::{GenerateMacroRequest, ShareMacroRequest},
};
use tracing::debug;
use url::Url;

use crate::error::ClientError;

#[async_trait]
pub trait MacroApi: Send + Sync {
    async fn list_macros(&self, public_only: bool) -> Result<Vec<MacroRecord>, ClientError>;
    async fn list_versions(&self, macro_id: MacroId) -> Result<Vec<MacroVersion>, ClientError>;
    async fn set_share(&self, macro_id: MacroId, is_public: bool) -> Result<(), ClientError>;
    /// Returns the raw spreadsheet bytes produced by the backend.
    async fn generate(&self, request: &GenerateMacroRequest) -> Result<Vec<u8>, ClientError>;
}

pub struct HttpMacroApi {
    http: Client,
    base_url: Url,
}

impl HttpMacroApi {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(server_url, None)
    }

    pub fn with_timeout(server_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::ClientBuild)?;
        Ok(Self {
            http,
            base_url: normalize_base_url(server_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|source| ClientError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Vec<u8>, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(ClientError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                detail: ApiErrorBody::parse_detail(&body),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        debug!(endpoint, bytes = body.len(), "backend response received");
        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let endpoint = url.path().to_string();
        let body = self.send(&endpoint, self.http.get(url)).await?;
        serde_json::from_slice(&body).map_err(|source| ClientError::Decode { endpoint, source })
    }
}

#[async_trait]
impl MacroApi for HttpMacroApi {
    async fn list_macros(&self, public_only: bool) -> Result<Vec<MacroRecord>, ClientError> {
        let mut url = self.endpoint("macros")?;
        url.query_pairs_mut()
            .append_pair("public", if public_only { "true" } else { "false" });
        self.get_json(url).await
    }

    async fn list_versions(&self, macro_id: MacroId) -> Result<Vec<MacroVersion>, ClientError> {
        let url = self.endpoint(&format!("macros/{}/versions", macro_id.0))?;
        self.get_json(url).await
    }

    async fn set_share(&self, macro_id: MacroId, is_public: bool) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("macros/{}/share", macro_id.0))?;
        let endpoint = url.path().to_string();
        self.send(
            &endpoint,
            self.http.post(url).json(&ShareMacroRequest { is_public }),
        )
        .await?;
        Ok(())
    }

    async fn generate(&self, request: &GenerateMacroRequest) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint("generate-macro")?;
        let endpoint = url.path().to_string();
        self.send(&endpoint, self.http.post(url).json(request)).await
    }
}

/// Parses the server url and makes sure relative joins keep any path prefix.
pub fn normalize_base_url(server_url: &str) -> Result<Url, ClientError> {
    let trimmed = server_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|source| ClientError::InvalidUrl {
        url: trimmed.to_string(),
        source,
    })
}
