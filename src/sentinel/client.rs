//! Azure Resource Manager client bound to one Log Analytics workspace

use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::auth::Credential;
use crate::config::api;
use crate::error::{AuditError, Result};
use crate::sentinel::traits::{ArmErrorResponse, PaginatedResponse};
use crate::sentinel::WorkspaceRef;

/// Upper bound on followed `nextLink`s for one listing
const MAX_PAGES: usize = 1000;

/// ARM client for Sentinel and Log Analytics calls
///
/// Owns the credential for the lifetime of the run.
pub struct SentinelClient {
    client: Client,
    credential: Credential,
    workspace: WorkspaceRef,
    base_url: String,
}

impl SentinelClient {
    /// Create a new client against the public ARM endpoint
    pub fn new(credential: Credential, workspace: WorkspaceRef) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            credential,
            workspace,
            base_url: api::MANAGEMENT_URL.to_string(),
        }
    }

    /// Point the client at a different ARM endpoint (sovereign clouds, mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn workspace(&self) -> &WorkspaceRef {
        &self.workspace
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an ARM path with an api-version
    pub(crate) fn url(&self, path: &str, api_version: &str) -> String {
        let separator = if path.contains('?') { "&" } else { "?" };
        format!(
            "{}{}{}api-version={}",
            self.base_url, path, separator, api_version
        )
    }

    /// Add standard headers to a request builder
    fn with_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if !self.credential.is_valid() {
            warn!(
                "Access token expired at {}; requests will likely be rejected",
                self.credential.expires_on()
            );
        }
        builder
            .bearer_auth(self.credential.access_token())
            .header("Content-Type", "application/json")
    }

    /// Create a GET request builder with standard headers
    pub(crate) fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.get(url))
    }

    /// Create a POST request builder with standard headers
    pub(crate) fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.with_headers(self.client.post(url))
    }

    /// Parse an API response, returning error for non-success status codes
    ///
    /// The service's own error message is kept when the body carries one.
    pub(crate) async fn parse_api_response<T>(
        &self,
        response: reqwest::Response,
        error_context: &str,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            return Err(api_error(response, error_context).await);
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            AuditError::Json(format!("Failed to parse {}: {}", error_context, e))
        })
    }

    /// Fetch every page of an ARM list endpoint
    ///
    /// Follows `nextLink` until it is absent; items keep page order.
    ///
    /// # Arguments
    /// * `path` - ARM path below the base URL
    /// * `api_version` - api-version for the first request (next links carry their own)
    /// * `error_context` - Context for error messages (e.g., "alert rules")
    pub async fn fetch_all_pages<T, R>(
        &self,
        path: &str,
        api_version: &str,
        error_context: &str,
    ) -> Result<Vec<T>>
    where
        R: DeserializeOwned + PaginatedResponse<T>,
    {
        let mut url = self.url(path, api_version);
        let mut items = Vec::new();

        for page in 1..=MAX_PAGES {
            debug!("Fetching page {} of {} from: {}", page, error_context, url);

            let response = self.get(&url).send().await?;
            let page_context = format!("{} (page {})", error_context, page);
            let resp: R = self.parse_api_response(response, &page_context).await?;

            let next = resp.next_link().map(str::to_string);
            let page_items = resp.into_value();
            debug!("Page {} returned {} items", page, page_items.len());
            items.extend(page_items);

            match next {
                Some(link) => url = link,
                None => {
                    debug!("Fetched {} total items for {}", items.len(), error_context);
                    return Ok(items);
                }
            }
        }

        Err(AuditError::Api {
            status: 200,
            message: format!(
                "Gave up listing {} after {} pages of nextLink",
                error_context, MAX_PAGES
            ),
        })
    }
}

/// Build an `AuditError::Api` from a failed response
pub(crate) async fn api_error(response: reqwest::Response, error_context: &str) -> AuditError {
    let status = response.status().as_u16();
    let detail = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<ArmErrorResponse>(&body).ok())
        .and_then(|body| body.error.summary());

    let message = match detail {
        Some(detail) => format!("Failed to fetch {}: {}", error_context, detail),
        None => format!("Failed to fetch {}", error_context),
    };
    AuditError::Api { status, message }
}

#[cfg(test)]
impl SentinelClient {
    /// Create a test client with mock base URL
    pub fn test_client(base_url: &str) -> Self {
        use crate::auth::CredentialSource;

        let credential = Credential::expiring_in(
            "test-token".to_string(),
            3600,
            CredentialSource::AzureCli {
                tenant: None,
                subscription: None,
            },
        );
        let workspace = WorkspaceRef::new("sub-1", "rg-sec", "law-sec");
        Self::new(credential, workspace).with_base_url(base_url)
    }
}
