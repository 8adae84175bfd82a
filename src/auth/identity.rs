//! Microsoft identity platform (v2.0) endpoints used by the interactive flows

use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::AuthError;

/// Device authorization response
#[derive(Deserialize, Debug, Clone)]
pub struct DeviceCodeChallenge {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    /// Seconds between token polls
    #[serde(default = "default_poll_interval")]
    pub interval: u64,
    /// Seconds until the device code expires
    pub expires_in: u64,
    /// Ready-made instructions from the provider
    #[serde(default)]
    pub message: Option<String>,
}

fn default_poll_interval() -> u64 {
    5
}

/// Successful token endpoint response
#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// OAuth error body
#[derive(Deserialize, Debug)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenErrorResponse {
    /// Error code plus the first line of the description (the rest is trace ids)
    fn summary(&self) -> String {
        match self
            .error_description
            .as_deref()
            .and_then(|d| d.lines().next())
        {
            Some(desc) if !desc.trim().is_empty() => format!("{}: {}", self.error, desc.trim()),
            _ => self.error.clone(),
        }
    }
}

/// Outcome of one device code token poll
#[derive(Debug)]
pub enum DevicePoll {
    /// User has not finished signing in yet
    Pending,
    /// Provider asks to poll less often
    SlowDown,
    /// Sign-in complete
    Issued(TokenResponse),
}

/// Client for the authorize, devicecode and token endpoints of one tenant
pub struct IdentityClient {
    client: Client,
    authority: String,
    tenant: String,
    client_id: String,
    scope: String,
}

impl IdentityClient {
    pub fn new(authority: &str, tenant: &str, client_id: &str, scope: &str) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            authority: authority.trim_end_matches('/').to_string(),
            tenant: tenant.to_string(),
            client_id: client_id.to_string(),
            scope: scope.to_string(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}/oauth2/v2.0/{}", self.authority, self.tenant, name)
    }

    /// Authorization URL for the browser flow (PKCE S256)
    pub fn authorize_url(&self, redirect_uri: &str, state: &str, code_challenge: &str) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&response_mode=query&scope={}&state={}&code_challenge={}&code_challenge_method=S256&prompt=select_account",
            self.endpoint("authorize"),
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&self.scope),
            urlencoding::encode(state),
            urlencoding::encode(code_challenge),
        )
    }

    /// Start a device code login
    pub async fn request_device_code(&self) -> Result<DeviceCodeChallenge, AuthError> {
        let url = self.endpoint("devicecode");
        debug!("Requesting device code from: {}", url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Poll the token endpoint once for a pending device code
    pub async fn poll_device_code(&self, device_code: &str) -> Result<DevicePoll, AuthError> {
        let response = self
            .client
            .post(self.endpoint("token"))
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
                ("client_id", self.client_id.as_str()),
                ("device_code", device_code),
            ])
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(DevicePoll::Issued(response.json().await?));
        }

        let status = response.status().as_u16();
        let body: TokenErrorResponse = match response.json().await {
            Ok(body) => body,
            Err(_) => {
                return Err(AuthError::Provider(format!(
                    "token endpoint returned status {}",
                    status
                )))
            }
        };

        match body.error.as_str() {
            "authorization_pending" => Ok(DevicePoll::Pending),
            "slow_down" => Ok(DevicePoll::SlowDown),
            "expired_token" | "code_expired" => Err(AuthError::Timeout(
                "the device code expired before sign-in completed".to_string(),
            )),
            _ => Err(AuthError::Provider(body.summary())),
        }
    }

    /// Redeem an authorization code from the browser redirect
    pub async fn exchange_authorization_code(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, AuthError> {
        let url = self.endpoint("token");
        debug!("Exchanging authorization code at: {}", url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("code_verifier", code_verifier),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        Ok(response.json().await?)
    }
}

async fn provider_error(response: reqwest::Response) -> AuthError {
    let status = response.status().as_u16();
    match response.json::<TokenErrorResponse>().await {
        Ok(body) => AuthError::Provider(body.summary()),
        Err(_) => AuthError::Provider(format!("identity provider returned status {}", status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> IdentityClient {
        IdentityClient::new(
            &server.uri(),
            "organizations",
            "client-123",
            "https://management.azure.com/.default",
        )
    }

    #[test]
    fn test_authorize_url_encodes_parameters() {
        let client = IdentityClient::new(
            "https://login.microsoftonline.com/",
            "contoso.onmicrosoft.com",
            "client-123",
            "https://management.azure.com/.default",
        );
        let url = client.authorize_url("http://localhost:8400", "st&ate", "chal");
        assert!(url.starts_with(
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/oauth2/v2.0/authorize?"
        ));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8400"));
        assert!(url.contains("scope=https%3A%2F%2Fmanagement.azure.com%2F.default"));
        assert!(url.contains("state=st%26ate"));
        assert!(url.contains("code_challenge_method=S256"));
    }

    #[test]
    fn test_error_summary_keeps_first_line() {
        let body = TokenErrorResponse {
            error: "invalid_grant".to_string(),
            error_description: Some("AADSTS70000: bad grant\r\nTrace ID: 123".to_string()),
        };
        assert_eq!(body.summary(), "invalid_grant: AADSTS70000: bad grant");
    }

    #[tokio::test]
    async fn test_request_device_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/organizations/oauth2/v2.0/devicecode"))
            .and(body_string_contains("client_id=client-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "device_code": "dev-code",
                "user_code": "ABCD-1234",
                "verification_uri": "https://microsoft.com/devicelogin",
                "expires_in": 900,
                "message": "To sign in, use a web browser..."
            })))
            .mount(&server)
            .await;

        let challenge = client_for(&server).request_device_code().await.unwrap();
        assert_eq!(challenge.user_code, "ABCD-1234");
        assert_eq!(challenge.interval, 5);
        assert_eq!(challenge.expires_in, 900);
    }

    #[tokio::test]
    async fn test_poll_maps_oauth_errors() {
        let server = MockServer::start().await;
        for (device_code, error) in [
            ("pending", "authorization_pending"),
            ("slow", "slow_down"),
            ("expired", "expired_token"),
            ("declined", "authorization_declined"),
        ] {
            Mock::given(method("POST"))
                .and(path("/organizations/oauth2/v2.0/token"))
                .and(body_string_contains(format!("device_code={}", device_code)))
                .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                    "error": error,
                    "error_description": format!("AADSTS: {}", error)
                })))
                .mount(&server)
                .await;
        }

        let client = client_for(&server);
        assert!(matches!(
            client.poll_device_code("pending").await,
            Ok(DevicePoll::Pending)
        ));
        assert!(matches!(
            client.poll_device_code("slow").await,
            Ok(DevicePoll::SlowDown)
        ));
        assert!(matches!(
            client.poll_device_code("expired").await,
            Err(AuthError::Timeout(_))
        ));
        assert!(matches!(
            client.poll_device_code("declined").await,
            Err(AuthError::Provider(ref m)) if m.contains("authorization_declined")
        ));
    }

    #[tokio::test]
    async fn test_exchange_authorization_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/organizations/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code_verifier=verifier-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "browser-token",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;

        let token = client_for(&server)
            .exchange_authorization_code("code-1", "http://localhost:1234", "verifier-1")
            .await
            .unwrap();
        assert_eq!(token.access_token, "browser-token");
        assert_eq!(token.expires_in, 3599);
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_network_error() {
        let client = IdentityClient::new("http://127.0.0.1:9", "t", "c", "s");
        assert!(matches!(
            client.request_device_code().await,
            Err(AuthError::Network(_))
        ));
    }
}
