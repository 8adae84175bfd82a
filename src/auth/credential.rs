//! Access token held for the duration of one run

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Which flow produced a credential, with only the data that flow has
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// `az account get-access-token`
    AzureCli {
        tenant: Option<String>,
        subscription: Option<String>,
    },
    /// Authorization code flow through the system browser
    Browser { redirect_port: u16 },
    /// Device code flow
    DeviceCode {
        user_code: String,
        verification_uri: String,
    },
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::AzureCli { .. } => write!(f, "Azure CLI session"),
            CredentialSource::Browser { .. } => write!(f, "interactive browser login"),
            CredentialSource::DeviceCode { .. } => write!(f, "device code login"),
        }
    }
}

/// Bearer token for Azure Resource Manager
///
/// Not `Clone` and never persisted; lives for one process run.
pub struct Credential {
    access_token: String,
    expires_on: DateTime<Utc>,
    source: CredentialSource,
}

impl Credential {
    pub fn new(access_token: String, expires_on: DateTime<Utc>, source: CredentialSource) -> Self {
        Self {
            access_token,
            expires_on,
            source,
        }
    }

    /// Build from a token endpoint response's `expires_in` seconds
    pub fn expiring_in(access_token: String, expires_in_secs: u64, source: CredentialSource) -> Self {
        let expires_on = i64::try_from(expires_in_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(access_token, expires_on, source)
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_on(&self) -> DateTime<Utc> {
        self.expires_on
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    /// Whether the token is still usable at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && now < self.expires_on
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .field("source", &self.source)
            .finish()
    }
}
