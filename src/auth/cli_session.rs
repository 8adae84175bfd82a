//! Reuse of an existing Azure CLI login

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use log::debug;
use serde::Deserialize;
use tokio::process::Command;

use crate::config::auth;
use crate::error::AuthError;

use super::{Credential, CredentialSource};

/// Program name of the Azure CLI
const AZ_PROGRAM: &str = "az";

/// `expiresOn` as printed by the Azure CLI (local time)
const AZ_EXPIRES_ON_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Output of `az account get-access-token --output json`
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CliAccessToken {
    access_token: String,
    expires_on: Option<String>,
    /// Unix timestamp, emitted by az 2.54 and later
    #[serde(rename = "expires_on")]
    expires_on_unix: Option<i64>,
    subscription: Option<String>,
    tenant: Option<String>,
}

/// Token source backed by `az account get-access-token`
pub struct AzureCliSession {
    program: PathBuf,
    tenant: Option<String>,
}

impl AzureCliSession {
    pub fn new(tenant: Option<String>) -> Self {
        Self {
            program: PathBuf::from(AZ_PROGRAM),
            tenant,
        }
    }

    /// Use a specific executable instead of `az` from PATH
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Get a management token from the logged-in CLI session
    pub async fn acquire(&self) -> Result<Credential, AuthError> {
        let mut command = self.command();
        command.args([
            "account",
            "get-access-token",
            "--resource",
            auth::MANAGEMENT_RESOURCE,
            "--output",
            "json",
        ]);
        if let Some(tenant) = &self.tenant {
            command.args(["--tenant", tenant]);
        }

        debug!("Requesting token from Azure CLI ({})", self.program.display());

        let output = command.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AuthError::CliNotLoggedIn("Azure CLI ('az') is not installed or not on PATH".into())
            } else {
                AuthError::CliNotLoggedIn(format!("failed to run Azure CLI: {}", e))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let summary = stderr
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("no error output");
            return Err(AuthError::CliNotLoggedIn(format!(
                "az exited with {}: {}",
                output.status, summary
            )));
        }

        parse_token_output(&output.stdout)
    }

    fn command(&self) -> Command {
        // az is a batch script on Windows and has to go through cmd
        if cfg!(windows) && self.program.as_os_str() == AZ_PROGRAM {
            let mut command = Command::new("cmd");
            command.arg("/C").arg(&self.program);
            command
        } else {
            Command::new(&self.program)
        }
    }
}

/// Turn `az account get-access-token` JSON into a credential
fn parse_token_output(stdout: &[u8]) -> Result<Credential, AuthError> {
    let token: CliAccessToken = serde_json::from_slice(stdout)
        .map_err(|e| AuthError::CliNotLoggedIn(format!("unexpected output from az: {}", e)))?;

    let expires_on = expiry_of(&token).ok_or_else(|| {
        AuthError::CliNotLoggedIn("az did not report when the token expires".to_string())
    })?;

    debug!(
        "Azure CLI token for tenant {:?} expires {}",
        token.tenant, expires_on
    );

    Ok(Credential::new(
        token.access_token,
        expires_on,
        CredentialSource::AzureCli {
            tenant: token.tenant,
            subscription: token.subscription,
        },
    ))
}

fn expiry_of(token: &CliAccessToken) -> Option<DateTime<Utc>> {
    if let Some(secs) = token.expires_on_unix {
        return DateTime::from_timestamp(secs, 0);
    }
    let raw = token.expires_on.as_deref()?;
    let naive = NaiveDateTime::parse_from_str(raw, AZ_EXPIRES_ON_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
