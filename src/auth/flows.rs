//! The concrete credential flows behind the resolver

use std::time::Duration;

use crate::config::{auth, EnvironmentConfig};
use crate::error::AuthError;
use crate::ui::Console;

use super::browser::{browser_login, BrowserLauncher, SystemBrowser};
use super::cli_session::AzureCliSession;
use super::device::device_code_login;
use super::identity::IdentityClient;
use super::Credential;

/// The three ways of obtaining a credential
///
/// The resolver only decides which one to call; implementations do the work.
#[allow(async_fn_in_trait)]
pub trait AuthFlows {
    /// Reuse an existing Azure CLI session
    async fn cli_session(&self) -> Result<Credential, AuthError>;

    /// Sign in through the system browser
    async fn browser(&self, console: &mut dyn Console) -> Result<Credential, AuthError>;

    /// Sign in with a device code shown on `console`
    async fn device_code(&self, console: &mut dyn Console) -> Result<Credential, AuthError>;
}

impl<F: AuthFlows + ?Sized> AuthFlows for &F {
    async fn cli_session(&self) -> Result<Credential, AuthError> {
        (**self).cli_session().await
    }

    async fn browser(&self, console: &mut dyn Console) -> Result<Credential, AuthError> {
        (**self).browser(console).await
    }

    async fn device_code(&self, console: &mut dyn Console) -> Result<Credential, AuthError> {
        (**self).device_code(console).await
    }
}

/// Identity settings shared by all flows
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub authority: String,
    pub tenant: String,
    pub tenant_explicit: bool,
    pub client_id: String,
    pub scope: String,
    pub gui_available: bool,
    pub browser_timeout: Duration,
}

impl AuthSettings {
    /// Settings from the startup environment, with platform defaults
    pub fn from_env(env: &EnvironmentConfig) -> Self {
        Self {
            authority: auth::AUTHORITY_URL.to_string(),
            tenant: env.tenant_id().unwrap_or(auth::DEFAULT_TENANT).to_string(),
            tenant_explicit: env.tenant_id().is_some(),
            client_id: env
                .client_id()
                .unwrap_or(auth::DEFAULT_CLIENT_ID)
                .to_string(),
            scope: auth::MANAGEMENT_SCOPE.to_string(),
            gui_available: env.gui_available(),
            browser_timeout: auth::BROWSER_LOGIN_TIMEOUT,
        }
    }
}

/// Flows against Azure: `az` CLI, system browser and device code
pub struct AzureFlows<L = SystemBrowser> {
    settings: AuthSettings,
    identity: IdentityClient,
    cli: AzureCliSession,
    launcher: L,
}

impl AzureFlows<SystemBrowser> {
    pub fn new(settings: AuthSettings) -> Self {
        Self::with_launcher(settings, SystemBrowser)
    }
}

impl<L: BrowserLauncher> AzureFlows<L> {
    pub fn with_launcher(settings: AuthSettings, launcher: L) -> Self {
        let identity = IdentityClient::new(
            &settings.authority,
            &settings.tenant,
            &settings.client_id,
            &settings.scope,
        );
        let cli_tenant = settings
            .tenant_explicit
            .then(|| settings.tenant.clone());
        Self {
            identity,
            cli: AzureCliSession::new(cli_tenant),
            launcher,
            settings,
        }
    }
}

impl<L: BrowserLauncher> AuthFlows for AzureFlows<L> {
    async fn cli_session(&self) -> Result<Credential, AuthError> {
        self.cli.acquire().await
    }

    async fn browser(&self, console: &mut dyn Console) -> Result<Credential, AuthError> {
        browser_login(
            &self.identity,
            &self.launcher,
            console,
            self.settings.gui_available,
            self.settings.browser_timeout,
        )
        .await
    }

    async fn device_code(&self, console: &mut dyn Console) -> Result<Credential, AuthError> {
        device_code_login(&self.identity, console).await
    }
}
