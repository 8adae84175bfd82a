//! Authentication method selection and fallback policy

use log::{debug, info, warn};

use crate::error::AuthError;
use crate::ui::{choose, Console};

use super::{AuthFlows, AuthMode, Credential};

/// Turns an [`AuthMode`] into a credential
///
/// `Cli`, `Browser` and `Device` run exactly one flow and never switch mode.
/// `Auto` tries the CLI session and falls back to the menu. `Unset` shows the
/// menu and resolves the chosen mode.
pub struct AuthResolver<F, C> {
    flows: F,
    console: C,
}

impl<F: AuthFlows, C: Console> AuthResolver<F, C> {
    pub fn new(flows: F, console: C) -> Self {
        Self { flows, console }
    }

    /// Resolve a credential for `mode`
    pub async fn resolve(&mut self, mode: AuthMode) -> Result<Credential, AuthError> {
        let mut mode = mode;
        loop {
            debug!("Resolving credential with mode '{}'", mode);
            match mode {
                AuthMode::Cli => {
                    self.console.say("🔄 Using Azure CLI authentication");
                    return self.flows.cli_session().await;
                }
                AuthMode::Browser => {
                    self.console.say("🌐 Using interactive browser authentication");
                    return self.flows.browser(&mut self.console).await;
                }
                AuthMode::Device => {
                    self.console.say("📱 Using device code authentication");
                    return self.flows.device_code(&mut self.console).await;
                }
                AuthMode::Auto => match self.flows.cli_session().await {
                    Ok(credential) => {
                        info!("Using existing Azure CLI session");
                        return Ok(credential);
                    }
                    Err(e) => {
                        warn!("Azure CLI session unavailable, falling back to menu: {}", e);
                        self.console
                            .say("⚠️  No usable Azure CLI session; choose another sign-in method.");
                        mode = AuthMode::Unset;
                    }
                },
                AuthMode::Unset => mode = self.prompt_for_mode()?,
            }
        }
    }

    fn prompt_for_mode(&mut self) -> Result<AuthMode, AuthError> {
        let labels: Vec<&str> = AuthMode::MENU.iter().map(AuthMode::label).collect();
        let index = choose(&mut self.console, "🔐 Azure Authentication", &labels)?;
        let mode = AuthMode::MENU[index];
        info!("Selected authentication mode '{}'", mode);
        Ok(mode)
    }

    /// Consume the resolver and return its console
    pub fn into_console(self) -> C {
        self.console
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialSource;
    use crate::ui::LineConsole;
    use std::cell::Cell;
    use std::io::Cursor;

    /// Flows with fixed outcomes that count how often each one ran
    struct FakeFlows {
        cli_logged_in: bool,
        gui: bool,
        cli_calls: Cell<u32>,
        browser_calls: Cell<u32>,
        device_calls: Cell<u32>,
        issued: Cell<u32>,
    }

    impl FakeFlows {
        fn new(cli_logged_in: bool, gui: bool) -> Self {
            Self {
                cli_logged_in,
                gui,
                cli_calls: Cell::new(0),
                browser_calls: Cell::new(0),
                device_calls: Cell::new(0),
                issued: Cell::new(0),
            }
        }

        fn issue(&self, source: CredentialSource) -> Credential {
            self.issued.set(self.issued.get() + 1);
            Credential::expiring_in(format!("token-{}", self.issued.get()), 3600, source)
        }
    }

    impl AuthFlows for FakeFlows {
        async fn cli_session(&self) -> Result<Credential, AuthError> {
            self.cli_calls.set(self.cli_calls.get() + 1);
            if self.cli_logged_in {
                Ok(self.issue(CredentialSource::AzureCli {
                    tenant: None,
                    subscription: None,
                }))
            } else {
                Err(AuthError::CliNotLoggedIn("Please run 'az login'".to_string()))
            }
        }

        async fn browser(&self, _console: &mut dyn Console) -> Result<Credential, AuthError> {
            self.browser_calls.set(self.browser_calls.get() + 1);
            if self.gui {
                Ok(self.issue(CredentialSource::Browser {
                    redirect_port: 8400,
                }))
            } else {
                Err(AuthError::NoGuiEnvironment("no DISPLAY".to_string()))
            }
        }

        async fn device_code(&self, console: &mut dyn Console) -> Result<Credential, AuthError> {
            self.device_calls.set(self.device_calls.get() + 1);
            console.say("open https://microsoft.com/devicelogin and enter the code TEST-CODE");
            Ok(self.issue(CredentialSource::DeviceCode {
                user_code: "TEST-CODE".to_string(),
                verification_uri: "https://microsoft.com/devicelogin".to_string(),
            }))
        }
    }

    type TestResolver = AuthResolver<FakeFlows, LineConsole<Cursor<String>, Vec<u8>>>;

    fn resolver(flows: FakeFlows, input: &str) -> TestResolver {
        AuthResolver::new(flows, LineConsole::new(Cursor::new(input.to_string()), Vec::new()))
    }

    fn output(resolver: TestResolver) -> String {
        String::from_utf8(resolver.into_console().into_writer()).unwrap()
    }

    #[tokio::test]
    async fn test_cli_mode_without_session_fails_and_never_switches() {
        let mut r = resolver(FakeFlows::new(false, true), "1\n2\n");
        let err = r.resolve(AuthMode::Cli).await.unwrap_err();

        assert!(matches!(err, AuthError::CliNotLoggedIn(_)));
        assert_eq!(r.flows.cli_calls.get(), 1);
        assert_eq!(r.flows.browser_calls.get(), 0);
        assert_eq!(r.flows.device_calls.get(), 0);
        assert!(!output(r).contains("Enter your choice"));
    }

    #[tokio::test]
    async fn test_cli_mode_with_session() {
        let mut r = resolver(FakeFlows::new(true, false), "");
        let cred = r.resolve(AuthMode::Cli).await.unwrap();
        assert!(matches!(cred.source(), CredentialSource::AzureCli { .. }));
    }

    #[tokio::test]
    async fn test_auto_with_session_skips_menu() {
        let mut r = resolver(FakeFlows::new(true, false), "");
        let cred = r.resolve(AuthMode::Auto).await.unwrap();
        assert!(matches!(cred.source(), CredentialSource::AzureCli { .. }));
        assert!(!output(r).contains("Enter your choice"));
    }

    #[tokio::test]
    async fn test_auto_without_session_falls_through_to_menu() {
        let mut r = resolver(FakeFlows::new(false, false), "2\n");
        let cred = r.resolve(AuthMode::Auto).await.unwrap();

        assert!(matches!(cred.source(), CredentialSource::DeviceCode { .. }));
        assert_eq!(r.flows.cli_calls.get(), 1);
        assert_eq!(r.flows.device_calls.get(), 1);
        let out = output(r);
        assert!(out.contains("No usable Azure CLI session"));
        assert!(out.contains("Enter your choice (1-4)"));
    }

    #[tokio::test]
    async fn test_unset_menu_choice_two_runs_device_flow() {
        let mut r = resolver(FakeFlows::new(true, true), "2\n");
        let cred = r.resolve(AuthMode::Unset).await.unwrap();

        assert!(matches!(cred.source(), CredentialSource::DeviceCode { .. }));
        assert_eq!(r.flows.cli_calls.get(), 0);
        let out = output(r);
        assert!(out.contains("https://microsoft.com/devicelogin"));
        assert!(out.contains("TEST-CODE"));
    }

    #[tokio::test]
    async fn test_unset_menu_reprompts_on_every_invalid_input() {
        let inputs = ["0", "5", "x", "", "-2", "1.5", "device", "22"];
        let script = format!("{}\n3\n", inputs.join("\n"));
        let mut r = resolver(FakeFlows::new(true, true), &script);

        let cred = r.resolve(AuthMode::Unset).await.unwrap();

        assert!(matches!(cred.source(), CredentialSource::AzureCli { .. }));
        let out = output(r);
        assert_eq!(out.matches("❌ Invalid choice").count(), inputs.len());
    }

    #[tokio::test]
    async fn test_unset_menu_choice_auto_loops_back_when_cli_missing() {
        let mut r = resolver(FakeFlows::new(false, true), "4\n1\n");
        let cred = r.resolve(AuthMode::Unset).await.unwrap();

        assert!(matches!(cred.source(), CredentialSource::Browser { .. }));
        assert_eq!(r.flows.cli_calls.get(), 1);
        assert_eq!(output(r).matches("Enter your choice").count(), 2);
    }

    #[tokio::test]
    async fn test_unset_menu_closed_input_is_cancelled() {
        let mut r = resolver(FakeFlows::new(true, true), "9\n");
        let err = r.resolve(AuthMode::Unset).await.unwrap_err();
        assert_eq!(err, AuthError::Cancelled);
    }

    #[tokio::test]
    async fn test_browser_without_display_fails_with_device_hint() {
        let mut r = resolver(FakeFlows::new(true, false), "2\n");
        let err = r.resolve(AuthMode::Browser).await.unwrap_err();

        assert!(matches!(err, AuthError::NoGuiEnvironment(_)));
        assert!(err.to_string().contains("device"));
        assert_eq!(r.flows.device_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_each_run_acquires_its_own_credential() {
        let flows = FakeFlows::new(true, true);
        let console = || LineConsole::new(Cursor::new(String::new()), Vec::new());

        let mut first = AuthResolver::new(&flows, console());
        let a = first.resolve(AuthMode::Cli).await.unwrap();
        let mut second = AuthResolver::new(&flows, console());
        let b = second.resolve(AuthMode::Cli).await.unwrap();

        assert_eq!(flows.cli_calls.get(), 2);
        assert_eq!(a.access_token(), "token-1");
        assert_eq!(b.access_token(), "token-2");
    }
}
