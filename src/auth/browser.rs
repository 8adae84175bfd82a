//! Interactive browser login (authorization code + PKCE, loopback redirect)

use std::collections::HashMap;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use log::{debug, info};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::error::AuthError;
use crate::ui::Console;

use super::identity::IdentityClient;
use super::{Credential, CredentialSource};

const SUCCESS_PAGE: &str = "<html><body><h2>Authentication complete.</h2>\
<p>You can close this window and return to the terminal.</p></body></html>";

const FAILURE_PAGE: &str = "<html><body><h2>Authentication failed.</h2>\
<p>Return to the terminal for details.</p></body></html>";

/// Opens URLs in a browser
pub trait BrowserLauncher {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// The platform's default browser
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> std::io::Result<()> {
        let mut command = if cfg!(windows) {
            let mut c = Command::new("rundll32");
            c.arg("url.dll,FileProtocolHandler");
            c
        } else if cfg!(target_os = "macos") {
            Command::new("open")
        } else {
            Command::new("xdg-open")
        };

        command
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
    }
}

/// PKCE verifier and its S256 challenge
#[derive(Debug, Clone)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    pub fn generate() -> Self {
        Self::from_verifier(random_token(32))
    }

    pub fn from_verifier(verifier: String) -> Self {
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }
}

/// URL-safe random string from `bytes` bytes of entropy
fn random_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// Run the browser flow
///
/// Fails with [`AuthError::NoGuiEnvironment`] when there is no display or the
/// browser cannot be started, and with [`AuthError::Timeout`] when the
/// redirect does not arrive within `timeout`.
pub async fn browser_login<L, C>(
    identity: &IdentityClient,
    launcher: &L,
    console: &mut C,
    gui_available: bool,
    timeout: Duration,
) -> Result<Credential, AuthError>
where
    L: BrowserLauncher + ?Sized,
    C: Console + ?Sized,
{
    if !gui_available {
        return Err(AuthError::NoGuiEnvironment(
            "no graphical display detected (DISPLAY and WAYLAND_DISPLAY are unset)".to_string(),
        ));
    }

    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .map_err(|e| AuthError::NoGuiEnvironment(format!("cannot listen for the redirect: {}", e)))?;
    let port = listener
        .local_addr()
        .map_err(|e| AuthError::NoGuiEnvironment(format!("cannot listen for the redirect: {}", e)))?
        .port();
    let redirect_uri = format!("http://localhost:{}", port);

    let pkce = Pkce::generate();
    let state = random_token(16);
    let url = identity.authorize_url(&redirect_uri, &state, &pkce.challenge);

    debug!("Waiting for browser redirect on {}", redirect_uri);
    console.say("🌐 Opening a browser window for sign-in...");
    console.say(&format!("   If it does not open, visit: {}", url));

    launcher
        .open(&url)
        .map_err(|e| AuthError::NoGuiEnvironment(format!("could not start a browser: {}", e)))?;

    let code = wait_for_redirect(listener, &state, timeout).await?;

    let token = identity
        .exchange_authorization_code(&code, &redirect_uri, &pkce.verifier)
        .await?;

    info!("Browser sign-in completed");
    Ok(Credential::expiring_in(
        token.access_token,
        token.expires_in,
        CredentialSource::Browser {
            redirect_port: port,
        },
    ))
}

/// What the redirect handler hands back to the waiting login
type RedirectOutcome = Result<String, AuthError>;

struct RedirectState {
    expected_state: String,
    outcome: Mutex<Option<oneshot::Sender<RedirectOutcome>>>,
}

/// Serve the redirect URI on `listener` until the authorization response arrives
///
/// Connections are served concurrently, so idle or speculative browser
/// connections do not hold up the real redirect.
async fn wait_for_redirect(
    listener: TcpListener,
    expected_state: &str,
    timeout: Duration,
) -> RedirectOutcome {
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let state = Arc::new(RedirectState {
        expected_state: expected_state.to_string(),
        outcome: Mutex::new(Some(outcome_tx)),
    });
    let app = Router::new()
        .route("/", get(handle_redirect))
        .with_state(state);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
        {
            debug!("Loopback redirect server stopped: {}", e);
        }
    });

    let received = tokio::time::timeout(timeout, outcome_rx).await;
    let _ = shutdown_tx.send(());

    match received {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(_)) => Err(AuthError::Network(
            "loopback redirect server stopped unexpectedly".to_string(),
        )),
        Err(_) => Err(AuthError::Timeout(format!(
            "no browser sign-in within {} seconds",
            timeout.as_secs()
        ))),
    }
}

async fn handle_redirect(
    State(state): State<Arc<RedirectState>>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Html<&'static str>) {
    let Some(outcome) = callback_outcome(&params, &state.expected_state) else {
        // favicon and other stray requests
        return (StatusCode::NOT_FOUND, Html(""));
    };

    let status = if outcome.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    let page = if outcome.is_ok() { SUCCESS_PAGE } else { FAILURE_PAGE };

    let sender = state.outcome.lock().ok().and_then(|mut slot| slot.take());
    match sender {
        Some(tx) => {
            let _ = tx.send(outcome);
        }
        None => debug!("Ignoring repeated redirect"),
    }
    (status, Html(page))
}

/// Interpret the redirect query; `None` when it carries no authorization response
fn callback_outcome(
    params: &HashMap<String, String>,
    expected_state: &str,
) -> Option<RedirectOutcome> {
    if let Some(error) = params.get("error") {
        let detail = params
            .get("error_description")
            .map(|d| format!("{}: {}", error, d))
            .unwrap_or_else(|| error.clone());
        return Some(Err(AuthError::Provider(detail)));
    }

    let code = params.get("code")?;
    if params.get("state").map(String::as_str) != Some(expected_state) {
        return Some(Err(AuthError::Provider(
            "redirect state did not match the login request".to_string(),
        )));
    }
    Some(Ok(code.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::LineConsole;
    use std::io::Cursor;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Launcher that plays the browser: follows the redirect with the given query
    struct RedirectingBrowser {
        query: fn(&str) -> String,
        idle_connection_first: bool,
        opened: Mutex<Vec<String>>,
    }

    impl RedirectingBrowser {
        fn new(query: fn(&str) -> String) -> Self {
            Self {
                query,
                idle_connection_first: false,
                opened: Mutex::new(Vec::new()),
            }
        }

        /// Opens a speculative connection and leaves it idle, as Chromium does
        fn with_idle_connection(mut self) -> Self {
            self.idle_connection_first = true;
            self
        }
    }

    fn param(url: &str, name: &str) -> String {
        reqwest::Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    impl BrowserLauncher for RedirectingBrowser {
        fn open(&self, url: &str) -> std::io::Result<()> {
            self.opened.lock().unwrap().push(url.to_string());
            let redirect = param(url, "redirect_uri");
            let port = reqwest::Url::parse(&redirect).unwrap().port().unwrap();
            let callback = format!("{}/?{}", redirect, (self.query)(&param(url, "state")));
            let idle_first = self.idle_connection_first;
            tokio::spawn(async move {
                let idle = if idle_first {
                    Some(tokio::net::TcpStream::connect(("127.0.0.1", port)).await.unwrap())
                } else {
                    None
                };
                let _ = reqwest::get(callback).await;
                drop(idle);
            });
            Ok(())
        }
    }

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    struct BrokenBrowser;

    impl BrowserLauncher for BrokenBrowser {
        fn open(&self, _url: &str) -> std::io::Result<()> {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "xdg-open not found",
            ))
        }
    }

    fn identity(server: &MockServer) -> IdentityClient {
        IdentityClient::new(&server.uri(), "organizations", "client", "scope")
    }

    fn console() -> LineConsole<Cursor<&'static str>, Vec<u8>> {
        LineConsole::new(Cursor::new(""), Vec::new())
    }

    #[test]
    fn test_pkce_challenge_matches_rfc7636_example() {
        let pkce = Pkce::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string());
        assert_eq!(pkce.challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn test_generated_verifier_length() {
        let pkce = Pkce::generate();
        assert_eq!(pkce.verifier.len(), 43);
        assert_ne!(Pkce::generate().verifier, pkce.verifier);
    }

    #[test]
    fn test_callback_outcome_code() {
        let params = query(&[("code", "0.AX/abc"), ("state", "xyz"), ("session_state", "s")]);
        assert_eq!(
            callback_outcome(&params, "xyz"),
            Some(Ok("0.AX/abc".to_string()))
        );
    }

    #[test]
    fn test_callback_outcome_ignores_stray_requests() {
        assert_eq!(callback_outcome(&query(&[]), "xyz"), None);
        assert_eq!(callback_outcome(&query(&[("state", "xyz")]), "xyz"), None);
    }

    #[test]
    fn test_callback_outcome_error_without_description() {
        assert_eq!(
            callback_outcome(&query(&[("error", "access_denied")]), "xyz"),
            Some(Err(AuthError::Provider("access_denied".to_string())))
        );
    }

    #[tokio::test]
    async fn test_no_gui_fails_before_opening_browser() {
        let server = MockServer::start().await;
        let browser = RedirectingBrowser::new(|state| format!("code=c&state={}", state));

        let err = browser_login(
            &identity(&server),
            &browser,
            &mut console(),
            false,
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AuthError::NoGuiEnvironment(_)));
        assert!(err.to_string().contains("device"));
        assert!(browser.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_browser_that_cannot_start_is_no_gui() {
        let server = MockServer::start().await;
        let err = browser_login(
            &identity(&server),
            &BrokenBrowser,
            &mut console(),
            true,
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::NoGuiEnvironment(ref m) if m.contains("xdg-open")));
    }

    #[tokio::test]
    async fn test_browser_login_exchanges_redirect_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/organizations/oauth2/v2.0/token"))
            .and(body_string_contains("code=auth-code-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "browser-token",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let browser = RedirectingBrowser::new(|state| format!("code=auth-code-1&state={}", state));
        let cred = browser_login(
            &identity(&server),
            &browser,
            &mut console(),
            true,
            Duration::from_secs(10),
        )
        .await
        .unwrap();

        assert_eq!(cred.access_token(), "browser-token");
        assert!(matches!(cred.source(), CredentialSource::Browser { .. }));
        let opened = browser.opened.lock().unwrap();
        assert!(opened[0].contains("code_challenge="));
    }

    #[tokio::test]
    async fn test_idle_browser_connection_does_not_block_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/organizations/oauth2/v2.0/token"))
            .and(body_string_contains("code=c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "after-idle",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let browser = RedirectingBrowser::new(|state| format!("code=c1&state={}", state))
            .with_idle_connection();
        let cred = browser_login(
            &identity(&server),
            &browser,
            &mut console(),
            true,
            Duration::from_secs(3),
        )
        .await
        .unwrap();
        assert_eq!(cred.access_token(), "after-idle");
    }

    #[tokio::test]
    async fn test_state_mismatch_is_rejected() {
        let server = MockServer::start().await;
        let browser = RedirectingBrowser::new(|_| "code=c&state=forged".to_string());

        let err = browser_login(
            &identity(&server),
            &browser,
            &mut console(),
            true,
            Duration::from_secs(10),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::Provider(ref m) if m.contains("state")));
    }

    #[tokio::test]
    async fn test_provider_error_in_redirect() {
        let server = MockServer::start().await;
        let browser = RedirectingBrowser::new(|_| {
            "error=access_denied&error_description=User+cancelled".to_string()
        });

        let err = browser_login(
            &identity(&server),
            &browser,
            &mut console(),
            true,
            Duration::from_secs(10),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err,
            AuthError::Provider("access_denied: User cancelled".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_redirect_times_out() {
        struct SilentBrowser;
        impl BrowserLauncher for SilentBrowser {
            fn open(&self, _url: &str) -> std::io::Result<()> {
                Ok(())
            }
        }

        let server = MockServer::start().await;
        let err = browser_login(
            &identity(&server),
            &SilentBrowser,
            &mut console(),
            true,
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::Timeout(_)));
    }
}
