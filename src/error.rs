use std::fmt;

/// Authentication failures
///
/// `InvalidSelection` is recovered locally by re-prompting; every other
/// variant is terminal for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No usable Azure CLI session
    CliNotLoggedIn(String),
    /// Browser login impossible (no display, or the browser failed to start)
    NoGuiEnvironment(String),
    /// Device code expired or the browser redirect never arrived
    Timeout(String),
    /// Menu input that is not one of the offered numbers
    InvalidSelection(String),
    /// Could not reach the identity provider
    Network(String),
    /// The identity provider rejected the request
    Provider(String),
    /// Input closed before a method was chosen
    Cancelled,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::CliNotLoggedIn(detail) => write!(
                f,
                "No Azure CLI session available: {}\n\
                 Run 'az login' first, or try --auth-mode device instead.",
                detail
            ),
            AuthError::NoGuiEnvironment(detail) => write!(
                f,
                "Browser login is not possible here: {}\n\
                 Try device mode instead: --auth-mode device (or AUTH_MODE=device).",
                detail
            ),
            AuthError::Timeout(detail) => write!(
                f,
                "Authentication timed out: {}\nRun the command again to get a new code.",
                detail
            ),
            AuthError::InvalidSelection(input) => write!(f, "Invalid choice '{}'.", input),
            AuthError::Network(detail) => {
                write!(f, "Could not reach the identity provider: {}", detail)
            }
            AuthError::Provider(detail) => {
                write!(f, "The identity provider rejected the login: {}", detail)
            }
            AuthError::Cancelled => write!(f, "Authentication cancelled by user"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network(err.to_string())
    }
}

/// Custom error type for audit operations
#[derive(Debug)]
pub enum AuditError {
    /// Authentication failed
    Auth(AuthError),
    /// HTTP request failed
    Http(reqwest::Error),
    /// API returned an error response
    Api { status: u16, message: String },
    /// JSON parsing error
    Json(String),
    /// CSV serialization error
    Csv(String),
    /// File system error
    Io(std::io::Error),
    /// Configuration error
    Config(String),
    /// Launcher cancelled or a report process failed
    Launch(String),
}

impl AuditError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            AuditError::Auth(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditError::Auth(e) => write!(f, "{}", e),
            AuditError::Http(e) => write!(f, "HTTP request failed: {}", e),
            AuditError::Api { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            AuditError::Json(msg) => write!(f, "JSON error: {}", msg),
            AuditError::Csv(msg) => write!(f, "CSV error: {}", msg),
            AuditError::Io(e) => write!(f, "I/O error: {}", e),
            AuditError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AuditError::Launch(msg) => write!(f, "Launcher: {}", msg),
        }
    }
}

impl std::error::Error for AuditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuditError::Auth(e) => Some(e),
            AuditError::Http(e) => Some(e),
            AuditError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AuthError> for AuditError {
    fn from(err: AuthError) -> Self {
        AuditError::Auth(err)
    }
}

impl From<reqwest::Error> for AuditError {
    fn from(err: reqwest::Error) -> Self {
        AuditError::Http(err)
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        AuditError::Json(err.to_string())
    }
}

impl From<csv::Error> for AuditError {
    fn from(err: csv::Error) -> Self {
        AuditError::Csv(err.to_string())
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        AuditError::Io(err)
    }
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;
