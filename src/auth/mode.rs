//! Authentication mode selection

use clap::ValueEnum;

/// How a credential should be obtained for this run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthMode {
    /// Interactive browser login on this machine
    Browser,
    /// Device code login completed on any browser-capable device
    Device,
    /// Reuse an existing `az login` session
    Cli,
    /// Try the Azure CLI session, then ask
    Auto,
    /// Ask interactively
    #[value(skip)]
    Unset,
}

impl AuthMode {
    /// Modes offered by the interactive menu, in menu order
    pub const MENU: [AuthMode; 4] = [
        AuthMode::Browser,
        AuthMode::Device,
        AuthMode::Cli,
        AuthMode::Auto,
    ];

    /// Parse an `AUTH_MODE` value; empty means [`AuthMode::Unset`]
    pub fn from_env_value(value: &str) -> Option<AuthMode> {
        match value.trim().to_lowercase().as_str() {
            "" => Some(AuthMode::Unset),
            "browser" => Some(AuthMode::Browser),
            "device" => Some(AuthMode::Device),
            "cli" => Some(AuthMode::Cli),
            "auto" => Some(AuthMode::Auto),
            _ => None,
        }
    }

    /// Value to export as `AUTH_MODE`, `None` for the interactive default
    pub fn env_value(&self) -> Option<&'static str> {
        match self {
            AuthMode::Browser => Some("browser"),
            AuthMode::Device => Some("device"),
            AuthMode::Cli => Some("cli"),
            AuthMode::Auto => Some("auto"),
            AuthMode::Unset => None,
        }
    }

    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            AuthMode::Browser => "🌐 Interactive Browser Login (opens a web browser, needs a desktop)",
            AuthMode::Device => "📱 Device Code Login (enter a code on another device)",
            AuthMode::Cli => "🔄 Azure CLI (reuse an existing 'az login' session)",
            AuthMode::Auto => "⚡ Auto (try Azure CLI, ask again if it is not logged in)",
            AuthMode::Unset => "Ask each time",
        }
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.env_value().unwrap_or("unset"))
    }
}
