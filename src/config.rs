//! Configuration constants and the startup environment snapshot

use std::collections::HashMap;

use log::warn;

use crate::auth::AuthMode;

/// Azure Resource Manager endpoints and API versions
pub mod api {
    /// ARM base URL
    pub const MANAGEMENT_URL: &str = "https://management.azure.com";

    /// Log Analytics workspace resource API version
    pub const WORKSPACE_API_VERSION: &str = "2022-10-01";

    /// Log Analytics query (via ARM) API version
    pub const QUERY_API_VERSION: &str = "2017-10-01";

    /// Microsoft.SecurityInsights API version
    pub const SECURITY_INSIGHTS_API_VERSION: &str = "2023-11-01";

    /// Default query timespan (ISO 8601 duration)
    pub const DEFAULT_TIMESPAN: &str = "P30D";
}

/// Identity provider settings
pub mod auth {
    use std::time::Duration;

    /// Microsoft identity platform authority
    pub const AUTHORITY_URL: &str = "https://login.microsoftonline.com";

    /// Tenant used when AZURE_TENANT_ID is not set
    pub const DEFAULT_TENANT: &str = "organizations";

    /// Azure CLI public client id, allowed for loopback redirects and device code
    pub const DEFAULT_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";

    /// Scope requested by browser and device flows
    pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

    /// Resource passed to `az account get-access-token`
    pub const MANAGEMENT_RESOURCE: &str = "https://management.azure.com/";

    /// Upper bound on waiting for the browser redirect
    pub const BROWSER_LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

    /// Seconds added to the poll interval when the provider answers `slow_down`
    pub const SLOW_DOWN_INCREMENT_SECS: u64 = 5;

    /// Fallback device code lifetime when the advertised one cannot be represented
    pub const MAX_DEVICE_CODE_WAIT: Duration = Duration::from_secs(900);
}

/// Environment variable names read at startup
pub mod env {
    pub const AUTH_MODE: &str = "AUTH_MODE";
    pub const SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
    pub const RESOURCE_GROUP: &str = "RESOURCE_GROUP_NAME";
    pub const WORKSPACE_NAME: &str = "WORKSPACE_NAME";
    pub const TENANT_ID: &str = "AZURE_TENANT_ID";
    pub const CLIENT_ID: &str = "AZURE_CLIENT_ID";
    pub const DISPLAY: &str = "DISPLAY";
    pub const WAYLAND_DISPLAY: &str = "WAYLAND_DISPLAY";

    /// Every variable captured into [`super::EnvironmentConfig`]
    pub const ALL: &[&str] = &[
        AUTH_MODE,
        SUBSCRIPTION_ID,
        RESOURCE_GROUP,
        WORKSPACE_NAME,
        TENANT_ID,
        CLIENT_ID,
        DISPLAY,
        WAYLAND_DISPLAY,
    ];
}

/// Default values for CLI
pub mod defaults {
    /// Default log level
    pub const LOG_LEVEL: &str = "warn";

    /// Default output directory for CSV reports
    pub const OUTPUT_DIR: &str = ".";

    /// Dotenv file loaded from the working directory
    pub const DOTENV_FILE: &str = ".env";
}

/// Report file prefixes
pub mod reports {
    pub const RULE_EFFICIENCY: &str = "soc_rule_efficiency";
    pub const DATA_INGESTION: &str = "soc_data_ingestion";
    pub const RECOMMENDATIONS: &str = "soc_recommendations";
    pub const ANALYTIC_RULES: &str = "sentinel_analytic_rules";
    pub const SOLUTIONS: &str = "sentinel_solutions";
    pub const SOLUTION_UPDATES: &str = "sentinel_solution_updates";

    /// Timestamp format appended to every file of a run
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
}

/// Immutable snapshot of the environment variables this tool reads
///
/// Captured once at startup and passed explicitly, so resolution logic never
/// touches the process environment. Empty values are treated as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentConfig {
    vars: HashMap<String, String>,
}

impl EnvironmentConfig {
    /// Capture the known variables from the process environment
    pub fn from_env() -> Self {
        Self::from_pairs(
            env::ALL
                .iter()
                .filter_map(|key| std::env::var(key).ok().map(|value| (*key, value))),
        )
    }

    /// Build a snapshot from explicit key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| -> (String, String) { (k.into(), v.into()) })
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        Self { vars }
    }

    /// Get a non-empty, trimmed value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|v| v.trim())
    }

    /// Authentication mode requested through `AUTH_MODE`
    ///
    /// Unrecognised values fall back to the interactive menu.
    pub fn auth_mode(&self) -> AuthMode {
        let Some(raw) = self.get(env::AUTH_MODE) else {
            return AuthMode::Unset;
        };
        AuthMode::from_env_value(raw).unwrap_or_else(|| {
            warn!(
                "Ignoring unrecognised {}='{}' (expected browser, device, cli or auto)",
                env::AUTH_MODE,
                raw
            );
            AuthMode::Unset
        })
    }

    pub fn subscription_id(&self) -> Option<&str> {
        self.get(env::SUBSCRIPTION_ID)
    }

    pub fn resource_group(&self) -> Option<&str> {
        self.get(env::RESOURCE_GROUP)
    }

    pub fn workspace_name(&self) -> Option<&str> {
        self.get(env::WORKSPACE_NAME)
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.get(env::TENANT_ID)
    }

    pub fn client_id(&self) -> Option<&str> {
        self.get(env::CLIENT_ID)
    }

    /// Whether a graphical session is available for a system browser
    ///
    /// Windows and macOS always have one; elsewhere an X11 or Wayland
    /// display must be advertised.
    pub fn gui_available(&self) -> bool {
        if cfg!(any(windows, target_os = "macos")) {
            return true;
        }
        self.get(env::DISPLAY).is_some() || self.get(env::WAYLAND_DISPLAY).is_some()
    }
}
