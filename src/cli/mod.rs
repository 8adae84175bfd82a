//! CLI argument parsing

use clap::{Parser, Subcommand};

use crate::auth::AuthMode;
use crate::config::{api, defaults};

/// Microsoft Sentinel audit CLI
#[derive(Parser, Debug)]
#[command(name = "sentinel-audit")]
#[command(version)]
#[command(
    about = "Audit a Microsoft Sentinel workspace and export CSV reports",
    long_about = None
)]
pub struct Cli {
    /// Authentication method (overrides AUTH_MODE; prompts when neither is set)
    #[arg(long, value_enum, global = true)]
    pub auth_mode: Option<AuthMode>,

    /// Azure subscription id (overrides AZURE_SUBSCRIPTION_ID)
    #[arg(long, global = true)]
    pub subscription: Option<String>,

    /// Resource group of the workspace (overrides RESOURCE_GROUP_NAME)
    #[arg(long, global = true)]
    pub resource_group: Option<String>,

    /// Log Analytics workspace name (overrides WORKSPACE_NAME)
    #[arg(long, global = true)]
    pub workspace: Option<String>,

    /// Directory for CSV reports
    #[arg(short, long, default_value = defaults::OUTPUT_DIR, global = true)]
    pub output_dir: String,

    /// Query window as an ISO 8601 duration in days or weeks (e.g. P30D, P4W)
    #[arg(long, default_value = api::DEFAULT_TIMESPAN, global = true)]
    pub timespan: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = defaults::LOG_LEVEL, global = true)]
    pub log_level: String,

    /// Quiet mode: no spinners
    #[arg(short, long, default_value_t = false, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Sign in and show which credential was obtained
    Auth,
    /// SOC optimisation: rule efficiency, data ingestion, recommendations
    Soc,
    /// Analytic rule inventory
    Rules,
    /// Installed Content Hub solutions
    Solutions,
    /// Choose a sign-in method once, then run reports one after another
    Launch,
}

impl Command {
    /// Reports the launcher can run, in menu order
    pub const REPORTS: [Command; 3] = [Command::Soc, Command::Rules, Command::Solutions];

    /// Subcommand name on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Command::Auth => "auth",
            Command::Soc => "soc",
            Command::Rules => "rules",
            Command::Solutions => "solutions",
            Command::Launch => "launch",
        }
    }

    /// Human readable report title
    pub fn title(&self) -> &'static str {
        match self {
            Command::Auth => "Sign-in check",
            Command::Soc => "SOC Optimization Audit",
            Command::Rules => "Analytic Rule Inventory",
            Command::Solutions => "Installed Solutions",
            Command::Launch => "Launcher",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
