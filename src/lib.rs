//! sentinel-audit - Audit a Microsoft Sentinel workspace
//!
//! Signs in to Azure with one of several interactive flows, queries a Log
//! Analytics workspace and its Sentinel configuration, and exports the
//! findings as CSV reports.
//!
//! # Features
//!
//! - Sign-in via browser (PKCE), device code or an existing Azure CLI session
//! - SOC optimisation: rule efficiency, data ingestion and recommendations
//! - Analytic rule and Content Hub solution inventories
//! - Launcher that picks a sign-in method once and runs several reports
//!
//! # Example
//!
//! ```bash
//! # Check sign-in without touching the workspace
//! sentinel-audit --auth-mode device auth
//!
//! # SOC optimisation audit over the last two weeks
//! sentinel-audit --timespan P2W -o reports soc
//!
//! # Analytic rule inventory using the Azure CLI session
//! AUTH_MODE=cli sentinel-audit rules
//! ```

pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod launcher;
pub mod output;
pub mod sentinel;
pub mod ui;

pub use audit::{
    run_auth_command, run_rules_command, run_soc_command, run_solutions_command, SocReport,
};
pub use auth::{AuthMode, AuthResolver, Credential, CredentialSource};
pub use cli::{Cli, Command};
pub use config::EnvironmentConfig;
pub use error::{AuditError, AuthError, Result};
pub use launcher::run_launch_command;
pub use output::ReportWriter;
pub use sentinel::{SentinelClient, Workspace, WorkspaceRef};
