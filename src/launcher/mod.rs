//! Launcher: pick a sign-in method once, then run reports as child processes
//!
//! Each report runs in its own process with `AUTH_MODE` exported, so every
//! child resolves its own credential.

use std::io::IsTerminal;
use std::path::PathBuf;

use dialoguer::{theme::ColorfulTheme, MultiSelect};
use log::{debug, info, warn};

use crate::auth::AuthMode;
use crate::cli::{Cli, Command};
use crate::config::env;
use crate::error::{AuditError, AuthError, Result};
use crate::ui::{choose, terminal_console, Console};

/// Menu entry that leaves `AUTH_MODE` empty for the children
const PROMPT_EACH_LABEL: &str = "⚡ Let each report prompt individually";

/// Ask which sign-in method the reports should use
///
/// [`AuthMode::Unset`] means every report asks on its own.
pub fn choose_auth<C: Console + ?Sized>(
    console: &mut C,
) -> std::result::Result<AuthMode, AuthError> {
    let options = [
        AuthMode::Browser.label(),
        AuthMode::Device.label(),
        AuthMode::Cli.label(),
        PROMPT_EACH_LABEL,
    ];
    let index = choose(console, "🔐 Azure Authentication Setup", &options)?;

    let mode = match index {
        0 => {
            console.say("✅ Set to Interactive Browser Login");
            console.say("🖥️  Browser windows will open for authentication");
            AuthMode::Browser
        }
        1 => {
            console.say("✅ Set to Device Code Login");
            console.say("📱 You'll get codes to enter on https://microsoft.com/devicelogin");
            AuthMode::Device
        }
        2 => {
            console.say("✅ Set to Azure CLI authentication");
            console.say("💡 Make sure to run 'az login' first if you haven't already");
            AuthMode::Cli
        }
        _ => {
            console.say("✅ Authentication mode cleared");
            console.say("🔄 Each report will prompt for authentication method");
            AuthMode::Unset
        }
    };
    Ok(mode)
}

/// Reports to run: a checklist on a terminal, all of them otherwise
pub fn select_reports(interactive: bool) -> Result<Vec<Command>> {
    if !interactive {
        debug!("stdin is not a terminal, running all reports");
        return Ok(Command::REPORTS.to_vec());
    }

    let titles: Vec<&str> = Command::REPORTS.iter().map(|c| c.title()).collect();
    let selection = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select reports to run")
        .items(&titles)
        .defaults(&[true; Command::REPORTS.len()])
        .interact()
        .map_err(|e| AuditError::Launch(format!("Failed to select reports: {}", e)))?;

    Ok(selection
        .into_iter()
        .filter_map(|i| Command::REPORTS.get(i).copied())
        .collect())
}

/// Command line for one report, carrying the launcher's global options
pub fn child_args(cli: &Cli, report: Command) -> Vec<String> {
    let mut args = vec![report.name().to_string()];

    let optional = [
        ("--subscription", &cli.subscription),
        ("--resource-group", &cli.resource_group),
        ("--workspace", &cli.workspace),
    ];
    for (flag, value) in optional {
        if let Some(value) = value {
            args.push(flag.to_string());
            args.push(value.clone());
        }
    }

    args.extend([
        "--output-dir".to_string(),
        cli.output_dir.clone(),
        "--timespan".to_string(),
        cli.timespan.clone(),
        "--log-level".to_string(),
        cli.log_level.clone(),
    ]);
    if cli.quiet {
        args.push("-q".to_string());
    }
    args
}

/// Runs one report and reports its exit code (`None` when killed by a signal)
#[allow(async_fn_in_trait)]
pub trait ReportRunner {
    async fn run(&self, args: &[String], auth_mode: AuthMode) -> Result<Option<i32>>;
}

/// Runs reports by re-executing this binary
pub struct ChildProcessRunner {
    program: PathBuf,
}

impl ChildProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Runner for the currently executing binary
    pub fn current() -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }
}

impl ReportRunner for ChildProcessRunner {
    async fn run(&self, args: &[String], auth_mode: AuthMode) -> Result<Option<i32>> {
        // Empty rather than removed, so a .env value does not come back
        let auth_value = auth_mode.env_value().unwrap_or("");
        debug!(
            "Spawning {} {:?} with {}='{}'",
            self.program.display(),
            args,
            env::AUTH_MODE,
            auth_value
        );

        let status = tokio::process::Command::new(&self.program)
            .args(args)
            .env(env::AUTH_MODE, auth_value)
            .status()
            .await?;
        Ok(status.code())
    }
}

/// Reports that completed and failed, in run order
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LaunchSummary {
    pub completed: Vec<Command>,
    pub failed: Vec<Command>,
}

impl LaunchSummary {
    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run the reports one after another; a failing report does not stop the rest
pub async fn run_reports<R: ReportRunner>(
    cli: &Cli,
    runner: &R,
    auth_mode: AuthMode,
    reports: &[Command],
) -> LaunchSummary {
    let mut summary = LaunchSummary::default();

    for &report in reports {
        eprintln!("\n🚀 Running {}...", report.title());
        eprintln!("{}", "-".repeat(40));

        let args = child_args(cli, report);
        match runner.run(&args, auth_mode).await {
            Ok(Some(0)) => {
                eprintln!("✅ {} completed successfully", report.title());
                summary.completed.push(report);
            }
            Ok(Some(code)) => {
                eprintln!("❌ {} failed with exit code {}", report.title(), code);
                summary.failed.push(report);
            }
            Ok(None) => {
                eprintln!("❌ {} was terminated", report.title());
                summary.failed.push(report);
            }
            Err(e) => {
                warn!("Could not start report '{}': {}", report, e);
                eprintln!("❌ Error running {}: {}", report.title(), e);
                summary.failed.push(report);
            }
        }
    }
    summary
}

/// Run the launcher subcommand
pub async fn run_launch_command(cli: &Cli) -> Result<()> {
    eprintln!("🛡️  Sentinel Audit - Authentication Helper");
    eprintln!("{}", "=".repeat(60));

    let auth_mode = match cli.auth_mode {
        Some(mode) => {
            info!("Using --auth-mode '{}' for all reports", mode);
            mode
        }
        None => {
            let mut console = terminal_console();
            choose_auth(&mut console).map_err(|e| match e {
                AuthError::Cancelled => AuditError::Launch("Setup cancelled".to_string()),
                other => AuditError::Auth(other),
            })?
        }
    };

    let reports = select_reports(std::io::stdin().is_terminal())?;
    if reports.is_empty() {
        eprintln!("👋 No reports selected.");
        return Ok(());
    }

    let runner = ChildProcessRunner::current()?;
    let summary = run_reports(cli, &runner, auth_mode, &reports).await;

    eprintln!(
        "\n📊 Summary: {}/{} reports completed successfully",
        summary.completed.len(),
        summary.total()
    );

    if summary.is_success() {
        Ok(())
    } else {
        Err(AuditError::Launch(format!(
            "{} of {} reports failed",
            summary.failed.len(),
            summary.total()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::LineConsole;
    use clap::Parser;
    use std::cell::RefCell;
    use std::io::Cursor;

    fn scripted(input: &str) -> LineConsole<Cursor<String>, Vec<u8>> {
        LineConsole::new(Cursor::new(input.to_string()), Vec::new())
    }

    #[test]
    fn test_choose_auth_device() {
        let mut console = scripted("2\n");
        assert_eq!(choose_auth(&mut console), Ok(AuthMode::Device));
        let out = String::from_utf8(console.into_writer()).unwrap();
        assert!(out.contains("✅ Set to Device Code Login"));
        assert!(out.contains("4. ⚡ Let each report prompt individually"));
    }

    #[test]
    fn test_choose_auth_prompt_each_is_unset() {
        let mut console = scripted("x\n4\n");
        assert_eq!(choose_auth(&mut console), Ok(AuthMode::Unset));
        let out = String::from_utf8(console.into_writer()).unwrap();
        assert!(out.contains("❌ Invalid choice"));
        assert!(out.contains("Authentication mode cleared"));
    }

    #[test]
    fn test_choose_auth_cancelled_on_eof() {
        let mut console = scripted("9\n");
        assert_eq!(choose_auth(&mut console), Err(AuthError::Cancelled));
    }

    #[test]
    fn test_select_reports_non_interactive_runs_all() {
        assert_eq!(select_reports(false).unwrap(), Command::REPORTS.to_vec());
    }

    #[test]
    fn test_child_args_defaults() {
        let cli = Cli::parse_from(["sentinel-audit", "launch"]);
        assert_eq!(
            child_args(&cli, Command::Soc),
            vec![
                "soc",
                "--output-dir",
                ".",
                "--timespan",
                "P30D",
                "--log-level",
                "warn"
            ]
        );
    }

    #[test]
    fn test_child_args_forwards_workspace_and_quiet() {
        let cli = Cli::parse_from([
            "sentinel-audit",
            "--workspace",
            "law-sec",
            "--subscription",
            "sub-1",
            "-q",
            "launch",
        ]);
        let args = child_args(&cli, Command::Rules);
        assert_eq!(args[0], "rules");
        assert!(args.windows(2).any(|w| w == ["--workspace", "law-sec"]));
        assert!(args.windows(2).any(|w| w == ["--subscription", "sub-1"]));
        assert!(!args.iter().any(|a| a == "--resource-group"));
        assert_eq!(args.last().map(String::as_str), Some("-q"));
    }

    struct FakeRunner {
        calls: RefCell<Vec<(String, AuthMode)>>,
        fail: Command,
    }

    impl ReportRunner for FakeRunner {
        async fn run(&self, args: &[String], auth_mode: AuthMode) -> Result<Option<i32>> {
            self.calls.borrow_mut().push((args[0].clone(), auth_mode));
            if args[0] == self.fail.name() {
                Ok(Some(1))
            } else {
                Ok(Some(0))
            }
        }
    }

    #[tokio::test]
    async fn test_run_reports_continues_after_failure() {
        let cli = Cli::parse_from(["sentinel-audit", "launch"]);
        let runner = FakeRunner {
            calls: RefCell::new(Vec::new()),
            fail: Command::Soc,
        };

        let summary = run_reports(&cli, &runner, AuthMode::Device, &Command::REPORTS).await;

        assert_eq!(summary.failed, vec![Command::Soc]);
        assert_eq!(summary.completed, vec![Command::Rules, Command::Solutions]);
        assert_eq!(summary.total(), 3);
        assert!(!summary.is_success());

        let calls = runner.calls.borrow();
        let names: Vec<&str> = calls.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["soc", "rules", "solutions"]);
        assert!(calls.iter().all(|(_, mode)| *mode == AuthMode::Device));
    }

    #[tokio::test]
    async fn test_run_reports_all_succeed() {
        let cli = Cli::parse_from(["sentinel-audit", "launch"]);
        let runner = FakeRunner {
            calls: RefCell::new(Vec::new()),
            fail: Command::Launch,
        };
        let summary = run_reports(&cli, &runner, AuthMode::Unset, &[Command::Rules]).await;
        assert!(summary.is_success());
        assert_eq!(summary.completed, vec![Command::Rules]);
    }
}
