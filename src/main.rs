//! sentinel-audit - Main entry point

use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};

use sentinel_audit::{
    run_auth_command, run_launch_command, run_rules_command, run_soc_command,
    run_solutions_command, Cli, Command, EnvironmentConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Values already in the environment win over .env
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    info!("Starting sentinel-audit v{}", env!("CARGO_PKG_VERSION"));
    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env loaded: {}", e),
    }
    debug!(
        "CLI args: command={}, auth_mode={:?}, output_dir={}, timespan={}, quiet={}",
        cli.command, cli.auth_mode, cli.output_dir, cli.timespan, cli.quiet
    );

    let env_config = EnvironmentConfig::from_env();

    let result = match cli.command {
        Command::Auth => run_auth_command(&cli, &env_config).await,
        Command::Soc => run_soc_command(&cli, &env_config).await,
        Command::Rules => run_rules_command(&cli, &env_config).await,
        Command::Solutions => run_solutions_command(&cli, &env_config).await,
        Command::Launch => run_launch_command(&cli).await,
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
