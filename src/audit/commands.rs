//! Report command handlers

use std::path::PathBuf;

use chrono::{Local, Utc};
use log::{debug, info};

use crate::auth::{AuthMode, AuthResolver, AuthSettings, AzureFlows, Credential, CredentialSource};
use crate::cli::Cli;
use crate::config::{reports, EnvironmentConfig};
use crate::error::Result;
use crate::output::{
    disabled_rules_table, recommendations_table, rule_inventory_table, solution_updates_table,
    solutions_table, top_ingestion_table, top_rules_table, ReportWriter,
};
use crate::sentinel::{SentinelClient, WorkspaceRef};
use crate::ui::{create_spinner, finish_spinner, terminal_console};

use super::rules::{analytic_rules, summarize, AnalyticRuleRow};
use super::soc::{
    data_ingestion, data_ingestion_query, lookback_days, recommendations, rule_efficiency,
    rule_efficiency_query, IngestionRow, Recommendation, RuleEfficiencyRow,
};
use super::solutions::{installed_solutions, solution_updates, SolutionRow, SolutionUpdateRow};

/// `--auth-mode` wins over `AUTH_MODE`
pub fn effective_auth_mode(flag: Option<AuthMode>, env_config: &EnvironmentConfig) -> AuthMode {
    flag.unwrap_or_else(|| env_config.auth_mode())
}

/// Resolve one credential for this run on the terminal
pub async fn acquire_credential(cli: &Cli, env_config: &EnvironmentConfig) -> Result<Credential> {
    let mode = effective_auth_mode(cli.auth_mode, env_config);
    info!("Authenticating with mode '{}'", mode);

    let flows = AzureFlows::new(AuthSettings::from_env(env_config));
    let mut resolver = AuthResolver::new(flows, terminal_console());
    let credential = resolver.resolve(mode).await?;

    eprintln!("✅ Authenticated via {}", credential.source());
    Ok(credential)
}

/// Workspace from flags and environment
pub fn workspace_ref(cli: &Cli, env_config: &EnvironmentConfig) -> Result<WorkspaceRef> {
    WorkspaceRef::resolve(
        cli.subscription.as_deref(),
        cli.resource_group.as_deref(),
        cli.workspace.as_deref(),
        env_config,
    )
}

/// Validate configuration, sign in and confirm the workspace exists
///
/// Configuration is checked before any sign-in prompt.
async fn connect(cli: &Cli, env_config: &EnvironmentConfig) -> Result<SentinelClient> {
    let workspace = workspace_ref(cli, env_config)?;
    eprintln!("Subscription:   {}", workspace.subscription_id);
    eprintln!("Resource Group: {}", workspace.resource_group);
    eprintln!("Workspace:      {}", workspace.workspace_name);

    let credential = acquire_credential(cli, env_config).await?;
    let client = SentinelClient::new(credential, workspace);

    let spinner = create_spinner("Locating workspace...", cli.quiet);
    let workspace = client.get_workspace().await;
    finish_spinner(spinner);
    let workspace = workspace?;
    eprintln!(
        "Workspace ID:   {}",
        workspace.customer_id().unwrap_or("unknown")
    );
    Ok(client)
}

/// Result of the SOC optimisation audit
#[derive(Debug, Default)]
pub struct SocReport {
    pub rules: Vec<RuleEfficiencyRow>,
    pub ingestion: Vec<IngestionRow>,
    pub recommendations: Vec<Recommendation>,
    pub files: Vec<PathBuf>,
}

/// Run both SOC queries, derive recommendations and write the CSV files
pub async fn soc_audit(
    client: &SentinelClient,
    writer: &ReportWriter,
    days: u32,
    quiet: bool,
) -> Result<SocReport> {
    let timespan = format!("P{}D", days);

    let spinner = create_spinner("Analyzing rule efficiency...", quiet);
    let result = client.run_query(&rule_efficiency_query(days), &timespan).await;
    finish_spinner(spinner);
    let rules = result?
        .primary()
        .map(rule_efficiency)
        .unwrap_or_default();

    let spinner = create_spinner("Analyzing data ingestion...", quiet);
    let result = client.run_query(&data_ingestion_query(days), &timespan).await;
    finish_spinner(spinner);
    let ingestion = result?
        .primary()
        .map(data_ingestion)
        .unwrap_or_default();

    let recommendations = recommendations(&rules, &ingestion);

    let files = [
        writer.write(reports::RULE_EFFICIENCY, &rules)?,
        writer.write(reports::DATA_INGESTION, &ingestion)?,
        writer.write(reports::RECOMMENDATIONS, &recommendations)?,
    ]
    .into_iter()
    .flatten()
    .collect();

    Ok(SocReport {
        rules,
        ingestion,
        recommendations,
        files,
    })
}

/// List analytic rules and write the inventory file
pub async fn rules_inventory(
    client: &SentinelClient,
    writer: &ReportWriter,
    quiet: bool,
) -> Result<(Vec<AnalyticRuleRow>, Option<PathBuf>)> {
    let spinner = create_spinner("Fetching analytic rules...", quiet);
    let result = client.list_alert_rules().await;
    finish_spinner(spinner);

    let rows = analytic_rules(&result?);
    let file = writer.write(reports::ANALYTIC_RULES, &rows)?;
    Ok((rows, file))
}

/// Installed solutions, their available updates and the files written
#[derive(Debug, Default)]
pub struct SolutionsReport {
    pub solutions: Vec<SolutionRow>,
    pub updates: Vec<SolutionUpdateRow>,
    pub files: Vec<PathBuf>,
}

/// List installed solutions, compare them with the catalog and write the files
pub async fn solutions_inventory(
    client: &SentinelClient,
    writer: &ReportWriter,
    quiet: bool,
) -> Result<SolutionsReport> {
    let spinner = create_spinner("Fetching installed solutions...", quiet);
    let result = client.list_content_packages().await;
    finish_spinner(spinner);
    let installed = result?;

    if installed.is_empty() {
        return Ok(SolutionsReport::default());
    }

    let spinner = create_spinner("Checking Content Hub for updates...", quiet);
    let result = client.list_content_product_packages().await;
    finish_spinner(spinner);
    let catalog = result?;
    debug!(
        "Comparing {} installed packages with {} catalog entries",
        installed.len(),
        catalog.len()
    );

    let solutions = installed_solutions(&installed, &catalog);
    let updates = solution_updates(&installed, &catalog);

    let files = [
        writer.write(reports::SOLUTIONS, &solutions)?,
        writer.write(reports::SOLUTION_UPDATES, &updates)?,
    ]
    .into_iter()
    .flatten()
    .collect();

    Ok(SolutionsReport {
        solutions,
        updates,
        files,
    })
}

fn print_files(files: &[PathBuf]) {
    for file in files {
        eprintln!("✅ Wrote {}", file.display());
    }
}

/// Run the `auth` command: sign in and describe the credential
pub async fn run_auth_command(cli: &Cli, env_config: &EnvironmentConfig) -> Result<()> {
    let credential = acquire_credential(cli, env_config).await?;

    let remaining = credential.expires_on() - Utc::now();
    println!("Method:     {}", credential.source());
    match credential.source() {
        CredentialSource::AzureCli {
            tenant,
            subscription,
        } => {
            println!("Tenant:     {}", tenant.as_deref().unwrap_or("unknown"));
            println!("Subscription: {}", subscription.as_deref().unwrap_or("unknown"));
        }
        CredentialSource::Browser { redirect_port } => {
            println!("Redirect:   http://localhost:{}", redirect_port);
        }
        CredentialSource::DeviceCode { user_code, .. } => {
            println!("Code used:  {}", user_code);
        }
    }
    println!(
        "Expires:    {} ({} min)",
        credential.expires_on().with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        remaining.num_minutes().max(0)
    );
    Ok(())
}

/// Run the `soc` command
pub async fn run_soc_command(cli: &Cli, env_config: &EnvironmentConfig) -> Result<()> {
    let days = lookback_days(&cli.timespan)?;
    eprintln!("🎯 Microsoft Sentinel SOC Optimization Audit");
    eprintln!("{}", "=".repeat(60));

    let client = connect(cli, env_config).await?;
    let writer = ReportWriter::new(&cli.output_dir);
    debug!("Writing reports to '{}'", writer.output_dir().display());

    let report = soc_audit(&client, &writer, days, cli.quiet).await?;
    print_files(&report.files);

    println!();
    println!("✅ SOC Optimization audit completed successfully!");
    println!("📊 Summary:");
    println!("   - Rules Analyzed: {}", report.rules.len());
    println!("   - Data Types: {}", report.ingestion.len());
    println!("   - Recommendations: {}", report.recommendations.len());

    if !report.rules.is_empty() {
        println!();
        println!("{}", top_rules_table(&report.rules));
    }
    if !report.ingestion.is_empty() {
        println!();
        println!("{}", top_ingestion_table(&report.ingestion));
    }
    if !report.recommendations.is_empty() {
        println!();
        println!("🎯 Top Recommendations:");
        println!("{}", recommendations_table(&report.recommendations));
    }
    Ok(())
}

/// Run the `rules` command
pub async fn run_rules_command(cli: &Cli, env_config: &EnvironmentConfig) -> Result<()> {
    eprintln!("📋 Microsoft Sentinel Analytic Rule Inventory");
    eprintln!("{}", "=".repeat(60));

    let client = connect(cli, env_config).await?;
    let writer = ReportWriter::new(&cli.output_dir);
    let (rows, file) = rules_inventory(&client, &writer, cli.quiet).await?;

    if rows.is_empty() {
        eprintln!("No analytic rules found in workspace '{}'", client.workspace().workspace_name);
        return Ok(());
    }
    print_files(file.as_slice());

    println!("{}", rule_inventory_table(&summarize(&rows)));
    if rows.iter().any(|r| !r.enabled) {
        println!();
        println!("{}", disabled_rules_table(&rows));
    }
    Ok(())
}

/// Run the `solutions` command
pub async fn run_solutions_command(cli: &Cli, env_config: &EnvironmentConfig) -> Result<()> {
    eprintln!("🧩 Microsoft Sentinel Installed Solutions");
    eprintln!("{}", "=".repeat(60));

    let client = connect(cli, env_config).await?;
    let writer = ReportWriter::new(&cli.output_dir);
    let report = solutions_inventory(&client, &writer, cli.quiet).await?;

    if report.solutions.is_empty() {
        eprintln!(
            "No Content Hub solutions installed in workspace '{}'",
            client.workspace().workspace_name
        );
        return Ok(());
    }
    print_files(&report.files);

    println!("{}", solutions_table(&report.solutions));
    println!("{} solution(s) installed", report.solutions.len());

    if report.updates.is_empty() {
        println!("✅ All installed solutions are up to date");
    } else {
        println!();
        println!("{}", solution_updates_table(&report.updates));
        println!("⬆ {} solution(s) have updates available", report.updates.len());
    }
    Ok(())
}
