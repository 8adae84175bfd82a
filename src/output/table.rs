//! Console summaries

use comfy_table::{presets::NOTHING, Table};

use crate::audit::{
    AnalyticRuleRow, IngestionRow, Recommendation, RuleEfficiencyRow, RuleInventorySummary,
    SolutionRow, SolutionUpdateRow,
};

/// Rows shown in the top-N tables
const TOP_ROWS: usize = 5;

/// Top recommendations, most urgent first
pub fn recommendations_table(recs: &[Recommendation]) -> Table {
    let mut sorted: Vec<&Recommendation> = recs.iter().collect();
    sorted.sort_by_key(|r| r.impact);

    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_header(vec!["#", "IMPACT", "CATEGORY", "DESCRIPTION"]);
    for (i, rec) in sorted.iter().take(3).enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            rec.impact.to_string(),
            rec.category.clone(),
            rec.description.clone(),
        ]);
    }
    table
}

/// Noisiest rules by alert count
pub fn top_rules_table(rules: &[RuleEfficiencyRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING).set_header(vec![
        "RULE",
        "SEVERITY",
        "ALERTS",
        "TP RATE",
        "FP RATE",
        "EFFICIENCY",
    ]);
    for rule in rules.iter().take(TOP_ROWS) {
        table.add_row(vec![
            rule.rule_name.clone(),
            rule.severity.clone(),
            rule.total_alerts.to_string(),
            rule.true_positive_rate.clone(),
            rule.false_positive_rate.clone(),
            rule.efficiency.to_string(),
        ]);
    }
    table
}

/// Largest billable data types
pub fn top_ingestion_table(rows: &[IngestionRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_header(vec!["DATA TYPE", "SOLUTION", "TOTAL GB", "DAILY GB", "VOLUME"]);
    for row in rows.iter().take(TOP_ROWS) {
        table.add_row(vec![
            row.data_type.clone(),
            row.solution.clone(),
            format!("{:.2}", row.total_gb),
            format!("{:.2}", row.daily_average_gb),
            row.volume_category.to_string(),
        ]);
    }
    table
}

/// Counts per kind and severity
pub fn rule_inventory_table(summary: &RuleInventorySummary) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING).set_header(vec!["GROUP", "VALUE", "RULES"]);
    table.add_row(vec!["Total", "", &summary.total.to_string()]);
    table.add_row(vec!["Status", "Enabled", &summary.enabled.to_string()]);
    table.add_row(vec![
        "Status",
        "Disabled",
        &(summary.total - summary.enabled).to_string(),
    ]);
    table.add_row(vec![
        "Source",
        "Template",
        &summary.from_template.to_string(),
    ]);
    for (kind, count) in &summary.by_kind {
        table.add_row(vec!["Kind", kind.as_str(), &count.to_string()]);
    }
    for (severity, count) in &summary.by_severity {
        table.add_row(vec!["Severity", severity.as_str(), &count.to_string()]);
    }
    table
}

/// Disabled rules, which are often forgotten after tuning
pub fn disabled_rules_table(rows: &[AnalyticRuleRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING).set_header(vec!["DISABLED RULE", "KIND", "SEVERITY"]);
    for row in rows.iter().filter(|r| !r.enabled) {
        table.add_row(vec![row.rule_name.as_str(), &row.kind, &row.severity]);
    }
    table
}

pub fn solutions_table(rows: &[SolutionRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_header(vec!["SOLUTION", "VERSION", "LATEST", "AUTHOR", "SUPPORT"]);
    for row in rows {
        let latest = if row.update_available {
            format!("{} ⬆", row.latest_version)
        } else {
            row.latest_version.clone()
        };
        table.add_row(vec![
            row.name.clone(),
            row.version.clone(),
            latest,
            row.author.clone(),
            row.support_tier.clone(),
        ]);
    }
    table
}

/// Installed solutions that have a newer catalog version
pub fn solution_updates_table(rows: &[SolutionUpdateRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_header(vec!["OUTDATED SOLUTION", "CURRENT", "AVAILABLE", "PUBLISHER"]);
    for row in rows {
        table.add_row(vec![
            row.solution_name.as_str(),
            &row.current_version,
            &row.available_version,
            &row.publisher,
        ]);
    }
    table
}
