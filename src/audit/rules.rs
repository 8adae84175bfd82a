//! Analytic rule inventory

use std::collections::BTreeMap;

use serde::Serialize;

use crate::sentinel::{AlertRule, ArmResource};

/// One row of the analytic rule inventory
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AnalyticRuleRow {
    #[serde(rename = "RuleName")]
    pub rule_name: String,
    #[serde(rename = "Kind")]
    pub kind: String,
    #[serde(rename = "Enabled")]
    pub enabled: bool,
    #[serde(rename = "Severity")]
    pub severity: String,
    #[serde(rename = "Tactics")]
    pub tactics: String,
    #[serde(rename = "Techniques")]
    pub techniques: String,
    #[serde(rename = "QueryFrequency")]
    pub query_frequency: String,
    #[serde(rename = "QueryPeriod")]
    pub query_period: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "TemplateVersion")]
    pub template_version: String,
    #[serde(rename = "LastModified")]
    pub last_modified: String,
    #[serde(rename = "RuleId")]
    pub rule_id: String,
}

impl From<&AlertRule> for AnalyticRuleRow {
    fn from(rule: &AlertRule) -> Self {
        let props = &rule.properties;
        Self {
            rule_name: rule.display_name().to_string(),
            kind: rule.kind().to_string(),
            enabled: rule.is_enabled(),
            severity: rule.severity().to_string(),
            tactics: props.tactics.join("; "),
            techniques: props.techniques.join("; "),
            query_frequency: props.query_frequency.clone().unwrap_or_default(),
            query_period: props.query_period.clone().unwrap_or_default(),
            source: if rule.is_from_template() {
                "Template".to_string()
            } else {
                "Custom".to_string()
            },
            template_version: props.template_version.clone().unwrap_or_default(),
            last_modified: props.last_modified_utc.clone().unwrap_or_default(),
            rule_id: rule.name().to_string(),
        }
    }
}

/// Inventory rows sorted by rule name
pub fn analytic_rules(rules: &[AlertRule]) -> Vec<AnalyticRuleRow> {
    let mut rows: Vec<AnalyticRuleRow> = rules.iter().map(AnalyticRuleRow::from).collect();
    rows.sort_by(|a, b| a.rule_name.to_lowercase().cmp(&b.rule_name.to_lowercase()));
    rows
}

/// Counts for the console summary
#[derive(Debug, Default, PartialEq)]
pub struct RuleInventorySummary {
    pub total: usize,
    pub enabled: usize,
    pub from_template: usize,
    pub by_kind: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<String, usize>,
}

pub fn summarize(rows: &[AnalyticRuleRow]) -> RuleInventorySummary {
    let mut summary = RuleInventorySummary {
        total: rows.len(),
        ..Default::default()
    };
    for row in rows {
        if row.enabled {
            summary.enabled += 1;
        }
        if row.source == "Template" {
            summary.from_template += 1;
        }
        *summary.by_kind.entry(row.kind.clone()).or_default() += 1;
        *summary.by_severity.entry(row.severity.clone()).or_default() += 1;
    }
    summary
}
