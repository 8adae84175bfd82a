//! SOC optimisation analysis: rule efficiency, data ingestion, recommendations

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::error::{AuditError, Result};
use crate::sentinel::QueryTable;

/// Rules with a false positive rate above this are flagged
const HIGH_FALSE_POSITIVE_RATE: f64 = 50.0;

/// Rules with a true positive rate below this are flagged
const LOW_TRUE_POSITIVE_RATE: f64 = 20.0;

/// Fewer analysed rules than this is a coverage gap
const MIN_RULE_COVERAGE: usize = 10;

/// Look-back window in days for an ISO 8601 duration (`P30D`, `P2W`)
pub fn lookback_days(timespan: &str) -> Result<u32> {
    let invalid = || {
        AuditError::Config(format!(
            "Unsupported timespan '{}': use whole days or weeks, e.g. P30D or P4W",
            timespan
        ))
    };

    let duration = timespan.trim().to_ascii_uppercase();
    let body = duration.strip_prefix('P').ok_or_else(invalid)?;
    let (count, per_unit) = if let Some(n) = body.strip_suffix('D') {
        (n, 1)
    } else if let Some(n) = body.strip_suffix('W') {
        (n, 7)
    } else {
        return Err(invalid());
    };

    let count: u32 = count.parse().map_err(|_| invalid())?;
    match count.checked_mul(per_unit) {
        Some(days) if days > 0 => Ok(days),
        _ => Err(invalid()),
    }
}

/// KQL for per-rule alert outcomes over the last `days`
pub fn rule_efficiency_query(days: u32) -> String {
    format!(
        r#"SecurityAlert
| where TimeGenerated >= ago({days}d)
| summarize
    AlertCount = count(),
    UniqueAlerts = dcount(SystemAlertId),
    TruePositives = countif(Status == "Resolved" and Classification == "TruePositive"),
    FalsePositives = countif(Status == "Resolved" and Classification == "FalsePositive"),
    InProgress = countif(Status == "InProgress"),
    New = countif(Status == "New")
    by AlertName, ProductName, Severity
| extend
    TruePositiveRate = round(todouble(TruePositives) / todouble(AlertCount) * 100, 2),
    FalsePositiveRate = round(todouble(FalsePositives) / todouble(AlertCount) * 100, 2)
| order by AlertCount desc
| limit 100"#
    )
}

/// KQL for billable ingestion per data type over the last `days`
pub fn data_ingestion_query(days: u32) -> String {
    format!(
        r#"Usage
| where TimeGenerated >= ago({days}d)
| where IsBillable == true
| summarize
    TotalGB = round(sum(Quantity) / 1024, 2),
    DailyAverageGB = round(sum(Quantity) / 1024 / {days}, 2)
    by DataType, Solution
| order by TotalGB desc
| limit 50"#
    )
}

/// Rating derived from the true positive rate
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Efficiency {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "Needs Review")]
    NeedsReview,
}

impl Efficiency {
    pub fn from_true_positive_rate(rate: f64) -> Self {
        if rate > 80.0 {
            Efficiency::Excellent
        } else if rate > 60.0 {
            Efficiency::Good
        } else if rate > 40.0 {
            Efficiency::Fair
        } else {
            Efficiency::NeedsReview
        }
    }
}

impl fmt::Display for Efficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Efficiency::Excellent => "Excellent",
            Efficiency::Good => "Good",
            Efficiency::Fair => "Fair",
            Efficiency::NeedsReview => "Needs Review",
        };
        write!(f, "{}", s)
    }
}

/// Ingestion volume bucket by total GB in the window
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeCategory {
    High,
    Medium,
    Low,
    #[serde(rename = "Very Low")]
    VeryLow,
}

impl VolumeCategory {
    pub fn from_total_gb(total_gb: f64) -> Self {
        if total_gb > 100.0 {
            VolumeCategory::High
        } else if total_gb > 10.0 {
            VolumeCategory::Medium
        } else if total_gb > 1.0 {
            VolumeCategory::Low
        } else {
            VolumeCategory::VeryLow
        }
    }
}

impl fmt::Display for VolumeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolumeCategory::High => "High",
            VolumeCategory::Medium => "Medium",
            VolumeCategory::Low => "Low",
            VolumeCategory::VeryLow => "Very Low",
        };
        write!(f, "{}", s)
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Impact::High => "High",
            Impact::Medium => "Medium",
            Impact::Low => "Low",
        };
        write!(f, "{}", s)
    }
}

/// One row of the rule efficiency report
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RuleEfficiencyRow {
    #[serde(rename = "RuleName")]
    pub rule_name: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Severity")]
    pub severity: String,
    #[serde(rename = "TotalAlerts")]
    pub total_alerts: u64,
    #[serde(rename = "TruePositives")]
    pub true_positives: u64,
    #[serde(rename = "FalsePositives")]
    pub false_positives: u64,
    #[serde(rename = "TruePositiveRate")]
    pub true_positive_rate: String,
    #[serde(rename = "FalsePositiveRate")]
    pub false_positive_rate: String,
    #[serde(rename = "Efficiency")]
    pub efficiency: Efficiency,
    #[serde(skip)]
    pub tp_rate: f64,
    #[serde(skip)]
    pub fp_rate: f64,
}

/// One row of the data ingestion report
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IngestionRow {
    #[serde(rename = "DataType")]
    pub data_type: String,
    #[serde(rename = "Solution")]
    pub solution: String,
    #[serde(rename = "TotalGB_30Days")]
    pub total_gb: f64,
    #[serde(rename = "DailyAverageGB")]
    pub daily_average_gb: f64,
    #[serde(rename = "VolumeCategory")]
    pub volume_category: VolumeCategory,
}

/// One optimisation recommendation
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Recommendation {
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Impact")]
    pub impact: Impact,
    #[serde(rename = "Action")]
    pub action: String,
}

/// `41.67%`, with a trailing `.0` kept for whole numbers (`100.0%`)
fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{:.1}%", rate)
    } else {
        format!("{}%", rate)
    }
}

/// Rule efficiency rows from the efficiency query's table
pub fn rule_efficiency(table: &QueryTable) -> Vec<RuleEfficiencyRow> {
    let rows: Vec<RuleEfficiencyRow> = table
        .records()
        .map(|r| {
            let tp_rate = r.f64("TruePositiveRate").unwrap_or(0.0);
            let fp_rate = r.f64("FalsePositiveRate").unwrap_or(0.0);
            RuleEfficiencyRow {
                rule_name: r.str("AlertName").unwrap_or("Unknown").to_string(),
                product: r.str("ProductName").unwrap_or("Unknown").to_string(),
                severity: r.str("Severity").unwrap_or("Unknown").to_string(),
                total_alerts: r.u64("AlertCount").unwrap_or(0),
                true_positives: r.u64("TruePositives").unwrap_or(0),
                false_positives: r.u64("FalsePositives").unwrap_or(0),
                true_positive_rate: format_rate(tp_rate),
                false_positive_rate: format_rate(fp_rate),
                efficiency: Efficiency::from_true_positive_rate(tp_rate),
                tp_rate,
                fp_rate,
            }
        })
        .collect();

    debug!("Analyzed {} rules", rows.len());
    rows
}

/// Ingestion rows from the usage query's table
pub fn data_ingestion(table: &QueryTable) -> Vec<IngestionRow> {
    let rows: Vec<IngestionRow> = table
        .records()
        .map(|r| {
            let total_gb = r.f64("TotalGB").unwrap_or(0.0);
            IngestionRow {
                data_type: r.str("DataType").unwrap_or("Unknown").to_string(),
                solution: r.str("Solution").unwrap_or("Unknown").to_string(),
                total_gb,
                daily_average_gb: r.f64("DailyAverageGB").unwrap_or(0.0),
                volume_category: VolumeCategory::from_total_gb(total_gb),
            }
        })
        .collect();

    debug!("Analyzed {} data types", rows.len());
    rows
}

/// Recommendations derived from both analyses
pub fn recommendations(rules: &[RuleEfficiencyRow], ingestion: &[IngestionRow]) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    let high_fp = rules
        .iter()
        .filter(|r| r.fp_rate > HIGH_FALSE_POSITIVE_RATE)
        .count();
    if high_fp > 0 {
        recs.push(Recommendation {
            category: "Rule Optimization".to_string(),
            kind: "High False Positive Rate".to_string(),
            description: format!("{} rules have >50% false positive rate", high_fp),
            impact: Impact::High,
            action: "Review and tune rule logic to reduce false positives".to_string(),
        });
    }

    let low_tp = rules
        .iter()
        .filter(|r| r.tp_rate < LOW_TRUE_POSITIVE_RATE)
        .count();
    if low_tp > 0 {
        recs.push(Recommendation {
            category: "Rule Optimization".to_string(),
            kind: "Low True Positive Rate".to_string(),
            description: format!("{} rules have <20% true positive rate", low_tp),
            impact: Impact::Medium,
            action: "Evaluate rule effectiveness and consider disabling or improving".to_string(),
        });
    }

    let high_volume = ingestion
        .iter()
        .filter(|d| d.volume_category == VolumeCategory::High)
        .count();
    if high_volume > 0 {
        recs.push(Recommendation {
            category: "Data Management".to_string(),
            kind: "High Volume Ingestion".to_string(),
            description: format!("{} data types consuming >100GB/month", high_volume),
            impact: Impact::High,
            action: "Review data retention policies and filtering rules".to_string(),
        });
    }

    if rules.len() < MIN_RULE_COVERAGE {
        recs.push(Recommendation {
            category: "Coverage".to_string(),
            kind: "Low Rule Coverage".to_string(),
            description: "Limited number of active detection rules".to_string(),
            impact: Impact::High,
            action: "Enable more detection rules from Sentinel rule templates".to_string(),
        });
    }

    debug!("Generated {} recommendations", recs.len());
    recs
}
