//! Analytic rule data models

use serde::Deserialize;

use crate::sentinel::traits::ArmResource;

/// Sentinel analytic (alert) rule
#[derive(Deserialize, Debug, Clone)]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    /// Scheduled, NRT, Fusion, MicrosoftSecurityIncidentCreation, ...
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub properties: AlertRuleProperties,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AlertRuleProperties {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub tactics: Vec<String>,
    #[serde(default)]
    pub techniques: Vec<String>,
    #[serde(default)]
    pub query_frequency: Option<String>,
    #[serde(default)]
    pub query_period: Option<String>,
    #[serde(default)]
    pub alert_rule_template_name: Option<String>,
    #[serde(default)]
    pub template_version: Option<String>,
    #[serde(default)]
    pub last_modified_utc: Option<String>,
}

impl AlertRule {
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or("Unknown")
    }

    /// Rules without an explicit flag are reported as disabled
    pub fn is_enabled(&self) -> bool {
        self.properties.enabled.unwrap_or(false)
    }

    pub fn severity(&self) -> &str {
        self.properties.severity.as_deref().unwrap_or("Unknown")
    }

    /// Whether the rule was created from a gallery template
    pub fn is_from_template(&self) -> bool {
        self.properties
            .alert_rule_template_name
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }
}

impl ArmResource for AlertRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        self.properties
            .display_name
            .as_deref()
            .unwrap_or(&self.name)
    }
}
