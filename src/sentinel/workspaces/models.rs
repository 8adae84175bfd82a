//! Workspace data models

use serde::Deserialize;

use crate::config::{env, EnvironmentConfig};
use crate::error::{AuditError, Result};
use crate::sentinel::traits::ArmResource;

/// The Log Analytics workspace an audit runs against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRef {
    pub subscription_id: String,
    pub resource_group: String,
    pub workspace_name: String,
}

impl WorkspaceRef {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        workspace_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            workspace_name: workspace_name.into(),
        }
    }

    /// Explicit values win, then the environment snapshot
    ///
    /// Fails with a configuration error naming every missing variable.
    pub fn resolve(
        subscription_id: Option<&str>,
        resource_group: Option<&str>,
        workspace_name: Option<&str>,
        env_config: &EnvironmentConfig,
    ) -> Result<Self> {
        let pick = |explicit: Option<&str>, fallback: Option<&str>| {
            explicit
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .or(fallback)
                .map(str::to_string)
        };

        let subscription = pick(subscription_id, env_config.subscription_id());
        let group = pick(resource_group, env_config.resource_group());
        let workspace = pick(workspace_name, env_config.workspace_name());

        match (subscription, group, workspace) {
            (Some(s), Some(g), Some(w)) => Ok(Self::new(s, g, w)),
            (s, g, w) => {
                let missing: Vec<&str> = [
                    (s.is_none(), env::SUBSCRIPTION_ID),
                    (g.is_none(), env::RESOURCE_GROUP),
                    (w.is_none(), env::WORKSPACE_NAME),
                ]
                .into_iter()
                .filter_map(|(is_missing, name)| is_missing.then_some(name))
                .collect();

                Err(AuditError::Config(format!(
                    "Missing required environment variables: {}. \
                     Set them in the environment or a .env file, or pass \
                     --subscription, --resource-group and --workspace.",
                    missing.join(", ")
                )))
            }
        }
    }

    /// ARM path of the workspace resource
    pub fn resource_path(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.OperationalInsights/workspaces/{}",
            self.subscription_id, self.resource_group, self.workspace_name
        )
    }

    /// ARM path of a Microsoft.SecurityInsights collection on this workspace
    pub fn security_insights_path(&self, collection: &str) -> String {
        format!(
            "{}/providers/Microsoft.SecurityInsights/{}",
            self.resource_path(),
            collection
        )
    }
}

impl std::fmt::Display for WorkspaceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.subscription_id, self.resource_group, self.workspace_name
        )
    }
}

/// Log Analytics workspace resource
#[derive(Deserialize, Debug, Clone)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub properties: WorkspaceProperties,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceProperties {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub retention_in_days: Option<u32>,
    #[serde(default)]
    pub sku: Option<WorkspaceSku>,
    #[serde(default)]
    pub provisioning_state: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WorkspaceSku {
    pub name: String,
}

impl Workspace {
    /// Workspace (customer) id used by Log Analytics
    pub fn customer_id(&self) -> Option<&str> {
        self.properties.customer_id.as_deref()
    }

    pub fn retention_in_days(&self) -> Option<u32> {
        self.properties.retention_in_days
    }

    pub fn sku_name(&self) -> Option<&str> {
        self.properties.sku.as_ref().map(|s| s.name.as_str())
    }
}

impl ArmResource for Workspace {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
