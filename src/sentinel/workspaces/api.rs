//! Workspace API operations

use log::debug;

use crate::config::api;
use crate::error::{AuditError, Result};
use crate::sentinel::client::api_error;
use crate::sentinel::SentinelClient;

use super::models::Workspace;

impl SentinelClient {
    /// Get the bound workspace resource
    pub async fn get_workspace(&self) -> Result<Workspace> {
        let workspace = self.workspace().clone();
        let url = self.url(&workspace.resource_path(), api::WORKSPACE_API_VERSION);
        let label = format!("workspace '{}'", workspace.workspace_name);
        debug!("Fetching {} from: {}", label, url);

        let response = self.get(&url).send().await?;

        match response.status().as_u16() {
            404 => Err(AuditError::Config(format!(
                "Workspace '{}' not found in resource group '{}' (subscription {})",
                workspace.workspace_name, workspace.resource_group, workspace.subscription_id
            ))),
            status if (200..300).contains(&status) => {
                self.parse_api_response(response, &label).await
            }
            _ => Err(api_error(response, &label).await),
        }
    }
}
