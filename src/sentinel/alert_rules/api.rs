//! Analytic rule API operations

use crate::config::api;
use crate::error::Result;
use crate::sentinel::traits::ArmListResponse;
use crate::sentinel::SentinelClient;

use super::models::AlertRule;

impl SentinelClient {
    /// Get all analytic rules of the workspace (with pagination)
    pub async fn list_alert_rules(&self) -> Result<Vec<AlertRule>> {
        let path = self.workspace().security_insights_path("alertRules");
        let error_context = format!(
            "analytic rules for workspace '{}'",
            self.workspace().workspace_name
        );

        self.fetch_all_pages::<AlertRule, ArmListResponse<AlertRule>>(
            &path,
            api::SECURITY_INSIGHTS_API_VERSION,
            &error_context,
        )
        .await
    }
}
