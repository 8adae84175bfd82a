//! Content package API operations

use crate::config::api;
use crate::error::Result;
use crate::sentinel::traits::ArmListResponse;
use crate::sentinel::SentinelClient;

use super::models::ContentPackage;

impl SentinelClient {
    /// Get all installed Content Hub packages (with pagination)
    pub async fn list_content_packages(&self) -> Result<Vec<ContentPackage>> {
        let path = self.workspace().security_insights_path("contentPackages");
        let error_context = format!(
            "installed solutions for workspace '{}'",
            self.workspace().workspace_name
        );

        self.fetch_all_pages::<ContentPackage, ArmListResponse<ContentPackage>>(
            &path,
            api::SECURITY_INSIGHTS_API_VERSION,
            &error_context,
        )
        .await
    }

    /// Get the Content Hub catalog available to the workspace (with pagination)
    pub async fn list_content_product_packages(&self) -> Result<Vec<ContentPackage>> {
        let path = self
            .workspace()
            .security_insights_path("contentProductPackages");
        let error_context = format!(
            "Content Hub catalog for workspace '{}'",
            self.workspace().workspace_name
        );

        self.fetch_all_pages::<ContentPackage, ArmListResponse<ContentPackage>>(
            &path,
            api::SECURITY_INSIGHTS_API_VERSION,
            &error_context,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PACKAGES_PATH: &str = "/subscriptions/sub-1/resourceGroups/rg-sec/providers/Microsoft.OperationalInsights/workspaces/law-sec/providers/Microsoft.SecurityInsights/contentPackages";

    #[tokio::test]
    async fn test_list_content_packages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PACKAGES_PATH))
            .and(query_param("api-version", "2023-11-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [
                    { "id": "p1", "name": "p1", "properties": { "displayName": "Azure Activity", "version": "3.0.2" } },
                    { "id": "p2", "name": "p2", "properties": { "displayName": "Microsoft Entra ID", "version": "3.1.0" } }
                ]
            })))
            .mount(&server)
            .await;

        let client = SentinelClient::test_client(&server.uri());
        let packages = client.list_content_packages().await.unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[1].version(), "3.1.0");
    }

    #[tokio::test]
    async fn test_list_content_product_packages_follows_next_link() {
        let server = MockServer::start().await;
        let catalog_path = PACKAGES_PATH.replace("contentPackages", "contentProductPackages");
        Mock::given(method("GET"))
            .and(path(catalog_path.as_str()))
            .and(query_param("$skipToken", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [
                    { "id": "c2", "name": "c2", "properties": { "contentId": "entra-id", "version": "3.2.0" } }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(catalog_path.as_str()))
            .and(query_param("api-version", "2023-11-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [
                    { "id": "c1", "name": "c1", "properties": { "contentId": "azure-activity", "version": "3.0.3" } }
                ],
                "nextLink": format!("{}{}?api-version=2023-11-01&$skipToken=page2", server.uri(), catalog_path)
            })))
            .mount(&server)
            .await;

        let client = SentinelClient::test_client(&server.uri());
        let catalog = client.list_content_product_packages().await.unwrap();
        let ids: Vec<&str> = catalog.iter().map(|p| p.content_id()).collect();
        assert_eq!(ids, vec!["azure-activity", "entra-id"]);
    }

    #[tokio::test]
    async fn test_list_content_packages_missing_sentinel() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PACKAGES_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": { "code": "NotFound", "message": "Sentinel is not onboarded" }
            })))
            .mount(&server)
            .await;

        let client = SentinelClient::test_client(&server.uri());
        let err = client.list_content_packages().await.unwrap_err();
        assert!(matches!(err, AuditError::Api { status: 404, ref message } if message.contains("not onboarded")));
    }
}
