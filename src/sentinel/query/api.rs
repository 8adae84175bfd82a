//! KQL query execution through the ARM workspace query endpoint

use log::debug;

use crate::config::api;
use crate::error::Result;
use crate::sentinel::SentinelClient;

use super::models::{QueryRequest, QueryResult};

impl SentinelClient {
    /// Run a KQL query over `timespan` (ISO 8601 duration, e.g. `P30D`)
    pub async fn run_query(&self, kql: &str, timespan: &str) -> Result<QueryResult> {
        let path = format!("{}/api/query", self.workspace().resource_path());
        let url = self.url(&path, api::QUERY_API_VERSION);
        debug!("Running query over {} at: {}", timespan, url);

        let response = self
            .post(&url)
            .json(&QueryRequest {
                query: kql,
                timespan,
            })
            .send()
            .await?;

        let result: QueryResult = self
            .parse_api_response(response, "query results")
            .await?;
        debug!(
            "Query returned {} table(s), {} primary row(s)",
            result.tables.len(),
            result.primary().map(|t| t.len()).unwrap_or(0)
        );
        Ok(result)
    }
}
