//! Microsoft Sentinel / Log Analytics client module
//!
//! Every call goes through Azure Resource Manager, so a single
//! management-scope credential covers the whole run.

pub mod alert_rules;
mod client;
pub mod content_packages;
pub mod query;
pub mod traits;
pub mod workspaces;

pub use alert_rules::AlertRule;
pub use client::SentinelClient;
pub use content_packages::ContentPackage;
pub use query::{QueryRecord, QueryResult, QueryTable};
pub use traits::{ArmListResponse, ArmResource, PaginatedResponse};
pub use workspaces::{Workspace, WorkspaceRef};
