//! Audit reports built from workspace queries and ARM listings

mod commands;
pub mod rules;
pub mod soc;
pub mod solutions;
pub mod version;

pub use commands::{
    acquire_credential, effective_auth_mode, rules_inventory, run_auth_command,
    run_rules_command, run_soc_command, run_solutions_command, soc_audit, solutions_inventory,
    workspace_ref, SocReport, SolutionsReport,
};
pub use rules::{AnalyticRuleRow, RuleInventorySummary};
pub use soc::{Efficiency, Impact, IngestionRow, Recommendation, RuleEfficiencyRow, VolumeCategory};
pub use solutions::{SolutionRow, SolutionUpdateRow};
