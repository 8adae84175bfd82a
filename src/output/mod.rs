//! Output module
//!
//! CSV report files and console summary tables

mod csv;
mod table;

pub use self::csv::ReportWriter;
pub use self::table::{
    disabled_rules_table, recommendations_table, rule_inventory_table, solution_updates_table,
    solutions_table, top_ingestion_table, top_rules_table,
};
