//! Alert rules module - list Sentinel analytic rules

mod api;
mod models;

pub use models::{AlertRule, AlertRuleProperties};
