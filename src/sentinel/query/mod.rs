//! Query module - run KQL against the workspace

mod api;
mod models;

pub use models::{QueryColumn, QueryRecord, QueryRequest, QueryResult, QueryTable};
