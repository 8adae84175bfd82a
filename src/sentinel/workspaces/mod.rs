//! Workspaces module - locate the Log Analytics workspace

mod api;
mod models;

pub use models::{Workspace, WorkspaceProperties, WorkspaceRef, WorkspaceSku};
