//! Content packages module - installed Content Hub solutions

mod api;
mod models;

pub use models::{ContentAuthor, ContentPackage, ContentPackageProperties, ContentSupport};
