//! Installed Content Hub solutions and available updates

use serde::Serialize;

use crate::sentinel::{ArmResource, ContentPackage};

use super::version::{compare_versions, is_newer};

/// One row of the installed solutions report
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SolutionRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Kind")]
    pub kind: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "LatestVersion")]
    pub latest_version: String,
    #[serde(rename = "UpdateAvailable")]
    pub update_available: bool,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "SupportTier")]
    pub support_tier: String,
    #[serde(rename = "IsFeatured")]
    pub featured: bool,
    #[serde(rename = "IsPreview")]
    pub preview: bool,
    #[serde(rename = "ContentId")]
    pub content_id: String,
}

/// An installed solution with a newer catalog version
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SolutionUpdateRow {
    #[serde(rename = "SolutionName")]
    pub solution_name: String,
    #[serde(rename = "CurrentVersion")]
    pub current_version: String,
    #[serde(rename = "AvailableVersion")]
    pub available_version: String,
    #[serde(rename = "PackageId")]
    pub package_id: String,
    #[serde(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "InstalledId")]
    pub installed_id: String,
}

/// Newest catalog entry for an installed package
///
/// Matched by content id, then by display name.
fn catalog_entry<'a>(
    installed: &ContentPackage,
    catalog: &'a [ContentPackage],
) -> Option<&'a ContentPackage> {
    let by_id = catalog
        .iter()
        .filter(|c| c.content_id().eq_ignore_ascii_case(installed.content_id()));
    let newest = |a: &&ContentPackage, b: &&ContentPackage| compare_versions(a.version(), b.version());

    by_id.max_by(newest).or_else(|| {
        catalog
            .iter()
            .filter(|c| c.display_name() == installed.display_name())
            .max_by(newest)
    })
}

/// Catalog entry that is newer than what is installed; unknown versions never count
fn available_update<'a>(
    installed: &ContentPackage,
    catalog: &'a [ContentPackage],
) -> Option<&'a ContentPackage> {
    let current = installed.properties.version.as_deref()?;
    let entry = catalog_entry(installed, catalog)?;
    let available = entry.properties.version.as_deref()?;
    is_newer(current, available).then_some(entry)
}

fn solution_row(pkg: &ContentPackage, catalog: &[ContentPackage]) -> SolutionRow {
    let latest_version = catalog_entry(pkg, catalog)
        .map(|c| c.version())
        .unwrap_or("Unknown")
        .to_string();

    SolutionRow {
        name: pkg.display_name().to_string(),
        kind: pkg.kind().to_string(),
        version: pkg.version().to_string(),
        latest_version,
        update_available: available_update(pkg, catalog).is_some(),
        author: pkg.author().to_string(),
        support_tier: pkg.support_tier().to_string(),
        featured: pkg.is_featured(),
        preview: pkg.is_preview(),
        content_id: pkg.content_id().to_string(),
    }
}

/// Solution rows sorted by display name
pub fn installed_solutions(
    installed: &[ContentPackage],
    catalog: &[ContentPackage],
) -> Vec<SolutionRow> {
    let mut rows: Vec<SolutionRow> = installed
        .iter()
        .map(|pkg| solution_row(pkg, catalog))
        .collect();
    rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    rows
}

/// Installed solutions with a newer version in the catalog, sorted by name
pub fn solution_updates(
    installed: &[ContentPackage],
    catalog: &[ContentPackage],
) -> Vec<SolutionUpdateRow> {
    let mut rows: Vec<SolutionUpdateRow> = installed
        .iter()
        .filter_map(|pkg| {
            let entry = available_update(pkg, catalog)?;
            Some(SolutionUpdateRow {
                solution_name: pkg.display_name().to_string(),
                current_version: pkg.version().to_string(),
                available_version: entry.version().to_string(),
                package_id: entry.content_id().to_string(),
                publisher: entry.publisher().to_string(),
                installed_id: pkg.id().to_string(),
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        a.solution_name
            .to_lowercase()
            .cmp(&b.solution_name.to_lowercase())
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packages(value: serde_json::Value) -> Vec<ContentPackage> {
        serde_json::from_value(value).unwrap()
    }

    fn installed() -> Vec<ContentPackage> {
        packages(serde_json::json!([
            { "id": "p2", "name": "p2", "properties": { "displayName": "Microsoft Entra ID", "contentKind": "Solution", "version": "3.1.0", "isPreview": "true" } },
            { "id": "p1", "name": "p1", "properties": { "displayName": "Azure Activity", "contentId": "azure-activity", "version": "3.0.2" } },
            { "id": "p3", "name": "p3", "properties": { "displayName": "Threat Intelligence", "contentId": "ti" } }
        ]))
    }

    fn catalog() -> Vec<ContentPackage> {
        packages(serde_json::json!([
            { "id": "c1", "name": "c1", "properties": { "contentId": "Azure-Activity", "version": "3.0.10", "publisherDisplayName": "Microsoft" } },
            { "id": "c0", "name": "c0", "properties": { "contentId": "azure-activity", "version": "3.0.3" } },
            { "id": "c2", "name": "c2", "properties": { "contentId": "entra", "displayName": "Microsoft Entra ID", "version": "3.1" } },
            { "id": "c3", "name": "c3", "properties": { "contentId": "ti", "version": "4.0.0" } }
        ]))
    }

    #[test]
    fn test_installed_solutions_without_catalog() {
        let rows = installed_solutions(&installed(), &[]);
        assert_eq!(rows[0].name, "Azure Activity");
        assert_eq!(rows[0].content_id, "azure-activity");
        assert_eq!(rows[0].latest_version, "Unknown");
        assert!(!rows[0].update_available);
        assert_eq!(rows[1].content_id, "p2");
        assert!(rows[1].preview);
        assert_eq!(rows[2].version, "Unknown");
    }

    #[test]
    fn test_installed_solutions_with_catalog() {
        let rows = installed_solutions(&installed(), &catalog());

        // newest of two catalog entries, compared numerically
        assert_eq!(rows[0].latest_version, "3.0.10");
        assert!(rows[0].update_available);
        // matched by display name, same version
        assert_eq!(rows[1].latest_version, "3.1");
        assert!(!rows[1].update_available);
        // installed version unknown
        assert_eq!(rows[2].latest_version, "4.0.0");
        assert!(!rows[2].update_available);
    }

    #[test]
    fn test_solution_updates() {
        let updates = solution_updates(&installed(), &catalog());
        assert_eq!(
            updates,
            vec![SolutionUpdateRow {
                solution_name: "Azure Activity".to_string(),
                current_version: "3.0.2".to_string(),
                available_version: "3.0.10".to_string(),
                package_id: "Azure-Activity".to_string(),
                publisher: "Microsoft".to_string(),
                installed_id: "p1".to_string(),
            }]
        );
    }
}
