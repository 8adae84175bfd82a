//! Content Hub package models

use serde::Deserialize;

use crate::sentinel::traits::ArmResource;

/// Content Hub package, either installed (`contentPackages`) or offered by
/// the catalog (`contentProductPackages`)
#[derive(Deserialize, Debug, Clone)]
pub struct ContentPackage {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: ContentPackageProperties,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContentPackageProperties {
    #[serde(default)]
    pub content_id: Option<String>,
    /// Solution, Standalone, ...
    #[serde(default)]
    pub content_kind: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<ContentAuthor>,
    #[serde(default)]
    pub support: Option<ContentSupport>,
    #[serde(default)]
    pub is_new: Option<String>,
    #[serde(default)]
    pub is_featured: Option<String>,
    #[serde(default)]
    pub is_preview: Option<String>,
    #[serde(default)]
    pub last_publish_date: Option<String>,
    /// Catalog entries only
    #[serde(default)]
    pub publisher_display_name: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ContentAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ContentSupport {
    #[serde(default)]
    pub tier: Option<String>,
}

/// ARM reports these flags as "true"/"false" strings
fn flag(value: &Option<String>) -> bool {
    value
        .as_deref()
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

impl ContentPackage {
    pub fn kind(&self) -> &str {
        self.properties.content_kind.as_deref().unwrap_or("Unknown")
    }

    pub fn version(&self) -> &str {
        self.properties.version.as_deref().unwrap_or("Unknown")
    }

    /// Content id shared by an installed package and its catalog entry
    pub fn content_id(&self) -> &str {
        self.properties.content_id.as_deref().unwrap_or(&self.name)
    }

    pub fn publisher(&self) -> &str {
        self.properties
            .publisher_display_name
            .as_deref()
            .unwrap_or_else(|| self.author())
    }

    pub fn author(&self) -> &str {
        self.properties
            .author
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .unwrap_or("Unknown")
    }

    pub fn support_tier(&self) -> &str {
        self.properties
            .support
            .as_ref()
            .and_then(|s| s.tier.as_deref())
            .unwrap_or("Unknown")
    }

    pub fn is_new(&self) -> bool {
        flag(&self.properties.is_new)
    }

    pub fn is_featured(&self) -> bool {
        flag(&self.properties.is_featured)
    }

    pub fn is_preview(&self) -> bool {
        flag(&self.properties.is_preview)
    }
}

impl ArmResource for ContentPackage {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        self.properties
            .display_name
            .as_deref()
            .unwrap_or(&self.name)
    }
}
