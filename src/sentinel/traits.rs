//! Common traits for ARM resources

use serde::Deserialize;

/// Common trait for ARM resources (workspaces, alert rules, content packages)
pub trait ArmResource {
    /// Full ARM resource id
    fn id(&self) -> &str;

    /// Resource name (last id segment)
    fn name(&self) -> &str;

    /// Name shown to operators; defaults to the resource name
    fn display_name(&self) -> &str {
        self.name()
    }
}

/// Trait for ARM list responses that page with `nextLink`
///
/// Implement this for any list wrapper to use it with
/// `SentinelClient::fetch_all_pages()`.
pub trait PaginatedResponse<T> {
    /// Consume self and return the items of this page
    fn into_value(self) -> Vec<T>;
    /// Absolute URL of the next page, if any
    fn next_link(&self) -> Option<&str>;
}

/// Generic ARM list response
#[derive(Deserialize, Debug)]
pub struct ArmListResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default, rename = "nextLink")]
    pub next_link: Option<String>,
}

impl<T> PaginatedResponse<T> for ArmListResponse<T> {
    fn into_value(self) -> Vec<T> {
        self.value
    }

    fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref().filter(|link| !link.is_empty())
    }
}

/// ARM error envelope
#[derive(Deserialize, Debug)]
pub struct ArmErrorResponse {
    pub error: ArmErrorDetail,
}

#[derive(Deserialize, Debug)]
pub struct ArmErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ArmErrorDetail {
    /// `code: message`, or whichever of the two is present
    pub fn summary(&self) -> Option<String> {
        match (self.code.as_deref(), self.message.as_deref()) {
            (Some(code), Some(message)) => Some(format!("{}: {}", code, message)),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestResource {
        id: String,
        name: String,
    }

    impl ArmResource for TestResource {
        fn id(&self) -> &str {
            &self.id
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    #[test]
    fn test_display_name_defaults_to_name() {
        let resource = TestResource {
            id: "/subscriptions/s/x/abc".to_string(),
            name: "abc".to_string(),
        };
        assert_eq!(resource.display_name(), "abc");
        assert!(resource.id().ends_with("/abc"));
    }

    #[test]
    fn test_list_response_without_next_link() {
        let resp: ArmListResponse<serde_json::Value> =
            serde_json::from_str(r#"{"value": [1, 2]}"#).unwrap();
        assert!(resp.next_link().is_none());
        assert_eq!(resp.into_value().len(), 2);
    }

    #[test]
    fn test_empty_next_link_ends_paging() {
        let resp: ArmListResponse<serde_json::Value> =
            serde_json::from_str(r#"{"value": [], "nextLink": ""}"#).unwrap();
        assert!(resp.next_link().is_none());
    }

    #[test]
    fn test_error_summary() {
        let err: ArmErrorResponse = serde_json::from_str(
            r#"{"error": {"code": "PathNotFoundError", "message": "bad path"}}"#,
        )
        .unwrap();
        assert_eq!(
            err.error.summary().as_deref(),
            Some("PathNotFoundError: bad path")
        );
    }
}
