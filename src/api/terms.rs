//! Terms & conditions versions.

use serde::Deserialize;

use super::{ApiClient, ApiError};
use crate::fields::{LocalizedField, loose_bool, loose_id, loose_label};

/// Legacy records name the id `condition_id`, the title `titre`, the
/// creation timestamp `date_creation`, and may send the version tag as a
/// number and the active flag as a bool or "true"/"1".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsVersion {
    #[serde(alias = "condition_id", alias = "_id", deserialize_with = "loose_id")]
    pub id: String,
    #[serde(default, alias = "titre")]
    pub title: Option<LocalizedField>,
    /// Version tag assigned by the editor; renders as "v1" when absent
    #[serde(default, deserialize_with = "loose_label")]
    pub version: Option<String>,
    #[serde(default, alias = "active", deserialize_with = "loose_bool")]
    pub is_active: bool,
    #[serde(default, alias = "created_at", alias = "date_creation")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
}

impl ApiClient {
    /// List all terms & conditions versions.
    pub async fn list_terms_versions(&self) -> Result<Vec<TermsVersion>, ApiError> {
        self.get_json("/admin/terms").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_record_with_condition_id_and_numeric_version() {
        let version: TermsVersion = serde_json::from_str(
            r#"{
                "condition_id": 3,
                "titre": {"fr": "Conditions d'utilisation"},
                "version": 2,
                "active": "true",
                "date_creation": "2023-12-01 08:00:00"
            }"#,
        )
        .unwrap();

        assert_eq!(version.id, "3");
        assert_eq!(version.title.unwrap().display(), "Conditions d'utilisation");
        assert_eq!(version.version.as_deref(), Some("2"));
        assert!(version.is_active);
        assert_eq!(version.created_at.as_deref(), Some("2023-12-01 08:00:00"));
    }

    #[test]
    fn test_record_without_version_tag() {
        let version: TermsVersion =
            serde_json::from_str(r#"{"id": "t-1", "active": false}"#).unwrap();

        assert_eq!(version.id, "t-1");
        assert_eq!(version.version, None);
        assert!(!version.is_active);
    }

    #[test]
    fn test_camel_case_record_with_string_version() {
        let version: TermsVersion = serde_json::from_str(
            r#"{"id": "t-2", "title": "Terms", "version": "2.1", "isActive": true}"#,
        )
        .unwrap();

        assert_eq!(version.version.as_deref(), Some("2.1"));
        assert!(version.is_active);
    }
}
