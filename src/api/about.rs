//! About Us content versions.

use serde::Deserialize;

use super::{ApiClient, ApiError};
use crate::fields::{LocalizedField, loose_bool, loose_id};

/// One version of the About Us page. At most one version is active at a
/// time; activation is handled server-side.
///
/// Legacy records name the id `about_id` (or `pk`, or a bare numeric
/// `id`), the title `titre`, and send the active flag as a bool or as
/// the strings "true"/"1".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutVersion {
    #[serde(alias = "about_id", alias = "pk", alias = "_id", deserialize_with = "loose_id")]
    pub id: String,
    #[serde(default, alias = "titre")]
    pub title: Option<LocalizedField>,
    #[serde(default, alias = "active", deserialize_with = "loose_bool")]
    pub is_active: bool,
    #[serde(default, alias = "created_at", alias = "date_creation")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
}

impl ApiClient {
    /// List all About Us content versions.
    pub async fn list_about_versions(&self) -> Result<Vec<AboutVersion>, ApiError> {
        self.get_json("/admin/about").await
    }

    /// Activate a version, deactivating whichever was active before.
    pub async fn activate_about_version(&self, id: &str) -> Result<(), ApiError> {
        self.post_unit(&format!("/admin/about/{}/activate", id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_record_with_numeric_about_id_and_string_flag() {
        let version: AboutVersion = serde_json::from_str(
            r#"{
                "about_id": 7,
                "titre": [{"lang": "en", "value": "About us"}],
                "active": "1",
                "created_at": "2024-01-15T10:00:00.000Z"
            }"#,
        )
        .unwrap();

        assert_eq!(version.id, "7");
        assert_eq!(version.title.unwrap().display(), "About us");
        assert!(version.is_active);
        assert_eq!(version.created_at.as_deref(), Some("2024-01-15T10:00:00.000Z"));
    }

    #[test]
    fn test_record_with_pk_and_bool_flag() {
        let version: AboutVersion = serde_json::from_str(
            r#"{"pk": "a-42", "titre": {"fr": "À propos"}, "active": true}"#,
        )
        .unwrap();

        assert_eq!(version.id, "a-42");
        assert!(version.is_active);
        assert_eq!(version.created_at, None);
    }

    #[test]
    fn test_record_with_bare_numeric_id() {
        let version: AboutVersion =
            serde_json::from_str(r#"{"id": 3, "active": "false"}"#).unwrap();

        assert_eq!(version.id, "3");
        assert!(!version.is_active);
        assert!(version.title.is_none());
    }

    #[test]
    fn test_camel_case_record() {
        let version: AboutVersion = serde_json::from_str(
            r#"{"id": "a1", "title": {"en": "About"}, "isActive": true, "updatedAt": "2024-02-01"}"#,
        )
        .unwrap();

        assert_eq!(version.id, "a1");
        assert!(version.is_active);
        assert_eq!(version.updated_at.as_deref(), Some("2024-02-01"));
    }
}
