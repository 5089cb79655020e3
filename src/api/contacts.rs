//! Organization contact information.

use serde::Deserialize;

use super::{ApiClient, ApiError};
use crate::fields::{LocalizedField, loose_label};

/// The organization's contact record. The API exposes a single record;
/// address, city and wilaya are multilingual, the rest are plain values.
///
/// Legacy records use French field names: `telephone_1`, `telephone_2`,
/// `telephone_fixe`, `adresse`, `ville`, `site_web`, `horaires`,
/// `date_creation`. None of them is guaranteed to be present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default, alias = "contact_id", alias = "_id", deserialize_with = "loose_label")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "telephone_1")]
    pub phone: Option<String>,
    #[serde(default, alias = "telephone_2")]
    pub phone_secondary: Option<String>,
    #[serde(default, alias = "telephone_fixe")]
    pub landline: Option<String>,
    #[serde(default, alias = "adresse")]
    pub address: Option<LocalizedField>,
    #[serde(default, alias = "ville")]
    pub city: Option<LocalizedField>,
    #[serde(default)]
    pub wilaya: Option<LocalizedField>,
    #[serde(default, alias = "site_web")]
    pub website: Option<String>,
    #[serde(default, alias = "horaires")]
    pub opening_hours: Option<String>,
    #[serde(default, alias = "created_at", alias = "date_creation")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
}

impl ApiClient {
    /// Fetch the contact record.
    pub async fn get_contact(&self) -> Result<ContactInfo, ApiError> {
        self.get_json("/admin/contact").await
    }
}
