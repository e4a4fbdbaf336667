use crate::config::Config;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public service settings the upload UI needs
#[derive(ToSchema, Deserialize, Serialize, Default, Debug, Clone, PartialEq)]
pub struct ServiceInfo {
    #[serde(rename = "appName")]
    pub app_name: String,
    pub deployment: String,
    #[serde(rename = "targetSheet")]
    pub target_sheet: String,
    #[serde(rename = "maxUploadBytes")]
    pub max_upload_bytes: usize,
}

impl From<&Config> for ServiceInfo {
    fn from(config: &Config) -> Self {
        Self {
            app_name: config.app_name.clone(),
            deployment: config.deployment.clone(),
            target_sheet: config.target_sheet.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

#[derive(ToSchema, Deserialize, Serialize)]
pub struct HealthCheck {
    pub status: String,
}
