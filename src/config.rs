use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub deployment: String,
    pub bind_address: String,
    /// Worksheet holding the readings, matched loosely against sheet names
    pub target_sheet: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load from .env file if available

        let max_upload_mb: usize = match env::var("MAX_UPLOAD_MB") {
            Ok(value) => value
                .trim()
                .parse()
                .with_context(|| format!("MAX_UPLOAD_MB must be a whole number, got '{value}'"))?,
            Err(_) => 30,
        };

        Ok(Config {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "iot-energy-sheets".to_string()),
            deployment: env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            target_sheet: env::var("TARGET_SHEET").unwrap_or_else(|_| "Master Data".to_string()),
            max_upload_bytes: megabytes_to_bytes(max_upload_mb)?,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            app_name: "iot-energy-sheets-test".to_string(),
            deployment: "test".to_string(),
            bind_address: "127.0.0.1:0".to_string(),
            target_sheet: "Master Data".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

fn megabytes_to_bytes(megabytes: usize) -> Result<usize> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow!("MAX_UPLOAD_MB is too large: {megabytes}"))
}
