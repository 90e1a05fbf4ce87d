//! Application configuration.
//!
//! Deserializable settings for the backend endpoint, service selection,
//! per-service options, and the upload policy. Everything defaults so a
//! bare `AppConfig::default()` talks to a local backend.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vocalink_core::{DEFAULT_MAX_FILE_SIZE, TypePattern, UploadPolicy};

/// One option passed through to a backend service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOption {
    /// Option name, e.g. `model`.
    pub name: String,
    /// Option value, passed through opaquely.
    pub value: serde_json::Value,
}

/// Options for a named backend service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name, e.g. `llm` or `tts`.
    pub service: String,
    /// Options forwarded to that service.
    pub options: Vec<ServiceOption>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Backend base URL.
    pub base_url: String,
    /// Service selection, e.g. `llm -> openai`.
    pub services: HashMap<String, String>,
    /// Per-service options.
    pub service_config: Vec<ServiceConfig>,
    /// Maximum accepted upload size in bytes.
    pub max_file_size: u64,
    /// Upload allow-list entries: exact MIME, `prefix/*`, or `.ext`.
    pub supported_file_types: Vec<String>,
    /// Start the local camera on connect.
    pub enable_cam: bool,
    /// Start the local microphone on connect.
    pub enable_mic: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7860".into(),
            services: HashMap::new(),
            service_config: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            supported_file_types: vec![
                "image/*".into(),
                "application/pdf".into(),
                "text/*".into(),
                ".docx".into(),
                ".doc".into(),
            ],
            enable_cam: true,
            enable_mic: true,
        }
    }
}

impl AppConfig {
    /// Build the upload validation policy from the configured limits.
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            max_size: self.max_file_size,
            allowed_types: self
                .supported_file_types
                .iter()
                .map(|pattern| TypePattern::parse(pattern))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_backend() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, "http://localhost:7860");
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert!(config.enable_cam);
        assert!(config.enable_mic);
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "baseUrl": "https://assistant.example.com",
                "services": { "llm": "openai", "tts": "elevenlabs" },
                "serviceConfig": [
                    {
                        "service": "llm",
                        "options": [
                            { "name": "model", "value": "gpt-4o-mini" },
                            { "name": "temperature", "value": 0.7 }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://assistant.example.com");
        assert_eq!(config.services["tts"], "elevenlabs");
        assert_eq!(config.service_config[0].options[0].name, "model");
        // Omitted fields fall back to defaults
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.supported_file_types.len(), 5);
    }

    #[test]
    fn upload_policy_reflects_configured_limits() {
        let config = AppConfig {
            max_file_size: 1024,
            supported_file_types: vec!["audio/*".into()],
            ..AppConfig::default()
        };
        let policy = config.upload_policy();

        assert_eq!(policy.max_size, 1024);
        assert_eq!(policy.allowed_types, vec![TypePattern::Prefix("audio/".into())]);
    }
}
