use crate::config::CloudinaryConfig;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UsageError {
    /// The usage API itself failed (network, auth, 5xx). Relayed upstream.
    #[error("cloudinary usage API error: {0}")]
    Upstream(String),

    /// The report arrived but carried no usable byte count. Callers that
    /// must stay up treat this as "no data" instead of a hard failure.
    #[error("unexpected usage report shape: {0}")]
    Shape(String),
}

/// Reports how many bytes of media storage the account currently uses.
#[async_trait]
pub trait UsageReporter: Send + Sync {
    async fn storage_used_bytes(&self) -> Result<u64, UsageError>;
}

/// Calls the Cloudinary Admin API usage endpoint with basic auth.
pub struct CloudinaryUsageClient {
    http: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryUsageClient {
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    fn usage_url(&self) -> String {
        format!("https://api.cloudinary.com/v1_1/{}/usage", self.cloud_name)
    }
}

#[async_trait]
impl UsageReporter for CloudinaryUsageClient {
    async fn storage_used_bytes(&self) -> Result<u64, UsageError> {
        let response = self
            .http
            .get(self.usage_url())
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await
            .map_err(|e| UsageError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UsageError::Upstream(format!(
                "usage API returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| UsageError::Upstream(e.to_string()))?;

        normalize_storage_usage(&body)
    }
}

/// Maps the documented `storage.usage` field of the usage report to a byte
/// count. The report historically carried the value under several names; we
/// read the one the API documents and fail loudly if it is gone, rather than
/// probing legacy fields forever.
pub fn normalize_storage_usage(report: &Value) -> Result<u64, UsageError> {
    report
        .get("storage")
        .and_then(|storage| storage.get("usage"))
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            UsageError::Shape("no numeric storage.usage field in usage report".to_string())
        })
}
