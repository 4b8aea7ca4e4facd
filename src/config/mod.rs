use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

/// Digest used for the Cloudinary upload signature. The verifier on the
/// Cloudinary side recomputes the signature with the algorithm configured on
/// the account, SHA-1 being their default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "sha256" => SignatureAlgorithm::Sha256,
            _ => SignatureAlgorithm::Sha1,
        }
    }
}

/// Cloudinary credentials. The API secret never leaves the server; only the
/// cloud name and API key are handed to the browser.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub upload_preset: Option<String>,
    pub signature_algorithm: SignatureAlgorithm,
}

impl CloudinaryConfig {
    /// Load from environment. Missing credentials are a fatal configuration
    /// error, never silently defaulted.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            cloud_name: require("CLOUDINARY_CLOUD_NAME")?,
            api_key: require("CLOUDINARY_API_KEY")?,
            api_secret: require("CLOUDINARY_API_SECRET")?,
            upload_preset: normalize_preset(
                env::var("CLOUDINARY_UPLOAD_PRESET").ok().as_deref(),
            ),
            signature_algorithm: env::var("CLOUDINARY_SIGNATURE_ALGORITHM")
                .map(|v| SignatureAlgorithm::from_env_value(&v))
                .unwrap_or_default(),
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// A whitespace-only preset counts as absent so it never enters the signed
/// parameter set.
pub(crate) fn normalize_preset(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Storage quota settings for the Cloudinary account.
#[derive(Debug, Clone, Copy)]
pub struct QuotaConfig {
    /// Byte ceiling the utilization percentage is computed against.
    pub capacity_bytes: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: 2 * 1024 * 1024 * 1024, // 2 GiB plan
        }
    }
}

impl QuotaConfig {
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            capacity_bytes: env::var("STORAGE_CAPACITY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.capacity_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_preset() {
        assert_eq!(normalize_preset(None), None);
        assert_eq!(normalize_preset(Some("")), None);
        assert_eq!(normalize_preset(Some("   ")), None);
        assert_eq!(
            normalize_preset(Some("  unsigned_cms ")),
            Some("unsigned_cms".to_string())
        );
    }

    #[test]
    fn test_signature_algorithm_parsing() {
        assert_eq!(
            SignatureAlgorithm::from_env_value("sha256"),
            SignatureAlgorithm::Sha256
        );
        assert_eq!(
            SignatureAlgorithm::from_env_value("SHA256"),
            SignatureAlgorithm::Sha256
        );
        assert_eq!(
            SignatureAlgorithm::from_env_value("sha1"),
            SignatureAlgorithm::Sha1
        );
        assert_eq!(
            SignatureAlgorithm::from_env_value("anything-else"),
            SignatureAlgorithm::Sha1
        );
    }

    #[test]
    fn test_default_quota_config() {
        let config = QuotaConfig::default();
        assert_eq!(config.capacity_bytes, 2 * 1024 * 1024 * 1024);
    }
}
