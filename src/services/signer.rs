use crate::config::{CloudinaryConfig, SignatureAlgorithm};
use chrono::Utc;
use serde::Serialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

/// Closed set of folders the backend is willing to sign uploads into. Keeping
/// this an enum (instead of a caller-supplied string) means an arbitrary
/// folder can never reach the signing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFolder {
    Products,
    Posts,
}

impl UploadFolder {
    /// Folder path inside the Cloudinary media library.
    pub fn as_path(&self) -> &'static str {
        match self {
            UploadFolder::Products => "mycms/products",
            UploadFolder::Posts => "mycms/posts",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "products" | "mycms/products" => Some(UploadFolder::Products),
            "posts" | "mycms/posts" => Some(UploadFolder::Posts),
            _ => None,
        }
    }
}

/// Everything the browser upload widget needs to POST a file straight to
/// Cloudinary. Field names follow the widget's existing contract.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedUpload {
    pub cloud_name: String,
    pub api_key: String,
    pub timestamp: i64,
    pub signature: String,
    pub folder: String,
    pub upload_preset: Option<String>,
}

/// Produces time-limited upload authorizations without ever exposing the API
/// secret. Cloudinary recomputes the same digest over the same sorted
/// parameter string, so the serialization here has to match its verifier
/// exactly: parameters sorted lexicographically, joined as `name=value`
/// pairs with `&`, secret appended last.
pub struct UploadSigner {
    config: CloudinaryConfig,
}

impl UploadSigner {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self { config }
    }

    pub fn sign(&self, folder: UploadFolder) -> SignedUpload {
        self.sign_at(folder, Utc::now().timestamp())
    }

    /// Deterministic variant: same folder, timestamp and secret always yield
    /// the same signature. Expiry is enforced by Cloudinary rejecting stale
    /// timestamps, not by us.
    pub fn sign_at(&self, folder: UploadFolder, timestamp: i64) -> SignedUpload {
        let mut params: Vec<(&str, String)> = vec![
            ("folder", folder.as_path().to_string()),
            ("timestamp", timestamp.to_string()),
        ];

        if let Some(preset) = &self.config.upload_preset {
            params.push(("upload_preset", preset.clone()));
        }

        params.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        let signature = self.digest(&to_sign);

        SignedUpload {
            cloud_name: self.config.cloud_name.clone(),
            api_key: self.config.api_key.clone(),
            timestamp,
            signature,
            folder: folder.as_path().to_string(),
            upload_preset: self.config.upload_preset.clone(),
        }
    }

    /// Recomputes the signature the way the external verifier would and
    /// compares. Mainly here so the contract stays testable end to end.
    pub fn verify(&self, folder: UploadFolder, timestamp: i64, signature: &str) -> bool {
        self.sign_at(folder, timestamp).signature == signature
    }

    fn digest(&self, to_sign: &str) -> String {
        let payload = format!("{}{}", to_sign, self.config.api_secret);
        match self.config.signature_algorithm {
            SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
            SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(preset: Option<&str>) -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key123".to_string(),
            api_secret: "s3cret".to_string(),
            upload_preset: preset.map(str::to_string),
            signature_algorithm: SignatureAlgorithm::Sha1,
        }
    }

    #[test]
    fn test_signature_is_deterministic() {
        let signer = UploadSigner::new(test_config(None));
        let a = signer.sign_at(UploadFolder::Products, 1_700_000_000);
        let b = signer.sign_at(UploadFolder::Products, 1_700_000_000);
        assert_eq!(a.signature, b.signature);
    }

    #[test]
    fn test_verifier_recomputation_matches() {
        let signer = UploadSigner::new(test_config(Some("unsigned_cms")));
        let signed = signer.sign_at(UploadFolder::Posts, 1_700_000_000);
        assert!(signer.verify(UploadFolder::Posts, 1_700_000_000, &signed.signature));
        assert!(!signer.verify(UploadFolder::Products, 1_700_000_000, &signed.signature));
        assert!(!signer.verify(UploadFolder::Posts, 1_700_000_001, &signed.signature));
    }

    #[test]
    fn test_known_sha1_vector() {
        // sha1("folder=mycms/products&timestamp=1700000000" + "s3cret")
        let signer = UploadSigner::new(test_config(None));
        let signed = signer.sign_at(UploadFolder::Products, 1_700_000_000);

        let expected = hex::encode(Sha1::digest(
            b"folder=mycms/products&timestamp=1700000000s3cret",
        ));
        assert_eq!(signed.signature, expected);
    }

    #[test]
    fn test_preset_enters_signed_set_sorted() {
        let signer = UploadSigner::new(test_config(Some("unsigned_cms")));
        let signed = signer.sign_at(UploadFolder::Products, 1_700_000_000);

        let expected = hex::encode(Sha1::digest(
            b"folder=mycms/products&timestamp=1700000000&upload_preset=unsigned_cmss3cret",
        ));
        assert_eq!(signed.signature, expected);
        assert_eq!(signed.upload_preset.as_deref(), Some("unsigned_cms"));
    }

    #[test]
    fn test_absent_preset_is_not_signed() {
        let with = UploadSigner::new(test_config(Some("unsigned_cms")))
            .sign_at(UploadFolder::Products, 1_700_000_000);
        let without = UploadSigner::new(test_config(None))
            .sign_at(UploadFolder::Products, 1_700_000_000);
        assert_ne!(with.signature, without.signature);
        assert_eq!(without.upload_preset, None);
    }

    #[test]
    fn test_sha256_algorithm() {
        let mut config = test_config(None);
        config.signature_algorithm = SignatureAlgorithm::Sha256;
        let signer = UploadSigner::new(config);
        let signed = signer.sign_at(UploadFolder::Products, 1_700_000_000);

        let expected = hex::encode(Sha256::digest(
            b"folder=mycms/products&timestamp=1700000000s3cret",
        ));
        assert_eq!(signed.signature, expected);
    }

    #[test]
    fn test_folder_param_parsing() {
        assert_eq!(
            UploadFolder::from_param("products"),
            Some(UploadFolder::Products)
        );
        assert_eq!(
            UploadFolder::from_param("mycms/posts"),
            Some(UploadFolder::Posts)
        );
        assert_eq!(UploadFolder::from_param("../secrets"), None);
        assert_eq!(UploadFolder::from_param(""), None);
    }
}
