//! Report artifact upload.
//!
//! Stores return a durable download URL that is linked from the comment.

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::config::ArtifactTarget;
use crate::errors::AppError;

const GCS_UPLOAD_URL: &str = "https://storage.googleapis.com/upload/storage/v1/b";
const GCS_PUBLIC_URL: &str = "https://storage.googleapis.com";

/// Blob storage capability returning a download URL.
#[allow(async_fn_in_trait)]
pub trait ArtifactStore {
    async fn upload(&self, name: &str, data: &[u8], content_type: &str) -> Result<String, AppError>;
}

/// SHA-256 hex digest of an artifact, logged with every upload.
pub fn content_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Store writing artifacts into a local directory, e.g. one collected by
/// the CI platform's artifact step.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
    base_url: String,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }
}

impl ArtifactStore for LocalArtifactStore {
    async fn upload(&self, name: &str, data: &[u8], _content_type: &str) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(name);
        tokio::fs::write(&path, data).await.map_err(|e| {
            AppError::Upload(format!("Failed to write {}: {e}", path.display()))
        })?;

        tracing::info!(
            path = %path.display(),
            digest = %content_digest(data),
            "Stored report artifact"
        );

        let url = if self.base_url.is_empty() {
            path.display().to_string()
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), name)
        };
        Ok(url)
    }
}

/// Google Cloud Storage bucket, uploaded through the JSON API media
/// endpoint with a pre-issued OAuth access token.
#[derive(Debug, Clone)]
pub struct GcsArtifactStore {
    http: reqwest::Client,
    bucket: String,
    access_token: String,
    upload_base: String,
    public_base: String,
}

impl GcsArtifactStore {
    pub fn new(bucket: &str, access_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            bucket: bucket.to_string(),
            access_token: access_token.to_string(),
            upload_base: GCS_UPLOAD_URL.to_string(),
            public_base: GCS_PUBLIC_URL.to_string(),
        }
    }

    /// Point the store at other upload and download hosts.
    pub fn with_endpoints(mut self, upload_base: &str, public_base: &str) -> Self {
        self.upload_base = upload_base.trim_end_matches('/').to_string();
        self.public_base = public_base.trim_end_matches('/').to_string();
        self
    }

    /// Public URL an object is served from.
    pub fn public_url(&self, name: &str) -> Result<String, AppError> {
        let mut url = reqwest::Url::parse(&self.public_base)
            .map_err(|e| AppError::Config(format!("Invalid storage URL {}: {e}", self.public_base)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("Invalid storage URL {}", self.public_base)))?
            .pop_if_empty()
            .push(&self.bucket)
            .push(name);
        Ok(url.to_string())
    }

    fn upload_url(&self, name: &str) -> Result<reqwest::Url, AppError> {
        let base = format!("{}/{}/o", self.upload_base, self.bucket);
        reqwest::Url::parse_with_params(&base, &[("uploadType", "media"), ("name", name)])
            .map_err(|e| AppError::Config(format!("Invalid storage URL {base}: {e}")))
    }
}

impl ArtifactStore for GcsArtifactStore {
    async fn upload(&self, name: &str, data: &[u8], content_type: &str) -> Result<String, AppError> {
        let response = self
            .http
            .post(self.upload_url(name)?)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(bucket = %self.bucket, name, %status, "Artifact upload failed");
            return Err(AppError::Upload(format!(
                "Upload of {name} to {} failed with {status}: {detail}",
                self.bucket
            )));
        }

        tracing::info!(
            bucket = %self.bucket,
            name,
            digest = %content_digest(data),
            "Uploaded report artifact"
        );
        self.public_url(name)
    }
}

/// Store selected by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredStore {
    Local(LocalArtifactStore),
    Gcs(GcsArtifactStore),
}

impl ConfiguredStore {
    pub fn from_target(target: &ArtifactTarget) -> Self {
        match target {
            ArtifactTarget::Local { dir, base_url } => {
                Self::Local(LocalArtifactStore::new(dir.clone(), base_url.clone()))
            }
            ArtifactTarget::Gcs {
                bucket,
                access_token,
            } => Self::Gcs(GcsArtifactStore::new(bucket, access_token)),
        }
    }
}

impl ArtifactStore for ConfiguredStore {
    async fn upload(&self, name: &str, data: &[u8], content_type: &str) -> Result<String, AppError> {
        match self {
            Self::Local(store) => store.upload(name, data, content_type).await,
            Self::Gcs(store) => store.upload(name, data, content_type).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_hex_sha256() {
        let digest = content_digest(b"report");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, content_digest(b"report"));
        assert_ne!(digest, content_digest(b"report2"));
    }

    #[test]
    fn gcs_public_url() {
        let store = GcsArtifactStore::new("misra-c", "token");
        assert_eq!(
            store.public_url("misra-report-3f2a9c1.pdf").unwrap(),
            "https://storage.googleapis.com/misra-c/misra-report-3f2a9c1.pdf"
        );
        assert_eq!(
            store.public_url("misra report#1.pdf").unwrap(),
            "https://storage.googleapis.com/misra-c/misra%20report%231.pdf"
        );
    }

    #[tokio::test]
    async fn local_store_writes_and_links() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path().join("artifacts"), "https://ci.example.com/artifacts/");

        let url = store
            .upload("report.json", b"{}", "application/json")
            .await
            .unwrap();

        assert_eq!(url, "https://ci.example.com/artifacts/report.json");
        let written = std::fs::read(dir.path().join("artifacts/report.json")).unwrap();
        assert_eq!(written, b"{}");
    }

    mod gcs {
        use wiremock::matchers::{body_bytes, header, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use super::super::*;

        fn store(server: &MockServer) -> GcsArtifactStore {
            GcsArtifactStore::new("misra-c", "ya29.token").with_endpoints(
                &format!("{}/upload/storage/v1/b", server.uri()),
                &format!("{}/public", server.uri()),
            )
        }

        #[tokio::test]
        async fn media_upload_sends_encoded_name_and_token() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/upload/storage/v1/b/misra-c/o"))
                .and(query_param("uploadType", "media"))
                .and(query_param("name", "misra report+1.pdf"))
                .and(header("authorization", "Bearer ya29.token"))
                .and(header("content-type", "application/pdf"))
                .and(body_bytes(b"%PDF-1.3".to_vec()))
                .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
                .expect(1)
                .mount(&server)
                .await;

            let url = store(&server)
                .upload("misra report+1.pdf", b"%PDF-1.3", "application/pdf")
                .await
                .unwrap();
            assert_eq!(url, format!("{}/public/misra-c/misra%20report+1.pdf", server.uri()));
        }

        #[tokio::test]
        async fn error_status_maps_to_upload_error() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
                .mount(&server)
                .await;

            let err = store(&server)
                .upload("report.pdf", b"%PDF", "application/pdf")
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Upload(ref m) if m.contains("500")));
        }
    }
}
