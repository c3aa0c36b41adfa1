use std::env;
use std::path::PathBuf;

use crate::errors::AppError;

/// Where the report document is uploaded.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactTarget {
    /// Write into a local directory; links use `base_url` when set.
    Local { dir: PathBuf, base_url: String },
    /// Upload to a Google Cloud Storage bucket.
    Gcs { bucket: String, access_token: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub results_file: PathBuf,
    pub rules_file: PathBuf,
    pub suppressions_file: PathBuf,
    pub files_manifest: Option<PathBuf>,
    pub deviations_file: Option<PathBuf>,
    pub comment_output: PathBuf,
    pub document_output: PathBuf,
    pub pdf_output: PathBuf,
    pub project: String,
    pub guidelines: String,
    pub checking_tool: String,
    pub pull_request: Option<u64>,
    pub publish_comment: bool,
    pub artifact_target: Option<ArtifactTarget>,
    pub commit: String,
    pub workspace: String,
    pub repository: String,
    pub git_ref: String,
    pub server_url: String,
    pub api_url: String,
    pub github_token: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} must be set")))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let repository = required("GITHUB_REPOSITORY")?;
        let project = optional("MISRA_PROJECT").unwrap_or_else(|| {
            repository
                .rsplit('/')
                .next()
                .unwrap_or(repository.as_str())
                .to_string()
        });

        let pull_request = optional("MISRA_PR_NUMBER")
            .map(|v| {
                v.parse::<u64>()
                    .map_err(|_| AppError::Config(format!("MISRA_PR_NUMBER is not a number: {v}")))
            })
            .transpose()?;

        let artifact_target = match (optional("MISRA_GCS_BUCKET"), optional("MISRA_ARTIFACT_DIR")) {
            (Some(bucket), _) => Some(ArtifactTarget::Gcs {
                bucket,
                access_token: required("GCS_ACCESS_TOKEN")?,
            }),
            (None, Some(dir)) => Some(ArtifactTarget::Local {
                dir: PathBuf::from(dir),
                base_url: optional("MISRA_ARTIFACT_BASE_URL").unwrap_or_default(),
            }),
            (None, None) => None,
        };

        Ok(Self {
            results_file: required("MISRA_RESULTS_FILE")?.into(),
            rules_file: required("MISRA_RULES_FILE")?.into(),
            suppressions_file: required("MISRA_SUPPRESSIONS_FILE")?.into(),
            files_manifest: optional("MISRA_FILES_MANIFEST").map(PathBuf::from),
            deviations_file: optional("MISRA_DEVIATIONS_FILE").map(PathBuf::from),
            comment_output: optional("MISRA_COMMENT_OUTPUT")
                .unwrap_or_else(|| "misra-comment.md".to_string())
                .into(),
            document_output: optional("MISRA_DOCUMENT_OUTPUT")
                .unwrap_or_else(|| "misra-report.json".to_string())
                .into(),
            pdf_output: optional("MISRA_PDF_OUTPUT")
                .unwrap_or_else(|| "misra-report.pdf".to_string())
                .into(),
            project,
            guidelines: optional("MISRA_GUIDELINES").unwrap_or_else(|| "MISRA C:2012".to_string()),
            checking_tool: optional("MISRA_CHECKING_TOOL").unwrap_or_else(|| "Cppcheck".to_string()),
            pull_request,
            publish_comment: optional("MISRA_PUBLISH_COMMENT")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            artifact_target,
            commit: optional("GITHUB_SHA").unwrap_or_else(|| "HEAD".to_string()),
            workspace: optional("GITHUB_WORKSPACE").unwrap_or_else(|| {
                env::current_dir()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_default()
            }),
            repository,
            git_ref: optional("GITHUB_REF").unwrap_or_default(),
            server_url: optional("GITHUB_SERVER_URL")
                .unwrap_or_else(|| "https://github.com".to_string()),
            api_url: optional("GITHUB_API_URL")
                .unwrap_or_else(|| "https://api.github.com".to_string()),
            github_token: optional("GITHUB_TOKEN"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const MINIMAL: [(&str, &str); 4] = [
        ("MISRA_RESULTS_FILE", "misra_results.txt"),
        ("MISRA_RULES_FILE", "misra.txt"),
        ("MISRA_SUPPRESSIONS_FILE", "suppressions.txt"),
        ("GITHUB_REPOSITORY", "Biglup/cardano-c"),
    ];

    #[test]
    fn defaults_from_minimal_environment() {
        let cfg = config(&MINIMAL).unwrap();
        assert_eq!(cfg.project, "cardano-c");
        assert_eq!(cfg.guidelines, "MISRA C:2012");
        assert_eq!(cfg.checking_tool, "Cppcheck");
        assert_eq!(cfg.commit, "HEAD");
        assert_eq!(cfg.server_url, "https://github.com");
        assert_eq!(cfg.comment_output, PathBuf::from("misra-comment.md"));
        assert_eq!(cfg.pdf_output, PathBuf::from("misra-report.pdf"));
        assert!(!cfg.publish_comment);
        assert!(cfg.artifact_target.is_none());
        assert!(cfg.pull_request.is_none());
    }

    #[test]
    fn missing_required_variable_is_named() {
        let err = config(&MINIMAL[..3]).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: GITHUB_REPOSITORY must be set");
    }

    #[test]
    fn gcs_bucket_requires_token() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("MISRA_GCS_BUCKET", "misra-c"));
        assert!(config(&pairs).is_err());

        pairs.push(("GCS_ACCESS_TOKEN", "ya29.token"));
        let cfg = config(&pairs).unwrap();
        assert_eq!(
            cfg.artifact_target,
            Some(ArtifactTarget::Gcs {
                bucket: "misra-c".to_string(),
                access_token: "ya29.token".to_string(),
            })
        );
    }

    #[test]
    fn pull_request_number_must_parse() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("MISRA_PR_NUMBER", "twenty-three"));
        assert!(config(&pairs).is_err());

        pairs.pop();
        pairs.push(("MISRA_PR_NUMBER", "23"));
        assert_eq!(config(&pairs).unwrap().pull_request, Some(23));
    }

    #[test]
    fn publish_flag_accepts_truthy_values() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("MISRA_PUBLISH_COMMENT", "TRUE"));
        assert!(config(&pairs).unwrap().publish_comment);
    }
}
