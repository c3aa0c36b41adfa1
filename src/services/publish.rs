//! Pull-request comment publishing.
//!
//! The report comment is upserted: the first existing comment carrying
//! `REPORT_MARKER` is updated in place, otherwise a new comment is created.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::comment::REPORT_MARKER;

/// Existing issue or pull-request comment.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

/// Which pull request receives the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentTarget {
    /// Known pull request number.
    PullRequest(u64),
    /// Look up the first open pull request whose head is this branch.
    Branch(String),
}

impl CommentTarget {
    /// Derive the target from a `GITHUB_REF` value.
    ///
    /// `refs/pull/<n>/merge` names the pull request directly; a branch ref
    /// requires a lookup.
    pub fn from_ref(git_ref: &str) -> Option<Self> {
        if let Some(rest) = git_ref.strip_prefix("refs/pull/") {
            let number = rest.split('/').next()?.parse().ok()?;
            return Some(Self::PullRequest(number));
        }
        let branch = git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref);
        if branch.is_empty() {
            None
        } else {
            Some(Self::Branch(branch.to_string()))
        }
    }
}

/// Outcome of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentOutcome {
    Created(u64),
    Updated(u64),
}

/// Comment list/create/update capability of a code host.
#[allow(async_fn_in_trait)]
pub trait CommentApi {
    async fn find_open_pull_request(&self, branch: &str) -> Result<Option<u64>, AppError>;

    async fn list_comments(&self, issue: u64) -> Result<Vec<IssueComment>, AppError>;

    async fn create_comment(&self, issue: u64, body: &str) -> Result<IssueComment, AppError>;

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<IssueComment, AppError>;
}

/// Replace the previous report comment, or create the first one.
pub async fn upsert_report_comment<A: CommentApi>(
    api: &A,
    target: &CommentTarget,
    body: &str,
) -> Result<CommentOutcome, AppError> {
    let issue = match target {
        CommentTarget::PullRequest(number) => *number,
        CommentTarget::Branch(branch) => api
            .find_open_pull_request(branch)
            .await?
            .ok_or_else(|| AppError::NoPullRequest(branch.clone()))?,
    };

    let comments = api.list_comments(issue).await?;
    let existing = comments.iter().find(|c| {
        c.body
            .as_deref()
            .is_some_and(|body| body.contains(REPORT_MARKER))
    });

    match existing {
        Some(comment) => {
            api.update_comment(comment.id, body).await?;
            tracing::info!(pull_request = issue, comment_id = comment.id, "Updated the existing MISRA C report comment");
            Ok(CommentOutcome::Updated(comment.id))
        }
        None => {
            let created = api.create_comment(issue, body).await?;
            tracing::info!(pull_request = issue, comment_id = created.id, "Created a new MISRA C report comment");
            Ok(CommentOutcome::Created(created.id))
        }
    }
}

const GITHUB_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct PullRequestRef {
    number: u64,
}

#[derive(Debug, Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// GitHub REST v3 implementation of `CommentApi`.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    owner: String,
    repo: String,
}

impl GithubClient {
    pub fn new(api_url: &str, token: &str, repository: &str) -> Result<Self, AppError> {
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(o, r)| !o.is_empty() && !r.is_empty())
            .ok_or_else(|| AppError::Config(format!("Invalid repository slug: {repository}")))?;

        Ok(Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Repository-scoped endpoint with form-encoded query parameters.
    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<reqwest::Url, AppError> {
        let base = format!("{}/repos/{}/{}{}", self.api_url, self.owner, self.repo, path);
        let parsed = if params.is_empty() {
            reqwest::Url::parse(&base)
        } else {
            reqwest::Url::parse_with_params(&base, params)
        };
        parsed.map_err(|e| AppError::Config(format!("Invalid GitHub API URL {base}: {e}")))
    }

    fn request(&self, method: reqwest::Method, url: reqwest::Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, "misra-report")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<T, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Publish(format!("{action} failed with {status}: {detail}")));
        }
        Ok(response.json::<T>().await?)
    }
}

impl CommentApi for GithubClient {
    async fn find_open_pull_request(&self, branch: &str) -> Result<Option<u64>, AppError> {
        let head = format!("{}:{}", self.owner, branch);
        let url = self.url("/pulls", &[("state", "open"), ("head", head.as_str())])?;
        let pulls: Vec<PullRequestRef> = self
            .send(self.request(reqwest::Method::GET, url), "List pull requests")
            .await?;
        Ok(pulls.first().map(|p| p.number))
    }

    async fn list_comments(&self, issue: u64) -> Result<Vec<IssueComment>, AppError> {
        let per_page = GITHUB_PAGE_SIZE.to_string();
        let mut comments = Vec::new();
        for page in 1u32.. {
            let page = page.to_string();
            let url = self.url(
                &format!("/issues/{issue}/comments"),
                &[("per_page", per_page.as_str()), ("page", page.as_str())],
            )?;
            let batch: Vec<IssueComment> = self
                .send(self.request(reqwest::Method::GET, url), "List comments")
                .await?;
            let last = batch.len() < GITHUB_PAGE_SIZE;
            comments.extend(batch);
            if last {
                break;
            }
        }
        Ok(comments)
    }

    async fn create_comment(&self, issue: u64, body: &str) -> Result<IssueComment, AppError> {
        let url = self.url(&format!("/issues/{issue}/comments"), &[])?;
        self.send(
            self.request(reqwest::Method::POST, url)
                .json(&CommentBody { body }),
            "Create comment",
        )
        .await
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<IssueComment, AppError> {
        let url = self.url(&format!("/issues/comments/{comment_id}"), &[])?;
        self.send(
            self.request(reqwest::Method::PATCH, url)
                .json(&CommentBody { body }),
            "Update comment",
        )
        .await
    }
}
