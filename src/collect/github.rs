use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::GithubSection;
use crate::contract::{CodeHost, HostError, RepoRef};

/// Default GitHub API base. Overridable in the config for testing or
/// enterprise installs.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// One normalised commit. Immutable once fetched; lives only for the run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    pub author: String,
    pub authored_date: String,
    pub message: String,
    pub url: String,
}

/// reqwest-backed [`CodeHost`] speaking the GitHub REST API.
pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("User-Agent", "handover")
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.header("Authorization", format!("token {token}")),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl CodeHost for GithubClient {
    async fn list_repos(&self, username: &str) -> Result<Vec<RepoRef>, HostError> {
        let url = format!("{}/users/{}/repos", self.base_url, username);
        debug!(url = %url, "Listing repositories");
        let response = self.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!(
                "repository listing for {username} failed with status {status}"
            )
            .into());
        }
        let raw: Vec<Value> = response.json().await?;
        // Entries without a name (or that are not objects) are dropped.
        let repos = raw
            .iter()
            .filter_map(|entry| entry.get("name").and_then(Value::as_str))
            .map(|name| RepoRef {
                name: name.to_string(),
            })
            .collect();
        Ok(repos)
    }

    async fn commit_page(
        &self,
        username: &str,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, HostError> {
        let url = format!(
            "{}/repos/{}/{}/commits?per_page={}&page={}",
            self.base_url, username, repo, per_page, page
        );
        let response = self.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            // Not fatal mid-paging: an empty page tells the caller to stop.
            debug!(repo, page, status = %status, "Commit page request unsuccessful, ending paging");
            return Ok(Vec::new());
        }
        let raw: Value = response.json().await?;
        Ok(raw.as_array().cloned().unwrap_or_default())
    }
}

/// Collect the user's commit history across all of their repositories.
///
/// Repository listing failures propagate; paging failures inside one
/// repository degrade to partial results. Per-repository paging runs are
/// independent and execute concurrently, flattened in repository order.
pub async fn collect_commits<H: CodeHost>(
    host: &H,
    section: &GithubSection,
) -> Result<Vec<CommitRecord>, HostError> {
    let username = normalise_username(&section.user);
    info!(username = %username, "[COLLECT] Listing repositories");
    let repos = host.list_repos(&username).await?;
    info!(repos = repos.len(), "[COLLECT] Repository listing succeeded");

    let runs = repos
        .iter()
        .map(|repo| fetch_repo_commits(host, &username, &repo.name, section));
    let mut commits: Vec<CommitRecord> = join_all(runs).await.into_iter().flatten().collect();

    if commits.len() > section.max_commits {
        debug!(
            cap = section.max_commits,
            collected = commits.len(),
            "Truncating commit history to configured cap"
        );
        commits.truncate(section.max_commits);
    }
    Ok(commits)
}

/// Page through one repository's commits until an empty page, a failure, or
/// the page bound. Failures here are soft: whatever was collected so far is
/// returned.
async fn fetch_repo_commits<H: CodeHost>(
    host: &H,
    username: &str,
    repo: &str,
    section: &GithubSection,
) -> Vec<CommitRecord> {
    let mut collected = Vec::new();
    for page in 1..=section.max_pages {
        match host.commit_page(username, repo, page, section.per_page).await {
            Ok(raw) if raw.is_empty() => break,
            Ok(raw) => collected.extend(raw.iter().filter_map(normalise_commit)),
            Err(e) => {
                warn!(repo, page, error = %e, "[COLLECT] Commit paging stopped early");
                break;
            }
        }
    }
    debug!(repo, commits = collected.len(), "Collected commits for repository");
    collected
}

/// Reduce a profile URL (or anything URL-shaped) to the bare login.
pub fn normalise_username(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    let stripped = regex::Regex::new(r"^(?:https?://)?(?:www\.)?github\.com/")
        .unwrap()
        .replace(trimmed, "");
    stripped
        .split('/')
        .next()
        .unwrap_or_default()
        .trim_start_matches('@')
        .to_string()
}

/// Normalise one raw commit object; malformed entries yield None and are
/// skipped by the caller without logging.
fn normalise_commit(raw: &Value) -> Option<CommitRecord> {
    let obj = raw.as_object()?;
    let sha = obj.get("sha")?.as_str()?;
    let commit = obj.get("commit")?;
    let author = commit
        .get("author")
        .and_then(|author| author.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let authored_date = commit
        .get("author")
        .and_then(|author| author.get("date"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let message = commit
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let url = obj
        .get("html_url")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(CommitRecord {
        sha: sha.to_string(),
        author: author.to_string(),
        authored_date: authored_date.to_string(),
        message: message.to_string(),
        url: url.to_string(),
    })
}
