use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Full pipeline configuration for one transfer run. Sections are optional:
/// a run with no github section simply collects no commits.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransferConfig {
    pub github: Option<GithubSection>,
    pub mail: Option<MailSection>,
    #[serde(default)]
    pub ner: NerSection,
}

impl TransferConfig {
    pub fn trace_loaded(&self) {
        info!(
            github = self.github.is_some(),
            mail = self.mail.is_some(),
            ner_model = %self.ner.model,
            "Loaded TransferConfig"
        );
        debug!(?self, "Config loaded (full debug)");
        if let Some(github) = &self.github {
            github.trace_loaded();
        }
        if let Some(mail) = &self.mail {
            mail.trace_loaded();
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GithubSection {
    /// Bare login or a full profile URL; normalised before use.
    pub user: String,
    /// API token. Merged from GITHUB_TOKEN by load_config when absent here.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Commits requested per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Upper bound on pages fetched per repository.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Overall cap on collected commits across all repositories.
    #[serde(default = "default_max_commits")]
    pub max_commits: usize,
}

impl GithubSection {
    pub fn trace_loaded(&self) {
        info!(
            user = %self.user,
            api_base = %self.api_base,
            per_page = self.per_page,
            max_pages = self.max_pages,
            max_commits = self.max_commits,
            token = self.token.is_some(),
            "Loaded Github section"
        );
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MailSection {
    /// Display name to resolve against the directory.
    pub person: String,
    /// Static name → address directory. Keys are matched case-insensitively.
    pub directory: HashMap<String, String>,
    /// Company domain used to partition inbound/outbound mail.
    pub company_domain: String,
    pub imap_host: String,
    #[serde(default = "default_imap_port")]
    pub imap_port: u16,
}

impl MailSection {
    pub fn trace_loaded(&self) {
        info!(
            person = %self.person,
            company_domain = %self.company_domain,
            imap_host = %self.imap_host,
            imap_port = self.imap_port,
            directory_entries = self.directory.len(),
            "Loaded Mail section"
        );
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NerSection {
    #[serde(default = "default_ner_url")]
    pub base_url: String,
    #[serde(default = "default_ner_model")]
    pub model: String,
}

impl Default for NerSection {
    fn default() -> Self {
        Self {
            base_url: default_ner_url(),
            model: default_ner_model(),
        }
    }
}

/// Resolved mailbox credentials. Never read from the config file; merged
/// from the environment at the configuration boundary, and the collector
/// only ever sees the resolved pair.
#[derive(Clone)]
pub struct Credentials {
    pub address: String,
    pub app_password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("app_password", &"<redacted>")
            .finish()
    }
}

fn default_api_base() -> String {
    crate::collect::github::DEFAULT_API_BASE.to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    10
}

fn default_max_commits() -> usize {
    50
}

fn default_imap_port() -> u16 {
    993
}

fn default_ner_url() -> String {
    crate::ner::DEFAULT_NER_URL.to_string()
}

fn default_ner_model() -> String {
    crate::ner::DEFAULT_NER_MODEL.to_string()
}
