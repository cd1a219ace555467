//! # contract: trait seams between the pipeline and its external services
//!
//! This module defines the three traits the collection and analysis stages
//! depend on, plus the record types they exchange:
//! - [`CodeHost`]: repository listing and commit paging (GitHub in production).
//! - [`MailStore`]: server-side mailbox search (IMAP in production).
//! - [`EntityRecognizer`]: named-entity tagging over one text blob.
//!
//! ## Interface & Extensibility
//! - Implement a trait to plug in a new backend (another forge, another
//!   mailbox protocol, another model server).
//! - Errors at these seams are boxed trait objects; concrete error variants
//!   belong to the implementations.
//!
//! ## Mocking & Testing
//! - All three traits are annotated for `mockall`, so the collectors and the
//!   analyzer are unit-testable without a network. Mocks are exported behind
//!   the default `test-export-mocks` feature for use from integration tests.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Serialize;

/// Error type for [`CodeHost`] implementations (simple boxed error).
pub type HostError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for [`EntityRecognizer`] implementations.
pub type RecognizerError = Box<dyn std::error::Error + Send + Sync>;

/// A repository owned by the user under collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Bare repository name, as the host's API reports it.
    pub name: String,
}

/// One mailbox message, reduced to its envelope and attachment names.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmailRecord {
    pub subject: String,
    pub sender: String,
    pub recipients: Vec<String>,
    pub date: String,
    /// Filenames of attachment parts; empty when the message has none.
    pub attachments: Vec<String>,
}

/// One recognised entity: the surface text and the model's label.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub label: String,
}

/// Trait for the code-hosting API the commit collector pages through.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// List the user's repositories. A failing listing is a hard error:
    /// without it the commit stage has nothing to page through.
    async fn list_repos(&self, username: &str) -> Result<Vec<RepoRef>, HostError>;

    /// Fetch one page of raw commit objects for a repository. An empty page
    /// tells the caller that paging for this repository is done;
    /// implementations map non-success statuses to an empty page.
    async fn commit_page(
        &self,
        username: &str,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<serde_json::Value>, HostError>;
}

/// Errors from mailbox collection.
#[derive(Debug)]
pub enum MailError {
    /// The person has no entry in the name→address directory.
    UnknownPerson(String),
    Imap(imap::error::Error),
    Tls(native_tls::Error),
    Parse(mailparse::MailParseError),
}

impl std::fmt::Display for MailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailError::UnknownPerson(person) => {
                write!(f, "no official address on record for {person:?}")
            }
            MailError::Imap(e) => write!(f, "imap: {e}"),
            MailError::Tls(e) => write!(f, "tls: {e}"),
            MailError::Parse(e) => write!(f, "parse: {e}"),
        }
    }
}

impl std::error::Error for MailError {}

impl From<imap::error::Error> for MailError {
    fn from(e: imap::error::Error) -> Self {
        MailError::Imap(e)
    }
}

impl From<native_tls::Error> for MailError {
    fn from(e: native_tls::Error) -> Self {
        MailError::Tls(e)
    }
}

impl From<mailparse::MailParseError> for MailError {
    fn from(e: mailparse::MailParseError) -> Self {
        MailError::Parse(e)
    }
}

/// Trait for one open mailbox session. Searches are server-side; every match
/// is materialised into an [`EmailRecord`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait MailStore: Send {
    fn search(&mut self, query: &str) -> Result<Vec<EmailRecord>, MailError>;
}

/// Trait for the pretrained entity model the analyzer is constructed with.
/// Passing a handle in (rather than loading a process-global model) keeps
/// the analyzer testable with a substitute recognizer.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Entities in document order.
    async fn recognise(&self, text: &str) -> Result<Vec<Entity>, RecognizerError>;
}
