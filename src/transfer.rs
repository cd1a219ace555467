//! High-level pipeline: orchestrates collect → extract → analyze → aggregate.
//!
//! This module provides the top-level orchestration for one knowledge
//! transfer run. It implements a coordinated pipeline that:
//!   - Collects raw records from the configured sources (code host,
//!     mailbox, submitted files)
//!   - Extracts plain text from each submitted file
//!   - Analyses every non-empty text with the injected recognizer
//!   - Aggregates all analyses into one flat knowledge base
//!
//! # Responsibilities
//! - Fail-fast on hard errors (repository listing, mailbox collection);
//!   everything below that degrades to partial results within its stage
//! - Invokes logging throughout for traceability
//! - Holds no state across runs: all inputs and outputs are in-memory
//!
//! # Callable From
//! - Used by the CLI entrypoint and by integration tests, which substitute
//!   mock implementations at every trait seam
//!
//! # Extension Points
//! - To add a new source, add a collector and thread its output into
//!   [`TransferReport`]; downstream stages are unaffected
//!
//! # Navigation
//! - Main entrypoint: [`transfer`]
//! - Output type: [`TransferReport`]

use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::aggregate::{build_knowledge_base, KnowledgeBase};
use crate::analyze::{AnalysisResult, Analyzer};
use crate::collect::email::{collect_mail, MailboxSnapshot};
use crate::collect::files::{collect_file_metadata, FileMeta, UploadedFile};
use crate::collect::github::{collect_commits, CommitRecord};
use crate::config::TransferConfig;
use crate::contract::{CodeHost, EntityRecognizer, MailStore};
use crate::extract::{extract_documents, ExtractedDocument};

/// Everything one run produced, partitioned by stage.
#[derive(Debug, Serialize)]
pub struct TransferReport {
    pub run_id: Uuid,
    pub commits: Vec<CommitRecord>,
    pub mail: Option<MailboxSnapshot>,
    pub files: Vec<FileMeta>,
    pub documents: Vec<ExtractedDocument>,
    pub analyses: Vec<AnalysisResult>,
    pub knowledge_base: KnowledgeBase,
}

/// Run the full four-stage pipeline. Sources without a configured section
/// (or without a connected backend) contribute empty output; hard failures
/// inside a configured source abort the run with a labelled error.
pub async fn transfer<H, M, R>(
    config: &TransferConfig,
    host: Option<&H>,
    mail_store: Option<&mut M>,
    recognizer: R,
    uploads: Vec<UploadedFile>,
) -> Result<TransferReport, String>
where
    H: CodeHost,
    M: MailStore,
    R: EntityRecognizer,
{
    let run_id = Uuid::new_v4();
    info!(%run_id, "[TRANSFER] Starting knowledge transfer pipeline");

    // --- Stage 1: collectors ---
    let commits = match (config.github.as_ref(), host) {
        (Some(section), Some(host)) => {
            info!(user = %section.user, "[TRANSFER] Collecting commit history");
            match collect_commits(host, section).await {
                Ok(commits) => {
                    info!(commits = commits.len(), "[TRANSFER] Commit collection succeeded");
                    commits
                }
                Err(e) => {
                    error!(error = %e, "[TRANSFER][ERROR] Commit collection failed");
                    return Err(format!("Commit collection failed: {e}"));
                }
            }
        }
        _ => Vec::new(),
    };

    let mail = match (config.mail.as_ref(), mail_store) {
        (Some(section), Some(store)) => {
            info!(person = %section.person, "[TRANSFER] Collecting mailbox records");
            match collect_mail(store, section) {
                Ok(snapshot) => {
                    info!(
                        from_company = snapshot.from_company.len(),
                        to_company = snapshot.to_company.len(),
                        with_attachments = snapshot.with_attachments.len(),
                        "[TRANSFER] Mail collection succeeded"
                    );
                    Some(snapshot)
                }
                Err(e) => {
                    error!(error = %e, "[TRANSFER][ERROR] Mail collection failed");
                    return Err(format!("Mail collection failed: {e}"));
                }
            }
        }
        _ => None,
    };

    let files = collect_file_metadata(&uploads);
    info!(files = files.len(), "[TRANSFER] Recorded file metadata");

    // --- Stage 2: extraction ---
    let documents = extract_documents(&uploads);
    info!(documents = documents.len(), "[TRANSFER] Extracted document text");

    // --- Stage 3: analysis ---
    let analyzer = Analyzer::new(recognizer);
    let analyses = analyzer.analyse(&documents).await;
    info!(analyses = analyses.len(), "[TRANSFER] Analysed documents");

    // --- Stage 4: aggregation ---
    let knowledge_base = build_knowledge_base(&analyses);
    info!(
        entities = knowledge_base.entities.len(),
        summaries = knowledge_base.summaries.len(),
        topics = knowledge_base.topics.len(),
        "[TRANSFER] Knowledge base assembled"
    );

    Ok(TransferReport {
        run_id,
        commits,
        mail,
        files,
        documents,
        analyses,
        knowledge_base,
    })
}
