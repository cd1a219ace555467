//! Stage 3: per-document analysis: entity recognition, a hard-truncation
//! summary, and (placeholder) topic labels.

use serde::Serialize;
use tracing::{debug, warn};

use crate::contract::{Entity, EntityRecognizer};
use crate::extract::ExtractedDocument;

/// Character limit for the hard-truncation summary.
pub const SUMMARY_LIMIT: usize = 200;

/// Marker appended only when the summary was truncated.
pub const SUMMARY_ELLIPSIS: &str = "...";

/// Fixed placeholder labels attached to every analysed document. Topic
/// modelling is a stub: this constant carries no signal and must not be
/// treated as meaningful output.
pub const PLACEHOLDER_TOPICS: [&str; 2] = ["topic1", "topic2"];

/// Analysis of one extracted document, in the order the recognizer reported
/// entities.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AnalysisResult {
    pub entities: Vec<Entity>,
    pub summary: String,
    pub topics: Vec<String>,
}

/// Runs the analysis stage with an injected recognizer handle.
pub struct Analyzer<R: EntityRecognizer> {
    recognizer: R,
}

impl<R: EntityRecognizer> Analyzer<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer }
    }

    /// Analyse every document with non-empty content, in order. A
    /// recognizer failure degrades that document to an empty entity list
    /// rather than aborting the stage.
    pub async fn analyse(&self, documents: &[ExtractedDocument]) -> Vec<AnalysisResult> {
        let mut results = Vec::new();
        for document in documents {
            if document.content.is_empty() {
                debug!(filename = %document.filename, "Skipping document with empty content");
                continue;
            }
            let entities = match self.recognizer.recognise(&document.content).await {
                Ok(entities) => entities,
                Err(e) => {
                    warn!(
                        filename = %document.filename,
                        error = %e,
                        "[ANALYZE] Entity recognition failed, continuing without entities"
                    );
                    Vec::new()
                }
            };
            results.push(AnalysisResult {
                entities,
                summary: summarise(&document.content),
                topics: PLACEHOLDER_TOPICS.iter().map(|t| t.to_string()).collect(),
            });
        }
        results
    }
}

/// The first [`SUMMARY_LIMIT`] characters, with the ellipsis marker only
/// when something was actually cut. Counts characters, not bytes.
pub fn summarise(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(SUMMARY_LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}{SUMMARY_ELLIPSIS}")
    } else {
        head
    }
}
