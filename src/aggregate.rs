//! Stage 4: merge all per-document analyses into one flat knowledge base.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::analyze::AnalysisResult;
use crate::contract::Entity;

/// The merged output of one pipeline run. Entities keep duplicates and
/// document order; summaries stay ordered, one per analysed document; topic
/// labels are deduplicated into a set. This is the pipeline's only
/// many-to-one merge point, and it loses per-source attribution.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct KnowledgeBase {
    pub entities: Vec<Entity>,
    pub summaries: Vec<String>,
    pub topics: BTreeSet<String>,
}

/// Flatten analyses into one knowledge base. No weighting, ranking, or
/// cross-document entity resolution. Zero analyses produce an empty base.
pub fn build_knowledge_base(analyses: &[AnalysisResult]) -> KnowledgeBase {
    KnowledgeBase {
        entities: analyses
            .iter()
            .flat_map(|analysis| analysis.entities.iter().cloned())
            .collect(),
        summaries: analyses
            .iter()
            .map(|analysis| analysis.summary.clone())
            .collect(),
        topics: analyses
            .iter()
            .flat_map(|analysis| analysis.topics.iter().cloned())
            .collect(),
    }
}
