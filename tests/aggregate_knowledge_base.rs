// Aggregation contract: flattening keeps entity duplicates and order,
// summaries stay ordered, topics dedupe, and zero input yields the empty
// knowledge base.

use handover::aggregate::build_knowledge_base;
use handover::analyze::AnalysisResult;
use handover::contract::Entity;

fn entity(text: &str, label: &str) -> Entity {
    Entity {
        text: text.to_string(),
        label: label.to_string(),
    }
}

fn analysis(entities: Vec<Entity>, summary: &str, topics: &[&str]) -> AnalysisResult {
    AnalysisResult {
        entities,
        summary: summary.to_string(),
        topics: topics.iter().map(|t| t.to_string()).collect(),
    }
}

#[test]
fn zero_analyses_yield_an_empty_knowledge_base() {
    let kb = build_knowledge_base(&[]);
    assert!(kb.entities.is_empty());
    assert!(kb.summaries.is_empty());
    assert!(kb.topics.is_empty());
}

#[test]
fn entities_keep_duplicates_and_cross_document_order() {
    let analyses = vec![
        analysis(
            vec![entity("Acme", "ORG"), entity("Jane Dev", "PERSON")],
            "first summary",
            &["topic1", "topic2"],
        ),
        analysis(
            vec![entity("Acme", "ORG")],
            "second summary",
            &["topic1", "topic2"],
        ),
    ];

    let kb = build_knowledge_base(&analyses);

    assert_eq!(
        kb.entities,
        vec![
            entity("Acme", "ORG"),
            entity("Jane Dev", "PERSON"),
            entity("Acme", "ORG"),
        ],
        "duplicates survive the merge, in document order"
    );
}

#[test]
fn summaries_stay_ordered_one_per_document() {
    let analyses = vec![
        analysis(Vec::new(), "first", &[]),
        analysis(Vec::new(), "", &[]),
        analysis(Vec::new(), "third", &[]),
    ];

    let kb = build_knowledge_base(&analyses);
    assert_eq!(
        kb.summaries,
        vec!["first".to_string(), String::new(), "third".to_string()],
        "empty summaries are kept in place"
    );
}

#[test]
fn topics_are_deduplicated_across_documents() {
    let analyses = vec![
        analysis(Vec::new(), "a", &["topic1", "topic2"]),
        analysis(Vec::new(), "b", &["topic2", "topic3"]),
    ];

    let kb = build_knowledge_base(&analyses);
    assert_eq!(kb.topics.len(), 3);
    assert!(kb.topics.contains("topic1"));
    assert!(kb.topics.contains("topic2"));
    assert!(kb.topics.contains("topic3"));
}
