// Mailbox collection against a mocked store: address resolution, the three
// search buckets, and the client-side attachment filter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use handover::collect::email::{collect_mail, resolve_address};
use handover::config::MailSection;
use handover::contract::{EmailRecord, MailError, MockMailStore};

fn section() -> MailSection {
    MailSection {
        person: "Jane Doe".to_string(),
        directory: HashMap::from([(
            "jane doe".to_string(),
            "jane.doe@corp.example".to_string(),
        )]),
        company_domain: "corp.example".to_string(),
        imap_host: "imap.corp.example".to_string(),
        imap_port: 993,
    }
}

fn record(subject: &str, attachments: &[&str]) -> EmailRecord {
    EmailRecord {
        subject: subject.to_string(),
        sender: "someone@corp.example".to_string(),
        recipients: vec!["jane.doe@corp.example".to_string()],
        date: "Tue, 01 Jul 2025 12:00:00 +0000".to_string(),
        attachments: attachments.iter().map(|a| a.to_string()).collect(),
    }
}

#[test]
fn missing_directory_entry_is_a_hard_failure() {
    let mut store = MockMailStore::new();
    let mut section = section();
    section.person = "Nobody Known".to_string();

    let err = collect_mail(&mut store, &section).expect_err("unknown person must fail");
    assert!(matches!(err, MailError::UnknownPerson(_)));
    assert!(err.to_string().contains("no official address"));
}

#[test]
fn resolution_is_case_insensitive() {
    let directory = HashMap::from([("jane doe".to_string(), "jane.doe@corp.example".to_string())]);
    let address = resolve_address("JANE DOE", &directory).expect("lookup should succeed");
    assert_eq!(address, "jane.doe@corp.example");
}

#[test]
fn three_searches_fill_three_buckets() {
    let mut store = MockMailStore::new();
    store.expect_search().times(3).returning(|query| {
        if query.starts_with("OR ") {
            Ok(vec![
                record("Quarterly report", &["q3.pdf"]),
                record("Lunch?", &[]),
            ])
        } else if query.starts_with("FROM \"@") {
            Ok(vec![record("Welcome aboard", &[])])
        } else {
            Ok(vec![record("Handover notes", &[])])
        }
    });

    let snapshot = collect_mail(&mut store, &section()).expect("collection should succeed");

    assert_eq!(snapshot.from_company.len(), 1);
    assert_eq!(snapshot.from_company[0].subject, "Welcome aboard");
    assert_eq!(snapshot.to_company.len(), 1);
    assert_eq!(snapshot.to_company[0].subject, "Handover notes");
    assert_eq!(
        snapshot.with_attachments.len(),
        1,
        "messages without attachment parts are filtered out client-side"
    );
    assert_eq!(snapshot.with_attachments[0].attachments, vec!["q3.pdf"]);
}

#[test]
fn search_queries_combine_sender_recipient_and_domain() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let mut store = MockMailStore::new();
    store.expect_search().times(3).returning(move |query| {
        sink.lock().unwrap().push(query.to_string());
        Ok(Vec::new())
    });

    collect_mail(&mut store, &section()).expect("collection should succeed");

    let queries = seen.lock().unwrap();
    assert_eq!(
        *queries,
        vec![
            "FROM \"@corp.example\" TO \"jane.doe@corp.example\"".to_string(),
            "FROM \"jane.doe@corp.example\" TO \"@corp.example\"".to_string(),
            "OR FROM \"jane.doe@corp.example\" TO \"jane.doe@corp.example\"".to_string(),
        ]
    );
}

#[test]
fn search_failure_aborts_the_stage() {
    let mut store = MockMailStore::new();
    store
        .expect_search()
        .returning(|_| Err(MailError::UnknownPerson("proxy for any store error".to_string())));

    let result = collect_mail(&mut store, &section());
    assert!(result.is_err(), "a failing search propagates to the caller");
}
