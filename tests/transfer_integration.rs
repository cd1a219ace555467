// End-to-end pipeline runs with every external seam mocked: collect,
// extract, analyze, aggregate.

use std::collections::HashMap;

use handover::collect::files::UploadedFile;
use handover::config::{GithubSection, MailSection, NerSection, TransferConfig};
use handover::contract::{
    EmailRecord, Entity, MockCodeHost, MockEntityRecognizer, MockMailStore, RepoRef,
};
use handover::transfer::transfer;
use serde_json::json;

fn github_section() -> GithubSection {
    GithubSection {
        user: "https://github.com/octocat".to_string(),
        token: None,
        api_base: "https://api.github.invalid".to_string(),
        per_page: 100,
        max_pages: 10,
        max_commits: 50,
    }
}

fn mail_section(person: &str) -> MailSection {
    MailSection {
        person: person.to_string(),
        directory: HashMap::from([(
            "jane doe".to_string(),
            "jane.doe@corp.example".to_string(),
        )]),
        company_domain: "corp.example".to_string(),
        imap_host: "imap.corp.example".to_string(),
        imap_port: 993,
    }
}

fn txt_upload(filename: &str, content: &[u8]) -> UploadedFile {
    UploadedFile {
        filename: filename.to_string(),
        content_type: "text/plain".to_string(),
        bytes: content.to_vec(),
    }
}

#[tokio::test]
async fn full_pipeline_with_mocked_backends() {
    let config = TransferConfig {
        github: Some(github_section()),
        mail: None,
        ner: NerSection::default(),
    };

    let mut host = MockCodeHost::new();
    host.expect_list_repos().returning(|username| {
        assert_eq!(username, "octocat", "profile URL is normalised first");
        Ok(vec![RepoRef {
            name: "alpha".to_string(),
        }])
    });
    host.expect_commit_page().returning(|_, _, page, _| {
        if page == 1 {
            Ok(vec![
                json!({
                    "sha": "one",
                    "html_url": "https://github.com/octocat/alpha/commit/one",
                    "commit": {
                        "message": "initial",
                        "author": { "name": "Jane Dev", "date": "2025-07-01T12:00:00Z" }
                    }
                }),
                json!({
                    "sha": "two",
                    "html_url": "https://github.com/octocat/alpha/commit/two",
                    "commit": {
                        "message": "follow-up",
                        "author": { "name": "Jane Dev", "date": "2025-07-02T12:00:00Z" }
                    }
                }),
            ])
        } else {
            Ok(Vec::new())
        }
    });

    let mut recognizer = MockEntityRecognizer::new();
    recognizer.expect_recognise().returning(|_| {
        Ok(vec![Entity {
            text: "Jane Dev".to_string(),
            label: "PERSON".to_string(),
        }])
    });

    let uploads = vec![
        txt_upload("notes.txt", &vec![b'a'; 250]),
        txt_upload("data.csv", b"x,y\n1,2"),
    ];

    let report = transfer(
        &config,
        Some(&host),
        Option::<&mut MockMailStore>::None,
        recognizer,
        uploads,
    )
    .await
    .expect("pipeline should succeed");

    assert_eq!(report.commits.len(), 2);
    assert!(report.mail.is_none(), "no mail section, no mail bucket");

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.files[0].size, 250);
    assert_eq!(report.files[0].sha256.len(), 64, "hex-encoded sha256");

    assert_eq!(report.documents.len(), 2);
    assert_eq!(report.documents[0].content, "a".repeat(250));
    assert_eq!(report.documents[1].content, "", "csv is unsupported");

    assert_eq!(
        report.analyses.len(),
        1,
        "the analyzer skips the empty-content document"
    );
    assert_eq!(
        report.analyses[0].summary,
        format!("{}...", "a".repeat(200))
    );

    assert_eq!(report.knowledge_base.entities.len(), 1);
    assert_eq!(
        report.knowledge_base.summaries,
        vec![format!("{}...", "a".repeat(200))]
    );
    assert_eq!(report.knowledge_base.topics.len(), 2);
}

#[tokio::test]
async fn mail_bucket_appears_when_configured() {
    let config = TransferConfig {
        github: None,
        mail: Some(mail_section("Jane Doe")),
        ner: NerSection::default(),
    };

    let mut store = MockMailStore::new();
    store.expect_search().times(3).returning(|query| {
        if query.starts_with("OR ") {
            Ok(vec![EmailRecord {
                subject: "Attached".to_string(),
                sender: "jane.doe@corp.example".to_string(),
                recipients: vec!["team@corp.example".to_string()],
                date: "Tue, 01 Jul 2025 12:00:00 +0000".to_string(),
                attachments: vec!["plan.xlsx".to_string()],
            }])
        } else {
            Ok(Vec::new())
        }
    });

    let mut recognizer = MockEntityRecognizer::new();
    recognizer.expect_recognise().returning(|_| Ok(Vec::new()));

    let report = transfer(
        &config,
        Option::<&MockCodeHost>::None,
        Some(&mut store),
        recognizer,
        Vec::new(),
    )
    .await
    .expect("pipeline should succeed");

    let mail = report.mail.expect("mail bucket should be present");
    assert_eq!(mail.with_attachments.len(), 1);
    assert!(report.commits.is_empty());
}

#[tokio::test]
async fn unknown_person_aborts_the_run_with_a_labelled_error() {
    let config = TransferConfig {
        github: None,
        mail: Some(mail_section("Nobody Known")),
        ner: NerSection::default(),
    };

    let mut store = MockMailStore::new();
    let recognizer = MockEntityRecognizer::new();

    let err = transfer(
        &config,
        Option::<&MockCodeHost>::None,
        Some(&mut store),
        recognizer,
        Vec::new(),
    )
    .await
    .expect_err("missing directory entry is a hard failure");

    assert!(err.starts_with("Mail collection failed:"), "got: {err}");
}

#[tokio::test]
async fn zero_inputs_yield_an_empty_report() {
    let config = TransferConfig {
        github: None,
        mail: None,
        ner: NerSection::default(),
    };

    let recognizer = MockEntityRecognizer::new();
    let report = transfer(
        &config,
        Option::<&MockCodeHost>::None,
        Option::<&mut MockMailStore>::None,
        recognizer,
        Vec::new(),
    )
    .await
    .expect("an empty run still succeeds");

    assert!(report.commits.is_empty());
    assert!(report.mail.is_none());
    assert!(report.files.is_empty());
    assert!(report.documents.is_empty());
    assert!(report.analyses.is_empty());
    assert!(report.knowledge_base.entities.is_empty());
    assert!(report.knowledge_base.summaries.is_empty());
    assert!(report.knowledge_base.topics.is_empty());
}
