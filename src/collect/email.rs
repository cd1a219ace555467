use std::collections::HashMap;

use mailparse::MailHeaderMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Credentials, MailSection};
use crate::contract::{EmailRecord, MailError, MailStore};

/// The three (non-exclusive) buckets of relevant mail for one person.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MailboxSnapshot {
    /// Sent from a company address to the person.
    pub from_company: Vec<EmailRecord>,
    /// Sent by the person to a company address.
    pub to_company: Vec<EmailRecord>,
    /// To or from the person, carrying at least one attachment.
    pub with_attachments: Vec<EmailRecord>,
}

/// Look up the person's official address in the static directory. Matching
/// is case-insensitive; a missing entry is a hard failure.
pub fn resolve_address(
    person: &str,
    directory: &HashMap<String, String>,
) -> Result<String, MailError> {
    directory
        .get(&person.trim().to_lowercase())
        .cloned()
        .ok_or_else(|| MailError::UnknownPerson(person.to_string()))
}

/// Collect the person's relevant mail through one open mailbox session.
///
/// Three server-side searches; attachment presence is not expressible as a
/// search predicate, so the third query fetches either direction and keeps
/// the messages that carry attachment parts.
pub fn collect_mail<M: MailStore>(
    store: &mut M,
    section: &MailSection,
) -> Result<MailboxSnapshot, MailError> {
    let address = resolve_address(&section.person, &section.directory)?;
    let domain = &section.company_domain;
    info!(address = %address, domain = %domain, "[COLLECT] Searching mailbox");

    let from_company = store.search(&format!("FROM \"@{domain}\" TO \"{address}\""))?;
    let to_company = store.search(&format!("FROM \"{address}\" TO \"@{domain}\""))?;
    let either_direction = store.search(&format!("OR FROM \"{address}\" TO \"{address}\""))?;
    let with_attachments = either_direction
        .into_iter()
        .filter(|record| !record.attachments.is_empty())
        .collect();

    Ok(MailboxSnapshot {
        from_company,
        to_company,
        with_attachments,
    })
}

/// One logged-in IMAP session over TLS, INBOX selected. No session reuse
/// across runs.
pub struct ImapMailbox {
    session: imap::Session<native_tls::TlsStream<std::net::TcpStream>>,
}

impl ImapMailbox {
    /// Open the session. Credentials must already be resolved; this type
    /// never reads the environment or prompts.
    pub fn connect(section: &MailSection, credentials: &Credentials) -> Result<Self, MailError> {
        let tls = native_tls::TlsConnector::builder().build()?;
        let client = imap::connect(
            (section.imap_host.as_str(), section.imap_port),
            &section.imap_host,
            &tls,
        )?;
        let mut session = client
            .login(&credentials.address, &credentials.app_password)
            .map_err(|e| e.0)?;
        session.select("INBOX")?;
        info!(host = %section.imap_host, "Mailbox session opened");
        Ok(Self { session })
    }
}

impl MailStore for ImapMailbox {
    fn search(&mut self, query: &str) -> Result<Vec<EmailRecord>, MailError> {
        debug!(query, "IMAP search");
        let seqs = self.session.search(query)?;
        if seqs.is_empty() {
            return Ok(Vec::new());
        }
        let set = seqs
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let fetches = self.session.fetch(set, "RFC822")?;

        let mut records = Vec::new();
        for fetch in fetches.iter() {
            let body = match fetch.body() {
                Some(body) => body,
                None => continue,
            };
            match parse_record(body) {
                Ok(record) => records.push(record),
                Err(e) => debug!(error = %e, "Skipping unparseable message"),
            }
        }
        debug!(matches = records.len(), "IMAP search materialised");
        Ok(records)
    }
}

fn parse_record(raw: &[u8]) -> Result<EmailRecord, MailError> {
    let parsed = mailparse::parse_mail(raw)?;
    let subject = parsed.headers.get_first_value("Subject").unwrap_or_default();
    let sender = parsed.headers.get_first_value("From").unwrap_or_default();
    let recipients = parsed.headers.get_all_values("To");
    let date = parsed.headers.get_first_value("Date").unwrap_or_default();
    let mut attachments = Vec::new();
    collect_attachment_names(&parsed, &mut attachments);
    Ok(EmailRecord {
        subject,
        sender,
        recipients,
        date,
        attachments,
    })
}

fn collect_attachment_names(part: &mailparse::ParsedMail<'_>, names: &mut Vec<String>) {
    let disposition = part.get_content_disposition();
    if disposition.disposition == mailparse::DispositionType::Attachment {
        if let Some(name) = disposition.params.get("filename") {
            names.push(name.clone());
        }
    }
    for sub in &part.subparts {
        collect_attachment_names(sub, names);
    }
}
