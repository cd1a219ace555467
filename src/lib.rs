#![doc = "handover: knowledge-transfer collection pipeline."]

//! This crate collects a person's commit history, mailbox records and
//! submitted documents, extracts plain text from each document, runs entity
//! recognition and a truncating summariser over the texts, and merges the
//! results into one flat knowledge base.
//!
//! Control flows strictly forward through four stages; see [`transfer`] for
//! the orchestration and [`contract`] for the trait seams that keep the
//! collectors and the analyzer testable without a network.

pub mod aggregate;
pub mod analyze;
pub mod collect;
pub mod config;
pub mod contract;
pub mod extract;
pub mod load_config;
pub mod ner;
pub mod transfer;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::collect::email::ImapMailbox;
use crate::collect::files::UploadedFile;
use crate::collect::github::GithubClient;
use crate::load_config::{load_config, resolve_mail_credentials};
use crate::ner::OllamaRecognizer;
use crate::transfer::transfer;

/// CLI for handover: collect and distil one person's working knowledge.
#[derive(Parser)]
#[clap(
    name = "handover",
    version,
    about = "Collect commits, mail and documents into a single knowledge-base snapshot"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline using the given config file
    Run {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// File to push through extraction and analysis (repeatable)
        #[clap(long = "file")]
        files: Vec<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { config, files } => {
            let config = load_config(config)?;

            let mut uploads = Vec::new();
            for path in &files {
                let upload = UploadedFile::from_path(path)
                    .map_err(|e| anyhow::anyhow!("Failed to read upload {:?}: {e}", path))?;
                uploads.push(upload);
            }

            let host = config
                .github
                .as_ref()
                .map(|section| GithubClient::new(section.api_base.clone(), section.token.clone()));

            let mut mailbox = match config.mail.as_ref() {
                Some(section) => {
                    let credentials = resolve_mail_credentials()?;
                    let mailbox = ImapMailbox::connect(section, &credentials)
                        .map_err(|e| anyhow::anyhow!("Mailbox login failed: {e}"))?;
                    Some(mailbox)
                }
                None => None,
            };

            let recognizer = OllamaRecognizer::from_config(&config.ner);

            println!("Transfer starting...");
            match transfer(&config, host.as_ref(), mailbox.as_mut(), recognizer, uploads).await {
                Ok(report) => {
                    println!("Transfer complete.\nReport:");
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Transfer failed: {}", e);
                    Err(anyhow::Error::msg(e))
                }
            }
        }
    }
}
