//! Production [`EntityRecognizer`] over a locally served pretrained model
//! (Ollama chat API). Malformed model output degrades to an empty entity
//! list; the pipeline never depends on the model answering well.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::NerSection;
use crate::contract::{Entity, EntityRecognizer, RecognizerError};

/// Default endpoint of a local Ollama install.
pub const DEFAULT_NER_URL: &str = "http://localhost:11434";

/// Default tagging model.
pub const DEFAULT_NER_MODEL: &str = "llama3.2:3b";

const SYSTEM_PROMPT: &str = "You are a named-entity tagger. Extract every named \
entity from the user's text, in order of appearance. Respond with only a JSON \
array of objects with fields \"text\" and \"label\" (PERSON, ORG, GPE, DATE, \
PRODUCT or MISC). Respond with [] when there are none.";

pub struct OllamaRecognizer {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaRecognizer {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn from_config(section: &NerSection) -> Self {
        Self::new(section.base_url.clone(), section.model.clone())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait::async_trait]
impl EntityRecognizer for OllamaRecognizer {
    async fn recognise(&self, text: &str) -> Result<Vec<Entity>, RecognizerError> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            stream: false,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
        };
        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("NER backend returned status {status}").into());
        }
        let chat: ChatResponse = response.json().await?;
        Ok(parse_entities(&chat.message.content))
    }
}

/// Models wrap JSON in prose or code fences more often than not: take the
/// outermost array and drop anything that does not look like an entity.
fn parse_entities(content: &str) -> Vec<Entity> {
    let payload = match extract_json_array(content) {
        Some(payload) => payload,
        None => {
            debug!("No JSON array in recognizer output");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<serde_json::Value>>(payload) {
        Ok(values) => values
            .iter()
            .filter_map(|value| {
                let text = value.get("text")?.as_str()?;
                let label = value.get("label")?.as_str()?;
                Some(Entity {
                    text: text.to_string(),
                    label: label.to_string(),
                })
            })
            .collect(),
        Err(e) => {
            debug!(error = %e, "Recognizer output was not a JSON array");
            Vec::new()
        }
    }
}

fn extract_json_array(content: &str) -> Option<&str> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&content[start..=end])
}
