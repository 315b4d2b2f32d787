//! Generative-model client for action suggestions

use super::actions::SuggestionResponse;
use super::service::ActionSuggester;
use crate::{ApplicationError, ApplicationResult};
use async_trait::async_trait;
use logicgrid_core::SuggestConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

const SYSTEM_PROMPT: &str = r#"You are a configuration assistant for LogicGrid, a dynamic rule engine UI.

Your ONLY job is to convert natural language into a JSON object of the form
{"actions": [ ... ]} where each action has a "type" of:
addColumn, removeColumn, reorderColumn, updateColumn, setColumns,
setScoringConfigs, applyTemplate, setProtocolMeta, saveProtocol, loadProtocol
or noop.

Rules:
1. addColumn: when the user names the column, include both "name" and "id";
   "id" is the name with spaces removed. Otherwise send only "preset".
2. Scoring rules ("if X > 5 then Y = 10") use setScoringConfigs with
   "scoringConfigs": [{"triggerColumn", "scope", "rules": [{"conditions":
   [{"col", "op", "thresh", "base"}], "updates": [{"col", "val"}]}]}].
   Keep every existing scoring config from the current protocol. Add an
   addColumn action first for any column the rule mentions that does not
   exist. "op" is one of >, >=, <, <=, ==, !=, always. "base" defaults to
   "zero".
3. Presets: score/int/number -> score_input; text/string/notes/comment ->
   text_input; dropdown/status/state -> status; calc/result/output -> result.
4. Never include explanations."#;

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "system_instruction")]
    system_instruction: SystemInstruction<'a>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Default)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// [`ActionSuggester`] backed by the Gemini `generateContent` API
pub struct GeminiSuggester {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl GeminiSuggester {
    pub fn new(config: &SuggestConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn failure(message: impl Into<String>) -> ApplicationError {
        ApplicationError::Suggestion {
            message: message.into(),
        }
    }
}

/// Actions from the first candidate's text, or none if the model said nothing
fn parse_candidates(response: GenerateContentResponse) -> ApplicationResult<SuggestionResponse> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Ok(SuggestionResponse::default());
    }

    serde_json::from_str(&text)
        .map_err(|e| GeminiSuggester::failure(format!("unreadable model output: {}", e)))
}

#[async_trait]
impl ActionSuggester for GeminiSuggester {
    async fn suggest(&self, prompt: &str, protocol: &Value) -> ApplicationResult<SuggestionResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Self::failure("no API key configured"))?;

        let user_message = format!(
            "Current protocol JSON:\n{}\n\nUser request:\n{}\n\nReturn ONLY a JSON object with an \"actions\" array.",
            protocol, prompt
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: &user_message,
                }],
            }],
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: SYSTEM_PROMPT,
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let url = format!("{}/{}:generateContent", self.endpoint, self.model);
        debug!("Requesting suggestions from {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Suggestion request failed: {}", e);
                Self::failure(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("Suggestion endpoint returned {}: {}", status, detail);
            return Err(Self::failure(format!("model returned {}", status)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Self::failure(format!("unreadable model response: {}", e)))?;

        parse_candidates(parsed)
    }
}
