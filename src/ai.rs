//! AI assistance: mission breakdown and voice command parsing.
//!
//! The [`TaskAssistant`] trait is the seam to the generative model. Its methods
//! may fail; the free functions [`breakdown_task_ai`] and
//! [`parse_voice_command`] never do. They absorb every failure, so callers
//! always get a usable step list or a plain "nothing detected".

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::fields::Priority;

/// Steps used whenever the model cannot provide a plan.
pub const FALLBACK_STEPS: [&str; 4] = [
    "Commencer par la première petite étape",
    "Respirer un bon coup",
    "Faire 5 minutes d'action",
    "Célébrer la fin",
];

/// Longest plan kept from a model answer.
pub const MAX_STEPS: usize = 6;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode model output: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("model returned no text")]
    EmptyResponse,
}

/// A mission detected in a voice transcript.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VoiceTask {
    pub title: String,
    pub priority: Priority,
}

/// Generative model used for breakdowns and voice parsing.
#[async_trait]
pub trait TaskAssistant: Send + Sync {
    /// Ask for 4 to 6 short, concrete steps for a mission.
    async fn suggest_steps(&self, title: &str, description: &str) -> Result<Vec<String>, AiError>;

    /// Extract a mission from a transcript, `None` when there is none.
    async fn interpret_voice(&self, transcript: &str) -> Result<Option<VoiceTask>, AiError>;
}

/// Steps for a mission. Falls back to [`FALLBACK_STEPS`] on any failure or
/// when the answer holds no usable step.
pub async fn breakdown_task_ai(
    assistant: &dyn TaskAssistant,
    title: &str,
    description: &str,
) -> Vec<String> {
    match assistant.suggest_steps(title, description).await {
        Ok(steps) => {
            let steps: Vec<String> = steps
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .take(MAX_STEPS)
                .collect();
            if steps.is_empty() {
                warn!("breakdown came back empty, using fallback steps");
                fallback_steps()
            } else {
                debug!(count = steps.len(), "breakdown received");
                steps
            }
        }
        Err(e) => {
            warn!(error = %e, "breakdown failed, using fallback steps");
            fallback_steps()
        }
    }
}

/// Mission spoken in `transcript`, or `None` when nothing actionable was
/// found or the model could not be reached.
pub async fn parse_voice_command(assistant: &dyn TaskAssistant, transcript: &str) -> Option<VoiceTask> {
    if transcript.trim().is_empty() {
        return None;
    }
    match assistant.interpret_voice(transcript).await {
        Ok(Some(task)) if !task.title.trim().is_empty() => Some(VoiceTask {
            title: task.title.trim().to_string(),
            priority: task.priority,
        }),
        Ok(_) => {
            debug!("no mission detected in transcript");
            None
        }
        Err(e) => {
            warn!(error = %e, "voice parsing failed");
            None
        }
    }
}

pub fn fallback_steps() -> Vec<String> {
    FALLBACK_STEPS.iter().map(|s| s.to_string()).collect()
}

/// Allows a single AI request in flight at a time.
#[derive(Debug, Default)]
pub struct AiGate {
    busy: AtomicBool,
}

/// Held while a request is outstanding; releases the gate on drop.
#[derive(Debug)]
pub struct AiPermit<'a> {
    gate: &'a AiGate,
}

impl AiGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the gate, or `None` if a request is already running.
    pub fn try_begin(&self) -> Option<AiPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| AiPermit { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for AiPermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

/// Build the single-threaded runtime the shell blocks on for AI calls.
pub fn runtime() -> io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Run one AI future to completion under the gate. `None` when busy.
pub fn run_gated<F: Future>(
    rt: &tokio::runtime::Runtime,
    gate: &AiGate,
    fut: F,
) -> Option<F::Output> {
    let _permit = gate.try_begin()?;
    Some(rt.block_on(fut))
}

/// Google Gemini backed assistant using the `generateContent` endpoint with a
/// JSON response schema.
#[derive(Debug, Clone)]
pub struct GeminiAssistant {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

/// Request body for `generateContent`
#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize, Debug)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GeminiAssistant {
    pub fn new(api_key: Option<String>, model: &str) -> Self {
        GeminiAssistant {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn breakdown_prompt(title: &str, description: &str) -> String {
        format!(
            "En tant qu'assistant expert pour les personnes avec TDAH, décompose la tâche suivante \
             en 4 à 6 étapes extrêmement simples, concrètes et gratifiantes.\n\
             Tâche: {title}\n\
             Description: {description}\n\
             Réponds uniquement sous forme d'un tableau JSON de chaînes de caractères."
        )
    }

    fn voice_prompt(transcript: &str) -> String {
        format!(
            "Analyse cette transcription vocale pour créer une tâche: \"{transcript}\".\n\
             Identifie le titre de la tâche et suggère une priorité (URGENT, HAUTE, MOYENNE, BASSE).\n\
             Si aucune tâche n'est détectée, retourne null."
        )
    }

    fn steps_schema() -> Value {
        json!({ "type": "ARRAY", "items": { "type": "STRING" } })
    }

    fn voice_schema() -> Value {
        let priorities: Vec<&str> = Priority::ALL.iter().map(|p| p.token()).collect();
        json!({
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "priority": { "type": "STRING", "enum": priorities }
            },
            "required": ["title", "priority"]
        })
    }

    fn request_body<'a>(prompt: &'a str, schema: Value) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        }
    }

    /// Send one prompt and return the model's JSON text.
    async fn generate(&self, prompt: &str, schema: Value) -> Result<String, AiError> {
        let key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, "calling generateContent");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&Self::request_body(prompt, schema))
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        parsed.text().ok_or(AiError::EmptyResponse)
    }
}

#[async_trait]
impl TaskAssistant for GeminiAssistant {
    async fn suggest_steps(&self, title: &str, description: &str) -> Result<Vec<String>, AiError> {
        let text = self
            .generate(&Self::breakdown_prompt(title, description), Self::steps_schema())
            .await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn interpret_voice(&self, transcript: &str) -> Result<Option<VoiceTask>, AiError> {
        let text = match self
            .generate(&Self::voice_prompt(transcript), Self::voice_schema())
            .await
        {
            Ok(text) => text,
            Err(AiError::EmptyResponse) => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(serde_json::from_str(&text)?)
    }
}
