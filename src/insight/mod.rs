//! The insight requestor.
//!
//! An `InsightService` turns a prompt into the raw text of a structured response. Everything on
//! this side of the seam (building the anonymized payload, the prompt, and strictly parsing the
//! answer) is the same whichever service is used. `request_insight` never fails: any problem is
//! logged and reported as `None`.

mod gemini;
mod offline;

pub use gemini::GeminiService;
pub use offline::OfflineService;

use crate::config::InsightSettings;
use crate::model::{Category, Transaction};
use crate::Mode;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use tracing::{debug, warn};

const PROMPT_INTRO: &str = "Como analista financiero experto en gestión de bibliotecas \
universitarias, analiza los siguientes datos de ingresos:";
const PROMPT_TASK: &str = "Proporciona un resumen ejecutivo del desempeño, identifica tendencias \
clave y ofrece 3 recomendaciones prácticas para optimizar los ingresos o mejorar el servicio.";

/// The structured narrative returned by the service.
///
/// Parsing is strict: every field is required and no other field is allowed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Insight {
    pub summary: String,
    /// Three are asked for, but any number is accepted.
    pub recommendations: Vec<String>,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

serde_plain::derive_display_from_serialize!(Trend);
serde_plain::derive_fromstr_from_deserialize!(Trend);

/// What is sent about each transaction. Descriptions, receipts, reference numbers, ids and dates
/// never leave the machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadEntry {
    pub amount: f64,
    pub category: Category,
    pub branch: String,
}

impl From<&Transaction> for PayloadEntry {
    fn from(t: &Transaction) -> Self {
        Self {
            amount: t.amount.to_f64(),
            category: t.category,
            branch: t.branch.clone(),
        }
    }
}

pub fn payload(snapshot: &[Transaction]) -> Vec<PayloadEntry> {
    snapshot.iter().map(PayloadEntry::from).collect()
}

/// The full prompt for `snapshot`: instructions around the JSON payload.
pub fn prompt(snapshot: &[Transaction]) -> Result<String, InsightFailure> {
    let data = serde_json::to_string(&payload(snapshot)).map_err(InsightFailure::Payload)?;
    Ok(format!("{PROMPT_INTRO}\n{data}\n\n{PROMPT_TASK}"))
}

/// Why an insight request produced nothing.
pub enum InsightFailure {
    /// No API key was found in the configured environment variable.
    MissingApiKey(String),
    /// The payload could not be serialized.
    Payload(serde_json::Error),
    /// The request did not complete.
    Transport(String),
    /// The service answered with a non-success status.
    Status(u16, String),
    /// The response envelope did not contain any text.
    Envelope(String),
    /// The text did not match the expected schema.
    Schema(serde_json::Error),
}

impl Debug for InsightFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for InsightFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightFailure::MissingApiKey(var) => {
                write!(f, "No API key, set the {var} environment variable")
            }
            InsightFailure::Payload(e) => write!(f, "Unable to serialize the payload: {e}"),
            InsightFailure::Transport(e) => write!(f, "The request failed: {e}"),
            InsightFailure::Status(code, body) => {
                write!(f, "The service answered with status {code}: {body}")
            }
            InsightFailure::Envelope(e) => write!(f, "Unexpected response envelope: {e}"),
            InsightFailure::Schema(e) => write!(f, "The response does not match the schema: {e}"),
        }
    }
}

impl std::error::Error for InsightFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InsightFailure::Payload(e) | InsightFailure::Schema(e) => Some(e),
            _ => None,
        }
    }
}

/// A text-generation backend that answers with JSON text matching the `Insight` schema.
#[async_trait::async_trait]
pub trait InsightService {
    async fn generate(&self, prompt: &str) -> Result<String, InsightFailure>;
}

/// Returns the service for `mode`.
pub fn service(mode: Mode, settings: &InsightSettings) -> Box<dyn InsightService + Send + Sync> {
    match mode {
        Mode::Live => Box::new(GeminiService::new(settings)),
        Mode::Offline => Box::new(OfflineService),
    }
}

/// Parses `text` strictly as an `Insight`.
pub fn parse(text: &str) -> Result<Insight, InsightFailure> {
    serde_json::from_str(text.trim()).map_err(InsightFailure::Schema)
}

/// Asks `service` for an insight about `snapshot`. Each call is independent: there is no retry
/// and nothing is cached.
pub async fn request_insight(
    service: &(dyn InsightService + Send + Sync),
    snapshot: &[Transaction],
) -> Option<Insight> {
    match try_request(service, snapshot).await {
        Ok(insight) => {
            if insight.recommendations.len() != 3 {
                debug!(
                    "Expected 3 recommendations, got {}",
                    insight.recommendations.len()
                );
            }
            Some(insight)
        }
        Err(e) => {
            warn!("Insight request failed: {e}");
            None
        }
    }
}

async fn try_request(
    service: &(dyn InsightService + Send + Sync),
    snapshot: &[Transaction],
) -> Result<Insight, InsightFailure> {
    let prompt = prompt(snapshot)?;
    let text = service.generate(&prompt).await?;
    parse(&text)
}
