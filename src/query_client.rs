use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

use crate::app_state::{Message, ToolUse};
use crate::constants;

// Structures matching the backend's POST /query endpoint
#[derive(Serialize, Debug)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub response: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub references: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tools_used: Vec<ToolUse>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_fallback: bool,
}

// Optional fields may arrive as an explicit null
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize, Debug, Default)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode response body (status {status}): {source}")]
    Decode {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

/// Result of one round trip. Every variant renders as exactly one bot message.
#[derive(Debug)]
pub enum QueryOutcome {
    Answer(QueryResponse),
    Rejected {
        status: StatusCode,
        detail: Option<String>,
    },
    Failed(QueryError),
}

impl QueryOutcome {
    pub fn is_answer(&self) -> bool {
        matches!(self, QueryOutcome::Answer(_))
    }

    /// The bot message the chat log shows for this outcome.
    pub fn into_message(self) -> Message {
        match self {
            QueryOutcome::Answer(answer) => Message::bot(
                answer.response,
                answer.references,
                answer.tools_used,
                answer.is_fallback,
            ),
            QueryOutcome::Rejected { detail, .. } => Message::bot_text(format!(
                "{}{}",
                constants::SERVER_ERROR_PREFIX,
                detail.as_deref().unwrap_or(constants::UNKNOWN_ERROR)
            )),
            QueryOutcome::Failed(err) => {
                // The fault stays in the log, the user only sees the fixed text.
                error!(error = %err, "Query failed before a usable response arrived");
                Message::bot_text(constants::TRANSPORT_ERROR.to_string())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryClient {
    http: Client,
    endpoint: String,
}

impl QueryClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), constants::QUERY_PATH);
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn send(&self, query: &str) -> QueryOutcome {
        let response = match self
            .http
            .post(&self.endpoint)
            .json(&QueryRequest { query })
            .send()
            .await
        {
            Ok(response) => response,
            Err(source) => {
                return QueryOutcome::Failed(QueryError::Request {
                    url: self.endpoint.clone(),
                    source,
                })
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(source) => {
                return QueryOutcome::Failed(QueryError::Request {
                    url: self.endpoint.clone(),
                    source,
                })
            }
        };

        if status.is_success() {
            match serde_json::from_slice::<QueryResponse>(&body) {
                Ok(answer) => {
                    debug!(
                        references = answer.references.len(),
                        tools = answer.tools_used.len(),
                        is_fallback = answer.is_fallback,
                        "Received answer"
                    );
                    QueryOutcome::Answer(answer)
                }
                Err(source) => QueryOutcome::Failed(QueryError::Decode { status, source }),
            }
        } else {
            match serde_json::from_slice::<ErrorBody>(&body) {
                Ok(error_body) => {
                    warn!(%status, detail = ?error_body.error, "Backend rejected query");
                    QueryOutcome::Rejected {
                        status,
                        detail: error_body.error,
                    }
                }
                Err(source) => QueryOutcome::Failed(QueryError::Decode { status, source }),
            }
        }
    }
}
