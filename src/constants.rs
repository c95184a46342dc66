// Settings loaded from the environment, plus the fixed strings the chat view shows.

use std::env;

lazy_static::lazy_static! {
    pub static ref GITA_API_URL: String = env::var("GITA_API_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
    pub static ref GITA_LOG_DIR: String = env::var("GITA_LOG_DIR").unwrap_or_else(|_| "logs".to_string());
}

/// Path of the query endpoint relative to the backend base URL.
pub const QUERY_PATH: &str = "/query";

pub const APP_TITLE: &str = "Bhagavad Gita Q&A";
pub const USER_SENDER: &str = "You";
pub const BOT_SENDER: &str = "Gita";

pub const FALLBACK_LABEL: &str = "Direct answer from Gemini (not in Bhagavad Gita)";
pub const EXPLAIN_PREFIX: &str = "Explain more: ";
pub const SERVER_ERROR_PREFIX: &str = "Sorry, I encountered an error: ";
pub const UNKNOWN_ERROR: &str = "Unknown error";
pub const TRANSPORT_ERROR: &str = "Sorry, an error occurred while processing your request.";

pub const SHOW_REFERENCES: &str = "Show References";
pub const HIDE_REFERENCES: &str = "Hide References";
pub const EXPLAIN_MORE: &str = "Explain more";

pub const WELCOME_TEXT: &str =
    "Ask anything about the Bhagavad Gita. Answers cite the verses they draw on.";
