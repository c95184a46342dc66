pub mod app_state;
pub mod constants;
pub mod dispatcher;
pub mod events;
pub mod logging;
pub mod query_client;
pub mod repl;
pub mod tui;
pub mod ui;
pub mod ui_components;

pub use app_state::{AppState, ChatLog, Message, ToolUse};
pub use dispatcher::{Completion, Dispatcher};
pub use query_client::{QueryClient, QueryError, QueryOutcome, QueryResponse};
