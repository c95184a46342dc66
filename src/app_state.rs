use chrono::Local;
use ratatui::widgets::{Block, Borders};
use serde::{Deserialize, Serialize};
use tui_textarea::TextArea;

use crate::constants;
use crate::query_client::QueryOutcome;
use crate::ui_components::ChatViewport;

/// One auxiliary operation the backend reports having used for an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUse {
    pub name: String,
    #[serde(default)]
    pub input: Option<String>,
}

impl ToolUse {
    pub fn new(name: impl Into<String>, input: Option<&str>) -> Self {
        Self {
            name: name.into(),
            input: input.map(str::to_string),
        }
    }

    /// `name` alone, or `name: input` when the input is non-empty.
    pub fn display(&self) -> String {
        match self.input.as_deref() {
            Some(input) if !input.is_empty() => format!("{}: {}", self.name, input),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub timestamp: String,
    pub content: String,
    pub is_user: bool,
    pub is_fallback: bool,
    pub references: Vec<String>,
    pub tools_used: Vec<ToolUse>,
    // Whether the tools/references panel is expanded
    pub details_visible: bool,
}

impl Message {
    pub fn user(content: String) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            content,
            is_user: true,
            is_fallback: false,
            references: Vec::new(),
            tools_used: Vec::new(),
            details_visible: false,
        }
    }

    pub fn bot(
        content: String,
        references: Vec<String>,
        tools_used: Vec<ToolUse>,
        is_fallback: bool,
    ) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            content,
            is_user: false,
            is_fallback,
            references,
            tools_used,
            details_visible: false,
        }
    }

    /// Plain bot message, used for error replies.
    pub fn bot_text(content: String) -> Self {
        Self::bot(content, Vec::new(), Vec::new(), false)
    }

    pub fn sender(&self) -> &'static str {
        if self.is_user {
            constants::USER_SENDER
        } else {
            constants::BOT_SENDER
        }
    }

    pub fn has_details(&self) -> bool {
        !self.references.is_empty() || !self.tools_used.is_empty()
    }

    /// Flips the details panel. Messages without details have no panel to flip.
    pub fn toggle_details(&mut self) -> bool {
        if self.has_details() {
            self.details_visible = !self.details_visible;
        }
        self.details_visible
    }

    pub fn details_label(&self) -> &'static str {
        if self.details_visible {
            constants::HIDE_REFERENCES
        } else {
            constants::SHOW_REFERENCES
        }
    }

    pub fn explain_query(&self) -> String {
        format!("{}{}", constants::EXPLAIN_PREFIX, self.content)
    }
}

/// Append-only log of everything shown in the chat pane.
#[derive(Debug)]
pub struct ChatLog {
    pub messages: Vec<Message>,
    empty_state: bool,
    pub viewport: ChatViewport,
}

impl ChatLog {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            empty_state: true,
            viewport: ChatViewport::new(),
        }
    }

    pub fn is_empty_state(&self) -> bool {
        self.empty_state
    }

    pub fn append(&mut self, message: Message) {
        self.empty_state = false;
        self.messages.push(message);
        self.viewport.scroll_to_bottom();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn bot_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.messages
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_user)
            .map(|(i, _)| i)
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AppState {
    pub chat: ChatLog,
    pub textarea: TextArea<'static>,
    pub loading: bool,
    // Index into chat.messages; only ever points at a bot message
    pub selected: Option<usize>,
    pub reveal_selected: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub spinner_frame: usize,
}

fn new_input() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text("Ask a question about the Bhagavad Gita...");
    textarea.set_block(Block::default().borders(Borders::ALL).title("Question"));
    textarea
}

impl AppState {
    pub fn new() -> Self {
        Self {
            chat: ChatLog::new(),
            textarea: new_input(),
            loading: false,
            selected: None,
            reveal_selected: false,
            show_help: false,
            help_scroll: 0,
            spinner_frame: 0,
        }
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn clear_input(&mut self) {
        self.textarea = new_input();
    }

    /// Echoes `text` as a user message and hands back the query to dispatch.
    /// Blank text is ignored.
    pub fn submit(&mut self, text: &str) -> Option<String> {
        let query = text.trim();
        if query.is_empty() {
            return None;
        }
        Some(self.push_query(query.to_string()))
    }

    /// Submits whatever is in the input box. The box is only cleared when
    /// something was actually submitted.
    pub fn submit_input(&mut self) -> Option<String> {
        let input = self.input_text();
        let query = self.submit(&input)?;
        self.clear_input();
        Some(query)
    }

    fn push_query(&mut self, query: String) -> String {
        tracing::debug!(%query, "Echoing user query");
        self.chat.append(Message::user(query.clone()));
        query
    }

    /// The bot message Ctrl+E / Ctrl+R act on: the selection, else the latest answer.
    pub fn target_index(&self) -> Option<usize> {
        match self.selected {
            Some(i) if self.chat.messages.get(i).is_some_and(|m| !m.is_user) => Some(i),
            _ => self.chat.bot_indices().last(),
        }
    }

    pub fn explain_target(&mut self) -> Option<String> {
        let query = self.chat.messages.get(self.target_index()?)?.explain_query();
        Some(self.push_query(query))
    }

    pub fn toggle_target_details(&mut self) -> bool {
        let Some(index) = self.target_index() else {
            return false;
        };
        let message = &mut self.chat.messages[index];
        if !message.has_details() {
            return false;
        }
        message.toggle_details();
        true
    }

    pub fn select_next_bot(&mut self) {
        let bots: Vec<usize> = self.chat.bot_indices().collect();
        if bots.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(current) => bots
                .iter()
                .copied()
                .find(|&i| i > current)
                .unwrap_or(bots[0]),
            None => bots[0],
        });
        self.reveal_selected = true;
    }

    pub fn select_previous_bot(&mut self) {
        let bots: Vec<usize> = self.chat.bot_indices().collect();
        let Some(&last) = bots.last() else {
            return;
        };
        self.selected = Some(match self.selected {
            Some(current) => bots
                .iter()
                .rev()
                .copied()
                .find(|&i| i < current)
                .unwrap_or(last),
            None => last,
        });
        self.reveal_selected = true;
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Called right before a query goes out.
    pub fn begin_request(&mut self) {
        self.loading = true;
    }

    /// Any completion, good or bad, hides the indicator and adds one bot message.
    pub fn apply_outcome(&mut self, outcome: QueryOutcome) {
        self.loading = false;
        self.chat.append(outcome.into_message());
    }

    pub fn tick(&mut self) {
        if self.loading {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
