use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};

use crate::app_state::AppState;

const PAGE_LINES: usize = 5;
const WHEEL_LINES: usize = 3;

/// What the event loop should do after a key was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// Send this query to the backend. The user message is already in the log.
    Dispatch(String),
}

pub fn handle_key_event(app: &mut AppState, key: KeyEvent) -> Action {
    // Release and repeat events would otherwise submit twice on some terminals
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        return Action::Quit;
    }

    // Handle help screen
    if app.show_help {
        match key.code {
            KeyCode::F(1) | KeyCode::Esc => app.show_help = false,
            KeyCode::PageUp => app.help_scroll = app.help_scroll.saturating_sub(5),
            KeyCode::PageDown => app.help_scroll = app.help_scroll.saturating_add(5),
            _ => {}
        }
        return Action::None;
    }

    match (key.code, key.modifiers) {
        (KeyCode::F(1), _) => {
            app.show_help = true;
            app.help_scroll = 0;
            Action::None
        }

        // Send
        (KeyCode::Enter, _) => match app.submit_input() {
            Some(query) => Action::Dispatch(query),
            None => Action::None,
        },

        // The input is single-line; these would insert a newline in the text area
        (KeyCode::Char('m') | KeyCode::Char('j'), KeyModifiers::CONTROL) => Action::None,

        // Answer actions
        (KeyCode::Char('e'), KeyModifiers::CONTROL) => match app.explain_target() {
            Some(query) => Action::Dispatch(query),
            None => Action::None,
        },
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
            app.toggle_target_details();
            Action::None
        }
        (KeyCode::Tab, KeyModifiers::NONE) => {
            app.select_next_bot();
            Action::None
        }
        (KeyCode::BackTab, _) => {
            app.select_previous_bot();
            Action::None
        }
        (KeyCode::Esc, _) => {
            app.clear_selection();
            Action::None
        }

        // Scrolling
        (KeyCode::PageUp, _) => {
            app.chat.viewport.scroll_up(PAGE_LINES);
            Action::None
        }
        (KeyCode::PageDown, _) => {
            app.chat.viewport.scroll_down(PAGE_LINES);
            Action::None
        }
        (KeyCode::Up, KeyModifiers::CONTROL) => {
            app.chat.viewport.scroll_up(1);
            Action::None
        }
        (KeyCode::Down, KeyModifiers::CONTROL) => {
            app.chat.viewport.scroll_down(1);
            Action::None
        }
        (KeyCode::Home, KeyModifiers::CONTROL) => {
            app.chat.viewport.scroll_to_top();
            Action::None
        }
        (KeyCode::End, KeyModifiers::CONTROL) => {
            app.chat.viewport.scroll_to_bottom();
            Action::None
        }

        // Pass other keys to textarea
        _ => {
            app.textarea.input(key);
            Action::None
        }
    }
}

pub fn handle_mouse_event(app: &mut AppState, kind: MouseEventKind) {
    match kind {
        MouseEventKind::ScrollUp => app.chat.viewport.scroll_up(WHEEL_LINES),
        MouseEventKind::ScrollDown => app.chat.viewport.scroll_down(WHEEL_LINES),
        _ => {}
    }
}

/// Pasted text goes into the input box as one line; it is never submitted.
pub fn handle_paste(app: &mut AppState, data: &str) {
    tracing::debug!("Paste event detected with {} characters", data.len());
    let flattened = data.replace("\r\n", " ").replace(['\r', '\n'], " ");
    app.textarea.insert_str(flattened);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_client::{QueryOutcome, QueryResponse};
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut AppState, text: &str) {
        for ch in text.chars() {
            handle_key_event(app, press(KeyCode::Char(ch)));
        }
    }

    fn answer_with_refs(app: &mut AppState, text: &str) {
        app.apply_outcome(QueryOutcome::Answer(QueryResponse {
            response: text.to_string(),
            references: vec!["BG 18.66".to_string()],
            tools_used: vec![],
            is_fallback: false,
        }));
    }

    #[test]
    fn test_enter_dispatches_typed_query() {
        let mut app = AppState::new();
        type_text(&mut app, "What is karma?");

        let action = handle_key_event(&mut app, press(KeyCode::Enter));

        assert_eq!(action, Action::Dispatch("What is karma?".to_string()));
        assert_eq!(app.chat.len(), 1);
        assert_eq!(app.input_text(), "");
    }

    #[test]
    fn test_enter_on_blank_input_does_nothing() {
        let mut app = AppState::new();
        type_text(&mut app, "   ");
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Enter)), Action::None);
        assert!(app.chat.is_empty());
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut app = AppState::new();
        type_text(&mut app, "Hi");
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Enter,
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );

        assert_eq!(handle_key_event(&mut app, release), Action::None);
        assert!(app.chat.is_empty());
        assert_eq!(app.input_text(), "Hi");
    }

    #[test]
    fn test_repeated_enter_submits_once() {
        let mut app = AppState::new();
        type_text(&mut app, "Once");

        let first = handle_key_event(&mut app, press(KeyCode::Enter));
        let second = handle_key_event(&mut app, press(KeyCode::Enter));

        assert_eq!(first, Action::Dispatch("Once".to_string()));
        assert_eq!(second, Action::None);
        assert_eq!(app.chat.len(), 1);
    }

    #[test]
    fn test_other_keys_do_not_submit() {
        let mut app = AppState::new();
        type_text(&mut app, "abc");
        for code in [KeyCode::Left, KeyCode::Right, KeyCode::Backspace, KeyCode::Char('x')] {
            assert_eq!(handle_key_event(&mut app, press(code)), Action::None);
        }
        assert!(app.chat.is_empty());
    }

    #[test]
    fn test_newline_chords_keep_input_single_line() {
        let mut app = AppState::new();
        type_text(&mut app, "first");
        handle_key_event(&mut app, ctrl('m'));
        handle_key_event(&mut app, ctrl('j'));
        type_text(&mut app, " second");

        assert_eq!(app.textarea.lines().len(), 1);
        assert_eq!(
            handle_key_event(&mut app, press(KeyCode::Enter)),
            Action::Dispatch("first second".to_string())
        );
    }

    #[test]
    fn test_ctrl_e_explains_latest_answer() {
        let mut app = AppState::new();
        answer_with_refs(&mut app, "Surrender");

        let action = handle_key_event(&mut app, ctrl('e'));

        assert_eq!(action, Action::Dispatch("Explain more: Surrender".to_string()));
        assert_eq!(app.chat.last().unwrap().content, "Explain more: Surrender");
        assert!(app.chat.last().unwrap().is_user);
    }

    #[test]
    fn test_ctrl_r_toggles_references() {
        let mut app = AppState::new();
        answer_with_refs(&mut app, "Surrender");

        handle_key_event(&mut app, ctrl('r'));
        assert!(app.chat.messages[0].details_visible);
        handle_key_event(&mut app, ctrl('r'));
        assert!(!app.chat.messages[0].details_visible);
    }

    #[test]
    fn test_tab_selects_and_esc_clears() {
        let mut app = AppState::new();
        answer_with_refs(&mut app, "A");
        handle_key_event(&mut app, press(KeyCode::Tab));
        assert_eq!(app.selected, Some(0));
        handle_key_event(&mut app, press(KeyCode::Esc));
        assert_eq!(app.selected, None);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = AppState::new();
        assert_eq!(handle_key_event(&mut app, ctrl('c')), Action::Quit);
        assert_eq!(handle_key_event(&mut app, ctrl('q')), Action::Quit);
    }

    #[test]
    fn test_help_swallows_input() {
        let mut app = AppState::new();
        handle_key_event(&mut app, press(KeyCode::F(1)));
        assert!(app.show_help);

        type_text(&mut app, "x");
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Enter)), Action::None);
        assert_eq!(app.input_text(), "");

        handle_key_event(&mut app, press(KeyCode::Esc));
        assert!(!app.show_help);
    }

    #[test]
    fn test_paste_flattens_newlines_without_submitting() {
        let mut app = AppState::new();
        handle_paste(&mut app, "line one\nline two");
        assert_eq!(app.input_text(), "line one line two");
        assert!(app.chat.is_empty());
    }
}
