use gita_chat::constants;
use gita_chat::ui::draw_ui;
use gita_chat::{AppState, Message, ToolUse};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

fn render(app: &mut AppState) -> String {
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| draw_ui(f, app)).unwrap();

    let buffer = terminal.backend().buffer();
    let area = buffer.area;
    let mut screen = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            screen.push_str(buffer[(x, y)].symbol());
        }
        screen.push('\n');
    }
    screen
}

fn sourced_answer() -> Message {
    Message::bot(
        "Perform your duty without attachment.".to_string(),
        vec!["Chapter 2, Verse 47".to_string()],
        vec![ToolUse::new("RAG_QA", Some("karma"))],
        false,
    )
}

#[test]
fn test_empty_log_shows_welcome_panel() {
    let mut app = AppState::new();

    let screen = render(&mut app);

    assert!(screen.contains("Welcome"));
    assert!(screen.contains(constants::APP_TITLE));
    assert!(!screen.contains("Thinking..."));
}

#[test]
fn test_welcome_panel_goes_away_after_first_message() {
    let mut app = AppState::new();
    app.submit("What is karma?");

    let screen = render(&mut app);

    assert!(!screen.contains("Welcome"));
    assert!(screen.contains("What is karma?"));
    assert!(screen.contains(constants::USER_SENDER));
}

#[test]
fn test_loading_indicator_follows_flag() {
    let mut app = AppState::new();
    app.begin_request();
    assert!(render(&mut app).contains("Thinking..."));

    app.apply_outcome(gita_chat::QueryOutcome::Rejected {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        detail: None,
    });
    let screen = render(&mut app);
    assert!(!screen.contains("Thinking..."));
    assert!(screen.contains("Unknown error"));
}

#[test]
fn test_fallback_answer_is_labelled() {
    let mut app = AppState::new();
    app.chat.append(Message::bot(
        "General knowledge answer.".to_string(),
        Vec::new(),
        Vec::new(),
        true,
    ));

    let screen = render(&mut app);

    assert!(screen.contains(constants::FALLBACK_LABEL));
    assert!(screen.contains("General knowledge answer."));
}

#[test]
fn test_details_toggle_changes_label_and_panel() {
    let mut app = AppState::new();
    app.chat.append(sourced_answer());

    let collapsed = render(&mut app);
    assert!(collapsed.contains("[Show References]"));
    assert!(collapsed.contains("[Explain more]"));
    assert!(!collapsed.contains("Chapter 2, Verse 47"));

    assert!(app.toggle_target_details());
    let expanded = render(&mut app);
    assert!(expanded.contains("[Hide References]"));
    assert!(expanded.contains("Tools Used:"));
    assert!(expanded.contains("RAG_QA: karma"));
    assert!(expanded.contains("Chapter 2, Verse 47"));

    assert!(app.toggle_target_details());
    assert!(render(&mut app).contains("[Show References]"));
}

#[test]
fn test_answer_without_details_has_no_toggle() {
    let mut app = AppState::new();
    app.chat
        .append(Message::bot("Short answer.".to_string(), Vec::new(), Vec::new(), false));

    let screen = render(&mut app);

    assert!(screen.contains("[Explain more]"));
    assert!(!screen.contains("References]"));
}
