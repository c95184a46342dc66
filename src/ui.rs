use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app_state::{AppState, Message};
use crate::constants;

const SPINNER_FRAMES: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

pub fn draw_ui(f: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header with loading indicator
            Constraint::Min(5),    // Chat log
            Constraint::Length(3), // Input area
            Constraint::Length(1), // Key hints
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_chat_log(f, app, chunks[1]);
    render_input_area(f, app, chunks[2]);
    render_footer(f, chunks[3]);

    if app.show_help {
        render_help_overlay(f, app, f.area());
    }
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![Span::styled(
        constants::APP_TITLE,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )];
    if app.loading {
        let frame = SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()];
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} Thinking...", frame),
            Style::default().fg(Color::Magenta),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_chat_log(f: &mut Frame, app: &mut AppState, area: Rect) {
    if app.chat.is_empty_state() {
        render_welcome(f, area);
        return;
    }

    let mut lines = Vec::new();
    let mut selected_start = None;
    for (index, message) in app.chat.messages.iter().enumerate() {
        let selected = app.selected == Some(index);
        if selected {
            selected_start = Some(lines.clone());
        }
        lines.extend(message_lines(message, selected));
        lines.push(Line::from(""));
    }

    // Wrapped offset of the selected message, so the viewport can bring it into view
    let reveal_line = if app.reveal_selected {
        app.reveal_selected = false;
        let inner_width = area.width.saturating_sub(3);
        selected_start.map(|before| {
            Paragraph::new(before)
                .wrap(Wrap { trim: false })
                .line_count(inner_width)
        })
    } else {
        None
    };

    app.chat.viewport.render(f, area, lines, "Conversation", reveal_line);
}

fn render_welcome(f: &mut Frame, area: Rect) {
    let welcome = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Welcome",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(constants::WELCOME_TEXT),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title("Conversation"));
    f.render_widget(welcome, area);
}

/// Renders one chat message: fallback indicator, header, body, details panel, actions.
pub fn message_lines(message: &Message, selected: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if message.is_fallback {
        lines.push(Line::from(Span::styled(
            format!("⚠ {}", constants::FALLBACK_LABEL),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
    }

    let sender_style = if message.is_user {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };
    let marker = if selected { "▶ " } else { "" };
    lines.push(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(format!("[{}] ", message.timestamp), Style::default().fg(Color::DarkGray)),
        Span::styled(message.sender(), sender_style),
    ]));

    let body_style = if message.is_fallback {
        Style::default().fg(Color::LightYellow)
    } else {
        Style::default().fg(Color::White)
    };
    for text_line in message.content.lines() {
        // Sanitize content to prevent terminal issues
        let safe = text_line
            .chars()
            .map(|c| if c.is_control() && c != '\t' { '?' } else { c })
            .collect::<String>();
        lines.push(Line::from(Span::styled(safe, body_style)));
    }

    if message.is_user {
        return lines;
    }

    if message.details_visible {
        lines.extend(details_lines(message));
    }

    let action_style = if selected {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().fg(Color::Blue)
    };
    let mut actions = vec![Span::styled(format!("[{}]", constants::EXPLAIN_MORE), action_style)];
    if message.has_details() {
        actions.push(Span::raw(" "));
        actions.push(Span::styled(format!("[{}]", message.details_label()), action_style));
    }
    lines.push(Line::from(actions));

    lines
}

fn details_lines(message: &Message) -> Vec<Line<'static>> {
    let heading = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);
    let item = Style::default().fg(Color::Gray);
    let mut lines = Vec::new();

    if !message.tools_used.is_empty() {
        lines.push(Line::from(Span::styled("Tools Used:", heading)));
        for tool in &message.tools_used {
            lines.push(Line::from(Span::styled(format!("  • {}", tool.display()), item)));
        }
    }

    if !message.references.is_empty() {
        lines.push(Line::from(Span::styled("References:", heading)));
        for reference in &message.references {
            lines.push(Line::from(Span::styled(format!("  • {}", reference), item)));
        }
    }

    lines
}

fn render_input_area(f: &mut Frame, app: &AppState, area: Rect) {
    let title = if app.loading {
        "Question (waiting for answer...)"
    } else {
        "Question (Enter to send)"
    };

    let mut textarea = app.textarea.clone();
    textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(if app.loading {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Green)
            }),
    );

    f.render_widget(&textarea, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" send  "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" select answer  "),
        Span::styled("Ctrl+E", Style::default().fg(Color::Yellow)),
        Span::raw(" explain more  "),
        Span::styled("Ctrl+R", Style::default().fg(Color::Yellow)),
        Span::raw(" references  "),
        Span::styled("F1", Style::default().fg(Color::Yellow)),
        Span::raw(" help  "),
        Span::styled("Ctrl+Q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit"),
    ]);
    f.render_widget(Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)), area);
}

fn render_help_overlay(f: &mut Frame, app: &AppState, area: Rect) {
    let section = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let help_content = vec![
        Line::from(Span::styled(
            constants::APP_TITLE,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Asking:", section)),
        Line::from("  Enter - Send the question"),
        Line::from("  Ctrl+V / paste - Insert text"),
        Line::from(""),
        Line::from(Span::styled("Answers:", section)),
        Line::from("  Tab/Shift+Tab - Select next/previous answer"),
        Line::from("  Ctrl+E - Explain more about the selected (or latest) answer"),
        Line::from("  Ctrl+R - Show/hide references and tools used"),
        Line::from("  Esc - Clear selection"),
        Line::from(""),
        Line::from(Span::styled("Scrolling:", section)),
        Line::from("  PageUp/PageDown - Scroll by page"),
        Line::from("  Ctrl+Up/Ctrl+Down - Scroll by line"),
        Line::from("  Ctrl+Home/Ctrl+End - Jump to top/bottom"),
        Line::from(""),
        Line::from("Press F1 or Esc to close this help"),
    ];

    let popup_area = centered_rect(70, 70, area);
    f.render_widget(Clear, popup_area);
    let help_paragraph = Paragraph::new(help_content)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    f.render_widget(help_paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
