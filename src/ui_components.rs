use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};

/// Scroll state for the chat pane. Follows the bottom until the user scrolls up.
#[derive(Debug, Clone)]
pub struct ChatViewport {
    pub scroll_position: usize,
    pub max_scroll: usize,
    pub follow_bottom: bool,
}

impl ChatViewport {
    pub fn new() -> Self {
        Self {
            scroll_position: 0,
            max_scroll: 0,
            follow_bottom: true,
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.follow_bottom = false;
        self.scroll_position = self.scroll_position.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_position = (self.scroll_position + lines).min(self.max_scroll);
        if self.scroll_position == self.max_scroll {
            self.follow_bottom = true;
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.scroll_position = self.max_scroll;
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_bottom = false;
        self.scroll_position = 0;
    }

    /// Brings a line into view without snapping back to the bottom.
    pub fn reveal(&mut self, line: usize, height: usize) {
        if line < self.scroll_position {
            self.scroll_position = line;
        } else if line >= self.scroll_position + height.max(1) {
            self.scroll_position = line + 1 - height.max(1);
        }
        self.scroll_position = self.scroll_position.min(self.max_scroll);
        self.follow_bottom = self.scroll_position == self.max_scroll;
    }

    /// Recomputes the scroll range for `total_lines` of content in `height` rows.
    pub fn update_bounds(&mut self, total_lines: usize, height: usize) {
        self.max_scroll = total_lines.saturating_sub(height);
        if self.follow_bottom {
            self.scroll_position = self.max_scroll;
        } else {
            self.scroll_position = self.scroll_position.min(self.max_scroll);
        }
    }

    pub fn render(
        &mut self,
        f: &mut ratatui::Frame,
        area: Rect,
        lines: Vec<Line<'_>>,
        title: &str,
        reveal_line: Option<usize>,
    ) {
        // Split area to leave space for scrollbar
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(Color::Blue));
        let inner = block.inner(chunks[0]);
        f.render_widget(block, chunks[0]);

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        let total_lines = paragraph.line_count(inner.width);
        self.update_bounds(total_lines, inner.height as usize);
        if let Some(line) = reveal_line {
            self.reveal(line, inner.height as usize);
        }

        let paragraph = paragraph.scroll((self.scroll_position.min(u16::MAX as usize) as u16, 0));
        f.render_widget(paragraph, inner);

        if self.max_scroll > 0 {
            let mut scrollbar_state = ScrollbarState::new(self.max_scroll)
                .position(self.scroll_position);

            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            f.render_stateful_widget(scrollbar, chunks[1], &mut scrollbar_state);
        }
    }
}

impl Default for ChatViewport {
    fn default() -> Self {
        Self::new()
    }
}
