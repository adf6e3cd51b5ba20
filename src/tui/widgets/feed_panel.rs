use ratatui::{
    layout::Rect,
    prelude::Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use crate::model::LogEntry;
use crate::tui::app::{App, FocusArea};

pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    app.feed_viewport_height = area.height.saturating_sub(2) as usize;
    app.feed_scroll = app.feed_scroll.min(app.max_scroll());

    let total = app.log.len();
    let scroll_indicator = if total > app.feed_viewport_height {
        format!(" [{}/{}]", app.feed_scroll + 1, total)
    } else {
        String::new()
    };

    let items: Vec<ListItem> = app
        .log
        .iter()
        .skip(app.feed_scroll)
        .take(app.feed_viewport_height)
        .map(format_entry)
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Connection Log{}", scroll_indicator))
            .border_style(if app.focus_area == FocusArea::Feed {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            }),
    );

    f.render_widget(list, area);

    if total > app.feed_viewport_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(app.max_scroll()).position(app.feed_scroll);

        f.render_stateful_widget(
            scrollbar,
            area.inner(&ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn format_entry(entry: &LogEntry) -> ListItem {
    let style = if entry.is_event() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    };
    ListItem::new(Line::from(Span::styled(entry.render(), style)))
}

/// Logger output, newest first. Only drawn in debug mode.
pub fn render_diagnostics(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .diagnostics
        .iter()
        .take(area.height.saturating_sub(2) as usize)
        .map(|line| {
            let style = if line.starts_with("[ERROR]") {
                Style::default().fg(Color::Red)
            } else if line.starts_with("[WARN]") {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(Line::from(Span::styled(line.as_str(), style)))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled("Debug", Style::default().add_modifier(Modifier::ITALIC))),
    );
    f.render_widget(list, area);
}
