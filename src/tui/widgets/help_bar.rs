use ratatui::{
    layout::Rect,
    prelude::Frame,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::tui::app::{App, FocusArea, NoticeKind};

fn key_hint(key: &'static str, action: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(Color::Cyan)),
        Span::raw(action),
    ]
}

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if let Some(notice) = &app.notice {
        let color = match notice.kind {
            NoticeKind::Success => Color::Green,
            NoticeKind::Failure => Color::Red,
        };
        let paragraph = Paragraph::new(notice.text.as_str())
            .style(Style::default().fg(Color::Black).bg(color));
        f.render_widget(paragraph, area);
        return;
    }

    let hints: Vec<[Span; 2]> = match app.focus_area {
        FocusArea::Form => {
            if app.popup_message.is_some() {
                vec![key_hint("Any key", ": Dismiss")]
            } else {
                vec![
                    key_hint("Tab/↑↓", ": Switch Field | "),
                    key_hint("Enter", ": Connect | "),
                    key_hint("Ctrl+C", ": Quit"),
                ]
            }
        }
        FocusArea::WeightInput => vec![
            key_hint("Enter", ": Apply Weight | "),
            key_hint("Tab", ": Focus Log | "),
            key_hint("/debug", ": Toggle Debug | "),
            key_hint("Ctrl+C", ": Quit"),
        ],
        FocusArea::Feed if app.is_failed() => vec![
            key_hint("↑↓ PgUp PgDn", ": Scroll | "),
            key_hint("Home/End", ": Newest/Oldest | "),
            key_hint("Ctrl+C", ": Quit"),
        ],
        FocusArea::Feed => vec![
            key_hint("↑↓ PgUp PgDn", ": Scroll | "),
            key_hint("Home/End", ": Newest/Oldest | "),
            key_hint("Tab", ": Focus Weight | "),
            key_hint("Ctrl+C", ": Quit"),
        ],
    };

    let help_paragraph = Paragraph::new(Line::from(hints.into_iter().flatten().collect::<Vec<_>>()))
        .style(Style::default().bg(Color::DarkGray));

    f.render_widget(help_paragraph, area);
}
