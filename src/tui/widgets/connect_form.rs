use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::Frame,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};

use crate::tui::app::{App, FormField};
use crate::tui::widgets::popup::centered_rect;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let form_area = centered_rect(70, 60, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Device
            Constraint::Length(3), // Relay
            Constraint::Length(3), // Assist node
            Constraint::Min(0),
        ])
        .split(form_area);

    let title = Paragraph::new("Connect to a DePHY device")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP | Borders::LEFT | Borders::RIGHT));
    f.render_widget(title, chunks[0]);

    for (field, chunk) in FormField::ALL.into_iter().zip(chunks[1..4].iter()) {
        let focused = app.form_field == field && app.popup_message.is_none();
        let input = app.form_input(field);

        let (text, style) = match (input.value().is_empty(), field) {
            (true, FormField::Relay) => (app.defaults.relay_address.as_str(), Style::default().fg(Color::DarkGray)),
            (true, FormField::AssistNode) => (app.defaults.assist_node_address.as_str(), Style::default().fg(Color::DarkGray)),
            _ => (input.value(), Style::default().fg(Color::White)),
        };

        let widget = Paragraph::new(text)
            .style(style)
            .block(Block::default()
                .borders(Borders::ALL)
                .title(field.label())
                .border_style(if focused {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }));
        f.render_widget(widget, *chunk);

        if focused {
            f.set_cursor(chunk.x + input.visual_cursor() as u16 + 1, chunk.y + 1);
        }
    }
}
