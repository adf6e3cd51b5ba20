use ratatui::{
    layout::Rect,
    prelude::Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::tui::app::{App, TuiPhase};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let (phase_text, phase_color) = match &app.phase {
        TuiPhase::AwaitingParams => ("Waiting for input".to_string(), Color::Gray),
        TuiPhase::Connecting => ("Connecting...".to_string(), Color::Yellow),
        TuiPhase::Connected => ("Connected".to_string(), Color::Green),
        TuiPhase::Error(e) => (format!("Error: {}", e), Color::Red),
    };

    let mut lines = Vec::new();
    if let Some(params) = &app.params {
        lines.push(Line::from(vec![
            Span::styled("DID: ", Style::default().fg(Color::Cyan)),
            Span::styled(params.did(), Style::default().add_modifier(Modifier::BOLD)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Relay: ", Style::default().fg(Color::Cyan)),
            Span::raw(params.relay_address.as_str()),
            Span::styled("  Assist: ", Style::default().fg(Color::Cyan)),
            Span::raw(params.assist_node_address.as_str()),
        ]));
    }

    let control = if app.control_ready { "ready" } else { "pending" };
    let mut status = vec![
        Span::styled(phase_text, Style::default().fg(phase_color)),
        Span::raw(format!("  Control channel: {}", control)),
    ];
    if app.warning_count > 0 {
        status.push(Span::styled(
            format!("  ⚠ {}", app.warning_count),
            Style::default().fg(Color::Yellow),
        ));
    }
    if app.debug_mode {
        status.push(Span::styled("  [debug]", Style::default().fg(Color::DarkGray)));
    }
    lines.push(Line::from(status));

    let header = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("DePHY Interact"));
    f.render_widget(header, area);
}
