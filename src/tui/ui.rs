use ratatui::{
    layout::{Constraint, Direction, Layout},
    prelude::Frame,
    style::Color,
};

use crate::tui::app::{App, TuiPhase};
use crate::tui::widgets::{connect_form, feed_panel, help_bar, input_box, popup, status_bar};

pub fn render(app: &mut App, f: &mut Frame) {
    let area = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    if app.phase == TuiPhase::AwaitingParams {
        connect_form::render(f, app, chunks[0]);
        help_bar::render(f, app, chunks[1]);
        if let Some(message) = &app.popup_message {
            popup::render(f, "Invalid device address", message, Color::Red, area);
        }
        return;
    }

    let session = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Header
            Constraint::Min(3),    // Feed
            Constraint::Length(3), // Weight input
        ])
        .split(chunks[0]);

    status_bar::render(f, app, session[0]);

    if app.debug_mode {
        let feed = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(session[1]);
        feed_panel::render(f, app, feed[0]);
        feed_panel::render_diagnostics(f, app, feed[1]);
    } else {
        feed_panel::render(f, app, session[1]);
    }

    input_box::render(f, app, session[2]);
    help_bar::render(f, app, chunks[1]);
}
