use ratatui::{
    layout::Rect,
    prelude::Frame,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use crate::tui::app::{App, FocusArea};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus_area == FocusArea::WeightInput;
    let title = if app.control_ready {
        "Weight (float64)"
    } else {
        "Weight (waiting for control channel)"
    };

    let input_widget = Paragraph::new(app.weight_input.value())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(if focused {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            }));

    f.render_widget(input_widget, area);

    if focused {
        let cursor_pos = app.weight_input.visual_cursor();
        f.set_cursor(
            area.x + cursor_pos as u16 + 1,
            area.y + 1,
        );
    }
}
