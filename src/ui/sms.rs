//! SMS pane: the date/mobile filter form line plus the SMS table.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    Frame,
};

use crate::app::{App, Input};
use crate::ui::common;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Filter form line
        Constraint::Min(3),    // SMS table
    ])
    .split(area);

    render_form(frame, app, chunks[0]);
    common::render_pane(frame, app, &app.sms, "SMS", chunks[1]);
}

/// The filter form: `date` and `mobile` fields, with a cursor marker on
/// the field being edited.
fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::raw(" date "),
        field(app, Input::Date, &app.date_field),
        Span::raw("  mobile "),
        field(app, Input::Mobile, &app.mobile_field),
    ]);
    frame.render_widget(ratatui::widgets::Paragraph::new(line), area);
}

fn field<'a>(app: &App, input: Input, value: &'a str) -> Span<'a> {
    if app.editing == Some(input) {
        Span::styled(
            format!("[{}_]", value),
            Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(format!("[{}]", value), Style::default().add_modifier(Modifier::BOLD))
    }
}
