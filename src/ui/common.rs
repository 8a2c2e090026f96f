//! Common UI components: header bar, pane tables, status bar, help overlay.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus, Input, Pane};
use crate::data::Fragment;

/// Render the header bar: title plus the router and watchdog indicators.
///
/// The indicators show the raw snapshot value on the gateway palette; they
/// stay empty until the first status snapshot arrives.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" SMSWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ Router "),
    ];

    match &app.status {
        Some(status) => {
            spans.push(Span::styled(
                format!(" {} ", status.router),
                app.theme.indicator_style(status.router_color()),
            ));
            spans.push(Span::raw(" │ Watchdog "));
            spans.push(Span::styled(
                format!(" {} ", status.watchdog),
                app.theme.indicator_style(status.watchdog_color()),
            ));
        }
        None => {
            spans.push(Span::styled("  -  ", Style::default().add_modifier(Modifier::DIM)));
            spans.push(Span::raw(" │ Watchdog "));
            spans.push(Span::styled("  -  ", Style::default().add_modifier(Modifier::DIM)));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render one dashboard pane: a bordered table, a notice, or a loading hint.
pub fn render_pane(frame: &mut Frame, app: &App, pane: &Pane, title: &str, area: Rect) {
    let focused = std::ptr::eq(pane, app.focused_pane());
    let border_style = if focused {
        app.theme.focused_border
    } else {
        Style::default().fg(app.theme.border)
    };

    let title = match pane.content.as_ref().and_then(Fragment::table) {
        Some(model) if pane.spec.has_filtering() && !pane.filter_text.is_empty() => {
            format!(
                " {} ({}/{}) /{}/ ",
                title,
                pane.row_count(),
                model.rows.len(),
                pane.filter_text
            )
        }
        Some(model) => format!(" {} ({}) ", title, model.rows.len()),
        None => format!(" {} ", title),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style);

    match pane.content.as_ref() {
        Some(Fragment::Table(model)) => {
            let header = Row::new(
                model.headers.iter().map(|h| Cell::from(h.as_str())).collect::<Vec<_>>(),
            )
            .style(app.theme.header)
            .height(1);

            let rows: Vec<Row> = pane
                .order
                .iter()
                .enumerate()
                .map(|(visual, &idx)| {
                    let row = Row::new(
                        model.rows[idx].iter().map(|c| Cell::from(c.as_str())).collect::<Vec<_>>(),
                    );
                    if pane.spec.has_zebra() && visual % 2 == 1 {
                        row.style(app.theme.zebra)
                    } else {
                        row
                    }
                })
                .collect();

            let widths = column_widths(model, pane);

            let table = Table::new(rows, widths)
                .header(header)
                .block(block)
                .row_highlight_style(app.theme.selected)
                .highlight_symbol("▶ ");

            let mut state = TableState::default();
            if !pane.order.is_empty() {
                state.select(Some(pane.selected));
            }
            frame.render_stateful_widget(table, area, &mut state);
        }
        Some(Fragment::Notice(text)) => {
            frame.render_widget(Paragraph::new(text.as_str()).block(block), area);
        }
        None => {
            let hint = Paragraph::new("Loading...")
                .style(Style::default().add_modifier(Modifier::DIM))
                .block(block);
            frame.render_widget(hint, area);
        }
    }
}

/// Column constraints: fixed per-column lengths derived from content when
/// the table spec pins widths, proportional fills otherwise.
fn column_widths(model: &crate::data::TableModel, pane: &Pane) -> Vec<Constraint> {
    let columns = model.column_count();
    if !pane.spec.has_fixed_widths() {
        return vec![Constraint::Fill(1); columns];
    }

    (0..columns)
        .map(|col| {
            let content = model
                .rows
                .iter()
                .map(|row| row.get(col).map_or(0, |c| c.chars().count()))
                .max()
                .unwrap_or(0);
            let header = model.headers.get(col).map_or(0, |h| h.chars().count());
            Constraint::Length(content.max(header).min(40) as u16 + 1)
        })
        .collect()
}

/// Render the status bar at the bottom.
///
/// Shows temporary messages first, otherwise the endpoint and the
/// context-sensitive key hints.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let hints = match app.editing {
        Some(Input::Date) => "Editing date | Enter/Esc:done",
        Some(Input::Mobile) => "Editing mobile | Enter/Esc:done",
        Some(Input::Filter) => "Type to filter (5:foo scopes to column 5) | Enter/Esc:done",
        None => match app.focus {
            Focus::Sms => "a:all g:get s:submit d:date m:mobile /:filter Tab:pane ?:help q:quit",
            Focus::Routing => "r:reload routing Tab:pane ?:help q:quit",
        },
    };

    let status = format!(" {} | {}", app.endpoint(), hints);
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Fetching",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  g         Get SMS for the date filter"),
        Line::from("  a         Get all SMS"),
        Line::from("  s/Enter   Submit date+mobile filter form"),
        Line::from("  r         Reload routing (and status)"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Filter form",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  d         Edit the date field"),
        Line::from("  m         Edit the mobile field"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Tables",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab       Switch pane"),
        Line::from("  ↑/↓ j/k   Navigate rows"),
        Line::from("  PgUp/PgDn Jump 10 rows"),
        Line::from("  /         Filter SMS rows"),
        Line::from("  c         Clear filter"),
        Line::from(""),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 46u16.min(area.width.saturating_sub(4));
    let help_height = 26u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
