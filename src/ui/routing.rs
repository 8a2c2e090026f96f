//! Routing pane.

use ratatui::{layout::Rect, Frame};

use crate::app::App;
use crate::ui::common;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    common::render_pane(frame, app, &app.routing, "Routing", area);
}
