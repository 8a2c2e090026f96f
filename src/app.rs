//! Dashboard state and refresh orchestration.
//!
//! [`App`] owns everything the renderer reads: the two table panes, the
//! status snapshot, the filter form fields, and transient messages. Fetches
//! are queued as [`FetchRequest`]s; completions arrive as [`FetchEvent`]s
//! and are applied in arrival order. Within one completion the steps are
//! fixed: store the fragment, run the session guard, and only then
//! re-present the table. A guard hit terminates the cycle with a full
//! dashboard reload.

use std::time::Instant;

use chrono::{Datelike, Local, NaiveDate};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::data::fragment::{self, Fragment};
use crate::data::status::StatusSnapshot;
use crate::data::table::{RowFilter, SortDirection, TableSpec};
use crate::data::GatewayTimestamp;
use crate::fetch::{FetchEvent, FetchRequest};
use crate::settings::ThemeMode;
use crate::ui::Theme;

/// Which pane has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Routing,
    Sms,
}

/// The input field currently being edited, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Date,
    Mobile,
    Filter,
}

/// Presentation rules for the SMS table.
///
/// Chronological columns 5 and 8, sorted ascending on 5 then 8. The
/// regular views pin column widths; the form-submission view does not.
fn sms_spec(fixed_widths: bool) -> TableSpec {
    TableSpec::new()
        .parser(5, GatewayTimestamp)
        .parser(8, GatewayTimestamp)
        .sort(5, SortDirection::Ascending)
        .sort(8, SortDirection::Ascending)
        .zebra(true)
        .filtering(true)
        .fixed_widths(fixed_widths)
}

/// Presentation rules for the routing table: chronological column 0,
/// sorted ascending on 0 then 9.
fn routing_spec() -> TableSpec {
    TableSpec::new()
        .parser(0, GatewayTimestamp)
        .sort(0, SortDirection::Ascending)
        .sort(9, SortDirection::Ascending)
}

/// One dashboard pane: the last received fragment plus its presented order.
pub struct Pane {
    pub content: Option<Fragment>,
    pub order: Vec<usize>,
    pub selected: usize,
    pub filter_text: String,
    pub spec: TableSpec,
}

impl Pane {
    fn new(spec: TableSpec) -> Self {
        Self {
            content: None,
            order: Vec::new(),
            selected: 0,
            filter_text: String::new(),
            spec,
        }
    }

    /// Number of rows currently presented.
    pub fn row_count(&self) -> usize {
        self.order.len()
    }

    /// Re-derive the presented row order from the current fragment.
    fn present(&mut self) {
        match self.content.as_ref().and_then(Fragment::table) {
            Some(model) => {
                let filters = parse_filters(&self.filter_text);
                self.order = self.spec.present(model, &filters);
                self.selected = self.selected.min(self.order.len().saturating_sub(1));
            }
            None => {
                self.order.clear();
                self.selected = 0;
            }
        }
    }
}

/// Parse the pane filter line into row filters.
///
/// Whitespace-separated terms; `5:foo` scopes a term to column 5, a bare
/// term matches any column.
fn parse_filters(text: &str) -> Vec<RowFilter> {
    text.split_whitespace()
        .filter_map(|term| {
            let (column, needle) = match term.split_once(':') {
                Some((col, rest)) => match col.parse::<usize>() {
                    Ok(col) => (Some(col), rest),
                    Err(_) => (None, term),
                },
                None => (None, term),
            };
            if needle.is_empty() {
                None
            } else {
                Some(RowFilter { column, needle: needle.to_string() })
            }
        })
        .collect()
}

/// Format a local date as the gateway's `YYYY-MM-DD%` wildcard filter.
pub fn date_filter(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}%", date.year(), date.month(), date.day())
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub focus: Focus,
    pub show_help: bool,
    pub editing: Option<Input>,

    // Filter form fields
    pub date_field: String,
    pub mobile_field: String,

    // Panes and status
    pub sms: Pane,
    pub routing: Pane,
    pub status: Option<StatusSnapshot>,

    // UI
    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,

    endpoint: String,
    requests: mpsc::UnboundedSender<FetchRequest>,
}

impl App {
    /// Create the dashboard state. Call [`App::reload`] afterwards to
    /// queue the initial load.
    pub fn new(
        endpoint: impl Into<String>,
        theme_mode: ThemeMode,
        requests: mpsc::UnboundedSender<FetchRequest>,
    ) -> Self {
        Self {
            running: true,
            focus: Focus::Sms,
            show_help: false,
            editing: None,
            date_field: String::new(),
            mobile_field: String::new(),
            sms: Pane::new(sms_spec(true)),
            routing: Pane::new(routing_spec()),
            status: None,
            theme: Theme::from_mode(theme_mode),
            status_message: None,
            endpoint: endpoint.into(),
            requests,
        }
    }

    /// The gateway endpoint, for the status bar.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full dashboard reload: reset all state, recompute today's date
    /// filter, and queue the initial load sequence.
    ///
    /// This is both the startup path and the only way back from an
    /// expired session.
    pub fn reload(&mut self) {
        self.sms = Pane::new(sms_spec(true));
        self.routing = Pane::new(routing_spec());
        self.status = None;
        self.editing = None;
        self.date_field = date_filter(Local::now().date_naive());
        self.mobile_field.clear();
        self.queue(FetchRequest::Routing);
    }

    /// Queue a fetch. Completions come back through [`App::apply_fetch_event`].
    pub fn queue(&self, request: FetchRequest) {
        if self.requests.send(request).is_err() {
            warn!("fetch worker is gone; request dropped");
        }
    }

    /// Operator action: load every stored SMS.
    pub fn get_all_sms(&self) {
        self.queue(FetchRequest::Sms { all: true, date: self.date_field.clone() });
    }

    /// Operator action: load the SMS matching the date filter.
    pub fn get_filtered_sms(&self) {
        self.queue(FetchRequest::Sms { all: false, date: self.date_field.clone() });
    }

    /// Operator action: submit the date/mobile filter form.
    pub fn submit_filter_form(&self) {
        self.queue(FetchRequest::SmsForm {
            date: self.date_field.clone(),
            mobile: self.mobile_field.clone(),
        });
    }

    /// Operator action: refresh the routing table (cascades into a status
    /// fetch on success).
    pub fn refresh_routing(&self) {
        self.queue(FetchRequest::Routing);
    }

    /// Apply one fetch completion.
    ///
    /// Content replacement happens first, then the session guard, then
    /// presentation; an expired session aborts the cycle into a reload
    /// before any sorting happens.
    pub fn apply_fetch_event(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::Sms { body, from_form } => match body {
                Ok(body) => {
                    self.sms.content = Some(Fragment::parse(&body));
                    if fragment::is_session_expired(&body) {
                        self.session_expired();
                        return;
                    }
                    self.sms.spec = sms_spec(!from_form);
                    self.sms.present();
                }
                Err(e) => self.fetch_failed("SMS", &e.to_string()),
            },
            FetchEvent::Routing(body) => match body {
                Ok(body) => {
                    self.routing.content = Some(Fragment::parse(&body));
                    if fragment::is_session_expired(&body) {
                        self.session_expired();
                        return;
                    }
                    self.routing.present();
                    // A successful routing load cascades into exactly one
                    // status fetch, afterwards.
                    self.queue(FetchRequest::Status);
                }
                Err(e) => self.fetch_failed("routing", &e.to_string()),
            },
            FetchEvent::Status(body) => match body {
                Ok(body) => {
                    if fragment::is_session_expired(&body) {
                        self.session_expired();
                        return;
                    }
                    match StatusSnapshot::parse(&body) {
                        Ok(snapshot) => self.status = Some(snapshot),
                        Err(e) => {
                            // Fatal to this refresh cycle only; the
                            // indicators keep their previous state.
                            warn!(error = %e, "malformed status response");
                            self.set_status_message(format!("Malformed status response: {e}"));
                        }
                    }
                }
                Err(e) => self.fetch_failed("status", &e.to_string()),
            },
        }
    }

    fn session_expired(&mut self) {
        info!("session expired, reloading dashboard");
        self.set_status_message("Session expired - reloading".to_string());
        self.reload();
    }

    fn fetch_failed(&mut self, what: &str, error: &str) {
        // No retry; the previous pane content and indicators stay as-is.
        warn!(what, error, "fetch failed");
        self.set_status_message(format!("{what} fetch failed: {error}"));
    }

    /// Set a temporary status message shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// The current status message if it has not expired yet.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, at)) if at.elapsed() < std::time::Duration::from_secs(5) => Some(msg),
            _ => None,
        }
    }

    /// The pane with keyboard focus.
    pub fn focused_pane(&self) -> &Pane {
        match self.focus {
            Focus::Routing => &self.routing,
            Focus::Sms => &self.sms,
        }
    }

    fn focused_pane_mut(&mut self) -> &mut Pane {
        match self.focus {
            Focus::Routing => &mut self.routing,
            Focus::Sms => &mut self.sms,
        }
    }

    /// Switch focus between the routing and SMS panes.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Routing => Focus::Sms,
            Focus::Sms => Focus::Routing,
        };
    }

    /// Move selection down by n rows in the focused pane.
    pub fn select_next_n(&mut self, n: usize) {
        let pane = self.focused_pane_mut();
        let max = pane.row_count().saturating_sub(1);
        pane.selected = (pane.selected + n).min(max);
    }

    /// Move selection up by n rows in the focused pane.
    pub fn select_prev_n(&mut self, n: usize) {
        let pane = self.focused_pane_mut();
        pane.selected = pane.selected.saturating_sub(n);
    }

    pub fn select_first(&mut self) {
        self.focused_pane_mut().selected = 0;
    }

    pub fn select_last(&mut self) {
        let pane = self.focused_pane_mut();
        pane.selected = pane.row_count().saturating_sub(1);
    }

    /// Start editing an input field. Filter editing requires the focused
    /// pane to support filtering.
    pub fn start_editing(&mut self, input: Input) {
        if input == Input::Filter && !self.focused_pane().spec.has_filtering() {
            return;
        }
        self.editing = Some(input);
    }

    /// Stop editing, keeping the entered text.
    pub fn stop_editing(&mut self) {
        self.editing = None;
    }

    /// Append a character to the field being edited.
    pub fn edit_push(&mut self, c: char) {
        match self.editing {
            Some(Input::Date) => self.date_field.push(c),
            Some(Input::Mobile) => self.mobile_field.push(c),
            Some(Input::Filter) => {
                let pane = self.focused_pane_mut();
                pane.filter_text.push(c);
                pane.present();
            }
            None => {}
        }
    }

    /// Remove the last character from the field being edited.
    pub fn edit_pop(&mut self) {
        match self.editing {
            Some(Input::Date) => {
                self.date_field.pop();
            }
            Some(Input::Mobile) => {
                self.mobile_field.pop();
            }
            Some(Input::Filter) => {
                let pane = self.focused_pane_mut();
                pane.filter_text.pop();
                pane.present();
            }
            None => {}
        }
    }

    /// Clear the focused pane's filter and re-present.
    pub fn clear_filter(&mut self) {
        let pane = self.focused_pane_mut();
        if !pane.filter_text.is_empty() {
            pane.filter_text.clear();
            pane.present();
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use tokio::sync::mpsc::UnboundedReceiver;

    const SMS_BODY: &str = concat!(
        "<table id=\"smsTable\" class=\"tablesorter\"><thead><tr>",
        "<th>c0</th><th>c1</th><th>c2</th><th>c3</th><th>c4</th>",
        "<th>sent</th><th>c6</th><th>c7</th><th>stored</th>",
        "</tr></thead><tbody>",
        "<tr><td>a</td><td>a</td><td>a</td><td>a</td><td>a</td>",
        "<td>2024-03-07 14:02:05.0</td><td>a</td><td>a</td>",
        "<td>2024-03-07 14:00:00.0</td></tr>",
        "<tr><td>b</td><td>b</td><td>b</td><td>b</td><td>b</td>",
        "<td>2024-03-07 09:30:00.0</td><td>b</td><td>b</td>",
        "<td>2024-03-07 09:00:00.0</td></tr>",
        "</tbody></table>"
    );

    const EXPIRED_BODY: &str = r#"<div id="sessiontimeout">Session timeout</div>"#;

    fn test_app() -> (App, UnboundedReceiver<FetchRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new("http://gw.example/smsgateway", ThemeMode::Dark, tx);
        (app, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<FetchRequest>) -> Vec<FetchRequest> {
        let mut out = Vec::new();
        while let Ok(req) = rx.try_recv() {
            out.push(req);
        }
        out
    }

    #[test]
    fn date_filter_is_zero_padded_wildcard() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(date_filter(date), "2024-03-07%");
    }

    #[test]
    fn reload_populates_date_and_queues_routing() {
        let (mut app, mut rx) = test_app();
        app.reload();
        assert!(!app.date_field.is_empty());
        assert!(app.date_field.ends_with('%'));
        assert_eq!(drain(&mut rx), vec![FetchRequest::Routing]);
    }

    #[test]
    fn sms_completion_presents_sorted_rows() {
        let (mut app, _rx) = test_app();
        app.apply_fetch_event(FetchEvent::Sms {
            body: Ok(SMS_BODY.to_string()),
            from_form: false,
        });
        // Row 1 (09:30) sorts before row 0 (14:02) on column 5.
        assert_eq!(app.sms.order, vec![1, 0]);
        assert!(app.sms.spec.has_fixed_widths());
    }

    #[test]
    fn form_completion_presents_without_fixed_widths() {
        let (mut app, _rx) = test_app();
        app.apply_fetch_event(FetchEvent::Sms {
            body: Ok(SMS_BODY.to_string()),
            from_form: true,
        });
        assert_eq!(app.sms.order, vec![1, 0]);
        assert!(!app.sms.spec.has_fixed_widths());
        assert!(app.sms.spec.has_zebra());
    }

    #[test]
    fn routing_completion_queues_exactly_one_status_fetch_afterwards() {
        let (mut app, mut rx) = test_app();
        let body = "<table><tbody><tr><td>2024-03-07 08:00:00.0</td></tr></tbody></table>";
        app.apply_fetch_event(FetchEvent::Routing(Ok(body.to_string())));
        assert_eq!(drain(&mut rx), vec![FetchRequest::Status]);
        assert_eq!(app.routing.order, vec![0]);
    }

    #[test]
    fn routing_failure_does_not_cascade_into_status() {
        let (mut app, mut rx) = test_app();
        app.apply_fetch_event(FetchEvent::Routing(Err(ClientError::Timeout)));
        assert!(drain(&mut rx).is_empty());
        assert!(app.get_status_message().is_some());
    }

    #[test]
    fn expired_sms_fragment_triggers_reload_and_skips_presentation() {
        let (mut app, mut rx) = test_app();
        // Establish prior content so the reset is observable.
        app.apply_fetch_event(FetchEvent::Sms {
            body: Ok(SMS_BODY.to_string()),
            from_form: false,
        });
        assert_eq!(app.sms.order.len(), 2);
        drain(&mut rx);

        app.apply_fetch_event(FetchEvent::Sms {
            body: Ok(EXPIRED_BODY.to_string()),
            from_form: false,
        });

        // The cycle terminated: state reset, presenter skipped, initial
        // load re-queued.
        assert!(app.sms.content.is_none());
        assert!(app.sms.order.is_empty());
        assert!(!app.date_field.is_empty());
        assert_eq!(drain(&mut rx), vec![FetchRequest::Routing]);
    }

    #[test]
    fn expired_routing_fragment_does_not_queue_status() {
        let (mut app, mut rx) = test_app();
        app.apply_fetch_event(FetchEvent::Routing(Ok(EXPIRED_BODY.to_string())));
        // Only the reload's routing request, no status.
        assert_eq!(drain(&mut rx), vec![FetchRequest::Routing]);
    }

    #[test]
    fn status_completion_updates_snapshot() {
        let (mut app, _rx) = test_app();
        app.apply_fetch_event(FetchEvent::Status(Ok(
            r#"{"router": "alive", "watchdog": "dead"}"#.to_string(),
        )));
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.router, "alive");
        assert_eq!(status.watchdog, "dead");
    }

    #[test]
    fn malformed_status_keeps_previous_snapshot() {
        let (mut app, _rx) = test_app();
        app.apply_fetch_event(FetchEvent::Status(Ok(
            r#"{"router": "alive", "watchdog": "alive"}"#.to_string(),
        )));
        app.apply_fetch_event(FetchEvent::Status(Ok("<html>not json</html>".to_string())));

        let status = app.status.as_ref().unwrap();
        assert_eq!(status.router, "alive");
        assert!(app.get_status_message().is_some());
    }

    #[test]
    fn transport_failure_leaves_pane_content_untouched() {
        let (mut app, _rx) = test_app();
        app.apply_fetch_event(FetchEvent::Sms {
            body: Ok(SMS_BODY.to_string()),
            from_form: false,
        });
        let before = app.sms.order.clone();

        app.apply_fetch_event(FetchEvent::Sms {
            body: Err(ClientError::Timeout),
            from_form: false,
        });
        assert_eq!(app.sms.order, before);
        assert!(app.sms.content.is_some());
    }

    #[test]
    fn last_completion_wins_on_the_same_pane() {
        let (mut app, _rx) = test_app();
        app.apply_fetch_event(FetchEvent::Sms {
            body: Ok(SMS_BODY.to_string()),
            from_form: false,
        });
        app.apply_fetch_event(FetchEvent::Sms {
            body: Ok("No SMS in Tables found".to_string()),
            from_form: false,
        });
        assert_eq!(
            app.sms.content,
            Some(Fragment::Notice("No SMS in Tables found".to_string()))
        );
        assert!(app.sms.order.is_empty());
    }

    #[test]
    fn filter_editing_represents_live() {
        let (mut app, _rx) = test_app();
        app.apply_fetch_event(FetchEvent::Sms {
            body: Ok(SMS_BODY.to_string()),
            from_form: false,
        });
        app.focus = Focus::Sms;
        app.start_editing(Input::Filter);
        app.edit_push('b');
        assert_eq!(app.sms.order, vec![1]);
        app.edit_pop();
        assert_eq!(app.sms.order, vec![1, 0]);
    }

    #[test]
    fn filter_editing_unavailable_on_routing_pane() {
        let (mut app, _rx) = test_app();
        app.focus = Focus::Routing;
        app.start_editing(Input::Filter);
        assert!(app.editing.is_none());
    }

    #[test]
    fn parse_filters_handles_scoped_and_bare_terms() {
        let filters = parse_filters("5:2024 foo");
        assert_eq!(
            filters,
            vec![
                RowFilter { column: Some(5), needle: "2024".to_string() },
                RowFilter { column: None, needle: "foo".to_string() },
            ]
        );
        assert!(parse_filters("  ").is_empty());
    }
}
