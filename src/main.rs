use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::sync::mpsc;

use smswatch::app::App;
use smswatch::client::GatewayClient;
use smswatch::settings::{Settings, ThemeMode};
use smswatch::{events, fetch, ui};

#[derive(Parser, Debug)]
#[command(name = "smswatch")]
#[command(about = "Terminal dashboard for monitoring an SMS gateway appliance")]
struct Args {
    /// Gateway base endpoint (e.g. https://10.0.0.5/smsgateway)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Accept invalid TLS certificates (self-signed gateways)
    #[arg(long)]
    insecure: bool,

    /// Color theme
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging();

    // Layer CLI flags over file/env/default settings
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(endpoint) = args.endpoint {
        settings.endpoint = endpoint;
    }
    if let Some(timeout) = args.timeout {
        settings.timeout_secs = timeout;
    }
    if args.insecure {
        settings.accept_invalid_certs = true;
    }
    if let Some(theme) = args.theme {
        settings.theme = theme;
    }

    let mut builder = GatewayClient::builder()
        .endpoint(settings.endpoint.clone())
        .timeout(Duration::from_secs(settings.timeout_secs))
        .accept_invalid_certs(settings.accept_invalid_certs);
    if let Some(cookie) = &settings.session_cookie {
        builder = builder.session_cookie(cookie.clone());
    }
    let client = builder.build()?;

    // The fetch worker runs on the tokio runtime in the background while
    // the TUI loop stays synchronous on the main thread.
    let runtime = tokio::runtime::Runtime::new()?;
    let (req_tx, req_rx) = mpsc::unbounded_channel();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel();
    runtime.spawn(fetch::run_worker(client, req_rx, evt_tx));

    let mut app = App::new(settings.endpoint, settings.theme, req_tx);

    run_tui(&mut app, evt_rx)
}

/// Initialize tracing to stderr, but only when explicitly requested, so
/// the TUI stays clean by default.
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = std::env::var("SMSWATCH_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .map(EnvFilter::new);

    if let Some(filter) = filter {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

/// Run the TUI, restoring the terminal on exit.
fn run_tui(app: &mut App, events: mpsc::UnboundedReceiver<fetch::FetchEvent>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Initial load: today's date filter, routing, then status
    app.reload();

    let result = run_app(&mut terminal, app, events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut events: mpsc::UnboundedReceiver<fetch::FetchEvent>,
) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                frame.render_widget(paragraph, area);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header with indicators
                Constraint::Fill(1),   // Routing pane
                Constraint::Fill(2),   // SMS form + pane
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::routing::render(frame, app, chunks[1]);
            ui::sms::render(frame, app, chunks[2]);
            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for terminal events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // Apply fetch completions in arrival order
        while let Ok(event) = events.try_recv() {
            app.apply_fetch_event(event);
        }
    }

    Ok(())
}
