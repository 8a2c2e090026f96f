//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection. The
//! health indicators always use the gateway's fixed palette regardless of
//! theme: green `#669933`, red `#E24C34`.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::IndicatorColor;
use crate::settings::ThemeMode;

/// Color and style theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for table header rows.
    pub header: Style,
    /// Style for the selected row.
    pub selected: Style,
    /// Style for zebra-striped rows.
    pub zebra: Style,
    /// Border style for the focused pane.
    pub focused_border: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            zebra: Style::default().bg(Color::Rgb(0x20, 0x24, 0x30)),
            focused_border: Style::default().fg(Color::Cyan),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            zebra: Style::default().bg(Color::Rgb(0xE8, 0xEE, 0xF8)),
            focused_border: Style::default().fg(Color::Blue),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Resolve a configured theme mode.
    pub fn from_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Auto => Self::auto_detect(),
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    /// Style for a health indicator: the raw status value rendered on the
    /// gateway's green or red background.
    pub fn indicator_style(&self, color: IndicatorColor) -> Style {
        let (r, g, b) = color.rgb();
        Style::default()
            .bg(Color::Rgb(r, g, b))
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }
}
