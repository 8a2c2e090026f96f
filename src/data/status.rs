//! Router and watchdog status snapshot.
//!
//! The `ajax/status` endpoint returns `{ "router": "...", "watchdog": "..." }`.
//! The appliance produces `alive`, `dead`, or `noobject`; the dashboard only
//! distinguishes the exact literal `alive` from everything else.

use serde::Deserialize;

/// The literal value the gateway reports for a live subsystem.
pub const ALIVE: &str = "alive";

/// The two-key alive/dead state of the monitored subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusSnapshot {
    pub router: String,
    pub watchdog: String,
}

impl StatusSnapshot {
    /// Parse the status endpoint's JSON body.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn router_color(&self) -> IndicatorColor {
        indicator_color(&self.router)
    }

    pub fn watchdog_color(&self) -> IndicatorColor {
        indicator_color(&self.watchdog)
    }
}

/// Binary health indicator color.
///
/// The exact gateway palette: green `#669933`, red `#E24C34`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorColor {
    Green,
    Red,
}

impl IndicatorColor {
    /// RGB triple of the indicator background.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            IndicatorColor::Green => (0x66, 0x99, 0x33),
            IndicatorColor::Red => (0xE2, 0x4C, 0x34),
        }
    }
}

/// Map a status value onto the indicator color.
///
/// Only the exact literal `alive` is green. Unrecognized or missing values
/// collapse into red; they are not rendered as a distinct unknown state.
pub fn indicator_color(value: &str) -> IndicatorColor {
    if value == ALIVE {
        IndicatorColor::Green
    } else {
        IndicatorColor::Red
    }
}
