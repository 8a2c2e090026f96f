//! # smswatch
//!
//! A terminal dashboard for monitoring an SMS gateway appliance.
//!
//! The gateway exposes three HTTP endpoints under its base path: an HTML
//! fragment with the SMS table (`ajax/getsms`), an HTML fragment with the
//! routing table (`ajax/getrouting`), and a JSON router/watchdog status
//! (`ajax/status`). smswatch polls them on demand, detects in-band
//! session expiry, and renders the tables with the gateway's chronological
//! sort rule applied to the timestamp columns.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  ┌─────────┐   FetchRequest   ┌───────┐    ┌──────────┐  │
//! │  │  app    │─────────────────▶│ fetch │───▶│  client  │──┼──▶ gateway
//! │  │ (state) │◀─────────────────│worker │    │ (reqwest)│  │
//! │  └────┬────┘    FetchEvent    └───────┘    └──────────┘  │
//! │       │                                                  │
//! │       ▼                                                  │
//! │  ┌─────────┐   fragment guard → table presenter          │
//! │  │  data   │                                             │
//! │  └────┬────┘                                             │
//! │       ▼                                                  │
//! │  ┌─────────┐                                             │
//! │  │   ui    │──▶ terminal                                 │
//! │  └─────────┘                                             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: dashboard state, refresh orchestration, key actions
//! - **[`client`]**: HTTP access to the gateway endpoints
//! - **[`fetch`]**: background fetch worker and its request/event channel
//! - **[`data`]**: fragment parsing, the session guard, the timestamp
//!   comparator, and table presentation
//! - **[`ui`]**: ratatui rendering (panes, indicators, theme)
//! - **[`settings`]**: file/env/CLI configuration layering
//!
//! Within one fetch completion the ordering is fixed: the fragment is
//! stored, the session guard runs, and only then is the table re-sorted.
//! A session-expiry sentinel aborts the cycle into a full dashboard
//! reload.

pub mod app;
pub mod client;
pub mod data;
pub mod events;
pub mod fetch;
pub mod settings;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use client::{ClientError, GatewayClient};
pub use data::{Fragment, StatusSnapshot, TableModel, TableSpec};
pub use fetch::{FetchEvent, FetchRequest};
pub use settings::Settings;
