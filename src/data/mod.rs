//! Data models and processing for gateway responses.
//!
//! ## Submodules
//!
//! - [`fragment`]: HTML fragment parsing and the session-expiry guard
//! - [`status`]: router/watchdog snapshot and the indicator color mapping
//! - [`table`]: table presentation (per-column parsers, sort, filters)
//! - [`timestamp`]: the gateway's chronological cell format
//!
//! ## Refresh pipeline
//!
//! ```text
//! response body
//!      │
//!      ├──▶ Fragment::parse()            (content replacement)
//!      ├──▶ fragment::is_session_expired (guard, before any sorting)
//!      └──▶ TableSpec::present()         (sorted, filtered row order)
//! ```

pub mod fragment;
pub mod status;
pub mod table;
pub mod timestamp;

pub use fragment::{Fragment, TableModel};
pub use status::{IndicatorColor, StatusSnapshot};
pub use table::{CellParser, RowFilter, SortDirection, TableSpec};
pub use timestamp::GatewayTimestamp;
