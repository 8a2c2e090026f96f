//! Terminal rendering for the dashboard.

pub mod common;
pub mod routing;
pub mod sms;
pub mod theme;

pub use theme::Theme;
