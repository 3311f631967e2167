//! TTL reaper for expired sessions.
//!
//! A background task that periodically evicts sessions older than the
//! configured TTL and deletes the files they recorded.

mod config;
mod runner;
mod types;

pub use config::ReaperConfig;
pub use runner::SessionReaper;
pub use types::ReapReport;
