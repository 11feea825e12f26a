//! Tuner Core
//!
//! Shared infrastructure for the CLI: the settings store and the per-session
//! context handed to every command.

pub mod config;
pub mod session;

pub use config::{Settings, SettingsError, SettingsResult, SettingsStore};
pub use session::{SessionContext, SessionError, SessionResult, SessionState};
