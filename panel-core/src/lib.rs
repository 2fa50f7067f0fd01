//! Headless core of the Fay control panel.
//!
//! - [`socket`] owns the persistent panel WebSocket and its reconnect loop.
//! - [`reducer`] maps socket frames, HTTP results and user intents onto
//!   [`state::PanelState`], returning [`event::Effect`]s.
//! - [`backend`] is the typed HTTP client; [`actions`] runs reducer commands
//!   through it.
//! - [`prefs`] persists local UI preferences; [`config`] reads the environment.

pub mod actions;
pub mod backend;
pub mod config;
pub mod event;
pub mod prefs;
pub mod reducer;
pub mod socket;
pub mod state;

mod wire;

pub use backend::{BackendClient, BackendError};
pub use config::PanelConfig;
pub use event::{Command, Effect, Notification, NotificationLevel, Outcome, PanelEvent};
pub use reducer::reduce;
pub use state::PanelState;
