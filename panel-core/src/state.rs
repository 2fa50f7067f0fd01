// Panel state container.
//
// One `PanelState` is owned by the UI thread and mutated only through
// `reducer::reduce`. Everything here is plain data so the reducer can be
// exercised without a window.

use serde::{Deserialize, Serialize};

use crate::prefs::Preferences;

/// Display name of the entry inserted when the backend roster is empty.
pub const PLACEHOLDER_USER_NAME: &str = "User";
/// Id of the placeholder roster entry.
pub const PLACEHOLDER_USER_ID: i64 = 1;

// ── Session ──────────────────────────────────────────────────────────────────

/// Whether the backend conversational session is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LiveState {
    #[default]
    Stopped,
    Live,
    /// Set locally as soon as a start is requested.
    Starting,
    /// Set locally once a stop request has been answered.
    Stopping,
}

impl LiveState {
    /// Maps the integer the backend sends in `liveState`.
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Stopped),
            1 => Some(Self::Live),
            2 => Some(Self::Starting),
            3 => Some(Self::Stopping),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Live => "live",
            Self::Starting => "starting…",
            Self::Stopping => "stopping…",
        }
    }
}

// ── Records ──────────────────────────────────────────────────────────────────

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Option<i64>,
    pub username: String,
    pub content: String,
    /// Author role tag as sent by the backend (`member`, `fay`, ...).
    pub kind: String,
    pub timetext: String,
    /// Whether a moderator marked this reply as the one actually used.
    pub adopted: bool,
}

/// A conversation partner from the member roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub id: i64,
    pub name: String,
}

impl UserEntry {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }

    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_USER_ID, PLACEHOLDER_USER_NAME)
    }
}

/// Value/label pair for the voice and audio-device pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Backend flags mirrored into the panel. The backend stays authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigFlags {
    pub record_enabled: bool,
    pub play_sound_enabled: bool,
}

/// Speech recognition engine selected on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsrMode {
    Huyu,
    Xunfei,
}

impl AsrMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "huyu" => Some(Self::Huyu),
            "xunfei" => Some(Self::Xunfei),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Huyu => "huyu",
            Self::Xunfei => "xunfei",
        }
    }

    /// The engine a toggle switches to. An unknown current mode goes to huyu.
    pub fn toggled(current: Option<Self>) -> Self {
        match current {
            Some(Self::Huyu) => Self::Xunfei,
            _ => Self::Huyu,
        }
    }
}

// ── Container ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    pub live_state: LiveState,
    pub config_editable: bool,
    /// The local WebSocket is open.
    pub socket_connected: bool,
    /// Backend reports its own upstream connection (`is_connect`).
    pub backend_connected: bool,
    pub remote_audio_connected: bool,

    pub roster: Vec<UserEntry>,
    pub selected_user: Option<UserEntry>,
    /// Transcript of `selected_user`, oldest first.
    pub messages: Vec<Message>,

    pub voice_options: Vec<SelectOption>,
    pub device_options: Vec<SelectOption>,
    pub panel_msg: String,
    pub panel_reply: String,
    pub robot: Option<String>,

    pub config: ConfigFlags,
    pub asr_mode: Option<AsrMode>,
    pub preferences: Preferences,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            live_state: LiveState::Stopped,
            config_editable: true,
            socket_connected: false,
            backend_connected: false,
            remote_audio_connected: false,
            roster: Vec::new(),
            selected_user: None,
            messages: Vec::new(),
            voice_options: Vec::new(),
            device_options: Vec::new(),
            panel_msg: String::new(),
            panel_reply: String::new(),
            robot: None,
            config: ConfigFlags::default(),
            asr_mode: None,
            preferences: Preferences::default(),
        }
    }
}

impl PanelState {
    pub fn with_preferences(preferences: Preferences) -> Self {
        Self { preferences, ..Self::default() }
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected_user.as_ref().map(|u| u.name.as_str())
    }

    /// Linear scan by display name, not id.
    pub fn roster_has_name(&self, name: &str) -> bool {
        self.roster.iter().any(|u| u.name == name)
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected_name() == Some(name)
    }
}
