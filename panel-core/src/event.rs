// Inputs and outputs of the reducer.
//
// `PanelEvent` is everything that can change `PanelState`: socket traffic,
// HTTP results and user intents. `Effect` is what the reducer asks its host
// to do afterwards; `Command` is the subset that needs the network.

use crate::{
    backend::{BackendError, ResultResponse},
    prefs::{Preferences, VoiceMode},
    socket::{SocketEvent, VoiceEntry},
    state::{AsrMode, ConfigFlags, Message, UserEntry},
};

// ── Outcome ───────────────────────────────────────────────────────────────────

/// Result of a mutating request as the reducer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// Carries the backend's `message`, or a transport error description.
    Failed(Option<String>),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// The failure text, or `fallback` when the backend gave none.
    pub fn failure_text(&self, fallback: &str) -> String {
        match self {
            Self::Failed(Some(m)) if !m.is_empty() => m.clone(),
            _ => fallback.to_owned(),
        }
    }
}

impl From<ResultResponse> for Outcome {
    fn from(resp: ResultResponse) -> Self {
        if resp.is_successful() {
            Self::Succeeded
        } else {
            Self::Failed(resp.message)
        }
    }
}

impl From<Result<ResultResponse, BackendError>> for Outcome {
    fn from(res: Result<ResultResponse, BackendError>) -> Self {
        match res {
            Ok(resp) => resp.into(),
            Err(e) => Self::Failed(Some(e.user_message())),
        }
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    Socket(SocketEvent),

    /// Window opened; load the initial snapshot.
    Startup,
    /// Roster poll timer fired.
    RosterTick,

    RunStatusLoaded(bool),
    /// Flags present in the backend configuration. Absent ones are untouched.
    ConfigLoaded {
        record_enabled: Option<bool>,
        play_sound_enabled: Option<bool>,
    },
    RosterLoaded(Vec<UserEntry>),
    HistoryLoaded { username: String, messages: Vec<Message> },
    VoiceListLoaded(Vec<VoiceEntry>),
    DeviceListLoaded(Vec<String>),
    AsrModeLoaded(Option<AsrMode>),

    SelectUser(UserEntry),

    StartLiveRequested,
    LiveStarted(Outcome),
    StopLiveRequested,
    LiveStopped(Outcome),

    SendRequested(String),
    MessageSent(Outcome),

    ToggleRecord,
    ToggleSound,
    ConfigSubmitted(Outcome),

    ClearHistoryRequested,
    HistoryCleared { username: String, outcome: Outcome },

    ToggleSidebar,
    CycleBackground,
    CycleVoiceMode,
    VoiceModeChanged { mode: VoiceMode, outcome: Outcome },

    ToggleAsrMode,
    AsrModeChanged { mode: AsrMode, outcome: Outcome },

    ControlEyesRequested(bool),
    EyesControlled(Outcome),
}

// ── Effects ───────────────────────────────────────────────────────────────────

/// Network work the bridge performs on the reducer's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadRoster,
    /// Socket `{"Username": ..}` frame, then a history load.
    SelectUser { username: String },
    /// Socket frame only, used to re-announce the selection after a reconnect.
    AnnounceUser { username: String },
    /// Run status and mirrored configuration.
    RefreshData,
    LoadAsrMode,
    LoadVoiceList,
    LoadDeviceList,
    StartLive,
    StopLive,
    SendMessage { username: String, text: String },
    SubmitConfig(ConfigFlags),
    ClearHistory { username: String },
    ChangeAsrMode(AsrMode),
    ChangeVoiceMode(VoiceMode),
    ControlEyes(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A toast shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Dispatch(Command),
    /// Scroll the transcript to its end on the next frame.
    ScrollToBottom,
    Notify(Notification),
    SavePreferences(Preferences),
}
