// Typed response schemas for the backend's HTTP endpoints.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{
    socket::VoiceEntry,
    state::{Message, UserEntry},
    wire,
};

/// `{result, message?}` returned by the mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultResponse {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ResultResponse {
    pub fn is_successful(&self) -> bool {
        self.result == "successful"
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunStatusResponse {
    #[serde(default)]
    pub status: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AsrModeResponse {
    #[serde(default)]
    pub asr_mode: String,
}

// ── get-data ──────────────────────────────────────────────────────────────────

/// The slice of the backend configuration the panel mirrors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub interact: Option<InteractSection>,
    #[serde(default)]
    pub source: Option<SourceSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InteractSection {
    #[serde(default, rename = "playSound")]
    pub play_sound: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourceSection {
    #[serde(default)]
    pub record: Option<RecordSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecordSection {
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl BackendConfig {
    pub fn play_sound(&self) -> Option<bool> {
        self.interact.as_ref().and_then(|i| i.play_sound)
    }

    pub fn record_enabled(&self) -> Option<bool> {
        self.source
            .as_ref()
            .and_then(|s| s.record.as_ref())
            .and_then(|r| r.enabled)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataResponse {
    #[serde(default)]
    pub config: BackendConfig,
}

// ── Lists ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum VoiceListResponse {
    Bare(Vec<VoiceEntry>),
    Wrapped {
        #[serde(alias = "voiceList")]
        voice_list: Vec<VoiceEntry>,
    },
}

impl VoiceListResponse {
    pub fn into_entries(self) -> Vec<VoiceEntry> {
        match self {
            Self::Bare(v) | Self::Wrapped { voice_list: v } => v,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DeviceListResponse {
    Bare(Vec<String>),
    Wrapped {
        #[serde(alias = "deviceList")]
        device_list: Vec<String>,
    },
}

impl DeviceListResponse {
    pub fn into_entries(self) -> Vec<String> {
        match self {
            Self::Bare(v) | Self::Wrapped { device_list: v } => v,
        }
    }
}

/// Rows are `[id, name, ...]`; extra columns are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct MemberListResponse {
    #[serde(default)]
    pub list: Vec<Vec<Value>>,
}

impl MemberListResponse {
    pub fn into_users(self) -> Vec<UserEntry> {
        self.list
            .into_iter()
            .filter_map(|row| {
                let id = row.first().and_then(wire::value_to_id);
                let name = row.get(1).and_then(Value::as_str);
                match (id, name) {
                    (Some(id), Some(name)) => Some(UserEntry::new(id, name)),
                    _ => {
                        warn!("skipping malformed member row: {row:?}");
                        None
                    }
                }
            })
            .collect()
    }
}

// ── History ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct HistoryEntry {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timetext: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, deserialize_with = "wire::opt_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "wire::truthy_flag")]
    pub is_adopted: bool,
}

impl From<HistoryEntry> for Message {
    fn from(e: HistoryEntry) -> Self {
        Message {
            id: e.id,
            username: e.username,
            content: e.content,
            kind: e.kind,
            timetext: e.timetext,
            adopted: e.is_adopted,
        }
    }
}

/// The list may nest one level; it is flattened in order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum HistoryItem {
    Many(Vec<HistoryEntry>),
    One(HistoryEntry),
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    #[serde(default)]
    pub list: Vec<HistoryItem>,
}

impl HistoryResponse {
    pub fn into_messages(self) -> Vec<Message> {
        self.list
            .into_iter()
            .flat_map(|item| match item {
                HistoryItem::One(e) => vec![e],
                HistoryItem::Many(es) => es,
            })
            .map(Message::from)
            .collect()
    }
}
