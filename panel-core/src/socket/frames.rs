// JSON text frames exchanged with the backend's panel socket.

use serde::{
    de::{DeserializeOwned, Error as _},
    Deserialize, Serialize,
};
use serde_json::{Map, Value};
use tracing::warn;

use crate::wire;

/// One decoded inbound frame. Every key is optional and independent: a key
/// whose value has the wrong shape is dropped without touching its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundPayload {
    /// `liveState`
    pub live_state: Option<u8>,
    /// `voiceList`
    pub voice_list: Option<Vec<VoiceEntry>>,
    /// `deviceList`
    pub device_list: Option<Vec<String>>,
    /// `panelMsg`
    pub panel_msg: Option<String>,
    /// Avatar animation the backend wants shown.
    pub robot: Option<String>,
    /// `panelReply`
    pub panel_reply: Option<PanelReply>,
    pub is_connect: Option<bool>,
    pub remote_audio_connect: Option<bool>,
}

/// A TTS voice as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VoiceEntry {
    #[serde(deserialize_with = "wire::string_or_number")]
    pub id: String,
    pub name: String,
}

/// A reply routed to one end-user conversation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PanelReply {
    #[serde(default, deserialize_with = "wire::opt_id")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default, deserialize_with = "wire::opt_id")]
    pub uid: Option<i64>,
    #[serde(default)]
    pub content: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "wire::truthy_flag")]
    pub is_adopted: bool,
}

/// Decodes one text frame. Only JSON objects are accepted; within the
/// object each known key is decoded on its own.
pub fn decode_frame(text: &str) -> Result<InboundPayload, serde_json::Error> {
    let Value::Object(mut map) = serde_json::from_str(text)? else {
        return Err(serde_json::Error::custom("frame is not a JSON object"));
    };
    Ok(InboundPayload {
        live_state: field(&mut map, "liveState"),
        voice_list: field(&mut map, "voiceList"),
        device_list: field(&mut map, "deviceList"),
        panel_msg: field(&mut map, "panelMsg"),
        robot: field(&mut map, "robot"),
        panel_reply: field(&mut map, "panelReply"),
        is_connect: field(&mut map, "is_connect"),
        remote_audio_connect: field(&mut map, "remote_audio_connect"),
    })
}

/// `None` when the key is absent, `null`, or not a `T`.
fn field<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = map.remove(key)?;
    match serde_json::from_value::<Option<T>>(value) {
        Ok(v) => v,
        Err(e) => {
            warn!("dropping `{key}` from frame: {e}");
            None
        }
    }
}

/// Frames the panel sends to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OutboundFrame {
    /// Selects the active conversation partner: `{"Username": <name>}`.
    #[serde(rename = "Username")]
    SelectUser(String),
}
