use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    backend::{
        error::BackendError,
        types::{
            AsrModeResponse, BackendConfig, DataResponse, DeviceListResponse, HistoryResponse,
            MemberListResponse, ResultResponse, RunStatusResponse, VoiceListResponse,
        },
    },
    prefs::VoiceMode,
    socket::VoiceEntry,
    state::{AsrMode, ConfigFlags, Message, UserEntry},
};

/// Request payload encodings the backend accepts.
enum RequestBody {
    Empty,
    Json(Value),
    /// Form-encoded `data=<json>`, for the endpoints that read `request.values`.
    Form(Value),
}

/// Panel's handle to the backend HTTP API.
///
/// Every endpoint goes through one request path: the body is encoded per
/// endpoint, non-2xx statuses become `BackendError::Status`, and the response
/// text is decoded into a typed schema regardless of its content type.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client for `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::Build)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &'static str,
        body: RequestBody,
    ) -> Result<T, BackendError> {
        let url = format!("{}{path}", self.base_url);
        let builder = self.http.request(method.clone(), &url);
        let builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(v) => builder.json(&v),
            RequestBody::Form(v) => builder.form(&[("data", v.to_string())]),
        };

        debug!("{method} {path}");
        let resp = builder
            .send()
            .await
            .map_err(|source| BackendError::Http { path, source })?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|source| BackendError::Http { path, source })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ResultResponse>(&bytes)
                .ok()
                .and_then(|r| r.message);
            return Err(BackendError::Status { path, status, message });
        }

        serde_json::from_slice(&bytes).map_err(|source| BackendError::Decode { path, source })
    }

    // ── Lists & status ────────────────────────────────────────────────────────

    pub async fn voice_list(&self) -> Result<Vec<VoiceEntry>, BackendError> {
        let resp: VoiceListResponse = self
            .request(Method::GET, "/api/get-voice-list", RequestBody::Empty)
            .await?;
        Ok(resp.into_entries())
    }

    pub async fn audio_device_list(&self) -> Result<Vec<String>, BackendError> {
        let resp: DeviceListResponse = self
            .request(Method::GET, "/api/get-audio-device-list", RequestBody::Empty)
            .await?;
        Ok(resp.into_entries())
    }

    /// Whether the backend session is running.
    pub async fn run_status(&self) -> Result<bool, BackendError> {
        let resp: RunStatusResponse = self
            .request(Method::POST, "/api/get_run_status", RequestBody::Empty)
            .await?;
        Ok(resp.status)
    }

    pub async fn data(&self) -> Result<BackendConfig, BackendError> {
        let resp: DataResponse = self
            .request(Method::POST, "/api/get-data", RequestBody::Empty)
            .await?;
        Ok(resp.config)
    }

    pub async fn member_list(&self) -> Result<Vec<UserEntry>, BackendError> {
        let resp: MemberListResponse = self
            .request(Method::POST, "/api/get-member-list", RequestBody::Json(json!({})))
            .await?;
        Ok(resp.into_users())
    }

    /// Transcript for `username`, oldest first.
    pub async fn message_history(&self, username: &str) -> Result<Vec<Message>, BackendError> {
        let resp: HistoryResponse = self
            .request(
                Method::POST,
                "/api/get-msg",
                RequestBody::Form(json!({ "username": username })),
            )
            .await?;
        Ok(resp.into_messages())
    }

    pub async fn asr_mode(&self) -> Result<Option<AsrMode>, BackendError> {
        let resp: AsrModeResponse = self
            .request(Method::POST, "/api/get-asr-mode", RequestBody::Empty)
            .await?;
        Ok(AsrMode::parse(&resp.asr_mode))
    }

    // ── Mutations ─────────────────────────────────────────────────────────────

    pub async fn submit_config(&self, flags: ConfigFlags) -> Result<ResultResponse, BackendError> {
        let config = json!({
            "config": {
                "source": { "record": { "enabled": flags.record_enabled } },
                "interact": { "playSound": flags.play_sound_enabled },
            }
        });
        self.request(Method::POST, "/api/submit", RequestBody::Form(config))
            .await
    }

    pub async fn control_eyes(&self, state: bool) -> Result<ResultResponse, BackendError> {
        self.request(
            Method::POST,
            "/api/control-eyes",
            RequestBody::Json(json!({ "state": state })),
        )
        .await
    }

    pub async fn start_live(&self) -> Result<ResultResponse, BackendError> {
        self.request(Method::POST, "/api/start-live", RequestBody::Empty)
            .await
    }

    pub async fn stop_live(&self) -> Result<ResultResponse, BackendError> {
        self.request(Method::POST, "/api/stop-live", RequestBody::Empty)
            .await
    }

    pub async fn clear_history(&self, username: &str) -> Result<ResultResponse, BackendError> {
        self.request(
            Method::POST,
            "/api/clear-history",
            RequestBody::Json(json!({ "username": username })),
        )
        .await
    }

    pub async fn send_message(
        &self,
        username: &str,
        msg: &str,
    ) -> Result<ResultResponse, BackendError> {
        self.request(
            Method::POST,
            "/api/send",
            RequestBody::Form(json!({ "msg": msg, "username": username })),
        )
        .await
    }

    pub async fn change_asr_mode(&self, mode: AsrMode) -> Result<ResultResponse, BackendError> {
        self.request(
            Method::POST,
            "/api/change-asr-mode",
            RequestBody::Json(json!({ "asrModel": mode.as_str() })),
        )
        .await
    }

    pub async fn change_voice_mode(&self, mode: VoiceMode) -> Result<ResultResponse, BackendError> {
        self.request(
            Method::POST,
            "/api/change-voice-mode",
            RequestBody::Json(json!({ "voiceMode": mode.index() })),
        )
        .await
    }
}
