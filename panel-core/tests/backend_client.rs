// HTTP client against the in-process fake backend.

mod common;

use std::time::Duration;

use common::FakeBackend;
use panel_core::{
    backend::BackendError,
    prefs::VoiceMode,
    state::{AsrMode, ConfigFlags, UserEntry},
    BackendClient,
};

async fn client(fake: &FakeBackend) -> BackendClient {
    let served = fake.serve().await;
    BackendClient::new(&served.api_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn submit_config_posts_form_encoded_nested_flags() {
    let fake = FakeBackend::new();
    fake.respond("/api/submit", 200, r#"{"result": "successful"}"#);
    let client = client(&fake).await;

    let resp = client
        .submit_config(ConfigFlags { record_enabled: true, play_sound_enabled: false })
        .await
        .unwrap();
    assert!(resp.is_successful());

    let hits = fake.hits("/api/submit");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].method, "POST");
    assert!(hits[0].content_type.starts_with("application/x-www-form-urlencoded"));
    let data = hits[0].form_data();
    assert_eq!(data["config"]["source"]["record"]["enabled"], true);
    assert_eq!(data["config"]["interact"]["playSound"], false);
}

#[tokio::test]
async fn json_endpoints_send_json_bodies() {
    let fake = FakeBackend::new();
    fake.respond("/api/clear-history", 200, r#"{"result": "successful"}"#)
        .respond("/api/change-asr-mode", 200, r#"{"result": "successful"}"#)
        .respond("/api/change-voice-mode", 200, r#"{"result": "successful"}"#)
        .respond("/api/control-eyes", 200, r#"{"result": "successful"}"#);
    let client = client(&fake).await;

    client.clear_history("alice").await.unwrap();
    client.change_asr_mode(AsrMode::Xunfei).await.unwrap();
    client.change_voice_mode(VoiceMode::Recitation).await.unwrap();
    client.control_eyes(true).await.unwrap();

    let clear = &fake.hits("/api/clear-history")[0];
    assert!(clear.content_type.starts_with("application/json"));
    assert_eq!(clear.json(), serde_json::json!({ "username": "alice" }));
    assert_eq!(fake.hits("/api/change-asr-mode")[0].json()["asrModel"], "xunfei");
    assert_eq!(fake.hits("/api/change-voice-mode")[0].json()["voiceMode"], 2);
    assert_eq!(fake.hits("/api/control-eyes")[0].json()["state"], true);
}

#[tokio::test]
async fn send_message_carries_user_and_text() {
    let fake = FakeBackend::new();
    fake.respond("/api/send", 200, r#"{"result": "successful"}"#);
    let client = client(&fake).await;

    client.send_message("alice", "hello there & more").await.unwrap();

    let data = fake.hits("/api/send")[0].form_data();
    assert_eq!(data["username"], "alice");
    assert_eq!(data["msg"], "hello there & more");
}

#[tokio::test]
async fn rejection_body_is_a_result_not_an_error() {
    let fake = FakeBackend::new();
    fake.respond("/api/start-live", 200, r#"{"result": "failed", "message": "busy"}"#);
    let client = client(&fake).await;

    let resp = client.start_live().await.unwrap();
    assert!(!resp.is_successful());
    assert_eq!(resp.message.as_deref(), Some("busy"));
}

#[tokio::test]
async fn error_status_keeps_the_backend_message() {
    let fake = FakeBackend::new();
    fake.respond("/api/clear-history", 500, r#"{"success": false, "message": "db locked"}"#);
    let client = client(&fake).await;

    let err = client.clear_history("alice").await.unwrap_err();
    match &err {
        BackendError::Status { path, status, message } => {
            assert_eq!(*path, "/api/clear-history");
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message.as_deref(), Some("db locked"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "db locked");
}

#[tokio::test]
async fn unparseable_body_is_a_decode_error() {
    let fake = FakeBackend::new();
    fake.respond("/api/get_run_status", 200, "alert('hi')");
    let client = client(&fake).await;

    let err = client.run_status().await.unwrap_err();
    assert!(matches!(err, BackendError::Decode { path: "/api/get_run_status", .. }));
}

#[tokio::test]
async fn snapshots_are_typed() {
    let fake = FakeBackend::new();
    fake.respond("/api/get_run_status", 200, r#"{"status": true}"#)
        .respond("/api/get-asr-mode", 200, r#"{"asr_mode": "huyu"}"#)
        .respond(
            "/api/get-member-list",
            200,
            r#"{"list": [[1, "User"], [7, "alice"]]}"#,
        )
        .respond(
            "/api/get-msg",
            200,
            r#"{"list": [{"type": "member", "content": "hi", "username": "alice",
                         "timetext": "2024-01-01 10:00:00", "id": 3, "is_adopted": 0}]}"#,
        )
        .respond("/api/get-voice-list", 200, r#"[{"id": 1, "name": "A"}]"#)
        .respond("/api/get-audio-device-list", 200, r#"["Mic 1", "Mic 2"]"#);
    let client = client(&fake).await;

    assert!(client.run_status().await.unwrap());
    assert_eq!(client.asr_mode().await.unwrap(), Some(AsrMode::Huyu));
    assert_eq!(
        client.member_list().await.unwrap(),
        vec![UserEntry::new(1, "User"), UserEntry::new(7, "alice")]
    );

    let messages = client.message_history("alice").await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "hi");
    assert_eq!(messages[0].id, Some(3));
    assert_eq!(fake.hits("/api/get-msg")[0].form_data()["username"], "alice");

    let voices = client.voice_list().await.unwrap();
    assert_eq!(voices[0].id, "1");
    assert_eq!(client.audio_device_list().await.unwrap(), ["Mic 1", "Mic 2"]);
    assert_eq!(fake.hits("/api/get-voice-list")[0].method, "GET");
}

#[tokio::test]
async fn unreachable_backend_is_an_http_error() {
    let client = BackendClient::new("http://127.0.0.1:1/", Duration::from_secs(2)).unwrap();
    let err = client.stop_live().await.unwrap_err();
    assert!(matches!(err, BackendError::Http { path: "/api/stop-live", .. }));
}
