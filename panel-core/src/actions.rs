// Executes reducer commands against the backend.
//
// Each command issues its request(s) and maps the answer back into
// `PanelEvent`s. Read-only fetches that fail are logged and produce no event;
// mutating calls always produce an event carrying an `Outcome`.

use tracing::warn;

use crate::{
    backend::{BackendClient, BackendError, ResultResponse},
    event::{Command, Outcome, PanelEvent},
    socket::{OutboundFrame, SocketHandle},
};

pub async fn execute(
    client: &BackendClient,
    socket: &SocketHandle,
    command: Command,
) -> Vec<PanelEvent> {
    match command {
        Command::LoadRoster => fetched("member list", client.member_list().await)
            .map(PanelEvent::RosterLoaded)
            .into_iter()
            .collect(),

        Command::SelectUser { username } => {
            announce(socket, &username);
            load_history(client, username).await
        }
        Command::AnnounceUser { username } => {
            announce(socket, &username);
            Vec::new()
        }

        Command::RefreshData => {
            let mut events = Vec::new();
            if let Some(running) = fetched("run status", client.run_status().await) {
                events.push(PanelEvent::RunStatusLoaded(running));
            }
            if let Some(config) = fetched("config", client.data().await) {
                events.push(PanelEvent::ConfigLoaded {
                    record_enabled: config.record_enabled(),
                    play_sound_enabled: config.play_sound(),
                });
            }
            events
        }
        Command::LoadAsrMode => fetched("asr mode", client.asr_mode().await)
            .map(PanelEvent::AsrModeLoaded)
            .into_iter()
            .collect(),
        Command::LoadVoiceList => fetched("voice list", client.voice_list().await)
            .map(PanelEvent::VoiceListLoaded)
            .into_iter()
            .collect(),
        Command::LoadDeviceList => fetched("device list", client.audio_device_list().await)
            .map(PanelEvent::DeviceListLoaded)
            .into_iter()
            .collect(),

        Command::StartLive => {
            vec![PanelEvent::LiveStarted(outcome("start-live", client.start_live().await))]
        }
        Command::StopLive => {
            vec![PanelEvent::LiveStopped(outcome("stop-live", client.stop_live().await))]
        }
        Command::SendMessage { username, text } => {
            let res = client.send_message(&username, &text).await;
            vec![PanelEvent::MessageSent(outcome("send", res))]
        }
        Command::SubmitConfig(flags) => {
            let res = client.submit_config(flags).await;
            vec![PanelEvent::ConfigSubmitted(outcome("submit", res))]
        }
        Command::ClearHistory { username } => {
            let res = client.clear_history(&username).await;
            vec![PanelEvent::HistoryCleared { username, outcome: outcome("clear-history", res) }]
        }
        Command::ChangeAsrMode(mode) => {
            let res = client.change_asr_mode(mode).await;
            vec![PanelEvent::AsrModeChanged { mode, outcome: outcome("change-asr-mode", res) }]
        }
        Command::ChangeVoiceMode(mode) => {
            let res = client.change_voice_mode(mode).await;
            vec![PanelEvent::VoiceModeChanged { mode, outcome: outcome("change-voice-mode", res) }]
        }
        Command::ControlEyes(on) => {
            let res = client.control_eyes(on).await;
            vec![PanelEvent::EyesControlled(outcome("control-eyes", res))]
        }
    }
}

async fn load_history(client: &BackendClient, username: String) -> Vec<PanelEvent> {
    match client.message_history(&username).await {
        Ok(messages) => vec![PanelEvent::HistoryLoaded { username, messages }],
        Err(e) => {
            warn!("history for {username}: {e}");
            Vec::new()
        }
    }
}

fn announce(socket: &SocketHandle, username: &str) {
    if let Err(e) = socket.send(OutboundFrame::SelectUser(username.to_owned())) {
        warn!("announce {username}: {e}");
    }
}

/// Absent on failure; the caller treats that as "no update".
fn fetched<T>(what: &str, res: Result<T, BackendError>) -> Option<T> {
    res.map_err(|e| warn!("{what}: {e}")).ok()
}

fn outcome(what: &str, res: Result<ResultResponse, BackendError>) -> Outcome {
    match &res {
        Ok(resp) if !resp.is_successful() => {
            warn!("{what} rejected: {}", resp.message.as_deref().unwrap_or("no message"));
        }
        Err(e) => warn!("{what}: {e}"),
        Ok(_) => {}
    }
    res.into()
}
