// View-state reducer.
//
// `reduce` is a total function over (state, event): it mutates the state
// container in place and returns the effects the host must run. It performs
// no I/O, so every transition is testable without a window or a backend.

#[cfg(test)]
#[path = "reducer_tests.rs"]
mod tests;

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::{
    event::{Command, Effect, Notification, Outcome, PanelEvent},
    prefs::VoiceMode,
    socket::{InboundPayload, PanelReply, SocketEvent, VoiceEntry},
    state::{AsrMode, LiveState, Message, PanelState, SelectOption, UserEntry},
};

/// Format of `Message::timetext` for replies stamped locally.
pub const TIMETEXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn reduce(state: &mut PanelState, event: PanelEvent) -> Vec<Effect> {
    let mut fx = Vec::new();

    match event {
        PanelEvent::Socket(socket_event) => on_socket(state, socket_event, &mut fx),

        PanelEvent::Startup => {
            fx.push(Effect::Dispatch(Command::RefreshData));
            fx.push(Effect::Dispatch(Command::LoadAsrMode));
            fx.push(Effect::Dispatch(Command::LoadVoiceList));
            fx.push(Effect::Dispatch(Command::LoadDeviceList));
        }
        PanelEvent::RosterTick => fx.push(Effect::Dispatch(Command::LoadRoster)),

        // ── Snapshots ─────────────────────────────────────────────────────────
        PanelEvent::RunStatusLoaded(running) => {
            set_live_state(state, if running { LiveState::Live } else { LiveState::Stopped });
        }
        PanelEvent::ConfigLoaded { record_enabled, play_sound_enabled } => {
            if let Some(v) = record_enabled {
                state.config.record_enabled = v;
            }
            if let Some(v) = play_sound_enabled {
                state.config.play_sound_enabled = v;
            }
        }
        PanelEvent::RosterLoaded(users) => on_roster(state, users, &mut fx),
        PanelEvent::HistoryLoaded { username, messages } => {
            if state.is_selected(&username) {
                state.messages = messages;
                fx.push(Effect::ScrollToBottom);
            } else {
                debug!("ignoring stale history for {username}");
            }
        }
        PanelEvent::VoiceListLoaded(voices) => state.voice_options = voice_options(voices),
        PanelEvent::DeviceListLoaded(devices) => state.device_options = device_options(devices),
        PanelEvent::AsrModeLoaded(mode) => state.asr_mode = mode,

        PanelEvent::SelectUser(user) => select_user(state, user, &mut fx),

        // ── Session lifecycle ─────────────────────────────────────────────────
        PanelEvent::StartLiveRequested => {
            state.live_state = LiveState::Starting;
            fx.push(Effect::Dispatch(Command::StartLive));
        }
        PanelEvent::LiveStarted(outcome) => {
            if outcome.is_success() {
                fx.push(Effect::Notify(Notification::success("Service started")));
                fx.push(Effect::Dispatch(Command::RefreshData));
            } else {
                if state.live_state == LiveState::Starting {
                    state.live_state = LiveState::Stopped;
                }
                let text = outcome.failure_text("Failed to start the service");
                fx.push(Effect::Notify(Notification::error(text)));
            }
        }
        PanelEvent::StopLiveRequested => fx.push(Effect::Dispatch(Command::StopLive)),
        PanelEvent::LiveStopped(outcome) => {
            if outcome.is_success() {
                state.live_state = LiveState::Stopping;
                fx.push(Effect::Notify(Notification::success("Service stopped")));
                fx.push(Effect::Dispatch(Command::RefreshData));
            } else {
                let text = outcome.failure_text("Failed to stop the service");
                fx.push(Effect::Notify(Notification::error(text)));
            }
        }

        // ── Chat ──────────────────────────────────────────────────────────────
        PanelEvent::SendRequested(text) => on_send(state, text, &mut fx),
        PanelEvent::MessageSent(outcome) => {
            if !outcome.is_success() {
                let text = outcome.failure_text("Failed to send the message");
                fx.push(Effect::Notify(Notification::error(text)));
            }
        }

        PanelEvent::ClearHistoryRequested => match state.selected_name() {
            Some(name) => fx.push(Effect::Dispatch(Command::ClearHistory {
                username: name.to_owned(),
            })),
            None => fx.push(Effect::Notify(Notification::error("Select a user first"))),
        },
        PanelEvent::HistoryCleared { username, outcome } => {
            if outcome.is_success() && state.is_selected(&username) {
                state.messages.clear();
                fx.push(Effect::Notify(Notification::success("Chat history cleared")));
            } else if outcome.is_success() {
                debug!("history of {username} cleared after the selection moved on");
            } else {
                let text = outcome.failure_text("Failed to clear chat history");
                fx.push(Effect::Notify(Notification::error(text)));
            }
        }

        // ── Backend configuration ─────────────────────────────────────────────
        PanelEvent::ToggleRecord => {
            state.config.record_enabled = !state.config.record_enabled;
            fx.push(Effect::Dispatch(Command::SubmitConfig(state.config)));
        }
        PanelEvent::ToggleSound => {
            state.config.play_sound_enabled = !state.config.play_sound_enabled;
            fx.push(Effect::Dispatch(Command::SubmitConfig(state.config)));
        }
        PanelEvent::ConfigSubmitted(outcome) => {
            let note = if outcome.is_success() {
                Notification::success("Configuration saved")
            } else {
                Notification::error(outcome.failure_text("Failed to save configuration"))
            };
            fx.push(Effect::Notify(note));
        }

        PanelEvent::ToggleAsrMode => {
            let next = AsrMode::toggled(state.asr_mode);
            fx.push(Effect::Dispatch(Command::ChangeAsrMode(next)));
        }
        PanelEvent::AsrModeChanged { mode, outcome } => {
            if outcome.is_success() {
                state.asr_mode = Some(mode);
                let text = format!("ASR engine switched to {}", mode.as_str());
                fx.push(Effect::Notify(Notification::success(text)));
            } else {
                let text = outcome.failure_text("Failed to switch ASR engine");
                fx.push(Effect::Notify(Notification::error(text)));
            }
        }

        PanelEvent::ControlEyesRequested(on) => {
            fx.push(Effect::Dispatch(Command::ControlEyes(on)));
        }
        PanelEvent::EyesControlled(outcome) => {
            if let Outcome::Failed(reason) = outcome {
                warn!("eye control failed: {}", reason.unwrap_or_default());
            }
        }

        // ── Local preferences ─────────────────────────────────────────────────
        PanelEvent::ToggleSidebar => {
            state.preferences.sidebar_visible = !state.preferences.sidebar_visible;
            fx.push(Effect::SavePreferences(state.preferences));
        }
        PanelEvent::CycleBackground => {
            state.preferences.next_background();
            fx.push(Effect::SavePreferences(state.preferences));
            fx.push(Effect::Notify(Notification::success("Background changed")));
        }
        PanelEvent::CycleVoiceMode => {
            state.preferences.voice_mode = state.preferences.voice_mode.next();
            fx.push(Effect::SavePreferences(state.preferences));
            fx.push(Effect::Dispatch(Command::ChangeVoiceMode(
                state.preferences.voice_mode,
            )));
        }
        PanelEvent::VoiceModeChanged { mode, outcome } => {
            fx.push(Effect::Notify(voice_mode_note(mode, &outcome)));
        }
    }

    fx
}

// ── Socket ────────────────────────────────────────────────────────────────────

fn on_socket(state: &mut PanelState, event: SocketEvent, fx: &mut Vec<Effect>) {
    match event {
        SocketEvent::Connected => {
            state.socket_connected = true;
            fx.push(Effect::Dispatch(Command::LoadRoster));
            if let Some(name) = state.selected_name() {
                fx.push(Effect::Dispatch(Command::AnnounceUser {
                    username: name.to_owned(),
                }));
            }
        }
        SocketEvent::Payload { payload, received_at } => {
            apply_payload(state, payload, received_at, fx);
        }
        SocketEvent::Disconnected { .. } => state.socket_connected = false,
        SocketEvent::Reconnecting { .. } => {}
        SocketEvent::GaveUp { attempts } => {
            state.socket_connected = false;
            let text = format!("Lost connection to the backend after {attempts} retries");
            fx.push(Effect::Notify(Notification::error(text)));
        }
    }
}

/// Applies one inbound frame. Each present field is handled independently.
pub fn apply_payload(
    state: &mut PanelState,
    payload: InboundPayload,
    received_at: DateTime<Local>,
    fx: &mut Vec<Effect>,
) {
    if let Some(raw) = payload.live_state {
        match LiveState::from_wire(raw) {
            Some(live) => set_live_state(state, live),
            None => warn!("unknown liveState {raw}"),
        }
    }
    if let Some(voices) = payload.voice_list {
        state.voice_options = voice_options(voices);
    }
    if let Some(devices) = payload.device_list {
        state.device_options = device_options(devices);
    }
    if let Some(msg) = payload.panel_msg {
        state.panel_msg = msg;
    }
    if let Some(robot) = payload.robot.filter(|r| !r.is_empty()) {
        state.robot = Some(robot);
    }
    if let Some(reply) = payload.panel_reply {
        apply_reply(state, reply, received_at, fx);
    }
    if let Some(connected) = payload.is_connect {
        state.backend_connected = connected;
    }
    if let Some(connected) = payload.remote_audio_connect {
        state.remote_audio_connected = connected;
    }
}

fn apply_reply(
    state: &mut PanelState,
    reply: PanelReply,
    received_at: DateTime<Local>,
    fx: &mut Vec<Effect>,
) {
    state.panel_reply = reply.content.clone();

    // Roster identity is the display name, not the id.
    if !state.roster_has_name(&reply.username) {
        let id = reply.uid.unwrap_or_default();
        state.roster.push(UserEntry::new(id, reply.username.clone()));
    }

    if state.is_selected(&reply.username) {
        state.messages.push(Message {
            id: reply.id,
            username: reply.username,
            content: reply.content,
            kind: reply.kind,
            timetext: received_at.format(TIMETEXT_FORMAT).to_string(),
            adopted: reply.is_adopted,
        });
        fx.push(Effect::ScrollToBottom);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn set_live_state(state: &mut PanelState, live: LiveState) {
    state.live_state = live;
    match live {
        LiveState::Live => state.config_editable = false,
        LiveState::Stopped => state.config_editable = true,
        LiveState::Starting | LiveState::Stopping => {}
    }
}

fn on_roster(state: &mut PanelState, users: Vec<UserEntry>, fx: &mut Vec<Effect>) {
    if users.is_empty() {
        let placeholder = UserEntry::placeholder();
        if !state.roster.contains(&placeholder) {
            state.roster.push(placeholder.clone());
        }
        if state.selected_user.is_none() {
            select_user(state, placeholder, fx);
        }
        return;
    }

    state.roster = users;
    let still_present = state
        .selected_user
        .as_ref()
        .is_some_and(|sel| state.roster.contains(sel));
    if !still_present {
        let first = state.roster[0].clone();
        select_user(state, first, fx);
    }
}

fn select_user(state: &mut PanelState, user: UserEntry, fx: &mut Vec<Effect>) {
    let username = user.name.clone();
    state.selected_user = Some(user);
    fx.push(Effect::Dispatch(Command::SelectUser { username }));
}

fn on_send(state: &mut PanelState, text: String, fx: &mut Vec<Effect>) {
    if text.trim().is_empty() {
        fx.push(Effect::Notify(Notification::error("Enter a message first")));
        return;
    }
    let Some(username) = state.selected_name().map(str::to_owned) else {
        fx.push(Effect::Notify(Notification::error("Select a user first")));
        return;
    };
    if state.live_state != LiveState::Live {
        fx.push(Effect::Notify(Notification::error("Start the service first")));
        return;
    }
    fx.push(Effect::Dispatch(Command::SendMessage { username, text }));
    fx.push(Effect::ScrollToBottom);
}

fn voice_options(voices: Vec<VoiceEntry>) -> Vec<SelectOption> {
    voices
        .into_iter()
        .map(|v| SelectOption { value: v.id, label: v.name })
        .collect()
}

fn device_options(devices: Vec<String>) -> Vec<SelectOption> {
    devices
        .into_iter()
        .map(|d| SelectOption { value: d.clone(), label: d })
        .collect()
}

fn voice_mode_note(mode: VoiceMode, outcome: &Outcome) -> Notification {
    if outcome.is_success() {
        Notification::success(format!("Switched to {}", mode.label()))
    } else {
        Notification::error(outcome.failure_text("Failed to switch voice mode"))
    }
}
