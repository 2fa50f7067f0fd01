use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

use eframe::egui;
use tokio::sync::mpsc as tokio_mpsc;
use tracing::warn;

use panel_core::{
    prefs::{PreferenceStore, BACKGROUND_COUNT},
    reduce,
    state::{AsrMode, LiveState, Message, PanelState},
    Command, Effect, Notification, NotificationLevel, PanelEvent,
};

const TOAST_TTL: Duration = Duration::from_secs(3);

/// Transcript backdrop per background slot.
const BACKGROUND_TINTS: [egui::Color32; BACKGROUND_COUNT] = [
    egui::Color32::from_rgb(24, 28, 36),
    egui::Color32::from_rgb(20, 34, 44),
    egui::Color32::from_rgb(36, 26, 40),
    egui::Color32::from_rgb(22, 36, 28),
];

struct Toast {
    note: Notification,
    shown_at: Instant,
}

pub struct PanelApp {
    event_rx: mpsc::Receiver<PanelEvent>,
    cmd_tx: tokio_mpsc::UnboundedSender<Command>,
    store: Option<PreferenceStore>,

    state: PanelState,
    toasts: Vec<Toast>,
    input: String,
    scroll_to_bottom: bool,
}

impl PanelApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        event_rx: mpsc::Receiver<PanelEvent>,
        cmd_tx: tokio_mpsc::UnboundedSender<Command>,
        store: Option<PreferenceStore>,
    ) -> Self {
        let preferences = store.as_ref().map(PreferenceStore::load).unwrap_or_default();
        let mut app = Self {
            event_rx,
            cmd_tx,
            store,
            state: PanelState::with_preferences(preferences),
            toasts: Vec::new(),
            input: String::new(),
            scroll_to_bottom: false,
        };
        app.dispatch(PanelEvent::Startup);
        app
    }

    /// Run one event through the reducer and carry out its effects.
    fn dispatch(&mut self, event: PanelEvent) {
        for effect in reduce(&mut self.state, event) {
            match effect {
                Effect::Dispatch(cmd) => {
                    if matches!(cmd, Command::SendMessage { .. }) {
                        self.input.clear();
                    }
                    if self.cmd_tx.send(cmd).is_err() {
                        warn!("backend task has stopped");
                    }
                }
                Effect::ScrollToBottom => self.scroll_to_bottom = true,
                Effect::Notify(note) => self.toasts.push(Toast { note, shown_at: Instant::now() }),
                Effect::SavePreferences(prefs) => {
                    if let Some(store) = &self.store {
                        if let Err(e) = store.save(&prefs) {
                            warn!("saving preferences: {e}");
                        }
                    }
                }
            }
        }
    }

    // ── Panels ────────────────────────────────────────────────────────────────

    fn status_bar(&self, ctx: &egui::Context, intents: &mut Vec<PanelEvent>) {
        let state = &self.state;
        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if ui.button("Users").on_hover_text("Toggle user list").clicked() {
                    intents.push(PanelEvent::ToggleSidebar);
                }
                ui.heading("Fay");
                ui.separator();

                ui.label(format!("Service: {}", state.live_state.label()));
                let start = ui.add_enabled(
                    state.live_state == LiveState::Stopped,
                    egui::Button::new("Start"),
                );
                if start.clicked() {
                    intents.push(PanelEvent::StartLiveRequested);
                }
                let stop = ui.add_enabled(
                    state.live_state == LiveState::Live,
                    egui::Button::new("Stop"),
                );
                if stop.clicked() {
                    intents.push(PanelEvent::StopLiveRequested);
                }
                ui.separator();

                let mut record = state.config.record_enabled;
                let record_box = egui::Checkbox::new(&mut record, "Microphone");
                if ui.add_enabled(state.config_editable, record_box).changed() {
                    intents.push(PanelEvent::ToggleRecord);
                }
                let mut sound = state.config.play_sound_enabled;
                let sound_box = egui::Checkbox::new(&mut sound, "Speaker");
                if ui.add_enabled(state.config_editable, sound_box).changed() {
                    intents.push(PanelEvent::ToggleSound);
                }
                ui.separator();

                let asr = state.asr_mode.map(AsrMode::as_str).unwrap_or("?");
                if ui.button(format!("ASR: {asr}")).clicked() {
                    intents.push(PanelEvent::ToggleAsrMode);
                }
                let voice = state.preferences.voice_mode.label();
                if ui.button(format!("Voice: {voice}")).clicked() {
                    intents.push(PanelEvent::CycleVoiceMode);
                }
                let background = ui
                    .button("Background")
                    .on_hover_text(state.preferences.background_image());
                if background.clicked() {
                    intents.push(PanelEvent::CycleBackground);
                }
                if ui.button("Eyes on").clicked() {
                    intents.push(PanelEvent::ControlEyesRequested(true));
                }
                if ui.button("Eyes off").clicked() {
                    intents.push(PanelEvent::ControlEyesRequested(false));
                }
            });

            ui.horizontal(|ui| {
                indicator(ui, "socket", state.socket_connected);
                indicator(ui, "backend", state.backend_connected);
                indicator(ui, "remote audio", state.remote_audio_connected);
                if let Some(robot) = &state.robot {
                    ui.separator();
                    ui.small(format!("Avatar: {robot}"));
                }
                if !state.panel_msg.is_empty() {
                    ui.separator();
                    ui.label(&state.panel_msg);
                }
            });
            ui.add_space(4.0);
        });
    }

    fn roster_panel(&self, ctx: &egui::Context, intents: &mut Vec<PanelEvent>) {
        let state = &self.state;
        egui::SidePanel::left("roster")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.strong("Users");
                ui.separator();

                for user in &state.roster {
                    let selected = state.selected_user.as_ref() == Some(user);
                    if ui.selectable_label(selected, &user.name).clicked() && !selected {
                        intents.push(PanelEvent::SelectUser(user.clone()));
                    }
                }

                ui.add_space(12.0);
                ui.collapsing("Voices", |ui| {
                    for voice in &state.voice_options {
                        ui.small(&voice.label).on_hover_text(&voice.value);
                    }
                });
                ui.collapsing("Audio devices", |ui| {
                    for device in &state.device_options {
                        ui.small(&device.label);
                    }
                });
            });
    }

    fn input_bar(&mut self, ctx: &egui::Context, intents: &mut Vec<PanelEvent>) {
        egui::TopBottomPanel::bottom("input").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let input_field = egui::TextEdit::singleline(&mut self.input)
                    .hint_text("Message…")
                    .desired_width(ui.available_width() - 160.0);

                let response = ui.add(input_field);
                let send = ui.button("Send");
                let submitted = send.clicked()
                    || (response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)));
                if submitted {
                    intents.push(PanelEvent::SendRequested(self.input.clone()));
                    response.request_focus();
                }
                if ui.button("Clear history").clicked() {
                    intents.push(PanelEvent::ClearHistoryRequested);
                }
            });
            ui.add_space(6.0);
        });
    }

    fn transcript(&mut self, ctx: &egui::Context) {
        let tint = BACKGROUND_TINTS[self.state.preferences.background_index % BACKGROUND_COUNT];
        let frame = egui::Frame::default().fill(tint).inner_margin(8.0);
        let scroll = std::mem::take(&mut self.scroll_to_bottom);
        let state = &self.state;

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            ui.heading(state.selected_name().unwrap_or("—"));
            if !state.panel_reply.is_empty() {
                ui.small(&state.panel_reply);
            }
            ui.separator();

            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for message in &state.messages {
                        message_row(ui, message);
                    }
                    if scroll {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
        });
    }

    fn toasts(&mut self, ctx: &egui::Context) {
        self.toasts.retain(|t| t.shown_at.elapsed() < TOAST_TTL);
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -56.0])
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    let color = match toast.note.level {
                        NotificationLevel::Success => egui::Color32::LIGHT_GREEN,
                        NotificationLevel::Error => egui::Color32::LIGHT_RED,
                    };
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.colored_label(color, &toast.note.message);
                    });
                }
            });
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

impl eframe::App for PanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Drain everything the backend task produced since the last frame.
        while let Ok(event) = self.event_rx.try_recv() {
            self.dispatch(event);
        }

        let mut intents = Vec::new();
        self.status_bar(ctx, &mut intents);
        if self.state.preferences.sidebar_visible {
            self.roster_panel(ctx, &mut intents);
        }
        self.input_bar(ctx, &mut intents);
        self.transcript(ctx);
        self.toasts(ctx);

        for intent in intents {
            self.dispatch(intent);
        }
    }
}

fn indicator(ui: &mut egui::Ui, name: &str, on: bool) {
    let color = if on { egui::Color32::GREEN } else { egui::Color32::DARK_GRAY };
    ui.colored_label(color, "●");
    ui.small(name);
}

fn message_row(ui: &mut egui::Ui, message: &Message) {
    let from_avatar = message.kind == "fay";
    let who = if from_avatar { "Fay" } else { message.username.as_str() };
    ui.horizontal_wrapped(|ui| {
        ui.strong(who);
        ui.small(&message.timetext);
        if message.adopted {
            ui.small("✓ adopted");
        }
    });
    ui.label(&message.content);
    ui.add_space(6.0);
}
