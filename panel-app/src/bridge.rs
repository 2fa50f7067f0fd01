/// Async/sync bridge between the backend task and the egui UI.
///
/// The UI thread owns `PanelState` and the reducer. This side owns the HTTP
/// client and the socket, runs `Command`s one at a time, and sends every
/// result back as a `PanelEvent` followed by a repaint request.
use std::sync::mpsc;

use tokio::{sync::mpsc as tokio_mpsc, time::MissedTickBehavior};
use tracing::{error, info};

use panel_core::{
    actions,
    socket::SocketHandle,
    BackendClient, Command, PanelConfig, PanelEvent,
};

// ── Entry point ───────────────────────────────────────────────────────────────

pub fn spawn_backend_task(
    config: PanelConfig,
    event_tx: mpsc::Sender<PanelEvent>,
    cmd_rx: tokio_mpsc::UnboundedReceiver<Command>,
    ctx: egui::Context,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                error!("tokio runtime: {e}");
                return;
            }
        };
        runtime.block_on(backend_task(config, event_tx, cmd_rx, ctx));
    });
}

// ── Backend task ──────────────────────────────────────────────────────────────

async fn backend_task(
    config: PanelConfig,
    event_tx: mpsc::Sender<PanelEvent>,
    mut cmd_rx: tokio_mpsc::UnboundedReceiver<Command>,
    ctx: egui::Context,
) {
    info!("backend {} / socket {}", config.api_url, config.ws_url);

    let client = match BackendClient::new(&config.api_url, config.request_timeout) {
        Ok(c) => c,
        Err(e) => {
            error!("backend client: {e}");
            return;
        }
    };

    // Socket lifecycle and frames.
    let (socket_tx, mut socket_rx) = tokio_mpsc::unbounded_channel();
    let socket = SocketHandle::spawn(config.ws_url.clone(), config.reconnect, socket_tx);
    {
        let tx = event_tx.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            while let Some(event) = socket_rx.recv().await {
                if !send(&tx, &ctx, PanelEvent::Socket(event)) {
                    break;
                }
            }
        });
    }

    // Roster poll. The first load comes from the socket connect.
    {
        let tx = event_tx.clone();
        let ctx = ctx.clone();
        let period = config.roster_poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !send(&tx, &ctx, PanelEvent::RosterTick) {
                    break;
                }
            }
        });
    }

    // ── Command handler ───────────────────────────────────────────────────────

    while let Some(cmd) = cmd_rx.recv().await {
        for event in actions::execute(&client, &socket, cmd).await {
            send(&event_tx, &ctx, event);
        }
    }

    info!("UI closed, stopping backend task");
    socket.shutdown();
}

/// Deliver `event` and wake the UI. False once the window is gone.
fn send(tx: &mpsc::Sender<PanelEvent>, ctx: &egui::Context, event: PanelEvent) -> bool {
    let delivered = tx.send(event).is_ok();
    ctx.request_repaint();
    delivered
}
