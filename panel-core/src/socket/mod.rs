// Connection manager for the backend's panel socket.
//
// One task owns the single WebSocket. Inbound text frames are decoded and
// forwarded, in arrival order, as `SocketEvent`s; on close the old stream is
// dropped and exactly one reconnect is scheduled per `ReconnectPolicy`.

pub mod frames;
pub mod reconnect;

use chrono::{DateTime, Local};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

pub use frames::{decode_frame, InboundPayload, OutboundFrame, PanelReply, VoiceEntry};
pub use reconnect::ReconnectPolicy;

type Stream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

// ── Public types ──────────────────────────────────────────────────────────────

/// Lifecycle and payload notifications from the connection task.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Connected,
    /// One successfully decoded frame.
    Payload {
        payload: InboundPayload,
        received_at: DateTime<Local>,
    },
    Disconnected { reason: String },
    /// A retry has been scheduled after `delay`.
    Reconnecting { attempt: u32, delay: std::time::Duration },
    /// The retry budget is spent; the task has ended.
    GaveUp { attempts: u32 },
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("socket task has stopped")]
    Stopped,
}

/// Owner handle for the connection task. Dropping it tears the task down.
pub struct SocketHandle {
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    task: JoinHandle<()>,
}

impl SocketHandle {
    /// Start the connection task on the current tokio runtime.
    pub fn spawn(
        url: impl Into<String>,
        policy: ReconnectPolicy,
        events: mpsc::UnboundedSender<SocketEvent>,
    ) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(url.into(), policy, outbound_rx, events));
        Self { outbound, task }
    }

    /// Queue a frame for the open connection. Frames queued while the socket
    /// is down are discarded before the next attempt.
    pub fn send(&self, frame: OutboundFrame) -> Result<(), SocketError> {
        self.outbound.send(frame).map_err(|_| SocketError::Stopped)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for SocketHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ── Connection task ───────────────────────────────────────────────────────────

enum PumpEnd {
    Closed(String),
    /// Nobody is listening any more, or the handle is gone.
    Finished,
}

async fn run(
    url: String,
    policy: ReconnectPolicy,
    mut outbound_rx: mpsc::UnboundedReceiver<OutboundFrame>,
    events: mpsc::UnboundedSender<SocketEvent>,
) {
    let mut failures: u32 = 0;

    loop {
        while let Ok(stale) = outbound_rx.try_recv() {
            debug!("dropping frame queued while disconnected: {stale:?}");
        }

        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                failures = 0;
                info!("socket connected to {url}");
                if events.send(SocketEvent::Connected).is_err() {
                    return;
                }
                match pump(stream, &mut outbound_rx, &events).await {
                    PumpEnd::Finished => return,
                    PumpEnd::Closed(reason) => {
                        info!("socket closed: {reason}");
                        if events.send(SocketEvent::Disconnected { reason }).is_err() {
                            return;
                        }
                    }
                }
            }
            Err(e) => warn!("socket connect {url}: {e}"),
        }

        failures = failures.saturating_add(1);
        let Some(delay) = policy.delay_for(failures) else {
            warn!("socket giving up after {} failed attempts", failures - 1);
            let _ = events.send(SocketEvent::GaveUp { attempts: failures - 1 });
            return;
        };
        debug!("socket retry {failures} in {delay:?}");
        if events
            .send(SocketEvent::Reconnecting { attempt: failures, delay })
            .is_err()
        {
            return;
        }
        tokio::time::sleep(delay).await;
    }
}

async fn pump(
    stream: Stream,
    outbound_rx: &mut mpsc::UnboundedReceiver<OutboundFrame>,
    events: &mpsc::UnboundedSender<SocketEvent>,
) -> PumpEnd {
    let (mut sink, mut stream) = stream.split();

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => match decode_frame(text.as_str()) {
                    Ok(payload) => {
                        let event = SocketEvent::Payload { payload, received_at: Local::now() };
                        if events.send(event).is_err() {
                            return PumpEnd::Finished;
                        }
                    }
                    Err(e) => warn!("dropping malformed frame: {e}"),
                },
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("{} {}", u16::from(f.code), f.reason.as_str()))
                        .unwrap_or_else(|| "closed by peer".into());
                    return PumpEnd::Closed(reason);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return PumpEnd::Closed(e.to_string()),
                None => return PumpEnd::Closed("stream ended".into()),
            },

            outgoing = outbound_rx.recv() => {
                let Some(frame) = outgoing else {
                    let _ = sink.close().await;
                    return PumpEnd::Finished;
                };
                let text = match serde_json::to_string(&frame) {
                    Ok(t) => t,
                    Err(e) => { warn!("encode {frame:?}: {e}"); continue; }
                };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    return PumpEnd::Closed(e.to_string());
                }
            }
        }
    }
}
