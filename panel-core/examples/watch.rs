//! Headless smoke check against a running backend.
//!
//! Fetches the run status and member list, then prints every panel socket
//! event until interrupted.
//!
//! Run from the workspace root:
//!   cargo run -p panel-core --example watch
//!
//! Env vars (all optional, shown with defaults):
//!   FAY_API_URL  http://127.0.0.1:5000
//!   FAY_WS_URL   ws://127.0.0.1:10003
//!   RUST_LOG     panel_core=debug,reqwest=warn

use anyhow::Context;
use panel_core::{
    socket::{SocketEvent, SocketHandle},
    BackendClient, PanelConfig,
};
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "panel_core=debug,reqwest=warn".into()),
        )
        .init();

    let config = PanelConfig::from_env();
    let client = BackendClient::new(&config.api_url, config.request_timeout)?;

    let running = client.run_status().await.context("run status")?;
    info!("service running: {running}");
    for user in client.member_list().await.context("member list")? {
        info!("member {} {}", user.id, user.name);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _socket = SocketHandle::spawn(config.ws_url.clone(), config.reconnect, tx);

    info!("watching {} (Ctrl-C to quit)", config.ws_url);
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(SocketEvent::Payload { payload, received_at }) => {
                    println!("{} {payload:?}", received_at.format("%H:%M:%S"));
                }
                Some(SocketEvent::GaveUp { attempts }) => {
                    anyhow::bail!("gave up after {attempts} attempts");
                }
                Some(other) => println!("{other:?}"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
