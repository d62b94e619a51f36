//! Meetsync daemon: bridges a local conferencing client's event socket to
//! an MQTT broker speaking the Home Assistant discovery convention.

mod broker;
mod config;
mod credentials;
mod socket;

use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use meetsync_core::{
    CommandRouter, CredentialStore, Identity, InboundTranslator, OutboundPublisher, StateStore,
};

use crate::config::{BridgeConfig, MANUFACTURER, SERVICE_NAME};
use crate::credentials::KeyringTokenStore;
use crate::socket::{SocketCommandSender, SocketParams, SocketSupervisor};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meetsync_core=info,meetsync=info".parse().unwrap()),
        )
        .init();

    let config_path =
        std::env::var("MEETSYNC_CONFIG").unwrap_or_else(|_| "meetsync.json".to_string());
    let config = BridgeConfig::load(Path::new(&config_path));

    let identity = Identity {
        discovery_prefix: config.discovery_prefix.clone(),
        device: config.device.clone(),
        bridge: SERVICE_NAME.to_string(),
        manufacturer: MANUFACTURER.to_string(),
        sw_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let credentials: Arc<dyn CredentialStore> =
        Arc::new(KeyringTokenStore::new(SERVICE_NAME, &config.user));
    if credentials.get().is_none() {
        tracing::warn!(
            "no stored session token; the conferencing client will ask for a fresh approval"
        );
    }

    let (broker_handle, eventloop) = broker::connect(&config, &identity);
    let publisher = Arc::new(OutboundPublisher::new(broker_handle, identity));
    let state = Arc::new(Mutex::new(StateStore::new()));

    let (sender, command_rx) = SocketCommandSender::new();
    let router = Arc::new(CommandRouter::new(sender));
    let translator = Arc::new(InboundTranslator::new(
        state,
        publisher.clone(),
        credentials.clone(),
    ));

    // Entities exist (controls offline) even before the first meeting
    // update arrives.
    if let Err(e) = publisher.announce_all() {
        tracing::warn!("initial discovery announce failed: {e}");
    }

    let supervisor = SocketSupervisor::new(
        SocketParams {
            endpoint: config.socket_endpoint(),
            device: config.device.clone(),
            manufacturer: MANUFACTURER.to_string(),
            app: SERVICE_NAME.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        translator,
        publisher.clone(),
        credentials,
        command_rx,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let broker_task = tokio::spawn(broker::run(
        eventloop,
        publisher,
        router,
        shutdown_rx.clone(),
    ));
    let socket_task = tokio::spawn(supervisor.run(shutdown_rx));

    shutdown_signal().await;
    tracing::info!("shutdown signal received, stopping supervisors");
    let _ = shutdown_tx.send(true);
    let _ = broker_task.await;
    let _ = socket_task.await;
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut terminate = signal(SignalKind::terminate()).unwrap();
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
