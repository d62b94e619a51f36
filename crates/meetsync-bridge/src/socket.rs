use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use meetsync_core::protocol::API_VERSION;
use meetsync_core::{
    BridgeError, BrokerPort, ClientRequest, Command, CommandSink, ConnectionState,
    CredentialStore, InboundTranslator, OutboundPublisher,
};

/// Fixed backoff between reconnect attempts; retried indefinitely.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Command sink handed to the router; frames are stamped with request ids
/// by the supervisor when they are actually written.
#[derive(Clone)]
pub struct SocketCommandSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl SocketCommandSender {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl CommandSink for SocketCommandSender {
    fn send_command(&self, command: Command) -> Result<(), BridgeError> {
        self.tx
            .send(command)
            .map_err(|e| BridgeError::Socket(format!("socket supervisor gone: {e}")))
    }
}

/// Identity advertised to the conferencing client in the connect URL.
pub struct SocketParams {
    pub endpoint: String,
    pub device: String,
    pub manufacturer: String,
    pub app: String,
    pub app_version: String,
}

pub fn build_url(params: &SocketParams, token: &str) -> String {
    format!(
        "{}?token={}&protocol-version={}&manufacturer={}&device={}&app={}&app-version={}",
        params.endpoint,
        urlencoding::encode(token),
        API_VERSION,
        urlencoding::encode(&params.manufacturer),
        urlencoding::encode(&params.device),
        urlencoding::encode(&params.app),
        urlencoding::encode(&params.app_version),
    )
}

/// Owns the conferencing websocket: reconnect loop, inbound dispatch into
/// the translator, and the outbound command writer.
pub struct SocketSupervisor<P: BrokerPort> {
    params: SocketParams,
    translator: Arc<InboundTranslator<P>>,
    publisher: Arc<OutboundPublisher<P>>,
    credentials: Arc<dyn CredentialStore>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl<P: BrokerPort> SocketSupervisor<P> {
    pub fn new(
        params: SocketParams,
        translator: Arc<InboundTranslator<P>>,
        publisher: Arc<OutboundPublisher<P>>,
        credentials: Arc<dyn CredentialStore>,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        Self {
            params,
            translator,
            publisher,
            credentials,
            commands,
        }
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        // Request ids are monotonic for the process lifetime, not per
        // connection.
        let mut request_id: u64 = 0;
        let mut attempt: u32 = 0;

        loop {
            let state = if attempt == 0 {
                ConnectionState::Connecting
            } else {
                ConnectionState::Reconnecting { attempt }
            };
            tracing::info!("conferencing socket {state:?}");

            // Re-read the token every attempt so a refresh received during
            // the previous session takes effect now.
            let token = self.credentials.get().unwrap_or_default();
            let url = build_url(&self.params, &token);

            match connect_async(url.as_str()).await {
                Ok((stream, _response)) => {
                    attempt = 0;
                    tracing::info!("conferencing socket connected");
                    // The remote pushes full state on connect. Re-announce
                    // discovery and keep controls down until it lands.
                    if let Err(e) = self.publisher.announce_all() {
                        tracing::warn!("discovery announce failed: {e}");
                    }

                    let (mut write, mut read) = stream.split();
                    loop {
                        tokio::select! {
                            _ = shutdown.changed() => {
                                let _ = write.close().await;
                                tracing::info!("socket supervisor stopped");
                                return;
                            }
                            command = self.commands.recv() => {
                                let Some(command) = command else {
                                    tracing::info!("command channel closed, stopping");
                                    return;
                                };
                                request_id += 1;
                                let frame = ClientRequest::new(request_id, command);
                                match serde_json::to_string(&frame) {
                                    Ok(text) => {
                                        if let Err(e) = write.send(Message::Text(text)).await {
                                            tracing::warn!("command write failed: {e}");
                                            break;
                                        }
                                    }
                                    Err(e) => tracing::warn!("unencodable frame: {e}"),
                                }
                            }
                            frame = read.next() => match frame {
                                Some(Ok(Message::Text(text))) => {
                                    self.translator.on_socket_message(&text);
                                }
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    tracing::warn!("socket error: {e}");
                                    break;
                                }
                                None => {
                                    tracing::info!("socket closed by peer");
                                    break;
                                }
                            }
                        }
                    }
                }
                Err(e) => tracing::warn!("socket connect failed: {e}"),
            }

            // The connection is gone: no control may stay available.
            if let Err(e) = self.publisher.disable_all_controls() {
                tracing::warn!("disabling controls failed: {e}");
            }

            attempt += 1;
            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("socket supervisor stopped");
                    return;
                }
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
            }
        }
    }
}
