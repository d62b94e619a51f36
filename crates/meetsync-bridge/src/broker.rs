use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Packet, QoS};
use tokio::sync::watch;

use meetsync_core::discovery::PAYLOAD_OFFLINE;
use meetsync_core::{
    BridgeError, BrokerPort, CommandRouter, CommandSink, ConnectionState, Identity,
    OutboundPublisher,
};

use crate::config::BridgeConfig;

const POLL_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Enqueue-only adapter from the core's broker port to the rumqttc client.
/// Delivery and retry stay in the client's event loop.
#[derive(Clone)]
pub struct BrokerHandle {
    client: AsyncClient,
}

impl BrokerHandle {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }
}

impl BrokerPort for BrokerHandle {
    fn publish(&self, topic: &str, payload: &[u8], retain: bool) -> Result<(), BridgeError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, retain, payload.to_vec())
            .map_err(|e| BridgeError::Broker(e.to_string()))
    }

    fn subscribe(&self, topic: &str) -> Result<(), BridgeError> {
        self.client
            .try_subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| BridgeError::Broker(e.to_string()))
    }

    fn unsubscribe(&self, topic: &str) -> Result<(), BridgeError> {
        self.client
            .try_unsubscribe(topic)
            .map_err(|e| BridgeError::Broker(e.to_string()))
    }
}

/// Builds the broker client. The Last-Will flips the bridge liveness topic
/// to offline if the process dies without a clean disconnect.
pub fn connect(config: &BridgeConfig, identity: &Identity) -> (BrokerHandle, EventLoop) {
    let mut options = MqttOptions::new(
        config.mqtt_client_id(),
        config.mqtt_host.clone(),
        config.mqtt_port,
    );
    options.set_keep_alive(Duration::from_secs(60));
    if let Some(username) = &config.mqtt_username {
        options.set_credentials(
            username.clone(),
            config.mqtt_password.clone().unwrap_or_default(),
        );
    }
    options.set_last_will(LastWill::new(
        identity.availability_topic(),
        PAYLOAD_OFFLINE.as_bytes().to_vec(),
        QoS::AtLeastOnce,
        true,
    ));

    let (client, eventloop) = AsyncClient::new(options, 64);
    (BrokerHandle::new(client), eventloop)
}

/// Drives the rumqttc event loop until shutdown.
///
/// Reconnection is the client's own machinery: polling again after an error
/// starts a fresh connect cycle. Every ConnAck re-asserts the command
/// subscriptions, tolerant of brokers that forget them across reconnects.
pub async fn run<S>(
    mut eventloop: EventLoop,
    publisher: Arc<OutboundPublisher<BrokerHandle>>,
    router: Arc<CommandRouter<S>>,
    mut shutdown: watch::Receiver<bool>,
) where
    S: CommandSink + Clone + Send + 'static,
{
    let mut state = ConnectionState::Connecting;
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            event = eventloop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!("broker connected, re-asserting subscriptions");
                    state = ConnectionState::Connected;
                    if let Err(e) = publisher.resubscribe_all() {
                        tracing::warn!("resubscription failed: {e}");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    router.on_broker_message(&publish.topic, &publish.payload);
                }
                Ok(_) => {}
                Err(e) => {
                    if state.is_connected() {
                        tracing::warn!("broker connection lost: {e}");
                    } else {
                        tracing::warn!("broker unreachable: {e}");
                    }
                    state = ConnectionState::Disconnected;
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    state = ConnectionState::Connecting;
                }
            }
        }
    }
    tracing::info!("broker supervisor stopped");
}
