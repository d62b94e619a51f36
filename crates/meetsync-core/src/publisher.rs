use std::collections::BTreeSet;
use std::sync::Mutex;

use crate::discovery::{
    self, Identity, PAYLOAD_OFFLINE, PAYLOAD_ONLINE, STATE_OFF, STATE_ON,
};
use crate::entity::{ALL_ATTRIBUTES, Attribute};
use crate::errors::BridgeError;
use crate::ports::BrokerPort;
use crate::state::Transition;

/// Renders transitions and discovery records into the topic triad and
/// performs the broker publishes.
///
/// Tracks which command topics are subscribed and which availability
/// topics exist, so reconnect re-assertion and `disable_all_controls` stay
/// idempotent.
pub struct OutboundPublisher<P: BrokerPort> {
    port: P,
    identity: Identity,
    subscribed: Mutex<BTreeSet<String>>,
    availability: Mutex<BTreeSet<String>>,
}

impl<P: BrokerPort> OutboundPublisher<P> {
    pub fn new(port: P, identity: Identity) -> Self {
        Self {
            port,
            identity,
            subscribed: Mutex::new(BTreeSet::new()),
            availability: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Publishes one transition. The order is a contract — downstream
    /// consumers may treat topic arrival order as significant:
    /// liveness marker, sensor state, control state, control availability.
    pub fn publish_state(&self, transition: &Transition) -> Result<(), BridgeError> {
        let attribute = transition.attribute;
        let state = if transition.effective { STATE_ON } else { STATE_OFF };
        let availability = if transition.available {
            PAYLOAD_ONLINE
        } else {
            PAYLOAD_OFFLINE
        };

        self.publish(&self.identity.availability_topic(), PAYLOAD_ONLINE)?;
        self.publish(&self.identity.sensor_state_topic(attribute), state)?;
        self.publish(&self.identity.control_state_topic(attribute), state)?;
        self.publish(
            &self.identity.control_availability_topic(attribute),
            availability,
        )?;
        Ok(())
    }

    /// Announces (or refreshes) one attribute's discovery records.
    ///
    /// The sensor is always announced; the control only while
    /// `can_switch_off` holds. The attribute's availability topic and
    /// command topic are registered either way, matching the topic set the
    /// conferencing side can drive.
    pub fn publish_discovery(
        &self,
        attribute: Attribute,
        state: bool,
        can_switch_off: bool,
    ) -> Result<(), BridgeError> {
        let sensor = discovery::binary_sensor_config(&self.identity, attribute, state);
        self.publish(
            &self.identity.sensor_config_topic(attribute),
            &encode(&sensor)?,
        )?;

        if can_switch_off {
            let control = discovery::control_config(&self.identity, attribute, state);
            self.publish(
                &self.identity.control_config_topic(attribute),
                &encode(&control)?,
            )?;
        }

        self.availability
            .lock()
            .unwrap()
            .insert(self.identity.control_availability_topic(attribute));
        self.subscribe_command(&self.identity.command_topic(attribute))?;
        Ok(())
    }

    /// Full announce: the init-connection helper button plus every
    /// attribute with its registry-default control flags, ending with all
    /// controls offline. Run at startup and again on every conferencing
    /// reconnect.
    pub fn announce_all(&self) -> Result<(), BridgeError> {
        let button = discovery::init_button_config(&self.identity);
        self.publish(&self.identity.init_button_config_topic(), &encode(&button)?)?;
        self.subscribe_command(&self.identity.init_button_command_topic())?;

        for attribute in ALL_ATTRIBUTES {
            self.publish_discovery(attribute, false, attribute.default_can_switch_off())?;
        }

        self.disable_all_controls()
    }

    /// Marks every known control unavailable. Invoked when the session
    /// leaves a meeting and when the conferencing connection drops.
    pub fn disable_all_controls(&self) -> Result<(), BridgeError> {
        let topics: Vec<String> = self.availability.lock().unwrap().iter().cloned().collect();
        for topic in topics {
            self.publish(&topic, PAYLOAD_OFFLINE)?;
        }
        Ok(())
    }

    /// Re-asserts every command subscription after a broker reconnect.
    /// Unsubscribe-then-subscribe tolerates brokers that forget
    /// subscriptions across reconnects without ever double-subscribing.
    pub fn resubscribe_all(&self) -> Result<(), BridgeError> {
        let topics: Vec<String> = self.subscribed.lock().unwrap().iter().cloned().collect();
        for topic in topics {
            self.port.unsubscribe(&topic)?;
            self.port.subscribe(&topic)?;
        }
        Ok(())
    }

    /// Current command-topic subscriptions, in stable order.
    pub fn subscribed_topics(&self) -> Vec<String> {
        self.subscribed.lock().unwrap().iter().cloned().collect()
    }

    fn subscribe_command(&self, topic: &str) -> Result<(), BridgeError> {
        let newly_added = self.subscribed.lock().unwrap().insert(topic.to_string());
        if newly_added {
            self.port.subscribe(topic)?;
        }
        Ok(())
    }

    fn publish(&self, topic: &str, payload: impl AsRef<[u8]>) -> Result<(), BridgeError> {
        self.port.publish(topic, payload.as_ref(), false)
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, BridgeError> {
    serde_json::to_vec(value).map_err(|e| BridgeError::Payload(e.to_string()))
}
