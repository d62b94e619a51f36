use std::sync::{Arc, Mutex};

use crate::errors::BridgeError;
use crate::ports::{BrokerPort, CommandSink, CredentialStore};
use crate::protocol::Command;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PortEvent {
    Publish {
        topic: String,
        payload: String,
        retain: bool,
    },
    Subscribe(String),
    Unsubscribe(String),
}

/// Broker fake that records every call in order.
#[derive(Clone, Default)]
pub(crate) struct RecordingPort {
    events: Arc<Mutex<Vec<PortEvent>>>,
}

impl RecordingPort {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn events(&self) -> Vec<PortEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn published(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PortEvent::Publish { topic, payload, .. } => Some((topic, payload)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl BrokerPort for RecordingPort {
    fn publish(&self, topic: &str, payload: &[u8], retain: bool) -> Result<(), BridgeError> {
        self.events.lock().unwrap().push(PortEvent::Publish {
            topic: topic.to_string(),
            payload: String::from_utf8_lossy(payload).into_owned(),
            retain,
        });
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> Result<(), BridgeError> {
        self.events
            .lock()
            .unwrap()
            .push(PortEvent::Subscribe(topic.to_string()));
        Ok(())
    }

    fn unsubscribe(&self, topic: &str) -> Result<(), BridgeError> {
        self.events
            .lock()
            .unwrap()
            .push(PortEvent::Unsubscribe(topic.to_string()));
        Ok(())
    }
}

/// Command sink fake that records routed commands.
#[derive(Clone, Default)]
pub(crate) struct RecordingSink {
    commands: Arc<Mutex<Vec<Command>>>,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }
}

impl CommandSink for RecordingSink {
    fn send_command(&self, command: Command) -> Result<(), BridgeError> {
        self.commands.lock().unwrap().push(command);
        Ok(())
    }
}

/// In-memory credential store.
#[derive(Default)]
pub(crate) struct MemoryCredentials {
    token: Mutex<Option<String>>,
}

impl MemoryCredentials {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

impl CredentialStore for MemoryCredentials {
    fn get(&self) -> Option<String> {
        self.token()
    }

    fn set(&self, token: &str) {
        *self.token.lock().unwrap() = Some(token.to_string());
    }
}
