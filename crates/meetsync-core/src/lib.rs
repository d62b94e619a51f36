//! Meetsync core bridge logic.
//!
//! Pure Rust crate with no transport dependencies.
//! The meetsync-bridge daemon wires it to a live MQTT broker and a local
//! conferencing websocket through the `ports` traits.

pub mod commands;
pub mod connection;
pub mod discovery;
pub mod entity;
pub mod errors;
pub mod ports;
pub mod protocol;
pub mod publisher;
pub mod state;
pub mod translator;

#[cfg(test)]
pub(crate) mod test_support;

pub use commands::CommandRouter;
pub use connection::ConnectionState;
pub use discovery::Identity;
pub use entity::{Attribute, ControlKind};
pub use errors::BridgeError;
pub use ports::{BrokerPort, CommandSink, CredentialStore};
pub use protocol::{ClientRequest, Command};
pub use publisher::OutboundPublisher;
pub use state::{Permissions, StateStore, Transition};
pub use translator::InboundTranslator;
