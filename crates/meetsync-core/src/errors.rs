use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("broker error: {0}")]
    Broker(String),
    #[error("socket error: {0}")]
    Socket(String),
    #[error("payload error: {0}")]
    Payload(String),
    #[error("credential error: {0}")]
    Credential(String),
}
