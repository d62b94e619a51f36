/// Lifecycle of one supervised transport connection.
///
/// Both supervisors walk `Disconnected → Connecting → Connected` and fall
/// back to `Disconnected` on error or close; the socket supervisor counts
/// retries through `Reconnecting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}
