use serde::{Deserialize, Serialize};

use crate::state::Permissions;

/// Fixed protocol version sent in the connect URL and every request frame.
pub const API_VERSION: &str = "2.0.0";

/// One frame received from the conferencing socket. Carries either a token
/// refresh or a meeting update; anything else is dropped upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerMessage {
    #[serde(rename = "tokenRefresh")]
    pub token_refresh: Option<String>,
    #[serde(rename = "meetingUpdate")]
    pub meeting_update: Option<MeetingUpdate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeetingUpdate {
    /// Absent state reads as all-false, matching the remote side's
    /// behavior of omitting the block outside meetings.
    #[serde(rename = "meetingState", default)]
    pub meeting_state: MeetingState,
    #[serde(rename = "meetingPermissions")]
    pub meeting_permissions: Option<MeetingPermissions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingState {
    pub is_in_meeting: bool,
    pub is_muted: bool,
    pub is_video_on: bool,
    pub is_recording_on: bool,
    pub is_sharing: bool,
    pub has_unread_messages: bool,
}

/// Wire shape of the permission block. Defaults are the conservative
/// posture: leaving is assumed possible, everything else is not.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingPermissions {
    #[serde(default)]
    pub can_toggle_mute: bool,
    #[serde(default)]
    pub can_toggle_video: bool,
    #[serde(default = "default_true")]
    pub can_leave: bool,
    #[serde(default)]
    pub can_stop_sharing: bool,
}

fn default_true() -> bool {
    true
}

impl From<MeetingPermissions> for Permissions {
    fn from(wire: MeetingPermissions) -> Self {
        Permissions {
            can_toggle_mute: wire.can_toggle_mute,
            can_toggle_video: wire.can_toggle_video,
            can_leave: wire.can_leave,
            can_stop_sharing: wire.can_stop_sharing,
        }
    }
}

/// An outbound protocol action before it is stamped with a request id.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub action: &'static str,
    pub parameters: Option<serde_json::Value>,
}

impl Command {
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            parameters: None,
        }
    }

    pub fn with_parameters(action: &'static str, parameters: serde_json::Value) -> Self {
        Self {
            action,
            parameters: Some(parameters),
        }
    }
}

/// The frame actually written to the socket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    pub request_id: u64,
    pub api_version: &'static str,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl ClientRequest {
    pub fn new(request_id: u64, command: Command) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            action: command.action,
            parameters: command.parameters,
        }
    }
}
