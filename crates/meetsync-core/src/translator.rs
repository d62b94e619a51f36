use std::sync::{Arc, Mutex};

use crate::entity::Attribute;
use crate::ports::{BrokerPort, CredentialStore};
use crate::protocol::ServerMessage;
use crate::publisher::OutboundPublisher;
use crate::state::{StateStore, Transition};

/// Consumes frames from the conferencing socket, updates the state store
/// and hands every genuine transition to the publisher.
///
/// This is the only writer of the state store. Errors never escape the
/// callback: a bad frame is logged and dropped.
pub struct InboundTranslator<P: BrokerPort> {
    state: Arc<Mutex<StateStore>>,
    publisher: Arc<OutboundPublisher<P>>,
    credentials: Arc<dyn CredentialStore>,
}

impl<P: BrokerPort> InboundTranslator<P> {
    pub fn new(
        state: Arc<Mutex<StateStore>>,
        publisher: Arc<OutboundPublisher<P>>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            state,
            publisher,
            credentials,
        }
    }

    pub fn on_socket_message(&self, text: &str) {
        let message: ServerMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("dropping malformed frame: {e}");
                return;
            }
        };

        if let Some(token) = message.token_refresh {
            tracing::info!("token refresh received");
            self.credentials.set(&token);
            return;
        }

        let Some(update) = message.meeting_update else {
            return;
        };

        // Apply the whole update under one lock so availability is never
        // computed against a half-applied state.
        let (transitions, in_meeting) = {
            let mut state = self.state.lock().unwrap();
            if let Some(permissions) = update.meeting_permissions {
                state.set_permissions(permissions.into());
            }

            let meeting = update.meeting_state;
            let mut transitions: Vec<Transition> = Vec::new();
            transitions.extend(state.apply(Attribute::InMeeting, meeting.is_in_meeting));
            transitions.extend(state.apply(Attribute::Unmuted, !meeting.is_muted));
            transitions.extend(state.apply(Attribute::VideoOn, meeting.is_video_on));
            transitions.extend(state.apply(Attribute::RecordingOn, meeting.is_recording_on));
            transitions.extend(state.apply(Attribute::Sharing, meeting.is_sharing));
            transitions.extend(state.apply(Attribute::UnreadMessages, meeting.has_unread_messages));
            (transitions, state.in_meeting())
        };

        for transition in &transitions {
            tracing::debug!(
                "{} -> {} (available: {})",
                transition.attribute.slug(),
                transition.effective,
                transition.available
            );
            if let Err(e) = self.publisher.publish_state(transition) {
                tracing::warn!("state publish failed: {e}");
            }
            // Icon selection lives in the discovery payload, so a value
            // flip refreshes discovery too.
            if let Err(e) = self.publisher.publish_discovery(
                transition.attribute,
                transition.effective,
                transition.can_switch_off,
            ) {
                tracing::warn!("discovery publish failed: {e}");
            }
        }

        if !in_meeting {
            // Belt and braces beyond the cascade: never leave a control
            // available while out of a meeting.
            if let Err(e) = self.publisher.disable_all_controls() {
                tracing::warn!("disabling controls failed: {e}");
            }
        }
    }
}
