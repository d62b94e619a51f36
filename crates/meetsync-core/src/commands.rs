use std::time::Duration;

use serde_json::json;

use crate::discovery::INIT_CONNECTION_SLUG;
use crate::ports::CommandSink;
use crate::protocol::Command;

const INIT_CONNECTION_DELAY: Duration = Duration::from_secs(1);

/// The least intrusive action that still triggers the remote side's
/// one-time connection-approval prompt.
fn approval_probe() -> Command {
    Command::with_parameters("toggle-ui", json!({"type": "chat"}))
}

/// Closed routing map from `{entity}` (buttons) or `{entity}/{payload}`
/// (switches) to the outbound protocol action.
fn resolve(key: &str) -> Option<Command> {
    match key {
        "init-connection" => Some(approval_probe()),
        "isinmeeting" => Some(Command::new("leave-call")),
        "isunmuted/on" => Some(Command::new("unmute")),
        "isunmuted/off" => Some(Command::new("mute")),
        "isvideoon/on" => Some(Command::new("show-video")),
        "isvideoon/off" | "isvideoon" => Some(Command::new("hide-video")),
        "issharing" => Some(Command::new("stop-sharing")),
        _ => None,
    }
}

/// Splits a command topic into (domain, entity).
///
/// Expected shape: `{prefix}/{button|switch}/{node}/{entity}/cmnd`. Any
/// other shape is foreign broker traffic, not an error.
fn parse_command_topic(topic: &str) -> Option<(&str, &str)> {
    let mut parts = topic.split('/');
    let _prefix = parts.next()?;
    let domain = parts.next()?;
    let _node = parts.next()?;
    let entity = parts.next()?;
    let leaf = parts.next()?;
    if parts.next().is_some() || leaf != "cmnd" {
        return None;
    }
    matches!(domain, "button" | "switch").then_some((domain, entity))
}

/// Maps inbound broker messages to outbound conferencing commands.
///
/// Never writes meeting state: the effect of a routed command comes back
/// through the normal inbound path.
pub struct CommandRouter<S> {
    sink: S,
}

impl<S> CommandRouter<S>
where
    S: CommandSink + Clone + Send + 'static,
{
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn on_broker_message(&self, topic: &str, payload: &[u8]) {
        let Some((domain, entity)) = parse_command_topic(topic) else {
            tracing::debug!("ignoring non-command topic {topic}");
            return;
        };

        let key = match domain {
            "switch" => format!(
                "{entity}/{}",
                String::from_utf8_lossy(payload).trim().to_lowercase()
            ),
            _ => entity.to_string(),
        };

        let Some(command) = resolve(&key) else {
            tracing::debug!("no command mapped for {key}");
            return;
        };

        tracing::info!("routing {key} -> {}", command.action);
        if let Err(e) = self.sink.send_command(command) {
            tracing::warn!("command send failed: {e}");
        }

        if key == INIT_CONNECTION_SLUG {
            // The approval prompt needs a second nudge once the socket is
            // up; run it off the callback path so other broker messages
            // keep flowing.
            let sink = self.sink.clone();
            tokio::spawn(async move {
                tokio::time::sleep(INIT_CONNECTION_DELAY).await;
                if let Err(e) = sink.send_command(approval_probe()) {
                    tracing::warn!("delayed approval probe failed: {e}");
                }
            });
        }
    }
}
