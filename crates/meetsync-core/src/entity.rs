use crate::state::Permissions;

/// Tracked meeting attributes, one Home Assistant entity pair each.
///
/// The set is closed: adding an attribute means touching every exhaustive
/// match below, which is the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    InMeeting,
    Unmuted,
    VideoOn,
    RecordingOn,
    Sharing,
    UnreadMessages,
}

/// All attributes in their canonical apply order (`InMeeting` first, so the
/// effective-value computation for the others sees the fresh meeting flag).
pub const ALL_ATTRIBUTES: [Attribute; 6] = [
    Attribute::InMeeting,
    Attribute::Unmuted,
    Attribute::VideoOn,
    Attribute::RecordingOn,
    Attribute::Sharing,
    Attribute::UnreadMessages,
];

/// How an attribute is surfaced as a Home Assistant control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Binary sensor only; no control discovery is ever announced.
    SensorOnly,
    /// Toggle switch, drivable in both directions.
    Toggle,
    /// Momentary button, fires the "off" direction only.
    Momentary,
}

impl Attribute {
    pub(crate) fn index(self) -> usize {
        match self {
            Attribute::InMeeting => 0,
            Attribute::Unmuted => 1,
            Attribute::VideoOn => 2,
            Attribute::RecordingOn => 3,
            Attribute::Sharing => 4,
            Attribute::UnreadMessages => 5,
        }
    }

    /// Entity name used in every topic path.
    pub fn slug(self) -> &'static str {
        match self {
            Attribute::InMeeting => "isinmeeting",
            Attribute::Unmuted => "isunmuted",
            Attribute::VideoOn => "isvideoon",
            Attribute::RecordingOn => "isrecordingon",
            Attribute::Sharing => "issharing",
            Attribute::UnreadMessages => "hasunreadmessages",
        }
    }

    /// Icon embedded in the discovery payload, picked by effective value.
    pub fn icon(self, on: bool) -> &'static str {
        match (self, on) {
            (Attribute::InMeeting, true) => "mdi:phone-in-talk",
            (Attribute::InMeeting, false) => "mdi:phone-off",
            (Attribute::Unmuted, true) => "mdi:microphone",
            (Attribute::Unmuted, false) => "mdi:microphone-off",
            (Attribute::VideoOn, true) => "mdi:webcam",
            (Attribute::VideoOn, false) => "mdi:webcam-off",
            (Attribute::RecordingOn, true) => "mdi:record-rec",
            (Attribute::RecordingOn, false) => "mdi:power-off",
            (Attribute::Sharing, true) => "mdi:projector-screen",
            (Attribute::Sharing, false) => "mdi:projector-screen-off",
            (Attribute::UnreadMessages, true) => "mdi:message-alert",
            (Attribute::UnreadMessages, false) => "mdi:message-off",
        }
    }

    pub fn sensor_label(self) -> &'static str {
        match self {
            Attribute::InMeeting => "Meeting in progress",
            Attribute::Unmuted => "Microphone unmuted",
            Attribute::VideoOn => "Video",
            Attribute::RecordingOn => "Recording",
            Attribute::Sharing => "Screen sharing",
            Attribute::UnreadMessages => "Unread messages",
        }
    }

    fn control_label(self) -> Option<&'static str> {
        match self {
            Attribute::InMeeting => Some("Exit meeting"),
            Attribute::VideoOn => Some("Stop video"),
            Attribute::Sharing => Some("Stop screen sharing"),
            _ => None,
        }
    }

    /// Label for the control entity. Momentary buttons name the action they
    /// fire; toggles keep the sensor label.
    pub fn control_display_label(self) -> &'static str {
        if !self.can_switch_on() {
            if let Some(label) = self.control_label() {
                return label;
            }
        }
        self.sensor_label()
    }

    pub fn kind(self) -> ControlKind {
        match self {
            Attribute::Unmuted => ControlKind::Toggle,
            Attribute::InMeeting | Attribute::VideoOn | Attribute::Sharing => {
                ControlKind::Momentary
            }
            Attribute::RecordingOn | Attribute::UnreadMessages => ControlKind::SensorOnly,
        }
    }

    /// Topic domain the control lives under. Sensor-only attributes still
    /// own a nominal button subtree (subscribed and availability-tracked,
    /// never announced).
    pub fn control_domain(self) -> &'static str {
        match self.kind() {
            ControlKind::Toggle => "switch",
            _ => "button",
        }
    }

    /// Whether the control can drive the attribute on remotely.
    pub fn can_switch_on(self) -> bool {
        self.kind() == ControlKind::Toggle
    }

    /// `can_switch_off` before any permissions have been observed, used for
    /// the startup discovery announce.
    pub fn default_can_switch_off(self) -> bool {
        self.kind() != ControlKind::SensorOnly
    }

    /// `can_switch_off` under the current permission set.
    pub fn can_switch_off(self, permissions: &Permissions) -> bool {
        match self {
            Attribute::InMeeting => permissions.can_leave,
            Attribute::Unmuted => permissions.can_toggle_mute,
            Attribute::VideoOn => permissions.can_toggle_video,
            Attribute::Sharing => permissions.can_stop_sharing,
            Attribute::RecordingOn | Attribute::UnreadMessages => false,
        }
    }
}
