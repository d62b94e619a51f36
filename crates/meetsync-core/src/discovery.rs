use serde::Serialize;

use crate::entity::Attribute;

pub const PAYLOAD_ONLINE: &str = "online";
pub const PAYLOAD_OFFLINE: &str = "offline";
pub const STATE_ON: &str = "ON";
pub const STATE_OFF: &str = "OFF";

/// Entity slug for the connection-approval helper button.
pub const INIT_CONNECTION_SLUG: &str = "init-connection";

/// Device identity and topic layout shared by every publish.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Discovery root, normally `homeassistant`.
    pub discovery_prefix: String,
    /// Host the conferencing client runs on.
    pub device: String,
    /// Bridge service name.
    pub bridge: String,
    pub manufacturer: String,
    pub sw_version: String,
}

impl Identity {
    /// Topic path segment naming this bridge instance.
    pub fn node(&self) -> String {
        format!("{}-{}", self.device, self.bridge)
    }

    fn base_unique_id(&self, slug: &str) -> String {
        format!("{}-{}-{}", self.device, self.bridge, slug)
    }

    /// Bridge liveness topic; doubles as the sensors' availability topic
    /// and the broker Last-Will target.
    pub fn availability_topic(&self) -> String {
        format!("{}/binary_sensor/{}", self.discovery_prefix, self.node())
    }

    pub fn sensor_state_topic(&self, attribute: Attribute) -> String {
        format!(
            "{}/binary_sensor/{}/{}/state",
            self.discovery_prefix,
            self.node(),
            attribute.slug()
        )
    }

    pub fn sensor_config_topic(&self, attribute: Attribute) -> String {
        format!(
            "{}/binary_sensor/{}/{}/config",
            self.discovery_prefix,
            self.node(),
            attribute.slug()
        )
    }

    fn control_topic(&self, attribute: Attribute, leaf: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.discovery_prefix,
            attribute.control_domain(),
            self.node(),
            attribute.slug(),
            leaf
        )
    }

    pub fn control_state_topic(&self, attribute: Attribute) -> String {
        self.control_topic(attribute, "state")
    }

    pub fn control_config_topic(&self, attribute: Attribute) -> String {
        self.control_topic(attribute, "config")
    }

    pub fn control_availability_topic(&self, attribute: Attribute) -> String {
        self.control_topic(attribute, "availability")
    }

    pub fn command_topic(&self, attribute: Attribute) -> String {
        self.control_topic(attribute, "cmnd")
    }

    pub fn init_button_config_topic(&self) -> String {
        format!(
            "{}/button/{}/{}/config",
            self.discovery_prefix,
            self.node(),
            INIT_CONNECTION_SLUG
        )
    }

    pub fn init_button_command_topic(&self) -> String {
        format!(
            "{}/button/{}/{}/cmnd",
            self.discovery_prefix,
            self.node(),
            INIT_CONNECTION_SLUG
        )
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            identifiers: vec![format!("{}-{}", self.bridge, self.device)],
            manufacturer: self.manufacturer.clone(),
            model: self.bridge.clone(),
            name: format!("{} meeting status", self.device),
            sw_version: self.sw_version.clone(),
        }
    }
}

/// Device registry block embedded in every discovery payload so Home
/// Assistant groups the entities under one device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<String>,
    pub manufacturer: String,
    pub model: String,
    pub name: String,
    pub sw_version: String,
}

#[derive(Debug, Serialize)]
pub struct BinarySensorConfig {
    pub icon: String,
    pub unique_id: String,
    pub object_id: String,
    pub default_entity_id: String,
    pub availability_topic: String,
    pub device: DeviceInfo,
    pub name: String,
    pub state_topic: String,
}

#[derive(Debug, Serialize)]
pub struct ControlConfig {
    pub icon: String,
    pub unique_id: String,
    pub object_id: String,
    pub default_entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_topic: Option<String>,
    pub device: DeviceInfo,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_topic: Option<String>,
    pub command_topic: String,
    pub optimistic: bool,
}

/// Announcement payload for an attribute's binary sensor. The icon is
/// baked in here, so a value flip implies a discovery refresh.
pub fn binary_sensor_config(
    identity: &Identity,
    attribute: Attribute,
    state: bool,
) -> BinarySensorConfig {
    let unique_id = format!("{}-binary_sensor", identity.base_unique_id(attribute.slug()));
    BinarySensorConfig {
        icon: attribute.icon(state).to_string(),
        object_id: unique_id.clone(),
        default_entity_id: format!("binary_sensor.{}", identity.base_unique_id(attribute.slug())),
        unique_id,
        availability_topic: identity.availability_topic(),
        device: identity.device_info(),
        name: attribute.sensor_label().to_string(),
        state_topic: identity.sensor_state_topic(attribute),
    }
}

/// Announcement payload for an attribute's switch or button.
pub fn control_config(identity: &Identity, attribute: Attribute, state: bool) -> ControlConfig {
    let domain = attribute.control_domain();
    let unique_id = format!("{}-{}", identity.base_unique_id(attribute.slug()), domain);
    ControlConfig {
        icon: attribute.icon(state).to_string(),
        object_id: unique_id.clone(),
        default_entity_id: format!("{}.{}", domain, identity.base_unique_id(attribute.slug())),
        unique_id,
        availability_topic: Some(identity.control_availability_topic(attribute)),
        device: identity.device_info(),
        name: attribute.control_display_label().to_string(),
        state_topic: Some(identity.control_state_topic(attribute)),
        command_topic: identity.command_topic(attribute),
        optimistic: false,
    }
}

/// Announcement payload for the connection-approval helper button. No
/// state or availability: it is always pressable.
pub fn init_button_config(identity: &Identity) -> ControlConfig {
    let unique_id = identity.base_unique_id(INIT_CONNECTION_SLUG);
    ControlConfig {
        icon: "mdi:button-pointer".to_string(),
        object_id: unique_id.clone(),
        default_entity_id: format!("button.{unique_id}"),
        unique_id,
        availability_topic: None,
        device: identity.device_info(),
        name: "Init Connection".to_string(),
        state_topic: None,
        command_topic: identity.init_button_command_topic(),
        optimistic: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            discovery_prefix: "homeassistant".to_string(),
            device: "workpad".to_string(),
            bridge: "meetsync".to_string(),
            manufacturer: "Meetsync".to_string(),
            sw_version: "0.1.0".to_string(),
        }
    }

    #[test]
    fn topic_layout_matches_the_discovery_convention() {
        let id = identity();
        assert_eq!(
            id.availability_topic(),
            "homeassistant/binary_sensor/workpad-meetsync"
        );
        assert_eq!(
            id.sensor_state_topic(Attribute::InMeeting),
            "homeassistant/binary_sensor/workpad-meetsync/isinmeeting/state"
        );
        assert_eq!(
            id.command_topic(Attribute::Unmuted),
            "homeassistant/switch/workpad-meetsync/isunmuted/cmnd"
        );
        assert_eq!(
            id.command_topic(Attribute::Sharing),
            "homeassistant/button/workpad-meetsync/issharing/cmnd"
        );
    }

    #[test]
    fn sensor_config_embeds_icon_by_state() {
        let id = identity();
        let on = binary_sensor_config(&id, Attribute::InMeeting, true);
        assert_eq!(on.icon, "mdi:phone-in-talk");
        let off = binary_sensor_config(&id, Attribute::InMeeting, false);
        assert_eq!(off.icon, "mdi:phone-off");
        assert_eq!(off.unique_id, "workpad-meetsync-isinmeeting-binary_sensor");
        assert_eq!(
            off.default_entity_id,
            "binary_sensor.workpad-meetsync-isinmeeting"
        );
    }

    #[test]
    fn control_config_points_at_the_command_topic() {
        let id = identity();
        let config = control_config(&id, Attribute::Unmuted, false);
        assert_eq!(config.unique_id, "workpad-meetsync-isunmuted-switch");
        assert_eq!(
            config.command_topic,
            "homeassistant/switch/workpad-meetsync/isunmuted/cmnd"
        );
        assert_eq!(config.name, "Microphone unmuted");
        assert!(!config.optimistic);
    }

    #[test]
    fn init_button_has_no_state_or_availability() {
        let id = identity();
        let config = init_button_config(&id);
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("availability_topic"));
        assert!(!json.contains("state_topic"));
        assert!(json.contains(r#""command_topic":"homeassistant/button/workpad-meetsync/init-connection/cmnd""#));
    }

    #[test]
    fn device_block_is_shared_across_entities() {
        let id = identity();
        let sensor = binary_sensor_config(&id, Attribute::VideoOn, false);
        let control = control_config(&id, Attribute::VideoOn, false);
        assert_eq!(sensor.device.identifiers, control.device.identifiers);
        assert_eq!(sensor.device.identifiers, vec!["meetsync-workpad".to_string()]);
    }
}
