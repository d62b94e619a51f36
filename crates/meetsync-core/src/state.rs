use crate::entity::{ALL_ATTRIBUTES, Attribute};

/// Meeting permissions as last reported by the remote side.
///
/// Overwritten wholesale on every update that carries a permission block;
/// the default posture assumes leaving is possible and nothing else is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub can_toggle_mute: bool,
    pub can_toggle_video: bool,
    pub can_leave: bool,
    pub can_stop_sharing: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            can_toggle_mute: false,
            can_toggle_video: false,
            can_leave: true,
            can_stop_sharing: false,
        }
    }
}

/// One genuine change of an attribute's effective value, with the control
/// flags and availability that were computed atomically with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub attribute: Attribute,
    pub effective: bool,
    pub can_switch_off: bool,
    pub can_switch_on: bool,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    raw: Option<bool>,
    effective: Option<bool>,
}

/// Canonical view of the tracked meeting state.
///
/// Values start unknown, so the first observed value always transitions,
/// even to `false`. Only the inbound translator mutates the store; the
/// command router issues protocol actions and waits for the change to come
/// back through the normal inbound path.
#[derive(Debug, Default)]
pub struct StateStore {
    slots: [Slot; ALL_ATTRIBUTES.len()],
    permissions: Permissions,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the permission set. Permissions are never diffed.
    pub fn set_permissions(&mut self, permissions: Permissions) {
        self.permissions = permissions;
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    /// Effective in-meeting flag; unknown counts as not in a meeting.
    pub fn in_meeting(&self) -> bool {
        self.slots[Attribute::InMeeting.index()].effective == Some(true)
    }

    pub fn effective(&self, attribute: Attribute) -> Option<bool> {
        self.slots[attribute.index()].effective
    }

    /// Applies a newly observed raw value.
    ///
    /// Returns no transition when the effective value is unchanged (repeated
    /// identical upstream messages never cause duplicate publishes). When
    /// the in-meeting flag flips to false, every other attribute is forced
    /// to its no-meeting effective value in one batch and a transition is
    /// appended for each one that actually changes.
    pub fn apply(&mut self, attribute: Attribute, raw: bool) -> Vec<Transition> {
        let mut transitions = Vec::new();
        let changed = self.store(attribute, raw);
        let left_meeting =
            attribute == Attribute::InMeeting && changed.as_ref().is_some_and(|t| !t.effective);
        transitions.extend(changed);

        if left_meeting {
            for secondary in ALL_ATTRIBUTES {
                if secondary == Attribute::InMeeting {
                    continue;
                }
                let raw = self.slots[secondary.index()].raw.unwrap_or(false);
                transitions.extend(self.store(secondary, raw));
            }
        }

        transitions
    }

    fn store(&mut self, attribute: Attribute, raw: bool) -> Option<Transition> {
        let effective = if attribute == Attribute::InMeeting {
            raw
        } else {
            raw && self.in_meeting()
        };

        let slot = &mut self.slots[attribute.index()];
        slot.raw = Some(raw);
        if slot.effective == Some(effective) {
            return None;
        }
        slot.effective = Some(effective);

        Some(self.transition(attribute, effective))
    }

    fn transition(&self, attribute: Attribute, effective: bool) -> Transition {
        let can_switch_off = attribute.can_switch_off(&self.permissions);
        let can_switch_on = attribute.can_switch_on();
        let mut available = self.in_meeting() && can_switch_off;
        if !can_switch_on {
            // A control that cannot switch the attribute back on is only
            // useful while the attribute is actually on.
            available = available && effective;
        }
        Transition {
            attribute,
            effective,
            can_switch_off,
            can_switch_on,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_meeting_permissions() -> Permissions {
        Permissions {
            can_toggle_mute: true,
            can_toggle_video: true,
            can_leave: true,
            can_stop_sharing: true,
        }
    }

    #[test]
    fn first_observation_always_transitions() {
        let mut store = StateStore::new();
        let transitions = store.apply(Attribute::InMeeting, true);
        assert_eq!(transitions.len(), 1);
        assert!(transitions[0].effective);
    }

    #[test]
    fn first_no_meeting_observation_settles_every_attribute() {
        let mut store = StateStore::new();
        // In-meeting arriving as false flips from unknown to false, so the
        // cascade reports the no-meeting value for every attribute at once.
        let transitions = store.apply(Attribute::InMeeting, false);
        assert_eq!(transitions.len(), ALL_ATTRIBUTES.len());
        assert!(transitions.iter().all(|t| !t.effective && !t.available));
    }

    #[test]
    fn repeated_value_is_idempotent() {
        let mut store = StateStore::new();
        assert_eq!(store.apply(Attribute::InMeeting, true).len(), 1);
        assert!(store.apply(Attribute::InMeeting, true).is_empty());
    }

    #[test]
    fn secondary_attribute_is_masked_outside_meetings() {
        let mut store = StateStore::new();
        store.apply(Attribute::InMeeting, false);
        // Raw true, but no meeting: the effective value stays false, so
        // nothing new is reported.
        assert!(store.apply(Attribute::Sharing, true).is_empty());
        assert_eq!(store.effective(Attribute::Sharing), Some(false));
    }

    #[test]
    fn leaving_a_meeting_cascades_to_secondary_attributes() {
        let mut store = StateStore::new();
        store.set_permissions(in_meeting_permissions());
        store.apply(Attribute::InMeeting, true);
        store.apply(Attribute::Sharing, true);
        assert_eq!(store.effective(Attribute::Sharing), Some(true));

        // The second message omits the sharing field entirely; the cascade
        // alone must force it down.
        let transitions = store.apply(Attribute::InMeeting, false);
        let sharing = transitions
            .iter()
            .find(|t| t.attribute == Attribute::Sharing)
            .expect("cascade transition for sharing");
        assert!(!sharing.effective);
        assert!(!sharing.available);
        assert_eq!(store.effective(Attribute::Sharing), Some(false));
    }

    #[test]
    fn cascade_does_not_repeat_for_settled_attributes() {
        let mut store = StateStore::new();
        store.apply(Attribute::InMeeting, true);
        for attribute in ALL_ATTRIBUTES {
            if attribute != Attribute::InMeeting {
                store.apply(attribute, false);
            }
        }
        // Everything secondary is already effectively false; only
        // in-meeting itself moves.
        let transitions = store.apply(Attribute::InMeeting, false);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].attribute, Attribute::InMeeting);
    }

    #[test]
    fn availability_requires_effective_value_for_momentary_controls() {
        let mut store = StateStore::new();
        store.set_permissions(in_meeting_permissions());
        store.apply(Attribute::InMeeting, true);

        let off = store.apply(Attribute::Sharing, false);
        assert!(!off[0].available, "no sharing to stop");

        let on = store.apply(Attribute::Sharing, true);
        assert!(on[0].available);
    }

    #[test]
    fn toggle_control_is_available_while_off() {
        let mut store = StateStore::new();
        store.set_permissions(in_meeting_permissions());
        store.apply(Attribute::InMeeting, true);

        // Muted (unmuted = false) but the switch can drive both directions.
        let transitions = store.apply(Attribute::Unmuted, false);
        assert!(!transitions[0].effective);
        assert!(transitions[0].available);
    }

    #[test]
    fn permissions_gate_availability() {
        let mut store = StateStore::new();
        store.apply(Attribute::InMeeting, true);
        // Default permissions: cannot stop sharing.
        let transitions = store.apply(Attribute::Sharing, true);
        assert!(transitions[0].effective);
        assert!(!transitions[0].can_switch_off);
        assert!(!transitions[0].available);
    }

    #[test]
    fn permission_overwrite_applies_to_later_transitions() {
        let mut store = StateStore::new();
        store.apply(Attribute::InMeeting, true);
        store.apply(Attribute::Sharing, true);

        store.set_permissions(in_meeting_permissions());
        // Value unchanged: still no transition, availability is only ever
        // republished alongside a genuine value change.
        assert!(store.apply(Attribute::Sharing, true).is_empty());

        let transitions = store.apply(Attribute::Sharing, false);
        assert!(transitions[0].can_switch_off);
    }

    #[test]
    fn in_meeting_availability_uses_leave_permission() {
        let mut store = StateStore::new();
        let transitions = store.apply(Attribute::InMeeting, true);
        // Default posture: canLeave = true.
        assert!(transitions[0].available);

        let mut no_leave = in_meeting_permissions();
        no_leave.can_leave = false;
        store.set_permissions(no_leave);
        let transitions = store.apply(Attribute::InMeeting, false);
        assert!(!transitions[0].available);
    }
}
