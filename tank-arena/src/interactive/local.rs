//! In-process interactive platform

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::{EventHub, EventSubscription, InteractiveEvent, InteractiveSource};
use crate::constants::GROUP_DEFAULT;
use crate::types::{Participant, ParticipantId};

#[derive(Debug, Default)]
struct LocalState {
    participants: BTreeMap<ParticipantId, Participant>,
    groups: HashMap<ParticipantId, String>,
    labels: HashMap<String, String>,
    disabled: HashSet<String>,
}

/// Interactive platform living in the same process
///
/// Used for local play (keyboard players injected as participants) and in
/// tests, where the recorded control, label and group state can be checked.
#[derive(Debug, Default)]
pub struct LocalInteractive {
    hub: EventHub,
    state: Mutex<LocalState>,
}

impl LocalInteractive {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Connect a participant; it starts in the default group
    pub fn connect(&self, participant: Participant) {
        {
            let mut state = self.lock();
            state.groups.insert(participant.id(), GROUP_DEFAULT.to_string());
            state.participants.insert(participant.id(), participant.clone());
        }
        self.hub.publish(InteractiveEvent::ParticipantJoined(participant));
    }

    pub fn disconnect(&self, participant: &Participant) {
        {
            let mut state = self.lock();
            state.participants.remove(&participant.id());
            state.groups.remove(&participant.id());
        }
        self.hub
            .publish(InteractiveEvent::ParticipantLeft(participant.clone()));
    }

    /// Button down followed by button up
    pub fn press(&self, control_id: &str, participant: &Participant) {
        self.button(control_id, participant, true);
        self.button(control_id, participant, false);
    }

    pub fn button(&self, control_id: &str, participant: &Participant, pressed: bool) {
        self.hub.publish(InteractiveEvent::Button {
            control_id: control_id.to_string(),
            participant: participant.clone(),
            pressed,
        });
    }

    pub fn joystick(&self, control_id: &str, participant: &Participant, x: f32, y: f32) {
        self.hub.publish(InteractiveEvent::Joystick {
            control_id: control_id.to_string(),
            participant: participant.clone(),
            x,
            y,
        });
    }

    pub fn group_of(&self, participant: ParticipantId) -> Option<String> {
        self.lock().groups.get(&participant).cloned()
    }

    pub fn label(&self, control_id: &str) -> Option<String> {
        self.lock().labels.get(control_id).cloned()
    }

    pub fn is_disabled(&self, control_id: &str) -> bool {
        self.lock().disabled.contains(control_id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }
}

impl InteractiveSource for LocalInteractive {
    fn subscribe(&self) -> EventSubscription {
        self.hub.subscribe()
    }

    fn set_control_disabled(&self, control_id: &str, disabled: bool) {
        let mut state = self.lock();
        if disabled {
            state.disabled.insert(control_id.to_string());
        } else {
            state.disabled.remove(control_id);
        }
    }

    fn set_label_text(&self, control_id: &str, text: &str) {
        self.lock()
            .labels
            .insert(control_id.to_string(), text.to_string());
    }

    fn assign_group(&self, participant: ParticipantId, group: &str) {
        let mut state = self.lock();
        if state.participants.contains_key(&participant) {
            state.groups.insert(participant, group.to_string());
        } else {
            tracing::debug!("Ignoring group '{}' for unknown participant {}", group, participant);
        }
    }

    fn participants(&self) -> Vec<Participant> {
        self.lock().participants.values().cloned().collect()
    }
}
