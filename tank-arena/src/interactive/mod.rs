//! Interactive platform abstraction
//!
//! The platform pushes participant and control events; the game pushes back
//! control state, label text and group assignments. Implementations are
//! injected into the game as `Arc<dyn InteractiveSource>`.

mod hub;
mod local;

pub use hub::{EventHub, EventSubscription};
pub use local::LocalInteractive;

use crate::types::{Participant, ParticipantId};

/// Events delivered by the interactive platform
#[derive(Debug, Clone, PartialEq)]
pub enum InteractiveEvent {
    /// A participant connected to the stream's interactive session
    ParticipantJoined(Participant),
    /// A participant disconnected
    ParticipantLeft(Participant),
    /// A button control went down or up
    Button {
        control_id: String,
        participant: Participant,
        pressed: bool,
    },
    /// A joystick control moved
    Joystick {
        control_id: String,
        participant: Participant,
        x: f32,
        y: f32,
    },
}

impl InteractiveEvent {
    /// Participant the event originates from
    pub fn participant(&self) -> &Participant {
        match self {
            InteractiveEvent::ParticipantJoined(participant)
            | InteractiveEvent::ParticipantLeft(participant) => participant,
            InteractiveEvent::Button { participant, .. }
            | InteractiveEvent::Joystick { participant, .. } => participant,
        }
    }
}

/// Event source and control surface of the interactive platform
pub trait InteractiveSource: Send + Sync {
    /// Register for events; dropping the subscription unregisters it
    fn subscribe(&self) -> EventSubscription;

    fn set_control_disabled(&self, control_id: &str, disabled: bool);

    fn set_label_text(&self, control_id: &str, text: &str);

    fn assign_group(&self, participant: ParticipantId, group: &str);

    /// Participants currently connected
    fn participants(&self) -> Vec<Participant>;
}
