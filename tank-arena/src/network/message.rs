//! Payloads exchanged between the host and participants

use zenoh_ext::{Deserialize, Serialize, ZDeserializeError, ZDeserializer, ZSerializer};

use crate::ports::ControlInput;

// Control input published by a participant: tag, control id, values
impl Serialize for ControlInput {
    fn serialize(&self, serializer: &mut ZSerializer) {
        match self {
            ControlInput::Button {
                control_id,
                pressed,
            } => {
                0u8.serialize(serializer);
                control_id.serialize(serializer);
                pressed.serialize(serializer);
            }
            ControlInput::Joystick { control_id, x, y } => {
                1u8.serialize(serializer);
                control_id.serialize(serializer);
                x.serialize(serializer);
                y.serialize(serializer);
            }
        }
    }
}

impl Deserialize for ControlInput {
    fn deserialize(deserializer: &mut ZDeserializer) -> Result<Self, ZDeserializeError> {
        let tag = u8::deserialize(deserializer)?;
        let control_id = String::deserialize(deserializer)?;
        match tag {
            0 => Ok(ControlInput::Button {
                control_id,
                pressed: bool::deserialize(deserializer)?,
            }),
            1 => Ok(ControlInput::Joystick {
                control_id,
                x: f32::deserialize(deserializer)?,
                y: f32::deserialize(deserializer)?,
            }),
            _ => Err(ZDeserializeError),
        }
    }
}

/// Change to one control, published by the host
#[derive(Debug, Clone, PartialEq)]
pub enum ControlUpdate {
    Disabled(bool),
    Label(String),
}

impl Serialize for ControlUpdate {
    fn serialize(&self, serializer: &mut ZSerializer) {
        match self {
            ControlUpdate::Disabled(disabled) => {
                0u8.serialize(serializer);
                disabled.serialize(serializer);
            }
            ControlUpdate::Label(text) => {
                1u8.serialize(serializer);
                text.serialize(serializer);
            }
        }
    }
}

impl Deserialize for ControlUpdate {
    fn deserialize(deserializer: &mut ZDeserializer) -> Result<Self, ZDeserializeError> {
        match u8::deserialize(deserializer)? {
            0 => Ok(ControlUpdate::Disabled(bool::deserialize(deserializer)?)),
            1 => Ok(ControlUpdate::Label(String::deserialize(deserializer)?)),
            _ => Err(ZDeserializeError),
        }
    }
}
