//! Participant side of the Zenoh interactive platform

use zenoh::handlers::FifoChannelHandler;
use zenoh::key_expr::KeyExpr;
use zenoh::liveliness::LivelinessToken;
use zenoh::pubsub::{Publisher, Subscriber};
use zenoh::sample::Sample;

use super::keyexpr::{display_keyexpr, ControlKeyexpr, ParticipantChannel, ParticipantChannelKeyexpr, ParticipantKeyexpr};
use super::message::ControlUpdate;
use crate::error::{Result, TankError};
use crate::ports::ControlInput;
use crate::types::Participant;

/// Something the host told this participant
#[derive(Debug, Clone, PartialEq)]
pub enum HostUpdate {
    /// The participant was moved to a group
    Group(String),
    /// A control changed
    Control {
        control_id: String,
        update: ControlUpdate,
    },
    /// New text on the host's message display
    Display(String),
}

/// A participant connected to a Zenoh arena
///
/// Holds the liveliness token announcing the participant; dropping the
/// client makes the host see a disconnect.
pub struct ParticipantClient {
    participant: Participant,
    _token: LivelinessToken,
    buttons: Publisher<'static>,
    group: Subscriber<FifoChannelHandler<Sample>>,
    controls: Subscriber<FifoChannelHandler<Sample>>,
    display: Subscriber<FifoChannelHandler<Sample>>,
}

impl std::fmt::Debug for ParticipantClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticipantClient")
            .field("participant", &self.participant)
            .field("key_expr", &self.buttons.key_expr())
            .finish()
    }
}

impl ParticipantClient {
    /// Join the arena under `prefix`
    ///
    /// Subscriptions are declared before the liveliness token, so the state
    /// the host sends on arrival is not missed.
    pub async fn join(
        session: &zenoh::Session,
        prefix: &KeyExpr<'_>,
        participant: Participant,
    ) -> Result<Self> {
        let group_keyexpr: KeyExpr = ParticipantChannelKeyexpr::new(
            prefix,
            ParticipantChannel::Group,
            Some(participant.id()),
        )
        .try_into()?;
        let group = session.declare_subscriber(group_keyexpr).await?;

        let controls_keyexpr: KeyExpr = ControlKeyexpr::new(prefix, None).try_into()?;
        let controls = session.declare_subscriber(controls_keyexpr).await?;
        let display = session.declare_subscriber(display_keyexpr(prefix)?).await?;

        let buttons_keyexpr: KeyExpr = ParticipantChannelKeyexpr::new(
            prefix,
            ParticipantChannel::Button,
            Some(participant.id()),
        )
        .try_into()?;
        let buttons = session.declare_publisher(buttons_keyexpr).await?;

        let token_keyexpr: KeyExpr = ParticipantKeyexpr::new(prefix, participant.clone()).try_into()?;
        let token = session.liveliness().declare_token(token_keyexpr).await?;

        tracing::info!("Participant {} joined arena '{}'", participant, prefix);

        Ok(Self {
            participant,
            _token: token,
            buttons,
            group,
            controls,
            display,
        })
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    /// Publish one control input
    pub async fn send(&self, input: &ControlInput) -> Result<()> {
        self.buttons.put(zenoh_ext::z_serialize(input)).await?;
        Ok(())
    }

    pub async fn button(&self, control_id: &str, pressed: bool) -> Result<()> {
        self.send(&ControlInput::Button {
            control_id: control_id.to_string(),
            pressed,
        })
        .await
    }

    /// Button down followed by button up
    pub async fn press(&self, control_id: &str) -> Result<()> {
        self.button(control_id, true).await?;
        self.button(control_id, false).await
    }

    pub async fn joystick(&self, control_id: &str, x: f32, y: f32) -> Result<()> {
        self.send(&ControlInput::Joystick {
            control_id: control_id.to_string(),
            x,
            y,
        })
        .await
    }

    /// Wait for the next update from the host
    pub async fn recv(&self) -> Result<HostUpdate> {
        tokio::select! {
            sample = self.group.recv_async() => {
                let sample = sample.map_err(receive_error)?;
                Ok(HostUpdate::Group(decode(&sample)?))
            }
            sample = self.controls.recv_async() => {
                let sample = sample.map_err(receive_error)?;
                let keyexpr = ControlKeyexpr::try_from(sample.key_expr().clone())?;
                let control_id = keyexpr.control_id().ok_or_else(|| {
                    TankError::InvalidKeyexpr(format!("Control update on wildcard '{}'", sample.key_expr()))
                })?;
                Ok(HostUpdate::Control {
                    control_id: control_id.to_string(),
                    update: decode(&sample)?,
                })
            }
            sample = self.display.recv_async() => {
                let sample = sample.map_err(receive_error)?;
                Ok(HostUpdate::Display(decode(&sample)?))
            }
        }
    }
}

fn receive_error(e: impl std::fmt::Display) -> TankError {
    TankError::Internal(format!("Failed to receive sample: {}", e))
}

fn decode<T: zenoh_ext::Deserialize>(sample: &Sample) -> Result<T> {
    zenoh_ext::z_deserialize(sample.payload())
        .map_err(|e| TankError::Serialization(format!("Failed to deserialize: {:?}", e)))
}
