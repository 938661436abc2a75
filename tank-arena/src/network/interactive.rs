//! Host side of the Zenoh interactive platform

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use zenoh::key_expr::KeyExpr;
use zenoh::sample::SampleKind;

use super::keyexpr::{ControlKeyexpr, ParticipantChannel, ParticipantChannelKeyexpr, ParticipantKeyexpr};
use super::message::ControlUpdate;
use crate::error::{Result, TankError};
use crate::interactive::{EventHub, EventSubscription, InteractiveEvent, InteractiveSource};
use crate::ports::ControlInput;
use crate::types::{Participant, ParticipantId};

/// Update waiting to be published by the outgoing task
#[derive(Debug)]
enum Outgoing {
    Group(ParticipantId, String),
    Control(String, ControlUpdate),
    /// Republish every known control state (a participant just arrived)
    SyncControls,
}

#[derive(Debug, Default)]
struct ControlState {
    disabled: bool,
    label: Option<String>,
}

#[derive(Debug, Default)]
struct HostState {
    participants: BTreeMap<ParticipantId, Participant>,
    controls: HashMap<String, ControlState>,
}

type SharedState = Arc<Mutex<HostState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, HostState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Interactive platform whose participants are remote Zenoh nodes
///
/// Participants announce themselves with a liveliness token and publish
/// their control input; the host publishes group assignments, control state
/// and display text back. Received samples are decoded by background tasks
/// and fanned out to subscriptions; updates from the game are queued and
/// published by another task, so no trait method ever blocks.
pub struct ZenohInteractive {
    prefix: KeyExpr<'static>,
    hub: EventHub,
    state: SharedState,
    outgoing: flume::Sender<Outgoing>,
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

impl std::fmt::Debug for ZenohInteractive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZenohInteractive")
            .field("prefix", &self.prefix)
            .field("participants", &lock(&self.state).participants.len())
            .finish()
    }
}

impl ZenohInteractive {
    /// Start listening for participants of the arena under `prefix`
    pub async fn new(session: &zenoh::Session, prefix: KeyExpr<'static>) -> Result<Self> {
        let hub = EventHub::new();
        let state = SharedState::default();
        let (outgoing, outgoing_rx) = flume::unbounded();

        let liveliness = session
            .liveliness()
            .declare_subscriber(ParticipantKeyexpr::lookup(&prefix)?)
            .history(true)
            .await?;
        let buttons_keyexpr: KeyExpr =
            ParticipantChannelKeyexpr::new(&prefix, ParticipantChannel::Button, None).try_into()?;
        let buttons = session.declare_subscriber(buttons_keyexpr).await?;

        tracing::info!("Interactive host listening on '{}'", prefix);

        let tasks = vec![
            tokio::spawn(Self::watch_participants(
                liveliness,
                hub.clone(),
                state.clone(),
                outgoing.clone(),
            )),
            tokio::spawn(Self::receive_buttons(buttons, hub.clone(), state.clone())),
            tokio::spawn(Self::publish_updates(
                session.clone(),
                prefix.clone(),
                state.clone(),
                outgoing_rx,
            )),
        ];

        Ok(Self {
            prefix,
            hub,
            state,
            outgoing,
            tasks,
        })
    }

    pub fn prefix(&self) -> &KeyExpr<'static> {
        &self.prefix
    }

    async fn watch_participants(
        liveliness: zenoh::pubsub::Subscriber<zenoh::handlers::FifoChannelHandler<zenoh::sample::Sample>>,
        hub: EventHub,
        state: SharedState,
        outgoing: flume::Sender<Outgoing>,
    ) {
        while let Ok(sample) = liveliness.recv_async().await {
            let participant = match ParticipantKeyexpr::try_from(sample.key_expr().clone()) {
                Ok(keyexpr) => keyexpr.participant().clone(),
                Err(e) => {
                    tracing::warn!("Ignoring liveliness token: {}", e);
                    continue;
                }
            };
            if sample.kind() == SampleKind::Delete {
                tracing::info!("Participant {} disconnected", participant);
                lock(&state).participants.remove(&participant.id());
                hub.publish(InteractiveEvent::ParticipantLeft(participant));
            } else {
                tracing::info!("Participant {} connected", participant);
                lock(&state)
                    .participants
                    .insert(participant.id(), participant.clone());
                let _ = outgoing.send(Outgoing::SyncControls);
                hub.publish(InteractiveEvent::ParticipantJoined(participant));
            }
        }
        tracing::debug!("Participant liveliness subscriber closed");
    }

    async fn receive_buttons(
        buttons: zenoh::pubsub::Subscriber<zenoh::handlers::FifoChannelHandler<zenoh::sample::Sample>>,
        hub: EventHub,
        state: SharedState,
    ) {
        while let Ok(sample) = buttons.recv_async().await {
            match Self::decode_input(&sample, &state) {
                Ok(event) => {
                    hub.publish(event);
                }
                Err(e) => tracing::warn!("Dropping control input: {}", e),
            }
        }
        tracing::debug!("Button subscriber closed");
    }

    /// Turn a sample on `<prefix>/button/<id>` into an event of participant `<id>`
    ///
    /// The sender is identified by the key expression alone and only has to
    /// match a participant whose liveliness token is currently alive. Any
    /// node on the arena prefix can therefore publish on behalf of another
    /// participant; access control belongs to the Zenoh deployment (ACLs on
    /// the `button/<id>` keys), not to this transport.
    fn decode_input(sample: &zenoh::sample::Sample, state: &SharedState) -> Result<InteractiveEvent> {
        let keyexpr = ParticipantChannelKeyexpr::parse(sample.key_expr(), ParticipantChannel::Button)?;
        let id = keyexpr.participant().ok_or_else(|| {
            TankError::InvalidKeyexpr(format!("Input without participant id on '{}'", sample.key_expr()))
        })?;
        let participant = lock(state)
            .participants
            .get(&id)
            .cloned()
            .ok_or_else(|| TankError::Internal(format!("Input from unknown participant {}", id)))?;
        let input: ControlInput = zenoh_ext::z_deserialize(sample.payload())
            .map_err(|e| TankError::Serialization(format!("Failed to deserialize input: {:?}", e)))?;

        Ok(match input {
            ControlInput::Button {
                control_id,
                pressed,
            } => InteractiveEvent::Button {
                control_id,
                participant,
                pressed,
            },
            ControlInput::Joystick { control_id, x, y } => InteractiveEvent::Joystick {
                control_id,
                participant,
                x,
                y,
            },
        })
    }

    async fn publish_updates(
        session: zenoh::Session,
        prefix: KeyExpr<'static>,
        state: SharedState,
        outgoing: flume::Receiver<Outgoing>,
    ) {
        while let Ok(update) = outgoing.recv_async().await {
            let puts: Vec<(Result<KeyExpr<'static>>, zenoh::bytes::ZBytes)> = match update {
                Outgoing::Group(participant, group) => {
                    let keyexpr = ParticipantChannelKeyexpr::new(
                        &prefix,
                        ParticipantChannel::Group,
                        Some(participant),
                    );
                    vec![(KeyExpr::try_from(keyexpr), zenoh_ext::z_serialize(&group))]
                }
                Outgoing::Control(control_id, update) => {
                    let keyexpr = ControlKeyexpr::new(&prefix, Some(&control_id));
                    vec![(KeyExpr::try_from(keyexpr), zenoh_ext::z_serialize(&update))]
                }
                Outgoing::SyncControls => {
                    let state = lock(&state);
                    let puts: Vec<_> = state
                        .controls
                        .iter()
                        .flat_map(|(control_id, control)| {
                            let keyexpr = ControlKeyexpr::new(&prefix, Some(control_id));
                            let mut updates = vec![ControlUpdate::Disabled(control.disabled)];
                            updates.extend(control.label.clone().map(ControlUpdate::Label));
                            updates.into_iter().map(move |update| {
                                (KeyExpr::try_from(keyexpr.clone()), zenoh_ext::z_serialize(&update))
                            })
                        })
                        .collect();
                    puts
                }
            };

            for (keyexpr, payload) in puts {
                let result = match keyexpr {
                    Ok(keyexpr) => session.put(keyexpr, payload).await.map_err(TankError::Zenoh),
                    Err(e) => Err(e),
                };
                if let Err(e) = result {
                    tracing::warn!("Failed to publish interactive update: {}", e);
                }
            }
        }
        tracing::debug!("Interactive update channel closed");
    }

    fn queue(&self, update: Outgoing) {
        if self.outgoing.send(update).is_err() {
            tracing::warn!("Interactive publisher task is gone, update dropped");
        }
    }
}

impl InteractiveSource for ZenohInteractive {
    fn subscribe(&self) -> EventSubscription {
        self.hub.subscribe()
    }

    fn set_control_disabled(&self, control_id: &str, disabled: bool) {
        lock(&self.state)
            .controls
            .entry(control_id.to_string())
            .or_default()
            .disabled = disabled;
        self.queue(Outgoing::Control(
            control_id.to_string(),
            ControlUpdate::Disabled(disabled),
        ));
    }

    fn set_label_text(&self, control_id: &str, text: &str) {
        lock(&self.state)
            .controls
            .entry(control_id.to_string())
            .or_default()
            .label = Some(text.to_string());
        self.queue(Outgoing::Control(
            control_id.to_string(),
            ControlUpdate::Label(text.to_string()),
        ));
    }

    fn assign_group(&self, participant: ParticipantId, group: &str) {
        self.queue(Outgoing::Group(participant, group.to_string()));
    }

    fn participants(&self) -> Vec<Participant> {
        lock(&self.state).participants.values().cloned().collect()
    }
}

impl Drop for ZenohInteractive {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
