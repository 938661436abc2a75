//! Network layer for tank-arena

pub mod keyexpr;
pub mod message;

mod display;
mod interactive;
mod participant;

pub use display::ZenohDisplay;
pub use interactive::ZenohInteractive;
pub use message::ControlUpdate;
pub use participant::{HostUpdate, ParticipantClient};

/// Key expression prefix used when none is configured
pub const DEFAULT_PREFIX: &str = "tanks/arena";

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use zenoh::key_expr::KeyExpr;

    use super::*;
    use crate::interactive::{InteractiveEvent, InteractiveSource};
    use crate::constants::GROUP_START;
    use crate::network::keyexpr::{ParticipantChannel, ParticipantChannelKeyexpr};
    use crate::ports::{ControlInput, MessageDisplay};
    use crate::session::ParticipantSession;
    use crate::types::{Participant, ParticipantId};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn test_prefix() -> KeyExpr<'static> {
        KeyExpr::try_from(format!("tanks/test/{}", rand::random::<u32>())).unwrap()
    }

    async fn next_event(receiver: &flume::Receiver<InteractiveEvent>) -> InteractiveEvent {
        tokio::time::timeout(TIMEOUT, receiver.recv_async())
            .await
            .expect("timed out waiting for event")
            .unwrap()
    }

    /// Receive host updates until one matches
    async fn expect_update(client: &ParticipantClient, wanted: HostUpdate) {
        tokio::time::timeout(TIMEOUT, async {
            loop {
                if client.recv().await.unwrap() == wanted {
                    return;
                }
            }
        })
        .await
        .expect("timed out waiting for host update");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_participant_join_and_input() {
        let session = zenoh::open(zenoh::Config::default()).await.unwrap();
        let prefix = test_prefix();
        let host = ZenohInteractive::new(&session, prefix.clone()).await.unwrap();
        let subscription = host.subscribe();

        let alice = Participant::from_name(ParticipantId(11), "alice").unwrap();
        let client = ParticipantClient::join(&session, &prefix, alice.clone())
            .await
            .unwrap();

        assert_eq!(
            next_event(subscription.receiver()).await,
            InteractiveEvent::ParticipantJoined(alice.clone())
        );
        assert_eq!(host.participants(), vec![alice.clone()]);

        client.button("fire", true).await.unwrap();
        assert_eq!(
            next_event(subscription.receiver()).await,
            InteractiveEvent::Button {
                control_id: "fire".to_string(),
                participant: alice.clone(),
                pressed: true,
            }
        );

        client.joystick("joystick", 0.5, 1.0).await.unwrap();
        assert!(matches!(
            next_event(subscription.receiver()).await,
            InteractiveEvent::Joystick { x, y, .. } if x == 0.5 && y == 1.0
        ));

        drop(client);
        assert_eq!(
            next_event(subscription.receiver()).await,
            InteractiveEvent::ParticipantLeft(alice)
        );
        assert!(host.participants().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_host_updates_reach_participant() {
        let session = zenoh::open(zenoh::Config::default()).await.unwrap();
        let prefix = test_prefix();
        let host = ZenohInteractive::new(&session, prefix.clone()).await.unwrap();
        let mut display = ZenohDisplay::new(&session, &prefix).await.unwrap();
        let subscription = host.subscribe();

        // Set before the participant arrives: delivered by the arrival sync
        host.set_label_text("statusUpdate", "Waiting for red player\nWaiting for blue player");

        let bob = Participant::from_name(ParticipantId(12), "bob").unwrap();
        let client = ParticipantClient::join(&session, &prefix, bob.clone())
            .await
            .unwrap();
        next_event(subscription.receiver()).await;
        expect_update(
            &client,
            HostUpdate::Control {
                control_id: "statusUpdate".to_string(),
                update: ControlUpdate::Label("Waiting for red player\nWaiting for blue player".to_string()),
            },
        )
        .await;

        host.assign_group(bob.id(), "start");
        expect_update(&client, HostUpdate::Group("start".to_string())).await;

        host.set_control_disabled("joinPlayer1", true);
        expect_update(
            &client,
            HostUpdate::Control {
                control_id: "joinPlayer1".to_string(),
                update: ControlUpdate::Disabled(true),
            },
        )
        .await;

        display.set_text("ROUND 1");
        expect_update(&client, HostUpdate::Display("ROUND 1".to_string())).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_participant_online_before_host_is_routed() {
        let session = zenoh::open(zenoh::Config::default()).await.unwrap();
        let prefix = test_prefix();

        let alice = Participant::from_name(ParticipantId(21), "alice").unwrap();
        let client = ParticipantClient::join(&session, &prefix, alice.clone())
            .await
            .unwrap();

        let host = Arc::new(ZenohInteractive::new(&session, prefix.clone()).await.unwrap());
        tokio::time::timeout(TIMEOUT, async {
            while host.participants().is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("timed out waiting for liveliness history");
        assert_eq!(host.participants(), vec![alice]);

        // The arrival was replayed before anyone subscribed
        let mut lobby = ParticipantSession::new(host.clone());
        lobby.register();
        lobby.route_connected_participants();
        expect_update(&client, HostUpdate::Group(GROUP_START.to_string())).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_input_for_absent_participant_is_dropped() {
        let session = zenoh::open(zenoh::Config::default()).await.unwrap();
        let prefix = test_prefix();
        let host = ZenohInteractive::new(&session, prefix.clone()).await.unwrap();
        let subscription = host.subscribe();

        let alice = Participant::from_name(ParticipantId(31), "alice").unwrap();
        let client = ParticipantClient::join(&session, &prefix, alice.clone())
            .await
            .unwrap();
        next_event(subscription.receiver()).await;

        // No liveliness token behind id 99
        let stray: KeyExpr = ParticipantChannelKeyexpr::new(
            &prefix,
            ParticipantChannel::Button,
            Some(ParticipantId(99)),
        )
        .try_into()
        .unwrap();
        let input = ControlInput::Button {
            control_id: "fire".to_string(),
            pressed: true,
        };
        session
            .put(stray, zenoh_ext::z_serialize(&input))
            .await
            .unwrap();

        client.button("left", true).await.unwrap();
        assert_eq!(
            next_event(subscription.receiver()).await,
            InteractiveEvent::Button {
                control_id: "left".to_string(),
                participant: alice,
                pressed: true,
            }
        );
    }
}
