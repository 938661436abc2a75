//! Participant session: which participants hold the red and blue seats
use std::sync::Arc;

use crate::constants::{
    CONTROL_P1_JOIN, CONTROL_P2_JOIN, CONTROL_STATUS, GROUP_CONTROLS, GROUP_HELP, GROUP_START,
};
use crate::interactive::{EventSubscription, InteractiveEvent, InteractiveSource};
use crate::types::{Participant, ParticipantId, SlotColor};

/// How many seats are bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinState {
    NoPlayers,
    OnePlayerJoined,
    BothPlayersJoined,
}

/// Binds remote participants to the two player seats
///
/// Owns the event registration of the game: events flow only while a
/// subscription is registered, and releasing it unsubscribes immediately.
pub struct ParticipantSession {
    source: Arc<dyn InteractiveSource>,
    bindings: [Option<Participant>; 2],
    registration: Option<EventSubscription>,
}

impl std::fmt::Debug for ParticipantSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticipantSession")
            .field("bindings", &self.bindings)
            .field("registered", &self.registration.is_some())
            .finish()
    }
}

impl ParticipantSession {
    pub fn new(source: Arc<dyn InteractiveSource>) -> Self {
        Self {
            source,
            bindings: [None, None],
            registration: None,
        }
    }

    pub fn source(&self) -> &Arc<dyn InteractiveSource> {
        &self.source
    }

    /// Subscribe to the source, replacing any previous registration
    pub fn register(&mut self) {
        self.registration = Some(self.source.subscribe());
    }

    /// Drop the registration; pending undelivered events are discarded
    pub fn release(&mut self) {
        self.registration = None;
    }

    pub fn is_registered(&self) -> bool {
        self.registration.is_some()
    }

    /// Receiver of the current registration, if any
    pub fn event_receiver(&self) -> Option<flume::Receiver<InteractiveEvent>> {
        self.registration
            .as_ref()
            .map(|registration| registration.receiver().clone())
    }

    pub fn participant(&self, color: SlotColor) -> Option<&Participant> {
        self.bindings[color.index()].as_ref()
    }

    /// Seat held by this participant, if any
    pub fn slot_of(&self, participant: ParticipantId) -> Option<SlotColor> {
        SlotColor::ALL.into_iter().find(|color| {
            self.participant(*color)
                .is_some_and(|bound| bound.id() == participant)
        })
    }

    pub fn join_state(&self) -> JoinState {
        match self.bindings.iter().filter(|binding| binding.is_some()).count() {
            0 => JoinState::NoPlayers,
            1 => JoinState::OnePlayerJoined,
            _ => JoinState::BothPlayersJoined,
        }
    }

    pub fn all_players_joined(&self) -> bool {
        self.join_state() == JoinState::BothPlayersJoined
    }

    /// Handle a press on a join control
    ///
    /// Returns true when the press bound a seat. Presses on other controls,
    /// on an already taken seat, or by a participant already holding the
    /// other seat change nothing.
    pub fn handle_join_event(&mut self, control_id: &str, participant: &Participant) -> bool {
        let color = match control_id {
            CONTROL_P1_JOIN => SlotColor::Red,
            CONTROL_P2_JOIN => SlotColor::Blue,
            _ => return false,
        };

        if self.bindings[color.index()].is_some() {
            tracing::debug!("Ignoring join of {} for taken {} seat", participant, color);
            return false;
        }
        if self.slot_of(participant.id()).is_some() {
            tracing::debug!("Ignoring join of {}: already seated", participant);
            return false;
        }

        tracing::info!("Participant {} joined as {} player", participant, color);
        self.bindings[color.index()] = Some(participant.clone());
        self.source.set_control_disabled(control_id, true);
        self.source.assign_group(participant.id(), GROUP_CONTROLS);
        self.push_status();
        true
    }

    /// Handle a participant disconnecting
    ///
    /// While the lobby is still incomplete a leaving player frees their seat
    /// so someone else can take it. Once both seats are bound the match goes
    /// on and the seat stays bound until the next reset. Returns true when a
    /// seat was freed.
    pub fn handle_participant_leave(&mut self, participant: &Participant) -> bool {
        let Some(color) = self.slot_of(participant.id()) else {
            return false;
        };

        if self.all_players_joined() {
            tracing::warn!(
                "{} player {} left mid-session, seat stays bound",
                color,
                participant
            );
            return false;
        }

        tracing::info!("{} player {} left the lobby, seat freed", color, participant);
        self.bindings[color.index()] = None;
        self.source.set_control_disabled(join_control(color), false);
        self.push_status();
        true
    }

    /// Route a newly connected participant to the audience group
    pub fn handle_participant_connected(&self, participant: &Participant) {
        let group = self.determine_audience_group();
        tracing::debug!("Routing participant {} to group '{}'", participant, group);
        self.source.assign_group(participant.id(), group);
    }

    /// Route every participant the source already knows about
    ///
    /// Participants online before the first registration never produce a
    /// join event for it, so they are routed from the source's list.
    pub fn route_connected_participants(&self) {
        for participant in self.source.participants() {
            self.handle_participant_connected(&participant);
        }
    }

    /// Group a newly connected viewer belongs in
    pub fn determine_audience_group(&self) -> &'static str {
        if self.all_players_joined() {
            GROUP_HELP
        } else {
            GROUP_START
        }
    }

    /// Clear both seats, re-enable the join controls and restore the label
    pub fn reset_to_default(&mut self) {
        self.bindings = [None, None];
        self.source.set_control_disabled(CONTROL_P1_JOIN, false);
        self.source.set_control_disabled(CONTROL_P2_JOIN, false);
        self.push_status();
    }

    /// Two-line lobby status text
    pub fn status_label(&self) -> String {
        let red = if self.bindings[0].is_some() {
            "Red player joined"
        } else {
            "Waiting for red player"
        };
        let blue = if self.bindings[1].is_some() {
            "Blue player joined"
        } else {
            "Waiting for blue player"
        };
        format!("{}\n{}", red, blue)
    }

    fn push_status(&self) {
        self.source.set_label_text(CONTROL_STATUS, &self.status_label());
    }
}

fn join_control(color: SlotColor) -> &'static str {
    match color {
        SlotColor::Red => CONTROL_P1_JOIN,
        SlotColor::Blue => CONTROL_P2_JOIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GROUP_DEFAULT;
    use crate::interactive::LocalInteractive;

    fn participant(id: u32, name: &str) -> Participant {
        Participant::from_name(ParticipantId(id), name).unwrap()
    }

    fn session() -> (Arc<LocalInteractive>, ParticipantSession) {
        let local = Arc::new(LocalInteractive::new());
        let session = ParticipantSession::new(local.clone());
        (local, session)
    }

    #[test]
    fn test_join_red_then_blue() {
        let (local, mut session) = session();
        let alice = participant(1, "alice");
        let bob = participant(2, "bob");
        local.connect(alice.clone());
        local.connect(bob.clone());

        assert_eq!(session.join_state(), JoinState::NoPlayers);
        assert!(session.handle_join_event(CONTROL_P1_JOIN, &alice));
        assert_eq!(session.join_state(), JoinState::OnePlayerJoined);
        assert!(!session.all_players_joined());
        assert!(local.is_disabled(CONTROL_P1_JOIN));
        assert_eq!(local.group_of(alice.id()).as_deref(), Some(GROUP_CONTROLS));
        assert_eq!(
            local.label(CONTROL_STATUS).as_deref(),
            Some("Red player joined\nWaiting for blue player")
        );

        assert!(session.handle_join_event(CONTROL_P2_JOIN, &bob));
        assert!(session.all_players_joined());
        assert_eq!(session.slot_of(bob.id()), Some(SlotColor::Blue));
        assert_eq!(
            local.label(CONTROL_STATUS).as_deref(),
            Some("Red player joined\nBlue player joined")
        );
    }

    #[test]
    fn test_blue_only_label() {
        let (_local, mut session) = session();
        session.handle_join_event(CONTROL_P2_JOIN, &participant(2, "bob"));
        assert_eq!(
            session.status_label(),
            "Waiting for red player\nBlue player joined"
        );
    }

    #[test]
    fn test_duplicate_join_is_ignored() {
        let (_local, mut session) = session();
        let alice = participant(1, "alice");
        let carol = participant(3, "carol");

        assert!(session.handle_join_event(CONTROL_P1_JOIN, &alice));
        assert!(!session.handle_join_event(CONTROL_P1_JOIN, &carol));
        assert_eq!(session.participant(SlotColor::Red), Some(&alice));
    }

    #[test]
    fn test_same_participant_cannot_take_both_seats() {
        let (_local, mut session) = session();
        let alice = participant(1, "alice");

        assert!(session.handle_join_event(CONTROL_P1_JOIN, &alice));
        assert!(!session.handle_join_event(CONTROL_P2_JOIN, &alice));
        assert_eq!(session.join_state(), JoinState::OnePlayerJoined);
    }

    #[test]
    fn test_unknown_control_is_ignored() {
        let (_local, mut session) = session();
        assert!(!session.handle_join_event("fire", &participant(1, "alice")));
        assert_eq!(session.join_state(), JoinState::NoPlayers);
    }

    #[test]
    fn test_all_players_joined_only_after_both_distinct_seats() {
        let (_local, mut session) = session();
        let presses = [
            (CONTROL_P1_JOIN, participant(1, "a")),
            (CONTROL_P1_JOIN, participant(2, "b")),
            (CONTROL_P2_JOIN, participant(1, "a")),
            ("left", participant(4, "d")),
        ];
        for (control, who) in &presses {
            session.handle_join_event(control, who);
            assert!(!session.all_players_joined());
        }

        session.handle_join_event(CONTROL_P2_JOIN, &participant(3, "c"));
        assert!(session.all_players_joined());

        // Further presses never undo readiness
        session.handle_join_event(CONTROL_P1_JOIN, &participant(5, "e"));
        session.handle_participant_leave(&participant(1, "a"));
        assert!(session.all_players_joined());
    }

    #[test]
    fn test_leave_in_lobby_frees_seat() {
        let (local, mut session) = session();
        let alice = participant(1, "alice");
        session.handle_join_event(CONTROL_P1_JOIN, &alice);

        assert!(session.handle_participant_leave(&alice));
        assert_eq!(session.join_state(), JoinState::NoPlayers);
        assert!(!local.is_disabled(CONTROL_P1_JOIN));
        assert_eq!(
            local.label(CONTROL_STATUS).as_deref(),
            Some("Waiting for red player\nWaiting for blue player")
        );
    }

    #[test]
    fn test_leave_of_viewer_changes_nothing() {
        let (_local, mut session) = session();
        session.handle_join_event(CONTROL_P1_JOIN, &participant(1, "alice"));
        assert!(!session.handle_participant_leave(&participant(9, "viewer")));
        assert_eq!(session.join_state(), JoinState::OnePlayerJoined);
    }

    #[test]
    fn test_audience_group_routing() {
        let (local, mut session) = session();
        let viewer = participant(9, "viewer");
        local.connect(viewer.clone());

        assert_eq!(session.determine_audience_group(), GROUP_START);
        session.handle_participant_connected(&viewer);
        assert_eq!(local.group_of(viewer.id()).as_deref(), Some(GROUP_START));

        session.handle_join_event(CONTROL_P1_JOIN, &participant(1, "alice"));
        session.handle_join_event(CONTROL_P2_JOIN, &participant(2, "bob"));
        assert_eq!(session.determine_audience_group(), GROUP_HELP);
        session.handle_participant_connected(&viewer);
        assert_eq!(local.group_of(viewer.id()).as_deref(), Some(GROUP_HELP));
        assert_ne!(GROUP_HELP, GROUP_DEFAULT);
    }

    #[test]
    fn test_participants_online_before_registration_are_routed() {
        let (local, mut session) = session();
        let alice = participant(1, "alice");
        let bob = participant(2, "bob");
        local.connect(alice.clone());
        local.connect(bob.clone());

        session.register();
        assert!(session.event_receiver().unwrap().try_recv().is_err());
        assert_eq!(local.group_of(alice.id()).as_deref(), Some(GROUP_DEFAULT));

        session.route_connected_participants();
        assert_eq!(local.group_of(alice.id()).as_deref(), Some(GROUP_START));
        assert_eq!(local.group_of(bob.id()).as_deref(), Some(GROUP_START));
    }

    #[test]
    fn test_reset_to_default_is_idempotent() {
        let (local, mut session) = session();
        session.handle_join_event(CONTROL_P1_JOIN, &participant(1, "alice"));
        session.handle_join_event(CONTROL_P2_JOIN, &participant(2, "bob"));

        session.reset_to_default();
        let once = (
            session.join_state(),
            local.label(CONTROL_STATUS),
            local.is_disabled(CONTROL_P1_JOIN),
            local.is_disabled(CONTROL_P2_JOIN),
        );
        session.reset_to_default();
        let twice = (
            session.join_state(),
            local.label(CONTROL_STATUS),
            local.is_disabled(CONTROL_P1_JOIN),
            local.is_disabled(CONTROL_P2_JOIN),
        );

        assert_eq!(once, twice);
        assert_eq!(once.0, JoinState::NoPlayers);
        assert_eq!(
            once.1.as_deref(),
            Some("Waiting for red player\nWaiting for blue player")
        );
        assert!(!once.2 && !once.3);
    }

    #[test]
    fn test_registration_token() {
        let (local, mut session) = session();
        assert!(session.event_receiver().is_none());

        session.register();
        assert!(session.is_registered());
        assert_eq!(local.subscriber_count(), 1);

        session.register();
        assert_eq!(local.subscriber_count(), 1);

        session.release();
        assert!(!session.is_registered());
        assert_eq!(local.subscriber_count(), 0);
    }
}
