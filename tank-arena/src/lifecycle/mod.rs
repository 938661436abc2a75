//! Round/game lifecycle
//!
//! A [`Game`] runs the phases of a tank match in a loop on one task:
//! lobby, spawn, any number of rounds, teardown, and back to the lobby.
//! Interactive events, viewer boost expiries and commands are applied only
//! while the game is suspended inside a phase, so all slot and session
//! state has a single owner.

mod builder;
mod types;

pub use builder::GameBuilder;
pub use types::{GameCommand, GamePhase, GameStatus, StepResult};

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::{GameConfig, RegistrationPolicy};
use crate::constants::{
    AVATAR_CONTROLS, CONTROL_HELP_BLUE, CONTROL_HELP_RED, CONTROL_P1_JOIN, CONTROL_P2_JOIN,
    CONTROL_PLAYER_UPDATE, CONTROL_VIEWER_UPDATE, GROUP_DEFAULT, GROUP_HELP,
};
use crate::error::Result;
use crate::help::HelpManager;
use crate::interactive::{InteractiveEvent, InteractiveSource};
use crate::ports::{AvatarSpawner, CameraRig, ControlInput, MessageDisplay};
use crate::session::ParticipantSession;
use crate::slot::{PlayerSlot, Slots};
use crate::types::{Participant, SlotColor};

/// Text shown while the lobby is incomplete
pub const WAITING_TEXT: &str = "WAITING FOR PLAYERS";

/// A tank match between two remote participants
pub struct Game {
    config: GameConfig,
    slots: Slots,
    session: ParticipantSession,
    spawner: Box<dyn AvatarSpawner>,
    camera: Box<dyn CameraRig>,
    display: Box<dyn MessageDisplay>,
    help: HelpManager,
    phase: GamePhase,
    round_number: u32,
    round_winner: Option<SlotColor>,
    game_winner: Option<SlotColor>,
    /// Text last sent to the display
    message: String,
    stop_requested: bool,
    command_rx: flume::Receiver<GameCommand>,
    command_tx: flume::Sender<GameCommand>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("phase", &self.phase)
            .field("round_number", &self.round_number)
            .field("slots", &self.slots)
            .field("session", &self.session)
            .finish()
    }
}

impl Game {
    pub fn builder() -> GameBuilder {
        GameBuilder::new()
    }

    pub(crate) fn new_internal(
        config: GameConfig,
        source: Arc<dyn InteractiveSource>,
        spawner: Box<dyn AvatarSpawner>,
        camera: Box<dyn CameraRig>,
        display: Box<dyn MessageDisplay>,
        help: HelpManager,
    ) -> Self {
        let slots = Slots::new(
            PlayerSlot::new(
                SlotColor::Red,
                config.tint(SlotColor::Red),
                config.spawn_point(SlotColor::Red),
            ),
            PlayerSlot::new(
                SlotColor::Blue,
                config.tint(SlotColor::Blue),
                config.spawn_point(SlotColor::Blue),
            ),
        );

        let mut session = ParticipantSession::new(source);
        session.register();
        session.reset_to_default();
        session.route_connected_participants();

        let (command_tx, command_rx) = flume::unbounded();

        tracing::info!(
            "Game created: {} round wins to win, start delay {:?}, end delay {:?}",
            config.num_rounds_to_win,
            config.start_delay,
            config.end_delay
        );

        Self {
            config,
            slots,
            session,
            spawner,
            camera,
            display,
            help,
            phase: GamePhase::WaitingForPlayers,
            round_number: 0,
            round_winner: None,
            game_winner: None,
            message: String::new(),
            stop_requested: false,
            command_rx,
            command_tx,
        }
    }

    /// Get a sender for sending commands to this game
    pub fn sender(&self) -> flume::Sender<GameCommand> {
        self.command_tx.clone()
    }

    /// Phase the next step will execute
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    pub fn session(&self) -> &ParticipantSession {
        &self.session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Execute one phase of the lifecycle
    ///
    /// Returns when the phase has completed, including its delay. A Stop
    /// command received meanwhile takes effect once the phase's current
    /// suspension is over, after which every call returns
    /// [`StepResult::Stop`].
    pub async fn step(&mut self) -> Result<StepResult> {
        self.drain_commands();
        if self.stop_requested || self.phase == GamePhase::Stopped {
            self.shutdown();
            return Ok(StepResult::Stop);
        }

        let phase = self.phase;
        let next = match phase {
            GamePhase::WaitingForPlayers => self.wait_for_players().await,
            GamePhase::Initializing => self.initialize()?,
            GamePhase::RoundStarting => self.start_round().await?,
            GamePhase::RoundPlaying => self.play_round().await?,
            GamePhase::RoundEnding => self.end_round().await?,
            GamePhase::Teardown => self.teardown(),
            GamePhase::Stopped => GamePhase::Stopped,
        };

        if self.stop_requested {
            self.shutdown();
            return Ok(StepResult::Stop);
        }

        tracing::info!("Game phase {} -> {}", phase, next);
        self.phase = next;
        Ok(StepResult::Advanced(self.status(phase)))
    }

    /// Run phases until the game is stopped or fails
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match self.step().await? {
                StepResult::Advanced(status) => {
                    tracing::debug!(
                        "Round {} red {} blue {}",
                        status.round,
                        status.wins_of(SlotColor::Red),
                        status.wins_of(SlotColor::Blue)
                    );
                }
                StepResult::Stop => return Ok(()),
            }
        }
    }

    fn status(&self, phase: GamePhase) -> GameStatus {
        GameStatus {
            phase,
            next_phase: self.phase,
            round: self.round_number,
            wins: [
                self.slots.get(SlotColor::Red).wins(),
                self.slots.get(SlotColor::Blue).wins(),
            ],
            round_winner: self.round_winner,
            game_winner: self.game_winner,
            message: self.message.clone(),
        }
    }

    async fn wait_for_players(&mut self) -> GamePhase {
        self.show(WAITING_TEXT);
        while !self.session.all_players_joined() {
            self.suspend(None).await;
            if self.stop_requested {
                return GamePhase::WaitingForPlayers;
            }
        }
        tracing::info!(
            "Both players joined: red {}, blue {}",
            describe(self.session.participant(SlotColor::Red)),
            describe(self.session.participant(SlotColor::Blue))
        );
        GamePhase::Initializing
    }

    fn initialize(&mut self) -> Result<GamePhase> {
        let mut targets = Vec::with_capacity(SlotColor::ALL.len());
        for color in SlotColor::ALL {
            let participant = self.session.participant(color).cloned();
            let slot = self.slots.get_mut(color);
            let avatar = match self.spawner.spawn(&slot.info(), slot.spawn()) {
                Ok(avatar) => avatar,
                Err(e) => {
                    tracing::error!("Failed to spawn {} avatar: {}", color, e);
                    self.despawn_avatars();
                    return Err(e);
                }
            };
            avatar.set_participant(participant.as_ref().map(Participant::id));
            slot.participant = participant;
            slot.avatar = Some(avatar.clone());
            targets.push(avatar);
        }
        self.camera.set_targets(targets);

        let source = self.session.source().clone();
        for participant in source.participants() {
            if self.session.slot_of(participant.id()).is_none() {
                source.assign_group(participant.id(), GROUP_HELP);
            }
        }
        Ok(GamePhase::RoundStarting)
    }

    async fn start_round(&mut self) -> Result<GamePhase> {
        for slot in self.slots.iter() {
            let avatar = slot.require_avatar()?;
            avatar.disable_control();
            avatar.reset(slot.spawn());
        }
        self.camera.set_start_position_and_size();

        self.round_number += 1;
        tracing::info!("Round {} starting", self.round_number);
        self.show(&format!("ROUND {}", self.round_number));

        self.delay(self.config.start_delay).await;
        Ok(GamePhase::RoundPlaying)
    }

    async fn play_round(&mut self) -> Result<GamePhase> {
        for slot in self.slots.iter() {
            slot.require_avatar()?.enable_control();
        }
        self.show("");

        let tick = self.config.tick_interval;
        while !self.slots.one_actor_left() {
            self.delay(tick).await;
            self.camera.update(tick);
            if self.stop_requested {
                break;
            }
        }
        Ok(GamePhase::RoundEnding)
    }

    async fn end_round(&mut self) -> Result<GamePhase> {
        for slot in self.slots.iter() {
            slot.require_avatar()?.disable_control();
        }

        self.round_winner = self.slots.round_winner();
        if let Some(winner) = self.round_winner {
            self.slots.get_mut(winner).wins += 1;
        }
        self.game_winner = self.slots.game_winner(self.config.num_rounds_to_win);

        match (self.round_winner, self.game_winner) {
            (_, Some(winner)) => tracing::info!("{} player wins the game", winner),
            (Some(winner), None) => tracing::info!("{} player wins round {}", winner, self.round_number),
            (None, None) => tracing::info!("Round {} is a draw", self.round_number),
        }
        let message = self.slots.end_message(self.round_winner, self.game_winner);
        self.show(&message);

        self.delay(self.config.end_delay).await;
        Ok(if self.game_winner.is_some() {
            GamePhase::Teardown
        } else {
            GamePhase::RoundStarting
        })
    }

    fn teardown(&mut self) -> GamePhase {
        let source = self.session.source().clone();
        for participant in source.participants() {
            source.assign_group(participant.id(), GROUP_DEFAULT);
        }

        self.despawn_avatars();
        for slot in self.slots.iter_mut() {
            slot.wins = 0;
        }
        self.camera.clear_targets();
        self.help.clear();
        self.round_number = 0;
        self.round_winner = None;
        self.game_winner = None;

        self.session.reset_to_default();
        if self.config.registration_policy == RegistrationPolicy::RenewEachGame {
            self.session.register();
        }
        GamePhase::WaitingForPlayers
    }

    /// Final cleanup once a Stop has been honoured
    fn shutdown(&mut self) {
        if self.phase == GamePhase::Stopped {
            return;
        }
        tracing::info!("Game stopping during {}", self.phase);
        self.despawn_avatars();
        self.camera.clear_targets();
        self.help.clear();
        self.session.release();
        self.phase = GamePhase::Stopped;
    }

    fn despawn_avatars(&mut self) {
        for slot in self.slots.iter_mut() {
            if let Some(avatar) = slot.avatar.take() {
                avatar.disable_control();
                avatar.set_participant(None);
                avatar.despawn();
            }
            slot.participant = None;
        }
    }

    fn show(&mut self, text: &str) {
        self.message = text.to_string();
        self.display.set_text(text);
    }

    /// Suspend for `duration`, applying events until it has fully elapsed
    async fn delay(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.suspend(Some(deadline)).await {}
    }

    /// Wait for the next wake-up and apply it
    ///
    /// Returns true when `deadline` was reached; `None` never expires.
    async fn suspend(&mut self, deadline: Option<Instant>) -> bool {
        let events = self.session.event_receiver();
        let commands = self.command_rx.clone();
        let help_expiry = self.help.next_expiry();

        tokio::select! {
            () = sleep_until(deadline) => true,
            () = sleep_until(help_expiry) => {
                self.expire_help();
                false
            }
            event = next_event(events) => {
                self.apply_event(event);
                false
            }
            Ok(command) = commands.recv_async() => {
                self.apply_command(command);
                false
            }
        }
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            self.apply_command(command);
        }
    }

    fn apply_command(&mut self, command: GameCommand) {
        match command {
            GameCommand::Stop => {
                tracing::info!("Game received Stop command during {}", self.phase);
                self.stop_requested = true;
            }
        }
    }

    fn apply_event(&mut self, event: InteractiveEvent) {
        match event {
            InteractiveEvent::ParticipantJoined(participant) => {
                self.session.handle_participant_connected(&participant);
            }
            InteractiveEvent::ParticipantLeft(participant) => {
                self.session.handle_participant_leave(&participant);
            }
            InteractiveEvent::Button {
                control_id,
                participant,
                pressed,
            } => match control_id.as_str() {
                CONTROL_P1_JOIN | CONTROL_P2_JOIN => {
                    if pressed {
                        self.session.handle_join_event(&control_id, &participant);
                    }
                }
                CONTROL_HELP_RED if pressed => self.give_help(SlotColor::Red, &participant),
                CONTROL_HELP_BLUE if pressed => self.give_help(SlotColor::Blue, &participant),
                id if AVATAR_CONTROLS.contains(&id) => {
                    self.route_input(&participant, ControlInput::Button { control_id, pressed });
                }
                _ => {}
            },
            InteractiveEvent::Joystick {
                control_id,
                participant,
                x,
                y,
            } => {
                if AVATAR_CONTROLS.contains(&control_id.as_str()) {
                    self.route_input(&participant, ControlInput::Joystick { control_id, x, y });
                }
            }
        }
    }

    /// Forward input of a seated participant to their avatar
    fn route_input(&self, participant: &Participant, input: ControlInput) {
        let Some(color) = self.session.slot_of(participant.id()) else {
            return;
        };
        match self.slots.get(color).avatar() {
            Some(avatar) => {
                tracing::debug!("{} input from {}: {:?}", color, participant, input);
                avatar.apply_input(input);
            }
            None => tracing::debug!("Dropping input of {}: no avatar spawned", participant),
        }
    }

    fn give_help(&mut self, color: SlotColor, helper: &Participant) {
        if self.session.slot_of(helper.id()).is_some() {
            tracing::debug!("Player {} cannot give help", helper);
            return;
        }
        let slot = self.slots.get(color);
        let Some(avatar) = slot.avatar().filter(|avatar| avatar.is_active()).cloned() else {
            tracing::debug!("Ignoring help for {} player: no active avatar", color);
            return;
        };
        let recipient = slot
            .participant()
            .map(|participant| participant.name().to_string())
            .unwrap_or_else(|| slot.display_name());

        let granted = self
            .help
            .give_help(color, &avatar, &recipient, helper.name(), Instant::now());
        self.announce(&granted.message);
    }

    fn expire_help(&mut self) {
        for message in self.help.expire_due(Instant::now()) {
            self.announce(&message);
        }
    }

    fn announce(&self, text: &str) {
        let source = self.session.source();
        source.set_label_text(CONTROL_VIEWER_UPDATE, text);
        source.set_label_text(CONTROL_PLAYER_UPDATE, text);
    }
}

fn describe(participant: Option<&Participant>) -> String {
    participant.map_or_else(|| "-".to_string(), Participant::to_string)
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => pending().await,
    }
}

/// Next event of the registration, pending forever without one
async fn next_event(events: Option<flume::Receiver<InteractiveEvent>>) -> InteractiveEvent {
    match events {
        Some(events) => match events.recv_async().await {
            Ok(event) => event,
            Err(_) => pending().await,
        },
        None => pending().await,
    }
}
