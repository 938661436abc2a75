//! Builder wiring a Game to its collaborators
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::Game;
use crate::config::{GameConfig, RegistrationPolicy};
use crate::error::{Result, TankError};
use crate::help::HelpManager;
use crate::interactive::InteractiveSource;
use crate::ports::{AvatarSpawner, CameraRig, MessageDisplay};
use crate::types::Pose;

/// Builder for games
///
/// The interactive source, avatar spawner, camera and message display are
/// required; `build` fails with [`TankError::MissingCollaborator`] naming the
/// first one that was not supplied.
#[must_use = "a GameBuilder does nothing until `build` is called"]
#[derive(Default)]
pub struct GameBuilder {
    source: Option<Arc<dyn InteractiveSource>>,
    spawner: Option<Box<dyn AvatarSpawner>>,
    camera: Option<Box<dyn CameraRig>>,
    display: Option<Box<dyn MessageDisplay>>,
    config: GameConfig,
    help_seed: Option<u64>,
}

impl GameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interactive platform the game listens to
    pub fn interactive(mut self, source: Arc<dyn InteractiveSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn spawner(mut self, spawner: impl AvatarSpawner + 'static) -> Self {
        self.spawner = Some(Box::new(spawner));
        self
    }

    pub fn camera(mut self, camera: impl CameraRig + 'static) -> Self {
        self.camera = Some(Box::new(camera));
        self
    }

    pub fn display(mut self, display: impl MessageDisplay + 'static) -> Self {
        self.display = Some(Box::new(display));
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of round wins that wins the game
    pub fn num_rounds_to_win(mut self, rounds: u32) -> Self {
        self.config.num_rounds_to_win = rounds;
        self
    }

    pub fn start_delay(mut self, delay: Duration) -> Self {
        self.config.start_delay = delay;
        self
    }

    pub fn end_delay(mut self, delay: Duration) -> Self {
        self.config.end_delay = delay;
        self
    }

    /// Set the interval of the round-end check while a round is playing
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    pub fn help_cooldown(mut self, cooldown: Duration) -> Self {
        self.config.help_cooldown = cooldown;
        self
    }

    pub fn registration_policy(mut self, policy: RegistrationPolicy) -> Self {
        self.config.registration_policy = policy;
        self
    }

    /// Set the spawn poses of the red and blue slots
    pub fn spawn_points(mut self, red: Pose, blue: Pose) -> Self {
        self.config.spawn_points = [red, blue];
        self
    }

    /// Make viewer boosts reproducible
    pub fn help_seed(mut self, seed: u64) -> Self {
        self.help_seed = Some(seed);
        self
    }

    /// Validate the configuration and create the game
    ///
    /// The game registers for interactive events right away, so events sent
    /// after `build` returns are never missed.
    pub fn build(self) -> Result<Game> {
        let source = self
            .source
            .ok_or(TankError::MissingCollaborator("interactive source"))?;
        let spawner = self
            .spawner
            .ok_or(TankError::MissingCollaborator("avatar spawner"))?;
        let camera = self
            .camera
            .ok_or(TankError::MissingCollaborator("camera rig"))?;
        let display = self
            .display
            .ok_or(TankError::MissingCollaborator("message display"))?;
        self.config.validate()?;

        let help = match self.help_seed {
            Some(seed) => HelpManager::with_rng(StdRng::seed_from_u64(seed), self.config.help_cooldown),
            None => HelpManager::new(self.config.help_cooldown),
        };

        Ok(Game::new_internal(
            self.config,
            source,
            spawner,
            camera,
            display,
            help,
        ))
    }
}
