//! Configuration for a Game

use std::time::Duration;

use crate::error::{Result, TankError};
use crate::types::{Pose, Rgb, SlotColor};

/// What happens to the event registration when a game is torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationPolicy {
    /// Drop the subscription and subscribe again; events queued during the
    /// finished game are discarded
    #[default]
    RenewEachGame,
    /// Keep one subscription for the lifetime of the game object
    KeepAcrossGames,
}

/// Main configuration of a Game
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Round wins needed to win the game
    pub num_rounds_to_win: u32,

    /// Pause after `ROUND n` is shown, before control is enabled
    pub start_delay: Duration,

    /// Pause on the end-of-round message
    pub end_delay: Duration,

    /// Interval between round-end checks while a round is playing
    pub tick_interval: Duration,

    /// How long a viewer stat boost lasts
    pub help_cooldown: Duration,

    pub registration_policy: RegistrationPolicy,

    /// Spawn poses indexed by slot (red, blue)
    pub spawn_points: [Pose; 2],

    /// Tints indexed by slot (red, blue)
    pub tints: [Rgb; 2],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_rounds_to_win: 3,
            start_delay: Duration::from_secs(3),
            end_delay: Duration::from_secs(3),
            tick_interval: Duration::from_secs(1) / 60,
            help_cooldown: Duration::from_secs(10),
            registration_policy: RegistrationPolicy::default(),
            spawn_points: [
                Pose::new(-20.0, 10.0, 135.0),
                Pose::new(20.0, -10.0, -45.0),
            ],
            tints: [Rgb::new(229, 46, 40), Rgb::new(42, 100, 180)],
        }
    }
}

impl GameConfig {
    pub fn spawn_point(&self, color: SlotColor) -> Pose {
        self.spawn_points[color.index()]
    }

    pub fn tint(&self, color: SlotColor) -> Rgb {
        self.tints[color.index()]
    }

    /// Reject values the lifecycle cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.num_rounds_to_win < 1 {
            return Err(TankError::InvalidConfig(
                "num_rounds_to_win must be at least 1".to_string(),
            ));
        }
        if self.tick_interval.is_zero() {
            return Err(TankError::InvalidConfig(
                "tick_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.num_rounds_to_win, 3);
        assert_eq!(config.start_delay, Duration::from_secs(3));
        assert_eq!(config.end_delay, Duration::from_secs(3));
        assert_eq!(config.registration_policy, RegistrationPolicy::RenewEachGame);
        assert_eq!(config.tint(SlotColor::Red).to_html_rgb(), "E52E28");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let config = GameConfig {
            num_rounds_to_win: 0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(TankError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let config = GameConfig {
            tick_interval: Duration::ZERO,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
