//! Tank health and shell damage
use crate::types::Rgb;

/// Hit points of one tank
#[derive(Debug, Clone, PartialEq)]
pub struct TankHealth {
    starting_health: f32,
    current_health: f32,
    /// Incoming damage is divided by this
    defence_multiplier: f32,
    dead: bool,
    full_health_color: Rgb,
    zero_health_color: Rgb,
}

impl Default for TankHealth {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl TankHealth {
    pub fn new(starting_health: f32) -> Self {
        Self {
            starting_health,
            current_health: starting_health,
            defence_multiplier: 1.0,
            dead: false,
            full_health_color: Rgb::GREEN,
            zero_health_color: Rgb::RED,
        }
    }

    pub fn current(&self) -> f32 {
        self.current_health
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn set_defence_multiplier(&mut self, multiplier: f32) {
        self.defence_multiplier = multiplier;
    }

    /// Back to full health, alive
    pub fn reset(&mut self) {
        self.current_health = self.starting_health;
        self.dead = false;
    }

    /// Apply damage; returns true only on the hit that kills the tank
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.current_health -= amount / self.defence_multiplier;
        if self.current_health <= 0.0 && !self.dead {
            self.dead = true;
            return true;
        }
        false
    }

    /// Heal, never above starting health
    pub fn receive_help(&mut self, amount: f32) {
        self.current_health = (self.current_health + amount).min(self.starting_health);
    }

    /// Health bar color for the current health
    pub fn health_color(&self) -> Rgb {
        self.zero_health_color.lerp(
            self.full_health_color,
            self.current_health / self.starting_health,
        )
    }
}

/// Area damage of an exploding shell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellExplosion {
    pub max_damage: f32,
    pub explosion_radius: f32,
    pub explosion_force: f32,
}

impl Default for ShellExplosion {
    fn default() -> Self {
        Self {
            max_damage: 100.0,
            explosion_radius: 5.0,
            explosion_force: 1000.0,
        }
    }
}

impl ShellExplosion {
    /// Damage falls off linearly from the centre to zero at the radius
    pub fn calculate_damage(&self, distance: f32) -> f32 {
        let relative_distance = (self.explosion_radius - distance) / self.explosion_radius;
        (relative_distance * self.max_damage).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_kills_once() {
        let mut health = TankHealth::default();
        assert!(!health.take_damage(60.0));
        assert!(health.take_damage(40.0));
        assert!(health.is_dead());
        assert!(!health.take_damage(10.0));
    }

    #[test]
    fn test_defence_multiplier_halves_damage() {
        let mut health = TankHealth::default();
        health.set_defence_multiplier(2.0);
        health.take_damage(50.0);
        assert_eq!(health.current(), 75.0);
    }

    #[test]
    fn test_help_is_capped() {
        let mut health = TankHealth::default();
        health.take_damage(10.0);
        health.receive_help(20.0);
        assert_eq!(health.current(), 100.0);
    }

    #[test]
    fn test_reset_revives() {
        let mut health = TankHealth::default();
        health.take_damage(150.0);
        health.reset();
        assert!(!health.is_dead());
        assert_eq!(health.current(), 100.0);
    }

    #[test]
    fn test_health_color() {
        let mut health = TankHealth::default();
        assert_eq!(health.health_color(), Rgb::GREEN);
        health.take_damage(100.0);
        assert_eq!(health.health_color(), Rgb::RED);
    }

    #[test]
    fn test_shell_damage_falloff() {
        let shell = ShellExplosion::default();
        assert_eq!(shell.calculate_damage(0.0), 100.0);
        assert_eq!(shell.calculate_damage(2.5), 50.0);
        assert_eq!(shell.calculate_damage(5.0), 0.0);
        assert_eq!(shell.calculate_damage(8.0), 0.0);
    }
}
