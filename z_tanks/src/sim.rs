//! Headless tank simulation used by the terminal host
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use rand::Rng;
use tank_arena::constants::{
    CONTROL_BACK, CONTROL_FIRE, CONTROL_FORWARD, CONTROL_JOYSTICK, CONTROL_LEFT, CONTROL_RIGHT,
};
use tank_arena::{
    Avatar, AvatarSpawner, BoostStat, ControlInput, ParticipantId, Pose, ShellExplosion, SlotColor,
    SlotInfo, TankHealth,
};

/// Units per second at full throttle
const SPEED: f32 = 12.0;
/// Degrees per second at full turn
const TURN_RATE: f32 = 180.0;
/// Distance ahead of the tank where a shell lands
const SHELL_RANGE: f32 = 15.0;
/// Random error of the landing distance
const SHELL_SPREAD: f32 = 2.0;

#[derive(Debug)]
struct TankState {
    pose: Pose,
    health: TankHealth,
    active: bool,
    control_enabled: bool,
    participant: Option<ParticipantId>,
    throttle: f32,
    turn: f32,
    multipliers: HashMap<BoostStat, f32>,
}

impl TankState {
    fn multiplier(&self, stat: BoostStat) -> f32 {
        self.multipliers.get(&stat).copied().unwrap_or(1.0)
    }
}

/// One simulated tank
#[derive(Debug)]
pub struct SimTank {
    color: SlotColor,
    arena: Weak<SimArena>,
    state: Mutex<TankState>,
}

impl SimTank {
    fn lock(&self) -> MutexGuard<'_, TankState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn color(&self) -> SlotColor {
        self.color
    }

    pub fn health(&self) -> f32 {
        self.lock().health.current()
    }

    fn advance(&self, dt: f32) {
        let mut state = self.lock();
        if !state.active || !state.control_enabled {
            return;
        }
        let speed = SPEED * state.multiplier(BoostStat::Speed);
        state.pose.heading = (state.pose.heading + state.turn * TURN_RATE * dt).rem_euclid(360.0);
        let heading = state.pose.heading.to_radians();
        state.pose.x += heading.sin() * state.throttle * speed * dt;
        state.pose.z += heading.cos() * state.throttle * speed * dt;
    }

    /// Returns true when this hit destroyed the tank
    fn take_damage(&self, amount: f32) -> bool {
        let mut state = self.lock();
        if !state.active {
            return false;
        }
        let killed = state.health.take_damage(amount);
        if killed {
            state.active = false;
        }
        killed
    }

    fn fire(&self) {
        let (origin, attack) = {
            let state = self.lock();
            if !state.active || !state.control_enabled {
                return;
            }
            (state.pose, state.multiplier(BoostStat::Attack))
        };
        if let Some(arena) = self.arena.upgrade() {
            arena.explode(self, origin, attack);
        }
    }
}

impl Avatar for SimTank {
    fn set_participant(&self, participant: Option<ParticipantId>) {
        self.lock().participant = participant;
    }

    fn enable_control(&self) {
        self.lock().control_enabled = true;
    }

    fn disable_control(&self) {
        let mut state = self.lock();
        state.control_enabled = false;
        state.throttle = 0.0;
        state.turn = 0.0;
    }

    fn reset(&self, spawn: Pose) {
        let mut state = self.lock();
        state.pose = spawn;
        state.health.reset();
        state.active = true;
    }

    fn is_active(&self) -> bool {
        self.lock().active
    }

    fn pose(&self) -> Pose {
        self.lock().pose
    }

    fn apply_input(&self, input: ControlInput) {
        match input {
            ControlInput::Button { control_id, pressed } => {
                let amount = if pressed { 1.0 } else { 0.0 };
                match control_id.as_str() {
                    CONTROL_FORWARD => self.lock().throttle = amount,
                    CONTROL_BACK => self.lock().throttle = -amount,
                    CONTROL_LEFT => self.lock().turn = -amount,
                    CONTROL_RIGHT => self.lock().turn = amount,
                    CONTROL_FIRE if pressed => self.fire(),
                    _ => {}
                }
            }
            ControlInput::Joystick { control_id, x, y } if control_id == CONTROL_JOYSTICK => {
                let mut state = self.lock();
                state.turn = x.clamp(-1.0, 1.0);
                state.throttle = y.clamp(-1.0, 1.0);
            }
            ControlInput::Joystick { .. } => {}
        }
    }

    fn increase_health(&self, amount: f32) {
        self.lock().health.receive_help(amount);
    }

    fn set_multiplier(&self, stat: BoostStat, multiplier: f32) {
        let mut state = self.lock();
        state.multipliers.insert(stat, multiplier);
        if stat == BoostStat::Defence {
            state.health.set_defence_multiplier(multiplier);
        }
    }

    fn despawn(&self) {
        let mut state = self.lock();
        state.active = false;
        state.control_enabled = false;
    }
}

/// World holding the spawned tanks
#[derive(Debug, Default)]
pub struct SimArena {
    tanks: Mutex<Vec<Weak<SimTank>>>,
    shell: ShellExplosion,
}

impl SimArena {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn tanks(&self) -> Vec<Arc<SimTank>> {
        let mut tanks = self.tanks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tanks.retain(|tank| tank.strong_count() > 0);
        tanks.iter().filter_map(Weak::upgrade).collect()
    }

    /// Tanks currently in the world
    pub fn live_tanks(&self) -> Vec<Arc<SimTank>> {
        self.tanks()
            .into_iter()
            .filter(|tank| tank.is_active())
            .collect()
    }

    /// Move every tank by `dt`
    pub fn tick(&self, dt: Duration) {
        for tank in self.tanks() {
            tank.advance(dt.as_secs_f32());
        }
    }

    /// Move tanks at a fixed rate; runs until the task is aborted
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.tick(interval);
        }
    }

    fn explode(&self, shooter: &SimTank, origin: Pose, attack: f32) {
        let range = SHELL_RANGE + rand::rng().random_range(-SHELL_SPREAD..=SHELL_SPREAD);
        let heading = origin.heading.to_radians();
        let impact = Pose::new(
            origin.x + heading.sin() * range,
            origin.z + heading.cos() * range,
            0.0,
        );

        for tank in self.tanks() {
            if std::ptr::eq(tank.as_ref(), shooter) {
                continue;
            }
            let damage = self.shell.calculate_damage(impact.distance(&tank.pose())) * attack;
            if damage > 0.0 && tank.take_damage(damage) {
                tracing::info!("{} tank destroyed by {} tank", tank.color(), shooter.color());
            }
        }
    }
}

/// Spawns `SimTank`s into a shared arena
#[derive(Debug, Clone)]
pub struct SimSpawner {
    arena: Arc<SimArena>,
}

impl SimSpawner {
    pub fn new(arena: Arc<SimArena>) -> Self {
        Self { arena }
    }
}

impl AvatarSpawner for SimSpawner {
    fn spawn(&mut self, slot: &SlotInfo, pose: Pose) -> tank_arena::Result<Arc<dyn Avatar>> {
        let tank = Arc::new(SimTank {
            color: slot.color,
            arena: Arc::downgrade(&self.arena),
            state: Mutex::new(TankState {
                pose,
                health: TankHealth::default(),
                active: true,
                control_enabled: false,
                participant: None,
                throttle: 0.0,
                turn: 0.0,
                multipliers: HashMap::new(),
            }),
        });
        self.arena
            .tanks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::downgrade(&tank));
        tracing::debug!("Spawned {} tank at ({:.1}, {:.1})", slot.color, pose.x, pose.z);
        Ok(tank as Arc<dyn Avatar>)
    }
}
