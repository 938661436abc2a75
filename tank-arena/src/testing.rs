//! Recording collaborators for unit tests
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{Result, TankError};
use crate::ports::{Avatar, AvatarSpawner, BoostStat, CameraRig, ControlInput, MessageDisplay, SlotInfo};
use crate::types::{ParticipantId, Pose, SlotColor};

#[derive(Debug)]
pub(crate) struct MockAvatarState {
    pub pose: Pose,
    pub active: bool,
    pub control_enabled: bool,
    pub participant: Option<ParticipantId>,
    pub inputs: Vec<ControlInput>,
    pub health_received: f32,
    pub multipliers: HashMap<BoostStat, f32>,
    pub resets: usize,
    pub despawned: bool,
}

impl Default for MockAvatarState {
    fn default() -> Self {
        Self {
            pose: Pose::default(),
            active: true,
            control_enabled: false,
            participant: None,
            inputs: Vec::new(),
            health_received: 0.0,
            multipliers: HashMap::new(),
            resets: 0,
            despawned: false,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockAvatar {
    pub state: Mutex<MockAvatarState>,
}

impl MockAvatar {
    /// Simulate the tank being destroyed
    pub fn destroy(&self) {
        self.state.lock().unwrap().active = false;
    }

    pub fn multiplier(&self, stat: BoostStat) -> f32 {
        *self.state.lock().unwrap().multipliers.get(&stat).unwrap_or(&1.0)
    }
}

impl Avatar for MockAvatar {
    fn set_participant(&self, participant: Option<ParticipantId>) {
        self.state.lock().unwrap().participant = participant;
    }

    fn enable_control(&self) {
        self.state.lock().unwrap().control_enabled = true;
    }

    fn disable_control(&self) {
        self.state.lock().unwrap().control_enabled = false;
    }

    fn reset(&self, spawn: Pose) {
        let mut state = self.state.lock().unwrap();
        state.pose = spawn;
        state.active = true;
        state.resets += 1;
    }

    fn is_active(&self) -> bool {
        self.state.lock().unwrap().active
    }

    fn pose(&self) -> Pose {
        self.state.lock().unwrap().pose
    }

    fn apply_input(&self, input: ControlInput) {
        self.state.lock().unwrap().inputs.push(input);
    }

    fn increase_health(&self, amount: f32) {
        self.state.lock().unwrap().health_received += amount;
    }

    fn set_multiplier(&self, stat: BoostStat, multiplier: f32) {
        self.state.lock().unwrap().multipliers.insert(stat, multiplier);
    }

    fn despawn(&self) {
        let mut state = self.state.lock().unwrap();
        state.despawned = true;
        state.active = false;
    }
}

/// Spawner handing out `MockAvatar`s and remembering them
#[derive(Debug, Clone, Default)]
pub(crate) struct MockSpawner {
    pub spawned: Arc<Mutex<Vec<(SlotColor, Arc<MockAvatar>)>>>,
    pub fail: bool,
}

impl MockSpawner {
    /// Most recently spawned avatar of a slot
    pub fn avatar(&self, color: SlotColor) -> Arc<MockAvatar> {
        self.spawned
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(spawned_color, _)| *spawned_color == color)
            .map(|(_, avatar)| avatar.clone())
            .unwrap()
    }

    pub fn spawn_count(&self) -> usize {
        self.spawned.lock().unwrap().len()
    }
}

impl AvatarSpawner for MockSpawner {
    fn spawn(&mut self, slot: &SlotInfo, pose: Pose) -> Result<Arc<dyn Avatar>> {
        if self.fail {
            return Err(TankError::Spawn(format!("no prefab for {}", slot.color)));
        }
        let avatar = Arc::new(MockAvatar::default());
        avatar.state.lock().unwrap().pose = pose;
        self.spawned.lock().unwrap().push((slot.color, avatar.clone()));
        Ok(avatar as Arc<dyn Avatar>)
    }
}

/// Display keeping every text it was given
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingDisplay {
    pub texts: Arc<Mutex<Vec<String>>>,
}

impl RecordingDisplay {
    pub fn last(&self) -> String {
        self.texts.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn history(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

impl MessageDisplay for RecordingDisplay {
    fn set_text(&mut self, text: &str) {
        self.texts.lock().unwrap().push(text.to_string());
    }
}

#[derive(Debug, Default)]
pub(crate) struct CameraLog {
    pub targets: usize,
    pub snaps: usize,
    pub updates: usize,
}

/// Camera counting the calls it receives
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingCamera {
    pub log: Arc<Mutex<CameraLog>>,
}

impl CameraRig for RecordingCamera {
    fn set_targets(&mut self, targets: Vec<Arc<dyn Avatar>>) {
        self.log.lock().unwrap().targets = targets.len();
    }

    fn clear_targets(&mut self) {
        self.log.lock().unwrap().targets = 0;
    }

    fn set_start_position_and_size(&mut self) {
        self.log.lock().unwrap().snaps += 1;
    }

    fn update(&mut self, _dt: Duration) {
        self.log.lock().unwrap().updates += 1;
    }
}
