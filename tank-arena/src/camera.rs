//! Orthographic camera that keeps both tanks in frame
use std::sync::Arc;
use std::time::Duration;

use crate::ports::{Avatar, CameraRig};

/// Ground-plane camera rig with smoothed follow and zoom
///
/// Axes are world aligned: `x` is screen horizontal, `z` is screen vertical.
pub struct FramingCamera {
    /// Approximate time to refocus
    pub damp_time: f32,
    /// Space between the outermost target and the screen edge
    pub screen_edge_buffer: f32,
    pub min_size: f32,
    /// Viewport width / height
    pub aspect: f32,
    position: (f32, f32),
    size: f32,
    move_velocity: (f32, f32),
    zoom_speed: f32,
    targets: Vec<Arc<dyn Avatar>>,
}

impl std::fmt::Debug for FramingCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramingCamera")
            .field("position", &self.position)
            .field("size", &self.size)
            .field("targets", &self.targets.len())
            .finish()
    }
}

impl Default for FramingCamera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

impl FramingCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            damp_time: 0.2,
            screen_edge_buffer: 4.0,
            min_size: 6.5,
            aspect,
            position: (0.0, 0.0),
            size: 6.5,
            move_velocity: (0.0, 0.0),
            zoom_speed: 0.0,
            targets: Vec::new(),
        }
    }

    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Average position of the active targets, or the current position
    fn desired_position(&self) -> (f32, f32) {
        let active: Vec<_> = self
            .targets
            .iter()
            .filter(|target| target.is_active())
            .map(|target| target.pose())
            .collect();
        if active.is_empty() {
            return self.position;
        }
        let n = active.len() as f32;
        let x = active.iter().map(|pose| pose.x).sum::<f32>() / n;
        let z = active.iter().map(|pose| pose.z).sum::<f32>() / n;
        (x, z)
    }

    /// Orthographic size needed to fit every active target around `desired`
    fn required_size(&self, desired: (f32, f32)) -> f32 {
        let size = self
            .targets
            .iter()
            .filter(|target| target.is_active())
            .map(|target| {
                let pose = target.pose();
                let dx = (pose.x - desired.0).abs();
                let dz = (pose.z - desired.1).abs();
                dz.max(dx / self.aspect)
            })
            .fold(0.0_f32, f32::max);
        (size + self.screen_edge_buffer).max(self.min_size)
    }
}

impl CameraRig for FramingCamera {
    fn set_targets(&mut self, targets: Vec<Arc<dyn Avatar>>) {
        self.targets = targets;
    }

    fn clear_targets(&mut self) {
        self.targets.clear();
    }

    fn set_start_position_and_size(&mut self) {
        let desired = self.desired_position();
        self.position = desired;
        self.size = self.required_size(desired);
        self.move_velocity = (0.0, 0.0);
        self.zoom_speed = 0.0;
    }

    fn update(&mut self, dt: Duration) {
        let dt = dt.as_secs_f32();
        let desired = self.desired_position();
        self.position.0 = smooth_damp(
            self.position.0,
            desired.0,
            &mut self.move_velocity.0,
            self.damp_time,
            dt,
        );
        self.position.1 = smooth_damp(
            self.position.1,
            desired.1,
            &mut self.move_velocity.1,
            self.damp_time,
            dt,
        );
        let required = self.required_size(desired);
        self.size = smooth_damp(self.size, required, &mut self.zoom_speed, self.damp_time, dt);
    }
}

/// Critically damped spring step towards `target`
///
/// Never overshoots the target.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = (output - target) / dt.max(f32::EPSILON);
    }
    output
}
