//! Collaborator traits the game drives
//!
//! Rendering, physics and the UI live behind these traits. The game only
//! tells collaborators what to do at phase boundaries and never polls them
//! for anything but avatar liveness and pose.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::types::{ParticipantId, Pose, Rgb, SlotColor};

/// Input forwarded from a bound participant to their avatar
#[derive(Debug, Clone, PartialEq)]
pub enum ControlInput {
    /// Button went down (`pressed = true`) or up
    Button { control_id: String, pressed: bool },
    /// Joystick position, both axes in -1.0..=1.0
    Joystick { control_id: String, x: f32, y: f32 },
}

/// Avatar statistic a viewer boost can multiply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoostStat {
    Speed,
    Attack,
    Defence,
}

/// What the spawner needs to know about the slot it spawns for
#[derive(Debug, Clone, PartialEq)]
pub struct SlotInfo {
    pub color: SlotColor,
    pub player_number: u8,
    pub tint: Rgb,
}

/// Live tank instance bound to a slot for the duration of a match
///
/// Handles are shared with the camera, so all methods take `&self`.
pub trait Avatar: Send + Sync {
    /// Route input from this participant to the avatar (None unbinds)
    fn set_participant(&self, participant: Option<ParticipantId>);

    fn enable_control(&self);

    fn disable_control(&self);

    /// Move back to the spawn pose and restore full health
    fn reset(&self, spawn: Pose);

    /// False once the avatar has been destroyed in the current round
    fn is_active(&self) -> bool;

    fn pose(&self) -> Pose;

    fn apply_input(&self, input: ControlInput);

    fn increase_health(&self, amount: f32);

    fn set_multiplier(&self, stat: BoostStat, multiplier: f32);

    /// Remove the avatar from the world; the handle is dropped afterwards
    fn despawn(&self);
}

/// Creates avatars at a given pose
pub trait AvatarSpawner: Send {
    fn spawn(&mut self, slot: &SlotInfo, pose: Pose) -> Result<Arc<dyn Avatar>>;
}

/// Camera that keeps every active target in frame
pub trait CameraRig: Send {
    fn set_targets(&mut self, targets: Vec<Arc<dyn Avatar>>);

    fn clear_targets(&mut self);

    /// Snap position and zoom to the current targets without smoothing
    fn set_start_position_and_size(&mut self);

    /// Per-tick follow update while a round is playing
    fn update(&mut self, _dt: Duration) {}
}

/// On-screen overlay text
pub trait MessageDisplay: Send {
    fn set_text(&mut self, text: &str);
}
