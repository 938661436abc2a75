//! # tank-arena
//!
//! Round and session management for a two-player tank duel played by the
//! participants of an interactive stream.
//!
//! ## Overview
//!
//! A [`Game`] loops through the match lifecycle: it waits until two
//! participants have taken the red and blue seats, spawns their tanks, plays
//! rounds until one seat reaches the required number of round wins, then
//! tears everything down and opens the lobby again. The
//! [`ParticipantSession`] binds participants to seats and routes the
//! audience between groups.
//!
//! Rendering, physics and the streaming platform are collaborators behind
//! traits ([`Avatar`], [`AvatarSpawner`], [`CameraRig`], [`MessageDisplay`],
//! [`InteractiveSource`]). The crate ships an in-process platform
//! ([`LocalInteractive`]) and a Zenoh-backed one ([`ZenohInteractive`]).
//!
//! ## Key Features
//!
//! - Single-task lifecycle driven by `step()` with explicit suspension points
//! - Deterministic event registration owned by the session
//! - Viewer boosts with timed expiry
//! - Zenoh transport for remote participants
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tank_arena::{FramingCamera, Game, LocalInteractive};
//! # use tank_arena::{Avatar, AvatarSpawner, MessageDisplay, Pose, SlotInfo};
//! # struct Spawner;
//! # impl AvatarSpawner for Spawner {
//! #     fn spawn(&mut self, _: &SlotInfo, _: Pose) -> tank_arena::Result<Arc<dyn Avatar>> {
//! #         unimplemented!()
//! #     }
//! # }
//! # struct Display;
//! # impl MessageDisplay for Display {
//! #     fn set_text(&mut self, _: &str) {}
//! # }
//!
//! #[tokio::main]
//! async fn main() -> tank_arena::Result<()> {
//!     let platform = Arc::new(LocalInteractive::new());
//!     let mut game = Game::builder()
//!         .interactive(platform)
//!         .spawner(Spawner)
//!         .camera(FramingCamera::default())
//!         .display(Display)
//!         .num_rounds_to_win(3)
//!         .build()?;
//!     game.run().await
//! }
//! ```

// Module declarations
pub mod camera;
pub mod config;
pub mod constants;
pub mod error;
pub mod help;
pub mod interactive;
pub mod lifecycle;
pub mod name_generator;
pub mod network;
pub mod ports;
pub mod session;
pub mod slot;
pub mod tank;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use camera::FramingCamera;
pub use config::{GameConfig, RegistrationPolicy};
pub use error::{Result, TankError};
pub use help::{Boost, HelpManager};
pub use interactive::{EventHub, EventSubscription, InteractiveEvent, InteractiveSource, LocalInteractive};
pub use lifecycle::{Game, GameBuilder, GameCommand, GamePhase, GameStatus, StepResult};
pub use network::{ControlUpdate, HostUpdate, ParticipantClient, ZenohDisplay, ZenohInteractive};
pub use ports::{Avatar, AvatarSpawner, BoostStat, CameraRig, ControlInput, MessageDisplay, SlotInfo};
pub use session::{JoinState, ParticipantSession};
pub use slot::{PlayerSlot, Slots};
pub use tank::{ShellExplosion, TankHealth};
pub use types::{Participant, ParticipantId, Pose, Rgb, SlotColor};
