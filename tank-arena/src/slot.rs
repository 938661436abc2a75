//! Player seats and the round/score bookkeeping built on them
use std::sync::Arc;

use crate::error::{Result, TankError};
use crate::ports::{Avatar, SlotInfo};
use crate::types::{Participant, Pose, Rgb, SlotColor};

/// One of the two competitive seats
pub struct PlayerSlot {
    color: SlotColor,
    tint: Rgb,
    spawn: Pose,
    colored_name: String,
    /// Rounds won in the current game
    pub(crate) wins: u32,
    pub(crate) participant: Option<Participant>,
    pub(crate) avatar: Option<Arc<dyn Avatar>>,
}

impl std::fmt::Debug for PlayerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSlot")
            .field("color", &self.color)
            .field("wins", &self.wins)
            .field("participant", &self.participant)
            .field("spawned", &self.avatar.is_some())
            .finish()
    }
}

impl PlayerSlot {
    pub fn new(color: SlotColor, tint: Rgb, spawn: Pose) -> Self {
        let colored_name = format!(
            "<color=#{}>PLAYER {}</color>",
            tint.to_html_rgb(),
            color.player_number()
        );
        Self {
            color,
            tint,
            spawn,
            colored_name,
            wins: 0,
            participant: None,
            avatar: None,
        }
    }

    pub fn color(&self) -> SlotColor {
        self.color
    }

    pub fn display_name(&self) -> String {
        format!("PLAYER {}", self.color.player_number())
    }

    /// Display name wrapped in a rich-text color tag of the slot's tint
    pub fn colored_name(&self) -> &str {
        &self.colored_name
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn participant(&self) -> Option<&Participant> {
        self.participant.as_ref()
    }

    pub fn spawn(&self) -> Pose {
        self.spawn
    }

    pub fn info(&self) -> SlotInfo {
        SlotInfo {
            color: self.color,
            player_number: self.color.player_number(),
            tint: self.tint,
        }
    }

    pub fn avatar(&self) -> Option<&Arc<dyn Avatar>> {
        self.avatar.as_ref()
    }

    /// Avatar of a phase that requires one; absence is a wiring error
    pub(crate) fn require_avatar(&self) -> Result<&Arc<dyn Avatar>> {
        self.avatar.as_ref().ok_or(TankError::MissingAvatar(self.color))
    }

    /// Spawned and not destroyed this round
    pub fn is_active(&self) -> bool {
        self.avatar.as_ref().is_some_and(|avatar| avatar.is_active())
    }
}

/// The red and blue seats, in player-number order
#[derive(Debug)]
pub struct Slots([PlayerSlot; 2]);

impl Slots {
    pub fn new(red: PlayerSlot, blue: PlayerSlot) -> Self {
        Slots([red, blue])
    }

    pub fn get(&self, color: SlotColor) -> &PlayerSlot {
        &self.0[color.index()]
    }

    pub fn get_mut(&mut self, color: SlotColor) -> &mut PlayerSlot {
        &mut self.0[color.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerSlot> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlayerSlot> {
        self.0.iter_mut()
    }

    pub fn active_count(&self) -> usize {
        self.iter().filter(|slot| slot.is_active()).count()
    }

    /// Round-end predicate: one or no avatar left standing
    pub fn one_actor_left(&self) -> bool {
        self.active_count() <= 1
    }

    /// Slot of the first active avatar; None means the round was a draw
    pub fn round_winner(&self) -> Option<SlotColor> {
        self.iter()
            .find(|slot| slot.is_active())
            .map(|slot| slot.color)
    }

    /// First slot whose wins reached the threshold
    pub fn game_winner(&self, num_rounds_to_win: u32) -> Option<SlotColor> {
        self.iter()
            .find(|slot| slot.wins == num_rounds_to_win)
            .map(|slot| slot.color)
    }

    /// Text shown while a round is ending
    pub fn end_message(
        &self,
        round_winner: Option<SlotColor>,
        game_winner: Option<SlotColor>,
    ) -> String {
        if let Some(winner) = game_winner {
            return format!("{} WINS THE GAME!", self.get(winner).colored_name());
        }

        let mut message = match round_winner {
            Some(winner) => format!("{} WINS THE ROUND!", self.get(winner).colored_name()),
            None => "DRAW!".to_string(),
        };
        message.push_str("\n\n\n\n");
        for slot in self.iter() {
            message.push_str(&format!("{}: {} WINS\n", slot.colored_name(), slot.wins));
        }
        message
    }
}
