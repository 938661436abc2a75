/// Core types of the round/game lifecycle
use crate::types::SlotColor;

/// Phase the lifecycle executes on its next step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Lobby: wait until both seats are bound
    WaitingForPlayers,
    /// Spawn avatars and move the audience to the help group
    Initializing,
    /// Reset avatars, show `ROUND n` and wait the start delay
    RoundStarting,
    /// Control enabled until at most one avatar is left
    RoundPlaying,
    /// Score the round and show the result
    RoundEnding,
    /// Despawn everything and reset the session
    Teardown,
    /// The game received Stop and will not run again
    Stopped,
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GamePhase::WaitingForPlayers => "waiting for players",
            GamePhase::Initializing => "initializing",
            GamePhase::RoundStarting => "round starting",
            GamePhase::RoundPlaying => "round playing",
            GamePhase::RoundEnding => "round ending",
            GamePhase::Teardown => "teardown",
            GamePhase::Stopped => "stopped",
        };
        write!(f, "{}", name)
    }
}

/// Commands that can be sent to a running game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    /// Stop once the current suspension completes
    Stop,
}

/// Snapshot taken after a phase completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStatus {
    /// Phase that just ran
    pub phase: GamePhase,
    /// Phase the next step will run
    pub next_phase: GamePhase,
    /// Current round number (0 outside of a game)
    pub round: u32,
    /// Wins of the red and blue slots
    pub wins: [u32; 2],
    pub round_winner: Option<SlotColor>,
    pub game_winner: Option<SlotColor>,
    /// Text currently on the message display
    pub message: String,
}

impl GameStatus {
    pub fn wins_of(&self, color: SlotColor) -> u32 {
        self.wins[color.index()]
    }
}

/// Result of a single step of the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// A phase completed
    Advanced(GameStatus),
    /// The game stopped
    Stop,
}
