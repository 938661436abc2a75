//! Group and control identifiers shared with the interactive platform

/// Group every participant lands in outside of a match
pub const GROUP_DEFAULT: &str = "default";
/// Lobby group showing the join buttons
pub const GROUP_START: &str = "start";
/// Group of the two bound players
pub const GROUP_CONTROLS: &str = "controls";
/// Audience group that can give help during a match
pub const GROUP_HELP: &str = "giveHelp";

pub const CONTROL_FORWARD: &str = "forward";
pub const CONTROL_LEFT: &str = "left";
pub const CONTROL_BACK: &str = "back";
pub const CONTROL_RIGHT: &str = "right";
pub const CONTROL_FIRE: &str = "fire";
pub const CONTROL_JOYSTICK: &str = "joystick";

pub const CONTROL_P1_JOIN: &str = "joinPlayer1";
pub const CONTROL_P2_JOIN: &str = "joinPlayer2";
pub const CONTROL_STATUS: &str = "statusUpdate";

pub const CONTROL_HELP_RED: &str = "helpRed";
pub const CONTROL_HELP_BLUE: &str = "helpBlue";
pub const CONTROL_VIEWER_UPDATE: &str = "viewerStatus";
pub const CONTROL_PLAYER_UPDATE: &str = "playerStatus";

/// Controls forwarded to the avatar of the participant who pressed them
pub const AVATAR_CONTROLS: &[&str] = &[
    CONTROL_FORWARD,
    CONTROL_LEFT,
    CONTROL_BACK,
    CONTROL_RIGHT,
    CONTROL_FIRE,
    CONTROL_JOYSTICK,
];
