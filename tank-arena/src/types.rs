/// Core types for the tank-arena library
use crate::error::{Result, TankError};
use crate::name_generator;

/// Opaque participant identifier supplied by the interactive platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(pub u32);

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A viewer or player connected through the interactive platform
///
/// The name must be a valid single-chunk keyexpr:
/// - Non-empty UTF-8 string
/// - Cannot contain: / * $ ? # @
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Participant {
    id: ParticipantId,
    name: String,
}

impl Participant {
    /// Generate a participant with a random id and a human-readable name
    pub fn generate() -> Self {
        Participant {
            id: ParticipantId(rand::random()),
            name: name_generator::generate_random_name(),
        }
    }

    /// Create from a specific id and name
    /// Returns error if name contains invalid characters
    pub fn from_name(id: ParticipantId, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Participant { id, name })
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate that a string can be used as a participant name (single keyexpr chunk)
    fn validate(s: &str) -> Result<()> {
        if s.is_empty() {
            return Err(TankError::InvalidParticipantName(
                "Participant name cannot be empty".to_string(),
            ));
        }

        for ch in s.chars() {
            if matches!(ch, '/' | '*' | '$' | '?' | '#' | '@') {
                return Err(TankError::InvalidParticipantName(format!(
                    "Participant name '{}' contains invalid character '{}'",
                    s, ch
                )));
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// One of the two competitive seats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotColor {
    Red,
    Blue,
}

impl SlotColor {
    /// Both seats in player-number order
    pub const ALL: [SlotColor; 2] = [SlotColor::Red, SlotColor::Blue];

    /// Player number shown on screen (red is player 1)
    pub fn player_number(self) -> u8 {
        match self {
            SlotColor::Red => 1,
            SlotColor::Blue => 2,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            SlotColor::Red => 0,
            SlotColor::Blue => 1,
        }
    }

    pub fn other(self) -> SlotColor {
        match self {
            SlotColor::Red => SlotColor::Blue,
            SlotColor::Blue => SlotColor::Red,
        }
    }
}

impl std::fmt::Display for SlotColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotColor::Red => write!(f, "red"),
            SlotColor::Blue => write!(f, "blue"),
        }
    }
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Upper-case `RRGGBB` hex, as used in rich-text color tags
    pub fn to_html_rgb(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Linear interpolation from `self` (t = 0) to `other` (t = 1), t clamped
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Position and heading (degrees) on the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f32,
    pub z: f32,
    pub heading: f32,
}

impl Pose {
    pub const fn new(x: f32, z: f32, heading: f32) -> Self {
        Self { x, z, heading }
    }

    pub fn distance(&self, other: &Pose) -> f32 {
        ((self.x - other.x).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }
}
