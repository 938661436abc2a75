//! Key expression types of an arena
//!
//! Every arena lives under one prefix:
//! - `<prefix>/participant/<id>/<name>`: liveliness token of a participant
//! - `<prefix>/button/<id>`: control input published by a participant
//! - `<prefix>/group/<id>`: group assignment published by the host
//! - `<prefix>/control/<control_id>`: control state published by the host
//! - `<prefix>/display`: message text published by the host

use zenoh::key_expr::KeyExpr;

use crate::error::{Result, TankError};
use crate::types::{Participant, ParticipantId};

const PARTICIPANT: &str = "participant";
const BUTTON: &str = "button";
const GROUP: &str = "group";
const CONTROL: &str = "control";
const DISPLAY: &str = "display";

fn to_keyexpr(keyexpr: String) -> Result<KeyExpr<'static>> {
    KeyExpr::try_from(keyexpr.clone())
        .map(KeyExpr::into_owned)
        .map_err(|e| TankError::InvalidKeyexpr(format!("{}: {}", keyexpr, e)))
}

/// Split `keyexpr` into the prefix and the `tail_len` chunks following `marker`
fn split_after<'a>(keyexpr: &'a str, marker: &str, tail_len: usize) -> Option<(String, Vec<&'a str>)> {
    let parts: Vec<&str> = keyexpr.split('/').collect();
    if parts.len() < tail_len + 2 {
        return None;
    }
    let marker_index = parts.len() - tail_len - 1;
    if parts[marker_index] != marker {
        return None;
    }
    Some((parts[..marker_index].join("/"), parts[marker_index + 1..].to_vec()))
}

fn parse_id(keyexpr: &str, chunk: &str) -> Result<ParticipantId> {
    chunk
        .parse()
        .map(ParticipantId)
        .map_err(|_| TankError::InvalidKeyexpr(format!("Invalid participant id in {}", keyexpr)))
}

/// Participant keyexpr - liveliness identity of one participant
///
/// Pattern: `<prefix>/participant/<id>/<name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantKeyexpr {
    prefix: String,
    participant: Participant,
}

impl ParticipantKeyexpr {
    pub fn new(prefix: &KeyExpr, participant: Participant) -> Self {
        Self {
            prefix: prefix.to_string(),
            participant,
        }
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Pattern matching every participant of an arena
    pub fn lookup(prefix: &KeyExpr) -> Result<KeyExpr<'static>> {
        to_keyexpr(format!("{}/{}/*/*", prefix, PARTICIPANT))
    }
}

impl TryFrom<KeyExpr<'_>> for ParticipantKeyexpr {
    type Error = TankError;

    fn try_from(keyexpr: KeyExpr<'_>) -> Result<Self> {
        let (prefix, tail) = split_after(keyexpr.as_str(), PARTICIPANT, 2).ok_or_else(|| {
            TankError::InvalidKeyexpr(format!("Invalid ParticipantKeyexpr pattern: {}", keyexpr))
        })?;
        let id = parse_id(keyexpr.as_str(), tail[0])?;
        let participant = Participant::from_name(id, tail[1])?;
        Ok(Self { prefix, participant })
    }
}

impl TryFrom<ParticipantKeyexpr> for KeyExpr<'static> {
    type Error = TankError;

    fn try_from(keyexpr: ParticipantKeyexpr) -> Result<Self> {
        to_keyexpr(format!(
            "{}/{}/{}/{}",
            keyexpr.prefix,
            PARTICIPANT,
            keyexpr.participant.id(),
            keyexpr.participant.name()
        ))
    }
}

/// Keyexpr addressed to one participant, or to all of them
///
/// Pattern: `<prefix>/<kind>/<id>` or `<prefix>/<kind>/*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantChannelKeyexpr {
    prefix: String,
    kind: ParticipantChannel,
    participant: Option<ParticipantId>,
}

/// Per-participant channels of an arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantChannel {
    /// Control input from the participant
    Button,
    /// Group assignment for the participant
    Group,
}

impl ParticipantChannel {
    fn as_str(self) -> &'static str {
        match self {
            ParticipantChannel::Button => BUTTON,
            ParticipantChannel::Group => GROUP,
        }
    }
}

impl ParticipantChannelKeyexpr {
    /// `None` addresses every participant (wildcard)
    pub fn new(prefix: &KeyExpr, kind: ParticipantChannel, participant: Option<ParticipantId>) -> Self {
        Self {
            prefix: prefix.to_string(),
            kind,
            participant,
        }
    }

    pub fn kind(&self) -> ParticipantChannel {
        self.kind
    }

    pub fn participant(&self) -> Option<ParticipantId> {
        self.participant
    }

    /// Parse a concrete keyexpr of the given channel
    pub fn parse(keyexpr: &KeyExpr<'_>, kind: ParticipantChannel) -> Result<Self> {
        let (prefix, tail) = split_after(keyexpr.as_str(), kind.as_str(), 1).ok_or_else(|| {
            TankError::InvalidKeyexpr(format!("Invalid {} keyexpr pattern: {}", kind.as_str(), keyexpr))
        })?;
        let participant = match tail[0] {
            "*" => None,
            chunk => Some(parse_id(keyexpr.as_str(), chunk)?),
        };
        Ok(Self {
            prefix,
            kind,
            participant,
        })
    }
}

impl TryFrom<ParticipantChannelKeyexpr> for KeyExpr<'static> {
    type Error = TankError;

    fn try_from(keyexpr: ParticipantChannelKeyexpr) -> Result<Self> {
        let target = keyexpr
            .participant
            .map_or_else(|| "*".to_string(), |id| id.to_string());
        to_keyexpr(format!("{}/{}/{}", keyexpr.prefix, keyexpr.kind.as_str(), target))
    }
}

/// Control keyexpr - state of one interactive control
///
/// Pattern: `<prefix>/control/<control_id>` or `<prefix>/control/*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlKeyexpr {
    prefix: String,
    control_id: Option<String>,
}

impl ControlKeyexpr {
    /// `None` matches every control
    pub fn new(prefix: &KeyExpr, control_id: Option<&str>) -> Self {
        Self {
            prefix: prefix.to_string(),
            control_id: control_id.map(str::to_string),
        }
    }

    pub fn control_id(&self) -> Option<&str> {
        self.control_id.as_deref()
    }
}

impl TryFrom<KeyExpr<'_>> for ControlKeyexpr {
    type Error = TankError;

    fn try_from(keyexpr: KeyExpr<'_>) -> Result<Self> {
        let (prefix, tail) = split_after(keyexpr.as_str(), CONTROL, 1).ok_or_else(|| {
            TankError::InvalidKeyexpr(format!("Invalid ControlKeyexpr pattern: {}", keyexpr))
        })?;
        let control_id = match tail[0] {
            "*" => None,
            chunk => Some(chunk.to_string()),
        };
        Ok(Self { prefix, control_id })
    }
}

impl TryFrom<ControlKeyexpr> for KeyExpr<'static> {
    type Error = TankError;

    fn try_from(keyexpr: ControlKeyexpr) -> Result<Self> {
        let control = keyexpr.control_id.as_deref().unwrap_or("*");
        to_keyexpr(format!("{}/{}/{}", keyexpr.prefix, CONTROL, control))
    }
}

/// Display keyexpr - `<prefix>/display`
pub fn display_keyexpr(prefix: &KeyExpr) -> Result<KeyExpr<'static>> {
    to_keyexpr(format!("{}/{}", prefix, DISPLAY))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix() -> KeyExpr<'static> {
        KeyExpr::try_from("tanks/arena").unwrap()
    }

    #[test]
    fn test_participant_keyexpr() {
        let alice = Participant::from_name(ParticipantId(42), "alice").unwrap();
        let keyexpr: KeyExpr = ParticipantKeyexpr::new(&prefix(), alice.clone())
            .try_into()
            .unwrap();
        assert_eq!(keyexpr.as_str(), "tanks/arena/participant/42/alice");

        let parsed = ParticipantKeyexpr::try_from(keyexpr).unwrap();
        assert_eq!(parsed.participant(), &alice);
        assert_eq!(parsed.prefix(), "tanks/arena");
    }

    #[test]
    fn test_participant_lookup() {
        let lookup = ParticipantKeyexpr::lookup(&prefix()).unwrap();
        assert_eq!(lookup.as_str(), "tanks/arena/participant/*/*");
    }

    #[test]
    fn test_participant_keyexpr_invalid() {
        let bad_id = KeyExpr::try_from("tanks/arena/participant/abc/alice").unwrap();
        assert!(ParticipantKeyexpr::try_from(bad_id).is_err());

        let wrong_marker = KeyExpr::try_from("tanks/arena/button/1/alice").unwrap();
        assert!(ParticipantKeyexpr::try_from(wrong_marker).is_err());
    }

    #[test]
    fn test_channel_keyexpr() {
        let button: KeyExpr = ParticipantChannelKeyexpr::new(
            &prefix(),
            ParticipantChannel::Button,
            Some(ParticipantId(7)),
        )
        .try_into()
        .unwrap();
        assert_eq!(button.as_str(), "tanks/arena/button/7");

        let parsed = ParticipantChannelKeyexpr::parse(&button, ParticipantChannel::Button).unwrap();
        assert_eq!(parsed.participant(), Some(ParticipantId(7)));
        assert!(ParticipantChannelKeyexpr::parse(&button, ParticipantChannel::Group).is_err());

        let all_groups: KeyExpr =
            ParticipantChannelKeyexpr::new(&prefix(), ParticipantChannel::Group, None)
                .try_into()
                .unwrap();
        assert_eq!(all_groups.as_str(), "tanks/arena/group/*");
    }

    #[test]
    fn test_control_keyexpr() {
        let keyexpr: KeyExpr = ControlKeyexpr::new(&prefix(), Some("joinPlayer1"))
            .try_into()
            .unwrap();
        assert_eq!(keyexpr.as_str(), "tanks/arena/control/joinPlayer1");
        let parsed = ControlKeyexpr::try_from(keyexpr).unwrap();
        assert_eq!(parsed.control_id(), Some("joinPlayer1"));

        let all: KeyExpr = ControlKeyexpr::new(&prefix(), None).try_into().unwrap();
        assert_eq!(all.as_str(), "tanks/arena/control/*");
    }

    #[test]
    fn test_display_keyexpr() {
        assert_eq!(display_keyexpr(&prefix()).unwrap().as_str(), "tanks/arena/display");
    }
}
