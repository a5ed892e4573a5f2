//! Rally events and the labels that drive the point state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::lineup::Lineup;

/// One logged step of a rally.
///
/// Scores, rotation and rally step are the values *before* the step was
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RallyEvent {
    /// Stable identifier.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Set the event belongs to, starting at 1.
    #[serde(default = "first_set")]
    pub set_number: u8,
    /// Rotation (1..=6) at the time of the event.
    pub rotation: u8,
    /// Our score.
    pub score_us: u32,
    /// Their score.
    pub score_them: u32,
    /// 0 when we serve, odd when they serve.
    pub rally_step: u32,
    /// Our players on court when the event was logged.
    #[serde(default)]
    pub lineup: Lineup,
    /// Serve touch, e.g. `"7:Ace"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touch_serve: Option<String>,
    /// Block touch, e.g. `"12:Block:Kill"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touch_block: Option<String>,
    /// Assisting blocker, e.g. `"4:Block:Assist"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touch_block_assist: Option<String>,
    /// First touch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touch_1: Option<String>,
    /// Second touch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touch_2: Option<String>,
    /// Third touch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touch_3: Option<String>,
    /// Side that won the rally, set on the event that ended it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<Side>,
}

fn first_set() -> u8 {
    1
}

impl RallyEvent {
    /// An event in the first set with no touches recorded.
    #[must_use]
    pub fn new(rotation: u8, score_us: u32, score_them: u32, rally_step: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            set_number: first_set(),
            rotation,
            score_us,
            score_them,
            rally_step,
            lineup: Lineup::new(),
            touch_serve: None,
            touch_block: None,
            touch_block_assist: None,
            touch_1: None,
            touch_2: None,
            touch_3: None,
            point: None,
        }
    }

    /// Recorded touches in wire order.
    pub fn touches(&self) -> impl Iterator<Item = &str> {
        [
            &self.touch_serve,
            &self.touch_block,
            &self.touch_block_assist,
            &self.touch_1,
            &self.touch_2,
            &self.touch_3,
        ]
        .into_iter()
        .filter_map(|t| t.as_deref())
    }
}

/// Which side of the net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Our team.
    Us,
    /// The opponent.
    Them,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Us => write!(f, "us"),
            Self::Them => write!(f, "them"),
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" | "we" => Ok(Self::Us),
            "them" | "they" => Ok(Self::Them),
            other => Err(Error::unknown_outcome("side", other)),
        }
    }
}

/// Where the point state machine is within a rally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RallyPhase {
    /// Waiting for the serve result.
    #[default]
    Serve,
    /// Ball is live on our side.
    Rally,
    /// Ball went over; waiting to see what the opponent did with it.
    ConfirmReturn,
}

impl RallyPhase {
    /// Lower-case name used in messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Serve => "serve",
            Self::Rally => "rally",
            Self::ConfirmReturn => "confirm-return",
        }
    }
}

impl fmt::Display for RallyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a label case-insensitively against `(label, value)` pairs.
fn parse_label<T: Copy>(kind: &'static str, s: &str, table: &[(&str, T)]) -> Result<T> {
    let wanted = s.trim();
    table
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(wanted))
        .map(|(_, value)| *value)
        .ok_or_else(|| Error::unknown_outcome(kind, wanted))
}

/// Result of a serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServeOutcome {
    /// Point for the serving side.
    Ace,
    /// Point for the receiving side.
    Error,
    /// Ball is in play.
    Return,
}

impl ServeOutcome {
    /// Label written into `touch_serve`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ace => "Ace",
            Self::Error => "Error",
            Self::Return => "Return",
        }
    }
}

impl FromStr for ServeOutcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_label(
            "serve result",
            s,
            &[("ace", Self::Ace), ("error", Self::Error), ("return", Self::Return)],
        )
    }
}

/// What the opponent did with a ball we sent over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnOutcome {
    /// They failed to return it; point for us.
    Error,
    /// They sent it back; rally continues.
    Return,
}

impl FromStr for ReturnOutcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_label(
            "return result",
            s,
            &[("error", Self::Error), ("return", Self::Return)],
        )
    }
}

/// Result of a block attempt at the net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockOutcome {
    /// Blocked back to the opponent's side; ball stays live there.
    Block,
    /// Stuff block for a point.
    Kill,
    /// Soft touch off the block; ball stays on our side.
    Tip,
    /// Joint stuff block with a second blocker for a point.
    Assist,
    /// Block fault (net touch, tooled off the block out of play).
    Error,
}

impl BlockOutcome {
    /// Label written into `touch_block`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Block => "Block",
            Self::Kill => "Block:Kill",
            Self::Tip => "Block:Tip",
            Self::Assist => "Block:Assist",
            Self::Error => "Block:Error",
        }
    }
}

impl FromStr for BlockOutcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s
            .strip_prefix("Block:")
            .or_else(|| s.strip_prefix("block:"))
            .unwrap_or(s);
        parse_label(
            "block result",
            s,
            &[
                ("block", Self::Block),
                ("kill", Self::Kill),
                ("tip", Self::Tip),
                ("assist", Self::Assist),
                ("error", Self::Error),
            ],
        )
    }
}

/// How a set of rally touches resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RallyResolution {
    /// A touch was an error; point for them.
    PointThem,
    /// A touch was a kill; point for us.
    PointUs,
    /// The ball went over the net.
    Over,
    /// Nothing decisive; the rally continues on our side.
    Continue,
}

/// Classify free-text touches by substring.
///
/// Errors take precedence over kills, kills over an "Over".
#[must_use]
pub fn resolve_touches<'a, I>(touches: I) -> RallyResolution
where
    I: IntoIterator<Item = &'a str>,
{
    let touches: Vec<&str> = touches.into_iter().collect();
    let any = |needle: &str| touches.iter().any(|t| t.contains(needle));
    if any("Error") || any("Missed") {
        RallyResolution::PointThem
    } else if any("Kill") {
        RallyResolution::PointUs
    } else if any("Over") {
        RallyResolution::Over
    } else {
        RallyResolution::Continue
    }
}
