//! Court lineup: six rotation slots and substitutions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::team::Player;

/// Number of players on court.
pub const COURT_SIZE: usize = 6;

/// Six court slots holding jersey numbers.
///
/// Slot `n` (1-based) serves when the team is in rotation `n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineup {
    slots: [Option<u16>; COURT_SIZE],
}

/// Map any rotation offset onto a 1-based slot number.
fn wrap(slot: usize) -> usize {
    (slot + COURT_SIZE - 1) % COURT_SIZE + 1
}

fn check_slot(slot: u8) -> Result<usize> {
    let slot = usize::from(slot);
    if (1..=COURT_SIZE).contains(&slot) {
        Ok(slot)
    } else {
        Err(Error::lineup(format!("slot {slot} is not between 1 and 6")))
    }
}

impl Lineup {
    /// An empty lineup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the court with the six lowest jersey numbers on the roster.
    #[must_use]
    pub fn from_roster(players: &[Player]) -> Self {
        let mut jerseys: Vec<u16> = players.iter().map(|p| p.jersey).collect();
        jerseys.sort_unstable();
        let mut lineup = Self::new();
        for (slot, jersey) in lineup.slots.iter_mut().zip(jerseys) {
            *slot = Some(jersey);
        }
        lineup
    }

    /// Slot values in order, slot 1 first.
    #[must_use]
    pub fn slots(&self) -> &[Option<u16>; COURT_SIZE] {
        &self.slots
    }

    /// Jersey in a 1-based slot. Out-of-range slots wrap around.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<u16> {
        self.slots[wrap(slot) - 1]
    }

    /// Put `jersey` in `slot`, or clear the slot with `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is out of range or the jersey is
    /// already on court in another slot.
    pub fn set(&mut self, slot: u8, jersey: Option<u16>) -> Result<()> {
        let slot = check_slot(slot)?;
        if let Some(j) = jersey {
            if let Some(other) = self.slot_of(j) {
                if other != slot {
                    return Err(Error::lineup(format!("#{j} is already in slot {other}")));
                }
            }
        }
        self.slots[slot - 1] = jersey;
        Ok(())
    }

    /// 1-based slot holding `jersey`.
    #[must_use]
    pub fn slot_of(&self, jersey: u16) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| *s == Some(jersey))
            .map(|i| i + 1)
    }

    /// Check whether `jersey` is on court.
    #[must_use]
    pub fn contains(&self, jersey: u16) -> bool {
        self.slot_of(jersey).is_some()
    }

    /// Check whether every slot is filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Jersey serving in `rotation`.
    #[must_use]
    pub fn server(&self, rotation: u8) -> Option<u16> {
        self.get(usize::from(rotation))
    }

    /// Blocker candidates for `rotation`: slots three, two and one ahead of
    /// the server.
    #[must_use]
    pub fn front_row(&self, rotation: u8) -> [Option<u16>; 3] {
        let r = usize::from(rotation);
        [self.get(r + 3), self.get(r + 2), self.get(r + 1)]
    }

    /// Replace `out` with `incoming`.
    ///
    /// `out` must be on court; `incoming` must be on the roster and not
    /// already on court. Returns the slot that changed.
    ///
    /// # Errors
    ///
    /// Returns a lineup error if any of those rules is broken.
    pub fn substitute(&mut self, out: u16, incoming: u16, roster: &[Player]) -> Result<usize> {
        let slot = self
            .slot_of(out)
            .ok_or_else(|| Error::lineup(format!("#{out} is not on court")))?;
        if self.contains(incoming) {
            return Err(Error::lineup(format!("#{incoming} is already on court")));
        }
        if !roster.iter().any(|p| p.jersey == incoming) {
            return Err(Error::lineup(format!("#{incoming} is not on the roster")));
        }
        self.slots[slot - 1] = Some(incoming);
        Ok(slot)
    }
}

impl fmt::Display for Lineup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match slot {
                Some(j) => write!(f, "P{}:#{}", i + 1, j)?,
                None => write!(f, "P{}:-", i + 1)?,
            }
        }
        Ok(())
    }
}
