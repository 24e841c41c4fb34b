//! Dice rolling system
//!
//! Parses and rolls dice notation like "2d6+3", "1d20", "4d6-2".
//! Actual randomness sits behind the [`DieRoller`] trait so the rules engine
//! stays deterministic under test.

use std::collections::VecDeque;
use std::str::FromStr;

use rand::Rng;

/// Source of raw die rolls
pub trait DieRoller {
    /// Roll one die with the given number of sides, returning 1..=sides
    fn roll(&mut self, sides: u32) -> u32;
}

/// Production roller backed by the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomRoller;

impl DieRoller for RandomRoller {
    fn roll(&mut self, sides: u32) -> u32 {
        rand::rng().random_range(1..=sides)
    }
}

/// Roller that plays back a scripted sequence of results.
///
/// Intended for tests; panics when the sequence runs dry.
#[derive(Debug, Default, Clone)]
pub struct SequenceRoller {
    queue: VecDeque<u32>,
}

impl SequenceRoller {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            queue: rolls.into_iter().collect(),
        }
    }
}

impl DieRoller for SequenceRoller {
    fn roll(&mut self, _sides: u32) -> u32 {
        self.queue.pop_front().expect("roll sequence exhausted")
    }
}

/// Roll a single d20
pub fn roll_d20(roller: &mut dyn DieRoller) -> u32 {
    roller.roll(20)
}

/// Check if a d20 roll is a natural 20 (critical hit)
pub fn is_critical(roll: u32) -> bool {
    roll == 20
}

/// A parsed dice roll specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
    /// Modifier to add/subtract
    pub modifier: i32,
}

impl DiceRoll {
    /// Create a new dice roll
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self { count, sides, modifier }
    }

    /// Roll the dice and return the total
    pub fn roll(&self, roller: &mut dyn DieRoller) -> i32 {
        let mut total: i32 = 0;
        for _ in 0..self.count {
            total += roller.roll(self.sides) as i32;
        }
        total + self.modifier
    }

    /// Roll only the dice of the expression, ignoring its flat modifier.
    ///
    /// Used for critical-hit bonus dice, which re-roll the dice but not
    /// the modifier.
    pub fn roll_dice_only(&self, roller: &mut dyn DieRoller) -> i32 {
        let mut total: i32 = 0;
        for _ in 0..self.count {
            total += roller.roll(self.sides) as i32;
        }
        total
    }

    /// Get the minimum possible result
    pub fn min(&self) -> i32 {
        self.count as i32 + self.modifier
    }

    /// Get the maximum possible result
    pub fn max(&self) -> i32 {
        (self.count * self.sides) as i32 + self.modifier
    }
}

impl FromStr for DiceRoll {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}d{}{}", self.count, self.sides, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// Parse a dice notation string like "2d6+3"
pub fn parse_dice(notation: &str) -> Result<DiceRoll, String> {
    let notation = notation.trim().to_lowercase();

    // Find the 'd' separator
    let d_pos = notation.find('d').ok_or("Missing 'd' in dice notation")?;

    // Parse count (before 'd')
    let count_str = &notation[..d_pos];
    let count: u32 = if count_str.is_empty() {
        1 // "d6" means "1d6"
    } else {
        count_str.parse().map_err(|_| format!("Invalid dice count: {}", count_str))?
    };

    if count == 0 {
        return Err("Dice count must be at least 1".to_string());
    }

    // Parse sides and modifier (after 'd')
    let rest = &notation[d_pos + 1..];

    // Find modifier position
    let (sides_str, modifier) = if let Some(plus_pos) = rest.find('+') {
        let sides = &rest[..plus_pos];
        let mod_str = &rest[plus_pos + 1..];
        let modifier: i32 = mod_str.parse().map_err(|_| format!("Invalid modifier: {}", mod_str))?;
        (sides, modifier)
    } else if let Some(minus_pos) = rest.rfind('-') {
        // Use rfind to handle negative modifier
        if minus_pos == 0 {
            // No modifier, just sides
            (rest, 0)
        } else {
            let sides = &rest[..minus_pos];
            let mod_str = &rest[minus_pos..]; // includes the minus sign
            let modifier: i32 = mod_str.parse().map_err(|_| format!("Invalid modifier: {}", mod_str))?;
            (sides, modifier)
        }
    } else {
        (rest, 0)
    };

    let sides: u32 = sides_str.parse().map_err(|_| format!("Invalid die sides: {}", sides_str))?;

    if sides == 0 {
        return Err("Die sides must be at least 1".to_string());
    }

    Ok(DiceRoll { count, sides, modifier })
}
