//! Rules engine building blocks
//!
//! - Dice rolling and notation parsing
//! - Derived stats (modifiers, proficiency, saves, skills, AC, initiative)
//! - Source-keyed advantage/resistance aggregation
//! - Damage type identifiers

pub mod advantage;
pub mod damage;
pub mod dice;
pub mod stats;

pub use advantage::GrantMap;
pub use damage::DamageType;
pub use dice::{DiceRoll, DieRoller, RandomRoller, SequenceRoller};
pub use stats::{proficiency_bonus, Ability, Skill};
