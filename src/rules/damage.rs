//! Damage type identifiers
//!
//! The 13 standard damage types. Resistance bookkeeping lives in the
//! session's source-keyed grant maps; applying resistance halves the
//! incoming amount, rounding down.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Types of damage
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    /// Bludgeoning damage (maces, hammers)
    Bludgeoning,
    /// Piercing damage (arrows, spears)
    Piercing,
    /// Slashing damage (swords, claws)
    Slashing,
    /// Fire damage
    Fire,
    /// Cold/ice damage
    Cold,
    /// Lightning/electric damage
    Lightning,
    /// Acid damage
    Acid,
    /// Poison damage
    Poison,
    /// Necrotic/death damage
    Necrotic,
    /// Radiant/holy damage
    Radiant,
    /// Psychic/mental damage
    Psychic,
    /// Force/magic damage
    Force,
    /// Thunder/sonic damage
    Thunder,
}

impl FromStr for DamageType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bludgeoning" => Ok(DamageType::Bludgeoning),
            "piercing" => Ok(DamageType::Piercing),
            "slashing" => Ok(DamageType::Slashing),
            "fire" => Ok(DamageType::Fire),
            "cold" | "ice" => Ok(DamageType::Cold),
            "lightning" | "electric" => Ok(DamageType::Lightning),
            "acid" => Ok(DamageType::Acid),
            "poison" => Ok(DamageType::Poison),
            "necrotic" | "death" => Ok(DamageType::Necrotic),
            "radiant" | "holy" => Ok(DamageType::Radiant),
            "psychic" | "mental" => Ok(DamageType::Psychic),
            "force" | "magic" => Ok(DamageType::Force),
            "thunder" | "sonic" => Ok(DamageType::Thunder),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for DamageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DamageType::Bludgeoning => "bludgeoning",
            DamageType::Piercing => "piercing",
            DamageType::Slashing => "slashing",
            DamageType::Fire => "fire",
            DamageType::Cold => "cold",
            DamageType::Lightning => "lightning",
            DamageType::Acid => "acid",
            DamageType::Poison => "poison",
            DamageType::Necrotic => "necrotic",
            DamageType::Radiant => "radiant",
            DamageType::Psychic => "psychic",
            DamageType::Force => "force",
            DamageType::Thunder => "thunder",
        };
        write!(f, "{}", s)
    }
}
