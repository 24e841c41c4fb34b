//! Structured operation results
//!
//! Every action returns one of these payloads: the raw rolls, the computed
//! totals, and a human-readable narrative line. The roll/compute logic never
//! formats text itself; formatting happens here, at the edge.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::model::Condition;
use crate::rules::DamageType;

/// Mark natural 1s and 20s the way the table talk goes
pub(crate) fn mark_natural(roll: u32) -> String {
    if roll == 20 || roll == 1 {
        format!("nat {}", roll)
    } else {
        roll.to_string()
    }
}

pub(crate) fn signed(n: i32) -> String {
    if n >= 0 {
        format!("+{}", n)
    } else {
        n.to_string()
    }
}

/// Result of an ability check, saving throw or skill check
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    /// What was rolled, e.g. "STR save" or "stealth check"
    pub label: String,
    /// d20 results; two entries when rolled with advantage
    pub rolls: Vec<u32>,
    pub advantage: bool,
    pub modifier: i32,
    pub total: i32,
    pub text: String,
}

impl CheckOutcome {
    pub(crate) fn new(label: String, rolls: Vec<u32>, advantage: bool, modifier: i32) -> Self {
        let high = rolls.iter().copied().max().unwrap_or(1);
        let dice = rolls
            .iter()
            .map(|r| mark_natural(*r))
            .collect::<Vec<_>>()
            .join(" / ");
        let total = high as i32 + modifier;
        let text = format!(
            "{}{}: {} {} = {}",
            label,
            if advantage { " with advantage" } else { "" },
            dice,
            signed(modifier),
            total
        );
        Self {
            label,
            rolls,
            advantage,
            modifier,
            total,
            text,
        }
    }
}

/// Result of starting, ending or toggling rage
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RageOutcome {
    pub active: bool,
    pub used_charges: u32,
    pub max_charges: u32,
    /// User-facing notice, e.g. why the rage ended
    pub notice: Option<String>,
}

/// Result of a short or long rest
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestOutcome {
    pub hit_points: i32,
    pub hit_points_regained: i32,
    pub spent_hit_dice: u32,
}

/// Result of entering or leaving combat
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatOutcome {
    pub in_combat: bool,
    /// Initiative roll reported on entering combat; never stored
    pub initiative: Option<InitiativeRoll>,
    pub rage_ended: bool,
}

/// An initiative roll
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeRoll {
    pub roll: u32,
    pub modifier: i32,
    pub total: i32,
    pub text: String,
}

/// Result of starting a new turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub rage_ended: bool,
    pub notice: Option<String>,
}

/// Result of toggling reckless attack
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecklessOutcome {
    pub active: bool,
}

/// Result of taking damage
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageOutcome {
    pub amount: i32,
    /// Damage actually applied after resistance
    pub effective: i32,
    pub resisted: bool,
    pub hit_points: i32,
    pub unconscious: bool,
    pub notice: Option<String>,
}

/// Result of healing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealOutcome {
    pub amount: i32,
    /// Points actually restored after the max-hp cap
    pub healed: i32,
    pub hit_points: i32,
}

/// Result of using Relentless Endurance
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelentlessOutcome {
    pub hit_points: i32,
    pub notice: String,
}

/// Result of replacing the applied condition set
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionsOutcome {
    pub conditions: BTreeSet<Condition>,
    /// Whether the danger-sense save advantage is currently granted
    pub danger_sense: bool,
}

/// Result of resolving an attack.
///
/// Reports the numbers only; no hit/miss comparison against a target AC.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackOutcome {
    pub name: String,
    /// d20 to-hit results; two entries while reckless attack is active
    pub rolls: Vec<u32>,
    pub reckless: bool,
    pub to_hit_modifier: i32,
    /// Proficiency bonus applied to the to-hit roll, 0 if not proficient
    pub proficiency_bonus: i32,
    pub to_hit_total: i32,
    pub damage_roll: i32,
    pub damage_modifier: i32,
    pub rage_bonus: i32,
    /// Extra dice from a savage-attacks critical, 0 otherwise
    pub critical_bonus: i32,
    pub critical: bool,
    pub damage_total: i32,
    pub damage_type: DamageType,
    pub text: String,
}
