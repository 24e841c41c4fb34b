//! Derived stats calculator
//!
//! Pure functions from static character data + level to effective ability
//! scores, modifiers, proficiency bonus, saving-throw and skill totals,
//! armor class and initiative.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;
use crate::model::{CharacterSheet, ClassRules, RaceRules};

/// The six ability scores
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Ability {
    #[serde(rename = "STR")]
    Str,
    #[serde(rename = "DEX")]
    Dex,
    #[serde(rename = "CON")]
    Con,
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "WIS")]
    Wis,
    #[serde(rename = "CHA")]
    Cha,
}

impl Ability {
    /// All six abilities in standard order
    pub fn all() -> &'static [Ability] {
        &[
            Ability::Str,
            Ability::Dex,
            Ability::Con,
            Ability::Int,
            Ability::Wis,
            Ability::Cha,
        ]
    }
}

impl FromStr for Ability {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STR" => Ok(Ability::Str),
            "DEX" => Ok(Ability::Dex),
            "CON" => Ok(Ability::Con),
            "INT" => Ok(Ability::Int),
            "WIS" => Ok(Ability::Wis),
            "CHA" => Ok(Ability::Cha),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Ability::Str => "STR",
            Ability::Dex => "DEX",
            Ability::Con => "CON",
            Ability::Int => "INT",
            Ability::Wis => "WIS",
            Ability::Cha => "CHA",
        };
        write!(f, "{}", s)
    }
}

/// The eighteen skills
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    /// The ability governing this skill (fixed mapping)
    pub fn ability(&self) -> Ability {
        match self {
            Skill::Acrobatics => Ability::Dex,
            Skill::AnimalHandling => Ability::Wis,
            Skill::Arcana => Ability::Int,
            Skill::Athletics => Ability::Str,
            Skill::Deception => Ability::Cha,
            Skill::History => Ability::Int,
            Skill::Insight => Ability::Wis,
            Skill::Intimidation => Ability::Cha,
            Skill::Investigation => Ability::Int,
            Skill::Medicine => Ability::Wis,
            Skill::Nature => Ability::Int,
            Skill::Perception => Ability::Wis,
            Skill::Performance => Ability::Cha,
            Skill::Persuasion => Ability::Cha,
            Skill::Religion => Ability::Int,
            Skill::SleightOfHand => Ability::Dex,
            Skill::Stealth => Ability::Dex,
            Skill::Survival => Ability::Wis,
        }
    }

    /// All eighteen skills
    pub fn all() -> &'static [Skill] {
        &[
            Skill::Acrobatics,
            Skill::AnimalHandling,
            Skill::Arcana,
            Skill::Athletics,
            Skill::Deception,
            Skill::History,
            Skill::Insight,
            Skill::Intimidation,
            Skill::Investigation,
            Skill::Medicine,
            Skill::Nature,
            Skill::Perception,
            Skill::Performance,
            Skill::Persuasion,
            Skill::Religion,
            Skill::SleightOfHand,
            Skill::Stealth,
            Skill::Survival,
        ]
    }
}

impl FromStr for Skill {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "acrobatics" => Ok(Skill::Acrobatics),
            "animalhandling" => Ok(Skill::AnimalHandling),
            "arcana" => Ok(Skill::Arcana),
            "athletics" => Ok(Skill::Athletics),
            "deception" => Ok(Skill::Deception),
            "history" => Ok(Skill::History),
            "insight" => Ok(Skill::Insight),
            "intimidation" => Ok(Skill::Intimidation),
            "investigation" => Ok(Skill::Investigation),
            "medicine" => Ok(Skill::Medicine),
            "nature" => Ok(Skill::Nature),
            "perception" => Ok(Skill::Perception),
            "performance" => Ok(Skill::Performance),
            "persuasion" => Ok(Skill::Persuasion),
            "religion" => Ok(Skill::Religion),
            "sleightofhand" => Ok(Skill::SleightOfHand),
            "stealth" => Ok(Skill::Stealth),
            "survival" => Ok(Skill::Survival),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Skill::Acrobatics => "acrobatics",
            Skill::AnimalHandling => "animalHandling",
            Skill::Arcana => "arcana",
            Skill::Athletics => "athletics",
            Skill::Deception => "deception",
            Skill::History => "history",
            Skill::Insight => "insight",
            Skill::Intimidation => "intimidation",
            Skill::Investigation => "investigation",
            Skill::Medicine => "medicine",
            Skill::Nature => "nature",
            Skill::Perception => "perception",
            Skill::Performance => "performance",
            Skill::Persuasion => "persuasion",
            Skill::Religion => "religion",
            Skill::SleightOfHand => "sleightOfHand",
            Skill::Stealth => "stealth",
            Skill::Survival => "survival",
        };
        write!(f, "{}", s)
    }
}

/// Proficiency bonus for a character level: ceil(level/4 + 1)
pub fn proficiency_bonus(level: u32) -> i32 {
    (level as i32 + 3) / 4 + 1
}

/// Effective ability score breakdown
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveAbility {
    pub base: i32,
    pub racial_bonus: i32,
    pub total: i32,
    pub modifier: i32,
    /// Proficiency bonus on saving throws, 0 when not save-proficient
    pub save_bonus: i32,
}

/// Compute the effective score, modifier and save bonus for one ability
pub fn effective_ability(
    sheet: &CharacterSheet,
    class: &ClassRules,
    race: &RaceRules,
    ability: Ability,
) -> Result<EffectiveAbility, EngineError> {
    let base = sheet
        .stats
        .get(&ability)
        .ok_or_else(|| EngineError::MissingRuleData(format!("no base score for {}", ability)))?
        .base;
    let racial_bonus = race.ability_bonuses.get(&ability).copied().unwrap_or(0);
    let total = base + racial_bonus;
    let save_bonus = if class.proficiency.saves.contains(&ability) {
        proficiency_bonus(sheet.level)
    } else {
        0
    };

    Ok(EffectiveAbility {
        base,
        racial_bonus,
        total,
        modifier: (total - 10).div_euclid(2),
        save_bonus,
    })
}

/// Effective skill modifier breakdown
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSkill {
    /// Modifier of the governing ability
    pub modifier: i32,
    /// Proficiency bonus from class proficiency, 0 if absent
    pub class_bonus: i32,
    /// Proficiency bonus from background proficiency, 0 if absent
    pub background_bonus: i32,
    pub total: i32,
}

/// Compute the total skill modifier. Class and background proficiency stack.
pub fn effective_skill(
    sheet: &CharacterSheet,
    class: &ClassRules,
    race: &RaceRules,
    background: &crate::model::BackgroundRules,
    skill: Skill,
) -> Result<EffectiveSkill, EngineError> {
    let modifier = effective_ability(sheet, class, race, skill.ability())?.modifier;
    let prof = proficiency_bonus(sheet.level);
    let class_bonus = if class.proficiency.skills.contains(&skill) {
        prof
    } else {
        0
    };
    let background_bonus = if background.proficiency.skills.contains(&skill) {
        prof
    } else {
        0
    };

    Ok(EffectiveSkill {
        modifier,
        class_bonus,
        background_bonus,
        total: modifier + class_bonus + background_bonus,
    })
}

/// Armor class: 10 + DEX modifier + CON modifier
pub fn armor_class(
    sheet: &CharacterSheet,
    class: &ClassRules,
    race: &RaceRules,
) -> Result<i32, EngineError> {
    let dex = effective_ability(sheet, class, race, Ability::Dex)?.modifier;
    let con = effective_ability(sheet, class, race, Ability::Con)?.modifier;
    Ok(10 + dex + con)
}

/// Initiative modifier: DEX modifier
pub fn initiative(
    sheet: &CharacterSheet,
    class: &ClassRules,
    race: &RaceRules,
) -> Result<i32, EngineError> {
    Ok(effective_ability(sheet, class, race, Ability::Dex)?.modifier)
}
