//! Data model
//!
//! Static character data (sheet + class/race/background rule tables) and the
//! mutable per-session state document. Static data is immutable for the
//! lifetime of a session; `SessionState` is mutated exclusively through the
//! session's operations and persisted whole after every mutation.
//!
//! All documents serialize camelCase to match the stored JSON shape.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::rules::{Ability, DamageType, GrantMap, Skill};

/// A single base ability score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityScore {
    pub base: i32,
}

/// One attack definition on the sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackDef {
    pub name: String,
    /// Ability used for to-hit and damage modifiers
    pub to_hit_stat: Ability,
    /// Weapon-type tags matched against class weapon proficiencies
    pub weapon_types: Vec<String>,
    /// Damage dice expression, e.g. "1d12"
    pub damage_dice: String,
    pub damage_type: DamageType,
    pub melee: bool,
}

/// Immutable character sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSheet {
    pub name: String,
    pub level: u32,
    pub max_hit_points: i32,
    pub stats: HashMap<Ability, AbilityScore>,
    pub attacks: Vec<AttackDef>,
}

/// One tier of the rage damage-bonus table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RageTier {
    pub min: u32,
    pub max: u32,
    pub bonus: i32,
}

/// Class rage feature: damage table plus what a rage grants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RageRules {
    pub damage_bonus_by_level: Vec<RageTier>,
    #[serde(default)]
    pub resistances: Vec<DamageType>,
    #[serde(default)]
    pub stat_advantages: Vec<Ability>,
    #[serde(default)]
    pub save_advantages: Vec<Ability>,
}

/// Danger sense: save advantages while not blinded/deafened/incapacitated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DangerSense {
    #[serde(default)]
    pub save_advantages: Vec<Ability>,
}

/// Class proficiencies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassProficiency {
    #[serde(default)]
    pub saves: Vec<Ability>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub weapons: Vec<String>,
}

/// Immutable class rule table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRules {
    pub name: String,
    /// Hit die size, e.g. 12 for a d12
    pub hit_die: u32,
    #[serde(default)]
    pub proficiency: ClassProficiency,
    pub rage: RageRules,
    #[serde(default)]
    pub danger_sense: Option<DangerSense>,
}

/// A racial feature with a stable identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceFeature {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Immutable race rule table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceRules {
    pub name: String,
    #[serde(default)]
    pub ability_bonuses: HashMap<Ability, i32>,
    #[serde(default)]
    pub features: Vec<RaceFeature>,
}

impl RaceRules {
    /// Whether the race carries a feature with the given stable id
    pub fn has_feature(&self, id: &str) -> bool {
        self.features.iter().any(|f| f.id == id)
    }
}

/// Background proficiencies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackgroundProficiency {
    #[serde(default)]
    pub skills: Vec<Skill>,
}

/// Immutable background rule table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundRules {
    pub name: String,
    #[serde(default)]
    pub proficiency: BackgroundProficiency,
}

/// Condition identifiers that can be applied to the character
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Blinded,
    Charmed,
    Deafened,
    Exhaustion,
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,
}

/// Rage resource state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RageState {
    pub active: bool,
    pub used_charges: u32,
}

/// Reckless attack per-turn toggle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecklessState {
    pub active: bool,
}

/// Combat mode and per-turn flags.
///
/// The per-turn flags are only meaningful while `in_combat` is true; stale
/// values outside combat are tolerated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatFlags {
    pub in_combat: bool,
    pub attack_last_round: bool,
    pub damage_last_round: bool,
    pub bonus_action: bool,
}

/// Mutable per-session state, the single source of truth for dynamic data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub hit_points: i32,
    pub spent_hit_dice: u32,
    pub conditions: BTreeSet<Condition>,
    pub relentless_endurance_used: bool,
    pub rage: RageState,
    pub reckless_attack: RecklessState,
    pub combat: CombatFlags,
    pub stat_advantages: GrantMap<Ability>,
    pub save_advantages: GrantMap<Ability>,
    pub skill_advantages: GrantMap<Skill>,
    pub resistance: GrantMap<DamageType>,
}

impl SessionState {
    /// Pristine state for a freshly created character
    pub fn fresh(sheet: &CharacterSheet) -> Self {
        Self {
            hit_points: sheet.max_hit_points,
            spent_hit_dice: 0,
            conditions: BTreeSet::new(),
            relentless_endurance_used: false,
            rage: RageState::default(),
            reckless_attack: RecklessState::default(),
            combat: CombatFlags::default(),
            stat_advantages: GrantMap::new(),
            save_advantages: GrantMap::new(),
            skill_advantages: GrantMap::new(),
            resistance: GrantMap::new(),
        }
    }
}

/// Static data bundle for one character
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterData {
    pub character: CharacterSheet,
    pub cls: ClassRules,
    pub race: RaceRules,
    pub background: BackgroundRules,
}

/// Full load bundle: static data plus the mutable state document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetBundle {
    pub character: CharacterSheet,
    pub state: SessionState,
    pub cls: ClassRules,
    pub race: RaceRules,
    pub background: BackgroundRules,
}
