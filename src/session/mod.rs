//! Character session controller
//!
//! A [`Session`] owns the mutable [`SessionState`] for one character plus the
//! immutable sheet and rule tables, and exposes every player action as a
//! method. Mutations are all-or-nothing: precondition checks happen before
//! any state is touched, so a returned error leaves the state as it was.
//!
//! Dice-consuming operations take a [`DieRoller`] so the whole engine is
//! deterministic under test.

mod attack;
mod combat;
pub mod outcome;
mod resources;

pub use outcome::*;
pub use resources::max_rage_charges;

use std::collections::BTreeSet;

use crate::error::EngineError;
use crate::model::{
    BackgroundRules, CharacterData, CharacterSheet, ClassRules, Condition, RaceRules, SessionState,
    SheetBundle,
};
use crate::rules::dice::{roll_d20, DieRoller};
use crate::rules::stats::{self, Ability, EffectiveAbility, EffectiveSkill, Skill};

/// Source key for grants made by an active rage
pub const SOURCE_RAGE: &str = "rage";
/// Source key for the danger-sense save advantage
pub const SOURCE_DANGER_SENSE: &str = "dangerSense";

/// Conditions that suppress danger sense
const DANGER_SENSE_BLOCKERS: [Condition; 3] = [
    Condition::Blinded,
    Condition::Deafened,
    Condition::Incapacitated,
];

/// One character's live session: immutable rule data plus mutable state
pub struct Session {
    sheet: CharacterSheet,
    class: ClassRules,
    race: RaceRules,
    background: BackgroundRules,
    state: SessionState,
}

impl Session {
    /// Build a session from a load bundle
    pub fn new(bundle: SheetBundle) -> Self {
        let mut session = Self {
            sheet: bundle.character,
            class: bundle.cls,
            race: bundle.race,
            background: bundle.background,
            state: bundle.state,
        };
        // Grants must reflect the current condition set from the start
        session.refresh_danger_sense();
        session
    }

    /// Build a session from static data and a state document
    pub fn from_parts(data: CharacterData, state: SessionState) -> Self {
        Self::new(SheetBundle {
            character: data.character,
            state,
            cls: data.cls,
            race: data.race,
            background: data.background,
        })
    }

    pub fn sheet(&self) -> &CharacterSheet {
        &self.sheet
    }

    pub fn class(&self) -> &ClassRules {
        &self.class
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Snapshot of the full bundle, as served to clients on load
    pub fn bundle(&self) -> SheetBundle {
        SheetBundle {
            character: self.sheet.clone(),
            state: self.state.clone(),
            cls: self.class.clone(),
            race: self.race.clone(),
            background: self.background.clone(),
        }
    }

    // ---- Derived stats (read-only) ----

    pub fn proficiency_bonus(&self) -> i32 {
        stats::proficiency_bonus(self.sheet.level)
    }

    pub fn effective_ability(&self, ability: Ability) -> Result<EffectiveAbility, EngineError> {
        stats::effective_ability(&self.sheet, &self.class, &self.race, ability)
    }

    pub fn effective_skill(&self, skill: Skill) -> Result<EffectiveSkill, EngineError> {
        stats::effective_skill(&self.sheet, &self.class, &self.race, &self.background, skill)
    }

    pub fn armor_class(&self) -> Result<i32, EngineError> {
        stats::armor_class(&self.sheet, &self.class, &self.race)
    }

    pub fn initiative(&self) -> Result<i32, EngineError> {
        stats::initiative(&self.sheet, &self.class, &self.race)
    }

    // ---- Checks (read-only rolls) ----

    /// Roll an ability check, with advantage if any source grants it
    pub fn ability_check(
        &self,
        ability: Ability,
        roller: &mut dyn DieRoller,
    ) -> Result<CheckOutcome, EngineError> {
        let eff = self.effective_ability(ability)?;
        let advantage = self.state.stat_advantages.granted(&ability);
        let rolls = d20s(roller, advantage);
        Ok(CheckOutcome::new(
            format!("{} check", ability),
            rolls,
            advantage,
            eff.modifier,
        ))
    }

    /// Roll a saving throw: ability modifier plus save proficiency
    pub fn saving_throw(
        &self,
        ability: Ability,
        roller: &mut dyn DieRoller,
    ) -> Result<CheckOutcome, EngineError> {
        let eff = self.effective_ability(ability)?;
        let advantage = self.state.save_advantages.granted(&ability);
        let rolls = d20s(roller, advantage);
        Ok(CheckOutcome::new(
            format!("{} save", ability),
            rolls,
            advantage,
            eff.modifier + eff.save_bonus,
        ))
    }

    /// Roll a skill check using the full stacked skill modifier
    pub fn skill_check(
        &self,
        skill: Skill,
        roller: &mut dyn DieRoller,
    ) -> Result<CheckOutcome, EngineError> {
        let eff = self.effective_skill(skill)?;
        let advantage = self.state.skill_advantages.granted(&skill);
        let rolls = d20s(roller, advantage);
        Ok(CheckOutcome::new(
            format!("{} check", skill),
            rolls,
            advantage,
            eff.total,
        ))
    }

    // ---- Conditions ----

    /// Replace the applied condition set and re-evaluate danger sense
    pub fn set_conditions(&mut self, conditions: BTreeSet<Condition>) -> ConditionsOutcome {
        self.state.conditions = conditions;
        self.refresh_danger_sense();
        ConditionsOutcome {
            conditions: self.state.conditions.clone(),
            danger_sense: self.state.save_advantages.has_source(SOURCE_DANGER_SENSE),
        }
    }

    /// Danger sense grants its save advantages unless a blocking condition
    /// (blinded, deafened, incapacitated) is applied
    fn refresh_danger_sense(&mut self) {
        let Some(danger_sense) = &self.class.danger_sense else {
            return;
        };
        let blocked = self
            .state
            .conditions
            .iter()
            .any(|c| DANGER_SENSE_BLOCKERS.contains(c));
        if blocked {
            self.state.save_advantages.revoke(SOURCE_DANGER_SENSE);
        } else {
            self.state
                .save_advantages
                .grant(SOURCE_DANGER_SENSE, danger_sense.save_advantages.iter().copied());
        }
    }
}

/// Roll one d20, or two when the roll has advantage
fn d20s(roller: &mut dyn DieRoller, advantage: bool) -> Vec<u32> {
    let mut rolls = vec![roll_d20(roller)];
    if advantage {
        rolls.push(roll_d20(roller));
    }
    rolls
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::dice::SequenceRoller;
    use fixtures::sample_session;

    #[test]
    fn test_ability_check_no_advantage() {
        let session = sample_session();
        let mut roller = SequenceRoller::new([13]);
        let outcome = session.ability_check(Ability::Str, &mut roller).unwrap();
        assert_eq!(outcome.rolls, vec![13]);
        assert!(!outcome.advantage);
        assert_eq!(outcome.total, 17); // 13 + STR mod 4
    }

    #[test]
    fn test_check_advantage_from_any_source() {
        let mut session = sample_session();
        session.start_rage().unwrap(); // grants STR stat advantage

        let mut roller = SequenceRoller::new([4, 18]);
        let outcome = session.ability_check(Ability::Str, &mut roller).unwrap();
        assert!(outcome.advantage);
        assert_eq!(outcome.rolls.len(), 2);
        assert_eq!(outcome.total, 22); // max(4, 18) + 4
    }

    #[test]
    fn test_saving_throw_adds_proficiency() {
        let session = sample_session();
        let mut roller = SequenceRoller::new([10, 10]);
        // Danger sense is suppressed for CON; STR save has rage advantage only
        // when raging, so a fresh session rolls a single die for CON.
        let outcome = session.saving_throw(Ability::Con, &mut roller).unwrap();
        assert_eq!(outcome.rolls, vec![10]);
        assert_eq!(outcome.modifier, 5); // CON mod 2 + prof 3
        assert_eq!(outcome.total, 15);
    }

    #[test]
    fn test_danger_sense_granted_and_blocked() {
        let mut session = sample_session();
        // Granted from the start for an unhindered character
        assert!(session.state().save_advantages.has_source(SOURCE_DANGER_SENSE));
        assert!(session.state().save_advantages.granted(&Ability::Dex));

        let outcome =
            session.set_conditions([Condition::Blinded].into_iter().collect());
        assert!(!outcome.danger_sense);
        assert!(!session.state().save_advantages.granted(&Ability::Dex));

        let outcome = session.set_conditions(BTreeSet::new());
        assert!(outcome.danger_sense);
        assert!(session.state().save_advantages.granted(&Ability::Dex));
    }

    #[test]
    fn test_skill_check_uses_stacked_modifier() {
        let session = sample_session();
        let mut roller = SequenceRoller::new([7]);
        let outcome = session.skill_check(Skill::Athletics, &mut roller).unwrap();
        assert_eq!(outcome.modifier, 10); // 4 + 3 + 3
        assert_eq!(outcome.total, 17);
        assert_eq!(outcome.label, "athletics check");
    }
}
