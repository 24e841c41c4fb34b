//! Attack/damage resolver
//!
//! Computes a to-hit roll and damage roll for one attack definition and
//! reports the numbers; whether the attack hits is for the table to decide.

use crate::error::EngineError;
use crate::rules::dice::{is_critical, roll_d20, DiceRoll, DieRoller};

use super::outcome::{mark_natural, signed};
use super::{AttackOutcome, Session};

/// Racial feature id that doubles crit damage dice on melee hits
const FEATURE_SAVAGE_ATTACKS: &str = "savage_attacks";

impl Session {
    /// Resolve an attack by name.
    ///
    /// Reckless attack grants advantage on the to-hit roll. Rage adds its
    /// flat damage bonus. A natural 20 on the kept die rolls the damage dice
    /// once more (dice only, not the flat modifier) when the race has savage
    /// attacks and the attack is melee. Marks the attacked-this-round flag
    /// whether or not the narrative hit lands.
    pub fn attack(
        &mut self,
        name: &str,
        roller: &mut dyn DieRoller,
    ) -> Result<AttackOutcome, EngineError> {
        if !self.state.combat.in_combat {
            return Err(EngineError::PreconditionFailed("not in combat".into()));
        }

        let attack = self
            .sheet
            .attacks
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| EngineError::MissingRuleData(format!("unknown attack: {}", name)))?
            .clone();

        let eff = self.effective_ability(attack.to_hit_stat)?;
        let proficient = attack
            .weapon_types
            .iter()
            .any(|t| self.class.proficiency.weapons.contains(t));
        let proficiency_bonus = if proficient {
            self.proficiency_bonus()
        } else {
            0
        };

        let reckless = self.state.reckless_attack.active;
        let mut rolls = vec![roll_d20(roller)];
        if reckless {
            rolls.push(roll_d20(roller));
        }
        let kept = rolls.iter().copied().max().unwrap_or(1);

        let dice: DiceRoll = attack
            .damage_dice
            .parse()
            .map_err(EngineError::MissingRuleData)?;
        let damage_roll = dice.roll(roller);

        let rage_bonus = if self.state.rage.active {
            self.rage_damage_bonus()
        } else {
            0
        };

        let critical =
            is_critical(kept) && attack.melee && self.race.has_feature(FEATURE_SAVAGE_ATTACKS);
        let critical_bonus = if critical {
            dice.roll_dice_only(roller)
        } else {
            0
        };

        let to_hit_total = kept as i32 + eff.modifier + proficiency_bonus;
        let damage_total = damage_roll + critical_bonus + eff.modifier + rage_bonus;

        let dice_text = rolls
            .iter()
            .map(|r| mark_natural(*r))
            .collect::<Vec<_>>()
            .join(" / ");
        let mut text = format!(
            "{}\nTo hit: d20{} ({}) {}{} = {}\nDamage: {} {}{} = {}",
            attack.name,
            if reckless { " with advantage" } else { "" },
            dice_text,
            signed(eff.modifier),
            if proficiency_bonus > 0 {
                format!(" {} (proficiency)", signed(proficiency_bonus))
            } else {
                String::new()
            },
            to_hit_total,
            damage_roll,
            signed(eff.modifier),
            if rage_bonus > 0 {
                format!(" {} (rage)", signed(rage_bonus))
            } else {
                String::new()
            },
            damage_total,
        );
        if critical {
            text.push_str(&format!("\n+ {} (Savage Attacks)", critical_bonus));
        }

        // Counts as the turn's attack no matter what it rolled
        self.state.combat.attack_last_round = true;

        Ok(AttackOutcome {
            name: attack.name,
            rolls,
            reckless,
            to_hit_modifier: eff.modifier,
            proficiency_bonus,
            to_hit_total,
            damage_roll,
            damage_modifier: eff.modifier,
            rage_bonus,
            critical_bonus,
            critical,
            damage_total,
            damage_type: attack.damage_type,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::dice::{RandomRoller, SequenceRoller};
    use crate::session::fixtures::sample_session;

    #[test]
    fn test_attack_to_hit_and_damage() {
        let mut session = sample_session();
        session.toggle_combat(&mut SequenceRoller::new([10])).unwrap();

        // d20 = 12, damage d12 = 7
        let mut roller = SequenceRoller::new([12, 7]);
        let outcome = session.attack("Greataxe", &mut roller).unwrap();

        assert_eq!(outcome.rolls, vec![12]);
        assert_eq!(outcome.to_hit_modifier, 4);
        assert_eq!(outcome.proficiency_bonus, 3);
        assert_eq!(outcome.to_hit_total, 19); // 12 + 4 + 3
        assert_eq!(outcome.damage_total, 11); // 7 + 4
        assert!(!outcome.critical);
        assert!(session.state().combat.attack_last_round);
    }

    #[test]
    fn test_reckless_attack_rolls_two_d20_keeps_highest() {
        let mut session = sample_session();
        session.toggle_combat(&mut RandomRoller).unwrap();
        session.toggle_reckless_attack().unwrap();

        // d20s = 6 and 15, damage = 3
        let mut roller = SequenceRoller::new([6, 15, 3]);
        let outcome = session.attack("Greataxe", &mut roller).unwrap();

        assert!(outcome.reckless);
        assert_eq!(outcome.rolls, vec![6, 15]);
        assert_eq!(outcome.to_hit_total, 22); // 15 + 4 + 3
    }

    #[test]
    fn test_rage_bonus_applies_while_raging() {
        let mut session = sample_session();
        session.toggle_combat(&mut RandomRoller).unwrap();
        session.toggle_rage().unwrap();

        let mut roller = SequenceRoller::new([10, 5]);
        let outcome = session.attack("Greataxe", &mut roller).unwrap();
        assert_eq!(outcome.rage_bonus, 2); // level 5 tier
        assert_eq!(outcome.damage_total, 11); // 5 + 4 + 2
    }

    #[test]
    fn test_savage_attacks_crit_doubles_dice_not_modifier() {
        let mut session = sample_session();
        session.toggle_combat(&mut RandomRoller).unwrap();

        // nat 20, damage die 8, crit die 6
        let mut roller = SequenceRoller::new([20, 8, 6]);
        let outcome = session.attack("Greataxe", &mut roller).unwrap();

        assert!(outcome.critical);
        assert_eq!(outcome.critical_bonus, 6);
        // 8 + 6 dice, ability modifier added once
        assert_eq!(outcome.damage_total, 18);
        assert!(outcome.text.contains("Savage Attacks"));
    }

    #[test]
    fn test_ranged_attack_never_savage_crits() {
        let mut session = sample_session();
        session.toggle_combat(&mut RandomRoller).unwrap();

        let mut roller = SequenceRoller::new([20, 4]);
        let outcome = session.attack("Javelin", &mut roller).unwrap();
        assert!(!outcome.critical);
        assert_eq!(outcome.critical_bonus, 0);
    }

    #[test]
    fn test_reckless_crit_uses_kept_die() {
        let mut session = sample_session();
        session.toggle_combat(&mut RandomRoller).unwrap();
        session.toggle_reckless_attack().unwrap();

        // Low die first, nat 20 second: the kept die crits
        let mut roller = SequenceRoller::new([3, 20, 8, 5]);
        let outcome = session.attack("Greataxe", &mut roller).unwrap();
        assert!(outcome.critical);
        assert_eq!(outcome.critical_bonus, 5);
    }

    #[test]
    fn test_unknown_attack() {
        let mut session = sample_session();
        session.toggle_combat(&mut RandomRoller).unwrap();
        let err = session.attack("Ballista", &mut RandomRoller).unwrap_err();
        assert!(matches!(err, EngineError::MissingRuleData(_)));
    }

    #[test]
    fn test_attack_requires_combat() {
        let mut session = sample_session();
        let err = session.attack("Greataxe", &mut RandomRoller).unwrap_err();
        assert!(matches!(err, EngineError::PreconditionFailed(_)));
    }
}
