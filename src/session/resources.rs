//! Resource manager: rage charges, hit dice, relentless endurance
//!
//! Rage start/end drives the advantage/resistance grant maps under the
//! "rage" source key, so ending a rage removes exactly what it granted.

use crate::error::EngineError;
use crate::rules::dice::DieRoller;
use crate::rules::stats::Ability;

use super::{RageOutcome, RelentlessOutcome, RestOutcome, Session, SOURCE_RAGE};

/// Maximum rage charges for a level.
///
/// Polynomial approximation of the tiered table, reproduced exactly
/// (floor rounding included) for compatibility with stored data.
pub fn max_rage_charges(level: u32) -> u32 {
    let x = level as f64;
    (1.969 + 0.513 * x - 0.0331 * x * x + 0.001 * x * x * x).floor() as u32
}

impl Session {
    /// Flat rage damage bonus from the class's level-tier table.
    ///
    /// A level outside every tier yields 0.
    pub(crate) fn rage_damage_bonus(&self) -> i32 {
        let level = self.sheet.level;
        self.class
            .rage
            .damage_bonus_by_level
            .iter()
            .find(|tier| level >= tier.min && level <= tier.max)
            .map(|tier| tier.bonus)
            .unwrap_or(0)
    }

    /// Spend a rage charge and grant the class's rage effects
    pub fn start_rage(&mut self) -> Result<RageOutcome, EngineError> {
        let max = max_rage_charges(self.sheet.level);
        if max <= self.state.rage.used_charges {
            return Err(EngineError::ResourceExhausted(
                "all rage charges used".into(),
            ));
        }

        self.state.rage.active = true;
        self.state.rage.used_charges += 1;

        let rage = &self.class.rage;
        self.state
            .resistance
            .grant(SOURCE_RAGE, rage.resistances.iter().copied());
        self.state
            .stat_advantages
            .grant(SOURCE_RAGE, rage.stat_advantages.iter().copied());
        self.state
            .save_advantages
            .grant(SOURCE_RAGE, rage.save_advantages.iter().copied());

        Ok(RageOutcome {
            active: true,
            used_charges: self.state.rage.used_charges,
            max_charges: max,
            notice: Some("ENRAGED!".into()),
        })
    }

    /// End the rage and revoke everything it granted.
    ///
    /// The optional reason is a user-facing notice, not an error; ending an
    /// inactive rage is a harmless no-op.
    pub fn end_rage(&mut self, reason: Option<&str>) -> RageOutcome {
        self.state.rage.active = false;
        self.state.resistance.revoke(SOURCE_RAGE);
        self.state.stat_advantages.revoke(SOURCE_RAGE);
        self.state.save_advantages.revoke(SOURCE_RAGE);

        RageOutcome {
            active: false,
            used_charges: self.state.rage.used_charges,
            max_charges: max_rage_charges(self.sheet.level),
            notice: reason.map(str::to_string),
        }
    }

    /// End the rage if active, start it otherwise; consumes the turn's
    /// bonus action. A bonus action is only obtainable in combat.
    pub fn toggle_rage(&mut self) -> Result<RageOutcome, EngineError> {
        if !self.state.combat.in_combat {
            return Err(EngineError::PreconditionFailed("not in combat".into()));
        }

        let outcome = if self.state.rage.active {
            self.end_rage(Some("You ended rage."))
        } else {
            self.start_rage()?
        };
        self.state.combat.bonus_action = true;
        Ok(outcome)
    }

    /// Spend hit dice during a short rest.
    ///
    /// Each die heals its roll plus the CON modifier, which may be negative;
    /// no per-die minimum applies. Spending zero dice is allowed.
    pub fn short_rest(
        &mut self,
        dice: u32,
        roller: &mut dyn DieRoller,
    ) -> Result<RestOutcome, EngineError> {
        let available = self.sheet.level.saturating_sub(self.state.spent_hit_dice);
        if dice > available {
            return Err(EngineError::ResourceExhausted(format!(
                "only {} hit dice left",
                available
            )));
        }

        let con_mod = self.effective_ability(Ability::Con)?.modifier;
        let hit_die = self.class.hit_die;
        let mut regained = 0;
        for _ in 0..dice {
            regained += roller.roll(hit_die) as i32 + con_mod;
        }

        self.state.hit_points =
            (self.state.hit_points + regained).clamp(0, self.sheet.max_hit_points);
        self.state.spent_hit_dice += dice;

        Ok(RestOutcome {
            hit_points: self.state.hit_points,
            hit_points_regained: regained,
            spent_hit_dice: self.state.spent_hit_dice,
        })
    }

    /// Long rest: full hit points, recover at least half the spent hit dice,
    /// reset rage charges and re-arm relentless endurance
    pub fn long_rest(&mut self) -> RestOutcome {
        let regained = self.sheet.max_hit_points - self.state.hit_points;
        self.state.hit_points = self.sheet.max_hit_points;

        // floor(spent - level/2), never below zero
        let half_up = self.sheet.level.div_ceil(2);
        self.state.spent_hit_dice = self.state.spent_hit_dice.saturating_sub(half_up);

        self.state.rage.used_charges = 0;
        self.state.relentless_endurance_used = false;

        RestOutcome {
            hit_points: self.state.hit_points,
            hit_points_regained: regained,
            spent_hit_dice: self.state.spent_hit_dice,
        }
    }

    /// One-shot racial ability: stand at 1 hit point instead of 0.
    ///
    /// The UI gates availability, but both conditions are re-checked here.
    pub fn relentless_endurance(&mut self) -> Result<RelentlessOutcome, EngineError> {
        if self.state.hit_points != 0 {
            return Err(EngineError::PreconditionFailed(
                "relentless endurance requires 0 hit points".into(),
            ));
        }
        if self.state.relentless_endurance_used {
            return Err(EngineError::PreconditionFailed(
                "relentless endurance already used".into(),
            ));
        }

        self.state.hit_points = 1;
        self.state.relentless_endurance_used = true;

        Ok(RelentlessOutcome {
            hit_points: 1,
            notice: "You refuse to fall and stay at 1 hit point.".into(),
        })
    }
}
