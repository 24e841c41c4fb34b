//! Combat turn state machine
//!
//! In/out-of-combat transitions, per-turn flag lifecycle, damage intake
//! and healing. Rage expiry ("no attack or damage last turn") lives in
//! `start_turn`; leaving combat force-ends rage.

use crate::error::EngineError;
use crate::rules::dice::{roll_d20, DieRoller};
use crate::rules::stats::Ability;
use crate::rules::DamageType;

use super::outcome::signed;
use super::{CombatOutcome, DamageOutcome, HealOutcome, InitiativeRoll, RecklessOutcome, Session, TurnOutcome};

impl Session {
    /// Enter or leave combat.
    ///
    /// Entering rolls initiative (reported, never stored) and clears the
    /// last-round flags; leaving force-ends rage with no notice.
    pub fn toggle_combat(
        &mut self,
        roller: &mut dyn DieRoller,
    ) -> Result<CombatOutcome, EngineError> {
        if self.state.combat.in_combat {
            self.state.combat.in_combat = false;
            let was_raging = self.state.rage.active;
            self.end_rage(None);
            return Ok(CombatOutcome {
                in_combat: false,
                initiative: None,
                rage_ended: was_raging,
            });
        }

        let modifier = self.effective_ability(Ability::Dex)?.modifier;
        let roll = roll_d20(roller);
        let total = roll as i32 + modifier;

        self.state.combat.in_combat = true;
        self.state.combat.attack_last_round = false;
        self.state.combat.damage_last_round = false;

        Ok(CombatOutcome {
            in_combat: true,
            initiative: Some(InitiativeRoll {
                roll,
                modifier,
                total,
                text: format!("Roll initiative! {} {} = {}", roll, signed(modifier), total),
            }),
            rage_ended: false,
        })
    }

    /// Start a new turn.
    ///
    /// If the rage saw neither an attack nor damage last round it ends with
    /// a notice; all four per-turn flags reset regardless.
    pub fn start_turn(&mut self) -> Result<TurnOutcome, EngineError> {
        if !self.state.combat.in_combat {
            return Err(EngineError::PreconditionFailed("not in combat".into()));
        }

        let mut notice = None;
        let mut rage_ended = false;
        if self.state.rage.active
            && !self.state.combat.attack_last_round
            && !self.state.combat.damage_last_round
        {
            let reason = "Rage ended: you haven't attacked or taken damage last turn";
            self.end_rage(Some(reason));
            notice = Some(reason.to_string());
            rage_ended = true;
        }

        self.state.combat.attack_last_round = false;
        self.state.combat.damage_last_round = false;
        self.state.combat.bonus_action = false;
        self.state.reckless_attack.active = false;

        Ok(TurnOutcome { rage_ended, notice })
    }

    /// Toggle reckless attack for the current turn
    pub fn toggle_reckless_attack(&mut self) -> Result<RecklessOutcome, EngineError> {
        if !self.state.combat.in_combat {
            return Err(EngineError::PreconditionFailed("not in combat".into()));
        }
        self.state.reckless_attack.active = !self.state.reckless_attack.active;
        Ok(RecklessOutcome {
            active: self.state.reckless_attack.active,
        })
    }

    /// Apply incoming damage.
    ///
    /// A resisted damage type is halved rounding down. Hit points floor at
    /// zero, and nonzero damage marks the took-damage flag that keeps a
    /// rage going.
    pub fn take_damage(&mut self, amount: i32, damage_type: DamageType) -> DamageOutcome {
        let amount = amount.max(0);
        let resisted = self.state.resistance.granted(&damage_type);
        let effective = if resisted { amount / 2 } else { amount };

        self.state.hit_points = (self.state.hit_points - effective).max(0);
        if effective > 0 {
            self.state.combat.damage_last_round = true;
        }

        let unconscious = self.state.hit_points == 0;
        DamageOutcome {
            amount,
            effective,
            resisted,
            hit_points: self.state.hit_points,
            unconscious,
            notice: unconscious.then(|| "You are knocked unconscious!".to_string()),
        }
    }

    /// Restore hit points, capped at the maximum
    pub fn heal(&mut self, amount: i32) -> HealOutcome {
        let amount = amount.max(0);
        let healed = amount.min(self.sheet.max_hit_points - self.state.hit_points);
        self.state.hit_points += healed;
        HealOutcome {
            amount,
            healed,
            hit_points: self.state.hit_points,
        }
    }
}
