//! End-to-end session scenarios driven through the engine API

mod common;

use common::sample_session;
use sheetd::error::EngineError;
use sheetd::rules::dice::SequenceRoller;
use sheetd::rules::DamageType;

#[test]
fn test_full_combat_round() {
    let mut session = sample_session();

    // Roll initiative and enter combat
    let mut roller = SequenceRoller::new([17]);
    let combat = session.toggle_combat(&mut roller).unwrap();
    assert!(combat.in_combat);
    assert_eq!(combat.initiative.unwrap().total, 19); // 17 + DEX mod 2

    // Rage up and go reckless
    let rage = session.toggle_rage().unwrap();
    assert!(rage.active);
    assert_eq!(rage.used_charges, 1);
    assert_eq!(rage.max_charges, 3);
    session.toggle_reckless_attack().unwrap();

    // Reckless greataxe swing: advantage keeps the 18, rage adds +2 damage
    let mut roller = SequenceRoller::new([5, 18, 7]);
    let attack = session.attack("Greataxe", &mut roller).unwrap();
    assert_eq!(attack.rolls, vec![5, 18]);
    assert!(attack.reckless);
    assert_eq!(attack.to_hit_total, 25); // 18 + STR 4 + prof 3
    assert_eq!(attack.rage_bonus, 2);
    assert_eq!(attack.damage_total, 13); // 7 + STR 4 + rage 2
    assert_eq!(attack.damage_type, DamageType::Slashing);

    // Incoming slashing is halved while raging
    let damage = session.take_damage(10, DamageType::Slashing);
    assert!(damage.resisted);
    assert_eq!(damage.effective, 5);
    assert_eq!(damage.hit_points, 40);

    // The attack keeps the rage alive into the next turn
    let turn = session.start_turn().unwrap();
    assert!(!turn.rage_ended);
    assert!(session.state().rage.active);
    assert!(!session.state().reckless_attack.active);

    // An idle turn ends it
    let turn = session.start_turn().unwrap();
    assert!(turn.rage_ended);
    assert!(!session.state().rage.active);
    assert!(session.state().resistance.is_empty());

    // Leaving combat with no rage reports nothing to end
    let mut roller = SequenceRoller::new([]);
    let combat = session.toggle_combat(&mut roller).unwrap();
    assert!(!combat.in_combat);
    assert!(!combat.rage_ended);
}

#[test]
fn test_rage_charges_exhaust_and_reset() {
    let mut session = sample_session();
    let mut roller = SequenceRoller::new([10]);
    session.toggle_combat(&mut roller).unwrap();

    // Three charges at level 5; toggling off does not refund
    for _ in 0..3 {
        assert!(session.toggle_rage().unwrap().active);
        assert!(!session.toggle_rage().unwrap().active);
    }
    let err = session.toggle_rage().unwrap_err();
    assert!(matches!(err, EngineError::ResourceExhausted(_)));
    assert_eq!(session.state().rage.used_charges, 3);

    // A long rest hands all charges back
    session.long_rest();
    assert_eq!(session.state().rage.used_charges, 0);
    assert!(session.toggle_rage().unwrap().active);
}

#[test]
fn test_rest_interplay() {
    let mut session = sample_session();

    session.take_damage(30, DamageType::Fire);
    assert_eq!(session.state().hit_points, 15);

    // Four hit dice at d12+2 each, capped at max hit points
    let mut roller = SequenceRoller::new([6, 6, 6, 6]);
    let rest = session.short_rest(4, &mut roller).unwrap();
    assert_eq!(rest.hit_points, 45);
    assert_eq!(rest.spent_hit_dice, 4);

    // Only one die left out of five
    let mut roller = SequenceRoller::new([1, 1]);
    let err = session.short_rest(2, &mut roller).unwrap_err();
    assert!(matches!(err, EngineError::ResourceExhausted(_)));

    // Long rest recovers ceil(level / 2) = 3 of the spent dice
    let rest = session.long_rest();
    assert_eq!(rest.hit_points, 45);
    assert_eq!(rest.spent_hit_dice, 1);
}

#[test]
fn test_relentless_endurance_is_one_shot() {
    let mut session = sample_session();

    let damage = session.take_damage(60, DamageType::Bludgeoning);
    assert!(damage.unconscious);
    assert_eq!(damage.hit_points, 0);

    let outcome = session.relentless_endurance().unwrap();
    assert_eq!(outcome.hit_points, 1);

    // Down again: the feature is spent until a long rest
    session.take_damage(5, DamageType::Bludgeoning);
    let err = session.relentless_endurance().unwrap_err();
    assert!(matches!(err, EngineError::PreconditionFailed(_)));

    session.long_rest();
    session.take_damage(60, DamageType::Bludgeoning);
    assert!(session.relentless_endurance().is_ok());
}

#[test]
fn test_advantage_sources_are_independent() {
    let mut session = sample_session();
    let mut roller = SequenceRoller::new([10]);
    session.toggle_combat(&mut roller).unwrap();
    session.toggle_rage().unwrap();

    // Rage grants the STR save advantage, danger sense the DEX one
    use sheetd::model::Condition;
    use sheetd::rules::Ability;
    assert!(session.state().save_advantages.granted(&Ability::Str));
    assert!(session.state().save_advantages.granted(&Ability::Dex));

    // Blinding suppresses danger sense without touching the rage grant
    session.set_conditions([Condition::Blinded].into_iter().collect());
    assert!(session.state().save_advantages.granted(&Ability::Str));
    assert!(!session.state().save_advantages.granted(&Ability::Dex));

    // Ending the rage leaves nothing granted while still blinded
    session.toggle_rage().unwrap();
    assert!(!session.state().save_advantages.granted(&Ability::Str));
}

#[test]
fn test_out_of_combat_actions_rejected() {
    let mut session = sample_session();
    let mut roller = SequenceRoller::new([10]);

    assert!(matches!(
        session.toggle_rage().unwrap_err(),
        EngineError::PreconditionFailed(_)
    ));
    assert!(matches!(
        session.toggle_reckless_attack().unwrap_err(),
        EngineError::PreconditionFailed(_)
    ));
    assert!(matches!(
        session.start_turn().unwrap_err(),
        EngineError::PreconditionFailed(_)
    ));
    assert!(matches!(
        session.attack("Greataxe", &mut roller).unwrap_err(),
        EngineError::PreconditionFailed(_)
    ));
}
