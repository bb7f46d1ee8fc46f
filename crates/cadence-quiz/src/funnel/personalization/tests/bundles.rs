use super::common::*;
use crate::funnel::domain::{
    AgeBracket, EmotionalState, HardestTime, PreviousAttempt, QuizResponse, SleepQuality, Symptom,
};
use crate::funnel::personalization::rules::{self, EvaluationContext};
use crate::funnel::personalization::{derive, Bundle, PrimaryIssue, RuleId};

#[test]
fn sleep_quality_answers_map_to_primary_issues() {
    let cases = [
        (Some(SleepQuality::HardFall), PrimaryIssue::SleepOnset),
        (Some(SleepQuality::WakeNight), PrimaryIssue::SleepMaintenance),
        (Some(SleepQuality::RarelyRestful), PrimaryIssue::PoorQuality),
        (Some(SleepQuality::WiredTired), PrimaryIssue::StressSleep),
        (None, PrimaryIssue::StressSleep),
    ];

    for (quality, expected) in cases {
        assert_eq!(PrimaryIssue::classify(quality), expected, "{quality:?}");
    }
}

#[test]
fn stress_sleep_fallback_fires_no_classification_rule() {
    let result = derive(&QuizResponse::new(), "Dana");

    assert_eq!(result.primary_issue, PrimaryIssue::StressSleep);
    assert!(!result.fired(RuleId::PrimarySleepOnset));
    assert!(!result.fired(RuleId::PrimarySleepMaintenance));
    assert!(!result.fired(RuleId::PrimaryPoorQuality));
}

#[test]
fn minimal_onset_lands_on_stress_sleep_bundle() {
    let result = derive(&minimal_onset(), "Alex");

    assert_eq!(result.primary_issue, PrimaryIssue::SleepOnset);
    assert_eq!(result.bundle, Bundle::StressSleep);
    assert_eq!(
        result.applied_rules,
        vec![RuleId::PrimarySleepOnset, RuleId::BundleStressSleep]
    );
}

#[test]
fn symptom_count_triggers_severe_stress_regardless_of_sleep_quality() {
    for quality in SleepQuality::ALL {
        let responses = heavy_symptom_load().choose(*quality);

        let result = derive(&responses, "Sam");

        assert_eq!(result.bundle, Bundle::SevereStress, "{quality:?}");
        assert!(result.fired(RuleId::BundleSevereStress));
    }
}

#[test]
fn none_sentinel_does_not_count_towards_symptom_load() {
    let responses = QuizResponse::new().select([
        Symptom::RacingThoughts,
        Symptom::MuscleTension,
        Symptom::HeartRacing,
        Symptom::NoneOfThese,
    ]);

    assert!(!rules::is_high_stress(&responses));
}

#[test]
fn emotional_load_and_all_day_mark_high_stress() {
    let emotional = QuizResponse::new().select([
        EmotionalState::Stressed,
        EmotionalState::Overwhelmed,
        EmotionalState::LowMood,
    ]);
    let all_day = QuizResponse::new().select([HardestTime::AllDay]);
    let two_emotions =
        QuizResponse::new().select([EmotionalState::Stressed, EmotionalState::Irritable]);

    assert!(rules::is_high_stress(&emotional));
    assert!(rules::is_high_stress(&all_day));
    assert!(!rules::is_high_stress(&two_emotions));
}

#[test]
fn starter_beats_high_stress() {
    let responses = first_timer().select([
        Symptom::RacingThoughts,
        Symptom::MuscleTension,
        Symptom::HeartRacing,
        Symptom::Fatigue,
    ]);
    assert!(rules::is_high_stress(&responses));

    let result = derive(&responses, "Jo");

    assert_eq!(result.bundle, Bundle::Starter);
    assert!(result.fired(RuleId::BundleStarter));
    assert!(!result.fired(RuleId::BundleSevereStress));
}

#[test]
fn high_stress_beats_switcher() {
    let responses = heavy_symptom_load().select([PreviousAttempt::Magnesium]);

    let result = derive(&responses, "Jo");

    assert_eq!(result.bundle, Bundle::SevereStress);
}

#[test]
fn starter_requires_youngest_bracket() {
    let responses = QuizResponse::new()
        .select([PreviousAttempt::Nothing])
        .choose(AgeBracket::From25To34);

    let result = derive(&responses, "Jo");

    assert!(result.fired(RuleId::TriedNothing));
    assert_eq!(result.bundle, Bundle::StressSleep);
}

#[test]
fn poor_quality_without_switching_gets_sleep_only() {
    let plain = QuizResponse::new().choose(SleepQuality::RarelyRestful);
    let switcher = plain.clone().select([PreviousAttempt::TriedALot]);

    assert_eq!(derive(&plain, "Lee").bundle, Bundle::SleepOnly);
    assert_eq!(derive(&switcher, "Lee").bundle, Bundle::StressSleep);
}

#[test]
fn exactly_one_bundle_rule_fires() {
    let bundle_rules = [
        RuleId::BundleSleepOnly,
        RuleId::BundleStressSleep,
        RuleId::BundleSevereStress,
        RuleId::BundleStarter,
    ];

    for responses in [
        QuizResponse::new(),
        minimal_onset(),
        heavy_symptom_load(),
        first_timer(),
        full_profile(),
    ] {
        let result = derive(&responses, "Kai");
        let fired = bundle_rules
            .iter()
            .filter(|rule| result.fired(**rule))
            .count();
        assert_eq!(fired, 1);
    }
}

#[test]
fn descriptive_tags_follow_rule_order_not_selection_order() {
    let result = derive(&full_profile(), "Sarah");

    assert_eq!(
        result.applied_rules,
        vec![
            RuleId::PrimarySleepOnset,
            RuleId::WorkStress,
            RuleId::Overthinking,
            RuleId::RacingThoughts,
            RuleId::MuscleTension,
            RuleId::GoalFallFaster,
            RuleId::GoalCalmer,
            RuleId::GoalClearThinking,
            RuleId::TriedMelatonin,
            RuleId::TriedALot,
            RuleId::EveningHardest,
            RuleId::BedtimeHardest,
            RuleId::BundleStressSleep,
        ]
    );
}

#[test]
fn context_flags_reflect_profile() {
    let responses = full_profile();
    let mut ctx = EvaluationContext::new(&responses);

    rules::classify_primary_issue(&mut ctx);
    rules::tag_descriptive_rules(&mut ctx);
    rules::detect_flags(&mut ctx);

    assert!(ctx.flags.switcher);
    assert!(!ctx.flags.starter);
    assert!(!ctx.flags.high_stress);
}
