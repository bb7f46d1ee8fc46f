use crate::funnel::domain::{
    AgeBracket, EmotionalState, Gender, HardestTime, HormonalFactor, PreviousAttempt,
    QuizResponse, SleepBarrier, SleepGoal, SleepQuality, StressCoping, StressGoal, StressTrigger,
    Symptom, WakeExperience,
};

/// A calm 25-34 year old man who simply falls asleep slowly.
pub(super) fn minimal_onset() -> QuizResponse {
    QuizResponse::new()
        .choose(SleepQuality::HardFall)
        .select(Vec::<StressTrigger>::new())
        .select(Vec::<Symptom>::new())
        .select(Vec::<EmotionalState>::new())
        .select(Vec::<PreviousAttempt>::new())
        .select(Vec::<HardestTime>::new())
        .choose(AgeBracket::From25To34)
        .choose(Gender::Male)
}

/// Four non-sentinel symptoms, nothing else of note.
pub(super) fn heavy_symptom_load() -> QuizResponse {
    QuizResponse::new().select([
        Symptom::RacingThoughts,
        Symptom::MuscleTension,
        Symptom::HeartRacing,
        Symptom::Fatigue,
    ])
}

pub(super) fn first_timer() -> QuizResponse {
    QuizResponse::new()
        .select([PreviousAttempt::Nothing])
        .choose(AgeBracket::From18To24)
}

/// Every question answered, mirroring a typical completed funnel.
pub(super) fn full_profile() -> QuizResponse {
    QuizResponse::new()
        .choose(SleepQuality::HardFall)
        .select([SleepBarrier::RacingThoughts, SleepBarrier::Anxiety])
        .select([WakeExperience::Groggy, WakeExperience::Tired])
        .select([EmotionalState::Stressed, EmotionalState::RacingMind])
        .select([StressTrigger::Work, StressTrigger::Overthinking])
        .select([StressCoping::Exercise, StressCoping::NothingWorks])
        .select([Symptom::RacingThoughts, Symptom::MuscleTension])
        .select([
            SleepGoal::FallFaster,
            SleepGoal::DeeperSleep,
            SleepGoal::ReduceAnxiety,
        ])
        .select([
            StressGoal::Calmer,
            StressGoal::ClearThinking,
            StressGoal::SleepImpact,
        ])
        .select([PreviousAttempt::Melatonin, PreviousAttempt::TriedALot])
        .select([HardestTime::Bedtime, HardestTime::Evening])
        .choose(AgeBracket::From35To44)
        .choose(Gender::Female)
        .select([HormonalFactor::NoneOfThese])
}
