use crate::funnel::domain::{
    AgeBracket, Gender, HardestTime, HormonalFactor, PreviousAttempt, QuestionId, QuizResponse,
    SleepBarrier, SleepGoal, SleepQuality, StressGoal, StressTrigger, Symptom, WakeExperience,
    WireValue,
};

use super::{Bundle, PrimaryIssue, RuleId};

const HIGH_STRESS_EMOTION_COUNT: usize = 3;
const HIGH_STRESS_SYMPTOM_COUNT: usize = 4;

/// Composite flags derived after descriptive tagging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ProfileFlags {
    pub high_stress: bool,
    pub switcher: bool,
    pub starter: bool,
}

/// Working state threaded through every derivation stage.
pub(crate) struct EvaluationContext<'a> {
    pub responses: &'a QuizResponse,
    pub primary_issue: PrimaryIssue,
    pub flags: ProfileFlags,
    pub bundle: Bundle,
    pub barriers: Vec<SleepBarrier>,
    pub symptoms: Vec<Symptom>,
    pub wake: Vec<WakeExperience>,
    rules: Vec<RuleId>,
}

impl<'a> EvaluationContext<'a> {
    pub(crate) fn new(responses: &'a QuizResponse) -> Self {
        let barriers = responses
            .multi::<SleepBarrier>()
            .into_iter()
            .filter(|barrier| *barrier != SleepBarrier::NoneOfThese)
            .collect();
        let symptoms = responses
            .multi::<Symptom>()
            .into_iter()
            .filter(|symptom| *symptom != Symptom::NoneOfThese)
            .collect();

        Self {
            responses,
            primary_issue: PrimaryIssue::StressSleep,
            flags: ProfileFlags::default(),
            bundle: Bundle::SleepOnly,
            barriers,
            symptoms,
            wake: responses.multi::<WakeExperience>(),
            rules: Vec::new(),
        }
    }

    pub(crate) fn fire(&mut self, rule: RuleId) {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
    }

    pub(crate) fn fired(&self, rule: RuleId) -> bool {
        self.rules.contains(&rule)
    }

    pub(crate) fn has_barrier(&self, barrier: SleepBarrier) -> bool {
        self.barriers.contains(&barrier)
    }

    pub(crate) fn has_symptom(&self, symptom: Symptom) -> bool {
        self.symptoms.contains(&symptom)
    }

    pub(crate) fn woke(&self, experience: WakeExperience) -> bool {
        self.wake.contains(&experience)
    }

    pub(crate) fn into_rules(self) -> Vec<RuleId> {
        self.rules
    }
}

impl PrimaryIssue {
    /// Exact-match lookup on the sleep quality answer; anything else is stress-driven sleep.
    pub fn classify(quality: Option<SleepQuality>) -> Self {
        match quality {
            Some(SleepQuality::HardFall) => Self::SleepOnset,
            Some(SleepQuality::WakeNight) => Self::SleepMaintenance,
            Some(SleepQuality::RarelyRestful) => Self::PoorQuality,
            Some(SleepQuality::WiredTired) | None => Self::StressSleep,
        }
    }

    const fn rule(self) -> Option<RuleId> {
        match self {
            Self::SleepOnset => Some(RuleId::PrimarySleepOnset),
            Self::SleepMaintenance => Some(RuleId::PrimarySleepMaintenance),
            Self::PoorQuality => Some(RuleId::PrimaryPoorQuality),
            Self::StressSleep => None,
        }
    }
}

pub(crate) fn classify_primary_issue(ctx: &mut EvaluationContext<'_>) {
    let issue = PrimaryIssue::classify(ctx.responses.single::<SleepQuality>());
    ctx.primary_issue = issue;
    if let Some(rule) = issue.rule() {
        ctx.fire(rule);
    }
}

pub(crate) fn tag_descriptive_rules(ctx: &mut EvaluationContext<'_>) {
    let responses = ctx.responses;

    let triggers = [
        (StressTrigger::Work, RuleId::WorkStress),
        (StressTrigger::Overthinking, RuleId::Overthinking),
        (StressTrigger::Family, RuleId::FamilyStress),
        (StressTrigger::NoTime, RuleId::NoTime),
    ];
    for (trigger, rule) in triggers {
        if responses.includes(trigger) {
            ctx.fire(rule);
        }
    }

    let symptoms = [
        (Symptom::RacingThoughts, RuleId::RacingThoughts),
        (Symptom::MuscleTension, RuleId::MuscleTension),
        (Symptom::HeartRacing, RuleId::HeartRacing),
        (Symptom::Fatigue, RuleId::Fatigue),
    ];
    for (symptom, rule) in symptoms {
        if responses.includes(symptom) {
            ctx.fire(rule);
        }
    }

    if responses.includes(SleepGoal::FallFaster) {
        ctx.fire(RuleId::GoalFallFaster);
    }
    if responses.includes(SleepGoal::StopMelatonin) {
        ctx.fire(RuleId::GoalStopMelatonin);
    }
    if responses.includes(StressGoal::Calmer) {
        ctx.fire(RuleId::GoalCalmer);
    }
    if responses.includes(StressGoal::ClearThinking) {
        ctx.fire(RuleId::GoalClearThinking);
    }

    let attempts = [
        (PreviousAttempt::Melatonin, RuleId::TriedMelatonin),
        (PreviousAttempt::Magnesium, RuleId::TriedMagnesium),
        (PreviousAttempt::PrescriptionSleep, RuleId::TriedPrescription),
        (PreviousAttempt::Nothing, RuleId::TriedNothing),
        (PreviousAttempt::TriedALot, RuleId::TriedALot),
    ];
    for (attempt, rule) in attempts {
        if responses.includes(attempt) {
            ctx.fire(rule);
        }
    }

    let hardest = [
        (HardestTime::Evening, RuleId::EveningHardest),
        (HardestTime::Bedtime, RuleId::BedtimeHardest),
        (HardestTime::MiddleNight, RuleId::MiddleOfNightHardest),
        (HardestTime::AllDay, RuleId::AllDayHardest),
    ];
    for (time, rule) in hardest {
        if responses.includes(time) {
            ctx.fire(rule);
        }
    }

    let female = responses.is(Gender::Female);
    let hormonal = [
        (HormonalFactor::Pms, RuleId::HormonalPms),
        (HormonalFactor::Menopause, RuleId::HormonalMenopause),
        (HormonalFactor::Pregnant, RuleId::HormonalPregnancy),
    ];
    for (factor, rule) in hormonal {
        if female && responses.includes(factor) {
            ctx.fire(rule);
        }
    }

    if responses.is(Gender::Male) && responses.is(AgeBracket::From35To44) {
        ctx.fire(RuleId::MaleMidlife);
    }
    if responses.is(AgeBracket::From55To64) || responses.is(AgeBracket::Over65) {
        ctx.fire(RuleId::OlderAdult);
    }
}

/// Emotional load, all-day stress, or a heavy symptom load each mark a high-stress profile.
pub(crate) fn is_high_stress(responses: &QuizResponse) -> bool {
    let symptom_count =
        responses.selection_count(QuestionId::Symptoms, Some(Symptom::NoneOfThese.as_wire()));

    responses.selection_count(QuestionId::EmotionalBaseline, None) >= HIGH_STRESS_EMOTION_COUNT
        || responses.includes(HardestTime::AllDay)
        || symptom_count >= HIGH_STRESS_SYMPTOM_COUNT
}

pub(crate) fn detect_flags(ctx: &mut EvaluationContext<'_>) {
    let high_stress = is_high_stress(ctx.responses);
    let switcher = ctx.fired(RuleId::TriedMelatonin)
        || ctx.fired(RuleId::TriedMagnesium)
        || ctx.fired(RuleId::TriedALot);
    let starter =
        ctx.fired(RuleId::TriedNothing) && ctx.responses.is(AgeBracket::From18To24);

    ctx.flags = ProfileFlags {
        high_stress,
        switcher,
        starter,
    };
}

/// Starter status beats stress severity, which beats the issue/switcher split.
pub(crate) fn select_bundle(ctx: &mut EvaluationContext<'_>) {
    let flags = ctx.flags;
    let (bundle, rule) = if flags.starter {
        (Bundle::Starter, RuleId::BundleStarter)
    } else if flags.high_stress {
        (Bundle::SevereStress, RuleId::BundleSevereStress)
    } else if ctx.primary_issue != PrimaryIssue::PoorQuality || flags.switcher {
        (Bundle::StressSleep, RuleId::BundleStressSleep)
    } else {
        (Bundle::SleepOnly, RuleId::BundleSleepOnly)
    };

    ctx.bundle = bundle;
    ctx.fire(rule);
}
