use crate::funnel::domain::{SleepBarrier, Symptom, WakeExperience};

use super::chain::PriorityChain;
use super::rules::EvaluationContext;
use super::{Bundle, ExpertPersona, PrimaryIssue, RuleId, Testimonial, TopIngredient};

type Ctx<'a> = EvaluationContext<'a>;

pub(crate) fn headline(issue: PrimaryIssue, name: &str) -> String {
    match issue {
        PrimaryIssue::SleepOnset => format!("{name}, Let's Get You to Sleep Faster"),
        PrimaryIssue::SleepMaintenance => format!("{name}, Let's Help You Stay Asleep"),
        PrimaryIssue::PoorQuality => format!("{name}, Let's Fix Sleep from the Root"),
        PrimaryIssue::StressSleep => format!("{name}, Here's Your Personalized Protocol"),
    }
}

pub(crate) fn trigger_text(ctx: &Ctx<'_>) -> &'static str {
    PriorityChain::<Ctx<'_>, _>::new("sleep disruption linked to chronic stress")
        .when(
            |ctx| {
                ctx.has_barrier(SleepBarrier::RacingThoughts)
                    || ctx.has_symptom(Symptom::RacingThoughts)
            },
            "racing thoughts at bedtime",
        )
        .when(
            |ctx| ctx.has_barrier(SleepBarrier::Anxiety),
            "anxiety and worry at night",
        )
        .when(
            |ctx| ctx.has_barrier(SleepBarrier::Tension),
            "physical tension preventing sleep",
        )
        .resolve(ctx)
}

pub(crate) fn wake_text(ctx: &Ctx<'_>) -> &'static str {
    PriorityChain::<Ctx<'_>, _>::new("not fully rested")
        .when(
            |ctx| ctx.woke(WakeExperience::Groggy) && ctx.woke(WakeExperience::Tired),
            "groggy and tired",
        )
        .when(
            |ctx| ctx.woke(WakeExperience::Tired),
            "tired even after sleeping",
        )
        .when(
            |ctx| ctx.woke(WakeExperience::Groggy),
            "foggy-headed in the mornings",
        )
        .resolve(ctx)
}

/// Subheadline with `**bold**` markup around the two personalised clauses.
pub(crate) fn subheadline(ctx: &Ctx<'_>) -> String {
    format!(
        "Based on your answers, you struggle with **{}** and wake up feeling **{}**. Here's your personalized stress & sleep protocol.",
        trigger_text(ctx),
        wake_text(ctx)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Dosing {
    pub instructions: &'static str,
    pub time_label: &'static str,
}

pub(crate) fn dosing(ctx: &Ctx<'_>) -> Dosing {
    PriorityChain::<Ctx<'_>, _>::new(Dosing {
        instructions: "Take 2 capsules 60–90 minutes before your target bedtime.",
        time_label: "60–90 minutes before bed",
    })
    .when(
        |ctx| ctx.fired(RuleId::EveningHardest),
        Dosing {
            instructions: "Take 2 capsules 30–60 minutes after you get home from work (6–7 PM). Your nervous system needs a transition period.",
            time_label: "30–60 min after getting home from work",
        },
    )
    .when(
        |ctx| ctx.fired(RuleId::BedtimeHardest),
        Dosing {
            instructions: "Take 2 capsules 60–90 minutes before your target bedtime. L-Theanine works within 30–60 min to quiet mental chatter.",
            time_label: "60–90 min before target bedtime",
        },
    )
    .when(
        |ctx| ctx.fired(RuleId::MiddleOfNightHardest),
        Dosing {
            instructions: "Take 2 capsules 60 minutes before bed consistently every night. Affron® regulates cortisol throughout the night.",
            time_label: "60 min before bed, every night",
        },
    )
    .resolve(ctx)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Specialist {
    pub name: &'static str,
    pub role: &'static str,
}

pub(crate) const SLEEP_SPECIALIST: Specialist = Specialist {
    name: "Mia Torres",
    role: "Sleep & Stress Specialist",
};
pub(crate) const STRESS_SPECIALIST: Specialist = Specialist {
    name: "James Park",
    role: "Stress Management Specialist",
};
pub(crate) const WELLNESS_SPECIALIST: Specialist = Specialist {
    name: "Rachel Kim",
    role: "Wellness Specialist",
};

pub(crate) fn specialist(ctx: &Ctx<'_>) -> Specialist {
    PriorityChain::<Ctx<'_>, _>::new(WELLNESS_SPECIALIST)
        .when(
            |ctx| ctx.primary_issue.is_sleep_specific(),
            SLEEP_SPECIALIST,
        )
        .when(|ctx| ctx.flags.high_stress, STRESS_SPECIALIST)
        .resolve(ctx)
}

fn issue_clause(issue: PrimaryIssue) -> &'static str {
    match issue {
        PrimaryIssue::SleepOnset => "difficulty falling asleep and racing thoughts at bedtime",
        PrimaryIssue::SleepMaintenance => "nighttime awakenings and difficulty staying asleep",
        PrimaryIssue::PoorQuality => "consistently poor sleep quality despite time in bed",
        PrimaryIssue::StressSleep => "high stress that disrupts both mood and sleep",
    }
}

fn timeline_clause(issue: PrimaryIssue) -> &'static str {
    match issue {
        PrimaryIssue::SleepOnset => {
            "Most people with your profile see improvements within 7–10 days."
        }
        PrimaryIssue::SleepMaintenance => {
            "You should notice fewer awakenings within 2–3 weeks of consistent use."
        }
        PrimaryIssue::PoorQuality | PrimaryIssue::StressSleep => {
            "The first week typically brings easier sleep onset, with deeper improvements over 3–4 weeks."
        }
    }
}

pub(crate) fn expert(ctx: &Ctx<'_>, user_name: &str) -> ExpertPersona {
    let specialist = specialist(ctx);
    let message = format!(
        "Hi {user_name},\n\nI've reviewed your sleep patterns and stress profile. Based on your answers, {} are the primary factors affecting your rest and wellbeing. The protocol I've built for you targets both the mental and hormonal drivers that disrupt sleep quality.\n\n{}\n\n— {}",
        issue_clause(ctx.primary_issue),
        timeline_clause(ctx.primary_issue),
        specialist.name
    );

    ExpertPersona {
        name: specialist.name.to_string(),
        role: specialist.role.to_string(),
        message,
    }
}

pub(crate) fn bundle_name(bundle: Bundle, name: &str) -> String {
    match bundle {
        Bundle::SevereStress => format!("{name}'s Stress Recovery System"),
        Bundle::StressSleep => format!("{name}'s Complete Calm Protocol"),
        Bundle::Starter => format!("{name}'s Sleep Starter Kit"),
        Bundle::SleepOnly => format!("{name}'s Sleep Restoration Stack"),
    }
}

pub(crate) fn top_ingredient(ctx: &Ctx<'_>) -> TopIngredient {
    PriorityChain::<Ctx<'_>, _>::new(TopIngredient::AllThree)
        .when(
            |ctx| {
                ctx.primary_issue == PrimaryIssue::SleepOnset
                    && !ctx.fired(RuleId::RacingThoughts)
                    && !ctx.fired(RuleId::MuscleTension)
            },
            TopIngredient::AffronSaffron,
        )
        .when(
            |ctx| {
                ctx.primary_issue == PrimaryIssue::SleepMaintenance
                    && !ctx.fired(RuleId::RacingThoughts)
            },
            TopIngredient::ChelamaxMagnesium,
        )
        .when(
            |ctx| {
                ctx.fired(RuleId::RacingThoughts)
                    && !ctx.fired(RuleId::MuscleTension)
                    && !ctx.fired(RuleId::HeartRacing)
            },
            TopIngredient::LTheanine,
        )
        .resolve(ctx)
}

pub(crate) const MELATONIN_TESTIMONIAL: TestimonialCopy = TestimonialCopy {
    quote: "Finally, a sleep supplement that doesn't leave me groggy. I took melatonin for 2 years and woke up in a fog every morning. Calm+Rest works completely differently — I sleep deeply and wake up clear-headed.",
    author: "Jennifer K., 29",
    role: "Nurse · Verified Buyer",
};
pub(crate) const RACING_THOUGHTS_TESTIMONIAL: TestimonialCopy = TestimonialCopy {
    quote: "My brain used to replay work emails for hours. Now I fall asleep in 20 minutes. L-Theanine in Calm+Rest actually quiets the mental chatter without making me feel drugged. Game-changer.",
    author: "Kelly R., 38",
    role: "Project Manager · Verified Buyer",
};
pub(crate) const WORK_STRESS_TESTIMONIAL: TestimonialCopy = TestimonialCopy {
    quote: "I no longer bring work stress to bed with me. High-pressure job means I used to lie awake thinking about tomorrow's meetings. Calm+Rest helps my nervous system 'clock out' when I clock out.",
    author: "Marcus T., 42",
    role: "Sales Director · Verified Buyer",
};
pub(crate) const DEFAULT_TESTIMONIAL: TestimonialCopy = TestimonialCopy {
    quote: "I've tried melatonin, magnesium spray, sleep teas — nothing worked consistently. The quiz helped me understand *why* I wasn't sleeping, and CADENCE Calm+Rest actually addressed the root cause. I fall asleep in 20 minutes now.",
    author: "Sarah M., 34",
    role: "Marketing Manager · Verified Buyer",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TestimonialCopy {
    pub quote: &'static str,
    pub author: &'static str,
    pub role: &'static str,
}

impl From<TestimonialCopy> for Testimonial {
    fn from(copy: TestimonialCopy) -> Self {
        Self {
            quote: copy.quote.to_string(),
            author: copy.author.to_string(),
            role: copy.role.to_string(),
        }
    }
}

pub(crate) fn testimonial(ctx: &Ctx<'_>) -> TestimonialCopy {
    PriorityChain::<Ctx<'_>, _>::new(DEFAULT_TESTIMONIAL)
        .when(
            |ctx| ctx.fired(RuleId::TriedMelatonin),
            MELATONIN_TESTIMONIAL,
        )
        .when(
            |ctx| {
                ctx.fired(RuleId::RacingThoughts) || ctx.has_barrier(SleepBarrier::RacingThoughts)
            },
            RACING_THOUGHTS_TESTIMONIAL,
        )
        .when(
            |ctx| ctx.fired(RuleId::WorkStress),
            WORK_STRESS_TESTIMONIAL,
        )
        .resolve(ctx)
}

pub(crate) fn switcher_copy(ctx: &Ctx<'_>) -> Option<&'static str> {
    PriorityChain::<Ctx<'_>, _>::new(None)
        .when(
            |ctx| ctx.fired(RuleId::TriedMelatonin),
            Some("You've tried melatonin before. Melatonin treats the symptom (lack of sleep hormone), not the cause (stress dysregulation). Calm+Rest works differently — it helps your body regulate cortisol so you produce melatonin naturally. No dependency, no morning fog."),
        )
        .when(
            |ctx| ctx.fired(RuleId::TriedALot),
            Some("You've tried a lot and nothing's worked consistently. Most supplements fail because they're under-dosed, single-ingredient, or have poor bioavailability. Calm+Rest uses clinically-effective doses of three synergistic ingredients in their most bioavailable forms."),
        )
        .when(
            |ctx| ctx.fired(RuleId::TriedMagnesium),
            Some("You've tried magnesium before — it helps with physical relaxation but misses elevated cortisol and racing thoughts. Calm+Rest completes the formula with Affron® saffron (cortisol regulation) and L-Theanine (mental calm)."),
        )
        .resolve(ctx)
}

pub(crate) const HORMONAL_WARNING: &str = "⚠️ **Important:** You indicated you're pregnant or breastfeeding. We recommend consulting your doctor before taking any supplements. While these ingredients are generally well-tolerated, your healthcare provider should advise on what's appropriate during pregnancy or nursing.";

pub(crate) fn hormonal_warning(ctx: &Ctx<'_>) -> Option<&'static str> {
    ctx.fired(RuleId::HormonalPregnancy)
        .then_some(HORMONAL_WARNING)
}

pub(crate) fn symptom_highlights(ctx: &Ctx<'_>) -> Vec<&'static str> {
    let mut highlights = Vec::new();

    if ctx.has_symptom(Symptom::RacingThoughts) || ctx.has_barrier(SleepBarrier::RacingThoughts) {
        highlights.push(
            "Racing thoughts at night → L-Theanine promotes alpha brain waves within 30–60 min",
        );
    }
    if ctx.has_symptom(Symptom::MuscleTension) {
        highlights
            .push("Muscle tension → Chelamax® Magnesium supports physical relaxation overnight");
    }
    if ctx.has_symptom(Symptom::HeartRacing) || ctx.fired(RuleId::WorkStress) {
        highlights
            .push("Elevated stress response → Affron® Saffron regulates cortisol and HPA axis");
    }
    if ctx.primary_issue == PrimaryIssue::SleepOnset {
        highlights.push(
            "Difficulty falling asleep → Full-spectrum formula addresses onset, quality, and next-day clarity",
        );
    }

    highlights
}
