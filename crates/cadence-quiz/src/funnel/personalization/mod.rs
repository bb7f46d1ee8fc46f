//! Pure derivation of a personalised protocol from a set of quiz answers.
//!
//! [`derive`] runs a fixed sequence of stages over an evaluation context:
//! primary issue classification, descriptive rule tagging, profile flags, bundle
//! selection and finally copy assembly. Every selection ends in a default, so the
//! function is total over any [`QuizResponse`], including an empty one.

mod chain;
mod copy;
mod rules;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::funnel::domain::QuizResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryIssue {
    SleepOnset,
    SleepMaintenance,
    PoorQuality,
    StressSleep,
}

impl PrimaryIssue {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SleepOnset => "sleep_onset",
            Self::SleepMaintenance => "sleep_maintenance",
            Self::PoorQuality => "poor_quality",
            Self::StressSleep => "stress_sleep",
        }
    }

    /// True for the three issues classified from the sleep quality answer.
    pub const fn is_sleep_specific(self) -> bool {
        !matches!(self, Self::StressSleep)
    }
}

impl fmt::Display for PrimaryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopIngredient {
    AffronSaffron,
    ChelamaxMagnesium,
    LTheanine,
    AllThree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bundle {
    Starter,
    SleepOnly,
    StressSleep,
    SevereStress,
}

impl Bundle {
    pub const ALL: [Bundle; 4] = [
        Bundle::Starter,
        Bundle::SleepOnly,
        Bundle::StressSleep,
        Bundle::SevereStress,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::SleepOnly => "sleep_only",
            Self::StressSleep => "stress_sleep",
            Self::SevereStress => "severe_stress",
        }
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! rule_ids {
    ($($variant:ident => $token:literal),+ $(,)?) => {
        /// Analytics tag recorded when a derivation condition holds.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum RuleId {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl RuleId {
            pub const ALL: &'static [RuleId] = &[$(RuleId::$variant),+];

            pub const fn token(self) -> &'static str {
                match self {
                    $(RuleId::$variant => $token,)+
                }
            }
        }
    };
}

rule_ids! {
    PrimarySleepOnset => "1A",
    PrimarySleepMaintenance => "1B",
    PrimaryPoorQuality => "1C",
    WorkStress => "2A",
    Overthinking => "2B",
    FamilyStress => "2C",
    NoTime => "2D",
    RacingThoughts => "3A",
    MuscleTension => "3B",
    HeartRacing => "3C",
    Fatigue => "3D",
    GoalFallFaster => "4A",
    GoalStopMelatonin => "4B",
    GoalCalmer => "4C",
    GoalClearThinking => "4D",
    TriedMelatonin => "5A",
    TriedMagnesium => "5B",
    TriedPrescription => "5C",
    TriedNothing => "5D",
    TriedALot => "5E",
    EveningHardest => "6A",
    BedtimeHardest => "6B",
    MiddleOfNightHardest => "6C",
    AllDayHardest => "6D",
    HormonalPms => "7A",
    HormonalMenopause => "7B",
    HormonalPregnancy => "7C",
    MaleMidlife => "7D",
    OlderAdult => "7E",
    BundleSleepOnly => "8A",
    BundleStressSleep => "8B",
    BundleSevereStress => "8C",
    BundleStarter => "8D",
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertPersona {
    pub name: String,
    pub role: String,
    pub message: String,
}

/// Everything the results view renders for one completed quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationResult {
    pub primary_issue: PrimaryIssue,
    pub top_ingredient: TopIngredient,
    pub bundle: Bundle,
    pub applied_rules: Vec<RuleId>,
    pub headline: String,
    pub subheadline: String,
    pub dosing_instructions: String,
    pub dosage_time: String,
    pub expert: ExpertPersona,
    pub bundle_name: String,
    pub primary_testimonial: Testimonial,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switcher_copy: Option<String>,
    pub comparison_table: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hormonal_warning: Option<String>,
    pub symptom_highlights: Vec<String>,
}

impl PersonalizationResult {
    pub fn fired(&self, rule: RuleId) -> bool {
        self.applied_rules.contains(&rule)
    }
}

/// Derive the protocol for `responses`, addressing the user as `name`.
pub fn derive(responses: &QuizResponse, name: &str) -> PersonalizationResult {
    let mut ctx = rules::EvaluationContext::new(responses);

    rules::classify_primary_issue(&mut ctx);
    rules::tag_descriptive_rules(&mut ctx);
    rules::detect_flags(&mut ctx);
    rules::select_bundle(&mut ctx);

    let dosing = copy::dosing(&ctx);
    let result = PersonalizationResult {
        primary_issue: ctx.primary_issue,
        top_ingredient: copy::top_ingredient(&ctx),
        bundle: ctx.bundle,
        applied_rules: Vec::new(),
        headline: copy::headline(ctx.primary_issue, name),
        subheadline: copy::subheadline(&ctx),
        dosing_instructions: dosing.instructions.to_string(),
        dosage_time: dosing.time_label.to_string(),
        expert: copy::expert(&ctx, name),
        bundle_name: copy::bundle_name(ctx.bundle, name),
        primary_testimonial: copy::testimonial(&ctx).into(),
        switcher_copy: copy::switcher_copy(&ctx).map(str::to_string),
        comparison_table: ctx.fired(RuleId::TriedMelatonin),
        hormonal_warning: copy::hormonal_warning(&ctx).map(str::to_string),
        symptom_highlights: copy::symptom_highlights(&ctx)
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    PersonalizationResult {
        applied_rules: ctx.into_rules(),
        ..result
    }
}
