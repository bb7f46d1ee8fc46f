use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Closed enumeration carried on the wire as a fixed string id.
pub trait WireValue: Copy + Sized + 'static {
    fn from_wire(raw: &str) -> Option<Self>;
    fn as_wire(self) -> &'static str;
}

/// Answer option enumeration bound to the question that offers it.
pub trait QuizAnswer: WireValue {
    const QUESTION: QuestionId;
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];
        }

        impl WireValue for $name {
            fn from_wire(raw: &str) -> Option<Self> {
                match raw {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn as_wire(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_wire())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_wire())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::from_wire(&raw).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "unknown {} value '{}'",
                        stringify!($name),
                        raw
                    ))
                })
            }
        }
    };
}

macro_rules! answer_enum {
    (
        $(#[$meta:meta])*
        $name:ident for $question:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        wire_enum! {
            $(#[$meta])*
            $name { $($variant => $wire),+ }
        }

        impl QuizAnswer for $name {
            const QUESTION: QuestionId = QuestionId::$question;
        }
    };
}

wire_enum! {
    /// Question keys shared by the catalog, the response record, and the lead payload.
    QuestionId {
        SleepQuality => "q1_sleep_quality",
        SleepBarriers => "q2_sleep_barriers",
        WakeUpExperience => "q3_wake_up_experience",
        EmotionalBaseline => "q4_emotional_baseline",
        StressTriggers => "q5_stress_triggers",
        StressManagement => "q6_stress_management",
        Symptoms => "q7_symptoms",
        SleepGoals => "q8_sleep_goals",
        StressGoals => "q9_stress_goals",
        PreviousAttempts => "q10_previous_attempts",
        HardestTime => "q11_hardest_time",
        Age => "q12_age",
        Gender => "q12_gender",
        HormonalFactors => "q12_hormonal",
    }
}

answer_enum! {
    SleepQuality for SleepQuality {
        HardFall => "hard_fall",
        WakeNight => "wake_night",
        RarelyRestful => "rarely_restful",
        WiredTired => "wired_tired",
    }
}

answer_enum! {
    SleepBarrier for SleepBarriers {
        RacingThoughts => "racing_thoughts",
        Anxiety => "anxiety",
        Tension => "tension",
        Environment => "environment",
        Schedule => "schedule",
        NoneOfThese => "none",
    }
}

answer_enum! {
    WakeExperience for WakeUpExperience {
        Groggy => "groggy",
        Tired => "tired",
        Irritable => "irritable",
        Wired => "wired",
        Refreshed => "refreshed",
    }
}

answer_enum! {
    EmotionalState for EmotionalBaseline {
        Stressed => "stressed",
        RacingMind => "racing_mind",
        Overwhelmed => "overwhelmed",
        Irritable => "irritable",
        LowMood => "low_mood",
        Calm => "calm",
    }
}

answer_enum! {
    StressTrigger for StressTriggers {
        Work => "work",
        Overthinking => "overthinking",
        Family => "family",
        NoTime => "no_time",
        Finances => "finances",
        Health => "health",
    }
}

answer_enum! {
    StressCoping for StressManagement {
        Exercise => "exercise",
        Meditation => "meditation",
        Reading => "reading",
        Screens => "screens",
        NothingWorks => "nothing_works",
    }
}

answer_enum! {
    Symptom for Symptoms {
        RacingThoughts => "racing_thoughts",
        MuscleTension => "muscle_tension",
        HeartRacing => "heart_racing",
        Fatigue => "fatigue",
        Headaches => "headaches",
        Irritability => "irritability",
        BrainFog => "brain_fog",
        NoneOfThese => "none",
    }
}

answer_enum! {
    SleepGoal for SleepGoals {
        FallFaster => "fall_faster",
        StayAsleep => "stay_asleep",
        DeeperSleep => "deeper_sleep",
        WakeRefreshed => "wake_refreshed",
        StopMelatonin => "stop_melatonin",
        ReduceAnxiety => "reduce_anxiety",
    }
}

answer_enum! {
    StressGoal for StressGoals {
        Calmer => "calmer",
        ClearThinking => "clear_thinking",
        SleepImpact => "sleep_impact",
        MoreEnergy => "more_energy",
        BetterMood => "better_mood",
    }
}

answer_enum! {
    PreviousAttempt for PreviousAttempts {
        Melatonin => "melatonin",
        Magnesium => "magnesium",
        PrescriptionSleep => "prescription_sleep",
        HerbalTea => "herbal_tea",
        Cbd => "cbd",
        TriedALot => "tried_a_lot",
        Nothing => "nothing",
    }
}

answer_enum! {
    HardestTime for HardestTime {
        Morning => "morning",
        Evening => "evening",
        Bedtime => "bedtime",
        MiddleNight => "middle_night",
        AllDay => "all_day",
    }
}

answer_enum! {
    /// The youngest bracket is the only one eligible for the starter bundle.
    AgeBracket for Age {
        From18To24 => "18-24",
        From25To34 => "25-34",
        From35To44 => "35-44",
        From45To54 => "45-54",
        From55To64 => "55-64",
        Over65 => "65+",
    }
}

answer_enum! {
    Gender for Gender {
        Female => "female",
        Male => "male",
        NonBinary => "non_binary",
        PreferNot => "prefer_not",
    }
}

answer_enum! {
    HormonalFactor for HormonalFactors {
        Pms => "pms",
        Menopause => "menopause",
        Pregnant => "pregnant",
        NoneOfThese => "none",
    }
}

/// Raw wire answer: one option id, a selection of option ids, or nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Multi(Vec<String>),
    Unset,
}

/// Any JSON value is accepted. Non-string array items are dropped and every
/// other shape (null, numbers, booleans, objects) reads as `Unset`.
impl<'de> Deserialize<'de> for Answer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(value) => Self::Single(value),
            serde_json::Value::Array(items) => Self::Multi(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        serde_json::Value::String(value) => Some(value),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => Self::Unset,
        })
    }
}

impl Answer {
    pub fn single<T: WireValue>(value: T) -> Self {
        Self::Single(value.as_wire().to_string())
    }

    pub fn multi<T, I>(values: I) -> Self
    where
        T: WireValue,
        I: IntoIterator<Item = T>,
    {
        Self::Multi(
            values
                .into_iter()
                .map(|value| value.as_wire().to_string())
                .collect(),
        )
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<&str>> for Answer {
    fn from(values: Vec<&str>) -> Self {
        Self::Multi(values.into_iter().map(str::to_string).collect())
    }
}

/// Answers keyed by question id, exactly as the quiz collected them.
///
/// Readers never fail: an absent answer is an empty selection, unknown keys
/// are ignored, and unknown option ids are dropped by the typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizResponse {
    answers: BTreeMap<String, Answer>,
}

impl QuizResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single-choice answer.
    pub fn choose<T: QuizAnswer>(mut self, value: T) -> Self {
        self.set(T::QUESTION, Answer::single(value));
        self
    }

    /// Record a multi-choice selection, preserving display order.
    pub fn select<T, I>(mut self, values: I) -> Self
    where
        T: QuizAnswer,
        I: IntoIterator<Item = T>,
    {
        self.set(T::QUESTION, Answer::multi(values));
        self
    }

    pub fn with_answer(mut self, question: QuestionId, answer: impl Into<Answer>) -> Self {
        self.set(question, answer.into());
        self
    }

    pub fn set(&mut self, question: QuestionId, answer: Answer) {
        self.answers.insert(question.as_wire().to_string(), answer);
    }

    pub fn get(&self, question: QuestionId) -> Option<&Answer> {
        self.answers.get(question.as_wire())
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn raw_single(&self, question: QuestionId) -> Option<&str> {
        match self.get(question)? {
            Answer::Single(value) if !value.is_empty() => Some(value.as_str()),
            _ => None,
        }
    }

    /// Wire ids of a selection; a scalar answer reads as a one-element selection.
    pub fn raw_multi(&self, question: QuestionId) -> Vec<&str> {
        match self.get(question) {
            Some(Answer::Multi(values)) => values.iter().map(String::as_str).collect(),
            Some(Answer::Single(value)) if !value.is_empty() => vec![value.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn single<T: QuizAnswer>(&self) -> Option<T> {
        self.raw_single(T::QUESTION).and_then(T::from_wire)
    }

    pub fn multi<T: QuizAnswer>(&self) -> Vec<T> {
        let mut selected: Vec<T> = Vec::new();
        for value in self
            .raw_multi(T::QUESTION)
            .into_iter()
            .filter_map(T::from_wire)
        {
            if !selected.iter().any(|existing| existing.as_wire() == value.as_wire()) {
                selected.push(value);
            }
        }
        selected
    }

    pub fn includes<T: QuizAnswer>(&self, value: T) -> bool {
        self.raw_multi(T::QUESTION).contains(&value.as_wire())
    }

    pub fn is<T: QuizAnswer>(&self, value: T) -> bool {
        self.raw_single(T::QUESTION) == Some(value.as_wire())
    }

    /// Number of selections on a question, optionally ignoring a sentinel option.
    pub fn selection_count(&self, question: QuestionId, excluding: Option<&str>) -> usize {
        self.raw_multi(question)
            .into_iter()
            .filter(|value| Some(*value) != excluding)
            .count()
    }
}

/// Contact details captured at the email gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub opt_in: bool,
}

pub const DEFAULT_DISPLAY_NAME: &str = "Friend";

impl UserInfo {
    /// Apply the email gate: a usable address is required, a blank name becomes "Friend".
    pub fn capture(name: &str, email: &str, opt_in: bool) -> Result<Self, CaptureError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(CaptureError::InvalidEmail);
        }

        let name = name.trim();
        let name = if name.is_empty() {
            DEFAULT_DISPLAY_NAME
        } else {
            name
        };

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            opt_in,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_questions_read_as_empty_selections() {
        let responses = QuizResponse::new();

        assert!(responses.multi::<Symptom>().is_empty());
        assert!(responses.single::<SleepQuality>().is_none());
        assert_eq!(responses.selection_count(QuestionId::Symptoms, Some("none")), 0);
    }

    #[test]
    fn unknown_keys_and_option_ids_are_ignored() {
        let responses: QuizResponse = serde_json::from_str(
            r#"{
                "q7_symptoms": ["racing_thoughts", "sparkles", "racing_thoughts"],
                "q1_sleep_quality": "sleeps_like_a_cat",
                "utm_source": "newsletter",
                "utm_score": 5,
                "quiz_meta": { "v": 1, "tags": ["a"] },
                "q12_hormonal": null
            }"#,
        )
        .expect("lenient response payload");

        assert_eq!(responses.multi::<Symptom>(), vec![Symptom::RacingThoughts]);
        assert!(responses.single::<SleepQuality>().is_none());
        assert!(responses.multi::<HormonalFactor>().is_empty());
        assert_eq!(responses.raw_multi(QuestionId::Symptoms).len(), 3);
    }

    #[test]
    fn non_string_values_read_as_unanswered() {
        let responses: QuizResponse = serde_json::from_str(
            r#"{
                "q1_sleep_quality": 3,
                "q7_symptoms": ["fatigue", 7, null, { "id": "headaches" }],
                "q11_hardest_time": { "value": "bedtime" },
                "q12_gender": true
            }"#,
        )
        .expect("lenient response payload");

        assert!(responses.single::<SleepQuality>().is_none());
        assert_eq!(responses.multi::<Symptom>(), vec![Symptom::Fatigue]);
        assert!(responses.multi::<HardestTime>().is_empty());
        assert_eq!(responses.get(QuestionId::Gender), Some(&Answer::Unset));
        assert!(!responses.is(Gender::Female));
    }

    #[test]
    fn scalar_answer_reads_as_single_selection() {
        let responses = QuizResponse::new().with_answer(QuestionId::HardestTime, "bedtime");

        assert_eq!(responses.multi::<HardestTime>(), vec![HardestTime::Bedtime]);
        assert!(responses.includes(HardestTime::Bedtime));
    }

    #[test]
    fn typed_builders_use_wire_ids() {
        let responses = QuizResponse::new()
            .choose(AgeBracket::Over65)
            .select([PreviousAttempt::Melatonin, PreviousAttempt::TriedALot]);

        assert_eq!(responses.raw_single(QuestionId::Age), Some("65+"));
        assert_eq!(
            responses.raw_multi(QuestionId::PreviousAttempts),
            vec!["melatonin", "tried_a_lot"]
        );
        let json = serde_json::to_value(&responses).expect("serializes");
        assert_eq!(json["q12_age"], "65+");
    }

    #[test]
    fn email_gate_requires_an_address() {
        assert_eq!(
            UserInfo::capture("Alex", "not-an-email", true),
            Err(CaptureError::InvalidEmail)
        );
        assert_eq!(
            CaptureError::InvalidEmail.to_string(),
            "Please enter a valid email address."
        );

        let user = UserInfo::capture("  ", " sam@example.com ", false).expect("valid email");
        assert_eq!(user.name, "Friend");
        assert_eq!(user.email, "sam@example.com");
        assert!(!user.opt_in);
    }
}
