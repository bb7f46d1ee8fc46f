use serde::Serialize;

use super::domain::{
    AgeBracket, Answer, EmotionalState, Gender, HardestTime, HormonalFactor, PreviousAttempt,
    QuestionId, QuizResponse, SleepBarrier, SleepGoal, SleepQuality, StressCoping, StressGoal,
    StressTrigger, Symptom, WakeExperience, WireValue,
};

/// How many options a respondent may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Single,
    Multi,
    MultiLimited { max: usize },
}

impl QuestionKind {
    pub const fn is_multi(self) -> bool {
        !matches!(self, Self::Single)
    }

    pub const fn max_selections(self) -> Option<usize> {
        match self {
            Self::MultiLimited { max } => Some(max),
            Self::Single | Self::Multi => None,
        }
    }
}

/// Conditional display rule for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Visibility {
    Always,
    WhenEquals {
        question: QuestionId,
        value: &'static str,
    },
}

impl Visibility {
    pub fn applies_to(self, responses: &QuizResponse) -> bool {
        match self {
            Self::Always => true,
            Self::WhenEquals { question, value } => responses.raw_single(question) == Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizOption {
    pub id: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub phase: u8,
    pub prompt: &'static str,
    pub kind: QuestionKind,
    pub options: Vec<QuizOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    pub visibility: Visibility,
}

impl Question {
    pub fn option(&self, id: &str) -> Option<&QuizOption> {
        self.options.iter().find(|option| option.id == id)
    }

    /// Apply one tap on an option to the current answer.
    ///
    /// Single choice replaces the answer. Multi choice toggles the option off
    /// when already selected and appends it otherwise, unless the selection
    /// limit is already reached.
    pub fn toggle(&self, current: Option<&Answer>, option_id: &str) -> Answer {
        if !self.kind.is_multi() {
            return Answer::Single(option_id.to_string());
        }

        let mut selected: Vec<String> = match current {
            Some(Answer::Multi(values)) => values.clone(),
            Some(Answer::Single(value)) if !value.is_empty() => vec![value.clone()],
            _ => Vec::new(),
        };

        if let Some(position) = selected.iter().position(|value| value == option_id) {
            selected.remove(position);
        } else if self
            .kind
            .max_selections()
            .map_or(true, |max| selected.len() < max)
        {
            selected.push(option_id.to_string());
        }

        Answer::Multi(selected)
    }
}

/// Ordered question definitions driving the quiz UI.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

const PHASE_LABELS: [&str; 5] = [
    "Sleep Baseline",
    "Stress & Lifestyle",
    "Symptoms & Goals",
    "Current Solutions",
    "About You",
];

pub fn phase_label(phase: u8) -> Option<&'static str> {
    usize::from(phase)
        .checked_sub(1)
        .and_then(|index| PHASE_LABELS.get(index).copied())
}

fn opt<T: WireValue>(value: T, label: &'static str, icon: &'static str) -> QuizOption {
    QuizOption {
        id: value.as_wire(),
        label,
        icon: if icon.is_empty() { None } else { Some(icon) },
    }
}

fn question(
    id: QuestionId,
    phase: u8,
    prompt: &'static str,
    kind: QuestionKind,
    options: Vec<QuizOption>,
) -> Question {
    Question {
        id,
        phase,
        prompt,
        kind,
        options,
        hint: None,
        visibility: Visibility::Always,
    }
}

impl QuestionCatalog {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// The sleep & stress assessment as shipped with the funnel.
    pub fn standard() -> Self {
        let select_all = Some("Select all that apply.");
        let pick_three = Some("Pick up to 3.");

        let questions = vec![
            question(
                QuestionId::SleepQuality,
                1,
                "How would you describe your sleep lately?",
                QuestionKind::Single,
                vec![
                    opt(SleepQuality::HardFall, "I lie awake for ages before falling asleep", "😵"),
                    opt(SleepQuality::WakeNight, "I fall asleep but wake up during the night", "🌙"),
                    opt(SleepQuality::RarelyRestful, "I sleep enough hours but rarely feel rested", "😴"),
                    opt(SleepQuality::WiredTired, "Stress leaves me wired and tired at the same time", "⚡"),
                ],
            ),
            Question {
                hint: select_all,
                ..question(
                    QuestionId::SleepBarriers,
                    1,
                    "What usually keeps you from sleeping?",
                    QuestionKind::Multi,
                    vec![
                        opt(SleepBarrier::RacingThoughts, "Racing thoughts I can't switch off", "🧠"),
                        opt(SleepBarrier::Anxiety, "Anxiety or worry", "😟"),
                        opt(SleepBarrier::Tension, "Physical tension or restlessness", "💪"),
                        opt(SleepBarrier::Environment, "Noise, light, or temperature", "🔊"),
                        opt(SleepBarrier::Schedule, "An irregular schedule", "🕑"),
                        opt(SleepBarrier::NoneOfThese, "None of these", ""),
                    ],
                )
            },
            Question {
                hint: select_all,
                ..question(
                    QuestionId::WakeUpExperience,
                    1,
                    "How do you usually feel when you wake up?",
                    QuestionKind::Multi,
                    vec![
                        opt(WakeExperience::Groggy, "Groggy or foggy-headed", "🌫️"),
                        opt(WakeExperience::Tired, "Still tired", "🥱"),
                        opt(WakeExperience::Irritable, "Irritable", "😤"),
                        opt(WakeExperience::Wired, "Wired but exhausted", "⚡"),
                        opt(WakeExperience::Refreshed, "Refreshed", "☀️"),
                    ],
                )
            },
            Question {
                hint: select_all,
                ..question(
                    QuestionId::EmotionalBaseline,
                    2,
                    "How have you been feeling most days?",
                    QuestionKind::Multi,
                    vec![
                        opt(EmotionalState::Stressed, "Stressed", "😣"),
                        opt(EmotionalState::RacingMind, "My mind won't slow down", "🌀"),
                        opt(EmotionalState::Overwhelmed, "Overwhelmed", "🌊"),
                        opt(EmotionalState::Irritable, "Short-tempered", "😠"),
                        opt(EmotionalState::LowMood, "Low or flat", "😔"),
                        opt(EmotionalState::Calm, "Mostly calm", "😌"),
                    ],
                )
            },
            Question {
                hint: select_all,
                ..question(
                    QuestionId::StressTriggers,
                    2,
                    "What drives most of your stress?",
                    QuestionKind::Multi,
                    vec![
                        opt(StressTrigger::Work, "Work or career pressure", "💼"),
                        opt(StressTrigger::Overthinking, "Overthinking everything", "🤯"),
                        opt(StressTrigger::Family, "Family or relationships", "👨‍👩‍👧"),
                        opt(StressTrigger::NoTime, "Never enough time", "⏳"),
                        opt(StressTrigger::Finances, "Money worries", "💸"),
                        opt(StressTrigger::Health, "Health concerns", "🩺"),
                    ],
                )
            },
            question(
                QuestionId::StressManagement,
                2,
                "How do you currently wind down?",
                QuestionKind::Multi,
                vec![
                    opt(StressCoping::Exercise, "Exercise", "🏃"),
                    opt(StressCoping::Meditation, "Meditation or breathing", "🧘"),
                    opt(StressCoping::Reading, "Reading", "📚"),
                    opt(StressCoping::Screens, "TV or scrolling", "📱"),
                    opt(StressCoping::NothingWorks, "Nothing really works", "🤷"),
                ],
            ),
            Question {
                hint: select_all,
                ..question(
                    QuestionId::Symptoms,
                    3,
                    "Which of these do you experience regularly?",
                    QuestionKind::Multi,
                    vec![
                        opt(Symptom::RacingThoughts, "Racing thoughts at night", "🧠"),
                        opt(Symptom::MuscleTension, "Muscle tension", "💪"),
                        opt(Symptom::HeartRacing, "Heart racing when stressed", "💓"),
                        opt(Symptom::Fatigue, "Daytime fatigue", "🔋"),
                        opt(Symptom::Headaches, "Tension headaches", "🤕"),
                        opt(Symptom::Irritability, "Irritability", "😤"),
                        opt(Symptom::BrainFog, "Brain fog", "🌫️"),
                        opt(Symptom::NoneOfThese, "None of these", ""),
                    ],
                )
            },
            Question {
                hint: pick_three,
                ..question(
                    QuestionId::SleepGoals,
                    3,
                    "What would you most like to change about your sleep?",
                    QuestionKind::MultiLimited { max: 3 },
                    vec![
                        opt(SleepGoal::FallFaster, "Fall asleep faster", "💤"),
                        opt(SleepGoal::StayAsleep, "Stay asleep through the night", "🌙"),
                        opt(SleepGoal::DeeperSleep, "Get deeper sleep", "🛌"),
                        opt(SleepGoal::WakeRefreshed, "Wake up refreshed", "☀️"),
                        opt(SleepGoal::StopMelatonin, "Stop relying on melatonin", "💊"),
                        opt(SleepGoal::ReduceAnxiety, "Feel less anxious at bedtime", "🕊️"),
                    ],
                )
            },
            Question {
                hint: pick_three,
                ..question(
                    QuestionId::StressGoals,
                    3,
                    "And what about your days?",
                    QuestionKind::MultiLimited { max: 3 },
                    vec![
                        opt(StressGoal::Calmer, "Feel calmer", "😌"),
                        opt(StressGoal::ClearThinking, "Think more clearly", "💡"),
                        opt(StressGoal::SleepImpact, "Stop stress from wrecking my sleep", "🛏️"),
                        opt(StressGoal::MoreEnergy, "Have more energy", "⚡"),
                        opt(StressGoal::BetterMood, "Be in a better mood", "🙂"),
                    ],
                )
            },
            Question {
                hint: select_all,
                ..question(
                    QuestionId::PreviousAttempts,
                    4,
                    "What have you already tried?",
                    QuestionKind::Multi,
                    vec![
                        opt(PreviousAttempt::Melatonin, "Melatonin", "💊"),
                        opt(PreviousAttempt::Magnesium, "Magnesium", "🧂"),
                        opt(PreviousAttempt::PrescriptionSleep, "Prescription sleep aids", "📋"),
                        opt(PreviousAttempt::HerbalTea, "Herbal teas", "🍵"),
                        opt(PreviousAttempt::Cbd, "CBD", "🌿"),
                        opt(PreviousAttempt::TriedALot, "I've tried a lot and nothing sticks", "🔁"),
                        opt(PreviousAttempt::Nothing, "Nothing yet", "🆕"),
                    ],
                )
            },
            Question {
                hint: select_all,
                ..question(
                    QuestionId::HardestTime,
                    4,
                    "When is stress hardest for you?",
                    QuestionKind::Multi,
                    vec![
                        opt(HardestTime::Morning, "Mornings", "🌅"),
                        opt(HardestTime::Evening, "Evenings after work", "🌆"),
                        opt(HardestTime::Bedtime, "At bedtime", "🛏️"),
                        opt(HardestTime::MiddleNight, "In the middle of the night", "🌑"),
                        opt(HardestTime::AllDay, "All day long", "🔄"),
                    ],
                )
            },
            question(
                QuestionId::Age,
                5,
                "How old are you?",
                QuestionKind::Single,
                vec![
                    opt(AgeBracket::From18To24, "18-24", ""),
                    opt(AgeBracket::From25To34, "25-34", ""),
                    opt(AgeBracket::From35To44, "35-44", ""),
                    opt(AgeBracket::From45To54, "45-54", ""),
                    opt(AgeBracket::From55To64, "55-64", ""),
                    opt(AgeBracket::Over65, "65+", ""),
                ],
            ),
            question(
                QuestionId::Gender,
                5,
                "What is your gender?",
                QuestionKind::Single,
                vec![
                    opt(Gender::Female, "Female", ""),
                    opt(Gender::Male, "Male", ""),
                    opt(Gender::NonBinary, "Non-binary", ""),
                    opt(Gender::PreferNot, "Prefer not to say", ""),
                ],
            ),
            Question {
                hint: Some("This helps us flag anything to check with your doctor."),
                visibility: Visibility::WhenEquals {
                    question: QuestionId::Gender,
                    value: "female",
                },
                ..question(
                    QuestionId::HormonalFactors,
                    5,
                    "Do any of these apply to you right now?",
                    QuestionKind::Multi,
                    vec![
                        opt(HormonalFactor::Pms, "PMS-related sleep changes", ""),
                        opt(HormonalFactor::Menopause, "Perimenopause or menopause", ""),
                        opt(HormonalFactor::Pregnant, "Pregnant or breastfeeding", ""),
                        opt(HormonalFactor::NoneOfThese, "None of these", ""),
                    ],
                )
            },
        ];

        Self::new(questions)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    /// Questions to show given what has been answered so far.
    pub fn visible_questions(&self, responses: &QuizResponse) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|question| question.visibility.applies_to(responses))
            .collect()
    }
}

impl Default for QuestionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
