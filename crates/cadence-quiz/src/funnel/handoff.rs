//! Hand-off of a finished quiz from the email gate to the results view.
//!
//! The quiz step writes three opaque entries once; the results step takes them
//! exactly once. Anything missing or unreadable degrades to the demo profile.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::funnel::domain::{
    AgeBracket, EmotionalState, Gender, HardestTime, HormonalFactor, PreviousAttempt,
    QuizResponse, SleepBarrier, SleepGoal, SleepQuality, StressCoping, StressGoal, StressTrigger,
    Symptom, UserInfo, WakeExperience,
};
use crate::funnel::offer::{BonusWindow, PriceStack, PriceSummary, CHECKOUT_URL};
use crate::funnel::personalization::{derive, PersonalizationResult};

pub const RESPONSES_KEY: &str = "quiz_responses";
pub const USER_KEY: &str = "user_info";
pub const COMPLETED_AT_KEY: &str = "quiz_completed_at";

pub const DEMO_NAME: &str = "Sarah";

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Next id from the process-wide sequence, e.g. `quiz-000001`.
    pub fn next() -> Self {
        let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("quiz-{id:06}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw key-value entries as the store keeps them.
pub type HandoffEntries = BTreeMap<String, String>;

/// Storage for hand-off entries. `take` must remove what it returns.
pub trait HandoffStore: Send + Sync {
    fn save(&self, session: &SessionId, entries: HandoffEntries) -> Result<(), StoreError>;
    fn take(&self, session: &SessionId) -> Result<Option<HandoffEntries>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session {0} already has hand-off data")]
    Conflict(SessionId),
    #[error("hand-off store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("no hand-off data for session")]
    SessionNotFound,
    #[error("hand-off entry `{0}` is missing")]
    MissingEntry(&'static str),
    #[error("hand-off entry `{key}` is unreadable")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode hand-off entry `{key}`")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything the results step needs from the quiz step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandoff {
    pub responses: QuizResponse,
    pub user: UserInfo,
    pub completed_at: DateTime<Utc>,
}

impl SessionHandoff {
    pub fn new(responses: QuizResponse, user: UserInfo, completed_at: DateTime<Utc>) -> Self {
        Self {
            responses,
            user,
            completed_at,
        }
    }

    pub fn to_entries(&self) -> Result<HandoffEntries, HandoffError> {
        let responses = serde_json::to_string(&self.responses).map_err(|source| {
            HandoffError::Encode {
                key: RESPONSES_KEY,
                source,
            }
        })?;
        let user = serde_json::to_string(&self.user).map_err(|source| HandoffError::Encode {
            key: USER_KEY,
            source,
        })?;

        let mut entries = HandoffEntries::new();
        entries.insert(RESPONSES_KEY.to_string(), responses);
        entries.insert(USER_KEY.to_string(), user);
        entries.insert(COMPLETED_AT_KEY.to_string(), self.completed_at.to_rfc3339());
        Ok(entries)
    }

    /// Decode entries; an absent or unparsable completion time becomes `now`.
    pub fn from_entries(entries: &HandoffEntries, now: DateTime<Utc>) -> Result<Self, HandoffError> {
        let responses = decode_entry(entries, RESPONSES_KEY)?;
        let user = decode_entry(entries, USER_KEY)?;
        let completed_at = entries
            .get(COMPLETED_AT_KEY)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|stamp| stamp.with_timezone(&Utc))
            .unwrap_or(now);

        Ok(Self {
            responses,
            user,
            completed_at,
        })
    }

    pub fn save<S>(&self, store: &S, session: &SessionId) -> Result<(), HandoffError>
    where
        S: HandoffStore + ?Sized,
    {
        store.save(session, self.to_entries()?)?;
        debug!(%session, "stored quiz hand-off");
        Ok(())
    }
}

fn decode_entry<T>(entries: &HandoffEntries, key: &'static str) -> Result<T, HandoffError>
where
    T: for<'de> Deserialize<'de>,
{
    let raw = entries.get(key).ok_or(HandoffError::MissingEntry(key))?;
    serde_json::from_str(raw).map_err(|source| HandoffError::Corrupt { key, source })
}

/// Fixed profile shown when a session cannot be read.
pub fn demo_responses() -> QuizResponse {
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

pub fn demo_user() -> UserInfo {
    UserInfo {
        name: DEMO_NAME.to_string(),
        email: String::new(),
        opt_in: false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultsSource {
    Session,
    Demo,
}

/// Data behind the results page: protocol, price stack and bonus clock.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsView {
    pub source: ResultsSource,
    pub user: UserInfo,
    pub personalization: PersonalizationResult,
    pub price_stack: PriceStack,
    pub price_summary: PriceSummary,
    pub bonus: BonusWindow,
    pub bonus_code: &'static str,
    pub countdown: String,
    pub checkout_url: &'static str,
}

impl ResultsView {
    pub fn build(
        source: ResultsSource,
        user: UserInfo,
        responses: &QuizResponse,
        completed_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let personalization = derive(responses, &user.name);
        let price_stack = PriceStack::for_bundle(personalization.bundle);
        let bonus = BonusWindow::starting_at(completed_at);

        Self {
            source,
            price_summary: price_stack.summary(),
            price_stack,
            bonus_code: bonus.active_code(now),
            countdown: bonus.countdown(now),
            bonus,
            checkout_url: CHECKOUT_URL,
            personalization,
            user,
        }
    }
}

/// Read a session's hand-off once and build its results, degrading to the demo profile.
pub fn resolve_results<S>(store: &S, session: &SessionId, now: DateTime<Utc>) -> ResultsView
where
    S: HandoffStore + ?Sized,
{
    let loaded = store
        .take(session)
        .map_err(HandoffError::from)
        .and_then(|entries| {
            let entries = entries.ok_or(HandoffError::SessionNotFound)?;
            SessionHandoff::from_entries(&entries, now)
        });

    match loaded {
        Ok(handoff) => ResultsView::build(
            ResultsSource::Session,
            handoff.user,
            &handoff.responses,
            handoff.completed_at,
            now,
        ),
        Err(err) => {
            warn!(%session, error = %err, "serving demo results");
            ResultsView::build(ResultsSource::Demo, demo_user(), &demo_responses(), now, now)
        }
    }
}
