use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::funnel::domain::{PreviousAttempt, QuestionId, QuizResponse, SleepQuality, UserInfo};
use crate::funnel::personalization::PrimaryIssue;

pub const QUIZ_VERSION: &str = "v1";

/// Flattened quiz answers attached to the marketing profile for segmentation.
///
/// Built from the raw responses, independently of the personalization result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileProperties {
    pub first_name: String,
    pub quiz_completed_at: String,
    pub quiz_version: &'static str,
    pub primary_issue: PrimaryIssue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q1_sleep_quality: Option<String>,
    pub stress_triggers: String,
    pub symptoms: String,
    pub sleep_goals: String,
    pub stress_goals: String,
    pub tried_melatonin: bool,
    pub tried_magnesium: bool,
    pub tried_a_lot: bool,
    pub first_timer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub hormonal_factors: String,
    pub hardest_time: String,
    pub email_opt_in: bool,
}

impl ProfileProperties {
    pub fn from_responses(
        responses: &QuizResponse,
        user: &UserInfo,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let joined = |question: QuestionId| responses.raw_multi(question).join(",");
        let raw = |question: QuestionId| responses.raw_single(question).map(str::to_string);

        Self {
            first_name: user.name.clone(),
            quiz_completed_at: completed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            quiz_version: QUIZ_VERSION,
            primary_issue: PrimaryIssue::classify(responses.single::<SleepQuality>()),
            q1_sleep_quality: raw(QuestionId::SleepQuality),
            stress_triggers: joined(QuestionId::StressTriggers),
            symptoms: joined(QuestionId::Symptoms),
            sleep_goals: joined(QuestionId::SleepGoals),
            stress_goals: joined(QuestionId::StressGoals),
            tried_melatonin: responses.includes(PreviousAttempt::Melatonin),
            tried_magnesium: responses.includes(PreviousAttempt::Magnesium),
            tried_a_lot: responses.includes(PreviousAttempt::TriedALot),
            first_timer: responses.includes(PreviousAttempt::Nothing),
            age_range: raw(QuestionId::Age),
            gender: raw(QuestionId::Gender),
            hormonal_factors: joined(QuestionId::HormonalFactors),
            hardest_time: joined(QuestionId::HardestTime),
            email_opt_in: user.opt_in,
        }
    }
}

/// A captured lead ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadSubmission {
    pub email: String,
    pub first_name: String,
    pub opt_in: bool,
    pub properties: ProfileProperties,
}

impl LeadSubmission {
    pub fn new(responses: &QuizResponse, user: &UserInfo, completed_at: DateTime<Utc>) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.name.clone(),
            opt_in: user.opt_in,
            properties: ProfileProperties::from_responses(responses, user, completed_at),
        }
    }

    pub fn consent(&self) -> &'static str {
        if self.opt_in {
            "SUBSCRIBED"
        } else {
            "UNSUBSCRIBED"
        }
    }
}

/// JSON:API document for a bulk profile subscription job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SubscriptionRequest(Value);

impl SubscriptionRequest {
    pub fn new(lead: &LeadSubmission, list_id: &str) -> Self {
        Self(json!({
            "data": {
                "type": "profile-subscription-bulk-create-job",
                "attributes": {
                    "profiles": {
                        "data": [{
                            "type": "profile",
                            "attributes": {
                                "email": lead.email,
                                "first_name": lead.first_name,
                                "properties": lead.properties,
                                "subscriptions": {
                                    "email": {
                                        "marketing": { "consent": lead.consent() }
                                    }
                                }
                            }
                        }]
                    },
                    "historical_import": false,
                    "list_id": list_id,
                }
            }
        }))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}
