//! Lead capture: profile properties and delivery to the email-marketing platform.
//!
//! Delivery is best-effort. [`LeadForwarder`] turns every failure into a logged
//! [`LeadOutcome`] so the quiz flow never waits on or fails because of it.

mod forwarder;
mod klaviyo;
mod profile;

pub use forwarder::{LeadForwarder, LeadOutcome};
pub use klaviyo::{KlaviyoClient, LeadDispatchError, LeadSink, SUBSCRIPTION_JOBS_PATH};
pub use profile::{LeadSubmission, ProfileProperties, SubscriptionRequest, QUIZ_VERSION};
