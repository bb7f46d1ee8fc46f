use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::klaviyo::{KlaviyoClient, LeadDispatchError, LeadSink};
use super::profile::LeadSubmission;
use crate::config::MarketingConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadOutcome {
    Delivered,
    /// No marketing credential is configured.
    Skipped,
    Rejected { status: u16 },
    Failed { reason: String },
}

/// Single-attempt, never-failing delivery of captured leads.
pub struct LeadForwarder<S> {
    sink: Option<Arc<S>>,
}

impl<S> Clone for LeadForwarder<S> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
        }
    }
}

impl<S> std::fmt::Debug for LeadForwarder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadForwarder")
            .field("enabled", &self.sink.is_some())
            .finish()
    }
}

impl<S> LeadForwarder<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Some(Arc::new(sink)),
        }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }
}

impl LeadForwarder<KlaviyoClient> {
    pub fn from_config(config: &MarketingConfig) -> Result<Self, LeadDispatchError> {
        Ok(match KlaviyoClient::from_config(config)? {
            Some(client) => Self::new(client),
            None => Self::disabled(),
        })
    }
}

impl<S> LeadForwarder<S>
where
    S: LeadSink + 'static,
{
    pub async fn forward(&self, lead: &LeadSubmission) -> LeadOutcome {
        let Some(sink) = self.sink.as_ref() else {
            warn!("marketing api key not configured, skipping lead subscription");
            return LeadOutcome::Skipped;
        };

        match sink.subscribe(lead).await {
            Ok(()) => {
                info!(opt_in = lead.opt_in, "lead subscribed");
                LeadOutcome::Delivered
            }
            Err(LeadDispatchError::Rejected { status, body }) => {
                error!(status, body = %body, "marketing api rejected lead");
                LeadOutcome::Rejected { status }
            }
            Err(err) => {
                error!(error = %err, "lead subscription failed");
                LeadOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Fire-and-forget delivery on the current runtime.
    pub fn spawn(&self, lead: LeadSubmission) -> JoinHandle<LeadOutcome> {
        let forwarder = self.clone();
        tokio::spawn(async move { forwarder.forward(&lead).await })
    }
}
