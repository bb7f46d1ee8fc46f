use std::future::Future;
use std::time::Duration;

use super::profile::{LeadSubmission, SubscriptionRequest};
use crate::config::MarketingConfig;

pub const SUBSCRIPTION_JOBS_PATH: &str = "/profile-subscription-bulk-create-jobs/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Destination for captured leads.
pub trait LeadSink: Send + Sync {
    fn subscribe(
        &self,
        lead: &LeadSubmission,
    ) -> impl Future<Output = Result<(), LeadDispatchError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum LeadDispatchError {
    #[error("failed to build marketing http client")]
    Client(#[source] reqwest::Error),
    #[error("marketing api rejected subscription with status {status}")]
    Rejected { status: u16, body: String },
    #[error("marketing api unreachable")]
    Transport(#[source] reqwest::Error),
}

/// Klaviyo v3 client for the bulk profile subscription endpoint.
#[derive(Clone)]
pub struct KlaviyoClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    list_id: String,
    revision: String,
}

impl KlaviyoClient {
    pub fn new(
        api_base: &str,
        api_key: impl Into<String>,
        list_id: impl Into<String>,
        revision: impl Into<String>,
    ) -> Result<Self, LeadDispatchError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(LeadDispatchError::Client)?;

        Ok(Self {
            http,
            endpoint: format!("{}{SUBSCRIPTION_JOBS_PATH}", api_base.trim_end_matches('/')),
            api_key: api_key.into(),
            list_id: list_id.into(),
            revision: revision.into(),
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &MarketingConfig) -> Result<Option<Self>, LeadDispatchError> {
        match config.api_key.as_deref() {
            Some(key) => Self::new(&config.api_base, key, &config.list_id, &config.revision).map(Some),
            None => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn list_id(&self) -> &str {
        &self.list_id
    }
}

impl std::fmt::Debug for KlaviyoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KlaviyoClient")
            .field("endpoint", &self.endpoint)
            .field("list_id", &self.list_id)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl LeadSink for KlaviyoClient {
    async fn subscribe(&self, lead: &LeadSubmission) -> Result<(), LeadDispatchError> {
        let request = SubscriptionRequest::new(lead, &self.list_id);

        let response = self
            .http
            .post(&self.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Klaviyo-API-Key {}", self.api_key),
            )
            .header("revision", &self.revision)
            .json(&request)
            .send()
            .await
            .map_err(LeadDispatchError::Transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(LeadDispatchError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> MarketingConfig {
        MarketingConfig {
            api_key: api_key.map(str::to_string),
            api_base: "https://a.klaviyo.com/api/".to_string(),
            ..MarketingConfig::default()
        }
    }

    #[test]
    fn missing_key_disables_client() {
        let client = KlaviyoClient::from_config(&config(None)).expect("build");

        assert!(client.is_none());
    }

    #[test]
    fn endpoint_joins_base_and_jobs_path() {
        let client = KlaviyoClient::from_config(&config(Some("pk_test")))
            .expect("build")
            .expect("enabled");

        assert_eq!(
            client.endpoint(),
            "https://a.klaviyo.com/api/profile-subscription-bulk-create-jobs/"
        );
        assert_eq!(client.list_id(), "RdvieM");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let client = KlaviyoClient::new("http://localhost:9", "pk_secret", "L1", "2024-10-15")
            .expect("build");

        assert!(!format!("{client:?}").contains("pk_secret"));
    }
}
