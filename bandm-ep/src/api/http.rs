//! HTTP client for the band-management backend
//!
//! JSON over HTTP with an optional bearer token. Timeouts are the transport's
//! concern and come from [`ClientConfig::request_timeout_secs`].

use std::time::Duration;

use async_trait::async_trait;
use bandm_common::config::ClientConfig;
use bandm_common::models::{
    Escalation, Event, EventFilter, Integrant, Lineup, Member, NewEscalation, PriorityEntry, Role,
};
use bandm_common::{BandId, EscalationId, EventId, LineupId};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ApiError, ApiResult, BandApi};

const USER_AGENT: &str = concat!("bandm-ep/", env!("CARGO_PKG_VERSION"));

/// Escalation as returned by the backend; list payloads may omit the event id
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EscalationRecord {
    id: EscalationId,
    #[serde(default)]
    event_id: Option<EventId>,
    role: Role,
    user: Member,
}

impl EscalationRecord {
    fn into_escalation(self, event_id: &EventId) -> Escalation {
        Escalation {
            id: self.id,
            event_id: self.event_id.unwrap_or_else(|| event_id.clone()),
            role: self.role,
            user: self.user,
        }
    }
}

/// reqwest-backed [`BandApi`]
pub struct HttpBandApi {
    http_client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBandApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Transport(format!("invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Transport(format!("invalid base URL {base_url}")));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            token,
        })
    }

    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        Self::new(
            &config.api_base_url,
            config.api_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Base URL with percent-encoded path segments appended
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http_client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> ApiResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify(status, what, body))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> ApiResult<T> {
        let response = self.send(builder, what).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("{what}: {e}")))
    }
}

/// Map a non-success status onto the planner's error classes
fn classify(status: StatusCode, what: &str, body: String) -> ApiError {
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(what.to_string()),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            let reason = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            ApiError::Conflict(format!("{what}: {reason}"))
        }
        _ => ApiError::Transport(format!("{what}: HTTP {}", status.as_u16())),
    }
}

#[async_trait]
impl BandApi for HttpBandApi {
    async fn list_escalations(&self, event_id: &EventId) -> ApiResult<Vec<Escalation>> {
        let url = self.endpoint(&["events", event_id.as_str(), "escalations"]);
        tracing::debug!(event_id = %event_id, url = %url, "Listing escalations");

        let records: Vec<EscalationRecord> = self
            .send_json(self.request(Method::GET, url), &format!("escalations of event {event_id}"))
            .await?;
        Ok(records
            .into_iter()
            .map(|r| r.into_escalation(event_id))
            .collect())
    }

    async fn create_escalation(
        &self,
        event_id: &EventId,
        escalation: &NewEscalation,
    ) -> ApiResult<Escalation> {
        let url = self.endpoint(&["events", event_id.as_str(), "escalations"]);
        tracing::debug!(
            event_id = %event_id,
            role_id = %escalation.role_id,
            user_id = %escalation.user_id,
            "Creating escalation"
        );

        let record: EscalationRecord = self
            .send_json(
                self.request(Method::POST, url).json(escalation),
                &format!("escalation for event {event_id}"),
            )
            .await?;
        Ok(record.into_escalation(event_id))
    }

    async fn delete_escalation(&self, escalation_id: &EscalationId) -> ApiResult<()> {
        let url = self.endpoint(&["escalations", escalation_id.as_str()]);
        tracing::debug!(escalation_id = %escalation_id, "Deleting escalation");

        self.send(self.request(Method::DELETE, url), &format!("escalation {escalation_id}"))
            .await?;
        Ok(())
    }

    async fn get_lineup(&self, lineup_id: &LineupId) -> ApiResult<Lineup> {
        let url = self.endpoint(&["lineups", lineup_id.as_str()]);
        self.send_json(self.request(Method::GET, url), &format!("lineup {lineup_id}"))
            .await
    }

    async fn get_priority_list(&self, role_slug: &str, band_id: &BandId) -> ApiResult<Vec<PriorityEntry>> {
        let url = self.endpoint(&["bands", band_id.as_str(), "roles", role_slug, "priority"]);
        tracing::debug!(band_id = %band_id, role_slug = %role_slug, "Fetching priority list");

        self.send_json(
            self.request(Method::GET, url),
            &format!("priority list for {role_slug}"),
        )
        .await
    }

    async fn list_band_members(&self, band_id: &BandId) -> ApiResult<Vec<Member>> {
        let url = self.endpoint(&["bands", band_id.as_str(), "integrants"]);
        let integrants: Vec<Integrant> = self
            .send_json(self.request(Method::GET, url), &format!("members of band {band_id}"))
            .await?;
        Ok(integrants.into_iter().map(|i| i.user).collect())
    }

    async fn list_roles(&self) -> ApiResult<Vec<Role>> {
        let url = self.endpoint(&["roles"]);
        self.send_json(self.request(Method::GET, url), "role catalog").await
    }

    async fn list_band_events(
        &self,
        band_id: &BandId,
        filter: Option<EventFilter>,
    ) -> ApiResult<Vec<Event>> {
        let mut url = self.endpoint(&["bands", band_id.as_str(), "events"]);
        if let Some(filter) = filter {
            url.query_pairs_mut().append_pair("filter", filter.as_str());
        }
        self.send_json(self.request(Method::GET, url), &format!("events of band {band_id}"))
            .await
    }
}
