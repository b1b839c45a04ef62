use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::fixtures;
use crate::normalize::{self, EventCard, PlaceCard};

/// Upstream listing size requested before truncating to the caller's limit.
const UPSTREAM_PAGE_SIZE: usize = 50;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {path} -> {status}{}", body_suffix(.body))]
    Status {
        path: String,
        status: reqwest::StatusCode,
        body: String,
    },
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" - {body}")
    }
}

/// Client for the legacy `/comercios` and `/eventos` listings
#[derive(Clone)]
pub struct LegacyCatalogClient {
    client: reqwest::Client,
    base_url: String,
    use_fixtures: bool,
}

impl LegacyCatalogClient {
    pub fn new(base_url: &str, timeout: Duration, use_fixtures: bool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                log::warn!("Falling back to default HTTP client: {err}");
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: normalize_base_url(base_url),
            use_fixtures,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let transport = |source| ClientError::Transport {
            path: path.to_string(),
            source,
        };

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                path: path.to_string(),
                status,
                body,
            });
        }

        response.json::<Value>().await.map_err(transport)
    }

    pub async fn fetch_place_cards(&self, limit: usize) -> Result<Vec<PlaceCard>, ClientError> {
        let path = format!("/comercios?page=1&page_size={UPSTREAM_PAGE_SIZE}");
        let payload = self.get_json(&path).await?;
        Ok(normalize::place_cards(payload, limit))
    }

    pub async fn fetch_event_cards(&self, limit: usize) -> Result<Vec<EventCard>, ClientError> {
        let path = format!("/eventos?page=1&page_size={UPSTREAM_PAGE_SIZE}");
        let payload = self.get_json(&path).await?;
        Ok(normalize::event_cards(payload, limit))
    }

    /// Featured places, degrading to the static catalog on any upstream failure.
    pub async fn featured_places(&self, limit: usize) -> Vec<PlaceCard> {
        if !self.use_fixtures {
            match self.fetch_place_cards(limit).await {
                Ok(cards) => return cards,
                Err(err) => log::warn!("Featured places fallback to fixtures: {err}"),
            }
        }

        let mut cards = fixtures::featured_place_cards();
        cards.truncate(limit);
        cards
    }

    /// Featured events, degrading to the static catalog on any upstream failure.
    pub async fn featured_events(&self, limit: usize) -> Vec<EventCard> {
        if !self.use_fixtures {
            match self.fetch_event_cards(limit).await {
                Ok(cards) => return cards,
                Err(err) => log::warn!("Featured events fallback to fixtures: {err}"),
            }
        }

        let mut cards = fixtures::featured_event_cards();
        cards.truncate(limit);
        cards
    }
}

fn normalize_base_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}
