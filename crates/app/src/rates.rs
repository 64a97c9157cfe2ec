use std::collections::BTreeMap;

use chrono::{TimeDelta, Utc};
use engine::{Currency, EngineError, RateCache, RateLookup, RateOrigin, RateProvider, RateTable};
use reqwest::Url;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    settings::Settings,
    state::LocalState,
};

/// Client for a Frankfurter-compatible exchange-rate API.
#[derive(Debug, Clone)]
pub struct FrankfurterClient {
    base_url: Url,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    base: String,
    #[serde(default)]
    rates: BTreeMap<String, f64>,
}

impl FrankfurterClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Setting(format!("invalid rates.url: {err}")))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    async fn fetch(&self, anchor: Currency) -> Result<RateTable> {
        let mut endpoint = self
            .base_url
            .join("latest")
            .map_err(|err| AppError::Setting(format!("invalid rates.url: {err}")))?;
        endpoint.query_pairs_mut().append_pair("from", anchor.code());

        let body = self
            .http
            .get(endpoint)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_latest(&body)?)
    }
}

impl RateProvider for FrankfurterClient {
    async fn latest(&self, anchor: Currency) -> engine::ResultEngine<RateTable> {
        self.fetch(anchor)
            .await
            .map_err(|err| EngineError::RateFetch(err.to_string()))
    }
}

/// Parses a `/latest` payload. Unknown or malformed codes are skipped.
pub fn parse_latest(body: &str) -> engine::ResultEngine<RateTable> {
    let response: LatestResponse = serde_json::from_str(body)
        .map_err(|err| EngineError::RateFetch(format!("malformed rates payload: {err}")))?;
    let anchor: Currency = response.base.parse()?;
    let rates = response.rates.into_iter().filter_map(|(code, rate)| {
        match code.parse::<Currency>() {
            Ok(currency) => Some((currency, rate)),
            Err(_) => {
                tracing::debug!("skipping rate for unknown code {code}");
                None
            }
        }
    });
    Ok(RateTable::with_rates(anchor, rates))
}

/// Rates for the configured anchor, served from the local state when fresh.
///
/// A newly fetched table is written back to the state file. `force` ignores
/// the cached entry's age.
pub async fn load_rates(
    settings: &Settings,
    state: &mut LocalState,
    force: bool,
) -> Result<RateLookup> {
    let anchor = settings.anchor_currency()?;
    let max_age = if force {
        TimeDelta::zero()
    } else {
        settings.max_rate_age()?
    };
    let client = FrankfurterClient::new(&settings.rates.url)?;
    let mut cache = RateCache::new(max_age).with_entry(state.rates.clone());

    let lookup = cache.get_or_refresh(&client, anchor, Utc::now()).await;
    if lookup.origin == RateOrigin::Fetched {
        state.rates = cache.entry().cloned();
        if let Err(err) = state.save(&settings.storage.state_path) {
            tracing::error!("failed to persist fetched rates: {err}");
        }
    }
    Ok(lookup)
}
